pub mod auth;
pub mod chat;
pub mod images;
pub mod inquiries;
pub mod testimonials;
