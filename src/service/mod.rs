pub mod chat;
pub mod mailer;
pub mod object_store;
pub mod seed;

pub use chat::{ChatClient, ChatCompleter, ChatTurn};
pub use mailer::Mailer;
pub use object_store::{ObjectStore, StoredObject};
