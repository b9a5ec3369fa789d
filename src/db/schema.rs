//! SQL DDL for initializing the site database.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema:
/// - `accounts`: admin login identities, `email` UNIQUE
/// - `inquiries`: contact-form submissions with a forward-only `status`
/// - `images`: references into the external image host, tagged by category
/// - `testimonials`: public, append-only
///
/// Timestamps are RFC3339 TEXT. `status` and `category` are TEXT backed by
/// closed enums on the Rust side.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS inquiries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NULL,
    message TEXT NULL,
    tour_date TEXT NULL,
    status TEXT NOT NULL DEFAULT 'new',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_inquiries_status ON inquiries(status);

CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    public_id TEXT NULL,
    category TEXT NOT NULL DEFAULT 'gallery',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_images_category ON images(category);

CREATE TABLE IF NOT EXISTS testimonials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    author TEXT NOT NULL,
    relation TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;
