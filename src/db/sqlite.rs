use crate::db::models::{Account, ImageAsset, ImageCategory, Inquiry, InquiryStatus, Testimonial};
use crate::db::schema::SQLITE_INIT;
use crate::error::FountainError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Storage for all four record kinds. Every operation is a single round
/// trip; per-row write semantics of SQLite are the only consistency
/// guarantee (see the concurrency notes in DESIGN.md).
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) and initialize the database.
    pub async fn connect(database_url: &str) -> Result<Self, FountainError> {
        let connect_opts =
            SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), FountainError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- accounts ----

    pub async fn find_account(&self, email: &str) -> Result<Option<Account>, FountainError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_account).transpose()
    }

    pub async fn count_accounts(&self) -> Result<i64, FountainError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn insert_account(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, FountainError> {
        let res = sqlx::query(
            "INSERT INTO accounts (email, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    // ---- inquiries ----

    /// Insert a new inquiry with status `new` and the current timestamp,
    /// returning the stored row.
    pub async fn insert_inquiry(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        message: Option<&str>,
        tour_date: Option<&str>,
    ) -> Result<Inquiry, FountainError> {
        let created_at = Utc::now();
        let res = sqlx::query(
            r#"INSERT INTO inquiries (name, email, phone, message, tour_date, status, created_at)
               VALUES (?, ?, ?, ?, ?, 'new', ?)"#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(message)
        .bind(tour_date)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Inquiry {
            id: res.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            message: message.map(str::to_string),
            tour_date: tour_date.map(str::to_string),
            status: InquiryStatus::New,
            created_at,
        })
    }

    /// List inquiries newest-first, optionally restricted to one status.
    /// `id` breaks ties for same-second inserts.
    pub async fn list_inquiries(
        &self,
        status: Option<InquiryStatus>,
    ) -> Result<Vec<Inquiry>, FountainError> {
        let rows = match status {
            Some(s) => {
                sqlx::query(
                    r#"SELECT id, name, email, phone, message, tour_date, status, created_at
                       FROM inquiries WHERE status = ?
                       ORDER BY created_at DESC, id DESC"#,
                )
                .bind(s.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT id, name, email, phone, message, tour_date, status, created_at
                       FROM inquiries ORDER BY created_at DESC, id DESC"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(row_to_inquiry).collect()
    }

    pub async fn get_inquiry(&self, id: i64) -> Result<Option<Inquiry>, FountainError> {
        let row = sqlx::query(
            r#"SELECT id, name, email, phone, message, tour_date, status, created_at
               FROM inquiries WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_inquiry).transpose()
    }

    pub async fn set_inquiry_status(
        &self,
        id: i64,
        status: InquiryStatus,
    ) -> Result<(), FountainError> {
        sqlx::query("UPDATE inquiries SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---- images ----

    pub async fn insert_image(
        &self,
        url: &str,
        public_id: Option<&str>,
        category: ImageCategory,
    ) -> Result<ImageAsset, FountainError> {
        let created_at = Utc::now();
        let res = sqlx::query(
            "INSERT INTO images (url, public_id, category, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(url)
        .bind(public_id)
        .bind(category.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ImageAsset {
            id: res.last_insert_rowid(),
            url: url.to_string(),
            public_id: public_id.map(str::to_string),
            category,
            created_at,
        })
    }

    pub async fn list_images(
        &self,
        category: Option<ImageCategory>,
    ) -> Result<Vec<ImageAsset>, FountainError> {
        let rows = match category {
            Some(c) => {
                sqlx::query(
                    r#"SELECT id, url, public_id, category, created_at
                       FROM images WHERE category = ?
                       ORDER BY created_at DESC, id DESC"#,
                )
                .bind(c.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT id, url, public_id, category, created_at
                       FROM images ORDER BY created_at DESC, id DESC"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(row_to_image).collect()
    }

    pub async fn get_image(&self, id: i64) -> Result<Option<ImageAsset>, FountainError> {
        let row = sqlx::query(
            "SELECT id, url, public_id, category, created_at FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_image).transpose()
    }

    pub async fn delete_image(&self, id: i64) -> Result<(), FountainError> {
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_images_in(&self, category: ImageCategory) -> Result<i64, FountainError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images WHERE category = ?")
            .bind(category.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    // ---- testimonials ----

    pub async fn insert_testimonial(
        &self,
        author: &str,
        relation: &str,
        text: &str,
    ) -> Result<Testimonial, FountainError> {
        let created_at = Utc::now();
        let res = sqlx::query(
            "INSERT INTO testimonials (author, relation, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(author)
        .bind(relation)
        .bind(text)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Testimonial {
            id: res.last_insert_rowid(),
            author: author.to_string(),
            relation: relation.to_string(),
            text: text.to_string(),
            created_at,
        })
    }

    pub async fn list_testimonials(&self) -> Result<Vec<Testimonial>, FountainError> {
        let rows = sqlx::query(
            r#"SELECT id, author, relation, text, created_at
               FROM testimonials ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_testimonial).collect()
    }
}

fn row_to_account(row: SqliteRow) -> Result<Account, FountainError> {
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

fn row_to_inquiry(row: SqliteRow) -> Result<Inquiry, FountainError> {
    let status_str: String = row.try_get("status")?;
    let status = InquiryStatus::from_str(&status_str)
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    Ok(Inquiry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        message: row.try_get("message")?,
        tour_date: row.try_get("tour_date")?,
        status,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

fn row_to_image(row: SqliteRow) -> Result<ImageAsset, FountainError> {
    let category_str: String = row.try_get("category")?;
    let category = ImageCategory::from_str(&category_str)
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    Ok(ImageAsset {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        public_id: row.try_get("public_id")?,
        category,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

fn row_to_testimonial(row: SqliteRow) -> Result<Testimonial, FountainError> {
    Ok(Testimonial {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        relation: row.try_get("relation")?,
        text: row.try_get("text")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

fn parse_timestamp(raw: String) -> Result<DateTime<Utc>, FountainError> {
    Ok(chrono::DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc))
}

/// In-memory storage on a single pooled connection. A pool of `:memory:`
/// connections would otherwise hand each connection its own database.
#[cfg(test)]
pub(crate) async fn memory_storage() -> Storage {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory connect options");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .expect("in-memory database should open");
    let storage = Storage::new(pool);
    storage
        .init_schema()
        .await
        .expect("schema init should succeed");
    storage
}
