//! First-boot seeding: the default admin account and a placeholder image
//! per service category, inserted only when nothing is there yet.

use tracing::info;

use crate::auth::hash_password;
use crate::config::Config;
use crate::db::{ImageCategory, Storage};
use crate::error::FountainError;

const DEFAULT_SERVICE_IMAGES: [(ImageCategory, &str); 6] = [
    (
        ImageCategory::ServiceSupervision,
        "https://images.unsplash.com/photo-1576765608535-5f04d1e3f289?auto=format&fit=crop&q=80&w=600",
    ),
    (
        ImageCategory::ServiceHealthcare,
        "https://images.unsplash.com/photo-1576091160399-112ba8d25d1d?auto=format&fit=crop&q=80&w=600",
    ),
    (
        ImageCategory::ServiceAdl,
        "https://images.unsplash.com/photo-1516733725897-1aa73b87c8e8?auto=format&fit=crop&q=80&w=600",
    ),
    (
        ImageCategory::ServiceMeals,
        "https://images.unsplash.com/photo-1498837167922-ddd27525d352?auto=format&fit=crop&q=80&w=600",
    ),
    (
        ImageCategory::ServiceHousekeeping,
        "https://images.unsplash.com/photo-1581578731117-104f2a41272c?auto=format&fit=crop&q=80&w=600",
    ),
    (
        ImageCategory::ServiceSocial,
        "https://images.unsplash.com/photo-1573497019940-1c28c88b4f3e?auto=format&fit=crop&q=80&w=600",
    ),
];

/// Create the admin account from config if no account exists yet.
pub async fn seed_admin(storage: &Storage, cfg: &Config) -> Result<(), FountainError> {
    if storage.count_accounts().await? > 0 {
        return Ok(());
    }
    let hash = hash_password(&cfg.admin_password)?;
    storage.insert_account(&cfg.admin_email, &hash).await?;
    info!(email = %cfg.admin_email, "seeded admin account");
    Ok(())
}

/// Insert a default image for each service category that has none.
pub async fn seed_service_images(storage: &Storage) -> Result<(), FountainError> {
    for (category, url) in DEFAULT_SERVICE_IMAGES {
        if storage.count_images_in(category).await? > 0 {
            continue;
        }
        storage.insert_image(url, None, category).await?;
        info!(category = %category, "seeded default service image");
    }
    Ok(())
}
