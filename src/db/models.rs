use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Admin account. Never exposed through the API; the password hash is a
/// PHC-format Argon2id string.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Inquiry lifecycle. Transitions only move forward in this order; a
/// requested status at or below the current one is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    New,
    Read,
    Replied,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Replied => "replied",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            other => Err(format!("unknown inquiry status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub tour_date: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

/// Fixed display-category vocabulary. `Hero` and `Gallery` accumulate;
/// each service category conventionally holds one current image, which the
/// model does not enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    Hero,
    Gallery,
    ServiceSupervision,
    ServiceHealthcare,
    ServiceAdl,
    ServiceMeals,
    ServiceHousekeeping,
    ServiceSocial,
}

impl ImageCategory {
    pub const SERVICES: [ImageCategory; 6] = [
        Self::ServiceSupervision,
        Self::ServiceHealthcare,
        Self::ServiceAdl,
        Self::ServiceMeals,
        Self::ServiceHousekeeping,
        Self::ServiceSocial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Gallery => "gallery",
            Self::ServiceSupervision => "service_supervision",
            Self::ServiceHealthcare => "service_healthcare",
            Self::ServiceAdl => "service_adl",
            Self::ServiceMeals => "service_meals",
            Self::ServiceHousekeeping => "service_housekeeping",
            Self::ServiceSocial => "service_social",
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hero" => Ok(Self::Hero),
            "gallery" => Ok(Self::Gallery),
            "service_supervision" => Ok(Self::ServiceSupervision),
            "service_healthcare" => Ok(Self::ServiceHealthcare),
            "service_adl" => Ok(Self::ServiceAdl),
            "service_meals" => Ok(Self::ServiceMeals),
            "service_housekeeping" => Ok(Self::ServiceHousekeeping),
            "service_social" => Ok(Self::ServiceSocial),
            other => Err(format!("unknown image category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub id: i64,
    /// Permanent URL on the external host.
    pub url: String,
    /// Deletion handle on the external host, when one was issued.
    pub public_id: Option<String>,
    pub category: ImageCategory,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: i64,
    pub author: String,
    pub relation: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
