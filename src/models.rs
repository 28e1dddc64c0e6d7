use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application-level role layered over the identity provider's user.
///
/// Stored as the PostgreSQL ENUM "user_role". Every profile starts as `User`;
/// only an existing admin can escalate a profile to `Admin`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// Moderation state of a tool.
///
/// Exactly three values exist. A submitted tool starts as `Pending`; only an
/// admin moves it to `Approved` or `Rejected`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "tool_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Pending,
    Approved,
    Rejected,
}

impl ToolStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ToolStatus::Pending => "pending",
            ToolStatus::Approved => "approved",
            ToolStatus::Rejected => "rejected",
        }
    }
}

/// Pricing model, stored as the PostgreSQL ENUM "tool_pricing" with the
/// capitalized labels shown in the catalog.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "tool_pricing")]
pub enum Pricing {
    #[default]
    Free,
    Freemium,
    Paid,
    Trial,
}

/// UserProfile row (`user_profiles` table).
///
/// `id` is the identity provider's user id, so a decoded access token maps
/// straight onto a profile.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub role: UserRole,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category row. `tool_count` is derived at read time and lives on the DTO.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tool row (`tools` table).
///
/// Always belongs to one category; deleting that category removes the tool
/// (ON DELETE CASCADE), and deleting the tool removes its reviews.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Tool {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub long_description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub pricing: Pricing,
    pub platforms: Vec<String>,
    pub verified: bool,
    pub featured: bool,
    pub status: ToolStatus,
    pub submitted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Values for inserting or fully replacing a tool row. Built from either the
/// public submission body or the admin editor body.
#[derive(Debug, Clone)]
pub struct ToolDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub long_description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub pricing: Pricing,
    pub platforms: Vec<String>,
    pub verified: bool,
    pub featured: bool,
    pub status: ToolStatus,
    pub submitted_by: Option<Uuid>,
}

/// Review row. At most one per (tool, user) pair, enforced by a UNIQUE
/// constraint; a second insert fails with SQLSTATE 23505.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub tool_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Published news article (`news` table). `category` is a comma-separated
/// tag list.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
