use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Subject id issued by the identity provider.
    #[serde(rename = "_id")]
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: String,
    pub role: Role,
    pub status: UserStatus,
    pub invited_by: Option<String>,
    pub invited_at: DateTime,
    pub approved_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    User,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Pending,
    Approved,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Blocked => "blocked",
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::User => "user",
        }
    }
}

impl User {
    pub const COLLECTION: &'static str = "users";

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Approved
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }
}
