use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub created_by: String,
    pub used_by: Option<String>,
    pub used_at: Option<DateTime>,
    /// `None` means the code never expires.
    pub expires_at: Option<DateTime>,
    pub created_at: DateTime,
}

impl Invitation {
    pub const COLLECTION: &'static str = "invitations";

    pub fn is_used(&self) -> bool {
        self.used_by.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}
