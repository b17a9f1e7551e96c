use async_trait::async_trait;
use bson::{doc, DateTime};
use hideaway_db::models::Invitation;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::InvitationStore;

pub struct InvitationDao {
    pub base: BaseDao<Invitation>,
}

impl InvitationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Invitation::COLLECTION).untimestamped(),
        }
    }
}

#[async_trait]
impl InvitationStore for InvitationDao {
    async fn find_by_code(&self, code: &str) -> DaoResult<Option<Invitation>> {
        self.base.find_one(doc! { "code": code }).await
    }

    async fn insert(&self, invitation: &Invitation) -> DaoResult<Invitation> {
        let id = self.base.insert_one(invitation).await?;
        let mut stored = invitation.clone();
        stored.id = Some(id.as_object_id().ok_or(DaoError::NotFound)?);
        Ok(stored)
    }

    async fn mark_used(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime,
    ) -> DaoResult<Option<Invitation>> {
        self.base
            .find_one_and_update(
                doc! { "code": code, "used_by": null },
                doc! { "$set": { "used_by": used_by, "used_at": used_at } },
            )
            .await
    }

    async fn list_by_creator(&self, uid: &str) -> DaoResult<Vec<Invitation>> {
        self.base
            .find_many(doc! { "created_by": uid }, Some(doc! { "created_at": -1 }))
            .await
    }
}
