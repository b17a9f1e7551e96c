use async_trait::async_trait;
use bson::{doc, DateTime};
use hideaway_db::models::{Role, User, UserStatus};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::UserStore;

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for UserDao {
    async fn find(&self, uid: &str) -> DaoResult<Option<User>> {
        self.base.find_by_id(uid).await
    }

    async fn insert(&self, user: &User) -> DaoResult<()> {
        self.base.insert_one(user).await?;
        Ok(())
    }

    async fn update_status(
        &self,
        uid: &str,
        status: UserStatus,
        approved_at: Option<DateTime>,
    ) -> DaoResult<Option<User>> {
        let mut set = doc! { "status": status.as_str() };
        if let Some(at) = approved_at {
            set.insert("approved_at", at);
        }

        self.base
            .find_one_and_update(
                doc! { "_id": uid, "role": Role::User.as_str() },
                doc! { "$set": set },
            )
            .await
    }

    async fn list(&self, status: Option<UserStatus>) -> DaoResult<Vec<User>> {
        let filter = match status {
            Some(s) => doc! { "status": s.as_str() },
            None => doc! {},
        };
        self.base
            .find_many(filter, Some(doc! { "invited_at": -1 }))
            .await
    }
}

