use async_trait::async_trait;
use bson::doc;
use hideaway_db::models::Notification;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::NotificationStore;

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION).untimestamped(),
        }
    }
}

#[async_trait]
impl NotificationStore for NotificationDao {
    async fn insert(&self, notification: &Notification) -> DaoResult<Notification> {
        let id = self.base.insert_one(notification).await?;
        let mut stored = notification.clone();
        stored.id = Some(id.as_object_id().ok_or(DaoError::NotFound)?);
        Ok(stored)
    }

    async fn list(&self, user_id: Option<&str>) -> DaoResult<Vec<Notification>> {
        let filter = match user_id {
            Some(uid) => doc! { "user_id": uid },
            None => doc! {},
        };
        self.base
            .find_many(filter, Some(doc! { "sent_at": -1 }))
            .await
    }
}
