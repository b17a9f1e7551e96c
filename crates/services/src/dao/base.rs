use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    error::{ErrorKind, WriteFailure},
    options::ReturnDocument,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

/// Outcome of an update whose filter carries a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub matched: bool,
    pub upserted: bool,
}

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
    timestamped: bool,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
            timestamped: true,
        }
    }

    /// For append-only collections whose documents carry no `updated_at`.
    pub fn untimestamped(mut self) -> Self {
        self.timestamped = false;
        self
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: impl Into<Bson>) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(doc! { "_id": id.into() }).await?)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> DaoResult<Vec<T>> {
        let mut cursor = if let Some(sort) = sort {
            self.collection.find(filter).sort(sort).await?
        } else {
            self.collection.find(filter).await?
        };

        let mut results = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<Bson> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .map_err(map_duplicate_key)?;

        debug!(id = ?result.inserted_id, "Inserted document");
        Ok(result.inserted_id)
    }

    /// Applies `update` to the single document matching `filter`. Every
    /// conditional write in the service layer goes through here: the
    /// precondition lives in the filter, so a concurrent writer that got
    /// there first makes this one miss.
    pub async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> DaoResult<WriteOutcome> {
        let result = self
            .collection
            .update_one(filter, self.stamp(update))
            .upsert(upsert)
            .await
            .map_err(map_duplicate_key)?;

        Ok(WriteOutcome {
            matched: result.matched_count > 0,
            upserted: result.upserted_id.is_some(),
        })
    }

    /// Like [`update_one`](Self::update_one) but returns the document as it
    /// is after the write, or `None` when the precondition did not hold.
    pub async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
    ) -> DaoResult<Option<T>> {
        let updated = self
            .collection
            .find_one_and_update(filter, self.stamp(update))
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_duplicate_key)?;
        Ok(updated)
    }

    fn stamp(&self, update: Document) -> Document {
        if self.timestamped {
            with_timestamp(update)
        } else {
            update
        }
    }
}

/// Stamps `updated_at` into the `$set` stage of an update document.
fn with_timestamp(mut update: Document) -> Document {
    let now = bson::DateTime::now();
    match update.get_document_mut("$set") {
        Ok(set) => {
            set.insert("updated_at", now);
        }
        Err(_) => {
            update.insert("$set", doc! { "updated_at": now });
        }
    }
    update
}

fn map_duplicate_key(e: mongodb::error::Error) -> DaoError {
    let duplicate = match *e.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000 => {
            Some(write_error.message.clone())
        }
        // findAndModify reports index violations as command errors.
        ErrorKind::Command(ref command_error) if command_error.code == 11000 => {
            Some(command_error.message.clone())
        }
        _ => None,
    };
    match duplicate {
        Some(message) => DaoError::DuplicateKey(message),
        None => DaoError::Mongo(e),
    }
}
