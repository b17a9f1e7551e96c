use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{Invitation, Notification, Reservation, ReservationSlot, User};

/// Slots and users are keyed by `_id` (date, subject id), which MongoDB
/// already indexes uniquely.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    create_indexes(
        db,
        User::COLLECTION,
        vec![index(bson::doc! { "status": 1, "invited_at": -1 })],
    )
    .await?;

    create_indexes(
        db,
        Invitation::COLLECTION,
        vec![
            index_unique(bson::doc! { "code": 1 }),
            index(bson::doc! { "created_by": 1, "created_at": -1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        ReservationSlot::COLLECTION,
        vec![index(bson::doc! { "reserved_by": 1 })],
    )
    .await?;

    create_indexes(
        db,
        Reservation::COLLECTION,
        vec![
            index(bson::doc! { "user_id": 1, "date": -1 }),
            index(bson::doc! { "status": 1, "date": -1 }),
            // Backstop for the one-confirmed-booking-per-day rule.
            IndexModel::builder()
                .keys(bson::doc! { "date": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(bson::doc! { "status": "confirmed" })
                        .name("date_confirmed_unique".to_string())
                        .build(),
                )
                .build(),
        ],
    )
    .await?;

    create_indexes(
        db,
        Notification::COLLECTION,
        vec![index(bson::doc! { "user_id": 1, "sent_at": -1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
