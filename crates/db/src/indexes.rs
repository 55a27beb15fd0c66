use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index_unique(bson::doc! { "username": 1 }),
        ],
    )
    .await?;

    // Friend requests. The unique ordered pair is what resolves concurrent
    // duplicate add_friend calls: the race loser hits E11000.
    create_indexes(
        db,
        "friend_requests",
        vec![
            index_unique(bson::doc! { "sender": 1, "recipient": 1 }),
            index(bson::doc! { "recipient": 1, "status": 1 }),
        ],
    )
    .await?;

    // Follow edges
    create_indexes(
        db,
        "follows",
        vec![
            index_unique(bson::doc! { "sender": 1, "recipient": 1 }),
            index(bson::doc! { "recipient": 1 }),
        ],
    )
    .await?;

    // Posts
    create_indexes(
        db,
        "posts",
        vec![
            index(bson::doc! { "user_id": 1, "created_at": -1 }),
            index(bson::doc! { "kind": 1 }),
            index(bson::doc! { "shared_post_id": 1 }),
        ],
    )
    .await?;

    // Reactions
    create_indexes(
        db,
        "reactions",
        vec![index_unique(bson::doc! { "post_id": 1, "user_id": 1 })],
    )
    .await?;

    // Comments
    create_indexes(
        db,
        "comments",
        vec![index(bson::doc! { "post_id": 1, "created_at": -1 })],
    )
    .await?;

    // Chats
    create_indexes(db, "chats", vec![index(bson::doc! { "members": 1 })]).await?;

    // Messages
    create_indexes(
        db,
        "messages",
        vec![index(bson::doc! { "chat_id": 1, "created_at": -1 })],
    )
    .await?;

    // Notifications
    create_indexes(
        db,
        "notifications",
        vec![
            index(bson::doc! { "recipient": 1, "created_at": -1 }),
            index(bson::doc! { "recipient": 1, "seen": 1 }),
        ],
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
