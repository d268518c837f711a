use migration::MigratorTrait;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, Database as SeaDatabase};

use crate::database::Database;
use crate::entities;

pub async fn test_db() -> Database {
    let conn = SeaDatabase::connect("sqlite::memory:").await.unwrap();

    migration::Migrator::up(&conn, None).await.unwrap();

    Database { conn }
}

pub async fn seed_track(
    db: &Database,
    title: &str,
    album: &str,
    artist: &str,
    file_path: &str,
) -> entities::track::Model {
    entities::track::ActiveModel {
        title: Set(title.to_string()),
        album: Set(album.to_string()),
        artist: Set(artist.to_string()),
        file_path: Set(file_path.to_string()),
        ..entities::track::ActiveModel::new()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}
