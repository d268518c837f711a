use std::path::Path;
use std::time::Duration;

use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions,
    ConnectionTrait,
    Database as SeaDatabase, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities;
use crate::plex::media::PlexTrack;

pub struct Database {
    pub conn: DatabaseConnection,
}

/// Optional exact-text filters for listing local tracks.
#[derive(Debug, Default)]
pub struct TrackFilter {
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(10)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        log::info!("Database ready at: {}", path.display());
        Ok(Database { conn })
    }

    /// List local tracks, optionally narrowed by exact field matches.
    pub async fn list_tracks(&self, filter: &TrackFilter) -> Result<Vec<entities::track::Model>> {
        let mut select = entities::track::Entity::find();
        if let Some(title) = &filter.title {
            select = select.filter(entities::track::Column::Title.eq(title));
        }
        if let Some(album) = &filter.album {
            select = select.filter(entities::track::Column::Album.eq(album));
        }
        if let Some(artist) = &filter.artist {
            select = select.filter(entities::track::Column::Artist.eq(artist));
        }

        select
            .order_by_asc(entities::track::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list tracks")
    }

    /// All local records carrying the given Plex rating key. More than one
    /// hit means the local catalog has an ambiguous mapping.
    pub async fn find_by_rating_key<C: ConnectionTrait>(
        conn: &C,
        rating_key: i64,
    ) -> Result<Vec<entities::track::Model>> {
        entities::track::Entity::find()
            .filter(entities::track::Column::PlexRatingkey.eq(rating_key))
            .all(conn)
            .await
            .context("Failed to query tracks by rating key")
    }

    /// Create or refresh a record keyed by file path. Returns the model and
    /// whether it was newly created.
    pub async fn upsert_imported(
        &self,
        title: &str,
        album: &str,
        artist: &str,
        file_path: &str,
    ) -> Result<(entities::track::Model, bool)> {
        let existing = entities::track::Entity::find()
            .filter(entities::track::Column::FilePath.eq(file_path))
            .one(&self.conn)
            .await
            .context("Failed to query track by file path")?;

        if let Some(track) = existing {
            let mut active: entities::track::ActiveModel = track.into();
            active.title = Set(title.to_string());
            active.album = Set(album.to_string());
            active.artist = Set(artist.to_string());
            let model = active
                .update(&self.conn)
                .await
                .context("Failed to update imported track")?;
            return Ok((model, false));
        }

        let active = entities::track::ActiveModel {
            title: Set(title.to_string()),
            album: Set(album.to_string()),
            artist: Set(artist.to_string()),
            file_path: Set(file_path.to_string()),
            ..entities::track::ActiveModel::new()
        };
        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert imported track")?;

        Ok((model, true))
    }

    /// Write all synced fields from a matched Plex track into a local record,
    /// stamping `plex_updated` with `now` (epoch seconds).
    ///
    /// Generic over the connection so recent sync can call it inside one
    /// transaction.
    pub async fn apply_sync<C: ConnectionTrait>(
        conn: &C,
        local: entities::track::Model,
        remote: &PlexTrack,
        now: i64,
    ) -> Result<entities::track::Model> {
        let rating_key: i64 = remote
            .rating_key
            .parse()
            .context(format!("Invalid Plex ratingKey: {}", remote.rating_key))?;

        let mut active: entities::track::ActiveModel = local.into();
        active.plex_guid = Set(remote.guid.clone());
        active.plex_ratingkey = Set(Some(rating_key));
        active.plex_userrating = Set(remote.user_rating);
        active.plex_skipcount = Set(remote.skip_count);
        active.plex_viewcount = Set(remote.view_count);
        active.plex_lastviewedat = Set(remote.last_viewed_at);
        active.plex_lastratedat = Set(remote.last_rated_at);
        active.plex_updated = Set(Some(now));

        active
            .update(conn)
            .await
            .context("Failed to store synced track")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_track, test_db};

    #[tokio::test]
    async fn list_tracks_applies_filters() {
        let db = test_db().await;
        seed_track(&db, "Song A", "Album X", "Artist 1", "/m/a.flac").await;
        seed_track(&db, "Song B", "Album X", "Artist 2", "/m/b.flac").await;

        let all = db.list_tracks(&TrackFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_artist = db
            .list_tracks(&TrackFilter {
                artist: Some("Artist 2".to_string()),
                ..TrackFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_artist.len(), 1);
        assert_eq!(by_artist[0].title, "Song B");
    }

    #[tokio::test]
    async fn upsert_imported_is_keyed_by_file_path() {
        let db = test_db().await;

        let (first, created) = db
            .upsert_imported("Old Title", "Album", "Artist", "/m/a.flac")
            .await
            .unwrap();
        assert!(created);

        let (second, created) = db
            .upsert_imported("New Title", "Album", "Artist", "/m/a.flac")
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.title, "New Title");
    }

    #[tokio::test]
    async fn apply_sync_round_trips_through_rating_key_lookup() {
        let db = test_db().await;
        let local = seed_track(&db, "Song", "Album", "Artist", "/m/a.flac").await;

        let remote = PlexTrack {
            rating_key: "4242".to_string(),
            guid: Some("plex://track/abc".to_string()),
            title: "Song".to_string(),
            user_rating: Some(9.0),
            skip_count: Some(1),
            view_count: Some(7),
            last_viewed_at: Some(1719772000),
            last_rated_at: Some(1719000000),
            ..PlexTrack::default()
        };

        let synced = Database::apply_sync(&db.conn, local, &remote, 1720000000)
            .await
            .unwrap();
        assert!(synced.is_synced());
        assert_eq!(synced.plex_ratingkey, Some(4242));
        assert_eq!(synced.plex_updated, Some(1720000000));

        let found = Database::find_by_rating_key(&db.conn, 4242).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, synced.id);
    }

    #[tokio::test]
    async fn apply_sync_rejects_non_numeric_rating_key() {
        let db = test_db().await;
        let local = seed_track(&db, "Song", "Album", "Artist", "/m/a.flac").await;

        let remote = PlexTrack {
            rating_key: "not-a-number".to_string(),
            title: "Song".to_string(),
            ..PlexTrack::default()
        };

        let result = Database::apply_sync(&db.conn, local, &remote, 0).await;
        assert!(result.is_err());
    }
}
