use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue::Set};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tracks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub album: String,
    pub artist: String,
    /// Absolute path of the audio file this record describes.
    #[sea_orm(unique)]
    pub file_path: String,
    /// Opaque Plex identifier, e.g. `plex://track/...`.
    pub plex_guid: Option<String>,
    /// Stable numeric Plex identifier; set once a match has been applied.
    pub plex_ratingkey: Option<i64>,
    pub plex_userrating: Option<f64>,
    pub plex_skipcount: Option<i64>,
    pub plex_viewcount: Option<i64>,
    /// Epoch seconds, as reported by Plex.
    pub plex_lastviewedat: Option<i64>,
    pub plex_lastratedat: Option<i64>,
    /// Epoch seconds of the last successful sync of this record.
    pub plex_updated: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    /// Whether a Plex match has already been applied to this record.
    pub fn is_synced(&self) -> bool {
        self.plex_userrating.is_some()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        let now = Utc::now().timestamp();

        Self {
            created_at: Set(now),
            updated_at: Set(now),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, sea_orm::DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().timestamp();

        if insert {
            self.created_at = Set(now);
        }

        self.updated_at = Set(now);

        Ok(self)
    }
}
