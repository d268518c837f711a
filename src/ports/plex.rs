use color_eyre::eyre::Result;

use crate::plex::media::PlexTrack;

/// Port trait wrapping the Plex catalog capabilities used by the sync logic.
///
/// Implementations live in `plex::client` (production) or test mocks.
/// Arguments are owned so the mock expectations stay lifetime-free.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlexCatalog: Send + Sync {
    /// Search the music section for tracks by title, optionally constrained
    /// to an album title. Returns candidates in server order.
    async fn search_tracks(&self, album: Option<String>, title: String)
    -> Result<Vec<PlexTrack>>;

    /// Tracks last played at or after `cutoff` (epoch seconds).
    async fn tracks_played_since(&self, cutoff: i64) -> Result<Vec<PlexTrack>>;

    /// Trigger a rescan of the music section.
    async fn refresh_library(&self) -> Result<()>;
}
