use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/* ---------- Shared container ---------- */

/// A minimal Plex JSON envelope for list style endpoints that return
/// `MediaContainer.Metadata`.
///
/// Notes
/// - Plex responses are wrapped in a top level `MediaContainer`.
/// - Many fields are optional or omitted depending on endpoint and server version.
/// - `metadata` defaults to an empty vec when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexMediaContainer<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexMediaContainer<T> {
    #[serde(default)]
    pub size: Option<u32>,

    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
}

/* ---------- Library sections ---------- */

/// Response type for `/library/sections`.
#[derive(Debug, Deserialize)]
pub struct PlexLibrarySectionsResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexLibrarySectionsContainer,
}

/// `MediaContainer` for `/library/sections` which returns a `Directory` list.
#[derive(Debug, Deserialize)]
pub struct PlexLibrarySectionsContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<PlexLibrarySection>,
}

/// A Plex library section.
///
/// Notes
/// - `key` is the library section id.
/// - `section_type` is `artist` for music libraries.
#[derive(Debug, Deserialize)]
pub struct PlexLibrarySection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

/// Fetch all Plex library sections.
///
/// Endpoint
/// - `GET /library/sections`
pub async fn get_library_sections(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<Vec<PlexLibrarySection>> {
    let url = base_url.join("library/sections")?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexLibrarySectionsResponse>()
        .await
        .wrap_err("Failed to deserialize library sections")?;

    Ok(res.media_container.directories)
}

/// Find a music section by its configured name.
pub fn find_section_by_name<'a>(
    sections: &'a [PlexLibrarySection],
    name: &str,
) -> Option<&'a PlexLibrarySection> {
    sections
        .iter()
        .find(|s| s.section_type == "artist" && s.title == name)
}

/* ---------- Tracks ---------- */

/// A music track item returned from `/library/sections/{id}/all?type=10`.
///
/// Statistics fields are omitted by the server when the track has never been
/// played or rated, so everything except `ratingKey` and `title` is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexTrack {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    #[serde(default)]
    pub guid: Option<String>,

    pub title: String,

    /// Album title.
    #[serde(rename = "parentTitle", default)]
    pub parent_title: Option<String>,

    /// Album artist title.
    #[serde(rename = "grandparentTitle", default)]
    pub grandparent_title: Option<String>,

    /// Track-level artist credit; absent when it matches the album artist.
    #[serde(rename = "originalTitle", default)]
    pub original_title: Option<String>,

    #[serde(rename = "userRating", default)]
    pub user_rating: Option<f64>,

    #[serde(rename = "skipCount", default)]
    pub skip_count: Option<i64>,

    #[serde(rename = "viewCount", default)]
    pub view_count: Option<i64>,

    #[serde(rename = "lastViewedAt", default)]
    pub last_viewed_at: Option<i64>,

    #[serde(rename = "lastRatedAt", default)]
    pub last_rated_at: Option<i64>,
}

impl PlexTrack {
    /// Artist credit used for matching: the track-level credit when present,
    /// otherwise the album artist.
    pub fn artist_of_record(&self) -> &str {
        self.original_title
            .as_deref()
            .or(self.grandparent_title.as_deref())
            .unwrap_or("")
    }

    /// Artist name used for display in candidate listings.
    pub fn display_artist(&self) -> &str {
        self.grandparent_title
            .as_deref()
            .or(self.original_title.as_deref())
            .unwrap_or("")
    }
}

/// Search tracks in a music section by title, optionally constrained to an
/// album title.
///
/// Endpoint
/// - `GET /library/sections/{id}/all?type=10&title=...[&album.title=...]`
pub async fn search_tracks(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    section_id: &str,
    album: Option<&str>,
    title: &str,
) -> Result<Vec<PlexTrack>> {
    let mut url = base_url.join(&format!("library/sections/{}/all", section_id))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("type", "10");
        pairs.append_pair("title", title);
        if let Some(album) = album {
            pairs.append_pair("album.title", album);
        }
    }

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexTrack>>()
        .await
        .wrap_err("Failed to deserialize track search response")?;

    Ok(res.media_container.metadata)
}

/// Fetch tracks last played at or after `cutoff` (epoch seconds).
///
/// Endpoint
/// - `GET /library/sections/{id}/all?type=10&lastViewedAt>>={cutoff}`
pub async fn tracks_played_since(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    section_id: &str,
    cutoff: i64,
) -> Result<Vec<PlexTrack>> {
    let mut url = base_url.join(&format!("library/sections/{}/all", section_id))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("type", "10");
        pairs.append_pair("lastViewedAt>>", &cutoff.to_string());
    }

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexTrack>>()
        .await
        .wrap_err("Failed to deserialize recently played response")?;

    Ok(res.media_container.metadata)
}

/// Start a background rescan of a music section.
///
/// Endpoint
/// - `GET /library/sections/{id}/refresh`
pub async fn refresh_section(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    section_id: &str,
) -> Result<()> {
    let url = base_url.join(&format!("library/sections/{}/refresh", section_id))?;

    client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to refresh library section")?;

    Ok(())
}
