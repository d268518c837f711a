use color_eyre::eyre::{Result, WrapErr, eyre};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Config;
use crate::plex::media::{
    PlexTrack, find_section_by_name, get_library_sections, refresh_section, search_tracks,
    tracks_played_since,
};
use crate::ports::plex::PlexCatalog;

/// Production adapter for [`PlexCatalog`], scoped to one music section.
pub struct PlexHttpCatalog {
    client: Client,
    base_url: Url,
    token: String,
    section_id: String,
}

impl PlexHttpCatalog {
    /// Connect to the configured server and resolve the music section.
    ///
    /// Authorization failure and a missing library are configuration errors
    /// and fatal by contract, so they surface here rather than on first use.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if config.ignore_cert_errors {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().wrap_err("Failed to build HTTP client")?;

        let base_url = config.base_url()?;

        let sections = get_library_sections(&client, &base_url, &config.token)
            .await
            .map_err(|err| {
                let unauthorized = err
                    .downcast_ref::<reqwest::Error>()
                    .and_then(|e| e.status())
                    .is_some_and(|s| s == StatusCode::UNAUTHORIZED);
                if unauthorized {
                    eyre!("Plex authorization failed; check the configured token")
                } else {
                    err.wrap_err("Failed to reach Plex server")
                }
            })?;

        let section = find_section_by_name(&sections, &config.library_name).ok_or_else(|| {
            eyre!("{} library not found on Plex server", config.library_name)
        })?;

        log::debug!(
            "Connected to Plex at {}, music section id {}",
            base_url,
            section.key
        );

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
            section_id: section.key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl PlexCatalog for PlexHttpCatalog {
    async fn search_tracks(
        &self,
        album: Option<String>,
        title: String,
    ) -> Result<Vec<PlexTrack>> {
        search_tracks(
            &self.client,
            &self.base_url,
            &self.token,
            &self.section_id,
            album.as_deref(),
            &title,
        )
        .await
    }

    async fn tracks_played_since(&self, cutoff: i64) -> Result<Vec<PlexTrack>> {
        tracks_played_since(
            &self.client,
            &self.base_url,
            &self.token,
            &self.section_id,
            cutoff,
        )
        .await
    }

    async fn refresh_library(&self) -> Result<()> {
        refresh_section(&self.client, &self.base_url, &self.token, &self.section_id).await
    }
}
