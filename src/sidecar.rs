//! Sidecar write-through: a JSON file next to each audio file mirroring the
//! synced Plex fields, for tools that read metadata off the filesystem.

use std::path::PathBuf;

use color_eyre::{Result, eyre::Context};
use serde::Serialize;

use crate::entities;

#[derive(Debug, Serialize)]
struct SidecarTags<'a> {
    title: &'a str,
    album: &'a str,
    artist: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_guid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_ratingkey: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_userrating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_skipcount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_viewcount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_lastviewedat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_lastratedat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plex_updated: Option<i64>,
}

/// Write `<file_path>.plexsync.json` beside the track's audio file and return
/// the sidecar path.
pub fn write_sidecar(track: &entities::track::Model) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}.plexsync.json", track.file_path));

    let tags = SidecarTags {
        title: &track.title,
        album: &track.album,
        artist: &track.artist,
        plex_guid: track.plex_guid.as_deref(),
        plex_ratingkey: track.plex_ratingkey,
        plex_userrating: track.plex_userrating,
        plex_skipcount: track.plex_skipcount,
        plex_viewcount: track.plex_viewcount,
        plex_lastviewedat: track.plex_lastviewedat,
        plex_lastratedat: track.plex_lastratedat,
        plex_updated: track.plex_updated,
    };

    let json = serde_json::to_string_pretty(&tags).context("Failed to serialize sidecar tags")?;
    std::fs::write(&path, json)
        .context(format!("Failed to write sidecar: {}", path.display()))?;

    log::debug!("Wrote sidecar: {}", path.display());
    Ok(path)
}
