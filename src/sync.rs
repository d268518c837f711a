//! Bulk sync drivers: full catalog sync, recent-activity sync, and the
//! interactive manual search flow around the matcher.

use chrono::Utc;
use color_eyre::eyre::Result;
use sea_orm::TransactionTrait;

use crate::database::Database;
use crate::matcher::{self, MatchState};
use crate::plex::media::PlexTrack;
use crate::ports::plex::PlexCatalog;
use crate::prompt::{Chooser, Selection};
use crate::query::{self, TrackQuery};
use crate::sidecar;
use crate::entities;

/// Outcome counts of a full sync run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    pub skipped: usize,
    pub unmatched: usize,
}

pub struct Syncer<'a, C: PlexCatalog> {
    db: &'a Database,
    catalog: &'a C,
    manual_search: bool,
}

impl<'a, C: PlexCatalog> Syncer<'a, C> {
    pub fn new(db: &'a Database, catalog: &'a C, manual_search: bool) -> Self {
        Self {
            db,
            catalog,
            manual_search,
        }
    }

    /// Candidate retrieval policy: an empty album searches by title only;
    /// otherwise search by (album, title) and fall back to title only on
    /// zero hits, then to a query with release annotations stripped.
    async fn retrieve(&self, query: &TrackQuery) -> Result<Vec<PlexTrack>> {
        if query.album.is_empty() {
            return self
                .catalog
                .search_tracks(None, query.title.clone())
                .await;
        }

        let hits = self
            .catalog
            .search_tracks(Some(query.album.clone()), query.title.clone())
            .await?;
        if !hits.is_empty() {
            return Ok(hits);
        }

        let hits = self.catalog.search_tracks(None, query.title.clone()).await?;
        if !hits.is_empty() {
            return Ok(hits);
        }

        // Last resort for soundtrack releases: strip "(From \"...\")"
        // annotations and album boilerplate and try once more.
        let (bare_title, derived_album) = query::split_title_annotation(&query.title)?;
        let cleaned_album = query::clean_album_name(&query.album)?;
        let album = if !cleaned_album.is_empty() {
            cleaned_album
        } else {
            derived_album
        };
        if bare_title != query.title || album != query.album {
            return self
                .catalog
                .search_tracks(
                    if album.is_empty() { None } else { Some(album) },
                    bare_title,
                )
                .await;
        }

        Ok(hits)
    }

    /// Retrieve candidates for `query` and run match selection.
    ///
    /// `manual` forces the interactive selection branch and, by the same
    /// token, blocks the not-found fallback from nesting another manual
    /// search inside one.
    pub async fn find_track(
        &self,
        query: TrackQuery,
        chooser: &mut dyn Chooser,
        manual: bool,
    ) -> Option<PlexTrack> {
        let mut query = query;
        let mut manual = manual;

        loop {
            let candidates = match self.retrieve(&query).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    log::debug!(
                        "Error searching for {} - {}: {:#}",
                        query.album,
                        query.title,
                        err
                    );
                    return None;
                }
            };

            if candidates.is_empty() {
                log::info!("Track {} - {} not found in Plex", query.album, query.title);
                if self.manual_search && !manual && chooser.confirm("Search manually?") {
                    query = manual_query(chooser);
                    manual = true;
                    continue;
                }
                return None;
            }

            if !manual {
                return matcher::resolve_automatic(&query, candidates).into_track();
            }

            return match matcher::classify(candidates) {
                MatchState::NoCandidates => None,
                MatchState::SingleCandidate(track) => Some(track),
                MatchState::MultipleCandidates(candidates) => {
                    let ranked = matcher::rank_by_title(&query.title, candidates);
                    log::debug!("Found {} candidates for {}", ranked.len(), query.title);
                    choose_candidate(&query, ranked, chooser)
                }
            };
        }
    }

    /// Full sync: fetch statistics for every supplied local track.
    ///
    /// Tracks that already carry a rating are skipped unless `force` is set,
    /// without any remote lookup. Every per-track failure degrades to a skip;
    /// the batch never aborts.
    pub async fn sync_all(
        &self,
        tracks: Vec<entities::track::Model>,
        chooser: &mut dyn Chooser,
        force: bool,
        write_sidecars: bool,
    ) -> Result<SyncReport> {
        let total = tracks.len();
        let mut report = SyncReport::default();

        for (index, item) in tracks.into_iter().enumerate() {
            log::info!(
                "Processing {}/{} tracks - {} - {}",
                index + 1,
                total,
                item.artist,
                item.title
            );

            if !force && item.is_synced() {
                log::debug!("Plex rating already present for: {}", item.title);
                report.skipped += 1;
                continue;
            }

            let query = TrackQuery::from_model(&item);
            let Some(found) = self.find_track(query, chooser, false).await else {
                log::info!("No track found for: {} - {}", item.album, item.title);
                report.unmatched += 1;
                continue;
            };

            let now = Utc::now().timestamp();
            match Database::apply_sync(&self.db.conn, item, &found, now).await {
                Ok(synced) => {
                    if write_sidecars {
                        if let Err(err) = sidecar::write_sidecar(&synced) {
                            log::warn!(
                                "Failed to write sidecar for {}: {:#}",
                                synced.file_path,
                                err
                            );
                        }
                    }
                    report.synced += 1;
                }
                Err(err) => {
                    log::debug!("Failed to store sync result: {:#}", err);
                    report.unmatched += 1;
                }
            }
        }

        Ok(report)
    }

    /// Recent-activity sync: overwrite synced fields of local records whose
    /// rating key matches a remote track played within the last `days` days.
    ///
    /// Lookup is exact; zero local hits are skipped quietly and several hits
    /// mean the mapping is ambiguous and must be repaired by a full sync.
    /// The whole batch of writes runs in one transaction.
    pub async fn sync_recent(&self, days: i64) -> Result<()> {
        let cutoff = (Utc::now() - chrono::Duration::days(days)).timestamp();
        let tracks = self.catalog.tracks_played_since(cutoff).await?;
        log::info!("Updating information for {} tracks", tracks.len());

        let txn = self.db.conn.begin().await?;

        for track in tracks {
            let rating_key: i64 = match track.rating_key.parse() {
                Ok(key) => key,
                Err(_) => {
                    log::debug!("Skipping track with non-numeric ratingKey: {}", track.rating_key);
                    continue;
                }
            };

            let mut locals = Database::find_by_rating_key(&txn, rating_key).await?;
            if locals.is_empty() {
                log::debug!("{} | track not found locally", rating_key);
                continue;
            }
            if locals.len() > 1 {
                log::info!(
                    "{} local tracks share rating key {}; run a full sync to repair",
                    locals.len(),
                    rating_key
                );
                continue;
            }

            let local = locals.remove(0);
            log::info!("Updating information for {} - {}", local.artist, local.title);
            let now = Utc::now().timestamp();
            if let Err(err) = Database::apply_sync(&txn, local, &track, now).await {
                log::debug!("Failed to update track {}: {:#}", rating_key, err);
                continue;
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

/// Trigger a rescan of the remote music library. Failure is logged as a
/// warning and never propagated. Needs only the catalog, not the datastore.
pub async fn trigger_update<C: PlexCatalog>(catalog: &C) {
    match catalog.refresh_library().await {
        Ok(()) => log::info!("Plex library update started"),
        Err(err) => log::warn!("Plex library update failed: {:#}", err),
    }
}

/// Prompt the operator for a manual search triple. Surrounding whitespace is
/// trimmed; an empty album means no album constraint.
fn manual_query(chooser: &mut dyn Chooser) -> TrackQuery {
    TrackQuery {
        title: chooser.input("Title:").trim().to_string(),
        album: chooser.input("Album:").trim().to_string(),
        artist: chooser.input("Artist:").trim().to_string(),
    }
}

/// Present ranked candidates and return the operator's pick, if any.
fn choose_candidate(
    query: &TrackQuery,
    ranked: Vec<PlexTrack>,
    chooser: &mut dyn Chooser,
) -> Option<PlexTrack> {
    let header = format!("Choose candidates for {} - {}:", query.album, query.title);
    let options: Vec<String> = ranked
        .iter()
        .map(|track| {
            format!(
                "{} - {} - {}",
                track.parent_title.as_deref().unwrap_or(""),
                track.title,
                track.display_artist()
            )
        })
        .collect();

    match chooser.choose(&header, &options, 1) {
        Selection::Pick(n) => ranked.into_iter().nth(n - 1),
        Selection::Abort | Selection::Skip => None,
    }
}
