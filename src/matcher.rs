//! Fuzzy matching of local track metadata against Plex catalog candidates.
//!
//! Ranking uses a longest-matching-blocks similarity ratio over the raw
//! titles (no normalization; matching is case- and whitespace-sensitive),
//! and disambiguation between same-titled candidates goes through an artist
//! substring check rather than pure similarity rank.

use crate::plex::media::PlexTrack;
use crate::query::TrackQuery;

/// Similarity in [0, 1] between two strings: `2 * matched / total_length`
/// over the longest matching blocks of the two strings, the classic
/// Ratcliff/Obershelp sequence ratio.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total length of the matching blocks: the longest common block plus,
/// recursively, the matches to its left and right.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common contiguous block of `a` and `b` as `(start_a, start_b, len)`.
/// Earlier occurrences win ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                let len = prev[j] + 1;
                cur[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        prev = cur;
    }

    best
}

/// Order candidates by title similarity to `title`, best first. The sort is
/// stable, so candidates with equal scores keep their retrieval order.
pub fn rank_by_title(title: &str, candidates: Vec<PlexTrack>) -> Vec<PlexTrack> {
    let mut scored: Vec<(f64, PlexTrack)> = candidates
        .into_iter()
        .map(|candidate| (similarity_ratio(title, &candidate.title), candidate))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

/// The primary artist of a local track: the first comma-separated segment of
/// its artist string.
pub fn primary_artist(artist: &str) -> &str {
    artist.split(',').next().unwrap_or(artist)
}

/// Artist confirmation rule: the first ranked candidate whose artist of
/// record contains the local primary artist as a case-sensitive substring.
pub fn confirm_by_artist<'a>(
    local_artist: &str,
    ranked: &'a [PlexTrack],
) -> Option<&'a PlexTrack> {
    let primary = primary_artist(local_artist);
    ranked
        .iter()
        .find(|candidate| candidate.artist_of_record().contains(primary))
}

/// Cardinality of a retrieved candidate set, before any scoring happens.
#[derive(Debug)]
pub enum MatchState {
    NoCandidates,
    SingleCandidate(PlexTrack),
    MultipleCandidates(Vec<PlexTrack>),
}

pub fn classify(candidates: Vec<PlexTrack>) -> MatchState {
    let mut candidates = candidates;
    match candidates.len() {
        0 => MatchState::NoCandidates,
        1 => MatchState::SingleCandidate(candidates.remove(0)),
        _ => MatchState::MultipleCandidates(candidates),
    }
}

/// Terminal result of match selection.
#[derive(Debug)]
pub enum MatchOutcome {
    Resolved(PlexTrack),
    Unresolved,
}

impl MatchOutcome {
    pub fn into_track(self) -> Option<PlexTrack> {
        match self {
            MatchOutcome::Resolved(track) => Some(track),
            MatchOutcome::Unresolved => None,
        }
    }
}

/// Non-interactive match selection.
///
/// A single candidate resolves immediately without scoring. Multiple
/// candidates are ranked by title similarity and filtered through the artist
/// confirmation rule; when no ranked candidate passes the rule the match is
/// unresolved rather than falling back to the top-ranked candidate.
pub fn resolve_automatic(query: &TrackQuery, candidates: Vec<PlexTrack>) -> MatchOutcome {
    match classify(candidates) {
        MatchState::NoCandidates => MatchOutcome::Unresolved,
        MatchState::SingleCandidate(track) => MatchOutcome::Resolved(track),
        MatchState::MultipleCandidates(candidates) => {
            let ranked = rank_by_title(&query.title, candidates);
            match confirm_by_artist(&query.artist, &ranked) {
                Some(track) => MatchOutcome::Resolved(track.clone()),
                None => MatchOutcome::Unresolved,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, original_title: Option<&str>, album_artist: &str) -> PlexTrack {
        PlexTrack {
            rating_key: "1".to_string(),
            title: title.to_string(),
            grandparent_title: Some(album_artist.to_string()),
            original_title: original_title.map(|s| s.to_string()),
            ..PlexTrack::default()
        }
    }

    fn query(title: &str, artist: &str) -> TrackQuery {
        TrackQuery {
            title: title.to_string(),
            album: String::new(),
            artist: artist.to_string(),
        }
    }

    #[test]
    fn ratio_of_identical_strings_is_one() {
        assert_eq!(similarity_ratio("Chura Liya", "Chura Liya"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn ratio_of_disjoint_strings_is_zero() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn ratio_matches_sequence_alignment_definition() {
        // "abcd" vs "bcde": matching block "bcd", 2 * 3 / 8
        assert!((similarity_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        // Earliest-block tie breaking: the "abba" block pairs with the start
        // of the second string, leaving nothing matchable on either side.
        assert!((similarity_ratio("abcabba", "abbabba") - 8.0 / 14.0).abs() < 1e-9);
        assert!((similarity_ratio("Song", "song") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn ratio_is_case_sensitive() {
        assert!(similarity_ratio("Song", "song") < 1.0);
    }

    #[test]
    fn ranking_puts_closest_title_first_regardless_of_input_order() {
        let exact = candidate("Chura Liya Hai Tumne", None, "a");
        let remix = candidate("Chura Liya Hai Tumne (Remix)", None, "b");

        let ranked = rank_by_title(
            "Chura Liya Hai Tumne",
            vec![remix.clone(), exact.clone()],
        );
        assert_eq!(ranked[0].title, exact.title);

        let ranked = rank_by_title("Chura Liya Hai Tumne", vec![exact.clone(), remix]);
        assert_eq!(ranked[0].title, exact.title);
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let first = candidate("Song", None, "a");
        let second = candidate("Song", None, "b");

        let ranked = rank_by_title("Song", vec![first, second]);
        assert_eq!(ranked[0].grandparent_title.as_deref(), Some("a"));
        assert_eq!(ranked[1].grandparent_title.as_deref(), Some("b"));
    }

    #[test]
    fn primary_artist_is_first_comma_segment() {
        assert_eq!(primary_artist("Asha Bhosle, Mohammed Rafi"), "Asha Bhosle");
        assert_eq!(primary_artist("Queen"), "Queen");
    }

    #[test]
    fn single_candidate_resolves_without_scoring() {
        let track = candidate("Some Other Title Entirely", None, "Nobody");
        let outcome = resolve_automatic(&query("Bohemian Rhapsody", "Queen"), vec![track]);
        match outcome {
            MatchOutcome::Resolved(t) => assert_eq!(t.title, "Some Other Title Entirely"),
            MatchOutcome::Unresolved => panic!("single candidate must resolve"),
        }
    }

    #[test]
    fn empty_candidate_set_is_unresolved() {
        let outcome = resolve_automatic(&query("Bohemian Rhapsody", "Queen"), vec![]);
        assert!(outcome.into_track().is_none());
    }

    #[test]
    fn artist_rule_selects_by_substring_not_rank() {
        let ranked = vec![
            candidate("x", Some("Artist A"), ""),
            candidate("x", Some("Artist B and Artist C"), ""),
        ];

        let selected = confirm_by_artist("Artist B, Artist D", &ranked).unwrap();
        assert_eq!(selected.original_title.as_deref(), Some("Artist B and Artist C"));
    }

    #[test]
    fn artist_rule_overrides_similarity_rank() {
        // The exact-title candidate ranks first on similarity, but its artist
        // does not contain the local primary artist; the remix does.
        let exact = candidate("Chura Liya Hai Tumne", Some("Mohammed Rafi"), "R.D. Burman");
        let remix = candidate(
            "Chura Liya Hai Tumne (Remix)",
            Some("Asha Bhosle"),
            "R.D. Burman",
        );

        let outcome = resolve_automatic(
            &query("Chura Liya Hai Tumne", "Asha Bhosle, Mohammed Rafi"),
            vec![exact, remix],
        );

        match outcome {
            MatchOutcome::Resolved(track) => {
                assert_eq!(track.title, "Chura Liya Hai Tumne (Remix)")
            }
            MatchOutcome::Unresolved => panic!("artist rule should have matched the remix"),
        }
    }

    #[test]
    fn no_artist_match_yields_unresolved_without_fallback() {
        let candidates = vec![
            candidate("Song", Some("Artist A"), ""),
            candidate("Song (Live)", Some("Artist B"), ""),
        ];

        let outcome = resolve_automatic(&query("Song", "Artist C"), candidates);
        assert!(outcome.into_track().is_none());
    }

    #[test]
    fn artist_rule_falls_back_to_album_artist_credit() {
        let mut track = candidate("Song", None, "Queen");
        track.original_title = None;
        let ranked = vec![candidate("Song", Some("Somebody Else"), ""), track];

        let selected = confirm_by_artist("Queen", &ranked).unwrap();
        assert_eq!(selected.grandparent_title.as_deref(), Some("Queen"));
    }
}
