use color_eyre::eyre::{Result, WrapErr};
use regex::Regex;

use crate::entities;

/// Textual metadata of a local track, as fed to candidate retrieval.
///
/// An empty `album` means "no album constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub title: String,
    pub album: String,
    pub artist: String,
}

impl TrackQuery {
    pub fn from_model(model: &entities::track::Model) -> Self {
        Self {
            title: model.title.clone(),
            album: model.album.clone(),
            artist: model.artist.clone(),
        }
    }
}

/// Split a soundtrack annotation off a track title.
///
/// Titles like `Chura Liya Hai Tumne (From "Yaadon Ki Baaraat")` carry the
/// album inside the annotation. Returns the bare title and the quoted album,
/// or the original title and an empty album when no annotation is present.
pub fn split_title_annotation(title: &str) -> Result<(String, String)> {
    if !title.contains("(From \"") && !title.contains("[From \"") {
        return Ok((title.to_string(), String::new()));
    }

    let annotation =
        Regex::new(r#"\(From [^)]*\)|\[From [^\]]*\]"#).wrap_err("Failed to create regex")?;
    let quoted = Regex::new(r#""([^"]+)""#).wrap_err("Failed to create regex")?;

    let bare = annotation.replace_all(title, "").trim().to_string();
    let album = quoted
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Ok((bare, album))
}

/// Strip soundtrack boilerplate from an album name.
pub fn clean_album_name(album: &str) -> Result<String> {
    let stripped = album
        .replace("(Original Motion Picture Soundtrack)", "")
        .replace("- Hindi", "");
    let stripped = stripped.trim();

    if !stripped.contains("(From \"") && !stripped.contains("[From \"") {
        return Ok(stripped.to_string());
    }

    let quoted = Regex::new(r#""([^"]+)""#).wrap_err("Failed to create regex")?;
    Ok(quoted
        .captures(stripped)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| stripped.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_title_passes_through() {
        let (title, album) = split_title_annotation("Bohemian Rhapsody").unwrap();
        assert_eq!(title, "Bohemian Rhapsody");
        assert_eq!(album, "");
    }

    #[test]
    fn from_annotation_yields_album() {
        let (title, album) =
            split_title_annotation("Chura Liya Hai Tumne (From \"Yaadon Ki Baaraat\")").unwrap();
        assert_eq!(title, "Chura Liya Hai Tumne");
        assert_eq!(album, "Yaadon Ki Baaraat");
    }

    #[test]
    fn bracketed_annotation_yields_album() {
        let (title, album) = split_title_annotation("Tum Hi Ho [From \"Aashiqui 2\"]").unwrap();
        assert_eq!(title, "Tum Hi Ho");
        assert_eq!(album, "Aashiqui 2");
    }

    #[test]
    fn clean_album_strips_soundtrack_boilerplate() {
        assert_eq!(
            clean_album_name("Rockstar (Original Motion Picture Soundtrack)").unwrap(),
            "Rockstar"
        );
        assert_eq!(clean_album_name("Kabir Singh - Hindi").unwrap(), "Kabir Singh");
        assert_eq!(
            clean_album_name("(From \"Yaadon Ki Baaraat\")").unwrap(),
            "Yaadon Ki Baaraat"
        );
        assert_eq!(clean_album_name("A Night at the Opera").unwrap(), "A Night at the Opera");
    }
}
