//! Import local audio files into the track catalog by reading their tags.

use std::path::Path;

use color_eyre::Result;

use crate::database::Database;

pub const SUPPORTED_FILE_TYPES: &[&str] = &["mp3", "flac", "m4a", "aac", "ogg", "wav"];

#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("Failed to read tags from {path}: {message}")]
    TagRead { path: String, message: String },

    #[error("File path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    #[error("Database error during {operation}: {error_message}")]
    Database {
        operation: String,
        error_message: String,
    },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    pub errors: usize,
}

/// Import a single audio file: read its tags and upsert a catalog record
/// keyed by file path. Returns whether the record was newly created.
pub async fn import_file(file_path: &Path, database: &Database) -> Result<bool, ImportError> {
    let extension = file_path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !SUPPORTED_FILE_TYPES.contains(&extension) {
        return Err(ImportError::UnsupportedFileType {
            extension: extension.to_string(),
        });
    }

    let path_str = file_path
        .to_str()
        .ok_or_else(|| ImportError::NonUtf8Path {
            path: file_path.display().to_string(),
        })?;

    log::debug!("Reading tags from: {}", path_str);
    let tag = audiotags::Tag::new()
        .read_from_path(file_path)
        .map_err(|e| ImportError::TagRead {
            path: path_str.to_string(),
            message: e.to_string(),
        })?;

    // Missing tags degrade to the file stem for the title and empty strings
    // elsewhere; an empty album means title-only retrieval later.
    let title = tag
        .title()
        .map(str::to_string)
        .or_else(|| {
            file_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();
    let album = tag.album_title().unwrap_or_default().to_string();
    let artist = tag.artist().unwrap_or_default().to_string();

    let (track, created) = database
        .upsert_imported(&title, &album, &artist, path_str)
        .await
        .map_err(|e| ImportError::Database {
            operation: format!("upsert track: {}", title),
            error_message: e.to_string(),
        })?;

    log::info!(
        "{} track: '{}' by '{}' ({})",
        if created { "Imported" } else { "Updated" },
        track.title,
        track.artist,
        path_str
    );

    Ok(created)
}

/// Import every supported audio file under `path` (a file or a directory).
/// Per-file failures are logged and counted; the walk never aborts.
pub async fn import_path(path: &Path, database: &Database) -> Result<ImportReport> {
    log::debug!("Starting import from: {}", path.display());

    let mut report = ImportReport::default();

    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && SUPPORTED_FILE_TYPES
                    .contains(&e.path().extension().and_then(|e| e.to_str()).unwrap_or(""))
        })
    {
        match import_file(entry.path(), database).await {
            Ok(true) => report.imported += 1,
            Ok(false) => report.updated += 1,
            Err(e) => {
                report.errors += 1;
                log::warn!("Error importing {}: {}", entry.path().display(), e);
            }
        }
    }

    log::info!(
        "Import complete: {} new, {} updated, {} errors",
        report.imported,
        report.updated,
        report.errors
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    #[tokio::test]
    async fn rejects_unsupported_extensions() {
        let db = test_db().await;
        let err = import_file(Path::new("/m/notes.txt"), &db).await.unwrap_err();
        assert!(matches!(
            err,
            ImportError::UnsupportedFileType { extension } if extension == "txt"
        ));
    }

    #[tokio::test]
    async fn walk_skips_non_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let db = test_db().await;
        let report = import_path(dir.path(), &db).await.unwrap();
        assert_eq!(report, ImportReport::default());
    }

    #[tokio::test]
    async fn unreadable_audio_file_is_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.mp3"), b"not really audio").unwrap();

        let db = test_db().await;
        let report = import_path(dir.path(), &db).await.unwrap();
        assert_eq!(report.errors, 1);
        assert_eq!(report.imported, 0);
    }
}
