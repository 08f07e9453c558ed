//! Final video naming.

use std::path::{Path, PathBuf};
use storyreel_core::RunId;

/// Longest title fragment kept in a derived filename, in characters.
const MAX_TITLE_CHARS: usize = 50;

/// Stem used when nothing of the title survives sanitising.
const FALLBACK_STEM: &str = "video";

/// Derive the final video filename from a script title and run id.
///
/// Keeps alphanumeric characters, spaces, hyphens and underscores, turns
/// each space into `_`, keeps the first 50 characters, and appends
/// `_{run_id}.mp4`. Other characters are dropped, never substituted.
///
/// # Examples
///
/// ```
/// use storyreel_core::RunId;
/// use storyreel_pipeline::derive_output_filename;
///
/// let run_id = RunId::new("20261019_140509");
/// assert_eq!(
///     derive_output_filename("How Rainbows Form!", &run_id),
///     "How_Rainbows_Form_20261019_140509.mp4"
/// );
/// assert_eq!(derive_output_filename("???", &run_id), "video_20261019_140509.mp4");
/// ```
pub fn derive_output_filename(title: &str, run_id: &RunId) -> String {
    let safe_title: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(MAX_TITLE_CHARS)
        .collect();

    let stem = if safe_title.is_empty() {
        FALLBACK_STEM
    } else {
        safe_title.as_str()
    };
    format!("{}_{}.mp4", stem, run_id)
}

/// Join `filename` onto `dir`, never pointing at an existing file.
///
/// When the plain path is taken, `-2`, `-3`, … are appended to the stem
/// until a free path is found.
pub fn resolve_output_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    (2u32..)
        .map(|n| {
            let file = match &extension {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            };
            dir.join(file)
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_id() -> RunId {
        RunId::new("20260101_120000")
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let first = derive_output_filename("Mars: the Red Planet?", &run_id());
        let second = derive_output_filename("Mars: the Red Planet?", &run_id());
        assert_eq!(first, second);
        assert_eq!(first, "Mars_the_Red_Planet_20260101_120000.mp4");
    }

    #[test]
    fn test_special_characters_are_stripped_not_substituted() {
        let name = derive_output_filename("a/b\\c.d—e'f\"g", &run_id());
        assert_eq!(name, "abcdefg_20260101_120000.mp4");
    }

    #[test]
    fn test_hyphens_underscores_and_unicode_letters_survive() {
        let name = derive_output_filename("Café – old_town tour", &run_id());
        assert_eq!(name, "Café__old_town_tour_20260101_120000.mp4");
    }

    #[test]
    fn test_truncates_to_fifty_characters() {
        let title = "x".repeat(80);
        let name = derive_output_filename(&title, &run_id());
        assert_eq!(name, format!("{}_20260101_120000.mp4", "x".repeat(50)));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let title = "é".repeat(60);
        let name = derive_output_filename(&title, &run_id());
        assert!(name.starts_with(&"é".repeat(50)));
        assert!(!name.starts_with(&"é".repeat(51)));
    }

    #[test]
    fn test_collisions_get_numeric_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = resolve_output_path(dir.path(), "clip_1.mp4");
        assert_eq!(first, dir.path().join("clip_1.mp4"));

        std::fs::write(&first, b"taken").unwrap();
        let second = resolve_output_path(dir.path(), "clip_1.mp4");
        assert_eq!(second, dir.path().join("clip_1-2.mp4"));

        std::fs::write(&second, b"taken").unwrap();
        assert_eq!(
            resolve_output_path(dir.path(), "clip_1.mp4"),
            dir.path().join("clip_1-3.mp4")
        );
    }
}
