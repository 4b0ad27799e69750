use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use walkdir::WalkDir;

use crate::organize::{Lexicon, SortConfig};

/// Gather all video files under `root`, sorted case-insensitively and deduplicated.
///
/// Hidden directories and directories named in the ignore list are not entered.
/// A single video file given as root is returned as is.
#[must_use]
pub fn collect_candidates(root: &Path, config: &SortConfig, lexicon: &Lexicon) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_video(root, lexicon) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && (crate::is_hidden(entry) || is_ignored_name(entry.path(), config)))
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && !crate::is_hidden(entry))
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_video(path, lexicon))
        .sorted_by_key(|path| crate::path_to_string(path).to_lowercase())
        .dedup()
        .collect()
}

/// True if any directory between `root` and the file is on the ignore list.
#[must_use]
pub fn is_ignored_path(path: &Path, root: &Path, config: &SortConfig) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .any(|component| {
            let name = crate::os_str_to_string(component.as_os_str()).to_lowercase();
            config.ignore_dirs.contains(&name)
        })
}

/// Sidecar files belonging to `video`, sorted by name.
///
/// A sidecar starts with the video stem followed by a dot and ends with a known sidecar extension.
/// When several videos in the directory match, the one with the longest stem gets the sidecar.
#[must_use]
pub fn find_sidecars(video: &Path, lexicon: &Lexicon) -> Vec<PathBuf> {
    let Some(parent) = video.parent() else {
        return Vec::new();
    };
    let Ok(entries) = fs::read_dir(parent) else {
        return Vec::new();
    };

    let files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
        .map(|entry| entry.path())
        .collect();

    let video_stems: Vec<String> = files
        .iter()
        .filter(|path| is_video(path, lexicon))
        .map(|path| crate::path_to_file_stem_string(path))
        .collect();

    let stem = crate::path_to_file_stem_string(video);
    files
        .into_iter()
        .filter(|path| path != video)
        .filter(|path| lexicon.is_sidecar_extension(&crate::path_to_file_extension_string(path)))
        .filter(|path| {
            let name = crate::path_to_filename_string(path);
            matching_stem(&name, &video_stems).is_some_and(|best| best == stem)
        })
        .sorted_by_key(|path| crate::path_to_filename_string(path).to_lowercase())
        .collect()
}

/// Longest video stem that the sidecar name starts with.
fn matching_stem<'a>(name: &str, video_stems: &'a [String]) -> Option<&'a str> {
    video_stems
        .iter()
        .filter(|stem| {
            name.strip_prefix(stem.as_str())
                .is_some_and(|tail| tail.starts_with('.'))
        })
        .max_by_key(|stem| stem.len())
        .map(String::as_str)
}

fn is_video(path: &Path, lexicon: &Lexicon) -> bool {
    lexicon.is_video_extension(&crate::path_to_file_extension_string(path))
}

fn is_ignored_name(path: &Path, config: &SortConfig) -> bool {
    let name = crate::path_to_filename_string(path).to_lowercase();
    config.ignore_dirs.contains(&name)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn collects_videos_and_skips_ignored_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.mkv"));
        touch(&root.join("A.mp4"));
        touch(&root.join("notes.txt"));
        touch(&root.join("movie.srt"));
        touch(&root.join("Sub/c.AVI"));
        touch(&root.join("Sub/bonus_features/extra.mkv"));
        touch(&root.join(".hidden/secret.mkv"));
        touch(&root.join("Reports/report.mkv"));

        let config = SortConfig::default();
        let lexicon = Lexicon::from_config(&config).unwrap();
        let candidates = collect_candidates(root, &config, &lexicon);

        assert_eq!(
            candidates,
            vec![root.join("A.mp4"), root.join("b.mkv"), root.join("Sub/c.AVI")]
        );
    }

    #[test]
    fn single_file_root() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("Movie.1999.mkv");
        touch(&video);
        let config = SortConfig::default();
        let lexicon = Lexicon::from_config(&config).unwrap();
        assert_eq!(collect_candidates(&video, &config, &lexicon), vec![video]);
    }

    #[test]
    fn ignored_path_checks_every_parent() {
        let config = SortConfig::default();
        let root = Path::new("/media");
        assert!(is_ignored_path(Path::new("/media/x/Bonus_Features/a.mkv"), root, &config));
        assert!(!is_ignored_path(Path::new("/media/x/a.mkv"), root, &config));
        assert!(!is_ignored_path(Path::new("/media/reports.mkv"), root, &config));
    }

    #[test]
    fn sidecars_match_by_stem_and_extension() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Movie.mkv"));
        touch(&root.join("Movie.eng.srt"));
        touch(&root.join("Movie.nfo"));
        touch(&root.join("Movie.txt"));
        touch(&root.join("Movies.srt"));
        touch(&root.join("Other.srt"));

        let lexicon = Lexicon::standard().unwrap();
        let sidecars = find_sidecars(&root.join("Movie.mkv"), &lexicon);
        assert_eq!(sidecars, vec![root.join("Movie.eng.srt"), root.join("Movie.nfo")]);
    }

    #[test]
    fn longest_video_stem_claims_the_sidecar() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Show.S01E01.mkv"));
        touch(&root.join("Show.S01E01.Extended.mkv"));
        touch(&root.join("Show.S01E01.srt"));
        touch(&root.join("Show.S01E01.Extended.srt"));

        let lexicon = Lexicon::standard().unwrap();
        assert_eq!(
            find_sidecars(&root.join("Show.S01E01.mkv"), &lexicon),
            vec![root.join("Show.S01E01.srt")]
        );
        assert_eq!(
            find_sidecars(&root.join("Show.S01E01.Extended.mkv"), &lexicon),
            vec![root.join("Show.S01E01.Extended.srt")]
        );
    }
}
