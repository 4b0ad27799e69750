use std::path::{Path, PathBuf};

use crate::organize::{Identity, Layout, Lexicon, MediaKind, SortConfig};

/// Characters that are not allowed in file names on common filesystems.
const FORBIDDEN_CHARACTERS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maps identities to canonical file and directory names.
#[derive(Debug, Clone)]
pub struct DestinationNamer<'a> {
    lexicon: &'a Lexicon,
    layout: Layout,
    bucket_by_letter: bool,
    library_root: PathBuf,
}

impl<'a> DestinationNamer<'a> {
    /// Library destinations go under the configured destination or the scan root.
    #[must_use]
    pub fn new(lexicon: &'a Lexicon, config: &SortConfig, scan_root: &Path) -> Self {
        Self {
            lexicon,
            layout: config.layout,
            bucket_by_letter: config.bucket_by_letter,
            library_root: config
                .destination
                .clone()
                .unwrap_or_else(|| scan_root.to_path_buf()),
        }
    }

    /// Canonical name without extension.
    ///
    /// ```not_rust
    /// The Matrix (1999)
    /// Show Name - S01E02 - Some Title
    /// ```
    #[must_use]
    pub fn base_name(&self, identity: &Identity) -> String {
        let name = match (identity.kind(), identity.season, identity.episode) {
            (MediaKind::Episode, Some(season), Some(episode)) => {
                let show = identity.show.as_deref().unwrap_or_default();
                let tag = format!("S{season:02}E{episode:02}");
                if identity.title.trim().is_empty() {
                    format!("{show} - {tag}")
                } else {
                    format!("{show} - {tag} - {}", identity.title.trim())
                }
            }
            _ => identity.year.map_or_else(
                || identity.title.clone(),
                |year| format!("{} ({year})", identity.title),
            ),
        };
        sanitize(&name)
    }

    /// Video file name with exactly one media extension.
    ///
    /// A base that already ends in a known video extension has it removed first,
    /// and the source extension is appended in lowercase.
    #[must_use]
    pub fn video_file_name(&self, base: &str, source: &Path) -> String {
        let mut base = base.trim().to_string();
        let lower = base.to_lowercase();
        if let Some(extension) = self
            .lexicon
            .video_extensions()
            .find(|extension| lower.ends_with(&format!(".{extension}")))
        {
            base.truncate(base.len() - extension.len() - 1);
            base = base.trim_end_matches([' ', '.', '-', '_']).to_string();
        }
        let extension = crate::path_to_file_extension_string(source);
        if extension.is_empty() {
            base
        } else {
            format!("{base}.{extension}")
        }
    }

    /// Sidecar name that keeps everything after the video stem verbatim.
    ///
    /// `Movie.eng.srt` next to `Movie.mkv` becomes `<base>.eng.srt`.
    #[must_use]
    pub fn sidecar_file_name(base: &str, video_stem: &str, sidecar: &Path) -> Option<String> {
        let name = crate::path_to_filename_string(sidecar);
        let tail = name.strip_prefix(video_stem)?;
        Some(format!("{base}{tail}"))
    }

    /// Directory where the files of the identity belong.
    ///
    /// In-place layout keeps the current directory.
    /// Library layout puts movies in `[Letter/]Title (Year)` and episodes in `Show/Season NN`.
    #[must_use]
    pub fn identity_directory(&self, identity: &Identity, current_dir: &Path) -> PathBuf {
        match self.layout {
            Layout::InPlace => current_dir.to_path_buf(),
            Layout::Library => match (identity.kind(), identity.season) {
                (MediaKind::Episode, Some(season)) => {
                    let show = sanitize(identity.show.as_deref().unwrap_or_default());
                    self.library_root.join(show).join(season_folder_name(season))
                }
                _ => self.movie_directory(identity),
            },
        }
    }

    /// Library folder for a movie. Used for both created and moved folders.
    #[must_use]
    pub fn movie_directory(&self, identity: &Identity) -> PathBuf {
        let base = self.base_name(identity);
        if self.bucket_by_letter {
            self.library_root.join(bucket_letter(&base)).join(base)
        } else {
            self.library_root.join(base)
        }
    }
}

/// Season folder name such as `Season 02`.
#[must_use]
pub fn season_folder_name(season: u32) -> String {
    format!("Season {season:02}")
}

/// First letter for alphabetical buckets. Digits go to `#`, everything else to `_`.
#[must_use]
pub fn bucket_letter(name: &str) -> String {
    for character in crate::strip_diacritics(name).chars() {
        if character.is_alphabetic() {
            return character.to_uppercase().to_string();
        }
        if character.is_ascii_digit() {
            return "#".to_string();
        }
    }
    "_".to_string()
}

/// Remove characters that are invalid in file names and tidy whitespace.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !FORBIDDEN_CHARACTERS.contains(c))
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ' '])
        .to_string()
}
