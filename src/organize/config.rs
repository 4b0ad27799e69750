//! Configuration for media sorting.

use std::path::PathBuf;
use std::{fmt, fs};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;

const DEFAULT_VIDEO_EXTENSIONS: [&str; 7] = ["mkv", "mp4", "avi", "m4v", "mov", "wmv", "m2ts"];
const DEFAULT_SIDECAR_EXTENSIONS: [&str; 7] = ["srt", "ass", "ssa", "vtt", "sub", "idx", "nfo"];
const DEFAULT_IGNORE_DIRS: [&str; 4] = ["bonus_features", ".git", "__pycache__", "reports"];
const DEFAULT_BONUS_DIR: &str = "bonus_features";
const DEFAULT_REPORT_FILE: &str = "media_sort_plan.csv";
const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Where planned files end up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Rename each file inside its current directory.
    #[default]
    InPlace,
    /// Move movies into `Title (Year)/` and episodes into `Show/Season NN/` under the destination.
    Library,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InPlace => write!(f, "in-place"),
            Self::Library => write!(f, "library"),
        }
    }
}

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct MediaSortConfig {
    #[serde(default)]
    pub auto: bool,
    #[serde(default)]
    pub auto_unlock: bool,
    #[serde(default)]
    pub bonus_dir: Option<String>,
    #[serde(default)]
    pub bucket: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default)]
    pub extra_junk: Vec<String>,
    #[serde(default)]
    pub ignore_dirs: Vec<String>,
    #[serde(default)]
    pub keep_words: Vec<String>,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub max_attempts: Option<usize>,
    #[serde(default)]
    pub report: Option<PathBuf>,
    #[serde(default)]
    pub show_name: Option<String>,
    #[serde(default)]
    pub sidecar_extensions: Vec<String>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub video_extensions: Vec<String>,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    mediasort: MediaSortConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub auto: bool,
    pub auto_unlock: bool,
    /// Lowercase name of the bonus content directory allowed inside a movie folder.
    pub bonus_dir: String,
    pub bucket_by_letter: bool,
    pub debug: bool,
    pub destination: Option<PathBuf>,
    pub dryrun: bool,
    pub extra_junk: Vec<String>,
    /// Lowercase directory names that are never scanned.
    pub ignore_dirs: Vec<String>,
    pub keep_words: Vec<String>,
    pub layout: Layout,
    /// Decisions the non-interactive policy makes for one failing action before skipping it.
    pub max_attempts: usize,
    pub report: PathBuf,
    pub show_name: Option<String>,
    /// Lowercase extensions without the leading dot.
    pub sidecar_extensions: Vec<String>,
    pub verbose: bool,
    /// Lowercase extensions without the leading dot.
    pub video_extensions: Vec<String>,
}

impl MediaSortConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = crate::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.mediasort)
            .with_context(|| "Failed to parse config TOML")
    }
}

impl SortConfig {
    /// Combine the user config file section with the built-in defaults.
    #[must_use]
    pub fn from_user_config(user_config: MediaSortConfig) -> Self {
        let defaults = Self::default();
        Self {
            auto: user_config.auto,
            auto_unlock: user_config.auto_unlock,
            bonus_dir: user_config
                .bonus_dir
                .map_or(defaults.bonus_dir, |name| name.trim().to_lowercase()),
            bucket_by_letter: user_config.bucket,
            debug: user_config.debug,
            destination: user_config.destination,
            dryrun: user_config.dryrun,
            extra_junk: normalize_words(user_config.extra_junk),
            ignore_dirs: merge_lowercase(defaults.ignore_dirs, user_config.ignore_dirs),
            keep_words: normalize_words(user_config.keep_words),
            layout: user_config.layout.unwrap_or_default(),
            max_attempts: user_config.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            report: user_config.report.unwrap_or(defaults.report),
            show_name: user_config.show_name.filter(|name| !name.trim().is_empty()),
            sidecar_extensions: merge_extensions(defaults.sidecar_extensions, user_config.sidecar_extensions),
            verbose: user_config.verbose,
            video_extensions: merge_extensions(defaults.video_extensions, user_config.video_extensions),
        }
    }

    /// Add extra values on top of the existing lists, keeping them unique.
    pub fn extend_lists(&mut self, extra_junk: Vec<String>, keep_words: Vec<String>, ignore_dirs: Vec<String>) {
        self.extra_junk = normalize_words(std::mem::take(&mut self.extra_junk).into_iter().chain(extra_junk).collect());
        self.keep_words = normalize_words(std::mem::take(&mut self.keep_words).into_iter().chain(keep_words).collect());
        self.ignore_dirs = merge_lowercase(std::mem::take(&mut self.ignore_dirs), ignore_dirs);
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            auto: false,
            auto_unlock: false,
            bonus_dir: DEFAULT_BONUS_DIR.to_string(),
            bucket_by_letter: false,
            debug: false,
            destination: None,
            dryrun: false,
            extra_junk: Vec::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(ToString::to_string).collect(),
            keep_words: Vec::new(),
            layout: Layout::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            report: PathBuf::from(DEFAULT_REPORT_FILE),
            show_name: None,
            sidecar_extensions: DEFAULT_SIDECAR_EXTENSIONS.iter().map(ToString::to_string).collect(),
            verbose: false,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl fmt::Display for SortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  auto:        {}", crate::colorize_bool(self.auto))?;
        writeln!(f, "  auto unlock: {}", crate::colorize_bool(self.auto_unlock))?;
        writeln!(f, "  bucket:      {}", crate::colorize_bool(self.bucket_by_letter))?;
        writeln!(f, "  debug:       {}", crate::colorize_bool(self.debug))?;
        writeln!(f, "  dryrun:      {}", crate::colorize_bool(self.dryrun))?;
        writeln!(f, "  verbose:     {}", crate::colorize_bool(self.verbose))?;
        writeln!(f, "  layout:      {}", self.layout)?;
        writeln!(
            f,
            "  destination: \"{}\"",
            self.destination
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default()
        )?;
        writeln!(f, "  show name:   \"{}\"", self.show_name.as_deref().unwrap_or_default())?;
        writeln!(f, "  report:      {}", self.report.display())?;
        writeln!(f, "  bonus dir:   {}", self.bonus_dir)?;
        writeln!(f, "  ignore:      [{}]", self.ignore_dirs.iter().join(", "))?;
        writeln!(f, "  videos:      [{}]", self.video_extensions.iter().join(", "))?;
        writeln!(f, "  sidecars:    [{}]", self.sidecar_extensions.iter().join(", "))?;
        writeln!(f, "  extra junk:  [{}]", self.extra_junk.iter().join(", "))?;
        write!(f, "  keep words:  [{}]", self.keep_words.iter().join(", "))
    }
}

fn normalize_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .unique()
        .collect()
}

fn merge_lowercase(defaults: Vec<String>, extra: Vec<String>) -> Vec<String> {
    normalize_words(defaults.into_iter().chain(extra).collect())
}

fn merge_extensions(defaults: Vec<String>, extra: Vec<String>) -> Vec<String> {
    defaults
        .into_iter()
        .chain(extra)
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unique()
        .collect()
}
