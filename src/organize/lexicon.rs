//! Immutable word lists and patterns used for tokenizing and classifying filenames.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Datelike;
use regex::Regex;

use crate::organize::SortConfig;

/// Release and technical metadata words.
const JUNK_WORDS: &[&str] = &[
    // streaming services
    "nf", "netflix", "amzn", "amazon", "prime", "hulu", "dsnp", "disney", "itunes", "atvp", "hmax", "hbo", "hbomax",
    "max", "pcok", "pmtp", "stan", "crav",
    // release sources
    "web", "webdl", "webrip", "hdtv", "pdtv", "dvdrip", "bdrip", "brrip", "bluray", "remux", "hdrip", "dvd", "bd",
    // resolution and quality
    "uhd", "hd", "sd", "4k", "2160p", "1440p", "1080p", "1080i", "720p", "576p", "480p", "360p",
    // video codecs
    "x264", "x265", "h264", "h265", "h266", "hevc", "avc", "av1", "xvid", "divx", "vp9", "10bit", "8bit",
    // dynamic range
    "hdr", "hdr10", "hdr10plus", "dv", "dovi", "dolbyvision", "sdr",
    // audio
    "aac", "ac3", "eac3", "dd", "ddp", "dts", "dtshd", "truehd", "atmos", "flac", "opus", "mp3",
    // release flags
    "complete", "repack", "proper", "extended", "unrated", "internal", "dubbed", "subbed", "subs", "multi",
    "readnfo", "nfo",
    // cam, telesync and screener variants
    "cam", "hdcam", "ts", "hdts", "tc", "hdtc", "scr", "screener", "dvdscr", "r5",
];

/// Scene group and tracker names that survive the other rules.
const GROUP_LITERALS: &[&str] = &[
    "nhtfs", "tgx", "tggx", "ntb", "yts", "ettv", "ion10", "rarbg", "eztv", "yify", "galaxyrg",
];

/// Short words that look like release tags but are ordinary title words.
const KEEP_SHORT_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to", "with", "new", "old",
    "bad", "big", "war", "man", "mr", "ms", "dr", "vs", "pt", "part", "my", "i", "ii", "iii", "iv", "v", "vi", "vii",
    "viii", "ix", "x", "xi", "xii", "mrs", "st", "jr", "sr",
];

/// Shared tables for the tokenizer, classifier and identity builder.
///
/// Built once per run and only ever borrowed.
#[derive(Debug)]
pub struct Lexicon {
    pub(crate) current_year: i32,
    junk_words: HashSet<String>,
    group_literals: HashSet<String>,
    keep_words: HashSet<String>,
    video_extensions: HashSet<String>,
    sidecar_extensions: HashSet<String>,
    pub(crate) re_codec_split: Regex,
    pub(crate) re_audio_channels: Regex,
    pub(crate) re_web_source: Regex,
    pub(crate) re_brackets: Regex,
    pub(crate) re_separators: Regex,
    pub(crate) re_whitespace: Regex,
    pub(crate) re_season_episode: Regex,
    pub(crate) re_cross_episode: Regex,
    pub(crate) re_audio_token: Regex,
    pub(crate) re_year: Regex,
    pub(crate) re_roman_numeral: Regex,
    pub(crate) re_episode_in_text: Regex,
    pub(crate) re_season_dir: Regex,
}

impl Lexicon {
    /// Build the tables with the user's extra words and extensions merged in.
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn from_config(config: &SortConfig) -> Result<Self> {
        let junk_words = JUNK_WORDS
            .iter()
            .map(ToString::to_string)
            .chain(config.extra_junk.iter().map(|word| word.to_lowercase()))
            .chain(config.video_extensions.iter().cloned())
            .collect();

        let keep_words = KEEP_SHORT_WORDS
            .iter()
            .map(ToString::to_string)
            .chain(config.keep_words.iter().map(|word| word.to_lowercase()))
            .collect();

        Ok(Self {
            current_year: chrono::Local::now().year(),
            junk_words,
            group_literals: GROUP_LITERALS.iter().map(ToString::to_string).collect(),
            keep_words,
            video_extensions: config.video_extensions.iter().cloned().collect(),
            sidecar_extensions: config.sidecar_extensions.iter().cloned().collect(),
            re_codec_split: compile(r"(?i)\b([hx])[\s._-]*(26[456])\b", "codec split")?,
            re_audio_channels: compile(
                r"(?i)\b((?:ddp?|e?ac3|aac|dts|truehd|flac|opus)\d)[.\s_-](\d)\b",
                "audio channels",
            )?,
            re_web_source: compile(r"(?i)\bweb[\s._-]+(dl|rip)\b", "web source")?,
            re_brackets: compile(r"[\[\](){}]", "brackets")?,
            re_separators: compile(r"[._\-+,/]+", "separators")?,
            re_whitespace: compile(r"\s+", "whitespace")?,
            re_season_episode: compile(r"(?i)^s(\d{1,2})e(\d{1,3})$", "season episode")?,
            re_cross_episode: compile(r"(?i)^(\d{1,2})x(\d{1,3})$", "cross episode")?,
            re_audio_token: compile(
                r"(?i)^(?:ddp?|e?ac3|aac|dts|truehd|flac|opus)(?:\d(?:\.?\d)?)?$",
                "audio token",
            )?,
            re_year: compile(r"^(?:19|20)\d{2}$", "year")?,
            re_roman_numeral: compile(r"(?i)^(?:i{1,3}|iv|vi{0,3}|ix|xi{0,3}|xiv|xv|xvi)$", "roman numeral")?,
            re_episode_in_text: compile(r"(?i)\b(?:s\d{1,2}\s*e\d{1,3}|\d{1,2}x\d{1,3})\b", "episode in text")?,
            re_season_dir: compile(r"(?i)^(?:season\s*\d{1,2}|s\d{1,2})$", "season directory")?,
        })
    }

    /// Tables with only the built-in word lists.
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn standard() -> Result<Self> {
        Self::from_config(&SortConfig::default())
    }

    /// Exact junk word, audio descriptor or known group literal.
    #[must_use]
    pub fn is_junk(&self, token: &str) -> bool {
        let lower = token.to_lowercase();
        self.junk_words.contains(&lower) || self.group_literals.contains(&lower) || self.re_audio_token.is_match(&lower)
    }

    #[must_use]
    pub fn is_keep_word(&self, token: &str) -> bool {
        self.keep_words.contains(&token.to_lowercase())
    }

    /// Heuristic for scene group and tracker tags.
    ///
    /// Matches short all-caps tokens, short tokens containing a digit,
    /// and short alphanumeric blobs without vowels.
    /// Words in the keep list never match.
    #[must_use]
    pub fn looks_like_tag(&self, token: &str) -> bool {
        if token.is_empty() || self.is_keep_word(token) {
            return false;
        }
        let length = token.chars().count();
        let has_upper = token.chars().any(char::is_uppercase);
        let has_lower = token.chars().any(char::is_lowercase);
        if length <= 6 && has_upper && !has_lower {
            return true;
        }
        if length <= 10 && token.chars().any(|c| c.is_ascii_digit()) {
            return true;
        }
        length <= 8
            && token.chars().all(|c| c.is_ascii_alphanumeric())
            && !token.chars().any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
    }

    /// Year in the range from 1900 to the current year.
    #[must_use]
    pub fn parse_year(&self, token: &str) -> Option<i32> {
        if !self.re_year.is_match(token) {
            return None;
        }
        token
            .parse::<i32>()
            .ok()
            .filter(|year| (1900..=self.current_year).contains(year))
    }

    /// Extension given without the leading dot, any case.
    #[must_use]
    pub fn is_video_extension(&self, extension: &str) -> bool {
        self.video_extensions.contains(&extension.to_lowercase())
    }

    /// Extension given without the leading dot, any case.
    #[must_use]
    pub fn is_sidecar_extension(&self, extension: &str) -> bool {
        self.sidecar_extensions.contains(&extension.to_lowercase())
    }

    /// Filename contains an `S01E02` or `1x02` style episode tag.
    #[must_use]
    pub fn has_episode_tag(&self, name: &str) -> bool {
        let spaced = self.re_separators.replace_all(name, " ");
        self.re_episode_in_text.is_match(&spaced)
    }

    /// Roman numeral from I to XVI, as used for sequels.
    #[must_use]
    pub fn is_roman_numeral(&self, word: &str) -> bool {
        self.re_roman_numeral.is_match(word)
    }

    /// Directory name such as `Season 02` or `S02`.
    #[must_use]
    pub fn is_season_directory(&self, name: &str) -> bool {
        self.re_season_dir.is_match(name.trim())
    }

    /// Video extensions that a base name should never end with.
    pub(crate) fn video_extensions(&self) -> impl Iterator<Item = &str> {
        self.video_extensions.iter().map(String::as_str)
    }
}

fn compile(pattern: &str, name: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Failed to compile {name} regex"))
}
