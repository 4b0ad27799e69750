use std::path::Path;

use crate::organize::{Classification, Classifier, Identity, Lexicon, SortError, Tokenizer};

/// Derives a canonical identity from a media filename.
#[derive(Debug, Clone, Copy)]
pub struct IdentityBuilder<'a> {
    lexicon: &'a Lexicon,
    tokenizer: Tokenizer<'a>,
    classifier: Classifier<'a>,
}

impl<'a> IdentityBuilder<'a> {
    #[must_use]
    pub const fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            tokenizer: Tokenizer::new(lexicon),
            classifier: Classifier::new(lexicon),
        }
    }

    /// Identity for the video at `path`.
    ///
    /// An explicit `show_name` takes priority over the show name found in the filename
    /// or in the parent directories.
    ///
    /// # Errors
    /// Returns `SortError::UnparseableName` if neither a season/episode tag nor a year
    /// is found, or if no title remains after cleanup.
    pub fn identify(&self, path: &Path, show_name: Option<&str>) -> Result<Identity, SortError> {
        let stem = crate::path_to_file_stem_string(path);
        let tokens = self.tokenizer.tokenize(&stem);
        let classification = self.classifier.classify(&tokens);

        let identity = if classification.is_episode() {
            self.episode(&tokens, &classification, show_name, path)
        } else {
            self.movie(&classification)
        };
        identity.ok_or_else(|| SortError::UnparseableName(path.to_path_buf()))
    }

    /// Movie title and year from an already classified stem.
    fn movie(&self, classification: &Classification) -> Option<Identity> {
        let year = classification.year()?;
        let title = self.smart_title(&classification.title_before_year());
        if title.is_empty() {
            return None;
        }
        Some(Identity::movie(title, Some(year)))
    }

    fn episode(
        &self,
        tokens: &[String],
        classification: &Classification,
        show_name: Option<&str>,
        path: &Path,
    ) -> Option<Identity> {
        let season = classification.season?;
        let episode = classification.episode?;
        let position = classification.episode_position()?;

        let show = show_name
            .map(collapse_whitespace)
            .filter(|name| !name.is_empty())
            .or_else(|| {
                let before_tag = self.classifier.classify(&tokens[..position]);
                Some(self.smart_title(&before_tag.title_tokens())).filter(|name| !name.is_empty())
            })
            .or_else(|| self.show_name_from_path(path))?;

        let after_tag = self.classifier.classify_fragment(&tokens[position + 1..]);
        let title = strip_show_prefix(&after_tag.title_tokens().join(" "), &show);

        Some(Identity::episode(show, season, episode, title))
    }

    /// Show name taken from the folder holding the episode.
    ///
    /// A season folder such as `Season 01` is skipped in favour of its parent.
    #[must_use]
    pub fn show_name_from_path(&self, path: &Path) -> Option<String> {
        let parent = path.parent()?;
        let parent_name = crate::path_to_filename_string(parent);
        let folder = if self.lexicon.is_season_directory(&parent_name) {
            parent.parent()?
        } else {
            parent
        };
        self.suggest_show_name(&crate::path_to_filename_string(folder))
    }

    /// Clean a folder name into a show name.
    #[must_use]
    pub fn suggest_show_name(&self, folder_name: &str) -> Option<String> {
        let tokens = self.tokenizer.tokenize(folder_name);
        let classification = self.classifier.classify(&tokens);
        let title = classification.title_before_year();
        let name = if title.is_empty() {
            let normalized = self.tokenizer.normalize(folder_name);
            self.smart_title(&normalized.split_whitespace().collect::<Vec<_>>())
        } else {
            self.smart_title(&title)
        };
        Some(name).filter(|name| !name.is_empty())
    }

    /// Title case with roman numerals kept upper case.
    fn smart_title(&self, words: &[&str]) -> String {
        let joined = collapse_whitespace(&words.join(" "));
        titlecase::titlecase(&joined)
            .split(' ')
            .map(|word| {
                if self.lexicon.is_roman_numeral(word) {
                    word.to_uppercase()
                } else {
                    word.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a repeated show name from the start of an episode title.
fn strip_show_prefix(title: &str, show: &str) -> String {
    let title = collapse_whitespace(title);
    let title_lower = title.to_lowercase();
    let show_lower = collapse_whitespace(show).to_lowercase();
    if show_lower.is_empty() {
        return title;
    }
    if title_lower == show_lower {
        return String::new();
    }
    let prefix = format!("{show_lower} ");
    if title_lower.starts_with(&prefix) {
        // Lowercasing can change byte lengths, so count characters.
        let skip = prefix.chars().count();
        return title
            .chars()
            .skip(skip)
            .collect::<String>()
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '.' | '_'))
            .to_string();
    }
    title
}
