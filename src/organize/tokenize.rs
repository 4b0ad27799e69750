use crate::organize::Lexicon;

/// Splits a filename stem into normalized word tokens.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub const fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Normalize separators and common split patterns into single spaces.
    ///
    /// Bracket characters are removed but their contents are kept,
    /// so a tag like `[S01E02]` still tokenizes.
    #[must_use]
    pub fn normalize(&self, stem: &str) -> String {
        let mut text = crate::strip_diacritics(stem);
        text = self
            .lexicon
            .re_codec_split
            .replace_all(&text, "${1}${2}")
            .into_owned();
        text = self
            .lexicon
            .re_audio_channels
            .replace_all(&text, "${1}${2}")
            .into_owned();
        text = self.lexicon.re_web_source.replace_all(&text, "web${1}").into_owned();
        text = self.lexicon.re_brackets.replace_all(&text, " ").into_owned();
        text = self.lexicon.re_separators.replace_all(&text, " ").into_owned();
        self.lexicon.re_whitespace.replace_all(&text, " ").trim().to_string()
    }

    /// Ordered tokens without surrounding punctuation. Never contains empty tokens.
    #[must_use]
    pub fn tokenize(&self, stem: &str) -> Vec<String> {
        self.normalize(stem)
            .split(' ')
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(stem: &str) -> Vec<String> {
        let lexicon = Lexicon::standard().expect("lexicon");
        Tokenizer::new(&lexicon).tokenize(stem)
    }

    #[test]
    fn splits_on_all_separators() {
        assert_eq!(
            tokens("The.Matrix_1999-1080p+BluRay,x264/GROUP"),
            vec!["The", "Matrix", "1999", "1080p", "BluRay", "x264", "GROUP"]
        );
    }

    #[test]
    fn codec_splits_tokenize_like_compact_form() {
        assert_eq!(tokens("Movie h 265"), tokens("Movie h265"));
        assert_eq!(tokens("Movie H.264"), tokens("Movie H264"));
        assert_eq!(tokens("Movie x-265"), vec!["Movie", "x265"]);
    }

    #[test]
    fn audio_channels_and_web_sources_stay_whole() {
        assert_eq!(tokens("Show.S01E02.WEB-DL.DDP5.1"), vec!["Show", "S01E02", "webDL", "DDP51"]);
        assert_eq!(tokens("Show.S01E02.Web.Rip.AAC2.0"), vec!["Show", "S01E02", "webRip", "AAC20"]);
    }

    #[test]
    fn brackets_keep_their_contents() {
        assert_eq!(tokens("[TGx] Show (2019) {S01E02}"), vec!["TGx", "Show", "2019", "S01E02"]);
    }

    #[test]
    fn diacritics_are_stripped() {
        assert_eq!(tokens("Amélie.2001"), vec!["Amelie", "2001"]);
        assert_eq!(tokens("Amélie 2001"), tokens("Amelie 2001"));
    }

    #[test]
    fn tokens_have_no_edge_punctuation_or_empties() {
        let result = tokens("  ..Don't!! Look ~Up~ -- 2021 !!  ");
        assert_eq!(result, vec!["Don't", "Look", "Up", "2021"]);
        for token in result {
            assert!(!token.is_empty());
            assert!(token.chars().next().is_some_and(char::is_alphanumeric));
            assert!(token.chars().last().is_some_and(char::is_alphanumeric));
        }
    }

    #[test]
    fn empty_and_punctuation_only_stems() {
        assert!(tokens("").is_empty());
        assert!(tokens("...---___").is_empty());
        assert!(tokens("!!! ???").is_empty());
    }
}
