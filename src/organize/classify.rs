use crate::organize::{Lexicon, Token, TokenKind};

/// Result of classifying a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    /// First season number found.
    pub season: Option<u32>,
    /// First episode number found.
    pub episode: Option<u32>,
    /// Every input token in order with its category.
    pub tokens: Vec<Token<'a>>,
}

impl<'a> Classification<'a> {
    #[must_use]
    pub fn title_tokens(&self) -> Vec<&'a str> {
        self.tokens
            .iter()
            .filter(|token| token.is_title_word())
            .map(|token| token.text)
            .collect()
    }

    /// Everything that is not a title word, kept for diagnostics.
    #[must_use]
    pub fn removed_tokens(&self) -> Vec<&'a str> {
        self.tokens
            .iter()
            .filter(|token| !token.is_title_word())
            .map(|token| token.text)
            .collect()
    }

    /// First year marker.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.tokens.iter().find_map(|token| match token.kind {
            TokenKind::Year(year) => Some(year),
            _ => None,
        })
    }

    /// Title words that appear before the first year marker.
    #[must_use]
    pub fn title_before_year(&self) -> Vec<&'a str> {
        self.tokens
            .iter()
            .take_while(|token| !matches!(token.kind, TokenKind::Year(_)))
            .filter(|token| token.is_title_word())
            .map(|token| token.text)
            .collect()
    }

    /// Index of the first season/episode marker.
    #[must_use]
    pub fn episode_position(&self) -> Option<usize> {
        self.tokens
            .iter()
            .position(|token| matches!(token.kind, TokenKind::SeasonEpisode { .. }))
    }

    #[must_use]
    pub const fn is_episode(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }
}

/// Labels tokens as episode markers, years, release metadata or title words.
///
/// Classification depends only on the token text and whether a title word has
/// already been seen, so identical input always gives identical output.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Classify the tokens of a whole filename stem.
    #[must_use]
    pub fn classify<'t>(&self, tokens: &'t [String]) -> Classification<'t> {
        self.classify_with_state(tokens, false)
    }

    /// Classify a fragment that follows already known title text.
    ///
    /// Leading year-shaped tokens count as years here instead of title words.
    #[must_use]
    pub fn classify_fragment<'t>(&self, tokens: &'t [String]) -> Classification<'t> {
        self.classify_with_state(tokens, true)
    }

    fn classify_with_state<'t>(&self, tokens: &'t [String], mut title_seen: bool) -> Classification<'t> {
        let mut season = None;
        let mut episode = None;
        let mut classified = Vec::with_capacity(tokens.len());

        for text in tokens {
            let kind = self.token_kind(text, title_seen);
            match kind {
                TokenKind::SeasonEpisode {
                    season: found_season,
                    episode: found_episode,
                } => {
                    if season.is_none() && episode.is_none() {
                        season = Some(found_season);
                        episode = Some(found_episode);
                    }
                }
                TokenKind::TitleWord => title_seen = true,
                _ => {}
            }
            classified.push(Token::new(text.as_str(), kind));
        }

        Classification {
            season,
            episode,
            tokens: classified,
        }
    }

    /// Category of a single token. First matching rule wins.
    fn token_kind(&self, text: &str, title_seen: bool) -> TokenKind {
        if let Some((season, episode)) = self.season_episode(text) {
            return TokenKind::SeasonEpisode { season, episode };
        }
        // Year-shaped tokens would otherwise match the digit rule of the tag heuristic.
        if let Some(year) = self.lexicon.parse_year(text) {
            return if title_seen {
                TokenKind::Year(year)
            } else {
                TokenKind::TitleWord
            };
        }
        if self.lexicon.looks_like_tag(text) {
            return TokenKind::GroupTagLike;
        }
        if self.lexicon.is_junk(text) {
            return TokenKind::Junk;
        }
        TokenKind::TitleWord
    }

    fn season_episode(&self, text: &str) -> Option<(u32, u32)> {
        let captures = self
            .lexicon
            .re_season_episode
            .captures(text)
            .or_else(|| self.lexicon.re_cross_episode.captures(text))?;
        let season = captures.get(1)?.as_str().parse().ok()?;
        let episode = captures.get(2)?.as_str().parse().ok()?;
        Some((season, episode))
    }
}
