use std::fmt;
use std::path::PathBuf;

/// Category assigned to a single filename token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Episode marker such as `S01E02` or `1x02`.
    SeasonEpisode { season: u32, episode: u32 },
    /// Release year.
    Year(i32),
    /// Known release metadata: source, codec, resolution, audio, group name.
    Junk,
    /// Short blob that looks like a scene group or tracker tag.
    GroupTagLike,
    /// Part of the title.
    TitleWord,
}

/// A filename token together with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    pub(crate) const fn new(text: &'a str, kind: TokenKind) -> Self {
        Self { text, kind }
    }

    #[must_use]
    pub const fn is_title_word(&self) -> bool {
        matches!(self.kind, TokenKind::TitleWord)
    }
}

/// Whether a file is a movie or a TV episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Episode,
}

/// Canonical identity derived from a filename.
///
/// Movies carry a title and usually a year.
/// Episodes carry the show name, season, episode and an optional episode title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub title: String,
    pub year: Option<i32>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub show: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn movie(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            year,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn episode(show: impl Into<String>, season: u32, episode: u32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            season: Some(season),
            episode: Some(episode),
            show: Some(show.into()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        if self.season.is_some() && self.episode.is_some() {
            MediaKind::Episode
        } else {
            MediaKind::Movie
        }
    }
}

/// Type of planned filesystem operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MkDir,
    MoveVideo,
    MoveSidecar,
    MoveFolder,
    Noop,
    CollisionSkip,
}

impl ActionKind {
    /// Name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MkDir => "mkdir",
            Self::MoveVideo => "move_video",
            Self::MoveSidecar => "move_sidecar",
            Self::MoveFolder => "move_folder",
            Self::Noop => "noop",
            Self::CollisionSkip => "collision_skip",
        }
    }

    /// Execution phase. Lower phases run first, `None` is never executed.
    #[must_use]
    pub const fn phase(self) -> Option<u8> {
        match self {
            Self::MkDir => Some(0),
            Self::MoveFolder => Some(1),
            Self::MoveSidecar => Some(2),
            Self::MoveVideo => Some(3),
            Self::Noop | Self::CollisionSkip => None,
        }
    }

    /// True for actions that change something on disk.
    #[must_use]
    pub const fn is_change(self) -> bool {
        self.phase().is_some()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry of a rename plan.
///
/// For `MkDir` the source and destination are the same directory.
/// For `Noop` both point to the file that is already correctly named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub kind: ActionKind,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl PlannedAction {
    #[must_use]
    pub const fn new(kind: ActionKind, source: PathBuf, destination: PathBuf) -> Self {
        Self {
            kind,
            source,
            destination,
        }
    }
}
