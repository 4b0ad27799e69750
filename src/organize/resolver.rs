//! Collision-safe destination paths.
//!
//! Every destination handed out during a planning pass is reserved under a
//! case-insensitive key, so no two planned actions can land on the same path
//! even on case-insensitive filesystems.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::organize::SortError;

/// Highest `dup` suffix number tried before giving up.
pub const MAX_COLLISION_PROBES: usize = 999;

/// Whether a destination is a file or a directory. Changes the suffix placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// `Name - dup1.ext`
    File,
    /// `Name - dup1`
    Directory,
}

/// Outcome of resolving a desired destination for a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Desired path was free and is now reserved.
    Free(PathBuf),
    /// Desired path is the source itself.
    Unchanged(PathBuf),
    /// Desired path was already claimed in this pass, a `dup` sibling was reserved instead.
    Suffixed(PathBuf),
    /// Desired path holds an unrelated file on disk. Reserved but must not be written.
    Occupied(PathBuf),
}

impl Resolution {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Free(path) | Self::Unchanged(path) | Self::Suffixed(path) | Self::Occupied(path) => path,
        }
    }

    #[must_use]
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Free(path) | Self::Unchanged(path) | Self::Suffixed(path) | Self::Occupied(path) => path,
        }
    }
}

/// Destination paths claimed during one planning pass.
///
/// Keys are NFC normalized and lowercased. Each key remembers the source that claimed it.
#[derive(Debug, Default, Clone)]
pub struct ReservationSet {
    claims: HashMap<String, PathBuf>,
}

impl ReservationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive key for a path.
    #[must_use]
    pub fn key(path: &Path) -> String {
        path.to_string_lossy().nfc().collect::<String>().to_lowercase()
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.claims.contains_key(&Self::key(path))
    }

    /// Source that reserved the path.
    #[must_use]
    pub fn owner(&self, path: &Path) -> Option<&Path> {
        self.claims.get(&Self::key(path)).map(PathBuf::as_path)
    }

    /// Claim `path` for `owner`.
    /// Returns false if another owner already holds it.
    /// Owners are compared by the same case-folded key as the paths.
    pub fn reserve(&mut self, path: &Path, owner: &Path) -> bool {
        match self.claims.get(&Self::key(path)) {
            Some(existing) => Self::key(existing) == Self::key(owner),
            None => {
                self.claims.insert(Self::key(path), owner.to_path_buf());
                true
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Hands out destinations that collide neither with the disk nor with earlier reservations.
#[derive(Debug, Default)]
pub struct PathResolver {
    reservations: ReservationSet,
}

impl PathResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn reservations(&self) -> &ReservationSet {
        &self.reservations
    }

    /// Reserve and return `desired` if it is free, otherwise the first free `dup` sibling.
    ///
    /// # Errors
    /// Returns `SortError::CollisionUnresolved` when every suffix up to
    /// `MAX_COLLISION_PROBES` is taken.
    pub fn resolve(&mut self, desired: &Path) -> Result<PathBuf, SortError> {
        if !exists_on_disk(desired) && !self.reservations.contains(desired) {
            self.reservations.reserve(desired, desired);
            return Ok(desired.to_path_buf());
        }
        self.probe(desired, desired, TargetKind::File)
    }

    /// Resolve the destination for moving `source` to `desired`.
    ///
    /// An unrelated file already on disk at `desired` is reported as `Occupied`
    /// instead of getting a suffix, and stays reserved so nothing else is planned there.
    ///
    /// # Errors
    /// Returns `SortError::CollisionUnresolved` when every suffix is taken.
    pub fn resolve_for(&mut self, source: &Path, desired: &Path, kind: TargetKind) -> Result<Resolution, SortError> {
        let reserved_by_other = self
            .reservations
            .owner(desired)
            .is_some_and(|owner| owner != source);

        if reserved_by_other {
            return self.probe(source, desired, kind).map(Resolution::Suffixed);
        }
        if is_same_file(source, desired) {
            self.reservations.reserve(desired, source);
            return Ok(Resolution::Unchanged(desired.to_path_buf()));
        }
        self.reservations.reserve(desired, source);
        if exists_on_disk(desired) {
            Ok(Resolution::Occupied(desired.to_path_buf()))
        } else {
            Ok(Resolution::Free(desired.to_path_buf()))
        }
    }

    /// Reserve a directory that will be created. Repeated requests for the same directory are allowed.
    pub fn reserve_directory(&mut self, directory: &Path) -> bool {
        self.reservations.reserve(directory, directory)
    }

    fn probe(&mut self, owner: &Path, desired: &Path, kind: TargetKind) -> Result<PathBuf, SortError> {
        for number in 1..=MAX_COLLISION_PROBES {
            let candidate = dup_candidate(desired, number, kind);
            if !exists_on_disk(&candidate) && !self.reservations.contains(&candidate) {
                self.reservations.reserve(&candidate, owner);
                return Ok(candidate);
            }
        }
        Err(SortError::CollisionUnresolved {
            path: desired.to_path_buf(),
            attempts: MAX_COLLISION_PROBES,
        })
    }
}

/// Sibling path with a ` - dupN` suffix.
fn dup_candidate(desired: &Path, number: usize, kind: TargetKind) -> PathBuf {
    let name = crate::path_to_filename_string(desired);
    let new_name = match (kind, desired.extension()) {
        (TargetKind::File, Some(extension)) => {
            let stem = crate::path_to_file_stem_string(desired);
            format!("{stem} - dup{number}.{}", extension.to_string_lossy())
        }
        _ => format!("{name} - dup{number}"),
    };
    desired.with_file_name(new_name)
}

/// Anything at the path, including broken symlinks.
fn exists_on_disk(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True if both paths point to the same file on disk.
///
/// Equal paths always count as the same file,
/// so a file that is already correctly named is never a collision with itself.
#[must_use]
pub fn is_same_file(first: &Path, second: &Path) -> bool {
    if first == second {
        return true;
    }
    let (Ok(first_meta), Ok(second_meta)) = (fs::metadata(first), fs::metadata(second)) else {
        return false;
    };
    same_file_id(first, &first_meta, second, &second_meta)
}

#[cfg(unix)]
fn same_file_id(_: &Path, first: &fs::Metadata, _: &Path, second: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    first.dev() == second.dev() && first.ino() == second.ino()
}

#[cfg(not(unix))]
fn same_file_id(first: &Path, _: &fs::Metadata, second: &Path, _: &fs::Metadata) -> bool {
    match (dunce::canonicalize(first), dunce::canonicalize(second)) {
        (Ok(first), Ok(second)) => first == second,
        _ => false,
    }
}
