use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::organize::{
    ActionKind, DestinationNamer, Identity, IdentityBuilder, Layout, Lexicon, MediaKind, PathResolver, PlannedAction,
    ReservationSet, Resolution, SortConfig, SortError, TargetKind, collect, is_ignored_path, is_same_file,
};

/// Ordered list of planned actions for one batch.
#[derive(Debug, Default, Clone)]
pub struct Plan {
    pub actions: Vec<PlannedAction>,
    /// Videos without a usable year or season/episode tag. Left untouched.
    pub unparseable: Vec<PathBuf>,
}

impl Plan {
    /// Actions that change something on disk.
    pub fn changes(&self) -> impl Iterator<Item = &PlannedAction> {
        self.actions.iter().filter(|action| action.kind.is_change())
    }

    #[must_use]
    pub fn change_count(&self) -> usize {
        self.changes().count()
    }

    #[must_use]
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|action| action.kind == kind).count()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.changes().next().is_some()
    }
}

/// A video with its derived identity.
#[derive(Debug)]
struct Item {
    source: PathBuf,
    identity: Identity,
    /// Set when the whole parent folder moves with the video.
    folder: Option<PathBuf>,
}

/// Builds a collision-free plan from candidate video paths.
///
/// All destinations are reserved in a single pass, so the plan never moves two files
/// to the same place and never overwrites an unrelated file.
pub struct PlanBuilder<'a> {
    root: PathBuf,
    config: &'a SortConfig,
    lexicon: &'a Lexicon,
    identities: IdentityBuilder<'a>,
    namer: DestinationNamer<'a>,
    resolver: PathResolver,
    actions: Vec<PlannedAction>,
    created_dirs: HashSet<String>,
    moved_dirs: HashSet<String>,
}

impl<'a> PlanBuilder<'a> {
    /// `root` is the scanned directory. A file root uses its parent directory.
    #[must_use]
    pub fn new(root: &Path, config: &'a SortConfig, lexicon: &'a Lexicon) -> Self {
        let root = if root.is_file() {
            root.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf)
        } else {
            root.to_path_buf()
        };
        Self {
            identities: IdentityBuilder::new(lexicon),
            namer: DestinationNamer::new(lexicon, config, &root),
            root,
            config,
            lexicon,
            resolver: PathResolver::new(),
            actions: Vec::new(),
            created_dirs: HashSet::new(),
            moved_dirs: HashSet::new(),
        }
    }

    /// Plan all candidates.
    ///
    /// Files that are already correctly named are reserved first,
    /// so they keep their name and later duplicates get a suffix instead.
    ///
    /// # Errors
    /// Returns `SortError::CollisionUnresolved` if no free name is found for some destination.
    pub fn build(mut self, candidates: &[PathBuf]) -> Result<Plan, SortError> {
        let mut unparseable = Vec::new();
        let mut items = Vec::new();
        let mut seen_folders = HashSet::new();

        for source in candidates {
            if is_ignored_path(source, &self.root, self.config) {
                continue;
            }
            match self.identities.identify(source, self.config.show_name.as_deref()) {
                Ok(identity) => {
                    let folder = self.movable_folder(source, &identity);
                    if let Some(folder) = &folder
                        && !seen_folders.insert(folder.clone())
                    {
                        continue;
                    }
                    items.push(Item {
                        source: source.clone(),
                        identity,
                        folder,
                    });
                }
                Err(SortError::UnparseableName(path)) => unparseable.push(path),
                Err(error) => return Err(error),
            }
        }

        for item in &items {
            self.reserve_if_canonical(item)?;
        }
        for item in &items {
            if item.folder.is_some() {
                self.plan_folder(item)?;
            } else {
                let directory = self.namer.identity_directory(&item.identity, parent_of(&item.source));
                self.plan_files(&item.source, &item.source, &item.identity, &directory)?;
            }
        }

        Ok(Plan {
            actions: self.actions,
            unparseable,
        })
    }

    /// Folder that moves as a whole together with the video.
    ///
    /// Only movies in library layout qualify, and only when the folder is strictly inside the scan root.
    fn movable_folder(&self, source: &Path, identity: &Identity) -> Option<PathBuf> {
        if self.config.layout != Layout::Library || identity.kind() != MediaKind::Movie {
            return None;
        }
        let folder = source.parent()?;
        if folder == self.root || !folder.starts_with(&self.root) {
            return None;
        }
        let destination = self.namer.movie_directory(identity);
        if destination.starts_with(folder) && destination != folder {
            return None;
        }
        self.is_single_movie_folder(folder).then(|| folder.to_path_buf())
    }

    /// Exactly one non-episode video plus only sidecars and the bonus directory.
    fn is_single_movie_folder(&self, folder: &Path) -> bool {
        let Ok(entries) = fs::read_dir(folder) else {
            return false;
        };
        let mut videos = 0;
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            let name = crate::path_to_filename_string(&path);
            if name.starts_with('.') {
                continue;
            }
            let Ok(file_type) = entry.file_type() else {
                return false;
            };
            if file_type.is_dir() {
                if name.to_lowercase() == self.config.bonus_dir {
                    continue;
                }
                return false;
            }
            let extension = crate::path_to_file_extension_string(&path);
            if self.lexicon.is_video_extension(&extension) {
                if self.lexicon.has_episode_tag(&name) {
                    return false;
                }
                videos += 1;
            } else if !self.lexicon.is_sidecar_extension(&extension) {
                return false;
            }
        }
        videos == 1
    }

    /// Reserve targets that already exist with the right name.
    fn reserve_if_canonical(&mut self, item: &Item) -> Result<(), SortError> {
        if let Some(folder) = &item.folder {
            let desired = self.namer.movie_directory(&item.identity);
            if is_same_file(folder, &desired) {
                self.resolver.resolve_for(folder, &desired, TargetKind::Directory)?;
            }
            return Ok(());
        }
        let directory = self.namer.identity_directory(&item.identity, parent_of(&item.source));
        let base = self.namer.base_name(&item.identity);
        let desired = directory.join(self.namer.video_file_name(&base, &item.source));
        if is_same_file(&item.source, &desired) {
            self.resolver.resolve_for(&item.source, &desired, TargetKind::File)?;
        }
        Ok(())
    }

    fn plan_folder(&mut self, item: &Item) -> Result<(), SortError> {
        let Some(folder) = &item.folder else {
            return Ok(());
        };
        let desired = self.namer.movie_directory(&item.identity);
        match self.resolver.resolve_for(folder, &desired, TargetKind::Directory)? {
            Resolution::Unchanged(_) => self.plan_files(&item.source, &item.source, &item.identity, folder),
            Resolution::Occupied(destination) => {
                self.push(ActionKind::CollisionSkip, folder, &destination);
                Ok(())
            }
            Resolution::Free(destination) | Resolution::Suffixed(destination) => {
                self.push(ActionKind::MoveFolder, folder, &destination);
                self.moved_dirs.insert(ReservationSet::key(&destination));
                let moved_source = destination.join(crate::path_to_filename_string(&item.source));
                self.plan_files(&item.source, &moved_source, &item.identity, &destination)
            }
        }
    }

    /// Plan the video and its sidecars into `directory`.
    ///
    /// `original` is where the video is now, used to find sidecars.
    /// `source` is where it will be when its own move runs, which differs after a folder move.
    fn plan_files(
        &mut self,
        original: &Path,
        source: &Path,
        identity: &Identity,
        directory: &Path,
    ) -> Result<(), SortError> {
        let base = self.namer.base_name(identity);
        let desired = directory.join(self.namer.video_file_name(&base, source));

        let video = match self.resolver.resolve_for(source, &desired, TargetKind::File)? {
            Resolution::Occupied(destination) => {
                self.push(ActionKind::CollisionSkip, source, &destination);
                return Ok(());
            }
            Resolution::Unchanged(destination) => {
                self.push(ActionKind::Noop, source, &destination);
                destination
            }
            Resolution::Free(destination) | Resolution::Suffixed(destination) => {
                self.ensure_directory(directory);
                self.push(ActionKind::MoveVideo, source, &destination);
                destination
            }
        };

        let original_stem = crate::path_to_file_stem_string(original);
        let final_stem = crate::path_to_file_stem_string(&video);
        let source_dir = parent_of(source).to_path_buf();

        for sidecar in collect::find_sidecars(original, self.lexicon) {
            let Some(name) = DestinationNamer::sidecar_file_name(&final_stem, &original_stem, &sidecar) else {
                continue;
            };
            let sidecar_source = source_dir.join(crate::path_to_filename_string(&sidecar));
            let desired = directory.join(name);
            match self.resolver.resolve_for(&sidecar_source, &desired, TargetKind::File)? {
                Resolution::Unchanged(destination) => self.push(ActionKind::Noop, &sidecar_source, &destination),
                Resolution::Occupied(destination) => {
                    self.push(ActionKind::CollisionSkip, &sidecar_source, &destination);
                }
                Resolution::Free(destination) | Resolution::Suffixed(destination) => {
                    self.ensure_directory(directory);
                    self.push(ActionKind::MoveSidecar, &sidecar_source, &destination);
                }
            }
        }
        Ok(())
    }

    /// Add a `MkDir` once per directory unless it already exists or arrives with a folder move.
    fn ensure_directory(&mut self, directory: &Path) {
        let key = ReservationSet::key(directory);
        if self.moved_dirs.contains(&key) || !self.created_dirs.insert(key) {
            return;
        }
        self.resolver.reserve_directory(directory);
        if !directory.is_dir() {
            self.push(ActionKind::MkDir, directory, directory);
        }
    }

    fn push(&mut self, kind: ActionKind, source: &Path, destination: &Path) {
        self.actions
            .push(PlannedAction::new(kind, source.to_path_buf(), destination.to_path_buf()));
    }
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}
