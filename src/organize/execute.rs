//! Apply a plan to the filesystem.
//!
//! Actions run in a fixed phase order: directories, folder moves, sidecars, videos.
//! Permission failures go through a small retry state machine driven by a
//! [`DecisionSource`], so the same policy works for a terminal prompt and for tests.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use walkdir::WalkDir;

use crate::organize::{ActionKind, Plan, PlannedAction, SortError, Unlocker, is_same_file};

/// What to do after a permission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Skip,
    Abort,
    /// Clear the immutable flag and retry.
    Unlock,
    /// Unlock this and every later locked failure without asking.
    UnlockAll,
}

/// State of one failing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Waiting for a decision.
    Pending,
    Retrying,
    Skipped,
    Aborted,
    /// Flag cleared, retry next.
    Unlocked,
}

impl RetryState {
    /// Transition for a decision.
    ///
    /// Unlocking something that is not locked goes back to `Pending`.
    #[must_use]
    pub const fn next(decision: Decision, locked: bool) -> Self {
        match decision {
            Decision::Retry => Self::Retrying,
            Decision::Skip => Self::Skipped,
            Decision::Abort => Self::Aborted,
            Decision::Unlock | Decision::UnlockAll => {
                if locked {
                    Self::Unlocked
                } else {
                    Self::Pending
                }
            }
        }
    }

    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Skipped | Self::Aborted)
    }
}

/// Context handed to a [`DecisionSource`].
#[derive(Debug)]
pub struct LockedFailure<'a> {
    pub action: &'a PlannedAction,
    pub error: &'a io::Error,
    /// Path with an immutable flag, if one was found.
    pub locked: Option<&'a Path>,
    /// Attempt number starting from 1.
    pub attempt: usize,
}

/// Chooses how to continue after a permission failure.
pub trait DecisionSource {
    fn decide(&mut self, failure: &LockedFailure) -> Decision;
}

/// Non-interactive decisions.
///
/// Unlocks locked paths when allowed, otherwise skips.
/// Gives up on an action after `max_attempts` tries.
#[derive(Debug, Clone, Copy)]
pub struct PolicyDecisions {
    pub max_attempts: usize,
    pub auto_unlock: bool,
}

impl PolicyDecisions {
    #[must_use]
    pub const fn new(max_attempts: usize, auto_unlock: bool) -> Self {
        Self {
            max_attempts,
            auto_unlock,
        }
    }
}

impl DecisionSource for PolicyDecisions {
    fn decide(&mut self, failure: &LockedFailure) -> Decision {
        if failure.attempt > self.max_attempts {
            Decision::Skip
        } else if self.auto_unlock && failure.locked.is_some() {
            Decision::Unlock
        } else {
            Decision::Skip
        }
    }
}

/// Replays a fixed list of decisions, then skips.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDecisions {
    decisions: VecDeque<Decision>,
    /// Number of times a decision was requested.
    pub asked: usize,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            asked: 0,
        }
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(&mut self, _failure: &LockedFailure) -> Decision {
        self.asked += 1;
        self.decisions.pop_front().unwrap_or(Decision::Skip)
    }
}

/// Result of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Already correctly named.
    Unchanged,
    /// Collision, occupied destination or operator skip.
    Skipped(String),
    Failed(String),
    /// Not reached because the run was aborted.
    NotAttempted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed(error) => write!(f, "failed: {error}"),
            Self::NotAttempted => write!(f, "not attempted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub action: PlannedAction,
    pub outcome: Outcome,
}

/// Counts for a whole apply run.
#[derive(Debug, Default, Clone)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unchanged: usize,
    pub not_attempted: usize,
    pub aborted: bool,
    pub reports: Vec<ActionReport>,
}

impl ApplySummary {
    fn record(&mut self, action: &PlannedAction, outcome: Outcome) {
        match outcome {
            Outcome::Applied => self.applied += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::NotAttempted => self.not_attempted += 1,
        }
        self.reports.push(ActionReport {
            action: action.clone(),
            outcome,
        });
    }

    pub fn print_summary(&self) {
        println!("{}", "\n--- Apply Summary ---".bold().magenta());
        println!("Applied:        {}", self.applied.to_string().green());
        println!("Unchanged:      {}", self.unchanged);
        println!(
            "Skipped:        {}",
            if self.skipped > 0 {
                self.skipped.to_string().yellow()
            } else {
                "0".normal()
            }
        );
        println!(
            "Failed:         {}",
            if self.failed > 0 {
                self.failed.to_string().red()
            } else {
                "0".normal()
            }
        );
        if self.aborted {
            println!("Not attempted:  {}", self.not_attempted.to_string().red());
        }
    }
}

/// Changing actions in execution order.
///
/// The sort is stable, so actions within a phase keep their planned order.
#[must_use]
pub fn execution_order(actions: &[PlannedAction]) -> Vec<&PlannedAction> {
    let mut ordered: Vec<&PlannedAction> = actions.iter().filter(|action| action.kind.is_change()).collect();
    ordered.sort_by_key(|action| action.kind.phase());
    ordered
}

/// How a single attempt ended.
enum Attempt {
    Done,
    DestinationTaken,
}

/// Applies a plan with retry handling for locked files.
pub struct PlanExecutor<U: Unlocker, D: DecisionSource> {
    unlocker: U,
    decisions: D,
    abort_flag: Option<Arc<AtomicBool>>,
    auto_unlock: bool,
    verbose: bool,
}

impl<U: Unlocker, D: DecisionSource> PlanExecutor<U, D> {
    #[must_use]
    pub const fn new(unlocker: U, decisions: D) -> Self {
        Self {
            unlocker,
            decisions,
            abort_flag: None,
            auto_unlock: false,
            verbose: false,
        }
    }

    /// Stop at the next action boundary once the flag is set.
    #[must_use]
    pub fn with_abort_flag(mut self, abort_flag: Arc<AtomicBool>) -> Self {
        self.abort_flag = Some(abort_flag);
        self
    }

    /// Unlock locked paths without asking.
    #[must_use]
    pub const fn with_auto_unlock(mut self, auto_unlock: bool) -> Self {
        self.auto_unlock = auto_unlock;
        self
    }

    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn auto_unlock_enabled(&self) -> bool {
        self.auto_unlock
    }

    #[must_use]
    pub const fn decisions(&self) -> &D {
        &self.decisions
    }

    /// Apply every changing action of the plan.
    ///
    /// A failing action never stops the batch. Only an abort decision or the abort flag does.
    pub fn apply(&mut self, plan: &Plan) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for action in &plan.actions {
            match action.kind {
                ActionKind::Noop => summary.record(action, Outcome::Unchanged),
                ActionKind::CollisionSkip => {
                    summary.record(action, Outcome::Skipped("destination occupied".to_string()));
                }
                _ => {}
            }
        }

        let ordered = execution_order(&plan.actions);
        let total = ordered.len();
        // Folder destinations that never got their folder, and so hold none of the planned files.
        let mut unmoved_folders: Vec<&Path> = Vec::new();
        for (index, action) in ordered.into_iter().enumerate() {
            if summary.aborted || self.abort_requested() {
                summary.aborted = true;
                summary.record(action, Outcome::NotAttempted);
                continue;
            }
            if let Some(folder) = unmoved_folders.iter().find(|folder| action.source.starts_with(folder)) {
                let reason = format!("folder was not moved: {}", folder.display());
                if self.verbose {
                    crate::print_warning!("Skipped {}: {reason}", action.source.display());
                }
                summary.record(action, Outcome::Skipped(reason));
                continue;
            }
            if self.verbose {
                println!("[{}/{total}] {} {}", index + 1, action.kind, action.source.display());
            }
            let (outcome, abort) = self.apply_action(action);
            match &outcome {
                Outcome::Failed(error) => crate::print_error!("{error}"),
                Outcome::Skipped(reason) if self.verbose => {
                    crate::print_warning!("Skipped {}: {reason}", action.source.display());
                }
                _ => {}
            }
            if action.kind == ActionKind::MoveFolder && !matches!(outcome, Outcome::Applied) {
                unmoved_folders.push(&action.destination);
            }
            summary.record(action, outcome);
            summary.aborted |= abort;
        }

        summary
    }

    fn abort_requested(&self) -> bool {
        self.abort_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run one action through the retry loop. The flag is true if the operator aborted.
    fn apply_action(&mut self, action: &PlannedAction) -> (Outcome, bool) {
        let mut attempt = 0;
        let mut unlocked: HashSet<PathBuf> = HashSet::new();

        loop {
            attempt += 1;
            let error = match perform(action) {
                Ok(Attempt::Done) => return (Outcome::Applied, false),
                Ok(Attempt::DestinationTaken) => {
                    return (
                        Outcome::Skipped(format!("destination appeared: {}", action.destination.display())),
                        false,
                    );
                }
                Err(error) if error.kind() == io::ErrorKind::PermissionDenied => error,
                Err(error) => {
                    let error = SortError::from_io(action.source.clone(), error);
                    return (Outcome::Failed(error.to_string()), false);
                }
            };

            let locked = self.locked_path(action);
            let decision = match &locked {
                Some(path) if self.auto_unlock && !unlocked.contains(path) => Decision::Unlock,
                _ => self.decisions.decide(&LockedFailure {
                    action,
                    error: &error,
                    locked: locked.as_deref(),
                    attempt,
                }),
            };
            if decision == Decision::UnlockAll {
                self.auto_unlock = true;
            }

            match RetryState::next(decision, locked.is_some()) {
                RetryState::Skipped => {
                    let error = SortError::from_io(action.source.clone(), error);
                    return (Outcome::Skipped(error.to_string()), false);
                }
                RetryState::Aborted => return (Outcome::Skipped("aborted".to_string()), true),
                RetryState::Unlocked => {
                    if let Some(path) = locked {
                        match self.unlocker.unlock_checked(&path) {
                            Ok(()) => {
                                if self.verbose {
                                    println!("{}", format!("Unlocked {}", path.display()).cyan());
                                }
                            }
                            Err(unlock_error) => {
                                crate::print_warning!("Failed to unlock {}: {unlock_error}", path.display());
                            }
                        }
                        unlocked.insert(path);
                    }
                }
                RetryState::Retrying | RetryState::Pending => {}
            }
        }
    }

    /// Locked path that blocks the action: the source, its parent, or the destination parent.
    fn locked_path(&self, action: &PlannedAction) -> Option<PathBuf> {
        self.unlocker.locked_path(&action.source).or_else(|| {
            action
                .destination
                .parent()
                .filter(|parent| self.unlocker.is_locked(parent))
                .map(Path::to_path_buf)
        })
    }
}

/// Perform a single filesystem change.
fn perform(action: &PlannedAction) -> io::Result<Attempt> {
    if action.kind == ActionKind::MkDir {
        fs::create_dir_all(&action.destination)?;
        return Ok(Attempt::Done);
    }

    // The disk may have changed since planning.
    if fs::symlink_metadata(&action.destination).is_ok() && !is_same_file(&action.source, &action.destination) {
        return Ok(Attempt::DestinationTaken);
    }
    if let Some(parent) = action.destination.parent() {
        fs::create_dir_all(parent)?;
    }
    move_path(&action.source, &action.destination)?;
    Ok(Attempt::Done)
}

/// Rename, falling back to copy and delete across filesystems.
fn move_path(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            if source.is_dir() {
                copy_directory(source, destination)?;
                fs::remove_dir_all(source)
            } else {
                fs::copy(source, destination)?;
                fs::remove_file(source)
            }
        }
        result => result,
    }
}

fn copy_directory(source: &Path, destination: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry.path().strip_prefix(source).map_err(io::Error::other)?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs::File;

    use tempfile::tempdir;

    use super::*;
    use crate::organize::NoUnlock;

    fn action(kind: ActionKind, source: &Path, destination: &Path) -> PlannedAction {
        PlannedAction::new(kind, source.to_path_buf(), destination.to_path_buf())
    }

    fn failure<'a>(action: &'a PlannedAction, error: &'a io::Error, locked: Option<&'a Path>, attempt: usize) -> LockedFailure<'a> {
        LockedFailure {
            action,
            error,
            locked,
            attempt,
        }
    }

    #[test]
    fn state_transitions() {
        assert_eq!(RetryState::next(Decision::Retry, false), RetryState::Retrying);
        assert_eq!(RetryState::next(Decision::Skip, true), RetryState::Skipped);
        assert_eq!(RetryState::next(Decision::Abort, false), RetryState::Aborted);
        assert_eq!(RetryState::next(Decision::Unlock, true), RetryState::Unlocked);
        assert_eq!(RetryState::next(Decision::UnlockAll, true), RetryState::Unlocked);
        assert_eq!(RetryState::next(Decision::Unlock, false), RetryState::Pending);
        assert!(RetryState::Aborted.is_final());
        assert!(!RetryState::Unlocked.is_final());
    }

    #[test]
    fn policy_unlocks_locked_paths_until_attempts_run_out() {
        let planned = action(ActionKind::MoveVideo, Path::new("/a"), Path::new("/b"));
        let error = io::Error::from(io::ErrorKind::PermissionDenied);
        let locked = Path::new("/a");

        let mut policy = PolicyDecisions::new(2, true);
        assert_eq!(policy.decide(&failure(&planned, &error, Some(locked), 1)), Decision::Unlock);
        assert_eq!(policy.decide(&failure(&planned, &error, None, 1)), Decision::Skip);
        assert_eq!(policy.decide(&failure(&planned, &error, Some(locked), 3)), Decision::Skip);

        let mut cautious = PolicyDecisions::new(5, false);
        assert_eq!(cautious.decide(&failure(&planned, &error, Some(locked), 1)), Decision::Skip);
    }

    #[test]
    fn execution_order_follows_phases() {
        let actions = vec![
            action(ActionKind::MoveVideo, Path::new("/v1"), Path::new("/d/v1")),
            action(ActionKind::Noop, Path::new("/n"), Path::new("/n")),
            action(ActionKind::MoveSidecar, Path::new("/s1"), Path::new("/d/s1")),
            action(ActionKind::MkDir, Path::new("/d"), Path::new("/d")),
            action(ActionKind::MoveVideo, Path::new("/v2"), Path::new("/d/v2")),
            action(ActionKind::MoveFolder, Path::new("/f"), Path::new("/g")),
            action(ActionKind::CollisionSkip, Path::new("/c"), Path::new("/x")),
        ];
        let sources: Vec<&Path> = execution_order(&actions)
            .into_iter()
            .map(|action| action.source.as_path())
            .collect();
        assert_eq!(
            sources,
            vec![
                Path::new("/d"),
                Path::new("/f"),
                Path::new("/s1"),
                Path::new("/v1"),
                Path::new("/v2")
            ]
        );
    }

    #[test]
    fn applies_moves_and_counts_outcomes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        File::create(root.join("movie.mkv")).unwrap();
        File::create(root.join("movie.srt")).unwrap();
        File::create(root.join("same.mkv")).unwrap();
        File::create(root.join("blocked.mkv")).unwrap();
        File::create(root.join("taken.mkv")).unwrap();

        let target = root.join("Movie (2000)");
        let plan = Plan {
            actions: vec![
                action(ActionKind::MkDir, &target, &target),
                action(ActionKind::MoveVideo, &root.join("movie.mkv"), &target.join("Movie (2000).mkv")),
                action(ActionKind::MoveSidecar, &root.join("movie.srt"), &target.join("Movie (2000).srt")),
                action(ActionKind::Noop, &root.join("same.mkv"), &root.join("same.mkv")),
                action(ActionKind::CollisionSkip, &root.join("blocked.mkv"), &root.join("taken.mkv")),
            ],
            unparseable: Vec::new(),
        };

        let mut executor = PlanExecutor::new(NoUnlock, ScriptedDecisions::default());
        let summary = executor.apply(&plan);

        assert_eq!(summary.applied, 3);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert!(!summary.aborted);
        assert!(target.join("Movie (2000).mkv").exists());
        assert!(target.join("Movie (2000).srt").exists());
        assert!(!root.join("movie.mkv").exists());
        assert!(root.join("blocked.mkv").exists());
    }

    #[test]
    fn destination_created_after_planning_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        File::create(root.join("a.mkv")).unwrap();
        std::fs::write(root.join("b.mkv"), b"unrelated").unwrap();

        let plan = Plan {
            actions: vec![action(ActionKind::MoveVideo, &root.join("a.mkv"), &root.join("b.mkv"))],
            unparseable: Vec::new(),
        };
        let summary = PlanExecutor::new(NoUnlock, ScriptedDecisions::default()).apply(&plan);
        assert_eq!(summary.skipped, 1);
        assert_eq!(std::fs::read(root.join("b.mkv")).unwrap(), b"unrelated");
        assert!(root.join("a.mkv").exists());
    }

    #[test]
    fn missing_source_fails_only_that_action() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        File::create(root.join("present.mkv")).unwrap();

        let plan = Plan {
            actions: vec![
                action(ActionKind::MoveVideo, &root.join("missing.mkv"), &root.join("x.mkv")),
                action(ActionKind::MoveVideo, &root.join("present.mkv"), &root.join("y.mkv")),
            ],
            unparseable: Vec::new(),
        };
        let summary = PlanExecutor::new(NoUnlock, ScriptedDecisions::default()).apply(&plan);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.applied, 1);
        assert!(root.join("y.mkv").exists());
        assert!(matches!(summary.reports[0].outcome, Outcome::Failed(_)));
    }

    #[test]
    fn files_inside_an_unmoved_folder_are_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let target = root.join("Movie (2000)");
        File::create(root.join("other.mkv")).unwrap();

        let plan = Plan {
            actions: vec![
                action(ActionKind::MoveFolder, &root.join("Movie.2000.Rip"), &target),
                action(ActionKind::MoveVideo, &target.join("movie.mkv"), &target.join("Movie (2000).mkv")),
                action(ActionKind::MoveSidecar, &target.join("movie.srt"), &target.join("Movie (2000).srt")),
                action(ActionKind::MoveVideo, &root.join("other.mkv"), &root.join("Other.mkv")),
            ],
            unparseable: Vec::new(),
        };
        let summary = PlanExecutor::new(NoUnlock, ScriptedDecisions::default()).apply(&plan);

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.applied, 1);
        let outcome = |source: PathBuf| {
            summary
                .reports
                .iter()
                .find(|report| report.action.source == source)
                .map(|report| report.outcome.clone())
        };
        assert!(matches!(outcome(root.join("Movie.2000.Rip")), Some(Outcome::Failed(_))));
        assert!(matches!(outcome(target.join("movie.mkv")), Some(Outcome::Skipped(_))));
        assert!(matches!(outcome(target.join("movie.srt")), Some(Outcome::Skipped(_))));
        assert!(root.join("Other.mkv").exists());
    }

    #[test]
    fn abort_flag_stops_before_the_next_action() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        File::create(root.join("a.mkv")).unwrap();
        File::create(root.join("b.mkv")).unwrap();

        let plan = Plan {
            actions: vec![
                action(ActionKind::MoveVideo, &root.join("a.mkv"), &root.join("A.1.mkv")),
                action(ActionKind::MoveVideo, &root.join("b.mkv"), &root.join("B.1.mkv")),
            ],
            unparseable: Vec::new(),
        };
        let flag = Arc::new(AtomicBool::new(true));
        let summary = PlanExecutor::new(NoUnlock, ScriptedDecisions::default())
            .with_abort_flag(flag)
            .apply(&plan);
        assert!(summary.aborted);
        assert_eq!(summary.not_attempted, 2);
        assert_eq!(summary.applied, 0);
        assert!(root.join("a.mkv").exists());
    }

    #[cfg(unix)]
    mod permissions {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        /// Running as root ignores directory permissions, so the scenario cannot be set up.
        fn permissions_enforced(dir: &Path) -> bool {
            let probe = dir.join("probe");
            fs::create_dir(&probe).unwrap();
            fs::set_permissions(&probe, fs::Permissions::from_mode(0o555)).unwrap();
            let denied = File::create(probe.join("x")).is_err();
            fs::set_permissions(&probe, fs::Permissions::from_mode(0o755)).unwrap();
            denied
        }

        struct ReadOnlyDir {
            path: PathBuf,
        }

        impl ReadOnlyDir {
            fn new(path: PathBuf) -> Self {
                fs::create_dir_all(&path).unwrap();
                File::create(path.join("movie.mkv")).unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o555)).unwrap();
                Self { path }
            }
        }

        impl Drop for ReadOnlyDir {
            fn drop(&mut self) {
                let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755));
            }
        }

        /// Makes the directory writable again when asked to unlock it.
        struct PermissionUnlocker {
            locked: PathBuf,
            refuse: bool,
            calls: RefCell<usize>,
        }

        impl PermissionUnlocker {
            fn new(locked: &Path, refuse: bool) -> Self {
                Self {
                    locked: locked.to_path_buf(),
                    refuse,
                    calls: RefCell::new(0),
                }
            }
        }

        impl Unlocker for PermissionUnlocker {
            fn is_locked(&self, path: &Path) -> bool {
                path == self.locked && fs::metadata(path).is_ok_and(|meta| meta.permissions().readonly())
            }

            fn unlock(&self, path: &Path) -> io::Result<()> {
                *self.calls.borrow_mut() += 1;
                if self.refuse {
                    return Err(io::Error::other("operation not permitted"));
                }
                fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            }
        }

        #[test]
        fn skip_decision_leaves_file_in_place() {
            let dir = tempdir().unwrap();
            if !permissions_enforced(dir.path()) {
                return;
            }
            let locked = ReadOnlyDir::new(dir.path().join("locked"));
            let plan = Plan {
                actions: vec![action(
                    ActionKind::MoveVideo,
                    &locked.path.join("movie.mkv"),
                    &dir.path().join("Movie.mkv"),
                )],
                unparseable: Vec::new(),
            };

            let mut executor = PlanExecutor::new(NoUnlock, ScriptedDecisions::new([Decision::Retry, Decision::Skip]));
            let summary = executor.apply(&plan);
            assert_eq!(summary.skipped, 1);
            assert_eq!(executor.decisions().asked, 2);
            assert!(locked.path.join("movie.mkv").exists());
        }

        #[test]
        fn abort_decision_stops_remaining_actions() {
            let dir = tempdir().unwrap();
            if !permissions_enforced(dir.path()) {
                return;
            }
            let locked = ReadOnlyDir::new(dir.path().join("locked"));
            File::create(dir.path().join("other.mkv")).unwrap();
            let plan = Plan {
                actions: vec![
                    action(
                        ActionKind::MoveSidecar,
                        &locked.path.join("movie.mkv"),
                        &dir.path().join("Movie.mkv"),
                    ),
                    action(ActionKind::MoveVideo, &dir.path().join("other.mkv"), &dir.path().join("Other.mkv")),
                ],
                unparseable: Vec::new(),
            };

            let summary = PlanExecutor::new(NoUnlock, ScriptedDecisions::new([Decision::Abort])).apply(&plan);
            assert!(summary.aborted);
            assert_eq!(summary.not_attempted, 1);
            assert!(dir.path().join("other.mkv").exists());
        }

        #[test]
        fn unlock_all_unlocks_later_failures_without_asking() {
            let dir = tempdir().unwrap();
            if !permissions_enforced(dir.path()) {
                return;
            }
            let first = ReadOnlyDir::new(dir.path().join("first"));
            let plan = Plan {
                actions: vec![action(
                    ActionKind::MoveVideo,
                    &first.path.join("movie.mkv"),
                    &dir.path().join("First.mkv"),
                )],
                unparseable: Vec::new(),
            };
            let unlocker = PermissionUnlocker::new(&first.path, false);

            let mut executor = PlanExecutor::new(unlocker, ScriptedDecisions::new([Decision::UnlockAll]));
            let summary = executor.apply(&plan);
            assert_eq!(summary.applied, 1);
            assert!(executor.auto_unlock_enabled());
            assert_eq!(executor.decisions().asked, 1);
            assert!(dir.path().join("First.mkv").exists());
        }

        #[test]
        fn auto_unlock_needs_no_decision() {
            let dir = tempdir().unwrap();
            if !permissions_enforced(dir.path()) {
                return;
            }
            let locked = ReadOnlyDir::new(dir.path().join("locked"));
            let plan = Plan {
                actions: vec![action(
                    ActionKind::MoveVideo,
                    &locked.path.join("movie.mkv"),
                    &dir.path().join("Movie.mkv"),
                )],
                unparseable: Vec::new(),
            };
            let unlocker = PermissionUnlocker::new(&locked.path, false);

            let mut executor = PlanExecutor::new(unlocker, ScriptedDecisions::default()).with_auto_unlock(true);
            let summary = executor.apply(&plan);
            assert_eq!(summary.applied, 1);
            assert_eq!(executor.decisions().asked, 0);
        }

        #[test]
        fn failed_unlock_falls_back_to_asking() {
            let dir = tempdir().unwrap();
            if !permissions_enforced(dir.path()) {
                return;
            }
            let locked = ReadOnlyDir::new(dir.path().join("locked"));
            let plan = Plan {
                actions: vec![action(
                    ActionKind::MoveVideo,
                    &locked.path.join("movie.mkv"),
                    &dir.path().join("Movie.mkv"),
                )],
                unparseable: Vec::new(),
            };
            let unlocker = PermissionUnlocker::new(&locked.path, true);

            let mut executor = PlanExecutor::new(unlocker, ScriptedDecisions::default()).with_auto_unlock(true);
            let summary = executor.apply(&plan);
            assert_eq!(summary.skipped, 1);
            assert_eq!(executor.decisions().asked, 1);
            assert!(locked.path.join("movie.mkv").exists());
        }
    }
}
