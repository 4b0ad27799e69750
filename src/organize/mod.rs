//! Media filename normalization and collision-safe reorganization.
//!
//! Filenames are split into tokens, the tokens are classified as title words or
//! release metadata, and the remaining words form a canonical identity.
//! A plan of moves is then computed against the live filesystem with every
//! destination reserved up front, and finally applied in dependency order.

mod classify;
mod collect;
mod config;
mod error;
mod execute;
mod identity;
mod lexicon;
mod naming;
mod plan;
mod report;
mod resolver;
mod tokenize;
mod types;
mod unlock;

pub use classify::{Classification, Classifier};
pub use collect::{collect_candidates, find_sidecars, is_ignored_path};
pub use config::{Layout, MediaSortConfig, SortConfig};
pub use error::SortError;
pub use execute::{
    ActionReport, ApplySummary, Decision, DecisionSource, LockedFailure, Outcome, PlanExecutor, PolicyDecisions,
    RetryState, ScriptedDecisions, execution_order,
};
pub use identity::IdentityBuilder;
pub use lexicon::Lexicon;
pub use naming::DestinationNamer;
pub use plan::{Plan, PlanBuilder};
pub use report::{print_plan, write_plan_csv};
pub use resolver::{MAX_COLLISION_PROBES, PathResolver, ReservationSet, Resolution, TargetKind, is_same_file};
pub use tokenize::Tokenizer;
pub use types::{ActionKind, Identity, MediaKind, PlannedAction, Token, TokenKind};
pub use unlock::{NoUnlock, SystemUnlocker, Unlocker};
