use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use media_sort::organize::{Layout, MediaSortConfig, SortConfig};

use crate::MediaSortArgs;

/// Create the final config from command line args and the user config file.
///
/// Flags are OR-ed with the file settings and list arguments extend the configured lists.
pub fn from_args(args: MediaSortArgs, user_config: MediaSortConfig) -> SortConfig {
    let mut config = SortConfig::from_user_config(user_config);

    config.auto |= args.auto;
    config.auto_unlock |= args.unlock;
    config.bucket_by_letter |= args.bucket;
    config.debug |= args.debug;
    config.dryrun |= args.print;
    config.verbose |= args.verbose;

    if args.in_place {
        config.layout = Layout::InPlace;
    } else if args.library || args.destination.is_some() {
        config.layout = Layout::Library;
    }
    if args.destination.is_some() {
        config.destination = args.destination;
    }
    if let Some(show) = args.show.filter(|name| !name.trim().is_empty()) {
        config.show_name = Some(show.trim().to_string());
    }
    if let Some(report) = args.report {
        config.report = report;
    }

    config.extend_lists(args.junk, args.keep, args.ignore);
    config
}

/// Make a relative destination absolute against the current directory.
pub fn absolute_destination(destination: &Path) -> Result<PathBuf> {
    if destination.exists() {
        return dunce::canonicalize(destination)
            .with_context(|| format!("Failed to resolve destination {}", destination.display()));
    }
    if destination.is_absolute() {
        Ok(destination.to_path_buf())
    } else {
        Ok(env::current_dir()
            .context("Failed to get current working directory")?
            .join(destination))
    }
}
