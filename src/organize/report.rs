use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use csv::Writer;

use crate::organize::{ActionKind, Plan};

/// Write the plan as `action,original,proposed` rows.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_plan_csv(plan: &Plan, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut writer = Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["action", "original", "proposed"])?;
    for action in &plan.actions {
        writer.write_record([
            action.kind.as_str(),
            &crate::path_to_string(&action.source),
            &crate::path_to_string(&action.destination),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Print planned changes as stacked diffs of the paths relative to `root`.
///
/// `Noop` actions are only listed when `verbose` is set.
pub fn print_plan(plan: &Plan, root: &Path, verbose: bool) {
    for action in &plan.actions {
        let source = display_path(&action.source, root);
        let destination = display_path(&action.destination, root);
        match action.kind {
            ActionKind::MkDir => println!("{} {destination}", "mkdir".cyan()),
            ActionKind::MoveFolder => {
                println!("{}", "folder".magenta());
                crate::show_diff(&source, &destination);
            }
            ActionKind::MoveVideo | ActionKind::MoveSidecar => crate::show_diff(&source, &destination),
            ActionKind::CollisionSkip => {
                crate::print_warning!("Skip {source}: {destination} already exists");
            }
            ActionKind::Noop => {
                if verbose {
                    println!("{} {source}", "ok".dimmed());
                }
            }
        }
    }

    if !plan.unparseable.is_empty() {
        crate::print_warning!("Could not parse {} file(s):", plan.unparseable.len());
        for path in &plan.unparseable {
            println!("  {}", crate::get_relative_path_or_filename(path, root));
        }
    }
}

/// Path relative to `root`, or the full path when it lies outside.
fn display_path(path: &Path, root: &Path) -> String {
    if path != root && path.starts_with(root) {
        crate::get_relative_path_or_filename(path, root)
    } else {
        crate::path_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::*;
    use crate::organize::PlannedAction;

    #[test]
    fn csv_has_header_and_one_row_per_action() {
        let dir = tempdir().unwrap();
        let report = dir.path().join("reports/plan.csv");
        let plan = Plan {
            actions: vec![
                PlannedAction::new(ActionKind::MkDir, PathBuf::from("/lib/A"), PathBuf::from("/lib/A")),
                PlannedAction::new(
                    ActionKind::MoveVideo,
                    PathBuf::from("/in/a, b.mkv"),
                    PathBuf::from("/lib/A/A (2000).mkv"),
                ),
            ],
            unparseable: Vec::new(),
        };

        write_plan_csv(&plan, &report).unwrap();

        let mut reader = csv::Reader::from_path(&report).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["action", "original", "proposed"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "mkdir");
        assert_eq!(&rows[1][0], "move_video");
        assert_eq!(&rows[1][1], "/in/a, b.mkv");
        assert_eq!(&rows[1][2], "/lib/A/A (2000).mkv");
    }

    #[test]
    fn display_path_is_relative_inside_root_only() {
        let root = Path::new("/media/in");
        assert_eq!(display_path(Path::new("/media/in/Show/a.mkv"), root), "Show/a.mkv");
        assert_eq!(display_path(Path::new("/media/lib/a.mkv"), root), "/media/lib/a.mkv");
    }
}
