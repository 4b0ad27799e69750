use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;

use media_sort::organize::{
    ApplySummary, Classifier, Lexicon, MediaSortConfig, Plan, PlanBuilder, PlanExecutor, PolicyDecisions, SortConfig,
    SystemUnlocker, Tokenizer, collect_candidates, print_plan, write_plan_csv,
};
use media_sort::{print_bold, print_warning};

use crate::MediaSortArgs;
use crate::config;
use crate::logger::FileLogger;
use crate::prompt::{self, TerminalDecisions};

#[derive(Debug)]
pub struct MediaSort {
    root: PathBuf,
    config: SortConfig,
    lexicon: Lexicon,
}

impl MediaSort {
    pub fn new(args: MediaSortArgs) -> Result<Self> {
        let root = media_sort::resolve_input_path(args.path.as_deref())?;
        let user_config = MediaSortConfig::get_user_config()?;
        let mut config = config::from_args(args, user_config);
        config.destination = config
            .destination
            .as_deref()
            .map(config::absolute_destination)
            .transpose()?;
        let lexicon = Lexicon::from_config(&config)?;
        if config.debug {
            println!("{config}");
            println!("Root: {}", root.display());
        }
        Ok(Self { root, config, lexicon })
    }

    pub fn run(&self) -> Result<()> {
        let candidates = collect_candidates(&self.root, &self.config, &self.lexicon);
        if candidates.is_empty() {
            println!("No video files found in {}", self.root.display());
            return Ok(());
        }
        if self.config.verbose {
            println!("Found {} video file(s)", candidates.len());
        }
        if self.config.debug {
            self.print_removed_tokens(&candidates);
        }

        let plan = PlanBuilder::new(&self.root, &self.config, &self.lexicon).build(&candidates)?;
        let display_root = self.display_root();
        print_plan(&plan, display_root, self.config.verbose);

        write_plan_csv(&plan, &self.config.report)
            .with_context(|| format!("Failed to write report {}", self.config.report.display()))?;
        if self.config.verbose {
            println!("Report written to {}", self.config.report.display());
        }

        let changes = plan.change_count();
        if changes == 0 {
            println!("{}", "Nothing to change".green());
            return Ok(());
        }
        print_bold!("{changes} change(s) planned");
        if self.config.dryrun {
            return Ok(());
        }
        if !self.config.auto && !prompt::confirm("Apply changes? (y/n): ")? {
            println!("Cancelled");
            return Ok(());
        }

        self.apply(&plan)
    }

    fn apply(&self, plan: &Plan) -> Result<()> {
        let abort_flag = Arc::new(AtomicBool::new(false));
        let abort_flag_handler = Arc::clone(&abort_flag);

        ctrlc::set_handler(move || {
            if abort_flag_handler.load(Ordering::SeqCst) {
                // Second Ctrl+C - force exit
                std::process::exit(130);
            }
            println!("\n{}", "Received Ctrl+C, finishing current move...".yellow().bold());
            abort_flag_handler.store(true, Ordering::SeqCst);
        })
        .context("Failed to set Ctrl+C handler")?;

        let mut logger = match FileLogger::new() {
            Ok(logger) => Some(logger),
            Err(error) => {
                print_warning!("Apply log disabled: {error}");
                None
            }
        };
        if let Some(logger) = logger.as_mut() {
            logger.log_init(&self.root, &self.config, plan);
        }

        let summary = self.execute(plan, abort_flag);

        if let Some(logger) = logger.as_mut() {
            logger.log_summary(&summary);
            if self.config.verbose {
                println!("Log written to {}", logger.path().display());
            }
        }
        if summary.aborted {
            println!("\n{}", "Aborted by user".bold().red());
        }
        summary.print_summary();

        Ok(())
    }

    /// Non-interactive runs decide by policy, otherwise the operator is asked.
    fn execute(&self, plan: &Plan, abort_flag: Arc<AtomicBool>) -> ApplySummary {
        if self.config.auto {
            PlanExecutor::new(
                SystemUnlocker,
                PolicyDecisions::new(self.config.max_attempts, self.config.auto_unlock),
            )
            .with_abort_flag(abort_flag)
            .with_auto_unlock(self.config.auto_unlock)
            .verbose(self.config.verbose)
            .apply(plan)
        } else {
            PlanExecutor::new(SystemUnlocker, TerminalDecisions)
                .with_abort_flag(abort_flag)
                .with_auto_unlock(self.config.auto_unlock)
                .verbose(self.config.verbose)
                .apply(plan)
        }
    }

    /// Show which tokens get dropped from each name.
    fn print_removed_tokens(&self, candidates: &[PathBuf]) {
        let tokenizer = Tokenizer::new(&self.lexicon);
        let classifier = Classifier::new(&self.lexicon);
        for path in candidates {
            let tokens = tokenizer.tokenize(&media_sort::path_to_file_stem_string(path));
            let classification = classifier.classify(&tokens);
            let removed = classification.removed_tokens();
            if !removed.is_empty() {
                println!(
                    "{}: {}",
                    media_sort::path_to_filename_string(path),
                    removed.iter().join(" ").dimmed()
                );
            }
        }
    }

    fn display_root(&self) -> &Path {
        if self.root.is_file() {
            self.root.parent().unwrap_or(&self.root)
        } else {
            &self.root
        }
    }
}
