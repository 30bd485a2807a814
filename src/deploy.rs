//! # Deploy Logic
//!
//! The whole tool is one straight line of shell steps:
//! 1. Mirror the mod's working tree into the mods folder (`rsync`, dotfiles excluded).
//! 2. Stamp the current time over `DEBUG_BUILD_TIME` in `logging.lua` (`sed`).
//! 3. Open the mods folder in the file browser.
//! 4. Tell the user which log to tail, then say "done" out loud.
//!
//! By default no step looks at how the previous one went. A failed sync still
//! stamps, opens and announces. `FailurePolicy::Abort` (`--strict`) is the
//! opt-in alternative that stops at the first non-zero exit.

use std::fmt;
use std::path::Path;
use anyhow::{Result, bail};
use log::{debug, info, trace};
use crate::invariants::assert_invariant;
use crate::paths::{self, DeployPaths};
use crate::platform::{self, quote, quote_path};
use crate::shell::{PosixShell, ShellOps, ShellOutput};
use crate::timestamp;

/// Placeholder in `logging.lua` that receives the build time.
pub const BUILD_TIME_TOKEN: &str = "DEBUG_BUILD_TIME";

/// What to do when a step exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep going. Exit codes are collected and logged, never acted on.
    #[default]
    Ignore,
    /// Stop the run with an error naming the failed step.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Mirror,
    StampBuildTime,
    OpenModsFolder,
    Announce,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::Mirror => "mirror",
            Step::StampBuildTime => "stamp build time",
            Step::OpenModsFolder => "open mods folder",
            Step::Announce => "announce",
        };
        f.write_str(label)
    }
}

/// The outcome of one step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: Step,
    pub command: String,
    pub result: ShellOutput,
}

/// Entry point used by `main`: resolve the real locations and run (or preview) the deploy.
pub fn deploy(dry_run: bool, policy: FailurePolicy) -> Result<()> {
    let paths = DeployPaths::resolve()?;

    if dry_run {
        for line in preview(&paths, &timestamp::now()) {
            println!("{}", line);
        }
        return Ok(());
    }

    info!("Deploying {} to {:?}", paths::MOD_NAME, paths.destination);
    let reports = run_deploy(&paths, &PosixShell, policy, timestamp::now)?;
    let failed: Vec<&StepReport> = reports.iter().filter(|r| !r.result.success()).collect();
    for r in &failed {
        debug!("  {} exited {}: {}", r.step, r.result.exit_code, r.command);
    }
    info!("Deploy finished ({} of {} steps exited non-zero)", failed.len(), reports.len());
    Ok(())
}

/// Runs every step in order against `shell`.
///
/// `clock` is called once, after the mirror step, to produce the build timestamp.
///
/// # Returns
///
/// One `StepReport` per step that ran. With `FailurePolicy::Ignore` this is
/// always all four and the call never fails.
pub fn run_deploy(
    paths: &DeployPaths,
    shell: &impl ShellOps,
    policy: FailurePolicy,
    clock: impl FnOnce() -> String,
) -> Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(4);

    run_step(shell, policy, Step::Mirror, mirror_command(paths), &mut reports)?;

    let build_time = clock();
    debug!("Build time: {}", build_time);
    run_step(
        shell,
        policy,
        Step::StampBuildTime,
        stamp_command(&paths.logging_file, &build_time),
        &mut reports,
    )?;

    run_step(shell, policy, Step::OpenModsFolder, open_command(paths), &mut reports)?;

    println!("{}", tail_hint(paths));

    run_step(shell, policy, Step::Announce, announce_command(), &mut reports)?;

    Ok(reports)
}

fn run_step(
    shell: &impl ShellOps,
    policy: FailurePolicy,
    step: Step,
    command: String,
    reports: &mut Vec<StepReport>,
) -> Result<()> {
    debug!("[{}] {}", step, command);
    let result = shell.run(&command);
    trace!("[{}] output:\n{}", step, result.text());

    if !result.success() {
        match policy {
            FailurePolicy::Ignore => {
                debug!("[{}] exited with {} (ignored)", step, result.exit_code);
            }
            FailurePolicy::Abort => {
                bail!(
                    "Step '{}' failed with exit code {}\n  command: {}\n  output: {}",
                    step,
                    result.exit_code,
                    command,
                    result.text().trim_end()
                );
            }
        }
    }

    reports.push(StepReport { step, command, result });
    Ok(())
}

/// `rsync -av` of the source's contents into the destination, skipping dotfiles.
pub fn mirror_command(paths: &DeployPaths) -> String {
    // Trailing slash: copy the contents of the source, not the directory itself.
    let source = format!("{}/", paths.source.to_string_lossy().trim_end_matches('/'));
    format!(
        "rsync -av {} {} {}",
        quote("--exclude=.*"),
        quote(&source),
        quote_path(&paths.destination)
    )
}

/// In-place `sed` that swaps every `BUILD_TIME_TOKEN` in `file` for `value`, literally.
pub fn stamp_command(file: &Path, value: &str) -> String {
    let replacement = sed_replacement_escape(value);
    assert_invariant(
        !has_unescaped_slash(&replacement),
        "sed replacement has no bare delimiter",
        Some("Deploy"),
    );
    let script = format!("s/{}/{}/g", sed_pattern_escape(BUILD_TIME_TOKEN), replacement);
    format!("{} {} {}", platform::sed_in_place(), quote(&script), quote_path(file))
}

pub fn open_command(paths: &DeployPaths) -> String {
    format!("{} {}", platform::opener(), quote_path(&paths.mods_dir))
}

pub fn announce_command() -> String {
    format!("{} done", platform::speaker())
}

/// The line printed for the user once the mod is in place.
pub fn tail_hint(paths: &DeployPaths) -> String {
    format!(
        "Reload the save and run the following: tail -f {}",
        quote_path(&paths.game_log)
    )
}

/// Escapes `raw` for the right-hand side of a sed `s/…/…/` so it is inserted verbatim.
pub fn sed_replacement_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' | '/' | '&' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes `raw` as a basic regular expression matching exactly that text.
pub fn sed_pattern_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\/.*[]^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn has_unescaped_slash(escaped: &str) -> bool {
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '/' => return true,
            _ => {}
        }
    }
    false
}

/// The report for a dry run: what a real run would copy and execute.
/// Nothing is spawned.
fn preview(paths: &DeployPaths, build_time: &str) -> Vec<String> {
    let files = paths::mirrored_files(&paths.source);
    let mut lines = vec![
        String::new(),
        "--- DRY RUN: nothing will be copied, edited, opened or spoken ---".to_string(),
        String::new(),
        format!("Source:      {}", paths.source.display()),
        format!("Destination: {}", paths.destination.display()),
        format!("Build time:  {}", build_time),
        String::new(),
    ];

    if files.is_empty() {
        lines.push(format!("No files to mirror (is {} missing?)", paths.source.display()));
    } else {
        lines.push(format!("Would mirror {} files:", files.len()));
        lines.extend(files.iter().map(|f| format!("    + {}", f.display())));
    }

    lines.push(String::new());
    lines.push("Commands:".to_string());
    lines.push(format!("  1. {}", mirror_command(paths)));
    lines.push(format!("  2. {}", stamp_command(&paths.logging_file, build_time)));
    lines.push(format!("  3. {}", open_command(paths)));
    lines.push(format!("  4. {}", announce_command()));
    lines.push(String::new());
    lines
}
