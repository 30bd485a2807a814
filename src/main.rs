//! # modpush: The Main Entry Point
//!
//! Parses the (few) command line flags, initializes logging, and hands off to
//! the deploy sequence. Run with no arguments from the directory next to the
//! mod's working tree.

use clap::Parser;
use log::{error, LevelFilter};
use simplelog::{Config, SimpleLogger};

mod deploy;
mod invariants;
mod paths;
mod platform;
mod shell;
mod timestamp;

use deploy::FailurePolicy;

/// Copies the mod into Factorio's mods folder, stamps the build time,
/// opens the folder, and says "done".
#[derive(Parser)]
#[command(name = "modpush", version)]
#[command(
    about = "Deploy a Factorio mod working tree into the local mods folder",
    long_about = "Deploy a Factorio mod working tree into the local mods folder.\n\n\
Every step runs even if an earlier one failed, and the exit status is 0. \
Two cases exit 1: --strict stops at the first failing step, and a user \
without a home directory has no mods folder to deploy into."
)]
struct Cli {
    /// Print what would be copied and which commands would run, then stop.
    #[arg(long)]
    dry_run: bool,

    /// Stop at the first step that exits non-zero instead of carrying on.
    ///
    /// Without this flag every step runs regardless of how the previous one went.
    #[arg(long)]
    strict: bool,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    // Determine log level based on verbosity flag
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // A logger that fails to install shouldn't stop the deploy
    let _ = SimpleLogger::init(log_level, Config::default());

    // Without --strict, step failures are collected but never acted on
    let policy = if cli.strict {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Ignore
    };

    // Only --strict or an unresolvable home directory end up here
    if let Err(e) = deploy::deploy(cli.dry_run, policy) {
        error!("Deploy failed: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_a_plain_run() {
        let cli = Cli::try_parse_from(["modpush"]).unwrap();
        assert!(!cli.dry_run);
        assert!(!cli.strict);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from(["modpush", "--dry-run", "--strict", "-vv"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.strict);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["modpush", "somewhere"]).is_err());
    }

    #[test]
    fn test_long_help_states_when_exit_is_nonzero() {
        use clap::CommandFactory;
        let about = Cli::command()
            .get_long_about()
            .map(|s| s.to_string())
            .unwrap_or_default();
        assert!(about.contains("exit status is 0"), "{about}");
        assert!(about.contains("--strict"), "{about}");
        assert!(about.contains("home directory"), "{about}");
    }
}
