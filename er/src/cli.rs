//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Eternal recurrence simulator that checkpoints on Ctrl+C
#[derive(Debug, Parser)]
#[command(
    name = "er",
    version,
    about = "Eternal recurrence simulator with checkpoint and resume on interrupt"
)]
pub struct Cli {
    /// Path to the save file (default: savegame.json next to the executable)
    #[arg(long = "save-path", value_name = "PATH")]
    pub save_path: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Stop after this many cycles
    #[arg(long = "max-cycles", value_name = "N")]
    pub max_cycles: Option<u64>,

    /// Speed factor applied to every delay (0 disables delays)
    #[arg(long, value_name = "FACTOR")]
    pub pace: Option<f64>,

    /// Seed for the score and narrative generators
    #[arg(long)]
    pub seed: Option<u64>,

    /// Suppress per-cycle narrative output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::parse_from([
            "er",
            "--save-path",
            "/tmp/saves/run.json",
            "--max-cycles",
            "3",
            "--pace",
            "0",
            "--seed",
            "7",
            "-l",
            "debug",
            "--quiet",
        ]);

        assert_eq!(cli.save_path, Some(PathBuf::from("/tmp/saves/run.json")));
        assert_eq!(cli.max_cycles, Some(3));
        assert_eq!(cli.pace, Some(0.0));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.quiet);
    }

    #[test]
    fn test_no_options_leaves_everything_unset() {
        let cli = Cli::parse_from(["er"]);
        assert!(cli.save_path.is_none());
        assert!(cli.config.is_none());
        assert!(cli.max_cycles.is_none());
        assert!(!cli.quiet);
    }
}
