//! CLI argument parsing for the orbis-worker binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "orbis-worker", about = "Orbis property services backend worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Run a scheduled job immediately and exit
    TriggerJob {
        /// Job name, e.g. zone-head-morning-summary
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_migrate_command_parses() {
        let cli = Cli::parse_from(["orbis-worker", "migrate"]);
        assert!(matches!(cli.command, Some(Command::Migrate)));
    }

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["orbis-worker"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_trigger_job_takes_name() {
        let cli = Cli::parse_from(["orbis-worker", "trigger-job", "notification-dispatch"]);
        match cli.command {
            Some(Command::TriggerJob { name }) => assert_eq!(name, "notification-dispatch"),
            _ => panic!("expected trigger-job"),
        }
    }
}
