//! CLI commands.

mod codes;
mod inspect;
mod issue;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// pitchside CLI - Decode, validate and issue Job, Application and Booking IDs.
#[derive(Debug, Parser)]
#[command(name = "pitch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table", env = "PITCH_FORMAT")]
    format: OutputFormat,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decode an identifier into its fields.
    Parse(inspect::ParseCommand),

    /// Check one or more identifiers against the grammar.
    Validate(inspect::ValidateCommand),

    /// Print the parent Job ID of an Application ID.
    Parent(inspect::ParentCommand),

    /// Describe an identifier in words.
    Describe(inspect::DescribeCommand),

    /// Look up category, city and location codes.
    Codes(codes::CodesCommand),

    /// Issue new identifiers.
    Issue(issue::IssueCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    pub fn log_json(&self) -> bool {
        self.log_json
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let ctx = CommandContext {
            format: self.format,
        };

        match self.command {
            Commands::Parse(cmd) => cmd.run(ctx),
            Commands::Validate(cmd) => cmd.run(ctx),
            Commands::Parent(cmd) => cmd.run(ctx),
            Commands::Describe(cmd) => cmd.run(ctx),
            Commands::Codes(cmd) => cmd.run(ctx),
            Commands::Issue(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("pitch {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_apply_to_subcommands() {
        let cli = Cli::try_parse_from(["pitch", "parse", "JCOBAPA001", "--format", "json", "--log-json"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.log_json());
        assert!(matches!(cli.command, Commands::Parse(_)));
    }

    #[test]
    fn issue_job_requires_category_and_location() {
        assert!(Cli::try_parse_from(["pitch", "issue", "job", "--category", "Coach"]).is_err());
        assert!(Cli::try_parse_from([
            "pitch",
            "issue",
            "job",
            "--category",
            "Coach",
            "--location",
            "Bangalore, Pallikaranai",
        ])
        .is_ok());
    }
}
