//! Identifier issuance.
//!
//! The memory backend keeps counters for the life of the process only, so
//! each run starts every scope at 001. The postgres backend allocates from
//! `id_sequences` and registers each identifier in `issued_ids`.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use pitchside_id::tables::fallback_counts;
use pitchside_id::{AnyId, IdIssuer, MemoryAllocator, SequenceAllocator};
use pitchside_registry::{IdRegistry, RegistryConfig};
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use super::CommandContext;
use crate::error::CliError;
use crate::output::{print_info, print_output, print_success, OutputFormat};

#[derive(Debug, Args)]
pub struct IssueCommand {
    /// Where sequence counters live.
    #[arg(long, global = true, value_enum, default_value = "memory", env = "PITCH_BACKEND")]
    backend: Backend,

    /// Number of identifiers to issue.
    #[arg(long, global = true, default_value = "1", value_parser = clap::value_parser!(u16).range(1..=999))]
    count: u16,

    #[command(subcommand)]
    command: IssueSubcommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// In-process counters, discarded on exit.
    Memory,
    /// Postgres counters and registry (DATABASE_URL).
    Postgres,
}

#[derive(Debug, Subcommand)]
enum IssueSubcommand {
    /// Issue Job IDs.
    Job(LocalityArgs),

    /// Issue Booking IDs.
    Booking(LocalityArgs),

    /// Issue Application IDs under a Job.
    Application(ApplicationArgs),
}

#[derive(Debug, Args)]
struct LocalityArgs {
    /// Category name, e.g. Coach.
    #[arg(long)]
    category: String,

    /// Free-text location, e.g. "Bangalore, Pallikaranai".
    #[arg(long)]
    location: String,
}

#[derive(Debug, Args)]
struct ApplicationArgs {
    /// Parent Job ID.
    job_id: String,
}

#[derive(Debug, Serialize, Tabled)]
struct IssuedRow {
    #[tabled(rename = "ID")]
    id: AnyId,

    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    kind: String,

    #[tabled(rename = "Description")]
    description: String,
}

impl From<AnyId> for IssuedRow {
    fn from(id: AnyId) -> Self {
        Self {
            kind: id.kind().to_string(),
            description: id.describe(),
            id,
        }
    }
}

impl IssueCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let ids = match self.backend {
            Backend::Memory => {
                let issuer = IdIssuer::new(MemoryAllocator::new());
                issue_unregistered(&issuer, &self.command, self.count).await?
            }
            Backend::Postgres => {
                let config = RegistryConfig::from_env()?;
                let (issuer, registry) = pitchside_registry::connect(&config).await?;
                issue_registered(&issuer, &registry, &self.command, self.count).await?
            }
        };
        info!(backend = ?self.backend, issued = ids.len(), "issued identifiers");

        let rows: Vec<IssuedRow> = ids.into_iter().map(IssuedRow::from).collect();
        print_output(&rows, ctx.format);

        if ctx.format == OutputFormat::Table {
            print_success(&format!("Issued {} identifier(s)", rows.len()));
            if self.backend == Backend::Memory {
                print_info("Memory backend: counters are not kept between runs.");
            }
            let fallbacks = fallback_counts();
            if fallbacks.category > 0 || fallbacks.city > 0 {
                print_info("Category or city not in the code tables; fallback codes used.");
            }
        }
        Ok(())
    }
}

/// Issues identifiers straight from the allocator, without a registry.
async fn issue_unregistered<A: SequenceAllocator>(
    issuer: &IdIssuer<A>,
    command: &IssueSubcommand,
    count: u16,
) -> Result<Vec<AnyId>, CliError> {
    let mut ids = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let id: AnyId = match command {
            IssueSubcommand::Job(args) => issuer
                .compose_job_id(&args.category, &args.location)
                .await?
                .into(),
            IssueSubcommand::Booking(args) => issuer
                .compose_booking_id(&args.category, &args.location)
                .await?
                .into(),
            IssueSubcommand::Application(args) => {
                issuer.compose_application_id(&args.job_id).await?.into()
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

/// Issues identifiers and registers each one, retrying on collisions.
async fn issue_registered<A: SequenceAllocator>(
    issuer: &IdIssuer<A>,
    registry: &IdRegistry,
    command: &IssueSubcommand,
    count: u16,
) -> Result<Vec<AnyId>, CliError> {
    let mut ids = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let id: AnyId = match command {
            IssueSubcommand::Job(args) => registry
                .issue_job(issuer, &args.category, &args.location)
                .await?
                .into(),
            IssueSubcommand::Booking(args) => registry
                .issue_booking(issuer, &args.category, &args.location)
                .await?
                .into(),
            IssueSubcommand::Application(args) => {
                registry.issue_application(issuer, &args.job_id).await?.into()
            }
        };
        ids.push(id);
    }
    Ok(ids)
}
