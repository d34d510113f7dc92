//! The prune run: log in, pick repositories, sweep, report.

use anyhow::{Context, Result};
use tracing::info;

use hubprune_registry::{resolve_repositories, HubClient, Sweeper};

use crate::args::Cli;
use crate::console::Console;

/// Runs one prune pass.
///
/// # Errors
///
/// Returns an error if:
/// - The arguments are invalid
/// - Login or repository enumeration fails
/// - Any repository listing or tag deletion failed during the sweep
pub async fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;

    info!(
        registry = %settings.registry.url,
        username = settings.credentials.username(),
        threshold_days = settings.policy.threshold_days(),
        strategy = %settings.options.strategy,
        dry_run = settings.options.dry_run,
        "Starting prune"
    );

    let owner = settings.credentials.username().to_string();
    let client = HubClient::new(settings.registry).context("Failed to create registry client")?;
    let session = client
        .login(&settings.credentials)
        .await
        .context("Failed to log in to Docker Hub")?;

    let repositories = resolve_repositories(&session, settings.repositories, &owner)
        .await
        .with_context(|| format!("Failed to list repositories of {owner}"))?;

    let mut console = Console::new(std::io::stdout(), settings.options.dry_run);
    let report = Sweeper::new(&session, &settings.policy, settings.options)
        .run(&repositories, &mut console)
        .await;
    console.summary(&report);

    if report.has_failures() {
        anyhow::bail!(
            "{} tag deletions failed and {} repositories could not be processed",
            report.failed(),
            report.failed_repositories().count()
        );
    }

    Ok(())
}
