//! Pull an owner's data from the backend into the local cache.

use atomo_app::AppState;
use atomo_app::config::AtomoConfig;
use atomo_core::ProfileId;

use super::CommandError;

/// Sync everything `owner` has and print the per-step report as JSON.
///
/// # Errors
///
/// Returns `CommandError::IncompleteSync` when any step failed, after the
/// report has been printed.
pub async fn run(owner: &ProfileId) -> Result<(), CommandError> {
    let config = AtomoConfig::from_env()?;
    let state = AppState::connect(&config).await?;

    let report = state.sync().run(owner).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match report.failures().count() {
        0 => Ok(()),
        failed => Err(CommandError::IncompleteSync(failed)),
    }
}
