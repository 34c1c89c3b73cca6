//! Read-only views of an owner's services and plan limits.
//!
//! Both commands read the local cache only. Run `atomo sync` first to see
//! fresh data.

use serde_json::json;

use atomo_app::AppState;
use atomo_app::config::AtomoConfig;
use atomo_core::{ProfileId, ServiceType};

use super::CommandError;

/// Print the owner's services, counts and plan.
///
/// # Errors
///
/// Returns an error if configuration is missing or the cache cannot be read.
#[allow(clippy::print_stdout)]
pub async fn list(owner: &ProfileId, as_json: bool) -> Result<(), CommandError> {
    let config = AtomoConfig::from_env()?;
    let state = AppState::connect(&config).await?;
    let summary = state.dashboard().load(owner).await?;

    if as_json {
        let services: Vec<_> = summary
            .services
            .iter()
            .map(|s| {
                json!({
                    "service": s.reference.service_type(),
                    "id": s.reference.id(),
                    "title": s.title,
                    "created_at": s.created_at,
                })
            })
            .collect();
        let body = json!({
            "owner": owner,
            "plan": summary.plan.id,
            "subscription": summary.subscription,
            "services": services,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Plan: {} ({})", summary.plan.name, summary.plan.id);
        for service in ServiceType::ALL {
            println!(
                "{:<12} {:>3} / {}",
                service.as_str(),
                summary.counts.get(service),
                summary.plan.features.service_limit(service)
            );
        }
        for s in &summary.services {
            println!("{}  {}", s.reference, s.title);
        }
    }

    Ok(())
}

/// Print the limit gate's decision for one more `service`.
///
/// # Errors
///
/// Returns an error if configuration is missing or the cache cannot be read.
pub async fn can_create(owner: &ProfileId, service: ServiceType) -> Result<(), CommandError> {
    let config = AtomoConfig::from_env()?;
    let state = AppState::connect(&config).await?;
    let decision = state.gate().check(owner, service).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string(&decision)?);
    }

    Ok(())
}
