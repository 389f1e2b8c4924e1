//! Startup seeding of the bootstrap administrator.

use std::sync::Arc;

use tracing::info;

use devcamper::domain::ports::DocumentStore;
use devcamper::domain::{AdminSeed, Error, UserInput, UsersService};
use devcamper::settings::AppSettings;

/// Ensure the configured administrator exists.
///
/// Returns `Ok(None)` when no administrator is configured.
///
/// # Errors
/// Fails when the configured credentials are invalid or the store rejects
/// the write.
pub async fn seed_admin_on_startup(
    settings: &AppSettings,
    store: Arc<dyn DocumentStore>,
) -> Result<Option<AdminSeed>, Error> {
    let Some(admin) = settings.bootstrap_admin() else {
        info!(reason = "not configured", "bootstrap admin skipped");
        return Ok(None);
    };
    let outcome = UsersService::new(store)
        .ensure_admin(UserInput {
            name: Some(admin.name),
            email: Some(admin.email),
            role: None,
            password: Some(admin.password),
        })
        .await?;
    if let AdminSeed::Existing(user) = &outcome {
        info!(id = %user.id, "bootstrap admin already present");
    }
    Ok(Some(outcome))
}
