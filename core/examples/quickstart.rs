//! Create, list, look up, update and delete a user.
//!
//! Start the mock server first (`cargo run -p mock-server`), then run
//! `cargo run -p uniorm-client --example quickstart`. Set `UNIORM_URL` to
//! point at another service.

use tracing_subscriber::EnvFilter;
use uniorm_client::{create_client, ClientError, CreateUser, UpdateUser};

fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url =
        std::env::var("UNIORM_URL").unwrap_or_else(|_| "http://localhost:6499".to_string());
    let client = create_client(&base_url)?;

    let created = client.user.create(&CreateUser {
        name: "Alice".to_string(),
        email: None,
    })?;
    tracing::info!(?created, "created user");

    let users = client.user.find_many()?;
    tracing::info!(count = users.len(), "all users");

    let found = client.user.find_unique(&created.id)?;
    tracing::info!(?found, "found user");

    let updated = client.user.update(
        &created.id,
        &UpdateUser {
            name: Some("Alice Updated".to_string()),
            ..Default::default()
        },
    )?;
    tracing::info!(?updated, "updated user");

    client.user.delete(&created.id)?;
    tracing::info!(id = %created.id, "deleted user");
    Ok(())
}
