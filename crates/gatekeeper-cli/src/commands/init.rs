use gatekeeper_core::GateConfig;
use gatekeeper_state::{sample_residents, seed_residents, ExpiryStatus, ReadyPolicy, SchemaProvisioner};
use tracing::info;

use super::open_store;

pub fn init_db(config: &GateConfig, seed: bool) -> anyhow::Result<()> {
    info!(path = ?config.storage.path, "starting database initialization");
    let store = open_store(config)?;

    let report = SchemaProvisioner::new(store.clone())
        .with_ready_policy(ReadyPolicy::from(&config.provisioning))
        .ensure_schema()?;

    for name in &report.created {
        println!("✓ Created collection '{name}'");
    }
    for name in &report.skipped {
        println!("· Collection '{name}' already exists, skipped");
    }
    for failure in &report.failed {
        println!("✗ Collection '{}' failed: {}", failure.collection, failure.error);
    }
    for outcome in &report.expiry {
        match &outcome.status {
            ExpiryStatus::Enabled => println!(
                "✓ Expiry enabled on '{}' ({})",
                outcome.collection, outcome.attribute
            ),
            ExpiryStatus::AlreadyEnabled => println!(
                "· Expiry already enabled on '{}' ({})",
                outcome.collection, outcome.attribute
            ),
            ExpiryStatus::Failed(error) => {
                println!("✗ Expiry on '{}' failed: {error}", outcome.collection)
            }
        }
    }

    if seed {
        let written = seed_residents(&store, &sample_residents())?;
        println!("✓ Seeded {written} sample residents");
    }

    if !report.is_complete() {
        anyhow::bail!("database initialization finished with errors");
    }
    println!("Database initialization complete.");
    Ok(())
}
