use chrono::{DateTime, Utc};
use gatekeeper_core::GateConfig;
use gatekeeper_state::AccessGrantStore;

use super::open_store;

pub fn resident(config: &GateConfig, plate: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    match store.get_resident(plate)? {
        Some(resident) => println!("{}", serde_json::to_string_pretty(&resident)?),
        None => anyhow::bail!("no resident with plate {plate}"),
    }
    Ok(())
}

pub fn guest(config: &GateConfig, plate: &str) -> anyhow::Result<()> {
    let grants = AccessGrantStore::new(open_store(config)?);
    let Some(grant) = grants.get_grant(plate)? else {
        anyhow::bail!("no guest grant for plate {plate}");
    };

    println!("{}", serde_json::to_string_pretty(&grant)?);
    let expires = format_expiry(grant.expiration_ttl);
    if grant.is_active(Utc::now().timestamp()) {
        println!("✓ Active until {expires}");
    } else {
        println!("✗ Expired at {expires} (awaiting sweep)");
    }
    Ok(())
}

fn format_expiry(timestamp_secs: i64) -> String {
    DateTime::from_timestamp(timestamp_secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_renders_in_utc() {
        assert_eq!(format_expiry(1_736_935_200), "2025-01-15 10:00:00 UTC");
    }
}
