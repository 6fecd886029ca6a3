use anyhow::Context;
use chrono::NaiveDate;
use gatekeeper_core::GateConfig;
use gatekeeper_core::time::DATE_FORMAT;
use gatekeeper_state::StateStore;

use super::open_store;

/// Print one day's access (or trespass) events, oldest first.
pub fn events(config: &GateConfig, date: &str, trespass: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let (date, rendered) = day_events(&store, date, trespass)?;
    if rendered.is_empty() {
        println!("No events recorded on {date}");
        return Ok(());
    }
    for line in rendered {
        println!("{line}");
    }
    Ok(())
}

/// The partition key for `date` and each event of that day as one JSON line.
fn day_events(
    store: &StateStore,
    date: &str,
    trespass: bool,
) -> anyhow::Result<(String, Vec<String>)> {
    let day = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .with_context(|| format!("invalid date {date:?}, expected YYYY-MM-DD"))?
        .format(DATE_FORMAT)
        .to_string();

    let rendered = if trespass {
        store
            .list_trespass_events(&day)?
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        store
            .list_access_events(&day)?
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok((day, rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gatekeeper_state::{AccessEvent, AccessOutcome, SchemaProvisioner, TrespassEvent};

    fn provisioned() -> StateStore {
        let store = StateStore::open_in_memory().unwrap();
        SchemaProvisioner::new(store.clone()).ensure_schema().unwrap();
        store
    }

    #[test]
    fn lists_one_day_in_order() {
        let store = provisioned();
        let late = Utc.with_ymd_and_hms(2025, 1, 15, 18, 30, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2025, 1, 15, 7, 5, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();
        store
            .put_access_event(&AccessEvent::at(late, "987-65-432", AccessOutcome::Guest))
            .unwrap();
        store
            .put_access_event(&AccessEvent::at(early, "123-45-678", AccessOutcome::Resident))
            .unwrap();
        store
            .put_access_event(&AccessEvent::at(next_day, "000-00-000", AccessOutcome::Denied))
            .unwrap();

        let (day, lines) = day_events(&store, "2025-01-15", false).unwrap();
        assert_eq!(day, "2025-01-15");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("123-45-678"));
        assert!(lines[1].contains("\"outcome\":\"guest\""));
    }

    #[test]
    fn trespass_flag_reads_trespass_log() {
        let store = provisioned();
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 2, 0, 0).unwrap();
        store
            .put_trespass_event(&TrespassEvent::at(at, "555-55-555", Some("gate forced".into())))
            .unwrap();

        let (_, access) = day_events(&store, "2025-01-15", false).unwrap();
        let (_, trespass) = day_events(&store, "2025-01-15", true).unwrap();
        assert!(access.is_empty());
        assert_eq!(trespass.len(), 1);
        assert!(trespass[0].contains("gate forced"));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let store = provisioned();
        assert!(day_events(&store, "15/01/2025", false).is_err());
    }
}
