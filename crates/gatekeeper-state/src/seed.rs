//! Bootstrap loader for development and test environments.

use tracing::info;

use crate::error::StateResult;
use crate::store::StateStore;
use crate::types::Resident;

/// Write `residents` using the batched-write primitive. Existing records
/// with the same plate are replaced, so reruns converge. Not atomic across
/// batches.
pub fn seed_residents(state: &StateStore, residents: &[Resident]) -> StateResult<usize> {
    info!(count = residents.len(), "seeding residents");
    let written = state.put_residents_batch(residents)?;
    info!(written, "residents seeded");
    Ok(written)
}

/// Fixed development residents.
pub fn sample_residents() -> Vec<Resident> {
    [
        ("123-45-678", "Yossi Cohen", "Ha-Yarkon St 99, Tel Aviv-Yafo", "2025-01-15T10:00:00Z"),
        ("234-56-789", "Dana Levi", "Dizengoff St 123, Tel Aviv-Yafo", "2025-02-20T11:30:00Z"),
        ("345-67-890", "Moshe Katz", "Rothschild Blvd 45, Tel Aviv-Yafo", "2025-03-05T09:45:00Z"),
    ]
    .into_iter()
    .map(|(plate, owner, address, created_at)| Resident {
        license_plate: plate.to_string(),
        owner_name: owner.to_string(),
        address: address.to_string(),
        created_at: created_at.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaProvisioner;

    fn provisioned() -> StateStore {
        let state = StateStore::open_in_memory().unwrap();
        SchemaProvisioner::new(state.clone()).ensure_schema().unwrap();
        state
    }

    #[test]
    fn seeded_resident_is_readable() {
        let state = provisioned();
        assert_eq!(seed_residents(&state, &sample_residents()).unwrap(), 3);

        let resident = state.get_resident("123-45-678").unwrap().unwrap();
        assert_eq!(resident.owner_name, "Yossi Cohen");
    }

    #[test]
    fn reseeding_converges() {
        let state = provisioned();
        seed_residents(&state, &sample_residents()).unwrap();

        let mut edited = sample_residents();
        edited[1].address = "Allenby St 1, Tel Aviv-Yafo".to_string();
        seed_residents(&state, &edited).unwrap();

        assert_eq!(state.list_residents().unwrap().len(), 3);
        let dana = state.get_resident("234-56-789").unwrap().unwrap();
        assert_eq!(dana.address, "Allenby St 1, Tel Aviv-Yafo");
    }
}
