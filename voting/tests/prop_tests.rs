use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use votesecure_types::Timestamp;
use votesecure_voting::fallback_transaction_id;

proptest! {
    /// Generated ids always read `VT-<secs>-` followed by nine base36 characters.
    #[test]
    fn fallback_ids_are_well_formed(secs in 0u64..4_000_000_000, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let id = fallback_transaction_id(Timestamp::new(secs), &mut rng);
        let prefix = format!("VT-{secs}-");
        prop_assert!(id.starts_with(&prefix));
        let suffix = &id[prefix.len()..];
        prop_assert_eq!(suffix.len(), 9);
        prop_assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
