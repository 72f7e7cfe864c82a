//! The summary line parses back to the counters it was printed from.

use ecctool_verify::status::{RepairStatus, StatusSummary};
use proptest::prelude::*;

proptest! {
    #[test]
    fn printed_summary_parses_to_same_counters(
        completed in 0u64..1_000_000,
        in_queue in 0u64..1_000_000,
        warning in 0u64..1_000_000,
        error in 0u64..1_000_000,
    ) {
        let summary = StatusSummary { completed, in_queue, warning, error };
        let parsed: StatusSummary = summary.to_string().parse().unwrap();
        prop_assert_eq!(parsed, summary);
        prop_assert_eq!(
            RepairStatus::ALL.iter().map(|s| parsed.count(*s)).sum::<u64>(),
            parsed.total()
        );
    }

    #[test]
    fn lines_without_the_summary_prefix_are_rejected(line in "[a-z ,0-9]{0,40}") {
        prop_assert!(line.parse::<StatusSummary>().is_err());
    }
}
