//! Rows are consumed as a multiset, whatever order the checks run in.

use ecctool_verify::rows::RowSet;
use ecctool_verify::validate::{match_and_remove_row, validate_last_table_row, validate_row_count};
use proptest::prelude::*;

const BORDER: &str = "--------------------------------------------";

fn row(keyspace: &str, table: &str) -> String {
    format!(
        "| 5a4b1c4e-8f3a-11e9-bc42-526af7764f64 | {}   | {}  | COMPLETED | 100.00 | 2019-05-01 10:00:00 | 2019-05-08 10:00:00 | True |",
        keyspace, table
    )
}

fn tables() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("ks[0-9]", "tbl[0-9]"), 0..8)
}

proptest! {
    #[test]
    fn every_row_is_matched_exactly_once_in_any_order(
        tables in tables(),
        seed in any::<u64>(),
    ) {
        let mut lines: Vec<String> = tables.iter().map(|(ks, tbl)| row(ks, tbl)).collect();
        lines.push(BORDER.to_string());
        let mut rows = RowSet::new(lines);

        // Check in a rotated order; duplicates must each be consumed once.
        let mut order = tables.clone();
        if !order.is_empty() {
            let shift = (seed % order.len() as u64) as usize;
            order.rotate_left(shift);
        }
        for (ks, tbl) in &order {
            prop_assert!(match_and_remove_row(&mut rows, ks, tbl).is_ok());
        }
        prop_assert!(validate_last_table_row(&mut rows).is_ok());
        prop_assert!(rows.is_empty());
    }

    #[test]
    fn an_extra_check_always_fails(tables in tables()) {
        prop_assume!(!tables.is_empty());
        let mut lines: Vec<String> = tables.iter().map(|(ks, tbl)| row(ks, tbl)).collect();
        lines.push(BORDER.to_string());
        let mut rows = RowSet::new(lines);

        for (ks, tbl) in &tables {
            match_and_remove_row(&mut rows, ks, tbl).unwrap();
        }
        let (ks, tbl) = &tables[0];
        prop_assert!(match_and_remove_row(&mut rows, ks, tbl).is_err());
    }

    #[test]
    fn row_count_accepts_only_the_exact_count(tables in tables(), wrong in 0usize..10) {
        let mut lines: Vec<String> = tables.iter().map(|(ks, tbl)| row(ks, tbl)).collect();
        lines.push(BORDER.to_string());

        let mut exact = RowSet::new(lines.clone());
        prop_assert!(validate_row_count(&mut exact, tables.len()).is_ok());

        prop_assume!(wrong != tables.len());
        let mut off = RowSet::new(lines);
        prop_assert!(validate_row_count(&mut off, wrong).is_err());
    }
}
