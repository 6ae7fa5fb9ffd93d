//! Duplicate login-email resolution

use std::collections::HashMap;

use tracing::debug;

use crate::events::{EventSink, PipelineEvent};
use crate::table::{Account, Table};

/// Keeps one record per login email
///
/// The survivor of a group is the record with the lexicographically smallest
/// last name; among equal last names the earliest record wins. Survivors keep
/// their relative table order.
pub struct Deduplicator;

impl Deduplicator {
    pub fn dedup(table: Table<Account>, sink: &mut dyn EventSink) -> Table<Account> {
        let before = table.len();

        // email -> index of the current survivor
        let mut winners: HashMap<&str, usize> = HashMap::new();
        for (idx, account) in table.records.iter().enumerate() {
            winners
                .entry(account.login_email.as_str())
                .and_modify(|best| {
                    if account.last_name < table.records[*best].last_name {
                        *best = idx;
                    }
                })
                .or_insert(idx);
        }
        let mut keep = vec![false; before];
        for idx in winners.into_values() {
            keep[idx] = true;
        }
        debug!(before, groups = keep.iter().filter(|k| **k).count(), "Deduplicator::dedup: survivors chosen");

        let mut flags = keep.into_iter();
        let deduped = table.retain(|_| flags.next().unwrap_or(false));
        sink.emit(PipelineEvent::Deduplicated {
            removed: before - deduped.len(),
            remaining: deduped.len(),
        });
        deduped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::PasswordStrength;
    use proptest::prelude::*;

    fn account(email: &str, first: &str, last: &str) -> Account {
        Account {
            login_email: email.to_string(),
            password: "default".to_string(),
            password_strength: PasswordStrength::Medium,
            first_name: first.to_string(),
            last_name: last.to_string(),
            department: "Sales".to_string(),
            extras: vec![],
        }
    }

    fn run(accounts: Vec<Account>) -> Vec<Account> {
        let mut events: Vec<PipelineEvent> = Vec::new();
        Deduplicator::dedup(Table::new(vec![], accounts), &mut events).records
    }

    #[test]
    fn test_smallest_last_name_survives() {
        let out = run(vec![
            account("ab12@example.com", "John", "Smith"),
            account("ab12@example.com", "Jane", "Adams"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].last_name, "Adams");
    }

    #[test]
    fn test_tie_keeps_first() {
        let out = run(vec![
            account("abc12@example.com", "John", "Doe"),
            account("abc12@example.com", "Jane", "Doe"),
            account("abc12@example.com", "Jim", "Zed"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].first_name, "John");
    }

    #[test]
    fn test_survivors_keep_table_order() {
        let out = run(vec![
            account("aaa11@example.com", "A", "Young"),
            account("bbb22@example.com", "B", "Brown"),
            account("aaa11@example.com", "C", "Allen"),
            account("ccc33@example.com", "D", "Hill"),
        ]);
        let firsts: Vec<&str> = out.iter().map(|a| a.first_name.as_str()).collect();
        assert_eq!(firsts, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let out = run(vec![
            account("abc12@example.com", "John", "adams"),
            account("abc12@example.com", "Jane", "Baker"),
        ]);
        assert_eq!(out[0].last_name, "Baker");
    }

    #[test]
    fn test_emits_counts() {
        let mut events: Vec<PipelineEvent> = Vec::new();
        Deduplicator::dedup(
            Table::new(
                vec![],
                vec![account("abc12@example.com", "A", "X"), account("abc12@example.com", "B", "Y")],
            ),
            &mut events,
        );
        assert_eq!(events, vec![PipelineEvent::Deduplicated { removed: 1, remaining: 1 }]);
    }

    proptest! {
        #[test]
        fn prop_emails_unique_and_survivor_minimal(rows in proptest::collection::vec((0u8..4, "[A-Za-z]{2,6}"), 0..40)) {
            let input: Vec<Account> = rows
                .iter()
                .map(|(e, last)| account(&format!("usr{e}10@example.com"), "First", last))
                .collect();
            let out = run(input.clone());

            let mut seen = std::collections::HashSet::new();
            for survivor in &out {
                prop_assert!(seen.insert(survivor.login_email.clone()));
                let min = input
                    .iter()
                    .filter(|a| a.login_email == survivor.login_email)
                    .map(|a| a.last_name.as_str())
                    .min();
                prop_assert_eq!(Some(survivor.last_name.as_str()), min);
            }
            let distinct: std::collections::HashSet<&str> = input.iter().map(|a| a.login_email.as_str()).collect();
            prop_assert_eq!(out.len(), distinct.len());
        }
    }
}
