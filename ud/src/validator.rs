//! Field-level correction rules
//!
//! Malformed or missing identity fields are never errors here. Bad emails and
//! names are replaced with synthetic values, and missing departments take the
//! most common department of the batch.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::events::{EventSink, PipelineEvent};
use crate::synth::Synthesizer;
use crate::table::{RawRecord, Table, ValidatedRecord};

/// Shortest first or last name accepted as real
pub const MIN_NAME_LENGTH: usize = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{3,}\d{2}@example\.com$").expect("email pattern is valid"));

/// Check a login email against the accepted format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Check a first/last name pair; both must be present and long enough
pub fn is_valid_name_pair(first_name: Option<&str>, last_name: Option<&str>) -> bool {
    match (first_name, last_name) {
        (Some(first), Some(last)) => {
            first.chars().count() >= MIN_NAME_LENGTH && last.chars().count() >= MIN_NAME_LENGTH
        }
        _ => false,
    }
}

/// Most frequent department; ties go to the value seen first
pub fn department_mode<'a>(departments: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    frequencies(departments).into_iter().next().map(|(dept, _)| dept)
}

/// Value counts sorted by descending count, first-seen order among equals
fn frequencies<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut order: Vec<&'a str> = Vec::new();
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    let mut ranked: Vec<(&'a str, usize)> = order.into_iter().map(|v| (v, counts[v])).collect();
    // stable sort keeps first-seen order for equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Applies the email, name and department rules to a cleaned table
pub struct FieldValidator<S: Synthesizer> {
    synth: S,
    fallback_department: String,
}

impl<S: Synthesizer> FieldValidator<S> {
    /// `fallback_department` is used only when no record in the batch has a department
    pub fn new(synth: S, fallback_department: impl Into<String>) -> Self {
        Self {
            synth,
            fallback_department: fallback_department.into(),
        }
    }

    pub fn validate(&mut self, table: Table<RawRecord>, sink: &mut dyn EventSink) -> Table<ValidatedRecord> {
        debug!(rows = table.len(), "FieldValidator::validate: called");

        let invalid_emails: Vec<String> = table
            .records
            .iter()
            .filter_map(|r| r.login_email.as_deref())
            .filter(|email| !is_valid_email(email))
            .map(String::from)
            .collect();
        let missing = table.records.iter().filter(|r| r.login_email.is_none()).count();
        sink.emit(PipelineEvent::InvalidEmails {
            emails: invalid_emails,
            missing,
        });

        let department = department_mode(table.records.iter().filter_map(|r| r.department.as_deref()))
            .map(String::from)
            .unwrap_or_else(|| {
                debug!(fallback = %self.fallback_department, "FieldValidator::validate: no departments in batch");
                self.fallback_department.clone()
            });
        debug!(%department, "FieldValidator::validate: department backfill value");

        let mut row = 0usize;
        let validated = table.map(|record| {
            let validated = self.validate_record(row, record, &department, sink);
            row += 1;
            validated
        });
        info!("Invalid names changed (generated valid)");

        let counts = frequencies(validated.records.iter().map(|r| r.department.as_str()))
            .into_iter()
            .map(|(dept, count)| (dept.to_string(), count))
            .collect();
        sink.emit(PipelineEvent::DepartmentCounts { counts });

        validated
    }

    fn validate_record(
        &mut self,
        row: usize,
        record: RawRecord,
        department: &str,
        sink: &mut dyn EventSink,
    ) -> ValidatedRecord {
        let login_email = match record.login_email {
            Some(email) if is_valid_email(&email) => email,
            _ => {
                let email = self.synth.email();
                sink.emit(PipelineEvent::SyntheticEmail { email: email.clone() });
                email
            }
        };

        let (first_name, last_name) = match (record.first_name, record.last_name) {
            (Some(first), Some(last)) if is_valid_name_pair(Some(&first), Some(&last)) => (first, last),
            (first_name, last_name) => {
                sink.emit(PipelineEvent::InvalidNames {
                    row,
                    first_name,
                    last_name,
                });
                (self.synth.first_name(), self.synth.last_name())
            }
        };

        ValidatedRecord {
            login_email,
            main_password: record.main_password,
            backup_password: record.backup_password,
            first_name,
            last_name,
            department: record.department.unwrap_or_else(|| department.to_string()),
            extras: record.extras,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::RandomSynthesizer;

    fn record(email: Option<&str>, first: Option<&str>, last: Option<&str>, dept: Option<&str>) -> RawRecord {
        RawRecord {
            login_email: email.map(String::from),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            department: dept.map(String::from),
            ..Default::default()
        }
    }

    fn validator() -> FieldValidator<RandomSynthesizer<rand::rngs::StdRng>> {
        FieldValidator::new(RandomSynthesizer::seeded(1), "Unassigned")
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("abc12@example.com"));
        assert!(is_valid_email("JohnDoe99@example.com"));
        assert!(!is_valid_email("ab12@example.com"));
        assert!(!is_valid_email("abcde@example.com"));
        assert!(!is_valid_email("abc12@example.org"));
        assert!(!is_valid_email("abc_12@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_name_pair_rule() {
        assert!(is_valid_name_pair(Some("Jo"), Some("Li")));
        assert!(!is_valid_name_pair(Some("J"), Some("Doe")));
        assert!(!is_valid_name_pair(Some("Jane"), None));
        assert!(!is_valid_name_pair(None, None));
    }

    #[test]
    fn test_department_mode_tie_takes_first_seen() {
        let depts = ["Sales", "Engineering", "Engineering", "Sales", "HR"];
        assert_eq!(department_mode(depts), Some("Sales"));
        assert_eq!(department_mode(["HR", "Ops", "Ops"]), Some("Ops"));
        assert_eq!(department_mode(std::iter::empty()), None);
    }

    #[test]
    fn test_invalid_email_is_replaced() {
        let table = Table::new(
            vec![],
            vec![
                record(Some("abc12@example.com"), Some("Jane"), Some("Doe"), Some("Sales")),
                record(Some("bad-email"), Some("John"), Some("Roe"), Some("Sales")),
                record(None, Some("Ann"), Some("Poe"), Some("Sales")),
            ],
        );
        let mut events: Vec<PipelineEvent> = Vec::new();
        let out = validator().validate(table, &mut events);

        assert_eq!(out.records[0].login_email, "abc12@example.com");
        assert!(out.records.iter().all(|r| is_valid_email(&r.login_email)));
        assert_eq!(
            events[0],
            PipelineEvent::InvalidEmails {
                emails: vec!["bad-email".to_string()],
                missing: 1,
            }
        );
        let synthetic = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::SyntheticEmail { .. }))
            .count();
        assert_eq!(synthetic, 2);
    }

    #[test]
    fn test_invalid_name_pair_is_regenerated_together() {
        let table = Table::new(
            vec![],
            vec![record(Some("abc12@example.com"), Some("J"), Some("Doe"), Some("Sales"))],
        );
        let mut events: Vec<PipelineEvent> = Vec::new();
        let out = validator().validate(table, &mut events);
        let rec = &out.records[0];
        assert!(is_valid_name_pair(Some(&rec.first_name), Some(&rec.last_name)));
        assert!(events.contains(&PipelineEvent::InvalidNames {
            row: 0,
            first_name: Some("J".to_string()),
            last_name: Some("Doe".to_string()),
        }));
    }

    #[test]
    fn test_missing_department_takes_mode() {
        let table = Table::new(
            vec![],
            vec![
                record(Some("abc12@example.com"), Some("Jane"), Some("Doe"), Some("Sales")),
                record(Some("def34@example.com"), Some("John"), Some("Roe"), None),
                record(Some("ghi56@example.com"), Some("Ann"), Some("Poe"), Some("Sales")),
                record(Some("jkl78@example.com"), Some("Bob"), Some("Lee"), Some("HR")),
            ],
        );
        let mut events: Vec<PipelineEvent> = Vec::new();
        let out = validator().validate(table, &mut events);
        assert_eq!(out.records[1].department, "Sales");
        assert_eq!(
            events.last(),
            Some(&PipelineEvent::DepartmentCounts {
                counts: vec![("Sales".to_string(), 3), ("HR".to_string(), 1)]
            })
        );
    }

    #[test]
    fn test_no_departments_uses_fallback() {
        let table = Table::new(
            vec![],
            vec![record(Some("abc12@example.com"), Some("Jane"), Some("Doe"), None)],
        );
        let mut events: Vec<PipelineEvent> = Vec::new();
        let out = validator().validate(table, &mut events);
        assert_eq!(out.records[0].department, "Unassigned");
    }

    #[test]
    fn test_same_seed_same_output() {
        let table = Table::new(
            vec![],
            vec![record(None, None, None, Some("Sales")), record(Some("x"), Some("A"), None, None)],
        );
        let mut events: Vec<PipelineEvent> = Vec::new();
        let a = validator().validate(table.clone(), &mut events);
        let b = validator().validate(table, &mut events);
        assert_eq!(a, b);
    }
}
