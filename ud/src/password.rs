//! Password arbitration and strength scoring
//!
//! Each record may carry a main and a backup password. Arbitration picks one
//! by comparing character-class coverage; the winner is then labelled with a
//! coarse strength derived from the same classes plus a length check.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::{EventSink, PipelineEvent};
use crate::table::{Account, Table, ValidatedRecord};

/// Placeholder used when a record has neither password candidate
pub const DEFAULT_PASSWORD: &str = "default";

/// Minimum length counted by the strength score
pub const MIN_LENGTH: usize = 6;

/// Special characters counted by both scores
pub const SPECIAL_CHARS: [char; 5] = ['@', '!', '*', '?', '#'];

/// Coarse strength label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Map a 0-5 criteria count to a label
    pub fn from_score(score: usize) -> Self {
        match score {
            0 | 1 => Self::Weak,
            2 | 3 => Self::Medium,
            _ => Self::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of character classes present: uppercase, lowercase, digit, special
pub fn class_score(password: &str) -> usize {
    let checks = [
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| SPECIAL_CHARS.contains(&c)),
    ];
    checks.iter().filter(|&&met| met).count()
}

/// Five-criterion score: the character classes plus the minimum length
///
/// The length criterion needs `MIN_LENGTH` characters on a single line.
pub fn score(password: &str) -> usize {
    let long_enough = password.split('\n').any(|line| line.chars().count() >= MIN_LENGTH);
    class_score(password) + usize::from(long_enough)
}

/// Strength label for a password
pub fn strength(password: &str) -> PasswordStrength {
    PasswordStrength::from_score(score(password))
}

/// Pick one password from the two candidates
///
/// Higher class coverage wins, then the longer string, then `main`.
pub fn choose(main: Option<&str>, backup: Option<&str>) -> String {
    match (main, backup) {
        (Some(main), Some(backup)) => {
            let main_score = class_score(main);
            let backup_score = class_score(backup);
            debug!(main_score, backup_score, "choose: both candidates present");
            let pick_main = match main_score.cmp(&backup_score) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => main.chars().count() >= backup.chars().count(),
            };
            if pick_main { main.to_string() } else { backup.to_string() }
        }
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => {
            debug!("choose: no candidates, using placeholder");
            DEFAULT_PASSWORD.to_string()
        }
    }
}

/// Resolves the password of every record and drops the candidate fields
pub struct PasswordResolver;

impl PasswordResolver {
    pub fn resolve(table: Table<ValidatedRecord>, sink: &mut dyn EventSink) -> Table<Account> {
        info!(rows = table.len(), "Choosing passwords and calculating password strengths");
        let accounts = table.map(|record| {
            let password = choose(record.main_password.as_deref(), record.backup_password.as_deref());
            let password_strength = strength(&password);
            Account {
                login_email: record.login_email,
                password,
                password_strength,
                first_name: record.first_name,
                last_name: record.last_name,
                department: record.department,
                extras: record.extras,
            }
        });

        let count = |label: PasswordStrength| {
            accounts
                .records
                .iter()
                .filter(|a| a.password_strength == label)
                .count()
        };
        sink.emit(PipelineEvent::PasswordsResolved {
            weak: count(PasswordStrength::Weak),
            medium: count(PasswordStrength::Medium),
            strong: count(PasswordStrength::Strong),
        });
        accounts
    }
}
