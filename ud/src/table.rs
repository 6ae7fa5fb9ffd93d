//! In-memory record table
//!
//! A batch is a `Table<R>`: the ordered records plus the input header, which
//! also carries any pass-through columns beyond the required ones. Each stage
//! of the pipeline maps one record type to the next, so the guarantees a stage
//! establishes show up in the type it returns.

use tracing::debug;

use crate::password::PasswordStrength;

pub const LOGIN_EMAIL: &str = "login_email";
pub const MAIN_PASSWORD: &str = "main_password";
pub const BACKUP_PASSWORD: &str = "backup_password";
pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const DEPARTMENT: &str = "department";
pub const PASSWORD: &str = "password";
pub const PASSWORD_STRENGTH: &str = "password_strength";
pub const ID: &str = "id";

/// Columns every input table must carry, in canonical order
pub const REQUIRED_COLUMNS: [&str; 6] = [
    LOGIN_EMAIL,
    MAIN_PASSWORD,
    BACKUP_PASSWORD,
    FIRST_NAME,
    LAST_NAME,
    DEPARTMENT,
];

/// Columns the pipeline derives; an input column with one of these names is overwritten in place
pub const DERIVED_COLUMNS: [&str; 3] = [PASSWORD, PASSWORD_STRENGTH, ID];

/// Ordered batch of records
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    /// Input header in input order, required and pass-through columns alike
    pub columns: Vec<String>,
    /// Records in table order
    pub records: Vec<R>,
}

/// The table as handed over by the loader
pub type RecordTable = Table<RawRecord>;

impl<R> Table<R> {
    pub fn new(columns: Vec<String>, records: Vec<R>) -> Self {
        Self { columns, records }
    }

    /// Pass-through column names, aligned with each record's `extras`
    pub fn extra_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of fields per record
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// Map every record to a new type, keeping order and the pass-through header
    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Table<T> {
        Table {
            columns: self.columns,
            records: self.records.into_iter().map(f).collect(),
        }
    }

    /// Keep only the records matching `keep`, preserving order
    pub fn retain(mut self, keep: impl FnMut(&R) -> bool) -> Self {
        self.records.retain(keep);
        self
    }
}

/// One user-account candidate as loaded, before any correction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub login_email: Option<String>,
    pub main_password: Option<String>,
    pub backup_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    /// Pass-through values, aligned with `Table::extra_columns()`
    pub extras: Vec<Option<String>>,
}

impl RawRecord {
    /// Count of fields holding a value, pass-through columns included
    pub fn filled_count(&self) -> usize {
        let required = [
            &self.login_email,
            &self.main_password,
            &self.backup_password,
            &self.first_name,
            &self.last_name,
            &self.department,
        ];
        let count = required.iter().filter(|v| v.is_some()).count();
        let extras = self.extras.iter().filter(|v| v.is_some()).count();
        debug!(count, extras, "RawRecord::filled_count: called");
        count + extras
    }

    /// Value of a required column by name
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            LOGIN_EMAIL => self.login_email.as_deref(),
            MAIN_PASSWORD => self.main_password.as_deref(),
            BACKUP_PASSWORD => self.backup_password.as_deref(),
            FIRST_NAME => self.first_name.as_deref(),
            LAST_NAME => self.last_name.as_deref(),
            DEPARTMENT => self.department.as_deref(),
            _ => None,
        }
    }
}

/// Record after the field rules ran: identity fields are settled, passwords are still raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    pub login_email: String,
    pub main_password: Option<String>,
    pub backup_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub extras: Vec<Option<String>>,
}

/// Record with every output field settled except the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub login_email: String,
    pub password: String,
    pub password_strength: PasswordStrength,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub extras: Vec<Option<String>>,
}

/// Finished output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAccount {
    pub id: String,
    pub account: Account,
}

impl Table<ProvisionedAccount> {
    /// Output header: the input columns minus the password candidates, then any derived column the input lacks
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.as_str() != MAIN_PASSWORD && c.as_str() != BACKUP_PASSWORD)
            .cloned()
            .collect();
        for derived in DERIVED_COLUMNS {
            if !columns.iter().any(|c| c == derived) {
                columns.push(derived.to_string());
            }
        }
        columns
    }
}

impl ProvisionedAccount {
    fn derived(&self, column: &str) -> &str {
        match column {
            PASSWORD => self.account.password.as_str(),
            PASSWORD_STRENGTH => self.account.password_strength.as_str(),
            _ => self.id.as_str(),
        }
    }

    /// Cell values for `Table::output_columns`, given the table's input columns
    ///
    /// Pass-through values are consumed positionally, so repeated extra
    /// column names stay aligned. The first input column named like a derived
    /// column takes the derived value; later ones keep their input value.
    pub fn values<'a>(&'a self, input_columns: &[String]) -> Vec<&'a str> {
        let account = &self.account;
        let mut extras = account.extras.iter();
        let mut placed = [false; DERIVED_COLUMNS.len()];
        let mut values = Vec::with_capacity(input_columns.len() + DERIVED_COLUMNS.len());

        for column in input_columns {
            let value = match column.as_str() {
                MAIN_PASSWORD | BACKUP_PASSWORD => continue,
                LOGIN_EMAIL => account.login_email.as_str(),
                FIRST_NAME => account.first_name.as_str(),
                LAST_NAME => account.last_name.as_str(),
                DEPARTMENT => account.department.as_str(),
                other => {
                    let passed = extras.next().and_then(|v| v.as_deref()).unwrap_or("");
                    match DERIVED_COLUMNS.iter().position(|d| *d == other) {
                        Some(pos) if !placed[pos] => {
                            placed[pos] = true;
                            self.derived(other)
                        }
                        _ => passed,
                    }
                }
            };
            values.push(value);
        }

        for (derived, done) in DERIVED_COLUMNS.iter().zip(placed) {
            if !done {
                values.push(self.derived(derived));
            }
        }
        values
    }
}
