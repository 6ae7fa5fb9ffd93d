//! Human-readable id generation
//!
//! An id is the first three letters of the department, the person's initials
//! and a running counter per `(first_name, last_name)` pair, all lowercase,
//! e.g. `engjd0`. The counter is keyed by the full name only, so two
//! different people with the same initials whose departments share a
//! three-letter prefix collide when their counters line up. Callers that need
//! strict uniqueness must check the result (see [`IdAssigner::collisions`]).

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::events::{EventSink, PipelineEvent};
use crate::table::{Account, ProvisionedAccount, Table};

/// Number of department characters used in an id
pub const DEPT_CODE_LEN: usize = 3;

/// Id for one account given how many earlier accounts share its name
pub fn make_id(department: &str, first_name: &str, last_name: &str, counter: usize) -> String {
    let dept_code: String = department.chars().take(DEPT_CODE_LEN).collect::<String>().to_lowercase();
    let initials: String = first_name
        .chars()
        .take(1)
        .chain(last_name.chars().take(1))
        .collect::<String>()
        .to_lowercase();
    format!("{dept_code}{initials}{counter}")
}

/// Assigns ids in table order
pub struct IdAssigner;

impl IdAssigner {
    pub fn assign(table: Table<Account>, sink: &mut dyn EventSink) -> Table<ProvisionedAccount> {
        let mut seen: HashMap<(String, String), usize> = HashMap::new();
        let provisioned = table.map(|account| {
            let counter = seen
                .entry((account.first_name.clone(), account.last_name.clone()))
                .or_insert(0);
            let id = make_id(&account.department, &account.first_name, &account.last_name, *counter);
            *counter += 1;
            ProvisionedAccount { id, account }
        });

        let collisions = Self::collisions(&provisioned);
        if !collisions.is_empty() {
            warn!(?collisions, "Generated ids are not unique");
        }
        debug!(count = provisioned.len(), "IdAssigner::assign: done");
        sink.emit(PipelineEvent::IdsAssigned {
            count: provisioned.len(),
        });
        provisioned
    }

    /// Ids that were generated more than once, in first-seen order
    pub fn collisions(table: &Table<ProvisionedAccount>) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut duplicated = Vec::new();
        for record in &table.records {
            let count = counts.entry(record.id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicated.push(record.id.clone());
            }
        }
        duplicated
    }
}
