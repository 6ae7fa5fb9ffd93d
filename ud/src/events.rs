//! Diagnostic events emitted by the pipeline
//!
//! Stages report what they did through an [`EventSink`]. Where the events end
//! up is the caller's choice: [`TracingSink`] turns them into run-log records,
//! a `Vec<PipelineEvent>` collects them for inspection.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything observable about one pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// The input table was read
    Loaded { rows: usize, columns: usize },
    /// Sparse rows were removed
    RowsCleaned {
        threshold: f64,
        min_count: usize,
        removed: usize,
        remaining: usize,
    },
    /// Missing values per column after cleaning
    MissingValues { columns: Vec<(String, usize)> },
    /// Malformed emails and the count of missing ones; all will be replaced
    InvalidEmails { emails: Vec<String>, missing: usize },
    /// A synthetic email was generated
    SyntheticEmail { email: String },
    /// A name pair failed validation and will be regenerated
    InvalidNames {
        row: usize,
        first_name: Option<String>,
        last_name: Option<String>,
    },
    /// Password strength distribution after arbitration
    PasswordsResolved { weak: usize, medium: usize, strong: usize },
    /// Department frequencies after backfill, most frequent first
    DepartmentCounts { counts: Vec<(String, usize)> },
    /// Rows sharing a login email were collapsed
    Deduplicated { removed: usize, remaining: usize },
    /// Ids were generated
    IdsAssigned { count: usize },
    /// Final table shape
    Completed { rows: usize, columns: usize },
}

impl PipelineEvent {
    /// Short type name, matching the serialized tag
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "Loaded",
            Self::RowsCleaned { .. } => "RowsCleaned",
            Self::MissingValues { .. } => "MissingValues",
            Self::InvalidEmails { .. } => "InvalidEmails",
            Self::SyntheticEmail { .. } => "SyntheticEmail",
            Self::InvalidNames { .. } => "InvalidNames",
            Self::PasswordsResolved { .. } => "PasswordsResolved",
            Self::DepartmentCounts { .. } => "DepartmentCounts",
            Self::Deduplicated { .. } => "Deduplicated",
            Self::IdsAssigned { .. } => "IdsAssigned",
            Self::Completed { .. } => "Completed",
        }
    }
}

/// Receiver of pipeline events
pub trait EventSink {
    fn emit(&mut self, event: PipelineEvent);
}

impl EventSink for Vec<PipelineEvent> {
    fn emit(&mut self, event: PipelineEvent) {
        self.push(event);
    }
}

/// Writes each event to the run log as a structured tracing record
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: PipelineEvent) {
        match &event {
            PipelineEvent::Loaded { rows, columns } => {
                info!(rows, columns, "Read input table");
            }
            PipelineEvent::RowsCleaned {
                threshold,
                min_count,
                removed,
                remaining,
            } => {
                info!(
                    threshold,
                    min_count,
                    removed,
                    remaining,
                    "Rows with less than {}% columns filled are removed",
                    threshold * 100.0
                );
            }
            PipelineEvent::MissingValues { columns } => {
                info!(?columns, "Missing values per column");
            }
            PipelineEvent::InvalidEmails { emails, missing } => {
                info!(count = emails.len(), missing, ?emails, "Invalid email addresses");
            }
            PipelineEvent::SyntheticEmail { email } => {
                info!(%email, "Generated random email");
            }
            PipelineEvent::InvalidNames {
                row,
                first_name,
                last_name,
            } => {
                warn!(row, ?first_name, ?last_name, "Invalid names found");
            }
            PipelineEvent::PasswordsResolved { weak, medium, strong } => {
                info!(weak, medium, strong, "Password strengths calculated");
            }
            PipelineEvent::DepartmentCounts { counts } => {
                info!(?counts, "Department counts");
            }
            PipelineEvent::Deduplicated { removed, remaining } => {
                info!(removed, remaining, "Dropped rows with duplicated emails");
            }
            PipelineEvent::IdsAssigned { count } => {
                info!(count, "Id column generated");
            }
            PipelineEvent::Completed { rows, columns } => {
                info!(rows, columns, "Validation complete");
            }
        }
    }
}

/// Forwards every event to two sinks
pub struct Tee<'a, A: EventSink + ?Sized, B: EventSink + ?Sized> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<A: EventSink + ?Sized, B: EventSink + ?Sized> EventSink for Tee<'_, A, B> {
    fn emit(&mut self, event: PipelineEvent) {
        self.first.emit(event.clone());
        self.second.emit(event);
    }
}
