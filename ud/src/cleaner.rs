//! Sparse-row removal

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::events::{EventSink, PipelineEvent};
use crate::table::{REQUIRED_COLUMNS, RecordTable};

/// Default share of fields a row must fill to survive cleaning
pub const DEFAULT_FILL_THRESHOLD: f64 = 0.4;

/// Minimum number of filled fields for a table with `field_count` columns
pub fn min_count(threshold: f64, field_count: usize) -> usize {
    (threshold * field_count as f64).floor() as usize
}

/// Drops records that fill fewer than `floor(threshold * fields)` fields
pub struct Cleaner {
    threshold: f64,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(DEFAULT_FILL_THRESHOLD)
    }
}

impl Cleaner {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Filter the table; an empty result aborts the run
    pub fn clean(&self, table: RecordTable, sink: &mut dyn EventSink) -> Result<RecordTable, PipelineError> {
        let min_count = min_count(self.threshold, table.field_count());
        let before = table.len();
        debug!(threshold = self.threshold, min_count, before, "Cleaner::clean: called");

        let cleaned = table.retain(|record| record.filled_count() >= min_count);
        sink.emit(PipelineEvent::RowsCleaned {
            threshold: self.threshold,
            min_count,
            removed: before - cleaned.len(),
            remaining: cleaned.len(),
        });

        if cleaned.is_empty() {
            warn!("No data left after cleaning. Check data quality.");
            return Err(PipelineError::EmptyAfterCleaning {
                threshold: self.threshold,
            });
        }
        Ok(cleaned)
    }
}

/// Missing-value count for each column, in header order
pub fn missing_values(table: &RecordTable) -> Vec<(String, usize)> {
    let extra_columns = table.extra_columns();
    table
        .columns
        .iter()
        .map(|column| {
            let missing = if REQUIRED_COLUMNS.contains(&column.as_str()) {
                table.records.iter().filter(|r| r.get(column).is_none()).count()
            } else {
                let idx = extra_columns.iter().position(|c| c == column);
                table
                    .records
                    .iter()
                    .filter(|r| idx.and_then(|i| r.extras.get(i)).is_none_or(|v| v.is_none()))
                    .count()
            };
            (column.clone(), missing)
        })
        .collect()
}
