//! Pipeline orchestration
//!
//! Runs the stages in their fixed order over one loaded table:
//! clean, validate fields, resolve passwords, deduplicate, assign ids.
//! Loading and persisting the table happen outside, in [`crate::csv_io`].

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::cleaner::{self, Cleaner, DEFAULT_FILL_THRESHOLD};
use crate::dedup::Deduplicator;
use crate::error::PipelineError;
use crate::events::{EventSink, PipelineEvent};
use crate::ids::IdAssigner;
use crate::password::PasswordResolver;
use crate::synth::{RandomSynthesizer, Synthesizer};
use crate::table::{ProvisionedAccount, RecordTable, Table};
use crate::validator::FieldValidator;

/// Department used when no record in the batch has one
pub const DEFAULT_FALLBACK_DEPARTMENT: &str = "Unassigned";

/// Tunables for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Share of fields a row must fill to survive cleaning
    pub fill_threshold: f64,
    /// Seed for synthetic values; `None` draws from the OS
    pub seed: Option<u64>,
    /// Department used when no record in the batch has one
    pub fallback_department: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fill_threshold: DEFAULT_FILL_THRESHOLD,
            seed: None,
            fallback_department: DEFAULT_FALLBACK_DEPARTMENT.to_string(),
        }
    }
}

/// The batch pipeline, generic over its source of synthetic values
pub struct Pipeline<S: Synthesizer> {
    cleaner: Cleaner,
    validator: FieldValidator<S>,
}

impl Pipeline<RandomSynthesizer<StdRng>> {
    /// Build a pipeline with a random synthesizer, seeded when the options ask for it
    pub fn from_options(options: &PipelineOptions) -> Self {
        let synth = match options.seed {
            Some(seed) => RandomSynthesizer::seeded(seed),
            None => RandomSynthesizer::from_os_rng(),
        };
        Self::new(options, synth)
    }
}

impl<S: Synthesizer> Pipeline<S> {
    pub fn new(options: &PipelineOptions, synth: S) -> Self {
        debug!(?options, "Pipeline::new: called");
        Self {
            cleaner: Cleaner::new(options.fill_threshold),
            validator: FieldValidator::new(synth, options.fallback_department.clone()),
        }
    }

    /// Run every stage over `table`
    ///
    /// Fails only when cleaning leaves nothing to validate.
    pub fn run(
        &mut self,
        table: RecordTable,
        sink: &mut dyn EventSink,
    ) -> Result<Table<ProvisionedAccount>, PipelineError> {
        sink.emit(PipelineEvent::Loaded {
            rows: table.len(),
            columns: table.field_count(),
        });

        let cleaned = self.cleaner.clean(table, sink)?;
        sink.emit(PipelineEvent::MissingValues {
            columns: cleaner::missing_values(&cleaned),
        });

        info!("Starting data validation");
        let validated = self.validator.validate(cleaned, sink);
        let accounts = PasswordResolver::resolve(validated, sink);
        let unique = Deduplicator::dedup(accounts, sink);
        let provisioned = IdAssigner::assign(unique, sink);

        sink.emit(PipelineEvent::Completed {
            rows: provisioned.len(),
            columns: provisioned.output_columns().len(),
        });
        Ok(provisioned)
    }
}
