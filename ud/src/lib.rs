//! userdata - batch validation for user-account records
//!
//! Takes one batch of account candidates, repairs what it can and produces a
//! deduplicated table with a short id per account, ready for provisioning.
//!
//! # Stages
//!
//! ```text
//! csv_io::load
//!   -> Cleaner           drop rows with too few filled fields
//!   -> FieldValidator    fix emails and names, backfill departments
//!   -> PasswordResolver  pick main or backup password, label strength
//!   -> Deduplicator      one row per login email
//!   -> IdAssigner        dept code + initials + running counter
//! csv_io::save
//! ```
//!
//! # Example
//!
//! ```ignore
//! use userdata::{Pipeline, PipelineOptions, PipelineEvent, csv_io};
//!
//! let table = csv_io::load("users_data.csv".as_ref())?;
//! let mut events: Vec<PipelineEvent> = Vec::new();
//! let output = Pipeline::from_options(&PipelineOptions::default()).run(table, &mut events)?;
//! csv_io::save("users_data_validated.csv".as_ref(), &output)?;
//! ```

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod dedup;
pub mod error;
pub mod events;
pub mod ids;
pub mod password;
pub mod pipeline;
pub mod synth;
pub mod table;
pub mod validator;

pub use cleaner::{Cleaner, DEFAULT_FILL_THRESHOLD};
pub use dedup::Deduplicator;
pub use error::PipelineError;
pub use events::{EventSink, PipelineEvent, Tee, TracingSink};
pub use ids::IdAssigner;
pub use password::{PasswordResolver, PasswordStrength};
pub use pipeline::{Pipeline, PipelineOptions};
pub use synth::{RandomSynthesizer, Synthesizer};
pub use table::{Account, ProvisionedAccount, RawRecord, RecordTable, Table, ValidatedRecord};
pub use validator::FieldValidator;
