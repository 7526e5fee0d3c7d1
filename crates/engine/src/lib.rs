//! Core of the cashgrid service: CSV ingest into normalized cash-flow
//! records, and the category x year pivot derived from them.
//!
//! The parse ([`ingest`]) and aggregation ([`pivot`]) stages are pure;
//! [`Engine`] wires them to the database and owns the transactional
//! ingest pass, category get-or-create, and file bookkeeping.

pub use classify::{CategoryKind, classify_new_category, kind_from_display_name};
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder, IngestOutcome};
pub use pivot::{FinancialSummary, PivotedCashflow, RecordRef};

pub mod categories;
mod classify;
mod error;
pub mod ingest;
mod ops;
pub mod parse_errors;
pub mod pivot;
pub mod records;
pub mod source_files;

type ResultEngine<T> = Result<T, EngineError>;
