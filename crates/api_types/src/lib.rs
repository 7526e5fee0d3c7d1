use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod category {
    use super::*;

    /// Kind of a category, mirrored from the engine.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
        Debt,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: CategoryKind,
        /// Pre-seeded categories, as opposed to ones auto-created during
        /// ingest.
        pub is_system: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod file {
    use super::*;

    /// Request body for uploading a raw CSV statement.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FileUpload {
        pub filename: String,
        /// The raw comma-delimited text, header row included.
        pub content: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FileUploaded {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FileView {
        pub id: Uuid,
        pub filename: String,
        pub uploaded_at: DateTime<Utc>,
        /// Set once the file has been ingested; a processed file cannot
        /// be ingested again.
        pub processed_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FileListResponse {
        pub files: Vec<FileView>,
    }

    /// Counts returned by a successful ingest pass.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngestResponse {
        pub rows_inserted: u64,
        pub rows_failed: u64,
    }

    /// Error kind for a failed cell, mirrored from the engine.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ParseErrorKind {
        EmptyCell,
        InvalidNumber,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParseErrorView {
        /// 1-based data row number, header excluded.
        pub row: i32,
        /// Header text of the offending column.
        pub column: String,
        pub kind: ParseErrorKind,
        pub message: String,
        pub raw_value: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParseErrorListResponse {
        pub errors: Vec<ParseErrorView>,
    }
}

pub mod pivot {
    use super::*;
    use category::CategoryKind;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: Uuid,
        pub category: String,
        pub year: i32,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub income_by_year: BTreeMap<i32, f64>,
        pub expenses_by_year: BTreeMap<i32, f64>,
        pub net_by_year: BTreeMap<i32, f64>,
        pub total_income: f64,
        pub total_expenses: f64,
        pub total_net: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PivotResponse {
        pub file_id: Uuid,
        pub filename: String,
        pub processed_at: Option<DateTime<Utc>>,
        pub by_category: BTreeMap<String, BTreeMap<i32, f64>>,
        pub by_year: BTreeMap<i32, BTreeMap<String, f64>>,
        /// Distinct years, ascending.
        pub years: Vec<i32>,
        /// Distinct category names, lexicographic.
        pub category_names: Vec<String>,
        pub category_kinds: BTreeMap<String, CategoryKind>,
        pub row_totals: BTreeMap<String, f64>,
        pub column_totals: BTreeMap<i32, f64>,
        pub grand_total: f64,
        pub summary: SummaryView,
        pub records: Vec<RecordView>,
    }
}
