//! Keyword classification for cash-flow categories.
//!
//! New category names discovered during ingest are typed with a
//! priority-ordered substring heuristic; existing categories keep the
//! kind they were created with.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Kind of a cash-flow category.
///
/// `Debt` amounts show up in the pivot grid but are excluded from the
/// income/expense/net summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
    Debt,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Debt => "debt",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "debt" => Ok(Self::Debt),
            other => Err(EngineError::InvalidInput(format!(
                "invalid category kind: {other}"
            ))),
        }
    }
}

/// Guess the kind for a category name seen for the first time.
///
/// Case-insensitive substring match, first rule wins. Names matching
/// nothing default to `Expense`.
pub fn classify_new_category(name: &str) -> CategoryKind {
    let name = name.to_lowercase();
    if name.contains("tax") || name.contains("expense") {
        CategoryKind::Expense
    } else if name.contains("wage") || name.contains("income") || name.contains("dividend") {
        CategoryKind::Income
    } else if name.contains("loan") || name.contains("debt") {
        CategoryKind::Debt
    } else {
        CategoryKind::Expense
    }
}

/// Fallback kind resolution by display name, for rendering paths that
/// have no category metadata join. Never overrides metadata-backed
/// resolution; `None` means unknown.
pub fn kind_from_display_name(name: &str) -> Option<CategoryKind> {
    let name = name.to_lowercase();
    const INCOME: [&str; 4] = ["income", "revenue", "sales", "wage"];
    const EXPENSE: [&str; 4] = ["expense", "cost", "rent", "utility"];
    const DEBT: [&str; 3] = ["loan", "debt", "mortgage"];

    if INCOME.iter().any(|token| name.contains(token)) {
        Some(CategoryKind::Income)
    } else if EXPENSE.iter().any(|token| name.contains(token)) {
        Some(CategoryKind::Expense)
    } else if DEBT.iter().any(|token| name.contains(token)) {
        Some(CategoryKind::Debt)
    } else {
        None
    }
}

/// Normalized lookup key for case-insensitive category matching.
pub(crate) fn normalize_category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_and_expense_names_are_expense() {
        assert_eq!(classify_new_category("Income Tax"), CategoryKind::Expense);
        assert_eq!(
            classify_new_category("Operating Expenses"),
            CategoryKind::Expense
        );
    }

    #[test]
    fn wage_income_dividend_names_are_income() {
        assert_eq!(classify_new_category("Employee Wages"), CategoryKind::Income);
        assert_eq!(classify_new_category("Rental INCOME"), CategoryKind::Income);
        assert_eq!(classify_new_category("dividends"), CategoryKind::Income);
    }

    #[test]
    fn loan_and_debt_names_are_debt() {
        assert_eq!(classify_new_category("Equipment Loan"), CategoryKind::Debt);
        assert_eq!(classify_new_category("Bad Debt"), CategoryKind::Debt);
    }

    #[test]
    fn unmatched_names_default_to_expense() {
        assert_eq!(classify_new_category("Mystery Item"), CategoryKind::Expense);
        assert_eq!(classify_new_category("Office Rent"), CategoryKind::Expense);
    }

    #[test]
    fn tax_rule_wins_over_income_rule() {
        // "Income Tax" contains both "income" and "tax"; the expense rule
        // is evaluated first.
        assert_eq!(classify_new_category("income tax"), CategoryKind::Expense);
    }

    #[test]
    fn display_fallback_matches_known_tokens() {
        assert_eq!(
            kind_from_display_name("Product Sales"),
            Some(CategoryKind::Income)
        );
        assert_eq!(
            kind_from_display_name("Utilities"),
            Some(CategoryKind::Expense)
        );
        assert_eq!(
            kind_from_display_name("Mortgage 2021"),
            Some(CategoryKind::Debt)
        );
        assert_eq!(kind_from_display_name("Miscellaneous"), None);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [CategoryKind::Income, CategoryKind::Expense, CategoryKind::Debt] {
            assert_eq!(CategoryKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(CategoryKind::try_from("asset").is_err());
    }
}
