//! Pure CSV parse stage of the ingest pipeline.
//!
//! Takes the raw statement text and produces per-row outcomes with no
//! I/O. The first header column is the category-name column; every
//! other header cell containing a `20xx` token is a year column. Cell
//! failures never abort the row, and row failures never abort the pass.

use crate::EngineError;

/// A header column recognized as holding amounts for one year.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearColumn {
    /// 0-based index into the raw record.
    pub index: usize,
    /// The original header text, echoed into parse errors.
    pub header: String,
    pub year: i32,
}

/// A year cell that failed numeric conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellError {
    /// Header text of the offending column.
    pub column: String,
    /// The raw cell value before cleaning.
    pub raw: String,
}

/// One data row that had a usable category name.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedRow {
    /// 1-based row number, header excluded.
    pub row: u32,
    /// Trimmed category name from the first column.
    pub category: String,
    /// Successfully parsed (year, amount) cells, in column order.
    pub values: Vec<(i32, f64)>,
    /// Cells that failed to parse; siblings in `values` still count.
    pub errors: Vec<CellError>,
}

/// Outcome of one data row.
#[derive(Clone, Debug, PartialEq)]
pub enum RowOutcome {
    /// First cell was empty after trimming; the whole row is skipped.
    MissingCategory {
        row: u32,
        /// Header text of the category column.
        column: String,
    },
    Parsed(ParsedRow),
}

/// Result of parsing a whole statement.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedStatement {
    pub year_columns: Vec<YearColumn>,
    pub rows: Vec<RowOutcome>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Search a header cell for a contiguous `20xx` token (2000-2099)
/// bounded by word edges, e.g. "Revenue 2023" or "FY 2024 (est)".
pub fn find_year_token(header: &str) -> Option<i32> {
    let chars: Vec<char> = header.chars().collect();
    for start in 0..chars.len() {
        if chars[start] != '2' {
            continue;
        }
        if start + 4 > chars.len() {
            break;
        }
        if chars[start + 1] != '0'
            || !chars[start + 2].is_ascii_digit()
            || !chars[start + 3].is_ascii_digit()
        {
            continue;
        }
        // Word edges: the token must not extend a longer word-character
        // run; underscore counts as a word character.
        if start > 0 && is_word_char(chars[start - 1]) {
            continue;
        }
        if chars.get(start + 4).is_some_and(|c| is_word_char(*c)) {
            continue;
        }
        let year = 2000
            + (chars[start + 2].to_digit(10).unwrap_or(0) * 10
                + chars[start + 3].to_digit(10).unwrap_or(0)) as i32;
        return Some(year);
    }
    None
}

/// Strip everything that is not a digit, a period, or a minus sign,
/// then parse as a finite `f64`.
///
/// Known limitation, reproduced on purpose: the accounting-negative
/// convention "(1,200)" strips to "1200" and loses its sign, while
/// "-1,200" parses correctly.
pub fn clean_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse raw statement text into per-row outcomes.
///
/// Fails with [`EngineError::NoYearColumns`] when no header cell holds
/// a year token, and with [`EngineError::InvalidInput`] when the text
/// is not readable as delimited rows at all.
pub fn parse_statement(text: &str) -> Result<ParsedStatement, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|err| EngineError::InvalidInput(err.to_string()))?,
        None => return Err(EngineError::NoYearColumns),
    };

    let category_column = header.get(0).unwrap_or("").trim().to_string();
    let year_columns: Vec<YearColumn> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, cell)| {
            find_year_token(cell).map(|year| YearColumn {
                index,
                header: cell.trim().to_string(),
                year,
            })
        })
        .collect();

    if year_columns.is_empty() {
        return Err(EngineError::NoYearColumns);
    }

    let mut rows = Vec::new();
    let mut row_number: u32 = 0;
    for record in records {
        let record = record.map_err(|err| EngineError::InvalidInput(err.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        row_number += 1;

        let category = record.get(0).unwrap_or("").trim().to_string();
        if category.is_empty() {
            rows.push(RowOutcome::MissingCategory {
                row: row_number,
                column: category_column.clone(),
            });
            continue;
        }

        let mut values = Vec::new();
        let mut errors = Vec::new();
        for column in &year_columns {
            let raw = record.get(column.index).unwrap_or("");
            match clean_amount(raw) {
                Some(amount) => values.push((column.year, amount)),
                None => errors.push(CellError {
                    column: column.header.clone(),
                    raw: raw.to_string(),
                }),
            }
        }

        rows.push(RowOutcome::Parsed(ParsedRow {
            row: row_number,
            category,
            values,
            errors,
        }));
    }

    Ok(ParsedStatement { year_columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_year_detection_accepts_embedded_tokens() {
        assert_eq!(find_year_token("Revenue 2023"), Some(2023));
        assert_eq!(find_year_token("2024"), Some(2024));
        assert_eq!(find_year_token("FY 2099 (est)"), Some(2099));
    }

    #[test]
    fn header_year_detection_requires_word_edges() {
        // Token embedded in a longer digit/letter run is not a year.
        assert_eq!(find_year_token("202345"), None);
        assert_eq!(find_year_token("X20231"), None);
        assert_eq!(find_year_token("ABC2023"), None);
        // Underscore is a word character, not an edge.
        assert_eq!(find_year_token("FY_2023"), None);
        assert_eq!(find_year_token("2023_est"), None);
        // But punctuation edges are fine.
        assert_eq!(find_year_token("(2023)"), Some(2023));
    }

    #[test]
    fn header_year_detection_rejects_out_of_range() {
        assert_eq!(find_year_token("1999"), None);
        assert_eq!(find_year_token("Notes"), None);
        assert_eq!(find_year_token("2123"), None);
    }

    #[test]
    fn columns_without_year_token_are_ignored_silently() {
        let parsed =
            parse_statement("Category,Notes,2023\nSales,hello,100\n").unwrap();
        assert_eq!(parsed.year_columns.len(), 1);
        assert_eq!(parsed.year_columns[0].index, 2);
        assert_eq!(parsed.year_columns[0].year, 2023);
    }

    #[test]
    fn no_year_columns_fails_whole_parse() {
        let err = parse_statement("Category,Notes\nSales,hello\n").unwrap_err();
        assert_eq!(err, EngineError::NoYearColumns);
    }

    #[test]
    fn empty_category_skips_whole_row() {
        let parsed = parse_statement("Category,2022,2023\n   ,100,200\n").unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(
            parsed.rows[0],
            RowOutcome::MissingCategory {
                row: 1,
                column: "Category".to_string(),
            }
        );
    }

    #[test]
    fn partial_row_failure_keeps_sibling_cells() {
        let parsed =
            parse_statement("Category,2021,2022,2023\nRent,1200,abc,900\n").unwrap();
        let RowOutcome::Parsed(row) = &parsed.rows[0] else {
            panic!("expected parsed row");
        };
        assert_eq!(row.values, vec![(2021, 1200.0), (2023, 900.0)]);
        assert_eq!(row.errors.len(), 1);
        assert_eq!(row.errors[0].column, "2022");
        assert_eq!(row.errors[0].raw, "abc");
    }

    #[test]
    fn currency_symbols_and_separators_are_stripped() {
        assert_eq!(clean_amount("$1,200.50"), Some(1200.50));
        assert_eq!(clean_amount("-1,200"), Some(-1200.0));
        assert_eq!(clean_amount(" 900 "), Some(900.0));
    }

    #[test]
    fn parenthesized_negatives_lose_their_sign() {
        // Documented limitation: stripping parentheses without adding a
        // minus turns an accounting negative into a positive.
        assert_eq!(clean_amount("(1,200)"), Some(1200.0));
    }

    #[test]
    fn unparseable_cells_are_errors_not_zeroes() {
        assert_eq!(clean_amount("abc"), None);
        assert_eq!(clean_amount(""), None);
        assert_eq!(clean_amount("--"), None);
        assert_eq!(clean_amount("1.2.3"), None);
    }

    #[test]
    fn empty_lines_are_skipped_without_row_numbers() {
        let parsed =
            parse_statement("Category,2023\n\nSales,100\n\nRent,200\n").unwrap();
        let rows: Vec<u32> = parsed
            .rows
            .iter()
            .map(|outcome| match outcome {
                RowOutcome::Parsed(row) => row.row,
                RowOutcome::MissingCategory { row, .. } => *row,
            })
            .collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn short_rows_report_missing_year_cells() {
        let parsed = parse_statement("Category,2022,2023\nSales,100\n").unwrap();
        let RowOutcome::Parsed(row) = &parsed.rows[0] else {
            panic!("expected parsed row");
        };
        assert_eq!(row.values, vec![(2022, 100.0)]);
        assert_eq!(row.errors.len(), 1);
        assert_eq!(row.errors[0].raw, "");
    }
}
