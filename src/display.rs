//! Fixed-width terminal table renderer
//!
//! Walks the output layout and prints a section line, a column-name line
//! and the data rows. Undefined values render as `-`. Numeric columns are
//! right-aligned, key columns left-aligned.

use crate::layout::{self, Column, Format, Section};
use crate::models::DerivedRecord;

const BLANK: &str = "-";
const GUTTER: &str = "  ";

fn is_left_aligned(format: Format) -> bool {
    matches!(format, Format::Date | Format::Text)
}

/// Render the derived table, optionally restricted to one section.
pub fn render_table(records: &[DerivedRecord], section: Option<Section>) -> String {
    let columns = layout::columns_for(section);
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|rec| {
            columns
                .iter()
                .map(|col| layout::format_cell((col.get)(rec), col.format, BLANK))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let data_max = cells.iter().map(|row| row[i].len()).max().unwrap_or(0);
            col.header[2].len().max(data_max)
        })
        .collect();

    let mut out = String::new();
    push_section_line(&mut out, &columns, &widths);
    push_header_line(&mut out, &columns, &widths);
    push_rule(&mut out, &widths);
    for row in &cells {
        let mut line = String::new();
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                line.push_str(GUTTER);
            }
            if is_left_aligned(col.format) {
                line.push_str(&format!("{:<width$}", row[i], width = widths[i]));
            } else {
                line.push_str(&format!("{:>width$}", row[i], width = widths[i]));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Section names spanning their column runs.
fn push_section_line(out: &mut String, columns: &[&Column], widths: &[usize]) {
    let mut line = String::new();
    let mut i = 0;
    while i < columns.len() {
        let section = columns[i].section;
        let mut span = widths[i];
        let mut j = i + 1;
        while j < columns.len() && columns[j].section == section {
            span += GUTTER.len() + widths[j];
            j += 1;
        }
        if i > 0 {
            line.push_str(GUTTER);
        }
        line.push_str(&format!("{:<span$}", columns[i].header[0], span = span));
        i = j;
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn push_header_line(out: &mut String, columns: &[&Column], widths: &[usize]) {
    let mut line = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            line.push_str(GUTTER);
        }
        if is_left_aligned(col.format) {
            line.push_str(&format!("{:<width$}", col.header[2], width = widths[i]));
        } else {
            line.push_str(&format!("{:>width$}", col.header[2], width = widths[i]));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn push_rule(out: &mut String, widths: &[usize]) {
    let total: usize = widths.iter().sum::<usize>() + GUTTER.len() * (widths.len() - 1);
    out.push_str(&"-".repeat(total));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::models::{ClientType, IndexSpotSeries, OpenInterestRecord};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    fn small_table() -> Vec<DerivedRecord> {
        let mut raws = Vec::new();
        for (d, long) in [(4u32, 1000i64), (5, 1200)] {
            let mut raw = OpenInterestRecord::zeroed(date(d), ClientType::Client);
            raw.future_index_long = long;
            raw.future_index_short = 500;
            raws.push(raw);
        }
        engine::compute(raws, &IndexSpotSeries::new()).records
    }

    #[test]
    fn test_render_has_headers_and_rows() {
        let out = render_table(&small_table(), None);
        let lines: Vec<&str> = out.lines().collect();
        // Section line, header line, rule, two data rows.
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("OPTION"));
        assert!(lines[0].contains("FUTURE STOCK"));
        assert!(lines[1].contains("Client Type"));
        assert!(lines[1].contains("Fut Abs Chg Long"));
        assert!(lines[3].contains("05.12.25"));
        assert!(lines[4].contains("04.12.25"));
    }

    #[test]
    fn test_undefined_renders_as_dash() {
        let out = render_table(&small_table(), Some(Section::Future));
        let oldest = out.lines().last().unwrap();
        // The earliest row has no history: its change columns are dashes.
        assert!(oldest.contains('-'));
        assert!(oldest.contains("1,000"));
    }

    #[test]
    fn test_section_filter_narrows_columns() {
        let out = render_table(&small_table(), Some(Section::Nifty));
        let header = out.lines().nth(1).unwrap();
        assert!(header.contains("Nifty Spot"));
        assert!(!header.contains("Fut L/S Ratio"));
        assert!(header.contains("Date"));
    }

    #[test]
    fn test_day_change_value_rendered() {
        let out = render_table(&small_table(), Some(Section::Future));
        let newest = out.lines().nth(3).unwrap();
        assert!(newest.contains("200"));
        assert!(newest.contains("1,200"));
        assert!(newest.contains("2.40"), "ls ratio: {newest}");
    }

    #[test]
    fn test_empty_table_renders_headers_only() {
        let out = render_table(&[], None);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
    }
}
