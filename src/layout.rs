//! Fixed output layout
//!
//! The assembled table is a flat list of typed columns, each carrying its
//! section, a three-layer header (section / group / column name) and a
//! format class. The terminal renderer and the CSV exporter both walk this
//! list; nothing here computes, it only maps a [`DerivedRecord`] to cells.
//!
//! Sections hold their derived metrics first, then the raw open interest
//! legs they are computed from. Undefined values stay typed as `None` and
//! the caller chooses their blank representation.

use chrono::NaiveDate;

use crate::models::DerivedRecord;

/// Logical section of the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Keys,
    Option,
    Future,
    FutureStock,
    Nifty,
    Totals,
}

impl Section {
    /// Parse a user-facing section filter.
    pub fn parse(s: &str) -> Option<Section> {
        match s.trim().to_ascii_lowercase().as_str() {
            "option" | "options" => Some(Section::Option),
            "future" | "futures" => Some(Section::Future),
            "stock" | "future-stock" | "futurestock" => Some(Section::FutureStock),
            "nifty" => Some(Section::Nifty),
            "total" | "totals" => Some(Section::Totals),
            _ => None,
        }
    }
}

/// How a cell value renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Date,
    Text,
    /// Contract counts: thousands-separated integers.
    Count,
    /// Two decimals.
    Ratio,
    /// Fraction scaled to percent with two decimals.
    Percent,
    /// Index levels and level differences: two decimals.
    Price,
}

/// A typed cell extracted from one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Date(NaiveDate),
    Text(&'static str),
    Count(Option<i64>),
    Value(Option<f64>),
}

/// One output column.
pub struct Column {
    pub id: &'static str,
    pub section: Section,
    /// Section text, group text, column name.
    pub header: [&'static str; 3],
    pub format: Format,
    pub get: fn(&DerivedRecord) -> Cell,
}

/// All output columns in display order.
pub static COLUMNS: &[Column] = &[
    // Keys
    Column {
        id: "date",
        section: Section::Keys,
        header: ["", "Date", "Date"],
        format: Format::Date,
        get: |r| Cell::Date(r.raw.date),
    },
    Column {
        id: "client_type",
        section: Section::Keys,
        header: ["", "Client Type", "Client Type"],
        format: Format::Text,
        get: |r| Cell::Text(r.raw.client_type.as_str()),
    },
    // Option index metrics
    Column {
        id: "net_diff",
        section: Section::Option,
        header: ["OPTION", "NET DIFF", "NET DIFF"],
        format: Format::Count,
        get: |r| Cell::Count(r.net_diff),
    },
    Column {
        id: "option_roc",
        section: Section::Option,
        header: ["OPTION", "ROC", "Option ROC"],
        format: Format::Count,
        get: |r| Cell::Count(r.option_roc),
    },
    Column {
        id: "abs_change_call",
        section: Section::Option,
        header: ["OPTION", "ABS CHANGE", "Abs Change Call"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.abs_change_call)),
    },
    Column {
        id: "abs_change_put",
        section: Section::Option,
        header: ["OPTION", "ABS CHANGE", "Abs Change Put"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.abs_change_put)),
    },
    Column {
        id: "option_net",
        section: Section::Option,
        header: ["OPTION", "OPTION", "Option NET"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.option_net)),
    },
    Column {
        id: "net_call_change",
        section: Section::Option,
        header: ["OPTION", "NET CALL", "NET CALL (CoC)"],
        format: Format::Count,
        get: |r| Cell::Count(r.net_call_change),
    },
    Column {
        id: "net_put_change",
        section: Section::Option,
        header: ["OPTION", "NET PUT", "NET PUT (CoC)"],
        format: Format::Count,
        get: |r| Cell::Count(r.net_put_change),
    },
    // Option raw legs, exchange file order
    Column {
        id: "option_index_call_long",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Idx Call Long"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_index_call_long)),
    },
    Column {
        id: "option_index_put_long",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Idx Put Long"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_index_put_long)),
    },
    Column {
        id: "option_index_call_short",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Idx Call Short"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_index_call_short)),
    },
    Column {
        id: "option_index_put_short",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Idx Put Short"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_index_put_short)),
    },
    Column {
        id: "option_stock_call_long",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Stk Call Long"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_stock_call_long)),
    },
    Column {
        id: "option_stock_put_long",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Stk Put Long"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_stock_put_long)),
    },
    Column {
        id: "option_stock_call_short",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Stk Call Short"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_stock_call_short)),
    },
    Column {
        id: "option_stock_put_short",
        section: Section::Option,
        header: ["OPTION", "OPEN INTEREST", "Opt Stk Put Short"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.option_stock_put_short)),
    },
    // Future index
    Column {
        id: "future_net",
        section: Section::Future,
        header: ["FUTURE", "FUTURE", "Future Net"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.future_net)),
    },
    Column {
        id: "future_roc",
        section: Section::Future,
        header: ["FUTURE", "ROC", "Future ROC"],
        format: Format::Count,
        get: |r| Cell::Count(r.future_roc),
    },
    Column {
        id: "future_abs_change_long",
        section: Section::Future,
        header: ["FUTURE", "ABS CHANGE", "Fut Abs Chg Long"],
        format: Format::Count,
        get: |r| Cell::Count(r.future_abs_change_long),
    },
    Column {
        id: "future_abs_change_short",
        section: Section::Future,
        header: ["FUTURE", "ABS CHANGE", "Fut Abs Chg Short"],
        format: Format::Count,
        get: |r| Cell::Count(r.future_abs_change_short),
    },
    Column {
        id: "future_ls_ratio",
        section: Section::Future,
        header: ["FUTURE", "L/S RATIO", "Fut L/S Ratio"],
        format: Format::Ratio,
        get: |r| Cell::Value(r.future_ls_ratio),
    },
    Column {
        id: "future_long_pct",
        section: Section::Future,
        header: ["FUTURE", "LONG", "Fut Long %"],
        format: Format::Percent,
        get: |r| Cell::Value(r.future_long_pct),
    },
    Column {
        id: "future_short_pct",
        section: Section::Future,
        header: ["FUTURE", "SHORT", "Fut Short %"],
        format: Format::Percent,
        get: |r| Cell::Value(r.future_short_pct),
    },
    Column {
        id: "future_index_long",
        section: Section::Future,
        header: ["FUTURE", "OPEN INTEREST", "Fut Idx Long"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.future_index_long)),
    },
    Column {
        id: "future_index_short",
        section: Section::Future,
        header: ["FUTURE", "OPEN INTEREST", "Fut Idx Short"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.future_index_short)),
    },
    // Future stock
    Column {
        id: "stock_net",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "FUTURE", "Stk Fut Net"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.stock_net)),
    },
    Column {
        id: "stock_roc",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "ROC", "Stk Fut ROC"],
        format: Format::Count,
        get: |r| Cell::Count(r.stock_roc),
    },
    Column {
        id: "stock_abs_change_long",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "ABS CHANGE", "Stk Abs Chg Long"],
        format: Format::Count,
        get: |r| Cell::Count(r.stock_abs_change_long),
    },
    Column {
        id: "stock_abs_change_short",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "ABS CHANGE", "Stk Abs Chg Short"],
        format: Format::Count,
        get: |r| Cell::Count(r.stock_abs_change_short),
    },
    Column {
        id: "stock_ls_ratio",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "L/S RATIO", "Stk L/S Ratio"],
        format: Format::Ratio,
        get: |r| Cell::Value(r.stock_ls_ratio),
    },
    Column {
        id: "stock_long_pct",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "LONG", "Stk Long %"],
        format: Format::Percent,
        get: |r| Cell::Value(r.stock_long_pct),
    },
    Column {
        id: "stock_short_pct",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "SHORT", "Stk Short %"],
        format: Format::Percent,
        get: |r| Cell::Value(r.stock_short_pct),
    },
    Column {
        id: "future_stock_long",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "OPEN INTEREST", "Stk Fut Long"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.future_stock_long)),
    },
    Column {
        id: "future_stock_short",
        section: Section::FutureStock,
        header: ["FUTURE STOCK", "OPEN INTEREST", "Stk Fut Short"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.future_stock_short)),
    },
    // Index spot
    Column {
        id: "nifty_diff",
        section: Section::Nifty,
        header: ["NIFTY", "NIFTY", "Nifty Diff"],
        format: Format::Price,
        get: |r| Cell::Value(r.nifty_diff),
    },
    Column {
        id: "nifty_spot",
        section: Section::Nifty,
        header: ["NIFTY", "NIFTY", "Nifty Spot"],
        format: Format::Price,
        get: |r| Cell::Value(r.nifty_spot),
    },
    // Whole-book totals
    Column {
        id: "future_total_long_pct",
        section: Section::Totals,
        header: ["TOTAL", "FUTURE LONG", "Future Total Long %"],
        format: Format::Percent,
        get: |r| Cell::Value(r.future_total_long_pct),
    },
    Column {
        id: "future_total_short_pct",
        section: Section::Totals,
        header: ["TOTAL", "FUTURE SHORT", "Future Total Short %"],
        format: Format::Percent,
        get: |r| Cell::Value(r.future_total_short_pct),
    },
    Column {
        id: "total_long_contracts",
        section: Section::Totals,
        header: ["TOTAL", "CONTRACTS", "Total Long Contracts"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.total_long_contracts)),
    },
    Column {
        id: "total_short_contracts",
        section: Section::Totals,
        header: ["TOTAL", "CONTRACTS", "Total Short Contracts"],
        format: Format::Count,
        get: |r| Cell::Count(Some(r.raw.total_short_contracts)),
    },
];

/// Columns for an optional section filter. Key columns are always included.
pub fn columns_for(section: Option<Section>) -> Vec<&'static Column> {
    COLUMNS
        .iter()
        .filter(|c| match section {
            None => true,
            Some(s) => c.section == Section::Keys || c.section == s,
        })
        .collect()
}

/// Render a cell; `blank` stands in for undefined values.
pub fn format_cell(cell: Cell, format: Format, blank: &str) -> String {
    match cell {
        Cell::Date(d) => d.format("%d.%m.%y").to_string(),
        Cell::Text(s) => s.to_string(),
        Cell::Count(None) | Cell::Value(None) => blank.to_string(),
        Cell::Count(Some(n)) => group_thousands(n),
        Cell::Value(Some(v)) => match format {
            Format::Percent => format!("{:.2}%", v * 100.0),
            _ => format!("{v:.2}"),
        },
    }
}

/// Thousands-separated integer, keeping the sign out of the grouping.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
