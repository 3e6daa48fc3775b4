//! Trading-date detection for participant files
//!
//! The exchange publishes files with the date in up to three places, tried
//! in this order: a `Date` column in the data, the title row text
//! ("... as on Dec 05, 2025"), and the filename digits
//! (`fao_participant_oi_05122025.csv`).

use chrono::NaiveDate;

/// Accepted formats for a `Date` cell, day-first where ambiguous.
const CELL_FORMATS: [&str; 5] = ["%d-%m-%Y", "%d/%m/%Y", "%d-%b-%Y", "%Y-%m-%d", "%d.%m.%y"];

pub fn parse_cell(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    CELL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Extract the date from a title row like
/// "Participant wise Open Interest as on Dec 05, 2025".
pub fn from_title(text: &str) -> Option<NaiveDate> {
    let lower = text.to_ascii_lowercase();
    let idx = lower.find("as on")?;
    let tail = &text[idx + "as on".len()..];
    let mut tokens = tail
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    let month = month_number(tokens.next()?)?;
    let day: u32 = digits(tokens.next()?).parse().ok()?;
    let year: i32 = digits(tokens.next()?).parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Extract a DDMMYYYY date from a filename's first eight-digit run.
pub fn from_filename(name: &str) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 8 {
                let run = &name[start..i];
                let day: u32 = run[0..2].parse().ok()?;
                let month: u32 = run[2..4].parse().ok()?;
                let year: i32 = run[4..8].parse().ok()?;
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    return Some(date);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

fn month_number(token: &str) -> Option<u32> {
    let prefix: String = token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_lowercase();
    match prefix.as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

fn digits(token: &str) -> String {
    token.chars().filter(|c| c.is_ascii_digit()).collect()
}
