//! Canonical ordering and structural checks for raw records

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{ClientType, OpenInterestRecord, StructuralGap};

/// Sort records into canonical order: date descending, client type ascending.
/// The sort is stable, so equal keys keep their input order.
pub fn sort_canonical(records: &mut [OpenInterestRecord]) {
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.client_type.cmp(&b.client_type))
    });
}

/// Find dates missing one or more of the five participant categories.
/// Gaps are advisories; computation proceeds on partial data.
pub fn structural_gaps(records: &[OpenInterestRecord]) -> Vec<StructuralGap> {
    let mut seen: BTreeMap<NaiveDate, u8> = BTreeMap::new();
    for rec in records {
        let bit = 1u8 << rec.client_type as u8;
        *seen.entry(rec.date).or_insert(0) |= bit;
    }

    let mut gaps = Vec::new();
    for (date, mask) in seen {
        let missing: Vec<ClientType> = ClientType::ALL
            .into_iter()
            .filter(|ct| mask & (1u8 << *ct as u8) == 0)
            .collect();
        if !missing.is_empty() {
            gaps.push(StructuralGap { date, missing });
        }
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    #[test]
    fn test_sort_date_desc_client_asc() {
        let mut records = vec![
            OpenInterestRecord::zeroed(date(4), ClientType::Fii),
            OpenInterestRecord::zeroed(date(5), ClientType::Total),
            OpenInterestRecord::zeroed(date(5), ClientType::Client),
            OpenInterestRecord::zeroed(date(4), ClientType::Client),
            OpenInterestRecord::zeroed(date(5), ClientType::Dii),
        ];
        sort_canonical(&mut records);

        let keys: Vec<(NaiveDate, ClientType)> =
            records.iter().map(|r| (r.date, r.client_type)).collect();
        assert_eq!(
            keys,
            vec![
                (date(5), ClientType::Client),
                (date(5), ClientType::Dii),
                (date(5), ClientType::Total),
                (date(4), ClientType::Client),
                (date(4), ClientType::Fii),
            ]
        );
    }

    #[test]
    fn test_complete_dates_have_no_gaps() {
        let mut records = Vec::new();
        for d in [4, 5] {
            for ct in ClientType::ALL {
                records.push(OpenInterestRecord::zeroed(date(d), ct));
            }
        }
        assert!(structural_gaps(&records).is_empty());
    }

    #[test]
    fn test_missing_categories_reported_per_date() {
        let records = vec![
            OpenInterestRecord::zeroed(date(5), ClientType::Client),
            OpenInterestRecord::zeroed(date(5), ClientType::Total),
            OpenInterestRecord::zeroed(date(4), ClientType::Client),
            OpenInterestRecord::zeroed(date(4), ClientType::Dii),
            OpenInterestRecord::zeroed(date(4), ClientType::Fii),
            OpenInterestRecord::zeroed(date(4), ClientType::Pro),
            OpenInterestRecord::zeroed(date(4), ClientType::Total),
        ];
        let gaps = structural_gaps(&records);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].date, date(5));
        assert_eq!(
            gaps[0].missing,
            vec![ClientType::Dii, ClientType::Fii, ClientType::Pro]
        );
    }

    #[test]
    fn test_gap_for_missing_total_row() {
        let records = vec![
            OpenInterestRecord::zeroed(date(5), ClientType::Client),
            OpenInterestRecord::zeroed(date(5), ClientType::Dii),
            OpenInterestRecord::zeroed(date(5), ClientType::Fii),
            OpenInterestRecord::zeroed(date(5), ClientType::Pro),
        ];
        let gaps = structural_gaps(&records);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].missing, vec![ClientType::Total]);
    }
}
