//! Date display shared by every template and exporter.
//!
//! Stored dates are either ISO `YYYY-MM` or opaque legacy text. ISO values
//! render as an upper-cased short month plus year; anything else passes
//! through verbatim.

use chrono::{Datelike, NaiveDate};

use crate::models::cv::{Entity, Language};
use crate::render::labels::labels;

const EN_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Parses `YYYY-MM` into the first day of that month.
fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    let (year, month) = raw.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

pub fn format_date(raw: &str, language: Language) -> String {
    let Some(date) = parse_year_month(raw) else {
        return raw.to_string();
    };
    match language {
        Language::En => format!("{} {}", EN_MONTHS[date.month0() as usize], date.year()),
        Language::Vi => format!("THG {}, {}", date.month(), date.year()),
    }
}

/// Display string for a start/end/current triple; `None` when there is
/// nothing to show.
///
/// While `current` is set the stored end date is ignored and the localized
/// "Present" marker is shown instead.
pub fn date_range(start: &str, end: &str, current: bool, language: Language) -> Option<String> {
    let start = format_date(start.trim(), language);
    let end = if current {
        labels(language).present.to_string()
    } else {
        format_date(end.trim(), language)
    };
    match (start.is_empty(), end.is_empty()) {
        (true, true) => None,
        (false, true) => Some(start),
        (true, false) => Some(end),
        (false, false) => Some(format!("{start} – {end}")),
    }
}

pub fn entity_range<E: Entity>(entity: &E, language: Language) -> Option<String> {
    date_range(
        entity.start_date(),
        entity.end_date(),
        entity.is_current(),
        language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::Experience;

    #[test]
    fn test_iso_month_is_localized() {
        assert_eq!(format_date("2023-01", Language::En), "JAN 2023");
        assert_eq!(format_date("2019-12", Language::En), "DEC 2019");
        assert_eq!(format_date("2023-01", Language::Vi), "THG 1, 2023");
    }

    #[test]
    fn test_legacy_text_passes_through() {
        assert_eq!(format_date("Summer 2020", Language::En), "Summer 2020");
        assert_eq!(format_date("2020-13", Language::En), "2020-13");
        assert_eq!(format_date("20-01", Language::Vi), "20-01");
        assert_eq!(format_date("", Language::En), "");
    }

    #[test]
    fn test_current_range_shows_present_not_end() {
        let range = date_range("2021-03", "2022-07", true, Language::En);
        assert_eq!(range.as_deref(), Some("MAR 2021 – Present"));

        let vi = date_range("2021-03", "2022-07", true, Language::Vi);
        assert_eq!(vi.as_deref(), Some("THG 3, 2021 – Hiện tại"));
    }

    #[test]
    fn test_partial_ranges() {
        assert_eq!(date_range("", "", false, Language::En), None);
        assert_eq!(
            date_range("2020-01", "", false, Language::En).as_deref(),
            Some("JAN 2020")
        );
        assert_eq!(date_range("", "", true, Language::En).as_deref(), Some("Present"));
        assert_eq!(
            date_range("", "2020-05", false, Language::En).as_deref(),
            Some("MAY 2020")
        );
    }

    #[test]
    fn test_entity_range_uses_current_flag() {
        let exp = Experience {
            start_date: "2020-01".to_string(),
            end_date: "2021-01".to_string(),
            current: true,
            ..Experience::default()
        };
        assert_eq!(
            entity_range(&exp, Language::En).as_deref(),
            Some("JAN 2020 – Present")
        );
    }
}
