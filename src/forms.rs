//! Renewal form: validation of a librarian-supplied due date

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::BookInstanceView;

/// Latest allowed renewal, counted from today
pub const RENEWAL_WINDOW_WEEKS: i64 = 4;

/// Renewal suggested when the form is first displayed
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;

pub const RENEWAL_HELP_TEXT: &str = "Enter a date between now and 4 weeks (default 3).";

/// Accepted input formats for the renewal date, with the position of the
/// numeric field that must hold a four-digit year
const DATE_INPUT_FORMATS: [(&str, Option<usize>); 3] = [
    ("%Y-%m-%d", Some(0)),
    ("%m/%d/%Y", Some(2)),
    ("%m/%d/%y", None),
];

/// Why a renewal date was rejected
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RenewalError {
    #[error("This field is required.")]
    Missing,

    #[error("Enter a valid date.")]
    Malformed,

    #[error("Invalid date - renewal in past")]
    PastDate,

    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarInFuture,
}

/// Accept `candidate` iff `today <= candidate <= today + 4 weeks`
pub fn validate_renewal_date(candidate: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if candidate < today {
        return Err(RenewalError::PastDate);
    }
    if candidate > today + Duration::weeks(RENEWAL_WINDOW_WEEKS) {
        return Err(RenewalError::TooFarInFuture);
    }
    Ok(candidate)
}

pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_INPUT_FORMATS
        .iter()
        .filter(|(_, year_field)| year_field.map_or(true, |field| has_four_digit_year(raw, field)))
        .find_map(|(format, _)| NaiveDate::parse_from_str(raw, format).ok())
}

// chrono's %Y also takes 1 to 3 digits, which would read "01/20/24" as year 24.
fn has_four_digit_year(raw: &str, field: usize) -> bool {
    raw.split(|c: char| !c.is_ascii_digit())
        .nth(field)
        .is_some_and(|year| year.len() == 4)
}

/// Submitted renewal form
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Raw date as typed by the librarian (YYYY-MM-DD)
    pub renewal_date: Option<String>,
}

impl RenewBookForm {
    /// Parse and validate the submitted date
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
        let raw = self
            .renewal_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(RenewalError::Missing)?;
        let candidate = parse_date(raw).ok_or(RenewalError::Malformed)?;
        validate_renewal_date(candidate, today)
    }
}

/// Renewal form state returned on display and on rejected submissions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalFormView {
    pub book_instance: BookInstanceView,
    /// Suggested date on display, the submitted value after a rejection
    pub renewal_date: Option<String>,
    pub help_text: String,
    pub errors: Vec<String>,
}

impl RenewalFormView {
    pub fn initial(book_instance: BookInstanceView, today: NaiveDate) -> Self {
        Self {
            book_instance,
            renewal_date: Some(default_renewal_date(today).format("%Y-%m-%d").to_string()),
            help_text: RENEWAL_HELP_TEXT.to_string(),
            errors: Vec::new(),
        }
    }

    pub fn rejected(book_instance: BookInstanceView, form: RenewBookForm, error: RenewalError) -> Self {
        Self {
            book_instance,
            renewal_date: form.renewal_date,
            help_text: RENEWAL_HELP_TEXT.to_string(),
            errors: vec![error.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn form(raw: &str) -> RenewBookForm {
        RenewBookForm {
            renewal_date: Some(raw.to_string()),
        }
    }

    #[test]
    fn test_window_boundaries() {
        let today = date(2024, 1, 1);
        assert_eq!(validate_renewal_date(date(2023, 12, 31), today), Err(RenewalError::PastDate));
        assert_eq!(validate_renewal_date(date(2024, 1, 29), today), Err(RenewalError::TooFarInFuture));
        assert_eq!(validate_renewal_date(date(2024, 1, 28), today), Ok(date(2024, 1, 28)));
        assert_eq!(validate_renewal_date(date(2024, 1, 1), today), Ok(date(2024, 1, 1)));
    }

    #[test]
    fn test_every_date_around_window() {
        let today = date(2024, 2, 20);
        for offset in -40..60 {
            let candidate = today + Duration::days(offset);
            let accepted = validate_renewal_date(candidate, today).is_ok();
            assert_eq!(accepted, (0..=28).contains(&offset), "offset {}", offset);
        }
    }

    #[test]
    fn test_default_is_three_weeks() {
        assert_eq!(default_renewal_date(date(2024, 1, 1)), date(2024, 1, 22));
        assert_eq!(default_renewal_date(date(2024, 12, 20)), date(2025, 1, 10));
    }

    #[test]
    fn test_clean() {
        let today = date(2024, 1, 1);
        assert_eq!(form("2024-01-15").clean(today), Ok(date(2024, 1, 15)));
        assert_eq!(form("01/15/2024").clean(today), Ok(date(2024, 1, 15)));
        assert_eq!(form(" 2024-01-15 ").clean(today), Ok(date(2024, 1, 15)));
        assert_eq!(form("2024-02-15").clean(today), Err(RenewalError::TooFarInFuture));
        assert_eq!(form("tomorrow").clean(today), Err(RenewalError::Malformed));
    }

    #[test]
    fn test_clean_two_digit_year() {
        let today = date(2024, 1, 10);
        assert_eq!(form("01/20/24").clean(today), Ok(date(2024, 1, 20)));
        assert_eq!(form("01/20/2024").clean(today), Ok(date(2024, 1, 20)));
        assert_eq!(form("01/09/24").clean(today), Err(RenewalError::PastDate));
        assert_eq!(form("24-01-20").clean(today), Err(RenewalError::Malformed));
        assert_eq!(form("024-01-20").clean(today), Err(RenewalError::Malformed));
        assert_eq!(form("  ").clean(today), Err(RenewalError::Missing));
        assert_eq!(RenewBookForm::default().clean(today), Err(RenewalError::Missing));
    }

    #[test]
    fn test_messages() {
        assert_eq!(RenewalError::PastDate.to_string(), "Invalid date - renewal in past");
        assert_eq!(
            RenewalError::TooFarInFuture.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
    }
}
