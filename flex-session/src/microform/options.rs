//! Card expiry options passed to the widget when a token is created.

use serde::Serialize;

use crate::error::{Result, SessionError};

/// Number of expiry years offered, starting with the current one.
pub const EXPIRATION_YEAR_COUNT: usize = 21;

/// Card expiry supplied alongside the fields the widget collects.
///
/// # Examples
///
/// ```
/// use flex_session::microform::CreateTokenOptions;
///
/// let options = CreateTokenOptions::new("04", "2031");
/// assert!(options.validate().is_ok());
/// assert!(CreateTokenOptions::new("4", "31").validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenOptions {
    /// Two-digit month, `01` to `12`.
    pub expiration_month: String,
    /// Four-digit year.
    pub expiration_year: String,
}

impl CreateTokenOptions {
    /// Creates options. Call [`validate`](Self::validate) before use.
    #[must_use]
    pub fn new(expiration_month: impl Into<String>, expiration_year: impl Into<String>) -> Self {
        Self { expiration_month: expiration_month.into(), expiration_year: expiration_year.into() }
    }

    /// Checks the month and year format.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the month is not `01`-`12` or the year is
    /// not four ASCII digits.
    pub fn validate(&self) -> Result<()> {
        let month = &self.expiration_month;
        let month_ok = month.len() == 2
            && month.bytes().all(|b| b.is_ascii_digit())
            && matches!(month.parse::<u8>(), Ok(1..=12));
        if !month_ok {
            return Err(SessionError::InvalidConfig(format!(
                "expiration month must be 01-12, got: {month:?}"
            )));
        }

        let year = &self.expiration_year;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SessionError::InvalidConfig(format!(
                "expiration year must have four digits, got: {year:?}"
            )));
        }
        Ok(())
    }
}

/// Month choices for an expiry selector: `"01"` through `"12"`.
#[must_use]
pub fn expiration_months() -> Vec<String> {
    (1..=12).map(|m| format!("{m:02}")).collect()
}

/// Year choices for an expiry selector, starting at `current_year`.
#[must_use]
pub fn expiration_years(current_year: i32) -> Vec<String> {
    (current_year..).take(EXPIRATION_YEAR_COUNT).map(|y| y.to_string()).collect()
}
