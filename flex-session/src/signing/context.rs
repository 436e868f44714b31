//! Per-request signing inputs.

use chrono::{DateTime, Utc};

/// Session creation resource on the gateway.
pub const RESOURCE_PATH: &str = "/microform/v2/sessions";

/// Formats a timestamp as an RFC 1123 HTTP-date in GMT, with seconds precision.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use flex_session::signing::format_http_date;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(format_http_date(now), "Mon, 01 Jan 2024 00:00:00 GMT");
/// ```
#[must_use]
pub fn format_http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Inputs for one signed request.
///
/// Built once per call. The same `http_date` and `payload` values go into the signing string
/// and onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// Request path, part of `(request-target)`.
    pub resource_path: String,
    /// `date` header value.
    pub http_date: String,
    /// Exact request body.
    pub payload: String,
}

impl SigningContext {
    /// Creates a context for the session resource at `now`.
    #[must_use]
    pub fn new(payload: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            resource_path: RESOURCE_PATH.to_owned(),
            http_date: format_http_date(now),
            payload: payload.into(),
        }
    }

    /// Replaces the resource path.
    #[must_use]
    pub fn with_resource_path(mut self, resource_path: impl Into<String>) -> Self {
        self.resource_path = resource_path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_http_date_pads_fields() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 7, 4, 5, 9).unwrap();
        assert_eq!(format_http_date(ts), "Fri, 07 Mar 2025 04:05:09 GMT");
    }

    #[test]
    fn test_format_http_date_drops_subseconds() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(format_http_date(ts), "Tue, 31 Dec 2024 23:59:59 GMT");
    }

    #[test]
    fn test_context_defaults_to_session_resource() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ctx = SigningContext::new("{}", ts);
        assert_eq!(ctx.resource_path, "/microform/v2/sessions");
        assert_eq!(ctx.http_date, "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(ctx.payload, "{}");
    }

    #[test]
    fn test_context_with_resource_path() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ctx = SigningContext::new("{}", ts).with_resource_path("/other");
        assert_eq!(ctx.resource_path, "/other");
    }
}
