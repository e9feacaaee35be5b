//! Wall-clock timestamps in a named civil timezone.
//!
//! Ratings and exports are stamped with the time in a configured IANA
//! zone rather than the host's local zone. The offset comes from the
//! zone rules for that instant, so seasonal changes are reflected.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Zone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// `YYYY-MM-DDTHH:mm:ss±HH:MM`
const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Formats instants as fixed-offset timestamps for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFormatter {
    tz: Tz,
}

impl TimestampFormatter {
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build a formatter from an IANA zone name.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the name is not a known zone.
    pub fn from_name(name: &str) -> Result<Self> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| Error::Config(format!("unknown timezone '{name}'")))
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.tz
    }

    /// Format a UTC instant in this zone.
    #[must_use]
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.tz).format(FORMAT).to_string()
    }

    /// Format the current instant.
    #[must_use]
    pub fn now(&self) -> String {
        self.format(Utc::now())
    }
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self::new(chrono_tz::America::New_York)
    }
}

/// Parse a timestamp produced by [`TimestampFormatter`] back into UTC.
///
/// Returns `None` for anything that is not RFC 3339 with an explicit offset.
#[must_use]
pub fn parse(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
