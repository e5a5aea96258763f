//! Date helper functions
//!
//! Parsing of content API timestamps and locale-aware formatting of
//! date-fns style patterns (`PP`, `dd MMM yyyy`, `HH:mm`) through chrono.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::error::ContentError;

/// Parse a content API timestamp such as `2021-03-15T19:25:28+0000`
pub fn parse_api_date(value: &str) -> Result<DateTime<FixedOffset>, ContentError> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map_err(|_| ContentError::InvalidDate(value.to_string()))
}

/// Locale used for month names and the medium date pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    PtBr,
    EnUs,
}

impl Locale {
    /// Pick a locale from a language tag; anything but Portuguese is en-US
    pub fn from_language(language: &str) -> Self {
        let lang = language.to_ascii_lowercase();
        if lang == "pt" || lang.starts_with("pt-") || lang.starts_with("pt_") {
            Locale::PtBr
        } else {
            Locale::EnUs
        }
    }

    /// strftime format behind the date-fns `PP` token
    pub fn medium_format(&self) -> &'static str {
        match self {
            Locale::PtBr => "%-d de %b de %Y",
            Locale::EnUs => "%b %-d, %Y",
        }
    }

    fn chrono_locale(&self) -> chrono::Locale {
        match self {
            Locale::PtBr => chrono::Locale::pt_BR,
            Locale::EnUs => chrono::Locale::en_US,
        }
    }
}

/// date-fns tokens and their chrono equivalents
const DATE_FNS_TOKENS: [(&str, &str); 17] = [
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("y", "%Y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dd", "%d"),
    ("d", "%-d"),
    ("EEEE", "%A"),
    ("EEE", "%a"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
];

/// Convert a date-fns pattern to a chrono format string
///
/// Each run of one repeated letter is a token; `PP` expands to the locale's
/// medium date. Unknown runs are copied as-is.
///
/// # Examples
/// ```ignore
/// date_fns_to_chrono_format("dd MMM yyyy", Locale::PtBr) // -> "%d %b %Y"
/// ```
pub fn date_fns_to_chrono_format(pattern: &str, locale: Locale) -> String {
    let mut result = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = c.to_string();
        while chars.peek() == Some(&c) {
            run.push(c);
            chars.next();
        }

        match DATE_FNS_TOKENS.iter().find(|(token, _)| *token == run) {
            Some((_, format)) => result.push_str(format),
            None if run == "PP" => result.push_str(locale.medium_format()),
            None if c == '%' => result.push_str(&"%%".repeat(run.len())),
            None => result.push_str(&run),
        }
    }

    result
}

/// Formats timestamps in the site's locale and timezone
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    locale: Locale,
    tz: Tz,
}

impl DateFormatter {
    pub fn new(locale: Locale, tz: Tz) -> Self {
        Self { locale, tz }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Format with a date-fns pattern, in the site's timezone and locale
    pub fn format(&self, date: &DateTime<FixedOffset>, pattern: &str) -> String {
        let format = date_fns_to_chrono_format(pattern, self.locale);
        date.with_timezone(&self.tz)
            .format_localized(&format, self.locale.chrono_locale())
            .to_string()
    }

    /// Medium date (`PP`), used for publication dates
    pub fn medium(&self, date: &DateTime<FixedOffset>) -> String {
        self.format(date, "PP")
    }

    /// Date of the edited stamp (`dd MMM yyyy`)
    pub fn edited_date(&self, date: &DateTime<FixedOffset>) -> String {
        self.format(date, "dd MMM yyyy")
    }

    /// Time of the edited stamp (`HH:mm`)
    pub fn edited_time(&self, date: &DateTime<FixedOffset>) -> String {
        self.format(date, "HH:mm")
    }

    /// ISO 8601 form for `datetime` attributes
    pub fn iso(&self, date: &DateTime<FixedOffset>) -> String {
        date.with_timezone(&self.tz)
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string()
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(Locale::PtBr, chrono_tz::UTC)
    }
}
