use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

static NON_SLUG_CHARS: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static DASH_RUNS: OnceLock<Regex> = OnceLock::new();

/// Lowercases, drops anything but word chars, whitespace and dashes, then
/// turns whitespace runs into single dashes.
pub fn slugify(text: &str) -> String {
    let non_slug = NON_SLUG_CHARS.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap());
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    let dashes = DASH_RUNS.get_or_init(|| Regex::new(r"-+").unwrap());

    let lower = text.to_lowercase();
    let stripped = non_slug.replace_all(&lower, "");
    let dashed = whitespace.replace_all(&stripped, "-");
    dashes.replace_all(&dashed, "-").trim().to_string()
}

/// Host component of a URL, or `None` if it does not parse.
pub fn url_host(raw: &str) -> Option<String> {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Host without a leading `www.`; empty when the URL is malformed.
pub fn extract_domain(raw: &str) -> String {
    url_host(raw)
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
        .unwrap_or_default()
}

/// Accepts RFC 3339 timestamps, naive date-times and plain `YYYY-MM-DD`
/// dates (taken as midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// `Monday, January 15, 2024`
pub fn format_long_date(date: &DateTime<Utc>) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `1/15/2024`
pub fn format_short_date(date: &DateTime<Utc>) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
