use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use itertools::Itertools;
use regex::{Captures, Regex};
use reqwest::Url;
use scraper::{ElementRef, Selector};

use crate::{
    model::MangaState,
    parse_error::{ParseError, Result},
};

lazy_static! {
    static ref SELECTOR_GROUP_SPLITTER: Regex = Regex::new(r",\s*").unwrap();
    static ref SUB_DOMAIN: Regex = Regex::new(r"^.+\.([^.]+\.[^.]+)$").unwrap();
}

pub fn string_to_state(state: &str) -> MangaState {
    match state.trim().to_lowercase().as_str() {
        "ongoing" | "on going" | "publishing" | "releasing" | "updating" | "连载中" => {
            MangaState::Ongoing
        }
        "completed" | "complete" | "finished" | "done" | "dropped" | "stopped" | "已完结" => {
            MangaState::Finished
        }
        "hiatus" | "on hold" | "paused" => MangaState::Paused,
        "upcoming" | "coming soon" => MangaState::Upcoming,
        _ => MangaState::Unknown,
    }
}

fn parse_selector(query: &str) -> Result<Selector> {
    Selector::parse(query).map_err(|_| ParseError::InvalidSelector(query.to_owned()))
}

///
/// Return the result of the first selector that matches anything
///
/// # Example
/// query = "a, p[example], p";
/// where body is
/// <div>
///     <p example>hello</p>
/// </div>
/// will only return 1 p
/// instead of 2
pub fn select<'a>(root: ElementRef<'a>, query: &str) -> Result<Vec<ElementRef<'a>>> {
    for query in SELECTOR_GROUP_SPLITTER.split(query) {
        let elements = root.select(&parse_selector(query)?).collect_vec();
        if !elements.is_empty() {
            return Ok(elements);
        }
    }
    Ok(vec![])
}

pub fn select_first<'a>(root: ElementRef<'a>, query: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(select(root, query)?.into_iter().next())
}

/// Element text with runs of whitespace collapsed
pub fn text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Element text exactly as in the document, for scripts
pub fn raw_text(element: ElementRef) -> String {
    element.text().collect()
}

pub fn text_or_attr(element: ElementRef, attr: Option<&str>) -> Option<String> {
    let value = attr
        .and_then(|attr| element.value().attr(attr))
        .map(|value| value.trim().to_owned())
        .unwrap_or_else(|| text(element));

    Some(value).filter(|value| !value.is_empty())
}

pub fn first_attr(element: ElementRef, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

pub fn merge_attr_with_default(
    attr: &Option<&'static str>,
    default: Vec<&'static str>,
) -> Vec<&'static str> {
    match attr {
        Some(attr) => merge_vec_with_default(&Some(vec![*attr]), default),
        None => default,
    }
}

pub fn merge_vec_with_default(
    attrs: &Option<Vec<&'static str>>,
    default: Vec<&'static str>,
) -> Vec<&'static str> {
    attrs
        .iter()
        .flatten()
        .copied()
        .chain(default)
        .unique()
        .collect()
}

pub fn get_hostname(url: &Url) -> Result<String> {
    let hostname = url
        .host_str()
        .ok_or(ParseError::MissingHostname(url.to_string()))?;
    Ok(SUB_DOMAIN.replace(hostname, "$1").into_owned())
}

/// Path and query of `url`, the form ids are generated from
pub fn to_relative(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_owned(),
    }
}

/// [`to_relative`] when `url` is on the registrable domain of `domain`, the
/// full url when it lives on another site.
pub fn relative_to(url: &Url, domain: &str) -> String {
    let same_site = url
        .host_str()
        .is_some_and(|host| SUB_DOMAIN.replace(host, "$1") == SUB_DOMAIN.replace(domain, "$1"));
    if same_site {
        to_relative(url)
    } else {
        url.to_string()
    }
}

/// Resolve the first present attribute of `element` against `location`
pub fn abs_url(location: &Url, element: ElementRef, attrs: &[&'static str]) -> Result<Url> {
    let value = first_attr(element, attrs)
        .ok_or_else(|| ParseError::NoUrlFound(element.value().name().to_owned(), attrs.to_vec()))?;
    join_url(location, &value)
}

pub fn join_url(location: &Url, value: &str) -> Result<Url> {
    location
        .join(value.trim())
        .map_err(|_| ParseError::FailedToMakeAbsolute(value.to_owned()))
}

/// Undo backslash escapes of a quoted JavaScript string literal
pub fn unescape_js(literal: &str) -> String {
    let mut unescaped = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            unescaped.extend(chars.next());
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}

lazy_static! {
    static ref CLEAN_DATE: Regex = Regex::new(r"[^\w\d:.+\-]+").unwrap();
    static ref CLEAN_DATE_2: Regex = Regex::new(r"-{2,}").unwrap();
    static ref ORDINAL_NUMBER: Regex = Regex::new(r"(\d)(nd|st|rd|th)").unwrap();
    static ref DIGITS_ONLY: Regex = Regex::new(r"^\d+$").unwrap();
    static ref HAS_DIGITS: Regex = Regex::new(r"\d+").unwrap();
    static ref NONE_LETTER: Regex = Regex::new(r"\W").unwrap();
    /// Selects "1 year ago" -> "1y"
    static ref RELATIVE_DATE: Regex = Regex::new(r"(\d+)\s*(\w\w?)").unwrap();
}

const STRING_FOR_CURRENT_DATE: [&str; 6] = ["now", "latest", "hot", "today", "current", "while"];

const DEFAULT_DATE_FORMATS: [&str; 18] = [
    // 2022-01-30T09:10:11.123Z
    "%Y-%m-%dT%H:%M:%S%.fZ",
    // 2022-01-30T09:10:11.123+0800
    "%Y-%m-%dT%H:%M:%S%.f%z",
    // 2022-01-30T09:10:11+0800
    "%Y-%m-%dT%H:%M:%S%z",
    // 2022-01-30T09:10:11Z
    "%Y-%m-%dT%H:%M:%SZ",
    // 2022-01-30T09:10:11
    "%Y-%m-%dT%H:%M:%S",
    // Juli 30 22 - 09:10
    "%B-%d-%y-%H:%M",
    // Juli 30 2022 09:10
    "%B-%d-%Y-%H:%M",
    // Oct 30 22 09:10:11
    "%b-%d-%y-%H:%M:%S",
    // Juli-30,22 09:10:11
    "%B-%d-%y-%H:%M:%S",
    // Oct 30 09:10
    "%b-%d-%H:%M",
    // 30 Juli 09:10
    "%d-%B-%H:%M",
    // 30 Oct 09:10
    "%d-%b-%H:%M",
    // Juli 30 2022
    "%B-%d-%Y",
    // Oct 30 2022
    "%b-%d-%Y",
    // Oct 30 22
    "%b-%d-%y",
    // 30 Juli 2022
    "%d-%B-%Y",
    // 2022.12.30
    "%Y.%m.%d",
    // 30 01 2022
    "%d-%m-%Y",
];

fn parse_with_format(date: &str, format: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(date, format) {
        Ok(date) => Some(Utc.from_utc_datetime(&date)),
        // If missing time, parse only the date
        Err(e) if e.kind() == chrono::format::ParseErrorKind::NotEnough => {
            NaiveDate::parse_from_str(date, format)
                .ok()
                .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
        }
        Err(_) => None,
    }
}

/// Parse whatever a source prints as a date. `formats` are tried before the
/// built-in ones; they see the date with separators normalized to `-`.
pub fn try_parse_date(date: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    // Check if epoch millis [digits only]
    if DIGITS_ONLY.is_match(date) {
        return date.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
    }

    let now = Utc::now();

    // Check if text only
    if !HAS_DIGITS.is_match(date) {
        let date = NONE_LETTER.replace_all(date, "").to_lowercase();

        if STRING_FOR_CURRENT_DATE.iter().any(|current| date.contains(current)) {
            return Some(now);
        }
        if date.contains("yesterday") {
            return now.checked_sub_signed(Duration::days(1));
        }
        if date.contains("week") {
            return now.checked_sub_signed(Duration::weeks(1));
        }
        if date.contains("month") {
            return now.checked_sub_months(Months::new(1));
        }
        if date.contains("year") {
            return now.checked_sub_signed(Duration::days(365));
        }
        return None;
    }

    // Check if date format (multiple digits)
    if HAS_DIGITS.find_iter(date).count() > 1 {
        let cleaned = CLEAN_DATE.replace_all(date, "-");
        let cleaned = CLEAN_DATE_2.replace_all(&cleaned, "-");
        let cleaned = ORDINAL_NUMBER.replace_all(&cleaned, |cap: &Captures| cap[1].to_owned());

        let parsed = formats
            .iter()
            .chain(DEFAULT_DATE_FORMATS.iter())
            .find_map(|format| parse_with_format(&cleaned, format));
        if parsed.is_some() {
            return parsed;
        }
    }

    // Check if relative
    // e.g. "1 year ago"
    let lowercase = date.to_lowercase();
    let captures = RELATIVE_DATE.captures(&lowercase)?;
    // Assume that it always is [number][type] ago
    let amount: i64 = captures[1].parse().ok()?;
    let unit = &captures[2];

    let delta = if unit == "mi" {
        Duration::try_minutes(amount)
    } else {
        match unit.chars().next()? {
            's' => Duration::try_seconds(amount),
            'h' => Duration::try_hours(amount),
            'd' => Duration::try_days(amount),
            'w' => Duration::try_weeks(amount),
            'm' => {
                let months = u32::try_from(amount).ok()?;
                return now.checked_sub_months(Months::new(months));
            }
            'y' => amount.checked_mul(365).and_then(Duration::try_days),
            _ => None,
        }
    };
    delta.and_then(|delta| now.checked_sub_signed(delta))
}

/// [`try_parse_date`] as epoch millis, 0 when the date is unknown
pub fn parse_date_millis(date: &str, formats: &[&str]) -> i64 {
    try_parse_date(date, formats).map_or(0, |date| date.timestamp_millis())
}
