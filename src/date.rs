use crate::text::{DAY_NAMES, MONTH_NAME};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const FALLBACK_DAYS_AHEAD: i64 = 7;

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        &r"\b({month})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s*(\d{4})"
            .replace("{month}", MONTH_NAME),
    )
    .expect("month day year regex must compile")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").expect("numeric date regex must compile")
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&r"\b({month})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b".replace("{month}", MONTH_NAME))
        .expect("month day regex must compile")
});

static RELATIVE_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(today|tonight|tomorrow)\b").expect("relative regex must compile"));

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(sunday|monday|tuesday|wednesday|thursday|friday|saturday)\b")
        .expect("weekday regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    FragmentAndContext,
    Fragment,
}

/// One step of the date cascade. Rules see lower-cased text.
pub struct DateRule {
    pub name: &'static str,
    pub scope: RuleScope,
    pub resolve: fn(&str, NaiveDate) -> Option<NaiveDate>,
}

/// Yearless and relative dates only count inside the fragment.
pub const DATE_RULES: [DateRule; 5] = [
    DateRule {
        name: "month_day_year",
        scope: RuleScope::FragmentAndContext,
        resolve: month_day_year,
    },
    DateRule {
        name: "numeric",
        scope: RuleScope::FragmentAndContext,
        resolve: numeric,
    },
    DateRule {
        name: "month_day",
        scope: RuleScope::Fragment,
        resolve: month_day,
    },
    DateRule {
        name: "relative_day",
        scope: RuleScope::Fragment,
        resolve: relative_day,
    },
    DateRule {
        name: "weekday",
        scope: RuleScope::FragmentAndContext,
        resolve: weekday,
    },
];

pub fn normalize_date(fragment: &str, context: &str) -> NaiveDate {
    normalize_date_on(fragment, context, Utc::now().date_naive())
}

pub fn normalize_date_on(fragment: &str, context: &str, today: NaiveDate) -> NaiveDate {
    resolve_date(fragment, context, today)
        .map(|(date, _)| date)
        .unwrap_or_else(|| fallback_date(today))
}

pub fn resolve_date(
    fragment: &str,
    context: &str,
    today: NaiveDate,
) -> Option<(NaiveDate, &'static str)> {
    let fragment = fragment.trim().to_lowercase();
    let combined = format!("{fragment} {}", context.to_lowercase());
    let combined = combined.trim();
    if combined.is_empty() {
        return None;
    }

    DATE_RULES.iter().find_map(|rule| {
        let text = match rule.scope {
            RuleScope::FragmentAndContext => combined,
            RuleScope::Fragment => fragment.as_str(),
        };
        (rule.resolve)(text, today).map(|date| (date, rule.name))
    })
}

pub fn fallback_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(FALLBACK_DAYS_AHEAD)
}

pub fn today_in(timezone: Option<&str>) -> NaiveDate {
    let now = Utc::now();
    match timezone.and_then(|name| name.parse::<Tz>().ok()) {
        Some(tz) => now.with_timezone(&tz).date_naive(),
        None => now.date_naive(),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let abbr = name.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == abbr)
        .map(|idx| idx as u32 + 1)
}

fn month_day_year(text: &str, _today: NaiveDate) -> Option<NaiveDate> {
    let caps = MONTH_DAY_YEAR.captures(text)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn numeric(text: &str, _today: NaiveDate) -> Option<NaiveDate> {
    let caps = NUMERIC.captures(text)?;
    let month = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = MONTH_DAY.captures(text)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let day = caps.get(2)?.as_str().parse::<u32>().ok()?;

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn relative_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = RELATIVE_DAY.captures(text)?;
    match caps.get(1)?.as_str() {
        "tomorrow" => today.succ_opt(),
        _ => Some(today),
    }
}

fn weekday(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = WEEKDAY.captures(text)?;
    let name = caps.get(1)?.as_str();
    let target = DAY_NAMES.iter().position(|day| *day == name)? as i64;
    let current = today.weekday().num_days_from_sunday() as i64;

    let mut days_until = (target - current).rem_euclid(7);
    if days_until == 0 {
        days_until = 7;
    }
    Some(today + Duration::days(days_until))
}
