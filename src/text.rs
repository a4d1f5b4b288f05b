use once_cell::sync::Lazy;
use regex::Regex;

pub const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

pub const MONTH_NAME: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

const DAY_NAME: &str = "sun(?:day)?|mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?";

const VENUE_MARKERS: [&str; 4] = ["@", "venue:", "location:", "where:"];

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));

static MONTH_DAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        &r"(?i)^(?:(?:{day})\.?,?\s+)?(?:{month})\.?\s+\d{1,2}(?:st|nd|rd|th)?\b"
            .replace("{day}", DAY_NAME)
            .replace("{month}", MONTH_NAME),
    )
    .expect("month day prefix regex must compile")
});

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{4}$").expect("numeric date regex must compile")
});

static DIGITS_AND_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d/\-\s]+$").expect("separator regex must compile"));

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}:\d{2}").expect("clock time regex must compile"));

static MERIDIEM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:\d|\b)[ap]\.?m\b").expect("meridiem regex must compile"));

static TIME_LEAD_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:doors|starts|begins)").expect("time lead regex must compile"));

static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d{1,2}:\d{2}\s*(?:am|pm)").expect("time of day regex must compile")
});

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d+(?:\.\d{2})?(?:\s*-\s*\$\d+(?:\.\d{2})?)?").expect("price regex must compile")
});

static FREE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfree\b").expect("free regex must compile"));

static RECURRING_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bevery\s+(sun|mon|tue|wed|thu|fri|sat)").expect("recurring regex must compile")
});

static DATE_FRAGMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:{month})\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s*\d{4})?",
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{4}\b",
        r"(?i)\b(?:today|tomorrow)\b",
    ]
    .iter()
    .map(|pattern| {
        Regex::new(&pattern.replace("{month}", MONTH_NAME))
            .expect("date fragment regex must compile")
    })
    .collect()
});

pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

pub fn looks_like_date_or_day(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lower = trimmed.to_lowercase();
    let bare = lower.trim_end_matches([',', '.', ':']);
    if DAY_NAMES.contains(&bare) || bare == "today" || bare == "tomorrow" {
        return true;
    }

    MONTH_DAY_PREFIX.is_match(trimmed)
        || NUMERIC_DATE.is_match(trimmed)
        || DIGITS_AND_SEPARATORS.is_match(trimmed)
}

pub fn looks_like_venue_marker(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if VENUE_MARKERS.iter().any(|marker| lower.starts_with(marker)) {
        return true;
    }

    lower == "at" || lower.starts_with("at ")
}

pub fn looks_like_time_marker(text: &str) -> bool {
    let trimmed = text.trim();
    CLOCK_TIME.is_match(trimmed)
        || MERIDIEM_TOKEN.is_match(trimmed)
        || TIME_LEAD_WORD.is_match(trimmed)
}

pub fn strip_venue_marker(text: &str) -> String {
    let trimmed = text.trim();

    for marker in VENUE_MARKERS {
        if let Some(rest) = strip_prefix_ignore_case(trimmed, marker) {
            return rest.trim().to_string();
        }
    }
    if let Some(rest) = strip_prefix_ignore_case(trimmed, "at ") {
        return rest.trim().to_string();
    }

    trimmed.to_string()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

pub fn find_time(text: &str) -> Option<String> {
    TIME_OF_DAY
        .find(text)
        .map(|m| normalize_whitespace(m.as_str()))
}

pub fn find_price(text: &str) -> Option<String> {
    if let Some(found) = PRICE.find(text) {
        return Some(found.as_str().to_string());
    }
    if FREE.is_match(text) {
        return Some("Free".to_string());
    }
    None
}

pub fn split_time_and_price(text: &str) -> (String, Option<String>, Option<String>) {
    let mut rest = text.to_string();

    let time = cut_first(&TIME_OF_DAY, &mut rest).map(|found| normalize_whitespace(&found));
    let price = cut_first(&PRICE, &mut rest)
        .or_else(|| cut_first(&FREE, &mut rest).map(|_| "Free".to_string()));

    let rest = normalize_whitespace(&rest);
    let rest = rest
        .trim_end_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .to_string();
    (rest, time, price)
}

fn cut_first(re: &Regex, text: &mut String) -> Option<String> {
    let (range, found) = re
        .find(text)
        .map(|m| (m.range(), m.as_str().to_string()))?;
    text.replace_range(range, " ");
    Some(found)
}

/// Recurring listings ("every Mon") map to the full day name.
pub fn find_date_fragment(text: &str) -> Option<String> {
    if let Some(caps) = RECURRING_DAY.captures(text) {
        let prefix = caps.get(1)?.as_str().to_lowercase();
        return DAY_NAMES
            .iter()
            .find(|day| day.starts_with(&prefix))
            .map(|day| title_case(day));
    }

    DATE_FRAGMENTS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_string())
}

pub fn contains_url(text: &str) -> bool {
    text.to_lowercase().contains("http")
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
