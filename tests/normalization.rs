use chrono::NaiveDate;
use showlists::date::{fallback_date, normalize_date_on, resolve_date};
use showlists::ident::assign_id_at;
use showlists::text::{
    find_date_fragment, find_price, find_time, looks_like_date_or_day, looks_like_time_marker,
    looks_like_venue_marker, normalize_whitespace, split_time_and_price, strip_venue_marker,
};
use showlists::venue::{UNKNOWN_VENUE, VenueCatalog, canonicalize_venue, is_favorite_venue};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

// A Friday.
fn friday() -> NaiveDate {
    ymd(2025, 9, 12)
}

#[test]
fn explicit_dates_resolve_regardless_of_today() {
    let today = ymd(2024, 1, 1);

    assert_eq!(
        normalize_date_on("Friday, September 12th 2025", "show", today),
        ymd(2025, 9, 12)
    );
    assert_eq!(normalize_date_on("Sep 13, 2025", "", today), ymd(2025, 9, 13));
    assert_eq!(normalize_date_on("9/13/2025", "", today), ymd(2025, 9, 13));
}

#[test]
fn month_name_with_year_beats_weekday() {
    let resolved = resolve_date("Friday", "Doors at 8 on Sep 13, 2025", friday());
    assert_eq!(resolved, Some((ymd(2025, 9, 13), "month_day_year")));
}

#[test]
fn month_day_without_year_rolls_forward() {
    assert_eq!(normalize_date_on("Sep 20", "", friday()), ymd(2025, 9, 20));
    assert_eq!(normalize_date_on("Jan 5", "", friday()), ymd(2026, 1, 5));
    assert_eq!(normalize_date_on("Sep 12", "", friday()), friday());
}

#[test]
fn weekday_resolves_strictly_after_today() {
    assert_eq!(normalize_date_on("Saturday", "", friday()), ymd(2025, 9, 13));
    assert_eq!(normalize_date_on("Friday", "", friday()), ymd(2025, 9, 19));
    assert_eq!(normalize_date_on("monday", "", friday()), ymd(2025, 9, 15));
}

#[test]
fn context_words_do_not_override_the_weekday_fragment() {
    assert_eq!(
        normalize_date_on("Saturday", "Saturday Spoon - tickets on sale today", friday()),
        ymd(2025, 9, 13)
    );
    assert_eq!(
        normalize_date_on("Saturday", "Saturday Spoon Oct 2 tour stop", friday()),
        ymd(2025, 9, 13)
    );
    assert_eq!(resolve_date("", "doors tonight", friday()), None);
}

#[test]
fn words_starting_like_months_are_not_dates() {
    assert!(!looks_like_date_or_day("Marching 4 Joy"));
    assert!(!looks_like_date_or_day("Octopus 9"));
    assert!(looks_like_date_or_day("Sept. 12"));
    assert!(looks_like_date_or_day("Wed, June 4th"));

    assert_eq!(find_date_fragment("Decibel 5 live"), None);
    assert_eq!(resolve_date("Junebug 7, 2025", "", friday()), None);
    assert_eq!(normalize_date_on("Sept 20, 2025", "", friday()), ymd(2025, 9, 20));
}

#[test]
fn relative_words_resolve_from_today() {
    assert_eq!(normalize_date_on("Tonight", "", friday()), friday());
    assert_eq!(normalize_date_on("tomorrow", "", friday()), ymd(2025, 9, 13));
}

#[test]
fn unresolvable_or_invalid_dates_fall_back_a_week_out() {
    assert_eq!(fallback_date(friday()), ymd(2025, 9, 19));
    assert_eq!(normalize_date_on("TBA", "", friday()), ymd(2025, 9, 19));
    assert_eq!(normalize_date_on("", "", friday()), ymd(2025, 9, 19));

    assert_eq!(resolve_date("Feb 30, 2025", "", friday()), None);
    assert_eq!(resolve_date("13/45/2025", "", friday()), None);
}

#[test]
fn field_predicates_classify_common_fragments() {
    assert!(looks_like_date_or_day("Friday"));
    assert!(looks_like_date_or_day("Sep 13"));
    assert!(looks_like_date_or_day("Sat, Sep 13th"));
    assert!(looks_like_date_or_day("9/13/2025"));
    assert!(!looks_like_date_or_day("Spoon"));
    assert!(!looks_like_date_or_day("Jane Doe"));

    assert!(looks_like_venue_marker("@ Mohawk"));
    assert!(looks_like_venue_marker("at the Mohawk"));
    assert!(looks_like_venue_marker("Venue: Scoot Inn"));
    assert!(!looks_like_venue_marker("Atlas Sound"));

    assert!(looks_like_time_marker("8:00 PM"));
    assert!(looks_like_time_marker("7pm"));
    assert!(looks_like_time_marker("Doors open"));
    assert!(!looks_like_time_marker("Black Pumas"));
}

#[test]
fn venue_markers_strip_case_insensitively() {
    assert_eq!(strip_venue_marker("@ Mohawk"), "Mohawk");
    assert_eq!(strip_venue_marker("Venue: Scoot Inn"), "Scoot Inn");
    assert_eq!(strip_venue_marker("At The Far Out"), "The Far Out");
    assert_eq!(strip_venue_marker("Atlas Room"), "Atlas Room");
}

#[test]
fn time_and_price_are_cut_from_venue_text() {
    let (rest, time, price) = split_time_and_price("Mohawk 9:00 pm $15");
    assert_eq!(rest, "Mohawk");
    assert_eq!(time.as_deref(), Some("9:00 pm"));
    assert_eq!(price.as_deref(), Some("$15"));

    let (rest, time, price) = split_time_and_price("Hole in the Wall, Free");
    assert_eq!(rest, "Hole in the Wall");
    assert_eq!(time, None);
    assert_eq!(price.as_deref(), Some("Free"));

    assert_eq!(find_time("Doors 7:30 PM sharp").as_deref(), Some("7:30 PM"));
    assert_eq!(find_price("Tickets $20 - $35").as_deref(), Some("$20 - $35"));
    assert_eq!(find_price("no cover listed"), None);
}

#[test]
fn date_fragments_are_found_in_free_text() {
    assert_eq!(
        find_date_fragment("Every Mon, 8pm at Saxon Pub").as_deref(),
        Some("Monday")
    );
    assert_eq!(
        find_date_fragment("Spoon live Sep 13, 2025 doors 7").as_deref(),
        Some("Sep 13, 2025")
    );
    assert_eq!(
        find_date_fragment("this Saturday only").as_deref(),
        Some("Saturday")
    );
    assert_eq!(find_date_fragment("no date here"), None);
    assert_eq!(normalize_whitespace("  Black\n\t Pumas  "), "Black Pumas");
}

#[test]
fn venue_names_canonicalize_both_ways() {
    assert_eq!(canonicalize_venue("emo's"), "Emo's Austin");
    assert_eq!(canonicalize_venue("Emo's Austin Downtown"), "Emo's Austin");
    assert_eq!(canonicalize_venue("stubbs"), "Stubb's Bar-B-Q");
    assert_eq!(canonicalize_venue("Stubb's Bar-B-Q"), "Stubb's Bar-B-Q");
    assert_eq!(
        canonicalize_venue("ACL Live at The Moody Theater"),
        "ACL Live at The Moody Theater"
    );
    assert_eq!(canonicalize_venue("the empty bottle"), "The Empty Bottle");
    assert_eq!(canonicalize_venue("   "), UNKNOWN_VENUE);
}

#[test]
fn favorites_are_flagged_by_canonical_name() {
    assert!(is_favorite_venue("Emo's Austin"));
    assert!(is_favorite_venue("Scoot Inn"));
    assert!(!is_favorite_venue("Stubb's Bar-B-Q"));
    assert!(!is_favorite_venue("emo's"));

    let favorites = VenueCatalog::austin().favorites().len();
    assert_eq!(favorites, 3);
}

#[test]
fn ids_combine_a_readable_stem_with_clock_digits() {
    let id = assign_id_at("Spoon", "Emo's Austin", "Sep 12, 2025", 1_757_000_001_234);
    assert_eq!(id, "SpoonEmosAustinS1234");

    let padded = assign_id_at("Spoon", "Emo's Austin", "Sep 12, 2025", 7);
    assert_eq!(padded, "SpoonEmosAustinS0007");

    let short = assign_id_at("X", "Y", "", 42);
    assert_eq!(short, "XY0042");
}
