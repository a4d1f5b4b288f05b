use anyhow::Result;
use chrono::NaiveDate;
use showlists::config::{LoadedSource, SourceConfig};
use showlists::fetch::FetchedDocument;
use showlists::parser::{
    ExtractContext, extract_candidates, is_date_header, match_event_line, parse_source_events,
};
use std::path::PathBuf;

const SHOWLIST_PAGE: &str = include_str!("fixtures/data/showlists.html");
const VENUE_PAGE: &str = include_str!("fixtures/data/emos.html");

fn ctx() -> ExtractContext {
    ExtractContext {
        today: NaiveDate::from_ymd_opt(2025, 9, 12).expect("valid date"),
        now_millis: 1_757_000_000_042,
    }
}

fn source(toml_text: &str) -> Result<LoadedSource> {
    let config: SourceConfig = toml::from_str(toml_text)?;
    config.validate()?;
    Ok(LoadedSource {
        path: PathBuf::from("inline.toml"),
        config,
    })
}

fn doc(body: &str) -> FetchedDocument {
    FetchedDocument {
        source_url: "inline://test".to_string(),
        body: body.to_string(),
    }
}

fn date_header_source() -> Result<LoadedSource> {
    source(
        r#"
[source]
key = "showlist"
name = "Showlist"

[fetch]
mode = "inline"
inline_data = "<p></p>"

[extract]
strategy = "date_headers"
"#,
    )
}

fn card_source(fixed_venue: Option<&str>) -> Result<LoadedSource> {
    let fixed = fixed_venue
        .map(|venue| format!("fixed_venue = \"{venue}\""))
        .unwrap_or_default();
    source(&format!(
        r#"
[source]
key = "cards"
name = "Cards"
{fixed}

[fetch]
mode = "inline"
inline_data = "<p></p>"
"#
    ))
}

#[test]
fn date_headers_scope_the_lines_beneath_them() -> Result<()> {
    let source = date_header_source()?;
    let candidates = extract_candidates(&source.config, SHOWLIST_PAGE)?;

    assert_eq!(candidates.len(), 3);

    assert_eq!(candidates[0].artist, "Spoon");
    assert_eq!(candidates[0].venue, "Emo's Austin Downtown");
    assert_eq!(candidates[0].date_text, "Friday, September 12, 2025");
    assert_eq!(candidates[0].time.as_deref(), Some("8:00 pm"));
    assert_eq!(candidates[0].price.as_deref(), Some("$45"));

    assert_eq!(candidates[1].artist, "Jane Doe");
    assert_eq!(candidates[1].venue, "Stubbs");

    assert_eq!(candidates[2].artist, "Black Pumas");
    assert_eq!(candidates[2].venue, "ACL Live");
    assert_eq!(candidates[2].date_text, "Saturday, September 13, 2025");

    Ok(())
}

#[test]
fn date_header_events_are_normalized() -> Result<()> {
    let source = date_header_source()?;
    let events = parse_source_events(&source, &doc(SHOWLIST_PAGE), &ctx())?;

    assert_eq!(events.len(), 3);

    let spoon = &events[0];
    assert_eq!(spoon.venue, "Emo's Austin");
    assert_eq!(spoon.date, NaiveDate::from_ymd_opt(2025, 9, 12).expect("date"));
    assert!(spoon.is_favorite_venue);
    assert_eq!(spoon.genre, "Live Music");
    assert_eq!(spoon.source, "Showlist");
    assert_eq!(
        spoon.metadata.get("original_venue").map(String::as_str),
        Some("Emo's Austin Downtown")
    );
    assert!(spoon.id.ends_with("0042"));

    let jane = &events[1];
    assert_eq!(jane.venue, "Stubb's Bar-B-Q");
    assert!(!jane.is_favorite_venue);
    assert_eq!(jane.time, "TBD");
    assert_eq!(jane.price, "TBD");

    let pumas = &events[2];
    assert_eq!(pumas.venue, "ACL Live at The Moody Theater");
    assert_eq!(pumas.date, NaiveDate::from_ymd_opt(2025, 9, 13).expect("date"));

    Ok(())
}

#[test]
fn lines_before_any_header_are_ignored() -> Result<()> {
    let source = date_header_source()?;
    let html = "<div><p>Spoon @ Mohawk tonight 9:00 pm</p><h2>Sep 20</h2><p>Wet Leg @ Mohawk 9:00 pm</p></div>";
    let candidates = extract_candidates(&source.config, html)?;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].artist, "Wet Leg");
    assert_eq!(candidates[0].date_text, "Sep 20");
    Ok(())
}

#[test]
fn band_names_that_start_like_months_stay_event_lines() -> Result<()> {
    let source = date_header_source()?;
    let html = r#"
<div>
  <h2>Friday, September 12, 2025</h2>
  <p>Decibel 5 @ Mohawk 9:00 pm</p>
  <p>Marching 4 Joy at Saxon Pub</p>
  <p>Wet Leg @ Mohawk 9:00 pm</p>
</div>
"#;
    let events = parse_source_events(&source, &doc(html), &ctx())?;

    let artists: Vec<&str> = events.iter().map(|e| e.artist.as_str()).collect();
    assert_eq!(artists, vec!["Decibel 5", "Marching 4 Joy", "Wet Leg"]);
    assert!(
        events
            .iter()
            .all(|e| e.date == NaiveDate::from_ymd_opt(2025, 9, 12).expect("date"))
    );
    assert!(!is_date_header("Marching 4 Joy at Saxon Pub"));
    Ok(())
}

#[test]
fn header_and_line_shapes() {
    assert!(is_date_header("Friday, September 12"));
    assert!(is_date_header("Sep 13"));
    assert!(is_date_header("Saturday"));
    assert!(is_date_header("9/13/2025"));
    assert!(!is_date_header("Spoon @ Mohawk"));

    let line = match_event_line("Spoon @ Mohawk 9:00 pm $20").expect("line should match");
    assert_eq!(line.artist, "Spoon");
    assert_eq!(line.venue, "Mohawk");
    assert_eq!(line.time.as_deref(), Some("9:00 pm"));
    assert_eq!(line.price.as_deref(), Some("$20"));

    assert!(match_event_line("8:00 pm @ Mohawk").is_none());
    assert!(match_event_line("Buy tickets at https://example.com/spoon").is_none());
}

#[test]
fn venue_cards_use_fixed_venue() -> Result<()> {
    let source = card_source(Some("Emo's Austin"))?;
    let events = parse_source_events(&source, &doc(VENUE_PAGE), &ctx())?;

    assert_eq!(events.len(), 2);

    assert_eq!(events[0].artist, "Spoon");
    assert_eq!(events[0].venue, "Emo's Austin");
    assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2025, 9, 12).expect("date"));
    assert_eq!(events[0].time, "7:00 PM");
    assert_eq!(events[0].price, "$45.00");

    assert_eq!(events[1].artist, "Black Pumas");
    assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2025, 9, 13).expect("date"));
    assert_eq!(events[1].price, "TBD");

    assert!(events.iter().all(|e| e.is_favorite_venue));
    Ok(())
}

#[test]
fn unproductive_container_selectors_fall_through() -> Result<()> {
    let source = card_source(None)?;
    let html = r#"
<div class="event"><span>7:30 PM</span></div>
<article>
  <h2>Khruangbin</h2>
  <p class="venue">Moody Amphitheater</p>
  <p class="when">Oct 3, 2025</p>
</article>
"#;
    let candidates = extract_candidates(&source.config, html)?;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].artist, "Khruangbin");
    assert_eq!(candidates[0].venue, "Moody Amphitheater");
    assert_eq!(candidates[0].date_text, "Oct 3, 2025");
    Ok(())
}

#[test]
fn cards_without_a_venue_are_dropped() -> Result<()> {
    let source = card_source(None)?;
    let html = r#"<div class="event-item"><h3>Wet Leg</h3><span class="date">Oct 3, 2025</span></div>"#;

    assert!(extract_candidates(&source.config, html)?.is_empty());
    Ok(())
}

#[test]
fn recurring_listings_land_on_the_next_weekday() -> Result<()> {
    let source = source(
        r#"
[source]
key = "do512"
name = "Do512"

[fetch]
mode = "inline"
inline_data = "<p></p>"

[extract]
containers = [".ds-listing.event-card.ds-event-category-live-music"]

[extract.fields]
artist = [".ds-listing-event-title-text", ".ds-byline"]
venue = [".ds-venue-name"]
date = [".ds-listing-details"]
time = [".ds-event-time", ".ds-listing-details"]
price = [".ds-ticket-info"]
"#,
    )?;
    let html = r#"
<div class="ds-listing event-card ds-event-category-live-music">
  <div class="ds-listing-event-title-text">Blues Jam</div>
  <div class="ds-venue-name">Saxon Pub</div>
  <div class="ds-listing-details">Every Mon 8:00 pm</div>
  <div class="ds-ticket-info">Free</div>
</div>
"#;
    let events = parse_source_events(&source, &doc(html), &ctx())?;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].venue, "Saxon Pub");
    assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2025, 9, 15).expect("date"));
    assert_eq!(events[0].time, "8:00 pm");
    assert_eq!(events[0].price, "Free");
    Ok(())
}
