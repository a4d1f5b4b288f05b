use chrono::Utc;

const STEM_LEN: usize = 16;

/// Not unique across runs; dedup uses the composite key instead.
pub fn assign_id(artist: &str, venue: &str, raw_date: &str) -> String {
    assign_id_at(artist, venue, raw_date, Utc::now().timestamp_millis())
}

pub fn assign_id_at(artist: &str, venue: &str, raw_date: &str, millis: i64) -> String {
    let stem: String = format!("{artist}{venue}{raw_date}")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(STEM_LEN)
        .collect();
    format!("{stem}{:04}", millis.rem_euclid(10_000))
}
