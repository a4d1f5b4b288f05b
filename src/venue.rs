use crate::text::title_case;
use once_cell::sync::Lazy;

pub const UNKNOWN_VENUE: &str = "Unknown Venue";

#[derive(Debug, Clone)]
pub struct VenueEntry {
    pub name: String,
    pub aliases: Vec<String>,
    pub favorite: bool,
}

/// Ordered alias table. Lookup order is the tie-break between entries.
#[derive(Debug, Clone)]
pub struct VenueCatalog {
    entries: Vec<VenueEntry>,
}

const AUSTIN_VENUES: &[(&str, bool, &[&str])] = &[
    (
        "Emo's Austin",
        true,
        &["emo's", "emos", "emo's austin", "emos austin"],
    ),
    (
        "ACL Live at The Moody Theater",
        true,
        &[
            "acl live",
            "moody theater",
            "acl moody",
            "the moody theater",
            "moody theatre",
        ],
    ),
    ("Scoot Inn", true, &["scoot inn", "the scoot inn"]),
    (
        "Stubb's Bar-B-Q",
        false,
        &["stubb's", "stubbs", "stubb's bar-b-q", "stubbs bar-b-q"],
    ),
    (
        "Antone's Nightclub",
        false,
        &["antone's", "antones", "antone's nightclub"],
    ),
    (
        "The Continental Club",
        false,
        &["continental club", "the continental club", "continental"],
    ),
    ("Saxon Pub", false, &["saxon pub", "the saxon pub", "saxon"]),
    (
        "Cheer Up Charlies",
        false,
        &["cheer up charlies", "cheer up charlie's"],
    ),
    (
        "The Far Out",
        false,
        &["the far out", "far out", "far out lounge"],
    ),
    ("Mohawk", false, &["mohawk", "the mohawk"]),
    (
        "Red River Cultural District",
        false,
        &["red river", "red river district"],
    ),
    ("Hole in the Wall", false, &["hole in the wall"]),
    (
        "C-Boys Heart & Soul",
        false,
        &["c-boys", "c boys", "c-boys heart & soul"],
    ),
    (
        "Paramount Theatre",
        false,
        &["paramount", "paramount theatre", "paramount theater"],
    ),
    ("The Long Center", false, &["long center", "the long center"]),
    ("Zilker Park", false, &["zilker", "zilker park"]),
    (
        "Austin City Limits Music Festival",
        false,
        &["acl", "austin city limits", "acl fest"],
    ),
];

static CATALOG: Lazy<VenueCatalog> = Lazy::new(VenueCatalog::austin);

impl VenueCatalog {
    pub fn new(entries: Vec<VenueEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| VenueEntry {
                aliases: entry
                    .aliases
                    .iter()
                    .map(|alias| alias.trim().to_lowercase())
                    .filter(|alias| !alias.is_empty())
                    .collect(),
                ..entry
            })
            .collect();
        Self { entries }
    }

    pub fn austin() -> Self {
        Self::new(
            AUSTIN_VENUES
                .iter()
                .map(|(name, favorite, aliases)| VenueEntry {
                    name: (*name).to_string(),
                    aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
                    favorite: *favorite,
                })
                .collect(),
        )
    }

    pub fn global() -> &'static VenueCatalog {
        &CATALOG
    }

    /// Matches when the raw name contains an alias or is contained by one.
    pub fn canonicalize(&self, raw: &str) -> String {
        let cleaned = raw.trim().to_lowercase();
        if cleaned.is_empty() {
            return UNKNOWN_VENUE.to_string();
        }

        self.lookup(&cleaned)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| title_case(raw))
    }

    pub fn lookup(&self, cleaned: &str) -> Option<&VenueEntry> {
        self.entries.iter().find(|entry| {
            entry
                .aliases
                .iter()
                .any(|alias| cleaned.contains(alias.as_str()) || alias.contains(cleaned))
        })
    }

    pub fn is_favorite(&self, canonical: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.favorite && entry.name == canonical)
    }

    pub fn favorites(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.favorite)
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

pub fn canonicalize_venue(raw: &str) -> String {
    CATALOG.canonicalize(raw)
}

pub fn is_favorite_venue(canonical: &str) -> bool {
    CATALOG.is_favorite(canonical)
}
