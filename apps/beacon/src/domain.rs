use serde::{Deserialize, Serialize};

/// A featured artist in the curated roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub id: String,
    pub name: String,
    pub alias: String,
    pub bio: String,
    pub key_track: String,
    pub genre: String,
    #[serde(default)]
    pub image_url: String,
    /// Hex accent colour, e.g. `#3B82F6`
    pub color: String,
    #[serde(default)]
    pub detroit_founder: bool,
}

/// One festival or club date for a single legend.
///
/// Serialized with the camelCase field names the web front-end stores, so radar
/// snapshots written by either surface read back in the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticEvent {
    pub id: String,
    pub legend_id: String,
    #[serde(default)]
    pub title: String,
    pub venue: String,
    pub city: String,
    pub country: String,
    /// Zero-padded `YYYY-MM-DD`, compared as a plain string
    pub date: String,
    pub source: String,
    pub ticket_url: String,
}

impl StaticEvent {
    /// Title for display, falling back to `"{legend} live"` for untitled dates.
    pub fn display_title(&self, legend: Option<&Legend>) -> String {
        if self.title.is_empty() {
            format!("{} live", legend.map_or("", |legend| legend.name.as_str()))
        } else {
            self.title.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Date,
    Legend,
}

impl SortMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Legend => "legend",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "legend" => Some(Self::Legend),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Date => "DATE",
            Self::Legend => "LEGEND",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Date => Self::Legend,
            Self::Legend => Self::Date,
        }
    }
}
