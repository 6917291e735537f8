use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Color used for entries whose mood has no dedicated swatch.
pub const DEFAULT_MOOD_COLOR: &str = "#D5D8DC";

/// A mood symbol as picked in the day dialog.
///
/// Five symbols are recognized. Anything else is kept verbatim in `Other` so
/// that it survives a read/write cycle; it renders with the default color and
/// heat-map intensity 0, the same as a day without an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
    Angry,
    Tired,
    Other(String),
}

impl Mood {
    pub const KNOWN: [Mood; 5] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Angry,
        Mood::Tired,
    ];

    pub fn parse(symbol: &str) -> Self {
        match symbol {
            "😊" => Mood::Happy,
            "😐" => Mood::Neutral,
            "😔" => Mood::Sad,
            "😡" => Mood::Angry,
            "😴" => Mood::Tired,
            other => Mood::Other(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Mood::Happy => "😊",
            Mood::Neutral => "😐",
            Mood::Sad => "😔",
            Mood::Angry => "😡",
            Mood::Tired => "😴",
            Mood::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Mood::Other(_))
    }

    /// Heat-map bucket, 0..=4. Unknown moods land in 0 with empty days.
    pub fn intensity(&self) -> u8 {
        match self {
            Mood::Happy => 4,
            Mood::Neutral => 2,
            Mood::Sad => 1,
            Mood::Angry => 3,
            Mood::Tired => 2,
            Mood::Other(_) => 0,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Mood::Happy => "#A3E4D7",
            Mood::Neutral => "#F9E79F",
            Mood::Sad => "#F5B7B1",
            _ => DEFAULT_MOOD_COLOR,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<&str> for Mood {
    fn from(symbol: &str) -> Self {
        Mood::parse(symbol)
    }
}

impl Serialize for Mood {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Mood {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Mood::parse(&raw))
    }
}
