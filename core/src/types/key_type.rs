use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which field of a source entity a search key was taken from.
///
/// The same text used as a title and as a person's name produces two keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Movie,
    Director,
    Actor,
}

impl KeyType {
    pub const ALL: [KeyType; 3] = [KeyType::Movie, KeyType::Director, KeyType::Actor];

    /// Stable one-byte tag used in storage keys.
    pub const fn tag(self) -> u8 {
        match self {
            KeyType::Movie => 1,
            KeyType::Director => 2,
            KeyType::Actor => 3,
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(KeyType::Movie),
            2 => Some(KeyType::Director),
            3 => Some(KeyType::Actor),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            KeyType::Movie => "movie",
            KeyType::Director => "director",
            KeyType::Actor => "actor",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(KeyType::Movie),
            "director" => Ok(KeyType::Director),
            "actor" => Ok(KeyType::Actor),
            other => Err(format!("unknown key type: {other}")),
        }
    }
}
