use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel accepted in configuration for "respond with any key".
pub const ALL_KEYS: &str = "allkeys";
/// Sentinel accepted in configuration for "no keyboard response".
pub const NO_KEYS: &str = "none";

/// Keyboard key identifier, stored lowercased so `"F"` and `"f"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key(String);

impl Key {
    pub fn new(name: impl AsRef<str>) -> Self {
        Key(name.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::new(name)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::new(name)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keys a participant may respond with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawChoices", into = "RawChoices")]
pub enum KeyChoices {
    #[default]
    AllKeys,
    NoKeys,
    Keys(Vec<Key>),
}

impl KeyChoices {
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        KeyChoices::Keys(keys.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, key: &Key) -> bool {
        match self {
            KeyChoices::AllKeys => true,
            KeyChoices::NoKeys => false,
            KeyChoices::Keys(keys) => keys.contains(key),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, KeyChoices::NoKeys)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawChoices {
    Sentinel(String),
    Keys(Vec<Key>),
}

impl TryFrom<RawChoices> for KeyChoices {
    type Error = String;

    fn try_from(raw: RawChoices) -> Result<Self, Self::Error> {
        match raw {
            RawChoices::Sentinel(s) if s == ALL_KEYS => Ok(KeyChoices::AllKeys),
            RawChoices::Sentinel(s) if s == NO_KEYS => Ok(KeyChoices::NoKeys),
            RawChoices::Sentinel(s) => Err(format!(
                "unknown choices sentinel {s:?}, expected {ALL_KEYS:?}, {NO_KEYS:?} or a list of keys"
            )),
            RawChoices::Keys(keys) => Ok(KeyChoices::Keys(keys)),
        }
    }
}

impl From<KeyChoices> for RawChoices {
    fn from(choices: KeyChoices) -> Self {
        match choices {
            KeyChoices::AllKeys => RawChoices::Sentinel(ALL_KEYS.to_string()),
            KeyChoices::NoKeys => RawChoices::Sentinel(NO_KEYS.to_string()),
            KeyChoices::Keys(keys) => RawChoices::Keys(keys),
        }
    }
}
