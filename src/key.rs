//! Key identifiers
//!
//! A [`Key`] is one logical unit of input: either a literal character or one
//! of a small set of named special keys. Hosts usually hand the detector a
//! string (the character inserted by a text field, or the name of a key from
//! a keydown event), which is parsed with [`str::parse`].
//!
//! Every key has a *label*: the character itself, or the special key's name.
//! Labels are what hosts display, and keys order lexicographically by label.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::DetectorError;

/// A single logical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub enum Key {
    /// A literal character
    Char(char),
    Space,
    Enter,
    Tab,
    Backspace,
}

impl Key {
    /// Build a key from a single character, mapping whitespace to its named key.
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Self::Space,
            '\t' => Self::Tab,
            '\n' | '\r' => Self::Enter,
            c => Self::Char(c),
        }
    }

    /// Map a `Char` holding whitespace to its named key
    pub fn normalized(self) -> Self {
        match self {
            Self::Char(c) => Self::from_char(c),
            other => other,
        }
    }

    /// Name of a special key, or `None` for a literal character.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Char(_) => None,
            Self::Space => Some("Space"),
            Self::Enter => Some("Enter"),
            Self::Tab => Some("Tab"),
            Self::Backspace => Some("Backspace"),
        }
    }

    /// Whether this is one of the named special keys
    pub fn is_special(&self) -> bool {
        !matches!(self, Self::Char(_))
    }

    /// Run `f` with this key's label without allocating.
    pub fn with_label<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        match self {
            Self::Char(c) => {
                let mut buf = [0u8; 4];
                f(c.encode_utf8(&mut buf))
            }
            // Every non-`Char` variant has a name
            other => f(other.name().unwrap_or_default()),
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.with_label(|a| other.with_label(|b| a.cmp(b)))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_label(|label| f.write_str(label))
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self::from_char(c)
    }
}

impl FromStr for Key {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(DetectorError::EmptyInput),
            "Space" => Ok(Self::Space),
            "Enter" => Ok(Self::Enter),
            "Tab" => Ok(Self::Tab),
            "Backspace" => Ok(Self::Backspace),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::from_char(c)),
                    _ => Err(DetectorError::InvalidKey(s.to_string())),
                }
            }
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = DetectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_characters_and_named_keys() {
        assert_eq!("a".parse::<Key>(), Ok(Key::Char('a')));
        assert_eq!("ß".parse::<Key>(), Ok(Key::Char('ß')));
        assert_eq!(" ".parse::<Key>(), Ok(Key::Space));
        assert_eq!("\t".parse::<Key>(), Ok(Key::Tab));
        assert_eq!("\n".parse::<Key>(), Ok(Key::Enter));
        assert_eq!("Enter".parse::<Key>(), Ok(Key::Enter));
        assert_eq!("Backspace".parse::<Key>(), Ok(Key::Backspace));
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown() {
        assert_eq!("".parse::<Key>(), Err(DetectorError::EmptyInput));
        assert_eq!(
            "Shift".parse::<Key>(),
            Err(DetectorError::InvalidKey("Shift".to_string()))
        );
        // Named keys are case sensitive
        assert!("enter".parse::<Key>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Key::Char('x').to_string(), "x");
        assert_eq!(Key::Space.to_string(), "Space");
        assert_eq!(Key::from(' '), Key::Space);
        assert!(Key::Tab.is_special());
        assert!(!Key::Char('t').is_special());
    }

    #[test]
    fn test_normalized_maps_whitespace_chars() {
        assert_eq!(Key::Char(' ').normalized(), Key::Space);
        assert_eq!(Key::Char('\t').normalized(), Key::Tab);
        assert_eq!(Key::Char('\r').normalized(), Key::Enter);
        assert_eq!(Key::Char('q').normalized(), Key::Char('q'));
        assert_eq!(Key::Backspace.normalized(), Key::Backspace);
    }

    #[test]
    fn test_ordering_is_lexicographic_by_label() {
        let mut keys = vec![Key::Space, Key::Char('b'), Key::Backspace, Key::Char('A')];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::Char('A'), Key::Backspace, Key::Space, Key::Char('b')],
            "uppercase labels sort before lowercase ones"
        );
    }
}
