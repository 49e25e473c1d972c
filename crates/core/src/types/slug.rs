//! Category slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input starts or ends with a hyphen, or has two in a row.
    #[error("slug hyphens must separate words")]
    MisplacedHyphen,
}

/// A URL-safe category identifier, e.g. `mens-shoes`.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Lowercase ASCII letters, digits, and hyphens only
/// - No leading, trailing, or doubled hyphens
///
/// ## Examples
///
/// ```
/// use bazaar_core::Slug;
///
/// assert!(Slug::parse("electronics").is_ok());
/// assert!(Slug::parse("home-garden").is_ok());
///
/// assert!(Slug::parse("").is_err());
/// assert!(Slug::parse("Home").is_err());
/// assert!(Slug::parse("-home").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains characters
    /// other than lowercase letters, digits, and hyphens, or has a misplaced
    /// hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }

        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::MisplacedHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("a").is_ok());
        assert!(Slug::parse("tv-audio").is_ok());
        assert!(Slug::parse("size-42").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Slug::parse(&"a".repeat(65)),
            Err(SlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(Slug::parse("Shoes"), Err(SlugError::InvalidCharacter('S')));
        assert_eq!(
            Slug::parse("shoes & bags"),
            Err(SlugError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_parse_misplaced_hyphen() {
        assert_eq!(Slug::parse("-shoes"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("shoes-"), Err(SlugError::MisplacedHyphen));
        assert_eq!(Slug::parse("a--b"), Err(SlugError::MisplacedHyphen));
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<Slug>("\"Bad Slug\"").is_err());
        let slug: Slug = serde_json::from_str("\"books\"").unwrap();
        assert_eq!(slug.as_str(), "books");
    }
}
