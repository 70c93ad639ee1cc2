use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::AppError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

/// "City, ST": free text, a comma, then a two-letter region code.
static LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^,]*[^,\s])\s*,\s*([A-Za-z]{2})\s*$").expect("location pattern compiles")
});

/// A validated "City, ST" location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    text: String,
    city: String,
    state: String,
}

impl Location {
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let caps = LOCATION_PATTERN.captures(input).ok_or_else(|| {
            AppError::Validation(format!(
                "Location '{input}' must follow the pattern 'City, ST'"
            ))
        })?;

        let city = caps[1].to_string();
        let state = caps[2].to_string();
        Ok(Self {
            text: format!("{city}, {state}"),
            city,
            state,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Provider-agnostic search intent.
///
/// Values are only produced through the validating `with_*` methods, each of
/// which returns a new criteria rather than mutating the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    keyword: Option<String>,
    location: Option<Location>,
    page: u32,
    per_page: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            keyword: None,
            location: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank keywords clear the keyword.
    pub fn with_keyword(self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let trimmed = keyword.trim();
        Self {
            keyword: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..self
        }
    }

    pub fn with_location(self, location: &str) -> Result<Self, AppError> {
        Ok(Self {
            location: Some(Location::parse(location)?),
            ..self
        })
    }

    pub fn with_page(self, page: u32, per_page: u32) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if per_page == 0 {
            return Err(AppError::Validation(
                "per_page must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            page,
            per_page,
            ..self
        })
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }
}
