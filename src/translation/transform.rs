use std::fmt;

use serde_json::Value;

use super::Options;
use crate::error::AppError;
use crate::models::criteria::SearchCriteria;

/// Registered criteria transforms.
///
/// Textual forms used in dialect configuration:
/// `splitCityState`, `facetCityState`, `keywordLocationQuery[(key)]`,
/// `pageToZeroBasedOffset[(key)]`, `pageToStartFrom(perPageKey, startKey)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// `{city, state}` from the location.
    SplitCityState,
    /// `{UseFacets: "true", FacetCityState: location}`.
    FacetCityState,
    /// Keyword and location folded into one free-text query.
    KeywordLocationQuery { key: String },
    /// One-based page turned zero-based.
    PageToZeroBasedOffset { key: String },
    /// Page/per-page turned into limit/offset.
    PageToStartFrom {
        per_page_key: String,
        start_key: String,
    },
}

impl Transform {
    pub fn from_name(name: &str) -> Result<Self, AppError> {
        let (base, args) = split_call(name)?;
        let unknown = || AppError::UnknownTransform(name.trim().to_string());

        match (base, args.as_slice()) {
            ("splitCityState", []) => Ok(Transform::SplitCityState),
            ("facetCityState", []) => Ok(Transform::FacetCityState),
            ("keywordLocationQuery", []) => Ok(Transform::KeywordLocationQuery {
                key: "query".to_string(),
            }),
            ("keywordLocationQuery", [key]) => Ok(Transform::KeywordLocationQuery {
                key: key.to_string(),
            }),
            ("pageToZeroBasedOffset", []) => Ok(Transform::PageToZeroBasedOffset {
                key: "page".to_string(),
            }),
            ("pageToZeroBasedOffset", [key]) => Ok(Transform::PageToZeroBasedOffset {
                key: key.to_string(),
            }),
            ("pageToStartFrom", [per_page_key, start_key]) => Ok(Transform::PageToStartFrom {
                per_page_key: per_page_key.to_string(),
                start_key: start_key.to_string(),
            }),
            _ => Err(unknown()),
        }
    }

    pub fn apply(&self, criteria: &SearchCriteria) -> Options {
        let mut out = Options::new();
        match self {
            Transform::SplitCityState => {
                if let Some(location) = criteria.location() {
                    out.insert("city".into(), location.city().into());
                    out.insert("state".into(), location.state().into());
                }
            }
            Transform::FacetCityState => {
                if let Some(location) = criteria.location() {
                    out.insert("UseFacets".into(), "true".into());
                    out.insert("FacetCityState".into(), location.as_str().into());
                }
            }
            Transform::KeywordLocationQuery { key } => {
                let query = match (criteria.keyword(), criteria.location()) {
                    (Some(keyword), Some(location)) => Some(format!("{keyword} in {location}")),
                    (Some(keyword), None) => Some(keyword.to_string()),
                    (None, Some(location)) => Some(location.to_string()),
                    (None, None) => None,
                };
                if let Some(query) = query {
                    out.insert(key.clone(), Value::String(query));
                }
            }
            Transform::PageToZeroBasedOffset { key } => {
                out.insert(key.clone(), (criteria.page() - 1).into());
            }
            Transform::PageToStartFrom {
                per_page_key,
                start_key,
            } => {
                out.insert(per_page_key.clone(), criteria.per_page().into());
                out.insert(
                    start_key.clone(),
                    start_from(criteria.page(), criteria.per_page()).into(),
                );
            }
        }
        out
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::SplitCityState => f.write_str("splitCityState"),
            Transform::FacetCityState => f.write_str("facetCityState"),
            Transform::KeywordLocationQuery { key } => write!(f, "keywordLocationQuery({key})"),
            Transform::PageToZeroBasedOffset { key } => write!(f, "pageToZeroBasedOffset({key})"),
            Transform::PageToStartFrom {
                per_page_key,
                start_key,
            } => write!(f, "pageToStartFrom({per_page_key}, {start_key})"),
        }
    }
}

/// Zero-based record offset of the first item on `page`.
pub fn start_from(page: u32, per_page: u32) -> u64 {
    u64::from(page) * u64::from(per_page) - u64::from(per_page)
}

/// Split `name(a, b)` into `("name", ["a", "b"])`.
fn split_call(input: &str) -> Result<(&str, Vec<&str>), AppError> {
    let input = input.trim();
    let Some(open) = input.find('(') else {
        return Ok((input, Vec::new()));
    };
    let inner = input[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| AppError::UnknownTransform(input.to_string()))?;
    let args = inner
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();
    Ok((input[..open].trim(), args))
}
