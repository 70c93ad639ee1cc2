use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::transform::Transform;
use crate::error::AppError;

/// Bumped whenever a built-in dialect changes shape.
pub const REGISTRY_VERSION: u32 = 1;

/// Provider-agnostic search concepts a dialect can map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Concept {
    Keyword,
    Location,
    Page,
    PerPage,
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Concept::Keyword => "keyword",
            Concept::Location => "location",
            Concept::Page => "page",
            Concept::PerPage => "perPage",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationRule {
    /// Copy the concept's value under another key.
    Rename(String),
    Transform(Transform),
}

/// Unresolved rule as written in configuration: `{"rename": "q"}` or
/// `{"transform": "pageToStartFrom(limit, start)"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleSpec {
    Rename(String),
    Transform(String),
}

impl RuleSpec {
    pub fn resolve(&self) -> Result<TranslationRule, AppError> {
        match self {
            RuleSpec::Rename(key) => Ok(TranslationRule::Rename(key.clone())),
            RuleSpec::Transform(name) => Transform::from_name(name).map(TranslationRule::Transform),
        }
    }
}

impl From<&TranslationRule> for RuleSpec {
    fn from(rule: &TranslationRule) -> Self {
        match rule {
            TranslationRule::Rename(key) => RuleSpec::Rename(key.clone()),
            TranslationRule::Transform(t) => RuleSpec::Transform(t.to_string()),
        }
    }
}

pub type DialectSpec = BTreeMap<Concept, RuleSpec>;

/// One provider's parameter vocabulary. Concepts without a rule are not
/// sent to that provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialect {
    rules: BTreeMap<Concept, TranslationRule>,
}

impl Dialect {
    pub fn from_spec(spec: &DialectSpec) -> Result<Self, AppError> {
        let rules = spec
            .iter()
            .map(|(concept, rule)| Ok((*concept, rule.resolve()?)))
            .collect::<Result<_, AppError>>()?;
        Ok(Self { rules })
    }

    pub fn rule(&self, concept: Concept) -> Option<&TranslationRule> {
        self.rules.get(&concept)
    }

    pub fn rules(&self) -> impl Iterator<Item = (Concept, &TranslationRule)> {
        self.rules.iter().map(|(c, r)| (*c, r))
    }

    pub fn to_spec(&self) -> DialectSpec {
        self.rules.iter().map(|(c, r)| (*c, r.into())).collect()
    }
}

enum Builtin {
    Rename(&'static str),
    Transform(&'static str),
}

type BuiltinDialect = (&'static str, &'static [(Concept, Builtin)]);

const BUILTIN_DIALECTS: &[BuiltinDialect] = &[
    (
        "Careerbuilder",
        &[
            (Concept::Keyword, Builtin::Rename("Keywords")),
            (Concept::Location, Builtin::Transform("facetCityState")),
            (Concept::Page, Builtin::Rename("PageNumber")),
            (Concept::PerPage, Builtin::Rename("PerPage")),
        ],
    ),
    (
        "Careercast",
        &[
            (Concept::Keyword, Builtin::Rename("keyword")),
            (Concept::Location, Builtin::Rename("location")),
            (Concept::Page, Builtin::Rename("page")),
            (Concept::PerPage, Builtin::Rename("rows")),
        ],
    ),
    (
        "Dice",
        &[
            (Concept::Keyword, Builtin::Rename("text")),
            (Concept::Location, Builtin::Transform("splitCityState")),
            (Concept::Page, Builtin::Rename("page")),
            (Concept::PerPage, Builtin::Rename("pgcnt")),
        ],
    ),
    (
        "Github",
        &[
            (Concept::Keyword, Builtin::Rename("search")),
            (Concept::Location, Builtin::Rename("location")),
            (Concept::Page, Builtin::Transform("pageToZeroBasedOffset(page)")),
        ],
    ),
    (
        "Govt",
        &[
            (Concept::Keyword, Builtin::Transform("keywordLocationQuery(query)")),
            (Concept::Page, Builtin::Transform("pageToStartFrom(size, from)")),
        ],
    ),
    (
        "Indeed",
        &[
            (Concept::Keyword, Builtin::Rename("q")),
            (Concept::Location, Builtin::Rename("l")),
            (Concept::Page, Builtin::Transform("pageToStartFrom(limit, start)")),
        ],
    ),
    (
        "Juju",
        &[
            (Concept::Keyword, Builtin::Rename("k")),
            (Concept::Location, Builtin::Rename("l")),
            (Concept::Page, Builtin::Rename("page")),
            (Concept::PerPage, Builtin::Rename("jpp")),
        ],
    ),
    (
        "Usajobs",
        &[
            (Concept::Keyword, Builtin::Rename("Keyword")),
            (Concept::Location, Builtin::Rename("LocationName")),
            (Concept::Page, Builtin::Rename("Page")),
            (Concept::PerPage, Builtin::Rename("ResultsPerPage")),
        ],
    ),
    (
        "Ziprecruiter",
        &[
            (Concept::Keyword, Builtin::Rename("search")),
            (Concept::Location, Builtin::Rename("location")),
            (Concept::Page, Builtin::Rename("page")),
            (Concept::PerPage, Builtin::Rename("jobs_per_page")),
        ],
    ),
];

/// Provider id to dialect table. Read-only once built; share it behind an
/// `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TranslationRegistry {
    dialects: BTreeMap<String, Dialect>,
}

impl TranslationRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in provider dialect.
    pub fn builtin() -> Result<Self, AppError> {
        let mut registry = Self::empty();
        for (provider, table) in BUILTIN_DIALECTS {
            let spec: DialectSpec = table
                .iter()
                .map(|(concept, rule)| {
                    let rule = match rule {
                        Builtin::Rename(key) => RuleSpec::Rename((*key).to_string()),
                        Builtin::Transform(name) => RuleSpec::Transform((*name).to_string()),
                    };
                    (*concept, rule)
                })
                .collect();
            registry.register_spec(*provider, &spec)?;
        }
        Ok(registry)
    }

    /// Add or replace a provider's dialect.
    pub fn register(&mut self, provider_id: impl Into<String>, dialect: Dialect) -> &mut Self {
        let provider_id = provider_id.into();
        if self.dialects.insert(provider_id.clone(), dialect).is_some() {
            tracing::debug!("Replaced dialect for provider '{provider_id}'");
        }
        self
    }

    /// Resolve a configured dialect, failing on unknown transform names.
    pub fn register_spec(
        &mut self,
        provider_id: impl Into<String>,
        spec: &DialectSpec,
    ) -> Result<&mut Self, AppError> {
        let dialect = Dialect::from_spec(spec)?;
        Ok(self.register(provider_id, dialect))
    }

    pub fn rules(&self, provider_id: &str) -> Result<&Dialect, AppError> {
        self.dialects
            .get(provider_id)
            .ok_or_else(|| AppError::UnknownProvider(provider_id.to_string()))
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.dialects.contains_key(provider_id)
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }

    pub fn version(&self) -> u32 {
        REGISTRY_VERSION
    }
}
