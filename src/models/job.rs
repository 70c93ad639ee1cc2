use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Field names every record answers to, in addition to its extra fields.
pub const STANDARD_FIELDS: [&str; 6] = ["title", "company", "location", "datePosted", "url", "source"];

/// One job posting as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub source: String,
    /// Provider-specific fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobRecord {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: None,
            location: None,
            date_posted: None,
            url: None,
            source: source.into(),
            extra: Map::new(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date_posted(mut self, date_posted: DateTime<Utc>) -> Self {
        self.date_posted = Some(date_posted);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name.
    ///
    /// Standard fields are always defined (unset ones read as `null`); extra
    /// fields are defined only when the provider supplied them. Dates are
    /// rendered as RFC 3339 UTC strings so they order chronologically.
    pub fn field(&self, name: &str) -> Result<Value, AppError> {
        let value = match name {
            "title" => Value::String(self.title.clone()),
            "company" => opt_string(&self.company),
            "location" => opt_string(&self.location),
            "datePosted" => self
                .date_posted
                .map(|d| Value::String(format_date(d)))
                .unwrap_or(Value::Null),
            "url" => opt_string(&self.url),
            "source" => Value::String(self.source.clone()),
            other => self
                .extra
                .get(other)
                .cloned()
                .ok_or_else(|| AppError::FieldNotDefined(other.to_string()))?,
        };
        Ok(value)
    }
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}
