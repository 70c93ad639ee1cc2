use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::job::{JobRecord, STANDARD_FIELDS};
use crate::providers::Provider;
use crate::translation::Options;

const USER_AGENT: &str = concat!("jobsmulti/", env!("CARGO_PKG_VERSION"));

/// Where each standard job field lives in a provider's item objects.
/// Entries are plain keys, or JSON pointers when they start with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMap {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_posted: String,
    pub url: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            company: "company".to_string(),
            location: "location".to_string(),
            date_posted: "datePosted".to_string(),
            url: "url".to_string(),
        }
    }
}

impl FieldMap {
    fn paths(&self) -> [&str; 5] {
        [
            self.title.as_str(),
            self.company.as_str(),
            self.location.as_str(),
            self.date_posted.as_str(),
            self.url.as_str(),
        ]
    }
}

/// Provider that sends options as a GET query string and reads a JSON
/// array of jobs from the response.
#[derive(Debug, Clone)]
pub struct HttpJsonProvider {
    id: String,
    endpoint: String,
    items: String,
    fields: FieldMap,
    client: reqwest::Client,
}

impl HttpJsonProvider {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            id: id.into(),
            endpoint: endpoint.into(),
            items: String::new(),
            fields: FieldMap::default(),
            client,
        })
    }

    /// JSON pointer to the item array; empty means the response root.
    pub fn with_items_pointer(mut self, items: impl Into<String>) -> Self {
        self.items = items.into();
        self
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    fn parse_results(&self, data: &Value) -> Result<Vec<JobRecord>, AppError> {
        let results = data
            .pointer(&self.items)
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                AppError::Provider(format!(
                    "{}: missing item array at '{}' in response",
                    self.id, self.items
                ))
            })?;

        let mut jobs = Vec::with_capacity(results.len());
        for raw in results {
            match self.parse_job(raw) {
                Some(job) => jobs.push(job),
                None => tracing::debug!("Skipping {} item without a title", self.id),
            }
        }
        Ok(jobs)
    }

    fn parse_job(&self, raw: &Value) -> Option<JobRecord> {
        let obj = raw.as_object()?;
        let title = lookup(raw, &self.fields.title).and_then(as_text)?;

        let mut job = JobRecord::new(title, self.id.clone());
        job.company = lookup(raw, &self.fields.company).and_then(as_text);
        job.location = lookup(raw, &self.fields.location).and_then(as_text);
        job.url = lookup(raw, &self.fields.url).and_then(as_text);
        job.date_posted = lookup(raw, &self.fields.date_posted).and_then(parse_date);
        job.extra = extra_fields(obj, &self.fields);
        Some(job)
    }
}

#[async_trait]
impl Provider for HttpJsonProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_jobs(&self, options: &Options) -> Result<Vec<JobRecord>, AppError> {
        let query: Vec<(&str, String)> = options
            .iter()
            .map(|(k, v)| (k.as_str(), query_value(v)))
            .collect();

        let resp = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("{} request failed: {e}", self.id)))?;

        if !resp.status().is_success() {
            return Err(AppError::Provider(format!(
                "{} returned {}",
                self.id,
                resp.status()
            )));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("{}: failed to parse response: {e}", self.id)))?;

        self.parse_results(&data)
    }
}

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    if path.starts_with('/') {
        raw.pointer(path)
    } else {
        raw.get(path)
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts RFC 3339, plain `YYYY-MM-DD`, or unix seconds.
fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

/// Top-level item keys not consumed by the field map and not shadowing a
/// standard field.
fn extra_fields(obj: &Map<String, Value>, fields: &FieldMap) -> Map<String, Value> {
    let consumed = fields.paths();
    obj.iter()
        .filter(|(k, _)| !consumed.contains(&k.as_str()) && !STANDARD_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn provider() -> HttpJsonProvider {
        HttpJsonProvider::new("Indeed", "http://localhost")
            .unwrap()
            .with_items_pointer("/results")
            .with_fields(FieldMap {
                title: "jobtitle".to_string(),
                company: "/employer/name".to_string(),
                date_posted: "date".to_string(),
                ..FieldMap::default()
            })
    }

    #[test]
    fn maps_configured_fields() {
        let data = json!({"results": [{
            "jobtitle": "Nurse",
            "employer": {"name": "County Hospital"},
            "location": "Chicago, IL",
            "date": "2024-05-01",
            "url": "https://example.test/1",
            "salary": 61000
        }]});

        let jobs = provider().parse_results(&data).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.title, "Nurse");
        assert_eq!(job.company.as_deref(), Some("County Hospital"));
        assert_eq!(job.source, "Indeed");
        assert_eq!(job.field("datePosted").unwrap(), json!("2024-05-01T00:00:00Z"));
        assert_eq!(job.extra.get("salary"), Some(&json!(61000)));
        assert!(!job.extra.contains_key("jobtitle"));
        assert!(job.extra.contains_key("employer"));
    }

    #[test]
    fn skips_items_without_title() {
        let data = json!({"results": [{"jobtitle": "Nurse"}, {"location": "x"}, "junk"]});
        assert_eq!(provider().parse_results(&data).unwrap().len(), 1);
    }

    #[test]
    fn missing_item_array_is_a_provider_error() {
        let err = provider().parse_results(&json!({"jobs": []})).unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }

    #[test]
    fn dates_accept_several_shapes() {
        assert!(parse_date(&json!("2024-05-01T10:00:00+02:00")).is_some());
        assert!(parse_date(&json!(1714557600)).is_some());
        assert!(parse_date(&json!("last tuesday")).is_none());
    }

    #[test]
    fn query_values_are_rendered_as_text() {
        assert_eq!(query_value(&json!("a b")), "a b");
        assert_eq!(query_value(&json!(20)), "20");
        assert_eq!(query_value(&json!(true)), "true");
    }
}
