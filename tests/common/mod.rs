#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use jobsmulti::AppError;
use jobsmulti::JobRecord;
use jobsmulti::config::ProviderConfig;
use jobsmulti::providers::Provider;
use jobsmulti::translation::Options;

/// In-memory provider that answers after an optional delay and records the
/// options it was called with.
pub struct FakeProvider {
    id: String,
    outcome: Result<Vec<JobRecord>, String>,
    delay: Duration,
    seen: Mutex<Vec<Options>>,
}

impl FakeProvider {
    pub fn ok(id: &str, jobs: Vec<JobRecord>) -> Self {
        Self {
            id: id.to_string(),
            outcome: Ok(jobs),
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(id: &str, message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            ..Self::ok(id, Vec::new())
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Options> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_jobs(&self, options: &Options) -> Result<Vec<JobRecord>, AppError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.seen.lock().unwrap().push(options.clone());
        self.outcome.clone().map_err(AppError::Provider)
    }
}

/// `count` jobs titled `<prefix>-0..` from `source`, newest first.
pub fn jobs(source: &str, prefix: &str, count: usize) -> Vec<JobRecord> {
    (0..count)
        .map(|i| {
            JobRecord::new(format!("{prefix}-{i}"), source)
                .with_company("Acme")
                .with_date_posted(Utc::now() - TimeDelta::days(i as i64 * 3))
        })
        .collect()
}

pub fn entry(provider: Arc<FakeProvider>) -> (ProviderConfig, Arc<dyn Provider>) {
    let config = ProviderConfig::new(provider.id());
    let client: Arc<dyn Provider> = provider;
    (config, client)
}

pub fn titles(jobs: &[JobRecord]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}
