use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::providers::FieldMap;
use crate::translation::{DialectSpec, Options, TranslationRegistry};

#[derive(Parser, Debug, Clone)]
#[command(name = "jobsmulti", about = "Federated job search across job-board APIs")]
pub struct Config {
    /// Provider configuration file (JSON)
    #[arg(long, env = "JOBSMULTI_PROVIDERS", default_value = "providers.json")]
    pub providers: PathBuf,

    /// Per-provider fetch timeout in seconds
    #[arg(long, env = "JOBSMULTI_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP API (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
    /// Run one search and print the merged results as JSON
    Search(SearchArgs),
    /// List configured providers and their parameter dialects
    Providers,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long)]
    pub keyword: Option<String>,

    /// Location in "City, ST" form
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long, default_value = "1")]
    pub page: u32,

    #[arg(long, default_value = "10")]
    pub per_page: u32,

    /// Query a single provider instead of all of them
    #[arg(long)]
    pub provider: Option<String>,

    /// Drop jobs posted more than this many days ago
    #[arg(long)]
    pub max_age: Option<u32>,

    /// Keep at most this many jobs
    #[arg(long)]
    pub max_results: Option<usize>,

    #[arg(long, default_value = "datePosted")]
    pub order_by: String,

    #[arg(long, default_value = "desc")]
    pub order: String,
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}

/// One configured provider: its registry id, static options such as API
/// keys, how to reach it, and optionally its own parameter dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// JSON pointer to the job array in responses
    #[serde(default)]
    pub items: Option<String>,
    #[serde(default)]
    pub fields: FieldMap,
    /// Overrides or adds the provider's entry in the translation registry
    #[serde(default)]
    pub dialect: Option<DialectSpec>,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Options::new(),
            endpoint: None,
            items: None,
            fields: FieldMap::default(),
            dialect: None,
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Contents of the provider configuration file. Provider order in the file
/// is the order results are merged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvidersFile {
    pub providers: Vec<ProviderConfig>,
}

impl ProvidersFile {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let file: Self = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Invalid provider configuration: {e}")))?;

        let mut seen = HashSet::new();
        for provider in &file.providers {
            if !seen.insert(provider.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Provider '{}' is configured more than once",
                    provider.id
                )));
            }
        }
        Ok(file)
    }

    /// Built-in dialects plus any dialects declared in the file.
    pub fn registry(&self) -> Result<TranslationRegistry, AppError> {
        let mut registry = TranslationRegistry::builtin()?;
        for provider in &self.providers {
            if let Some(spec) = &provider.dialect {
                registry.register_spec(provider.id.clone(), spec)?;
            }
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::translation::{Concept, TranslationRule};

    const SAMPLE: &str = r#"{
        "providers": [
            {"id": "Indeed", "options": {"publisher": "abc"}, "endpoint": "https://indeed.test/ads", "items": "/results"},
            {"id": "Remotive", "endpoint": "https://remotive.test/api",
             "fields": {"company": "company_name"},
             "dialect": {"keyword": {"rename": "search"}, "perPage": {"rename": "limit"}}}
        ]
    }"#;

    #[test]
    fn parses_providers_in_file_order() {
        let file = ProvidersFile::from_json(SAMPLE).unwrap();
        let ids: Vec<_> = file.providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["Indeed", "Remotive"]);
        assert_eq!(file.providers[0].options["publisher"], json!("abc"));
        assert_eq!(file.providers[1].fields.company, "company_name");
        assert_eq!(file.providers[1].fields.title, "title");
    }

    #[test]
    fn custom_dialects_extend_the_builtin_registry() {
        let registry = ProvidersFile::from_json(SAMPLE).unwrap().registry().unwrap();
        assert!(registry.contains("Indeed"));
        assert_eq!(
            registry.rules("Remotive").unwrap().rule(Concept::PerPage),
            Some(&TranslationRule::Rename("limit".to_string()))
        );
    }

    #[test]
    fn duplicate_provider_ids_are_rejected() {
        let raw = r#"{"providers": [{"id": "Dice"}, {"id": "Dice"}]}"#;
        assert!(matches!(ProvidersFile::from_json(raw), Err(AppError::Config(_))));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        assert!(matches!(
            ProvidersFile::from_json("{\"providers\": 3}"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn cli_parses_search_arguments() {
        let config = Config::try_parse_from([
            "jobsmulti",
            "--providers",
            "p.json",
            "search",
            "--keyword",
            "welder",
            "--location",
            "Tulsa, OK",
            "--max-results",
            "5",
        ])
        .unwrap();

        let Command::Search(args) = config.resolved_command() else {
            panic!("expected search command");
        };
        assert_eq!(args.keyword.as_deref(), Some("welder"));
        assert_eq!(args.max_results, Some(5));
        assert_eq!(args.order, "desc");
        assert_eq!(args.per_page, 10);
    }
}
