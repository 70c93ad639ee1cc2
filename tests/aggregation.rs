mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;

use common::{FakeProvider, entry, jobs, titles};
use jobsmulti::config::ProviderConfig;
use jobsmulti::dispatcher::{ConfiguredProvider, ProviderDispatcher};
use jobsmulti::providers::Provider;
use jobsmulti::translation::{ParameterTranslator, TranslationRegistry};
use jobsmulti::{Aggregator, AppError, JobRecord, Order, SearchCriteria, SearchOptions};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn merges_in_configuration_order_despite_failures_and_completion_order() {
    // Indeed answers last, Juju first; Dice fails.
    let indeed = Arc::new(FakeProvider::ok("Indeed", jobs("Indeed", "a", 2)).delayed(Duration::from_millis(80)));
    let dice = Arc::new(FakeProvider::failing("Dice", "connection reset").delayed(Duration::from_millis(20)));
    let juju = Arc::new(FakeProvider::ok("Juju", jobs("Juju", "c", 3)));

    let aggregator = Aggregator::with_clients(
        vec![entry(indeed), entry(dice), entry(juju)],
        TIMEOUT,
    )
    .unwrap();

    let results = aggregator.all_jobs(&SearchOptions::none()).await.unwrap();

    assert_eq!(results.count(), 5);
    assert_eq!(results.errors().len(), 1);
    assert!(results.errors()[0].contains("connection reset"));
    assert_eq!(titles(results.all()), ["a-0", "a-1", "c-0", "c-1", "c-2"]);
}

#[tokio::test]
async fn dispatch_all_reports_every_provider_keyed_in_order() {
    let aggregator = Aggregator::with_clients(
        vec![
            entry(Arc::new(FakeProvider::ok("Usajobs", jobs("Usajobs", "u", 1)).delayed(Duration::from_millis(30)))),
            entry(Arc::new(FakeProvider::failing("Github", "rate limited"))),
            entry(Arc::new(FakeProvider::ok("Ziprecruiter", Vec::new()))),
        ],
        TIMEOUT,
    )
    .unwrap();

    let outcomes = aggregator.jobs_per_provider().await;
    let ids: Vec<_> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["Usajobs", "Github", "Ziprecruiter"]);

    let (_, github) = &outcomes[1];
    assert_eq!(github.count(), 0);
    assert_eq!(github.errors().len(), 1);

    let (_, zip) = &outcomes[2];
    assert!(zip.is_empty());
    assert!(zip.errors().is_empty());
}

#[tokio::test]
async fn slow_provider_times_out_without_blocking_others() {
    let slow = Arc::new(FakeProvider::ok("Indeed", jobs("Indeed", "slow", 4)).delayed(Duration::from_secs(10)));
    let fast = Arc::new(FakeProvider::ok("Dice", jobs("Dice", "fast", 2)));

    let aggregator =
        Aggregator::with_clients(vec![entry(slow), entry(fast)], Duration::from_millis(50)).unwrap();

    let results = aggregator.all_jobs(&SearchOptions::none()).await.unwrap();
    assert_eq!(titles(results.all()), ["fast-0", "fast-1"]);
    assert_eq!(results.errors().len(), 1);
    assert!(results.errors()[0].contains("timed out"));
}

#[tokio::test]
async fn providers_receive_translated_options_with_static_overrides() {
    let indeed = Arc::new(FakeProvider::ok("Indeed", Vec::new()));
    let dice = Arc::new(FakeProvider::ok("Dice", Vec::new()));

    let mut aggregator = Aggregator::with_clients(
        vec![
            (
                ProviderConfig::new("Indeed").with_option("publisher", "pub-1"),
                indeed.clone() as Arc<dyn Provider>,
            ),
            entry(dice.clone()),
        ],
        TIMEOUT,
    )
    .unwrap();

    aggregator.set_keyword("engineering");
    aggregator.set_location("Chicago, IL").unwrap();
    aggregator.set_page(2, 5).unwrap();
    aggregator.all_jobs(&SearchOptions::none()).await.unwrap();

    assert_eq!(
        json!(indeed.calls()),
        json!([{"q": "engineering", "l": "Chicago, IL", "limit": 5, "start": 5, "publisher": "pub-1"}])
    );
    assert_eq!(
        json!(dice.calls()),
        json!([{"text": "engineering", "city": "Chicago", "state": "IL", "page": 2, "pgcnt": 5}])
    );
}

#[tokio::test]
async fn invalid_location_is_rejected_before_any_fetch() {
    let indeed = Arc::new(FakeProvider::ok("Indeed", Vec::new()));
    let mut aggregator = Aggregator::with_clients(vec![entry(indeed.clone())], TIMEOUT).unwrap();

    let err = aggregator.set_location("Chicago").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(aggregator.criteria().location(), None);
    assert!(indeed.calls().is_empty());
}

#[test]
fn unregistered_provider_fails_construction() {
    let result = Aggregator::with_clients(
        vec![entry(Arc::new(FakeProvider::ok("Monster", Vec::new())))],
        TIMEOUT,
    );
    assert!(matches!(result, Err(AppError::UnknownProvider(id)) if id == "Monster"));
}

#[tokio::test]
async fn unknown_provider_lookup_becomes_an_error_entry() {
    let aggregator = Aggregator::with_clients(
        vec![entry(Arc::new(FakeProvider::ok("Indeed", jobs("Indeed", "a", 1))))],
        TIMEOUT,
    )
    .unwrap();

    let results = aggregator.jobs_by_provider("Careercast").await;
    assert_eq!(results.count(), 0);
    assert_eq!(results.errors(), ["Unknown provider: Careercast"]);

    let found = aggregator.jobs_by_provider("Indeed").await;
    assert_eq!(found.count(), 1);
}

#[tokio::test]
async fn dispatcher_isolates_translation_failures() {
    // Registry without an entry for the configured provider.
    let dispatcher = ProviderDispatcher::new(
        ParameterTranslator::new(Arc::new(TranslationRegistry::empty())),
        TIMEOUT,
    );
    let provider = Arc::new(FakeProvider::ok("Indeed", jobs("Indeed", "a", 2)));
    let configured = ConfiguredProvider::new(ProviderConfig::new("Indeed"), provider.clone());

    let results = dispatcher.dispatch(&configured, &SearchCriteria::new()).await;
    assert_eq!(results.count(), 0);
    assert_eq!(results.errors(), ["Unknown provider: Indeed"]);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn search_options_filter_order_and_truncate() {
    let now = Utc::now();
    let dated = |title: &str, days: i64| {
        JobRecord::new(title, "Indeed").with_date_posted(now - TimeDelta::days(days))
    };

    let indeed = Arc::new(FakeProvider::ok(
        "Indeed",
        vec![dated("ten", 10), dated("one", 1), dated("forty", 40)],
    ));
    let juju = Arc::new(FakeProvider::ok(
        "Juju",
        vec![dated("three", 3), JobRecord::new("undated", "Juju"), dated("five", 5)],
    ));
    let aggregator = Aggregator::with_clients(vec![entry(indeed), entry(juju)], TIMEOUT).unwrap();

    let options = SearchOptions {
        max_age: Some(7),
        max_results: Some(2),
        ..SearchOptions::default()
    };
    let results = aggregator.all_jobs(&options).await.unwrap();
    assert_eq!(titles(results.all()), ["one", "three"]);

    let oldest_first = SearchOptions {
        order: Order::Asc,
        ..SearchOptions::default()
    };
    let results = aggregator.all_jobs(&oldest_first).await.unwrap();
    assert_eq!(
        titles(results.all()),
        ["undated", "forty", "ten", "five", "three", "one"]
    );
}

#[tokio::test]
async fn ordering_by_an_undefined_field_fails_the_search() {
    let aggregator = Aggregator::with_clients(
        vec![entry(Arc::new(FakeProvider::ok("Indeed", jobs("Indeed", "a", 2))))],
        TIMEOUT,
    )
    .unwrap();

    let options = SearchOptions {
        order_by: Some("salary".to_string()),
        ..SearchOptions::default()
    };
    let err = aggregator.all_jobs(&options).await.unwrap_err();
    assert!(matches!(err, AppError::FieldNotDefined(f) if f == "salary"));
}

#[tokio::test]
async fn out_of_range_max_age_is_rejected() {
    let aggregator = Aggregator::with_clients(
        vec![entry(Arc::new(FakeProvider::ok("Indeed", jobs("Indeed", "a", 2))))],
        TIMEOUT,
    )
    .unwrap();

    let options = SearchOptions {
        max_age: Some(100_000_000),
        ..SearchOptions::default()
    };
    let err = aggregator.all_jobs(&options).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(m) if m.contains("max_age")));
}
