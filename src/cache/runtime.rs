//! Declarative runtime caching for third-party resources.
//!
//! The controller never caches cross-origin responses. Hosts that want,
//! say, placeholder images from a CDN available offline declare a
//! [`RuntimeCacheRule`]: a URL pattern, a strategy, and entry/age bounds.
//! [`RuntimeCache`] evaluates those rules for requests the controller
//! passed through; it is not part of the controller's decision tree.
//!
//! Each rule gets its own moka cache with `max_capacity = max_entries`
//! and `time_to_live = max_age`, so bounds are enforced by eviction rather
//! than by scanning.

use std::time::Duration;

use moka::future::Cache;
use regex::{Regex, RegexBuilder};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::telemetry;
use crate::traits::Network;
use crate::types::{Request, RequestKey, Response, ResponseSnapshot, ResponseType};
use crate::{PrecacheError, Result};

/// Default maximum number of entries per runtime cache.
const DEFAULT_MAX_ENTRIES: u64 = 50;

/// Default maximum entry age: 30 days.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// How a runtime rule answers a matching request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum CacheStrategy {
    /// Serve from cache when present, otherwise fetch and store.
    #[default]
    CacheFirst,
}

/// A pattern-matched caching rule for requests outside the controller's
/// origin.
///
/// ```rust
/// # use precache::RuntimeCacheRule;
/// # use std::time::Duration;
/// let rule = RuntimeCacheRule::new(r"^https://placehold\.co/.*", "image-cache")
///     .unwrap()
///     .max_entries(50)
///     .max_age(Duration::from_secs(60 * 60 * 24 * 30));
/// assert!(rule.matches(&"https://placehold.co/600x400".parse().unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeCacheRule {
    url_pattern: Regex,
    cache_name: String,
    strategy: CacheStrategy,
    max_entries: u64,
    max_age: Duration,
}

impl RuntimeCacheRule {
    /// Create a case-insensitive CacheFirst rule with default bounds
    /// (50 entries, 30 days).
    pub fn new(pattern: &str, cache_name: impl Into<String>) -> Result<Self> {
        Self::with_case(pattern, cache_name, true)
    }

    /// Create a rule with explicit case sensitivity.
    pub fn with_case(
        pattern: &str,
        cache_name: impl Into<String>,
        case_insensitive: bool,
    ) -> Result<Self> {
        let url_pattern = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| {
                PrecacheError::Configuration(format!("invalid url pattern '{pattern}': {e}"))
            })?;
        let cache_name = cache_name.into();
        if cache_name.is_empty() {
            return Err(PrecacheError::Configuration(
                "runtime cache name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            url_pattern,
            cache_name,
            strategy: CacheStrategy::default(),
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age: DEFAULT_MAX_AGE,
        })
    }

    pub fn strategy(mut self, strategy: CacheStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    pub fn max_age(mut self, age: Duration) -> Self {
        self.max_age = age;
        self
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn max_entries_limit(&self) -> u64 {
        self.max_entries
    }

    pub fn max_age_limit(&self) -> Duration {
        self.max_age
    }

    /// Whether the rule applies to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        self.url_pattern.is_match(url.as_str())
    }
}

/// Only a readable `200` is stored. Opaque responses hide their real
/// status and are never stored.
fn is_cacheable(response: &Response) -> bool {
    response.status() == StatusCode::OK && response.response_type() != ResponseType::Opaque
}

/// Evaluates [`RuntimeCacheRule`]s, first match wins.
pub struct RuntimeCache {
    rules: Vec<(RuntimeCacheRule, Cache<RequestKey, ResponseSnapshot>)>,
}

impl RuntimeCache {
    pub fn new(rules: Vec<RuntimeCacheRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let cache = Cache::builder()
                    .max_capacity(rule.max_entries)
                    .time_to_live(rule.max_age)
                    .build();
                (rule, cache)
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule matching `request`, if any. Only GETs are eligible.
    pub fn matching_rule(&self, request: &Request) -> Option<&RuntimeCacheRule> {
        self.find(request).map(|(rule, _)| rule)
    }

    fn find(
        &self,
        request: &Request,
    ) -> Option<&(RuntimeCacheRule, Cache<RequestKey, ResponseSnapshot>)> {
        if *request.method() != Method::GET {
            return None;
        }
        self.rules.iter().find(|(rule, _)| rule.matches(request.url()))
    }

    /// Answer `request` through its matching rule.
    ///
    /// Returns `Ok(None)` when no rule applies. Network failures propagate.
    pub async fn handle(
        &self,
        request: &Request,
        network: &dyn Network,
    ) -> Result<Option<Response>> {
        let Some((rule, cache)) = self.find(request) else {
            return Ok(None);
        };
        let cache_name = rule.cache_name.clone();
        let key = request.key();

        match rule.strategy {
            CacheStrategy::CacheFirst => {
                if let Some(snapshot) = cache.get(&key).await {
                    metrics::counter!(telemetry::RUNTIME_CACHE_HITS_TOTAL, "cache" => cache_name)
                        .increment(1);
                    return Ok(Some(snapshot.to_response()));
                }
                metrics::counter!(telemetry::RUNTIME_CACHE_MISSES_TOTAL, "cache" => cache_name)
                    .increment(1);

                let response = network.fetch(request).await?;
                if is_cacheable(&response) {
                    cache.insert(key, response.duplicate().into()).await;
                } else {
                    debug!(
                        cache = %rule.cache_name,
                        status = response.status().as_u16(),
                        "runtime response not cached"
                    );
                }
                Ok(Some(response))
            }
        }
    }

    /// Number of entries held for `cache_name`, after applying pending
    /// evictions.
    pub async fn entry_count(&self, cache_name: &str) -> Option<u64> {
        let (_, cache) = self
            .rules
            .iter()
            .find(|(rule, _)| rule.cache_name == cache_name)?;
        cache.run_pending_tasks().await;
        Some(cache.entry_count())
    }
}
