use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Quota as reported by `gh api rate_limit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuota {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: CoreQuota,
}

#[derive(Debug, Deserialize)]
struct CoreQuota {
    limit: u64,
    remaining: u64,
    reset: i64,
}

impl RateQuota {
    /// Parse the core REST quota out of a rate_limit response body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let response: RateLimitResponse = serde_json::from_str(body)?;
        let core = response.resources.core;

        Ok(Self {
            limit: core.limit,
            remaining: core.remaining,
            reset_at: DateTime::from_timestamp(core.reset, 0),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    remaining: u64,
    threshold: u64,
}

/// Remembers the last quota the remote API reported. No history, no
/// smoothing. It only ever warns; the API itself enforces the limit.
#[derive(Debug, Clone, Default)]
pub struct RateLimitMonitor {
    last: Option<Observation>,
    quota: Option<RateQuota>,
}

impl RateLimitMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, remaining: u64, threshold: u64) {
        self.last = Some(Observation {
            remaining,
            threshold,
        });
    }

    pub fn record_quota(&mut self, quota: RateQuota, threshold: u64) {
        self.record(quota.remaining, threshold);
        self.quota = Some(quota);
    }

    pub fn should_warn(&self) -> bool {
        self.last
            .is_some_and(|observation| observation.remaining <= observation.threshold)
    }

    pub fn remaining(&self) -> Option<u64> {
        self.last.map(|observation| observation.remaining)
    }

    pub fn quota(&self) -> Option<&RateQuota> {
        self.quota.as_ref()
    }
}
