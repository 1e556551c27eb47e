use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Bulk lookup endpoint of a locally running portal.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/programas-bulk";

/// Where users are sent to search for a programa by hand.
pub const DEFAULT_MANUAL_SEARCH_URL: &str = "https://huayca.crub.uncoma.edu.ar/programas/";

/// Settle time before the automatic first lookup.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do with a response whose run has been superseded by a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply every response as it arrives; the last one to arrive wins.
    Apply,
    /// Apply a response only if its run is still the latest one issued.
    #[default]
    Discard,
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apply" => Ok(StalePolicy::Apply),
            "discard" => Ok(StalePolicy::Discard),
            other => Err(format!("unknown stale policy '{}' (expected apply|discard)", other)),
        }
    }
}

impl fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StalePolicy::Apply => f.write_str("apply"),
            StalePolicy::Discard => f.write_str("discard"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub endpoint: String,
    pub manual_search_url: String,
    pub initial_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub stale_policy: StalePolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            manual_search_url: DEFAULT_MANUAL_SEARCH_URL.to_string(),
            initial_delay: DEFAULT_INITIAL_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl ResolverConfig {
    pub fn builder(endpoint: impl Into<String>) -> ResolverConfigBuilder {
        ResolverConfigBuilder::new(endpoint)
    }
}

pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            config: ResolverConfig {
                endpoint: endpoint.into(),
                ..ResolverConfig::default()
            },
        }
    }

    pub fn with_manual_search_url(mut self, url: impl Into<String>) -> Self {
        self.config.manual_search_url = url.into();
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.config.stale_policy = policy;
        self
    }

    pub fn build(self) -> ResolverConfig {
        self.config
    }
}
