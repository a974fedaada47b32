//! Client configuration

use std::time::Duration;

/// HTTP tuning for the backend client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("swiftgate/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 32,
        }
    }
}

impl ClientConfig {
    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
