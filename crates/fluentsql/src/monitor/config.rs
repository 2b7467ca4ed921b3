use std::time::Duration;

/// Default number of SQL bytes kept in log lines.
pub const DEFAULT_MAX_SQL_LENGTH: usize = 200;

/// Configuration for query monitoring.
///
/// By default, monitoring is disabled and must be explicitly enabled.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Slow query threshold for warnings.
    pub slow_query_threshold: Option<Duration>,
    /// SQL longer than this is truncated in log output.
    pub max_sql_length: usize,
    /// Whether monitoring is enabled.
    pub enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold: None,
            max_sql_length: DEFAULT_MAX_SQL_LENGTH,
            enabled: false,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with defaults (monitoring disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slow query threshold.
    ///
    /// Executions exceeding this duration emit a warning and trigger
    /// `on_slow_query` callbacks.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = len;
        self
    }

    /// Enable monitoring.
    ///
    /// Monitoring must be explicitly enabled for monitors to receive events.
    pub fn enable_monitoring(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Disable monitoring.
    pub fn disable_monitoring(mut self) -> Self {
        self.enabled = false;
        self
    }
}
