use super::config::MonitorConfig;
use super::monitors::NoopMonitor;
use super::truncate_sql;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::client::{Execution, GenericClient};
use crate::error::FluentResult;
use crate::params::Parameters;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A client that wraps a `GenericClient` with timing and monitoring.
///
/// Monitoring must be explicitly enabled via `MonitorConfig::enable_monitoring()`.
pub struct InstrumentedClient<C> {
    client: C,
    monitor: Arc<dyn QueryMonitor>,
    config: MonitorConfig,
}

impl<C: GenericClient> InstrumentedClient<C> {
    /// Create a new instrumented client with no monitoring.
    pub fn new(client: C) -> Self {
        Self {
            client,
            monitor: Arc::new(NoopMonitor),
            config: MonitorConfig::default(),
        }
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the query monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    /// Set the query monitor from an Arc.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Enable monitoring.
    pub fn enable_monitoring(mut self) -> Self {
        self.config.enabled = true;
        self
    }

    /// Check if monitoring is enabled.
    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Get the inner client, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn report_result(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if !self.config.enabled {
            return;
        }

        self.monitor.on_query_complete(ctx, duration, result);

        if let Some(threshold) = self.config.slow_query_threshold {
            if duration > threshold {
                tracing::warn!(
                    target: "fluentsql.sql",
                    query_type = ?ctx.query_type,
                    duration_ms = duration.as_secs_f64() * 1000.0,
                    threshold_ms = threshold.as_secs_f64() * 1000.0,
                    sql = %truncate_sql(&ctx.sql, self.config.max_sql_length),
                    "slow query"
                );
                self.monitor.on_slow_query(ctx, duration);
            }
        }
    }

    fn execute_inner(
        &self,
        sql: &str,
        params: &Parameters,
        tag: Option<&str>,
    ) -> FluentResult<Execution> {
        let mut ctx = QueryContext::new(sql, params.len());
        if let Some(tag) = tag {
            ctx.tag = Some(tag.to_string());
        }

        if self.config.enabled {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let result = match tag {
            Some(tag) => self.client.execute_tagged(tag, sql, params),
            None => self.client.execute(sql, params),
        };
        let duration = start.elapsed();

        let query_result = match &result {
            Ok(execution) if execution.returns_rows() => QueryResult::Rows,
            Ok(execution) => QueryResult::Affected(execution.rows_affected()),
            Err(e) => QueryResult::error(e.to_string()),
        };

        self.report_result(&ctx, duration, &query_result);
        result
    }
}

impl<C: GenericClient> GenericClient for InstrumentedClient<C> {
    fn execute(&self, sql: &str, params: &Parameters) -> FluentResult<Execution> {
        self.execute_inner(sql, params, None)
    }

    fn execute_tagged(&self, tag: &str, sql: &str, params: &Parameters) -> FluentResult<Execution> {
        self.execute_inner(sql, params, Some(tag))
    }
}
