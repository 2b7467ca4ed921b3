use super::config::DEFAULT_MAX_SQL_LENGTH;
use super::truncate_sql;
use super::types::{QueryContext, QueryMonitor, QueryResult, QueryType};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Monitor that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}

/// Writes one `fluentsql.sql` event per finished statement.
///
/// Successful statements are logged at `debug` and may be filtered by
/// [`min_duration`](Self::min_duration); failures are always logged at `warn`.
#[derive(Debug, Clone)]
pub struct LoggingMonitor {
    pub min_duration: Option<Duration>,
    pub max_sql_length: usize,
}

impl Default for LoggingMonitor {
    fn default() -> Self {
        Self {
            min_duration: None,
            max_sql_length: DEFAULT_MAX_SQL_LENGTH,
        }
    }
}

impl LoggingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip successful statements faster than `duration`.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }

    /// Number of SQL bytes kept in an event before `...` is appended.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = len;
        self
    }

    pub(crate) fn should_log(&self, duration: Duration, result: &QueryResult) -> bool {
        matches!(result, QueryResult::Error(_)) || self.min_duration.is_none_or(|min| duration >= min)
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        truncate_sql(sql, self.max_sql_length)
    }
}

impl QueryMonitor for LoggingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if !self.should_log(duration, result) {
            return;
        }
        let tag = ctx.tag.as_deref().unwrap_or("-");
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let sql = self.truncate_sql(&ctx.sql);
        match result {
            QueryResult::Error(message) => tracing::warn!(
                target: "fluentsql.sql",
                query_type = ?ctx.query_type,
                tag,
                params = ctx.param_count,
                duration_ms,
                error = %message,
                sql = %sql,
                "statement failed"
            ),
            _ => tracing::debug!(
                target: "fluentsql.sql",
                query_type = ?ctx.query_type,
                tag,
                params = ctx.param_count,
                duration_ms,
                result = %result,
                sql = %sql,
                "statement executed"
            ),
        }
    }
}

/// Aggregated execution numbers, see [`StatsMonitor::stats`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStats {
    pub total_queries: u64,
    pub failed_queries: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
    /// SQL of the slowest statement, truncated like log output.
    pub slowest_query: Option<String>,
    by_type: [u64; QueryType::COUNT],
}

impl QueryStats {
    /// Executions of one statement kind.
    pub fn count(&self, query_type: QueryType) -> u64 {
        self.by_type[query_type.index()]
    }

    /// `None` before the first execution.
    pub fn mean_duration(&self) -> Option<Duration> {
        let total = u32::try_from(self.total_queries).ok().filter(|n| *n > 0)?;
        Some(self.total_duration / total)
    }

    fn record(&mut self, ctx: &QueryContext, duration: Duration, failed: bool) {
        self.total_queries += 1;
        self.by_type[ctx.query_type.index()] += 1;
        if failed {
            self.failed_queries += 1;
        }
        self.total_duration = self.total_duration.saturating_add(duration);
        if self.slowest_query.is_none() || duration > self.max_duration {
            self.max_duration = duration;
            self.slowest_query = Some(truncate_sql(&ctx.sql, DEFAULT_MAX_SQL_LENGTH));
        }
    }
}

/// Collects [`QueryStats`] over every statement it sees.
#[derive(Debug, Default)]
pub struct StatsMonitor {
    stats: Mutex<QueryStats>,
}

impl StatsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, QueryStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the numbers so far.
    pub fn stats(&self) -> QueryStats {
        self.guard().clone()
    }

    pub fn reset(&self) {
        *self.guard() = QueryStats::default();
    }
}

impl QueryMonitor for StatsMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let failed = matches!(result, QueryResult::Error(_));
        self.guard().record(ctx, duration, failed);
    }
}

/// Forwards every event to each inner monitor in insertion order.
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.add_arc(Arc::new(monitor))
    }

    /// Add a monitor the caller keeps a handle to, e.g. a [`StatsMonitor`].
    pub fn add_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }
}

impl QueryMonitor for CompositeMonitor {
    fn on_query_start(&self, ctx: &QueryContext) {
        self.monitors.iter().for_each(|m| m.on_query_start(ctx));
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        self.monitors
            .iter()
            .for_each(|m| m.on_query_complete(ctx, duration, result));
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        self.monitors.iter().for_each(|m| m.on_slow_query(ctx, duration));
    }
}
