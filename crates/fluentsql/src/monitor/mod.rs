//! Query monitoring for statement execution.
//!
//! This module provides:
//! - Timing of every execution through [`InstrumentedClient`]
//! - Slow query warnings on the `fluentsql.sql` tracing target
//! - Pluggable monitors for logging and statistics
//!
//! # Example
//!
//! ```rust,ignore
//! use fluentsql::monitor::{InstrumentedClient, LoggingMonitor, MonitorConfig};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_slow_query_threshold(Duration::from_millis(200))
//!     .enable_monitoring();
//!
//! let client = InstrumentedClient::new(&conn)
//!     .with_config(config)
//!     .with_monitor(LoggingMonitor::new());
//!
//! let rows = fluent.from("article").fetch_all(&client)?;
//! ```

mod config;
mod instrumented;
mod monitors;
mod types;


pub use config::MonitorConfig;
pub use instrumented::InstrumentedClient;
pub use monitors::{CompositeMonitor, LoggingMonitor, NoopMonitor, QueryStats, StatsMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

pub(crate) fn truncate_sql(sql: &str, max_bytes: usize) -> String {
    if sql.len() > max_bytes {
        format!("{}...", truncate_sql_bytes(sql, max_bytes))
    } else {
        sql.to_string()
    }
}
