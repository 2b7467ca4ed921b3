//! # fluentsql
//!
//! A fluent SQL statement builder with convention-based smart joins.
//!
//! ## Features
//!
//! - **Fluent statements**: SELECT, INSERT, UPDATE and DELETE built by chaining
//! - **Smart joins**: `user.country.name` in any clause adds the joins it needs
//! - **Explicit parameters**: one placeholder style per statement, `?` or `:name`
//! - **Naming conventions**: primary and foreign keys derived from table names,
//!   with per-table overrides
//! - **Execution seam**: anything implementing [`GenericClient`] runs the
//!   compiled SQL; `rusqlite::Connection` is supported out of the box
//! - **Query monitoring**: timing, logging and slow query warnings
//!
//! ## Example
//!
//! ```ignore
//! use fluentsql::Fluent;
//!
//! let fluent = Fluent::new();
//!
//! // SELECT article.*, user.name FROM article
//! //   LEFT JOIN user ON user.id = article.user_id
//! //   WHERE article.published_at > ? ORDER BY article.title
//! let rows = fluent
//!     .from("article")
//!     .select("user.name")
//!     .where_("article.published_at > ?", "2011-12-10")
//!     .order_by("article.title")
//!     .fetch_all(&conn)?;
//!
//! fluent
//!     .update("user")
//!     .set("type", "author")
//!     .by_id(2)
//!     .execute(&conn)?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod params;
pub mod row;
pub mod value;

mod clause;
mod fetch;
mod fluent;
mod lexer;
mod predicate;
mod resolver;
mod smart_join;
mod statement;
mod table;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use client::{Cursor, Execution, GenericClient};
pub use config::{ColumnCase, FluentConfig, Structure};
pub use error::{FluentError, FluentResult};
pub use fetch::TypedStatement;
pub use fluent::Fluent;
pub use monitor::{
    CompositeMonitor, InstrumentedClient, LoggingMonitor, MonitorConfig, NoopMonitor,
    QueryContext, QueryMonitor, QueryResult, QueryStats, QueryType, StatsMonitor,
};
pub use params::{ParamStyle, Parameters};
pub use row::Row;
pub use statement::{Compiled, Statement, StatementKind};
pub use table::{JoinKind, TableRef};
pub use value::{Arg, Args, IntoArgs, IntoPairs, Literal, NamedArgs, Pairs, Value, named};
