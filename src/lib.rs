//! # Strata
//!
//! A query rewriting and backend connector layer that sits between SQL
//! clients and data warehouses.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Client SQL (text)                       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::parser]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Canonical query tree                     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [rewrite] (per target dialect)
//! ┌─────────────────────────────────────────────────────────┐
//! │                Rewritten query tree                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::dialect] emission
//! ┌─────────────────────────────────────────────────────────┐
//! │         Backend SQL → [connector] → rows / schema        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Query results can be materialized through the [`cache`] delegates,
//! which follow the configured backend and swap on reload.

pub mod cache;
pub mod compile;
pub mod config;
pub mod connector;
pub mod logging;
pub mod manifest;
pub mod rewrite;
pub mod sql;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cache::{CacheDelegate, CacheDelegateSelector, Location};
    pub use crate::compile::{transpile, CompileError, CompileOptions, CompileOutput, Compiler};
    pub use crate::config::{BackendKind, Settings};
    pub use crate::connector::{
        BuiltinConnectors, Connector, ConnectorError, ConnectorFactory, RecordIterator, Value,
    };
    pub use crate::manifest::{EnumDefinition, EnumValue, Manifest};
    pub use crate::rewrite::{Pipeline, RewriteContext, RewritePass};
    pub use crate::sql::{
        col, lit_int, lit_str, parse_query, table_col, CanonicalType, DataType, Dialect, Expr,
        ExprExt, Query, SqlDialect, TableRef,
    };
}

// Also export at crate root for convenience
pub use compile::{transpile, Compiler};
pub use config::BackendKind;
pub use sql::{parse_query, Dialect, Query};
