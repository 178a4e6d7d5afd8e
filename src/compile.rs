//! End-to-end compilation from client SQL to backend SQL.
//!
//! ```text
//! SQL text → Parse → Canonical tree → Rewrite pipeline → Emit (backend dialect)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata::compile::Compiler;
//! use strata::config::BackendKind;
//! use strata::manifest::Manifest;
//!
//! let compiler = Compiler::new(Arc::new(Manifest::default()), BackendKind::BigQuery);
//! let output = compiler.compile("SELECT cat.sch.orders.id FROM cat.sch.orders")?;
//! assert_eq!(output.sql, "SELECT `orders`.`id` FROM `cat`.`sch`.`orders`");
//! ```

use std::sync::Arc;

use crate::config::BackendKind;
use crate::manifest::Manifest;
use crate::rewrite::{Pipeline, RewriteContext};
use crate::sql::query::Query;
use crate::sql::{parse_query, Dialect, EmitError, ParseError};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Dialect the incoming SQL is written in.
    pub read_dialect: Dialect,

    /// Run the target's rewrite pipeline before emission.
    pub rewrite: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            read_dialect: Dialect::Postgres,
            rewrite: true,
        }
    }
}

impl CompileOptions {
    pub fn with_read_dialect(mut self, dialect: Dialect) -> Self {
        self.read_dialect = dialect;
        self
    }

    pub fn without_rewrite(mut self) -> Self {
        self.rewrite = false;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a query.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated SQL string.
    pub sql: String,

    /// The rewritten query tree the SQL was emitted from.
    pub query: Query,

    /// The dialect used for generation.
    pub dialect: Dialect,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles client SQL for one backend.
#[derive(Debug)]
pub struct Compiler {
    manifest: Arc<Manifest>,
    backend: BackendKind,
    pipeline: Pipeline,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(manifest: Arc<Manifest>, backend: BackendKind) -> Self {
        Self {
            manifest,
            backend,
            pipeline: Pipeline::for_dialect(backend.dialect()),
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Parse, rewrite and emit.
    pub fn compile(&self, sql: &str) -> CompileResult<CompileOutput> {
        let query = parse_query(sql, self.options.read_dialect)?;
        self.compile_query(&query)
    }

    /// Rewrite and emit an already parsed query.
    pub fn compile_query(&self, query: &Query) -> CompileResult<CompileOutput> {
        let dialect = self.dialect();
        let query = if self.options.rewrite {
            let ctx = RewriteContext::new(&self.manifest, dialect);
            self.pipeline.apply(query, &ctx)
        } else {
            query.clone()
        };
        let sql = query.to_sql(dialect)?;
        tracing::debug!(backend = %self.backend, sql = %sql, "compiled query");
        Ok(CompileOutput {
            sql,
            query,
            dialect,
        })
    }
}

/// Translate SQL from one dialect to another without a manifest.
///
/// The write dialect's rewrite pipeline still runs.
pub fn transpile(sql: &str, read: Dialect, write: Dialect) -> CompileResult<CompileOutput> {
    let query = parse_query(sql, read)?;
    let manifest = Manifest::default();
    let ctx = RewriteContext::new(&manifest, write);
    let query = Pipeline::for_dialect(write).apply(&query, &ctx);
    let sql = query.to_sql(write)?;
    Ok(CompileOutput {
        sql,
        query,
        dialect: write,
    })
}
