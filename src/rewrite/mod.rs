//! Query rewrite pipeline.
//!
//! Some backends cannot run every shape the canonical tree allows. Before
//! emission the compiler runs the query through a [`Pipeline`] of
//! [`RewritePass`]es chosen for the target dialect. Each pass is pure: it
//! receives a borrowed tree and returns a new one, leaving shapes it does
//! not recognize untouched. Passes are idempotent, so running a pipeline
//! twice produces the same tree as running it once.
//!
//! Only BigQuery currently needs passes:
//!
//! 1. [`RemoveCatalogSchemaPrefix`]
//! 2. [`RemoveColumnAliasInAliasRelation`]
//! 3. [`ReplaceColumnAliasInUnnest`]
//! 4. [`TransformCorrelatedJoinToJoin`]

pub mod fold;

mod alias_relation;
mod catalog_prefix;
mod correlated_join;
mod unnest_alias;

pub use alias_relation::RemoveColumnAliasInAliasRelation;
pub use catalog_prefix::RemoveCatalogSchemaPrefix;
pub use correlated_join::TransformCorrelatedJoinToJoin;
pub use fold::Fold;
pub use unnest_alias::ReplaceColumnAliasInUnnest;

use crate::manifest::Manifest;
use crate::sql::{Dialect, Query};

/// Read-only state shared by every pass of a pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub manifest: &'a Manifest,
    pub dialect: Dialect,
}

impl<'a> RewriteContext<'a> {
    pub fn new(manifest: &'a Manifest, dialect: Dialect) -> Self {
        Self { manifest, dialect }
    }
}

/// A single tree-to-tree rewrite.
pub trait RewritePass: std::fmt::Debug + Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Produce the rewritten query. Never mutates the input.
    fn apply(&self, query: &Query, ctx: &RewriteContext<'_>) -> Query;
}

/// An ordered list of passes.
#[derive(Debug, Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn RewritePass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed pass order for a target dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let mut pipeline = Self::new();
        if dialect == Dialect::BigQuery {
            pipeline.add_pass(Box::new(RemoveCatalogSchemaPrefix));
            pipeline.add_pass(Box::new(RemoveColumnAliasInAliasRelation));
            pipeline.add_pass(Box::new(ReplaceColumnAliasInUnnest));
            pipeline.add_pass(Box::new(TransformCorrelatedJoinToJoin));
        }
        pipeline
    }

    pub fn add_pass(&mut self, pass: Box<dyn RewritePass>) {
        self.passes.push(pass);
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass in order.
    pub fn apply(&self, query: &Query, ctx: &RewriteContext<'_>) -> Query {
        let mut current = query.clone();
        for pass in &self.passes {
            let next = pass.apply(&current, ctx);
            tracing::debug!(
                pass = pass.name(),
                dialect = %ctx.dialect,
                changed = next != current,
                "applied rewrite pass"
            );
            current = next;
        }
        current
    }
}
