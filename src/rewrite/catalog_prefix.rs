//! Strip catalog and schema parts from column qualifiers.
//!
//! BigQuery resolves `tbl.col` against `project.dataset.tbl` in FROM but
//! rejects `project.dataset.tbl.col`. A qualifier is cut down to its last
//! part only when it spells the trailing path of a table in scope, so
//! struct field paths such as `t.rec.field` are left alone.

use std::iter;

use super::fold::{walk_expr, walk_query, walk_select, Fold};
use super::{RewriteContext, RewritePass};
use crate::sql::{Expr, Query, Select, SetExpr, TableRef, TableWithJoins};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveCatalogSchemaPrefix;

impl RewritePass for RemoveCatalogSchemaPrefix {
    fn name(&self) -> &'static str {
        "remove_catalog_schema_prefix"
    }

    fn apply(&self, query: &Query, _ctx: &RewriteContext<'_>) -> Query {
        StripPrefix::default().fold_query(query.clone())
    }
}

/// Table names visible at the current point, innermost scope last.
#[derive(Default)]
struct StripPrefix {
    scopes: Vec<Vec<Vec<String>>>,
}

impl StripPrefix {
    fn names_qualified_table(&self, qualifier: &[String]) -> bool {
        qualifier.len() > 1
            && self
                .scopes
                .iter()
                .flatten()
                .any(|table| table.ends_with(qualifier))
    }
}

impl Fold for StripPrefix {
    // ORDER BY sits outside the SELECT but sees its tables.
    fn fold_query(&mut self, query: Query) -> Query {
        let names = match &query.body {
            SetExpr::Select(select) => table_names(&select.from),
            _ => Vec::new(),
        };
        self.scopes.push(names);
        let query = walk_query(self, query);
        self.scopes.pop();
        query
    }

    fn fold_select(&mut self, select: Select) -> Select {
        self.scopes.push(table_names(&select.from));
        let select = walk_select(self, select);
        self.scopes.pop();
        select
    }

    fn fold_expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Column { qualifier, name } if self.names_qualified_table(&qualifier) => {
                Expr::Column {
                    qualifier: last_part(qualifier),
                    name,
                }
            }
            Expr::Star { qualifier } if self.names_qualified_table(&qualifier) => Expr::Star {
                qualifier: last_part(qualifier),
            },
            other => walk_expr(self, other),
        }
    }
}

fn last_part(mut qualifier: Vec<String>) -> Vec<String> {
    qualifier.split_off(qualifier.len() - 1)
}

fn table_names(from: &[TableWithJoins]) -> Vec<Vec<String>> {
    from.iter()
        .flat_map(|twj| iter::once(&twj.relation).chain(twj.joins.iter().map(|j| &j.relation)))
        .filter_map(|relation| match relation {
            TableRef::Table { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}
