//! Move derived-table column aliases into the subquery projection.
//!
//! `(SELECT a, b FROM t) AS s(x, y)` becomes
//! `(SELECT a AS x, b AS y FROM t) AS s`. The rewrite only fires when the
//! leftmost SELECT of the subquery lists its columns explicitly and the
//! counts match; anything else is left for the backend to reject.

use super::fold::{walk_table_ref, Fold};
use super::{RewriteContext, RewritePass};
use crate::sql::{Expr, Query, TableAlias, TableRef};

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveColumnAliasInAliasRelation;

impl RewritePass for RemoveColumnAliasInAliasRelation {
    fn name(&self) -> &'static str {
        "remove_column_alias_in_alias_relation"
    }

    fn apply(&self, query: &Query, _ctx: &RewriteContext<'_>) -> Query {
        PushAliases.fold_query(query.clone())
    }
}

struct PushAliases;

impl Fold for PushAliases {
    fn fold_table_ref(&mut self, relation: TableRef) -> TableRef {
        match walk_table_ref(self, relation) {
            TableRef::Derived {
                mut subquery,
                alias: Some(alias),
            } if !alias.columns.is_empty() => {
                let TableAlias { name, columns } = alias;
                match subquery.body.leftmost_select_mut() {
                    Some(select)
                        if select.projection.len() == columns.len()
                            && !select
                                .projection
                                .iter()
                                .any(|item| matches!(item.expr, Expr::Star { .. })) =>
                    {
                        for (item, column) in select.projection.iter_mut().zip(&columns) {
                            item.alias = Some(column.clone());
                        }
                        TableRef::Derived {
                            subquery,
                            alias: Some(TableAlias {
                                name,
                                columns: vec![],
                            }),
                        }
                    }
                    _ => TableRef::Derived {
                        subquery,
                        alias: Some(TableAlias { name, columns }),
                    },
                }
            }
            other => other,
        }
    }
}
