//! Replace `UNNEST(..) AS t(x)` with `UNNEST(..) AS x`.
//!
//! BigQuery names the element column of an UNNEST after the relation alias
//! and has no column-alias list. References `t.x` in the owning SELECT and
//! in its query's ORDER BY become bare `x`.

use super::fold::{walk_expr, walk_query, walk_select, walk_table_ref, Fold};
use super::{RewriteContext, RewritePass};
use crate::sql::{Expr, OrderByExpr, Query, Select, SetExpr, TableAlias, TableRef};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceColumnAliasInUnnest;

impl RewritePass for ReplaceColumnAliasInUnnest {
    fn name(&self) -> &'static str {
        "replace_column_alias_in_unnest"
    }

    fn apply(&self, query: &Query, _ctx: &RewriteContext<'_>) -> Query {
        UnnestAliases.fold_query(query.clone())
    }
}

/// (relation alias, column alias)
type Rename = (String, String);

struct UnnestAliases;

impl Fold for UnnestAliases {
    fn fold_query(&mut self, query: Query) -> Query {
        let renames = match &query.body {
            SetExpr::Select(select) => unnest_renames(select),
            _ => vec![],
        };
        let mut query = walk_query(self, query);
        if !renames.is_empty() {
            let mut apply = ApplyRenames(&renames);
            query.order_by = query
                .order_by
                .into_iter()
                .map(|ob| OrderByExpr {
                    expr: apply.fold_expr(ob.expr),
                    ..ob
                })
                .collect();
        }
        query
    }

    fn fold_select(&mut self, select: Select) -> Select {
        let select = walk_select(self, select);
        let renames = unnest_renames(&select);
        if renames.is_empty() {
            return select;
        }
        ApplyRenames(&renames).fold_select(select)
    }
}

/// Single-column UNNEST relations directly in this SELECT's FROM clause.
fn unnest_renames(select: &Select) -> Vec<Rename> {
    select
        .from
        .iter()
        .flat_map(|twj| std::iter::once(&twj.relation).chain(twj.joins.iter().map(|j| &j.relation)))
        .filter_map(|relation| match relation {
            TableRef::Unnest {
                exprs,
                alias: Some(TableAlias { name, columns }),
            } if exprs.len() == 1 && columns.len() == 1 => {
                Some((name.clone(), columns[0].clone()))
            }
            _ => None,
        })
        .collect()
}

struct ApplyRenames<'a>(&'a [Rename]);

impl ApplyRenames<'_> {
    fn column_for(&self, qualifier: &[String], name: &str) -> bool {
        match qualifier {
            [relation] => self.0.iter().any(|(r, c)| r == relation && c == name),
            _ => false,
        }
    }
}

impl Fold for ApplyRenames<'_> {
    fn fold_table_ref(&mut self, relation: TableRef) -> TableRef {
        match relation {
            TableRef::Unnest {
                exprs,
                alias: Some(TableAlias { name, columns }),
            } if exprs.len() == 1
                && columns.len() == 1
                && self.0.iter().any(|(r, c)| *r == name && *c == columns[0]) =>
            {
                let exprs = exprs.into_iter().map(|e| self.fold_expr(e)).collect();
                TableRef::Unnest {
                    exprs,
                    alias: Some(TableAlias::new(&columns[0])),
                }
            }
            other => walk_table_ref(self, other),
        }
    }

    fn fold_expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Column { qualifier, name } if self.column_for(&qualifier, &name) => {
                Expr::Column {
                    qualifier: vec![],
                    name,
                }
            }
            other => walk_expr(self, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::sql::{parse_query, Dialect};

    fn rewrite(sql: &str) -> String {
        let manifest = Manifest::default();
        let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
        let query = parse_query(sql, Dialect::Postgres).unwrap();
        let once = ReplaceColumnAliasInUnnest.apply(&query, &ctx);
        assert_eq!(ReplaceColumnAliasInUnnest.apply(&once, &ctx), once);
        once.to_sql(Dialect::BigQuery).unwrap()
    }

    #[test]
    fn test_unnest_alias_replaced() {
        assert_eq!(
            rewrite(
                "SELECT u.x, count(*) FROM tbl CROSS JOIN UNNEST(tbl.arr) AS u(x) \
                 WHERE u.x > 1 GROUP BY u.x ORDER BY u.x"
            ),
            "SELECT `x`, COUNT(*) FROM `tbl` CROSS JOIN UNNEST(`tbl`.`arr`) AS `x` \
             WHERE `x` > 1 GROUP BY `x` ORDER BY `x`"
        );
    }

    #[test]
    fn test_other_references_untouched() {
        assert_eq!(
            rewrite("SELECT u.y, tbl.x FROM tbl CROSS JOIN UNNEST(tbl.arr) AS u(x)"),
            "SELECT `u`.`y`, `tbl`.`x` FROM `tbl` CROSS JOIN UNNEST(`tbl`.`arr`) AS `x`"
        );
    }

    #[test]
    fn test_multi_column_unnest_unchanged() {
        let manifest = Manifest::default();
        let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
        let query =
            parse_query("SELECT * FROM UNNEST(a, b) AS u(x, y)", Dialect::Postgres).unwrap();
        assert_eq!(ReplaceColumnAliasInUnnest.apply(&query, &ctx), query);
    }
}
