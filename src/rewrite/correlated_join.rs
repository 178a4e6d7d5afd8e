//! Turn correlated `EXISTS` predicates into inner joins.
//!
//! BigQuery rejects most correlated subqueries. An `EXISTS` whose only link
//! to the outer query is a set of equalities is a semi-join, which an inner
//! join against the DISTINCT correlation keys expresses exactly:
//!
//! ```text
//! SELECT o.id FROM orders o
//! WHERE EXISTS (SELECT 1 FROM items i WHERE i.order_id = o.id AND i.qty > 1)
//! ```
//!
//! becomes
//!
//! ```text
//! SELECT o.id FROM orders o
//! INNER JOIN (SELECT DISTINCT i.order_id AS __corr_0 FROM items i WHERE i.qty > 1) AS __exists_0
//!   ON o.id = __exists_0.__corr_0
//! ```

use super::fold::{collect_expr_columns, walk_expr, walk_query, walk_select, Fold};
use super::{RewriteContext, RewritePass};
use crate::sql::expr::{conjunction, split_conjunction, table_col};
use crate::sql::{
    BinaryOperator, Expr, ExprExt, Join, JoinConstraint, JoinType, Query, Select, SelectExpr,
    SetExpr, TableAlias, TableRef, TableWithJoins,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TransformCorrelatedJoinToJoin;

impl RewritePass for TransformCorrelatedJoinToJoin {
    fn name(&self) -> &'static str {
        "transform_correlated_join_to_join"
    }

    fn apply(&self, query: &Query, _ctx: &RewriteContext<'_>) -> Query {
        Decorrelate { next_alias: 0 }.fold_query(query.clone())
    }
}

struct Decorrelate {
    next_alias: usize,
}

impl Fold for Decorrelate {
    fn fold_select(&mut self, select: Select) -> Select {
        let mut select = walk_select(self, select);

        // A bare `*` would pick up the joined key columns.
        let bare_star = select
            .projection
            .iter()
            .any(|item| matches!(&item.expr, Expr::Star { qualifier } if qualifier.is_empty()));
        if select.from.len() != 1 || bare_star {
            return select;
        }
        let Some(selection) = select.selection.take() else {
            return select;
        };

        let outer_names = relation_names(&select.from);
        let mut joins = Vec::new();
        let mut kept = Vec::new();
        for conjunct in split_conjunction(selection.clone()) {
            match conjunct {
                Expr::Exists {
                    subquery,
                    negated: false,
                } => match self.semi_join(&subquery, &outer_names) {
                    Some(join) => joins.push(join),
                    None => kept.push(Expr::Exists {
                        subquery,
                        negated: false,
                    }),
                },
                other => kept.push(other),
            }
        }

        if joins.is_empty() {
            select.selection = Some(selection);
        } else {
            select.from[0].joins.extend(joins);
            select.selection = conjunction(kept);
        }
        select
    }
}

impl Decorrelate {
    fn semi_join(&mut self, subquery: &Query, outer_names: &[String]) -> Option<Join> {
        if !subquery.ctes.is_empty()
            || !subquery.order_by.is_empty()
            || subquery.limit.is_some()
            || subquery.offset.is_some()
        {
            return None;
        }
        let inner = match &subquery.body {
            SetExpr::Select(inner) => inner,
            _ => return None,
        };
        if inner.from.is_empty() || !inner.group_by.is_empty() || inner.having.is_some() {
            return None;
        }

        let inner_names = relation_names(&inner.from);
        let is_outer = |qualifier: &[String]| {
            qualifier
                .last()
                .is_some_and(|q| outer_names.contains(q) && !inner_names.contains(q))
        };
        let only_outer = |e: &Expr| {
            let cols = collect_expr_columns(e);
            !cols.is_empty() && cols.iter().all(|(q, _)| is_outer(q))
        };
        let no_outer = |e: &Expr| !collect_expr_columns(e).iter().any(|(q, _)| is_outer(q));

        let mut keys: Vec<(Expr, Expr)> = Vec::new();
        let mut remaining = Vec::new();
        let predicates = inner
            .selection
            .clone()
            .map(split_conjunction)
            .unwrap_or_default();
        for predicate in predicates {
            match predicate {
                Expr::BinaryOp {
                    left,
                    op: BinaryOperator::Eq,
                    right,
                } => {
                    if only_outer(&left) && no_outer(&right) {
                        keys.push((*right, *left));
                    } else if only_outer(&right) && no_outer(&left) {
                        keys.push((*left, *right));
                    } else {
                        remaining.push(Expr::BinaryOp {
                            left,
                            op: BinaryOperator::Eq,
                            right,
                        });
                    }
                }
                other => remaining.push(other),
            }
        }
        if keys.is_empty() {
            return None;
        }

        let (inner_keys, outer_keys): (Vec<_>, Vec<_>) = keys.into_iter().unzip();
        let derived = Query::from_select(Select {
            distinct: true,
            projection: inner_keys
                .into_iter()
                .enumerate()
                .map(|(i, e)| SelectExpr {
                    expr: e,
                    alias: Some(corr_name(i)),
                })
                .collect(),
            from: inner.from.clone(),
            selection: conjunction(remaining),
            ..Select::default()
        });

        // Any correlation left over, to this scope or one further out, is
        // not an equality we can join on.
        if has_unbound_qualifier(&derived) {
            return None;
        }

        let alias = format!("__exists_{}", self.next_alias);
        self.next_alias += 1;
        let on = outer_keys
            .into_iter()
            .enumerate()
            .map(|(i, outer)| outer.eq(table_col(&alias, &corr_name(i))))
            .collect();

        Some(Join {
            join_type: JoinType::Inner,
            relation: TableRef::Derived {
                subquery: Box::new(derived),
                alias: Some(TableAlias::new(&alias)),
            },
            constraint: JoinConstraint::On(conjunction(on)?),
        })
    }
}

fn corr_name(i: usize) -> String {
    format!("__corr_{i}")
}

/// Names under which the relations of a FROM clause can be referenced.
fn relation_names(from: &[TableWithJoins]) -> Vec<String> {
    from.iter()
        .flat_map(|twj| std::iter::once(&twj.relation).chain(twj.joins.iter().map(|j| &j.relation)))
        .filter_map(|r| r.reference_name().map(str::to_string))
        .collect()
}

/// Finds qualified references that no enclosing FROM clause binds.
#[derive(Default)]
struct UnboundQualifiers {
    scopes: Vec<Vec<String>>,
    found: bool,
}

impl Fold for UnboundQualifiers {
    // ORDER BY sits outside the SELECT but sees its relations.
    fn fold_query(&mut self, query: Query) -> Query {
        let names = match &query.body {
            SetExpr::Select(select) => relation_names(&select.from),
            _ => Vec::new(),
        };
        self.scopes.push(names);
        let query = walk_query(self, query);
        self.scopes.pop();
        query
    }

    fn fold_select(&mut self, select: Select) -> Select {
        self.scopes.push(relation_names(&select.from));
        let select = walk_select(self, select);
        self.scopes.pop();
        select
    }

    fn fold_expr(&mut self, expr: Expr) -> Expr {
        if let Expr::Column { qualifier, .. } | Expr::Star { qualifier } = &expr {
            let bound = qualifier.is_empty()
                || qualifier
                    .iter()
                    .any(|part| self.scopes.iter().any(|names| names.contains(part)));
            self.found |= !bound;
        }
        walk_expr(self, expr)
    }
}

fn has_unbound_qualifier(query: &Query) -> bool {
    let mut check = UnboundQualifiers::default();
    check.fold_query(query.clone());
    check.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::sql::{parse_query, Dialect};

    fn apply(sql: &str) -> (Query, Query) {
        let manifest = Manifest::default();
        let ctx = RewriteContext::new(&manifest, Dialect::BigQuery);
        let query = parse_query(sql, Dialect::Postgres).unwrap();
        let once = TransformCorrelatedJoinToJoin.apply(&query, &ctx);
        assert_eq!(TransformCorrelatedJoinToJoin.apply(&once, &ctx), once);
        (query, once)
    }

    #[test]
    fn test_exists_becomes_join() {
        let (_, rewritten) = apply(
            "SELECT o.id FROM orders AS o WHERE o.total > 10 AND EXISTS \
             (SELECT 1 FROM items AS i WHERE i.order_id = o.id AND i.qty > 1)",
        );
        assert_eq!(
            rewritten.to_sql(Dialect::BigQuery).unwrap(),
            "SELECT `o`.`id` FROM `orders` AS `o` INNER JOIN \
             (SELECT DISTINCT `i`.`order_id` AS `__corr_0` FROM `items` AS `i` WHERE `i`.`qty` > 1) \
             AS `__exists_0` ON `o`.`id` = `__exists_0`.`__corr_0` WHERE `o`.`total` > 10"
        );
    }

    #[test]
    fn test_multiple_keys_and_outer_on_right() {
        let (_, rewritten) = apply(
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE a.k1 = b.k1 AND b.k2 = a.k2)",
        );
        assert_eq!(
            rewritten.to_sql(Dialect::BigQuery).unwrap(),
            "SELECT `a`.`x` FROM `a` INNER JOIN \
             (SELECT DISTINCT `b`.`k1` AS `__corr_0`, `b`.`k2` AS `__corr_1` FROM `b`) AS `__exists_0` \
             ON `a`.`k1` = `__exists_0`.`__corr_0` AND `a`.`k2` = `__exists_0`.`__corr_1`"
        );
    }

    #[test]
    fn test_nested_subquery_with_its_own_relations_is_kept() {
        let (_, rewritten) = apply(
            "SELECT a.x FROM a WHERE EXISTS \
             (SELECT 1 FROM b WHERE b.k = a.k AND b.v IN (SELECT c.v FROM c))",
        );
        assert_eq!(
            rewritten.to_sql(Dialect::BigQuery).unwrap(),
            "SELECT `a`.`x` FROM `a` INNER JOIN \
             (SELECT DISTINCT `b`.`k` AS `__corr_0` FROM `b` WHERE `b`.`v` IN (SELECT `c`.`v` FROM `c`)) \
             AS `__exists_0` ON `a`.`k` = `__exists_0`.`__corr_0`"
        );
    }

    #[test]
    fn test_unsupported_shapes_pass_through() {
        for sql in [
            "SELECT a.x FROM a WHERE NOT EXISTS (SELECT 1 FROM b WHERE b.k = a.k)",
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.k > a.k)",
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b)",
            "SELECT a.x FROM a WHERE a.y = 1 OR EXISTS (SELECT 1 FROM b WHERE b.k = a.k)",
            "SELECT a.x FROM a, c WHERE EXISTS (SELECT 1 FROM b WHERE b.k = a.k)",
            "SELECT * FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.k = a.k)",
            "SELECT a.x FROM a WHERE EXISTS (SELECT b.k FROM b WHERE b.k = a.k GROUP BY b.k)",
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.k = a.k LIMIT 1)",
            "SELECT a.x FROM a WHERE a.y = 1 AND (a.z = 2 AND a.w = 3)",
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE EXISTS \
             (SELECT 1 FROM c WHERE c.j = b.j AND c.k = a.k))",
            "SELECT a.x FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.k = a.k AND \
             b.v IN (SELECT c.v FROM c WHERE c.w = a.w))",
        ] {
            let (query, rewritten) = apply(sql);
            assert_eq!(rewritten, query, "{sql}");
        }
    }
}
