//! Owned tree folding.
//!
//! A [`Fold`] consumes a node and returns its replacement. Every method
//! defaults to the matching `walk_*` function, which rebuilds the node from
//! its folded children and leaves everything else untouched. A pass
//! overrides the methods for the node kinds it cares about and calls the
//! `walk_*` function to keep descending.

use crate::sql::expr::Expr;
use crate::sql::query::{
    Cte, Join, JoinConstraint, OrderByExpr, Query, Select, SelectExpr, SetExpr, TableRef,
    TableWithJoins,
};

pub trait Fold {
    fn fold_query(&mut self, query: Query) -> Query {
        walk_query(self, query)
    }

    fn fold_set_expr(&mut self, body: SetExpr) -> SetExpr {
        walk_set_expr(self, body)
    }

    fn fold_select(&mut self, select: Select) -> Select {
        walk_select(self, select)
    }

    fn fold_table_with_joins(&mut self, twj: TableWithJoins) -> TableWithJoins {
        walk_table_with_joins(self, twj)
    }

    fn fold_table_ref(&mut self, relation: TableRef) -> TableRef {
        walk_table_ref(self, relation)
    }

    fn fold_join(&mut self, join: Join) -> Join {
        walk_join(self, join)
    }

    fn fold_expr(&mut self, expr: Expr) -> Expr {
        walk_expr(self, expr)
    }
}

pub fn walk_query<F: Fold + ?Sized>(f: &mut F, query: Query) -> Query {
    let Query {
        ctes,
        recursive,
        body,
        order_by,
        limit,
        offset,
    } = query;

    Query {
        ctes: ctes
            .into_iter()
            .map(|cte| Cte {
                query: Box::new(f.fold_query(*cte.query)),
                ..cte
            })
            .collect(),
        recursive,
        body: f.fold_set_expr(body),
        order_by: order_by
            .into_iter()
            .map(|ob| OrderByExpr {
                expr: f.fold_expr(ob.expr),
                ..ob
            })
            .collect(),
        limit: limit.map(|e| f.fold_expr(e)),
        offset: offset.map(|e| f.fold_expr(e)),
    }
}

pub fn walk_set_expr<F: Fold + ?Sized>(f: &mut F, body: SetExpr) -> SetExpr {
    match body {
        SetExpr::Select(select) => SetExpr::Select(Box::new(f.fold_select(*select))),
        SetExpr::SetOperation {
            op,
            all,
            left,
            right,
        } => SetExpr::SetOperation {
            op,
            all,
            left: Box::new(f.fold_set_expr(*left)),
            right: Box::new(f.fold_set_expr(*right)),
        },
        SetExpr::Query(query) => SetExpr::Query(Box::new(f.fold_query(*query))),
    }
}

pub fn walk_select<F: Fold + ?Sized>(f: &mut F, select: Select) -> Select {
    let Select {
        distinct,
        projection,
        from,
        selection,
        group_by,
        having,
    } = select;

    Select {
        distinct,
        projection: projection
            .into_iter()
            .map(|item| SelectExpr {
                expr: f.fold_expr(item.expr),
                alias: item.alias,
            })
            .collect(),
        from: from
            .into_iter()
            .map(|twj| f.fold_table_with_joins(twj))
            .collect(),
        selection: selection.map(|e| f.fold_expr(e)),
        group_by: group_by.into_iter().map(|e| f.fold_expr(e)).collect(),
        having: having.map(|e| f.fold_expr(e)),
    }
}

pub fn walk_table_with_joins<F: Fold + ?Sized>(f: &mut F, twj: TableWithJoins) -> TableWithJoins {
    TableWithJoins {
        relation: f.fold_table_ref(twj.relation),
        joins: twj.joins.into_iter().map(|j| f.fold_join(j)).collect(),
    }
}

pub fn walk_table_ref<F: Fold + ?Sized>(f: &mut F, relation: TableRef) -> TableRef {
    match relation {
        TableRef::Table { .. } => relation,
        TableRef::Derived { subquery, alias } => TableRef::Derived {
            subquery: Box::new(f.fold_query(*subquery)),
            alias,
        },
        TableRef::Unnest { exprs, alias } => TableRef::Unnest {
            exprs: exprs.into_iter().map(|e| f.fold_expr(e)).collect(),
            alias,
        },
    }
}

pub fn walk_join<F: Fold + ?Sized>(f: &mut F, join: Join) -> Join {
    Join {
        join_type: join.join_type,
        relation: f.fold_table_ref(join.relation),
        constraint: match join.constraint {
            JoinConstraint::On(e) => JoinConstraint::On(f.fold_expr(e)),
            other => other,
        },
    }
}

pub fn walk_expr<F: Fold + ?Sized>(f: &mut F, expr: Expr) -> Expr {
    let fold_box = |f: &mut F, e: Box<Expr>| Box::new(f.fold_expr(*e));

    match expr {
        Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
            left: fold_box(f, left),
            op,
            right: fold_box(f, right),
        },
        Expr::UnaryOp { op, expr } => Expr::UnaryOp {
            op,
            expr: fold_box(f, expr),
        },
        Expr::Function {
            name,
            args,
            distinct,
        } => Expr::Function {
            name,
            args: args.into_iter().map(|a| f.fold_expr(a)).collect(),
            distinct,
        },
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => Expr::Case {
            operand: operand.map(|o| fold_box(f, o)),
            when_clauses: when_clauses
                .into_iter()
                .map(|(w, t)| (f.fold_expr(w), f.fold_expr(t)))
                .collect(),
            else_clause: else_clause.map(|e| fold_box(f, e)),
        },
        Expr::Subquery(query) => Expr::Subquery(Box::new(f.fold_query(*query))),
        Expr::Exists { subquery, negated } => Expr::Exists {
            subquery: Box::new(f.fold_query(*subquery)),
            negated,
        },
        Expr::In {
            expr,
            values,
            negated,
        } => Expr::In {
            expr: fold_box(f, expr),
            values: values.into_iter().map(|v| f.fold_expr(v)).collect(),
            negated,
        },
        Expr::InSubquery {
            expr,
            subquery,
            negated,
        } => Expr::InSubquery {
            expr: fold_box(f, expr),
            subquery: Box::new(f.fold_query(*subquery)),
            negated,
        },
        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => Expr::Between {
            expr: fold_box(f, expr),
            low: fold_box(f, low),
            high: fold_box(f, high),
            negated,
        },
        Expr::IsNull { expr, negated } => Expr::IsNull {
            expr: fold_box(f, expr),
            negated,
        },
        Expr::Like {
            expr,
            pattern,
            negated,
        } => Expr::Like {
            expr: fold_box(f, expr),
            pattern: fold_box(f, pattern),
            negated,
        },
        Expr::Cast { expr, data_type } => Expr::Cast {
            expr: fold_box(f, expr),
            data_type,
        },
        Expr::ArrayIndex { array, index } => Expr::ArrayIndex {
            array: fold_box(f, array),
            index: fold_box(f, index),
        },
        Expr::Array(items) => Expr::Array(items.into_iter().map(|e| f.fold_expr(e)).collect()),
        Expr::Paren(inner) => Expr::Paren(fold_box(f, inner)),
        leaf @ (Expr::Column { .. }
        | Expr::Literal(_)
        | Expr::Keyword(_)
        | Expr::Star { .. }
        | Expr::Unsupported(_)) => leaf,
    }
}

/// A column reference: (qualifier, name).
pub(crate) type ColumnRef = (Vec<String>, String);

struct ColumnCollector(Vec<ColumnRef>);

impl Fold for ColumnCollector {
    fn fold_expr(&mut self, expr: Expr) -> Expr {
        if let Expr::Column { qualifier, name } = &expr {
            self.0.push((qualifier.clone(), name.clone()));
        }
        walk_expr(self, expr)
    }
}

/// Every column reference in an expression, including nested subqueries.
pub(crate) fn collect_expr_columns(expr: &Expr) -> Vec<ColumnRef> {
    let mut collector = ColumnCollector(Vec::new());
    collector.fold_expr(expr.clone());
    collector.0
}
