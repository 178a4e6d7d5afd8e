//! Query tree - statements built from `Expr` nodes.
//!
//! A `Query` is an optional WITH list, a body, and ORDER BY / LIMIT / OFFSET.
//! The body is a `SetExpr`: a plain SELECT, a set operation, or a nested
//! query. Builders are provided for the common shapes; the parser and the
//! rewrite passes construct the structs directly.

use super::dialect::{Dialect, SqlDialect};
use super::error::EmitResult;
use super::expr::{Expr, ExprExt, NullsOrder, SortDir};
use super::token::{Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = self.expr.to_tokens(dialect)?;
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        Ok(ts)
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// Relations
// =============================================================================

/// `AS name [(col, ...)]`
#[derive(Debug, Clone, PartialEq)]
pub struct TableAlias {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableAlias {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::As)
            .space()
            .push(Token::Ident(self.name.clone()));
        if !self.columns.is_empty() {
            ts.lparen();
            push_ident_list(&mut ts, &self.columns);
            ts.rparen();
        }
        ts
    }
}

/// A relation in FROM or JOIN.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// Named table, possibly `catalog.schema.table`.
    Table {
        name: Vec<String>,
        alias: Option<TableAlias>,
    },
    /// `(SELECT ...) AS alias`
    Derived {
        subquery: Box<Query>,
        alias: Option<TableAlias>,
    },
    /// `UNNEST(expr, ...) AS alias`
    Unnest {
        exprs: Vec<Expr>,
        alias: Option<TableAlias>,
    },
}

impl TableRef {
    /// A bare table name.
    pub fn new(table: &str) -> Self {
        TableRef::Table {
            name: vec![table.into()],
            alias: None,
        }
    }

    /// A multi-part table name.
    pub fn qualified(parts: &[&str]) -> Self {
        TableRef::Table {
            name: parts.iter().map(|p| p.to_string()).collect(),
            alias: None,
        }
    }

    pub fn derived(query: Query, alias: TableAlias) -> Self {
        TableRef::Derived {
            subquery: Box::new(query),
            alias: Some(alias),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        match &mut self {
            TableRef::Table { alias: a, .. }
            | TableRef::Derived { alias: a, .. }
            | TableRef::Unnest { alias: a, .. } => *a = Some(TableAlias::new(alias)),
        }
        self
    }

    pub fn alias(&self) -> Option<&TableAlias> {
        match self {
            TableRef::Table { alias, .. }
            | TableRef::Derived { alias, .. }
            | TableRef::Unnest { alias, .. } => alias.as_ref(),
        }
    }

    /// The name outer expressions use to refer to this relation: the alias
    /// if present, otherwise the last part of a table name.
    pub fn reference_name(&self) -> Option<&str> {
        if let Some(alias) = self.alias() {
            return Some(&alias.name);
        }
        match self {
            TableRef::Table { name, .. } => name.last().map(String::as_str),
            _ => None,
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = TokenStream::new();
        let alias = match self {
            TableRef::Table { name, alias } => {
                for (i, part) in name.iter().enumerate() {
                    if i > 0 {
                        ts.push(Token::Dot);
                    }
                    ts.push(Token::Ident(part.clone()));
                }
                alias
            }
            TableRef::Derived { subquery, alias } => {
                ts.lparen();
                ts.append(&subquery.to_tokens(dialect)?);
                ts.rparen();
                alias
            }
            TableRef::Unnest { exprs, alias } => {
                if !dialect.supports_unnest() {
                    return Err(dialect.unsupported("UNNEST"));
                }
                ts.push(Token::Unnest).lparen();
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&expr.to_tokens(dialect)?);
                }
                ts.rparen();
                alias
            }
        };
        if let Some(alias) = alias {
            ts.space().append(&alias.to_tokens());
        }
        Ok(ts)
    }
}

// =============================================================================
// Joins
// =============================================================================

/// JOIN type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// Join condition.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
    None,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub relation: TableRef,
    pub constraint: JoinConstraint,
}

impl Join {
    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner).space().push(Token::Join),
            JoinType::Left => ts.push(Token::Left).space().push(Token::Join),
            JoinType::Right => ts.push(Token::Right).space().push(Token::Join),
            JoinType::Full => {
                if !dialect.supports_full_outer_join() {
                    return Err(dialect.unsupported("FULL OUTER JOIN"));
                }
                ts.push(Token::Full)
                    .space()
                    .push(Token::Outer)
                    .space()
                    .push(Token::Join)
            }
            JoinType::Cross => ts.push(Token::Cross).space().push(Token::Join),
        };

        ts.space().append(&self.relation.to_tokens(dialect)?);

        match &self.constraint {
            JoinConstraint::On(on) => {
                ts.space()
                    .push(Token::On)
                    .space()
                    .append(&on.to_tokens(dialect)?);
            }
            JoinConstraint::Using(columns) => {
                ts.space().push(Token::Using).space().lparen();
                push_ident_list(&mut ts, columns);
                ts.rparen();
            }
            JoinConstraint::None => {}
        }

        Ok(ts)
    }
}

/// A FROM item: a relation followed by its joins.
#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub relation: TableRef,
    pub joins: Vec<Join>,
}

impl TableWithJoins {
    pub fn new(relation: TableRef) -> Self {
        Self {
            relation,
            joins: vec![],
        }
    }

    fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = self.relation.to_tokens(dialect)?;
        for join in &self.joins {
            ts.space().append(&join.to_tokens(dialect)?);
        }
        Ok(ts)
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: Option<SortDir>,
    pub nulls: Option<NullsOrder>,
}

impl OrderByExpr {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            dir: None,
            nulls: None,
        }
    }

    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Asc),
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: Some(SortDir::Desc),
            nulls: None,
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = self.expr.to_tokens(dialect)?;
        if let Some(dir) = self.dir {
            ts.space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }
        if let Some(nulls) = self.nulls {
            ts.space().push(match nulls {
                NullsOrder::First => Token::NullsFirst,
                NullsOrder::Last => Token::NullsLast,
            });
        }
        Ok(ts)
    }
}

// =============================================================================
// SELECT
// =============================================================================

/// A single SELECT block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub projection: Vec<SelectExpr>,
    pub from: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
}

impl Select {
    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = TokenStream::new();

        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }
        for (i, item) in self.projection.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.space().append(&item.to_tokens(dialect)?);
        }

        if !self.from.is_empty() {
            ts.space().push(Token::From);
            for (i, item) in self.from.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.space().append(&item.to_tokens(dialect)?);
            }
        }

        if let Some(selection) = &self.selection {
            ts.space()
                .push(Token::Where)
                .space()
                .append(&selection.to_tokens(dialect)?);
        }

        if !self.group_by.is_empty() {
            ts.space().push(Token::GroupBy);
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.space().append(&expr.to_tokens(dialect)?);
            }
        }

        if let Some(having) = &self.having {
            ts.space()
                .push(Token::Having)
                .space()
                .append(&having.to_tokens(dialect)?);
        }

        Ok(ts)
    }
}

// =============================================================================
// Set Operations
// =============================================================================

/// Set operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

/// Query body.
#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    Select(Box<Select>),
    SetOperation {
        op: SetOperator,
        all: bool,
        left: Box<SetExpr>,
        right: Box<SetExpr>,
    },
    /// Parenthesized query used as a set operand.
    Query(Box<Query>),
}

impl SetExpr {
    /// The leftmost SELECT, whose projection names the body's columns.
    pub fn leftmost_select(&self) -> Option<&Select> {
        match self {
            SetExpr::Select(select) => Some(select),
            SetExpr::SetOperation { left, .. } => left.leftmost_select(),
            SetExpr::Query(query) => query.body.leftmost_select(),
        }
    }

    pub fn leftmost_select_mut(&mut self) -> Option<&mut Select> {
        match self {
            SetExpr::Select(select) => Some(select),
            SetExpr::SetOperation { left, .. } => left.leftmost_select_mut(),
            SetExpr::Query(query) => query.body.leftmost_select_mut(),
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        match self {
            SetExpr::Select(select) => select.to_tokens(dialect),
            SetExpr::SetOperation {
                op,
                all,
                left,
                right,
            } => {
                let mut ts = TokenStream::new();
                ts.append(&set_operand_tokens(left, dialect)?);
                ts.space().push(match op {
                    SetOperator::Union => Token::Union,
                    SetOperator::Intersect => Token::Intersect,
                    SetOperator::Except => Token::Except,
                });
                if *all {
                    ts.space().push(Token::All);
                } else if dialect == Dialect::BigQuery {
                    // BigQuery requires an explicit quantifier.
                    ts.space().push(Token::Distinct);
                }
                ts.space().append(&set_operand_tokens(right, dialect)?);
                Ok(ts)
            }
            SetExpr::Query(query) => query.to_tokens(dialect),
        }
    }
}

/// Each side of a set operation is wrapped so precedence never depends on
/// the dialect. SQLite rejects parenthesized operands, so there a side must
/// be a bare SELECT or another set operation.
fn set_operand_tokens(side: &SetExpr, dialect: Dialect) -> EmitResult<TokenStream> {
    if dialect != Dialect::Sqlite {
        let mut ts = TokenStream::new();
        ts.lparen().append(&side.to_tokens(dialect)?).rparen();
        return Ok(ts);
    }
    match side {
        SetExpr::Query(query)
            if !query.ctes.is_empty()
                || !query.order_by.is_empty()
                || query.limit.is_some()
                || query.offset.is_some() =>
        {
            Err(dialect.unsupported("ORDER BY or LIMIT inside a compound SELECT operand"))
        }
        SetExpr::Query(query) => set_operand_tokens(&query.body, dialect),
        other => other.to_tokens(dialect),
    }
}

// =============================================================================
// CTE (Common Table Expression)
// =============================================================================

/// A Common Table Expression (WITH clause).
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub query: Box<Query>,
}

impl Cte {
    pub fn new(name: &str, query: Query) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            query: Box::new(query),
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// `name [(cols)] AS (query)`. The body is always parenthesized.
    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()));

        if !self.columns.is_empty() {
            ts.space().lparen();
            push_ident_list(&mut ts, &self.columns);
            ts.rparen();
        }

        ts.space()
            .push(Token::As)
            .space()
            .lparen()
            .append(&self.query.to_tokens(dialect)?)
            .rparen();

        Ok(ts)
    }
}

// =============================================================================
// Query
// =============================================================================

/// A complete query statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub ctes: Vec<Cte>,
    pub recursive: bool,
    pub body: SetExpr,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

impl Default for Query {
    fn default() -> Self {
        Self::from_select(Select::default())
    }
}

impl Query {
    /// Create a new empty SELECT query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a SELECT block.
    pub fn from_select(select: Select) -> Self {
        Self {
            ctes: vec![],
            recursive: false,
            body: SetExpr::Select(Box::new(select)),
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    /// Combine two queries with a set operator.
    pub fn set_operation(op: SetOperator, all: bool, left: Query, right: Query) -> Self {
        Self {
            body: SetExpr::SetOperation {
                op,
                all,
                left: Box::new(SetExpr::Query(Box::new(left))),
                right: Box::new(SetExpr::Query(Box::new(right))),
            },
            ..Self::new()
        }
    }

    fn select_mut(&mut self) -> &mut Select {
        if !matches!(self.body, SetExpr::Select(_)) {
            let inner = std::mem::replace(self, Query::new());
            self.body = SetExpr::Select(Box::new(Select {
                projection: vec![SelectExpr::new(super::expr::star())],
                from: vec![TableWithJoins::new(TableRef::Derived {
                    subquery: Box::new(inner),
                    alias: None,
                })],
                ..Select::default()
            }));
        }
        match &mut self.body {
            SetExpr::Select(select) => select,
            _ => unreachable!("body was just replaced by a SELECT"),
        }
    }

    /// Add a CTE (WITH clause).
    pub fn with_cte(mut self, cte: Cte) -> Self {
        self.ctes.push(cte);
        self
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select_mut().projection = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Add DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.select_mut().distinct = true;
        self
    }

    /// Add a FROM item.
    pub fn from(mut self, table: TableRef) -> Self {
        self.select_mut().from.push(TableWithJoins::new(table));
        self
    }

    /// Add a JOIN to the last FROM item.
    pub fn join(mut self, join_type: JoinType, table: TableRef, constraint: JoinConstraint) -> Self {
        let join = Join {
            join_type,
            relation: table,
            constraint,
        };
        let select = self.select_mut();
        match select.from.last_mut() {
            Some(item) => item.joins.push(join),
            None => select.from.push(TableWithJoins::new(join.relation)),
        }
        self
    }

    /// Add an INNER JOIN.
    pub fn inner_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Inner, table, JoinConstraint::On(on))
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Left, table, JoinConstraint::On(on))
    }

    /// Add a WHERE condition (ANDed with existing conditions).
    pub fn filter(mut self, condition: Expr) -> Self {
        let select = self.select_mut();
        select.selection = Some(match select.selection.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Set the GROUP BY clause.
    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.select_mut().group_by = exprs;
        self
    }

    /// Set the HAVING clause.
    pub fn having(mut self, condition: Expr) -> Self {
        self.select_mut().having = Some(condition);
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(Expr::from(limit as i64));
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(Expr::from(offset as i64));
        self
    }

    /// Convert to token stream for a specific dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = TokenStream::new();

        // WITH clause
        if !self.ctes.is_empty() {
            ts.push(Token::With);
            if self.recursive {
                ts.space().push(Token::Recursive);
            }
            for (i, cte) in self.ctes.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.space().append(&cte.to_tokens(dialect)?);
            }
            ts.space();
        }

        ts.append(&self.body.to_tokens(dialect)?);

        if !self.order_by.is_empty() {
            ts.space().push(Token::OrderBy);
            for (i, ob) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.space().append(&ob.to_tokens(dialect)?);
            }
        }

        if let Some(limit) = &self.limit {
            ts.space()
                .push(Token::Limit)
                .space()
                .append(&limit.to_tokens(dialect)?);
        }

        if let Some(offset) = &self.offset {
            if self.limit.is_none() && dialect == Dialect::Sqlite {
                // SQLite only accepts OFFSET after a LIMIT.
                ts.space()
                    .push(Token::Limit)
                    .space()
                    .push(Token::Minus)
                    .push(Token::LitInt(1));
            }
            ts.space()
                .push(Token::Offset)
                .space()
                .append(&offset.to_tokens(dialect)?);
        }

        Ok(ts)
    }

    /// Render to SQL for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> EmitResult<String> {
        Ok(self.to_tokens(dialect)?.serialize(dialect))
    }
}

fn push_ident_list(ts: &mut TokenStream, names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.push(Token::Ident(name.clone()));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::error::EmitError;
    use crate::sql::expr::{col, func, lit_int, table_col};

    #[test]
    fn test_simple_select() {
        let q = Query::new()
            .select(vec![col("id"), col("name")])
            .from(TableRef::new("users"));
        assert_eq!(
            q.to_sql(Dialect::Postgres).unwrap(),
            "SELECT \"id\", \"name\" FROM \"users\""
        );
    }

    #[test]
    fn test_clause_order() {
        let q = Query::new()
            .select(vec![col("region").into(), func("SUM", vec![col("amount")]).alias("total")])
            .from(TableRef::new("orders").with_alias("o"))
            .filter(col("status").eq("paid"))
            .group_by(vec![col("region")])
            .having(func("SUM", vec![col("amount")]).gt(100))
            .order_by(vec![OrderByExpr::desc(col("total"))])
            .limit(10)
            .offset(5);
        assert_eq!(
            q.to_sql(Dialect::DuckDb).unwrap(),
            "SELECT \"region\", SUM(\"amount\") AS \"total\" FROM \"orders\" AS \"o\" \
             WHERE \"status\" = 'paid' GROUP BY \"region\" HAVING SUM(\"amount\") > 100 \
             ORDER BY \"total\" DESC LIMIT 10 OFFSET 5"
        );
    }

    #[test]
    fn test_join_variants() {
        let q = Query::new()
            .select(vec![col("a")])
            .from(TableRef::new("t1"))
            .left_join(TableRef::new("t2"), table_col("t1", "id").eq(table_col("t2", "id")))
            .join(
                JoinType::Inner,
                TableRef::new("t3"),
                JoinConstraint::Using(vec!["id".into()]),
            );
        assert_eq!(
            q.to_sql(Dialect::Postgres).unwrap(),
            "SELECT \"a\" FROM \"t1\" LEFT JOIN \"t2\" ON \"t1\".\"id\" = \"t2\".\"id\" \
             INNER JOIN \"t3\" USING (\"id\")"
        );
    }

    #[test]
    fn test_full_join_rejected_on_sqlite() {
        let q = Query::new()
            .select(vec![col("a")])
            .from(TableRef::new("t1"))
            .join(
                JoinType::Full,
                TableRef::new("t2"),
                JoinConstraint::On(col("x").eq(col("y"))),
            );
        assert!(q.to_sql(Dialect::Postgres).unwrap().contains("FULL OUTER JOIN"));
        assert!(matches!(
            q.to_sql(Dialect::Sqlite),
            Err(EmitError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_cte_body_is_parenthesized() {
        let inner = Query::new().select(vec![lit_int(1)]);
        let q = Query::new()
            .with_cte(Cte::new("x", inner).with_columns(&["n"]))
            .select(vec![col("n")])
            .from(TableRef::new("x"));
        assert_eq!(
            q.to_sql(Dialect::BigQuery).unwrap(),
            "WITH `x` (`n`) AS (SELECT 1) SELECT `n` FROM `x`"
        );
    }

    #[test]
    fn test_set_operation() {
        let left = Query::new().select(vec![col("a")]).from(TableRef::new("t1"));
        let right = Query::new().select(vec![col("a")]).from(TableRef::new("t2"));
        let q = Query::set_operation(SetOperator::Union, true, left.clone(), right.clone());
        assert_eq!(
            q.to_sql(Dialect::DuckDb).unwrap(),
            "(SELECT \"a\" FROM \"t1\") UNION ALL (SELECT \"a\" FROM \"t2\")"
        );
        let q = Query::set_operation(SetOperator::Union, false, left, right);
        assert_eq!(
            q.to_sql(Dialect::BigQuery).unwrap(),
            "(SELECT `a` FROM `t1`) UNION DISTINCT (SELECT `a` FROM `t2`)"
        );
        assert_eq!(
            q.to_sql(Dialect::Sqlite).unwrap(),
            "SELECT \"a\" FROM \"t1\" UNION SELECT \"a\" FROM \"t2\""
        );
    }

    #[test]
    fn test_derived_table_with_column_aliases() {
        let inner = Query::new().select(vec![lit_int(1), lit_int(2)]);
        let q = Query::new()
            .select(vec![col("a")])
            .from(TableRef::derived(inner, TableAlias::new("t").with_columns(&["a", "b"])));
        assert_eq!(
            q.to_sql(Dialect::DuckDb).unwrap(),
            "SELECT \"a\" FROM (SELECT 1, 2) AS \"t\"(\"a\", \"b\")"
        );
    }

    #[test]
    fn test_unnest_support() {
        let q = Query::new().select(vec![col("x")]).from(TableRef::Unnest {
            exprs: vec![col("arr")],
            alias: Some(TableAlias::new("x")),
        });
        assert_eq!(
            q.to_sql(Dialect::BigQuery).unwrap(),
            "SELECT `x` FROM UNNEST(`arr`) AS `x`"
        );
        assert!(q.to_sql(Dialect::Snowflake).is_err());
    }

    #[test]
    fn test_reference_name() {
        let t = TableRef::qualified(&["proj", "ds", "orders"]);
        assert_eq!(t.reference_name(), Some("orders"));
        assert_eq!(t.with_alias("o").reference_name(), Some("o"));
    }

    #[test]
    fn test_sqlite_offset_without_limit() {
        let q = Query::new().select(vec![col("a")]).from(TableRef::new("t")).offset(3);
        assert_eq!(
            q.to_sql(Dialect::Sqlite).unwrap(),
            "SELECT \"a\" FROM \"t\" LIMIT -1 OFFSET 3"
        );
    }
}
