//! SQL text → canonical query tree.
//!
//! `sqlparser` is the parsing frontend; this module lowers its AST into
//! [`Query`]. Unquoted identifiers are folded the way the source backend
//! resolves them; quoted ones are kept verbatim. Constructs the canonical
//! tree has no node for are kept as [`Expr::Unsupported`] so parsing
//! succeeds and emission fails with a precise message. Statement-level
//! shapes that are not queries are rejected here.

use sqlparser::ast as sp;
use sqlparser::dialect::{
    BigQueryDialect, DuckDbDialect, PostgreSqlDialect, SQLiteDialect, SnowflakeDialect,
};
use sqlparser::parser::{Parser as SqlParser, ParserError};
use thiserror::Error;

use super::dialect::{Dialect, SqlDialect};
use super::expr::{BinaryOperator, Expr, Literal, NullsOrder, SortDir, UnaryOperator};
use super::query::{
    Cte, Join, JoinConstraint, JoinType, OrderByExpr, Query, Select, SelectExpr, SetExpr,
    SetOperator, TableAlias, TableRef, TableWithJoins,
};
use super::types::DataType;

/// Errors that can occur while parsing a query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("SQL syntax error: {0}")]
    Syntax(#[from] ParserError),

    #[error("Expected exactly 1 statement, found {0}")]
    StatementCount(usize),

    #[error("Only queries can be compiled, got: {0}")]
    NotAQuery(String),

    #[error("Unsupported SQL feature: {0}")]
    Unsupported(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Date parts BigQuery accepts as the bare second argument of `DATE_TRUNC`.
const DATE_PARTS: &[&str] = &[
    "MICROSECOND",
    "MILLISECOND",
    "SECOND",
    "MINUTE",
    "HOUR",
    "DAY",
    "WEEK",
    "ISOWEEK",
    "MONTH",
    "QUARTER",
    "YEAR",
    "ISOYEAR",
];

/// Parse a single query written in `dialect`.
pub fn parse_query(sql: &str, dialect: Dialect) -> ParseResult<Query> {
    let mut statements = match dialect {
        Dialect::DuckDb => SqlParser::parse_sql(&DuckDbDialect {}, sql)?,
        Dialect::Postgres => SqlParser::parse_sql(&PostgreSqlDialect {}, sql)?,
        Dialect::Snowflake => SqlParser::parse_sql(&SnowflakeDialect {}, sql)?,
        Dialect::BigQuery => SqlParser::parse_sql(&BigQueryDialect {}, sql)?,
        Dialect::Sqlite => SqlParser::parse_sql(&SQLiteDialect {}, sql)?,
    };
    if statements.len() != 1 {
        return Err(ParseError::StatementCount(statements.len()));
    }
    match statements.remove(0) {
        sp::Statement::Query(q) => Lowering { dialect }.query(*q),
        other => Err(ParseError::NotAQuery(other.to_string())),
    }
}

struct Lowering {
    dialect: Dialect,
}

impl Lowering {
    fn query(&self, query: sp::Query) -> ParseResult<Query> {
        if query.fetch.is_some() {
            return Err(ParseError::Unsupported("FETCH".into()));
        }
        if !query.limit_by.is_empty() {
            return Err(ParseError::Unsupported("LIMIT BY".into()));
        }
        if !query.locks.is_empty() {
            return Err(ParseError::Unsupported("locking clause".into()));
        }

        let (ctes, recursive) = match query.with {
            Some(with) => {
                let ctes = with
                    .cte_tables
                    .into_iter()
                    .map(|cte| self.cte(cte))
                    .collect::<ParseResult<Vec<_>>>()?;
                (ctes, with.recursive)
            }
            None => (vec![], false),
        };

        let order_by = query
            .order_by
            .map(|ob| ob.exprs)
            .unwrap_or_default()
            .into_iter()
            .map(|o| self.order_by(o))
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Query {
            ctes,
            recursive,
            body: self.set_expr(*query.body)?,
            order_by,
            limit: query.limit.map(|l| self.expr(l)).transpose()?,
            offset: query.offset.map(|o| self.expr(o.value)).transpose()?,
        })
    }

    fn cte(&self, cte: sp::Cte) -> ParseResult<Cte> {
        Ok(Cte {
            name: self.ident(cte.alias.name),
            columns: cte
                .alias
                .columns
                .into_iter()
                .map(|c| self.ident(c.name))
                .collect(),
            query: Box::new(self.query(*cte.query)?),
        })
    }

    fn order_by(&self, order: sp::OrderByExpr) -> ParseResult<OrderByExpr> {
        Ok(OrderByExpr {
            expr: self.expr(order.expr)?,
            dir: order
                .asc
                .map(|asc| if asc { SortDir::Asc } else { SortDir::Desc }),
            nulls: order.nulls_first.map(|first| {
                if first {
                    NullsOrder::First
                } else {
                    NullsOrder::Last
                }
            }),
        })
    }

    fn set_expr(&self, expr: sp::SetExpr) -> ParseResult<SetExpr> {
        match expr {
            sp::SetExpr::Select(select) => Ok(SetExpr::Select(Box::new(self.select(*select)?))),
            sp::SetExpr::Query(query) => Ok(SetExpr::Query(Box::new(self.query(*query)?))),
            sp::SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
                ..
            } => {
                let all = match set_quantifier {
                    sp::SetQuantifier::All => true,
                    sp::SetQuantifier::Distinct | sp::SetQuantifier::None => false,
                    other => {
                        return Err(ParseError::Unsupported(format!(
                            "set quantifier {}",
                            other
                        )))
                    }
                };
                let op = match op {
                    sp::SetOperator::Union => SetOperator::Union,
                    sp::SetOperator::Intersect => SetOperator::Intersect,
                    sp::SetOperator::Except => SetOperator::Except,
                    #[allow(unreachable_patterns)]
                    other => return Err(ParseError::Unsupported(format!("set operator {}", other))),
                };
                Ok(SetExpr::SetOperation {
                    op,
                    all,
                    left: Box::new(self.set_expr(*left)?),
                    right: Box::new(self.set_expr(*right)?),
                })
            }
            other => Err(ParseError::Unsupported(other.to_string())),
        }
    }

    fn select(&self, select: sp::Select) -> ParseResult<Select> {
        let distinct = match select.distinct {
            None => false,
            Some(sp::Distinct::Distinct) => true,
            Some(sp::Distinct::On(_)) => {
                return Err(ParseError::Unsupported("DISTINCT ON".into()))
            }
        };
        if select.qualify.is_some() {
            return Err(ParseError::Unsupported("QUALIFY".into()));
        }
        if select.top.is_some() {
            return Err(ParseError::Unsupported("TOP".into()));
        }
        if select.into.is_some() {
            return Err(ParseError::Unsupported("SELECT INTO".into()));
        }

        let projection = select
            .projection
            .into_iter()
            .map(|item| self.select_item(item))
            .collect::<ParseResult<Vec<_>>>()?;

        let from = select
            .from
            .into_iter()
            .map(|twj| self.table_with_joins(twj))
            .collect::<ParseResult<Vec<_>>>()?;

        let group_by = match select.group_by {
            sp::GroupByExpr::Expressions(exprs, modifiers) => {
                if !modifiers.is_empty() {
                    return Err(ParseError::Unsupported("GROUP BY modifiers".into()));
                }
                exprs
                    .into_iter()
                    .map(|e| self.expr(e))
                    .collect::<ParseResult<Vec<_>>>()?
            }
            sp::GroupByExpr::All(_) => {
                return Err(ParseError::Unsupported("GROUP BY ALL".into()))
            }
        };

        Ok(Select {
            distinct,
            projection,
            from,
            selection: select.selection.map(|e| self.expr(e)).transpose()?,
            group_by,
            having: select.having.map(|e| self.expr(e)).transpose()?,
        })
    }

    fn select_item(&self, item: sp::SelectItem) -> ParseResult<SelectExpr> {
        match item {
            sp::SelectItem::UnnamedExpr(expr) => Ok(SelectExpr::new(self.expr(expr)?)),
            sp::SelectItem::ExprWithAlias { expr, alias } => Ok(SelectExpr {
                expr: self.expr(expr)?,
                alias: Some(self.ident(alias)),
            }),
            sp::SelectItem::Wildcard(_) => Ok(SelectExpr::new(Expr::Star { qualifier: vec![] })),
            sp::SelectItem::QualifiedWildcard(name, _) => Ok(SelectExpr::new(Expr::Star {
                qualifier: self.idents(name.0),
            })),
        }
    }

    fn table_with_joins(&self, twj: sp::TableWithJoins) -> ParseResult<TableWithJoins> {
        Ok(TableWithJoins {
            relation: self.table_factor(twj.relation)?,
            joins: twj
                .joins
                .into_iter()
                .map(|j| self.join(j))
                .collect::<ParseResult<Vec<_>>>()?,
        })
    }

    fn table_alias(&self, alias: Option<sp::TableAlias>) -> Option<TableAlias> {
        alias.map(|a| TableAlias {
            name: self.ident(a.name),
            columns: a.columns.into_iter().map(|c| self.ident(c.name)).collect(),
        })
    }

    fn table_factor(&self, tf: sp::TableFactor) -> ParseResult<TableRef> {
        match tf {
            sp::TableFactor::Table {
                name, alias, args, ..
            } => {
                if args.is_some() {
                    return Err(ParseError::Unsupported(format!(
                        "table function {}",
                        name
                    )));
                }
                Ok(TableRef::Table {
                    name: self.idents(name.0),
                    alias: self.table_alias(alias),
                })
            }
            sp::TableFactor::Derived {
                lateral,
                subquery,
                alias,
                ..
            } => {
                if lateral {
                    return Err(ParseError::Unsupported("LATERAL".into()));
                }
                Ok(TableRef::Derived {
                    subquery: Box::new(self.query(*subquery)?),
                    alias: self.table_alias(alias),
                })
            }
            sp::TableFactor::UNNEST {
                alias,
                array_exprs,
                with_offset,
                with_ordinality,
                ..
            } => {
                if with_offset || with_ordinality {
                    return Err(ParseError::Unsupported("UNNEST WITH OFFSET".into()));
                }
                Ok(TableRef::Unnest {
                    exprs: array_exprs
                        .into_iter()
                        .map(|e| self.expr(e))
                        .collect::<ParseResult<Vec<_>>>()?,
                    alias: self.table_alias(alias),
                })
            }
            other => Err(ParseError::Unsupported(other.to_string())),
        }
    }

    fn join(&self, join: sp::Join) -> ParseResult<Join> {
        let (join_type, constraint) = match join.join_operator {
            sp::JoinOperator::Inner(c) => (JoinType::Inner, c),
            sp::JoinOperator::LeftOuter(c) => (JoinType::Left, c),
            sp::JoinOperator::RightOuter(c) => (JoinType::Right, c),
            sp::JoinOperator::FullOuter(c) => (JoinType::Full, c),
            sp::JoinOperator::CrossJoin => (JoinType::Cross, sp::JoinConstraint::None),
            other => return Err(ParseError::Unsupported(format!("{:?}", other))),
        };
        let constraint = match constraint {
            sp::JoinConstraint::On(expr) => JoinConstraint::On(self.expr(expr)?),
            sp::JoinConstraint::Using(cols) => {
                JoinConstraint::Using(self.idents(cols))
            }
            sp::JoinConstraint::None => JoinConstraint::None,
            sp::JoinConstraint::Natural => {
                return Err(ParseError::Unsupported("NATURAL JOIN".into()))
            }
        };
        Ok(Join {
            join_type,
            relation: self.table_factor(join.relation)?,
            constraint,
        })
    }

    /// Resolve an identifier the way the source backend would.
    fn ident(&self, ident: sp::Ident) -> String {
        match ident.quote_style {
            Some(_) => ident.value,
            None => self.dialect.fold_unquoted(&ident.value),
        }
    }

    fn idents(&self, parts: Vec<sp::Ident>) -> Vec<String> {
        parts.into_iter().map(|p| self.ident(p)).collect()
    }

    fn exprs(&self, exprs: Vec<sp::Expr>) -> ParseResult<Vec<Expr>> {
        exprs.into_iter().map(|e| self.expr(e)).collect()
    }

    fn boxed(&self, expr: sp::Expr) -> ParseResult<Box<Expr>> {
        Ok(Box::new(self.expr(expr)?))
    }

    fn expr(&self, expr: sp::Expr) -> ParseResult<Expr> {
        Ok(match expr {
            sp::Expr::Identifier(ident) => Expr::Column {
                qualifier: vec![],
                name: self.ident(ident),
            },
            sp::Expr::CompoundIdentifier(parts) => {
                let mut names = self.idents(parts);
                let name = names.pop().unwrap_or_default();
                Expr::Column {
                    qualifier: names,
                    name,
                }
            }
            sp::Expr::Value(value) => Expr::Literal(literal(value)?),
            sp::Expr::BinaryOp { left, op, right } => match binary_op(&op) {
                Some(op) => Expr::BinaryOp {
                    left: self.boxed(*left)?,
                    op,
                    right: self.boxed(*right)?,
                },
                None => Expr::Unsupported(format!("operator {}", op)),
            },
            sp::Expr::UnaryOp { op, expr } => match op {
                sp::UnaryOperator::Not => Expr::UnaryOp {
                    op: UnaryOperator::Not,
                    expr: self.boxed(*expr)?,
                },
                sp::UnaryOperator::Minus => Expr::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: self.boxed(*expr)?,
                },
                sp::UnaryOperator::Plus => self.expr(*expr)?,
                other => Expr::Unsupported(format!("operator {}", other)),
            },
            sp::Expr::Nested(inner) => Expr::Paren(self.boxed(*inner)?),
            sp::Expr::Function(func) => self.function(func)?,
            sp::Expr::Case {
                operand,
                conditions,
                results,
                else_result,
                ..
            } => Expr::Case {
                operand: operand.map(|o| self.boxed(*o)).transpose()?,
                when_clauses: conditions
                    .into_iter()
                    .zip(results)
                    .map(|(c, r)| Ok((self.expr(c)?, self.expr(r)?)))
                    .collect::<ParseResult<Vec<_>>>()?,
                else_clause: else_result.map(|e| self.boxed(*e)).transpose()?,
            },
            sp::Expr::Subquery(q) => Expr::Subquery(Box::new(self.query(*q)?)),
            sp::Expr::Exists { subquery, negated } => Expr::Exists {
                subquery: Box::new(self.query(*subquery)?),
                negated,
            },
            sp::Expr::InList {
                expr,
                list,
                negated,
            } => Expr::In {
                expr: self.boxed(*expr)?,
                values: self.exprs(list)?,
                negated,
            },
            sp::Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => Expr::InSubquery {
                expr: self.boxed(*expr)?,
                subquery: Box::new(self.query(*subquery)?),
                negated,
            },
            sp::Expr::Between {
                expr,
                negated,
                low,
                high,
            } => Expr::Between {
                expr: self.boxed(*expr)?,
                low: self.boxed(*low)?,
                high: self.boxed(*high)?,
                negated,
            },
            sp::Expr::IsNull(expr) => Expr::IsNull {
                expr: self.boxed(*expr)?,
                negated: false,
            },
            sp::Expr::IsNotNull(expr) => Expr::IsNull {
                expr: self.boxed(*expr)?,
                negated: true,
            },
            sp::Expr::Like {
                negated,
                expr,
                pattern,
                escape_char,
                ..
            } => {
                if escape_char.is_some() {
                    Expr::Unsupported("LIKE ... ESCAPE".into())
                } else {
                    Expr::Like {
                        expr: self.boxed(*expr)?,
                        pattern: self.boxed(*pattern)?,
                        negated,
                    }
                }
            }
            sp::Expr::Cast {
                kind,
                expr,
                data_type,
                format,
            } => match kind {
                sp::CastKind::Cast | sp::CastKind::DoubleColon if format.is_none() => Expr::Cast {
                    expr: self.boxed(*expr)?,
                    data_type: DataType::parse(&data_type.to_string()),
                },
                _ => Expr::Unsupported(format!("{:?} conversion", kind)),
            },
            sp::Expr::Array(array) => Expr::Array(self.exprs(array.elem)?),
            sp::Expr::Subscript { expr, subscript } => match *subscript {
                sp::Subscript::Index { index } => Expr::ArrayIndex {
                    array: self.boxed(*expr)?,
                    index: self.boxed(index)?,
                },
                slice => Expr::Unsupported(format!("array slice [{}]", slice)),
            },
            other => Expr::Unsupported(other.to_string()),
        })
    }

    fn function(&self, func: sp::Function) -> ParseResult<Expr> {
        let name = func.name.to_string();
        if func.over.is_some() {
            return Ok(Expr::Unsupported(format!("window function {}", name)));
        }
        if func.filter.is_some() || !func.within_group.is_empty() {
            return Ok(Expr::Unsupported(format!("aggregate clauses on {}", name)));
        }

        let (args, distinct) = match func.args {
            sp::FunctionArguments::None => return Ok(Expr::Keyword(name)),
            sp::FunctionArguments::Subquery(q) => {
                (vec![Expr::Subquery(Box::new(self.query(*q)?))], false)
            }
            sp::FunctionArguments::List(list) => {
                if !list.clauses.is_empty() {
                    return Ok(Expr::Unsupported(format!("argument clauses on {}", name)));
                }
                let distinct = matches!(
                    list.duplicate_treatment,
                    Some(sp::DuplicateTreatment::Distinct)
                );
                let mut args = Vec::with_capacity(list.args.len());
                for arg in list.args {
                    args.push(match arg {
                        sp::FunctionArg::Unnamed(sp::FunctionArgExpr::Expr(e)) => self.expr(e)?,
                        sp::FunctionArg::Unnamed(sp::FunctionArgExpr::Wildcard) => {
                            Expr::Star { qualifier: vec![] }
                        }
                        sp::FunctionArg::Unnamed(sp::FunctionArgExpr::QualifiedWildcard(q)) => {
                            Expr::Star {
                                qualifier: self.idents(q.0),
                            }
                        }
                        other => Expr::Unsupported(format!("named argument {}", other)),
                    });
                }
                (args, distinct)
            }
        };

        Ok(self.normalize_call(Expr::Function {
            name,
            args,
            distinct,
        }))
    }

    /// Bring dialect-specific call shapes into the canonical form.
    ///
    /// BigQuery writes `DATE_TRUNC(x, MONTH)`; the canonical tree always
    /// holds `DATE_TRUNC('month', x)`.
    fn normalize_call(&self, call: Expr) -> Expr {
        let Expr::Function {
            name,
            mut args,
            distinct,
        } = call
        else {
            return call;
        };
        if self.dialect == Dialect::BigQuery && name.eq_ignore_ascii_case("DATE_TRUNC") {
            if let [_, Expr::Column { qualifier, name: part }] = args.as_slice() {
                let upper = part.to_uppercase();
                if qualifier.is_empty() && DATE_PARTS.contains(&upper.as_str()) {
                    let unit = Expr::Literal(Literal::String(upper.to_lowercase()));
                    args.pop();
                    args.insert(0, unit);
                }
            }
        }
        Expr::Function {
            name,
            args,
            distinct,
        }
    }
}

fn literal(value: sp::Value) -> ParseResult<Literal> {
    Ok(match value {
        sp::Value::Null => Literal::Null,
        sp::Value::Boolean(b) => Literal::Bool(b),
        sp::Value::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Literal::Int(i)
            } else if n.contains(['e', 'E']) {
                match n.parse::<f64>() {
                    Ok(f) => Literal::Float(f),
                    Err(_) => return Err(ParseError::Unsupported(format!("number {}", n))),
                }
            } else {
                Literal::Decimal(n)
            }
        }
        sp::Value::SingleQuotedString(s) => Literal::String(s),
        sp::Value::DoubleQuotedString(s) => Literal::String(s),
        sp::Value::Placeholder(p) => Literal::Placeholder(p),
        other => return Err(ParseError::Unsupported(format!("literal {}", other))),
    })
}

fn binary_op(op: &sp::BinaryOperator) -> Option<BinaryOperator> {
    Some(match op {
        sp::BinaryOperator::Eq => BinaryOperator::Eq,
        sp::BinaryOperator::NotEq => BinaryOperator::Ne,
        sp::BinaryOperator::Lt => BinaryOperator::Lt,
        sp::BinaryOperator::LtEq => BinaryOperator::Lte,
        sp::BinaryOperator::Gt => BinaryOperator::Gt,
        sp::BinaryOperator::GtEq => BinaryOperator::Gte,
        sp::BinaryOperator::And => BinaryOperator::And,
        sp::BinaryOperator::Or => BinaryOperator::Or,
        sp::BinaryOperator::Plus => BinaryOperator::Plus,
        sp::BinaryOperator::Minus => BinaryOperator::Minus,
        sp::BinaryOperator::Multiply => BinaryOperator::Mul,
        sp::BinaryOperator::Divide => BinaryOperator::Div,
        sp::BinaryOperator::Modulo => BinaryOperator::Mod,
        sp::BinaryOperator::StringConcat => BinaryOperator::Concat,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{col, lit_int, lit_str, table_col, ExprExt};
    use crate::sql::types::CanonicalType;

    fn select_of(query: &Query) -> &Select {
        match &query.body {
            SetExpr::Select(select) => select,
            other => panic!("expected SELECT, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_select() {
        let q = parse_query("SELECT a, b AS c FROM t WHERE a = 1", Dialect::DuckDb).unwrap();
        let select = select_of(&q);
        assert_eq!(select.projection.len(), 2);
        assert_eq!(select.projection[1].alias.as_deref(), Some("c"));
        assert_eq!(select.selection, Some(col("a").eq(lit_int(1))));
        assert_eq!(select.from[0].relation, TableRef::new("t"));
    }

    #[test]
    fn test_parse_multi_part_names() {
        let q = parse_query(
            "SELECT t.x FROM `proj`.`ds`.`t`",
            Dialect::BigQuery,
        )
        .unwrap();
        let select = select_of(&q);
        assert_eq!(
            select.from[0].relation,
            TableRef::qualified(&["proj", "ds", "t"])
        );
    }

    #[test]
    fn test_parse_rejects_non_query() {
        let err = parse_query("DELETE FROM t", Dialect::Postgres).unwrap_err();
        assert!(matches!(err, ParseError::NotAQuery(_)));
        let err = parse_query("SELECT 1; SELECT 2", Dialect::Postgres).unwrap_err();
        assert_eq!(err, ParseError::StatementCount(2));
    }

    #[test]
    fn test_parse_cast_and_double_colon() {
        let q = parse_query("SELECT CAST(a AS INTEGER), b::varchar FROM t", Dialect::Postgres)
            .unwrap();
        let select = select_of(&q);
        assert_eq!(
            select.projection[0].expr,
            Expr::Cast {
                expr: Box::new(col("a")),
                data_type: DataType::Scalar(CanonicalType::Int32),
            }
        );
        assert!(matches!(select.projection[1].expr, Expr::Cast { .. }));
    }

    #[test]
    fn test_parse_large_number_as_decimal() {
        let q = parse_query("SELECT 123456789012345678901234, 1.5", Dialect::DuckDb).unwrap();
        let select = select_of(&q);
        assert_eq!(
            select.projection[0].expr,
            Expr::Literal(Literal::Decimal("123456789012345678901234".into()))
        );
        assert_eq!(
            select.projection[1].expr,
            Expr::Literal(Literal::Decimal("1.5".into()))
        );
    }

    #[test]
    fn test_window_function_is_unsupported_node() {
        let q = parse_query("SELECT ROW_NUMBER() OVER (ORDER BY a) FROM t", Dialect::DuckDb)
            .unwrap();
        assert!(matches!(
            select_of(&q).projection[0].expr,
            Expr::Unsupported(_)
        ));
    }

    #[test]
    fn test_parse_exists_and_join() {
        let q = parse_query(
            "SELECT o.id FROM orders o LEFT JOIN customers c ON o.cid = c.id \
             WHERE EXISTS (SELECT 1 FROM items i WHERE i.oid = o.id)",
            Dialect::Postgres,
        )
        .unwrap();
        let select = select_of(&q);
        assert_eq!(select.from[0].joins.len(), 1);
        assert_eq!(select.from[0].joins[0].join_type, JoinType::Left);
        assert_eq!(
            select.from[0].joins[0].constraint,
            JoinConstraint::On(table_col("o", "cid").eq(table_col("c", "id")))
        );
        assert!(matches!(
            select.selection,
            Some(Expr::Exists { negated: false, .. })
        ));
    }

    #[test]
    fn test_parse_array_subscript() {
        let q = parse_query("SELECT arr[2] FROM t", Dialect::DuckDb).unwrap();
        assert_eq!(select_of(&q).projection[0].expr, col("arr").index(2));
    }

    #[test]
    fn test_bigquery_date_trunc_is_canonicalized() {
        let q = parse_query("SELECT DATE_TRUNC(created_at, MONTH) FROM t", Dialect::BigQuery)
            .unwrap();
        assert_eq!(
            select_of(&q).projection[0].expr,
            Expr::Function {
                name: "DATE_TRUNC".into(),
                args: vec![lit_str("month"), col("created_at")],
                distinct: false,
            }
        );
    }

    #[test]
    fn test_parse_cte_and_set_operation() {
        let q = parse_query(
            "WITH x (n) AS (SELECT 1) SELECT n FROM x UNION ALL SELECT 2",
            Dialect::DuckDb,
        )
        .unwrap();
        assert_eq!(q.ctes.len(), 1);
        assert_eq!(q.ctes[0].columns, vec!["n".to_string()]);
        assert!(matches!(
            q.body,
            SetExpr::SetOperation {
                op: SetOperator::Union,
                all: true,
                ..
            }
        ));
    }

    #[test]
    fn test_unquoted_identifiers_fold_per_dialect() {
        let q = parse_query("SELECT UserId, \"MixedCase\" FROM Users", Dialect::Postgres).unwrap();
        let select = select_of(&q);
        assert_eq!(select.projection[0].expr, col("userid"));
        assert_eq!(select.projection[1].expr, col("MixedCase"));
        assert_eq!(select.from[0].relation, TableRef::new("users"));

        let q = parse_query("SELECT u.id AS n FROM users u", Dialect::Snowflake).unwrap();
        let select = select_of(&q);
        assert_eq!(select.projection[0].expr, table_col("U", "ID"));
        assert_eq!(select.projection[0].alias.as_deref(), Some("N"));
        assert_eq!(
            select.from[0].relation,
            TableRef::Table {
                name: vec!["USERS".into()],
                alias: Some(TableAlias {
                    name: "U".into(),
                    columns: vec![],
                }),
            }
        );
    }

    #[test]
    fn test_cte_names_fold_like_tables() {
        let q = parse_query("WITH Recent (Id) AS (SELECT 1) SELECT Id FROM Recent", Dialect::DuckDb)
            .unwrap();
        assert_eq!(q.ctes[0].name, "recent");
        assert_eq!(q.ctes[0].columns, vec!["id".to_string()]);
        assert_eq!(select_of(&q).from[0].relation, TableRef::new("recent"));
    }

    #[test]
    fn test_niladic_keyword_is_not_a_call() {
        let q = parse_query("SELECT CURRENT_TIMESTAMP, CURRENT_DATE, now()", Dialect::Postgres)
            .unwrap();
        let select = select_of(&q);
        assert_eq!(
            select.projection[0].expr,
            Expr::Keyword("CURRENT_TIMESTAMP".into())
        );
        assert_eq!(select.projection[1].expr, Expr::Keyword("CURRENT_DATE".into()));
        assert!(matches!(
            &select.projection[2].expr,
            Expr::Function { args, .. } if args.is_empty()
        ));
    }

    #[test]
    fn test_array_slice_is_unsupported_node() {
        let q = parse_query("SELECT arr[1:2] FROM t", Dialect::Postgres).unwrap();
        assert!(matches!(
            select_of(&q).projection[0].expr,
            Expr::Unsupported(_)
        ));
    }
}
