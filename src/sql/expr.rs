//! Expression AST - the core of the canonical query tree.
//!
//! This module provides a strongly-typed AST for SQL expressions
//! with exhaustive pattern matching enforced by the compiler.
//! Rendering is fallible: a construct the target dialect cannot
//! express aborts emission instead of producing approximate SQL.

use super::dialect::{ArrayIndexStyle, ArrayLiteralStyle, DateTruncStyle, Dialect, SqlDialect};
use super::error::{EmitError, EmitResult};
use super::query::Query;
use super::token::{Token, TokenStream};
use super::types::DataType;

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: `a.b.c.column`. The qualifier may be empty.
    Column {
        qualifier: Vec<String>,
        name: String,
    },

    /// Literal values
    Literal(Literal),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation: op expr
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// Niladic function written without parentheses: `CURRENT_TIMESTAMP`.
    Keyword(String),

    /// CASE WHEN... THEN... ELSE... END
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// Scalar subquery: (SELECT ...)
    Subquery(Box<Query>),

    /// [NOT] EXISTS (SELECT ...)
    Exists { subquery: Box<Query>, negated: bool },

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// IN subquery: expr IN (SELECT ...)
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Query>,
        negated: bool,
    },

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// expr [NOT] LIKE pattern
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },

    /// CAST(expr AS type)
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },

    /// Array element access. The index is 1-based.
    ArrayIndex { array: Box<Expr>, index: Box<Expr> },

    /// Array constructor.
    Array(Vec<Expr>),

    /// Wildcard: * or qualifier.*
    Star { qualifier: Vec<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// A construct the canonical tree has no node for.
    ///
    /// Kept so a parsed statement can still be inspected and rewritten;
    /// emitting it always fails.
    Unsupported(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    /// Exact numeric kept as written (too wide for i64, or has a fraction
    /// the source wrote as a decimal).
    Decimal(String),
    String(String),
    Bool(bool),
    Null,
    /// Bind parameter placeholder, kept verbatim.
    Placeholder(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    // String
    Concat,
}

impl BinaryOperator {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Gt
            | BinaryOperator::Lte
            | BinaryOperator::Gte => 4,
            BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Concat => 5,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => 6,
        }
    }

    fn is_associative(self) -> bool {
        matches!(
            self,
            BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::Plus
                | BinaryOperator::Mul
                | BinaryOperator::Concat
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}

/// Sort direction (shared with query ORDER BY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// NULLS ordering (shared with query ORDER BY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Binding strength used to decide where parentheses are required.
    fn precedence(&self) -> u8 {
        match self {
            Expr::BinaryOp { op, .. } => op.precedence(),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                ..
            } => 3,
            Expr::In { .. }
            | Expr::InSubquery { .. }
            | Expr::Between { .. }
            | Expr::IsNull { .. }
            | Expr::Like { .. } => 4,
            _ => u8::MAX,
        }
    }

    /// Convert this expression to a token stream for a dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> EmitResult<TokenStream> {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { qualifier, name } => {
                for part in qualifier {
                    ts.push(Token::Ident(part.clone())).push(Token::Dot);
                }
                ts.push(Token::Ident(name.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(literal_token(lit)?);
            }

            Expr::BinaryOp { left, op, right } => {
                let prec = op.precedence();
                let left_parens = left.precedence() < prec;
                let right_parens = right.precedence() < prec
                    || (right.precedence() == prec && !op.is_associative());
                append_operand(&mut ts, left, left_parens, dialect)?;
                ts.space().push(binary_op_to_token(*op)).space();
                append_operand(&mut ts, right, right_parens, dialect)?;
            }

            Expr::UnaryOp { op, expr } => match op {
                UnaryOperator::Not => {
                    ts.push(Token::Not).space();
                    append_operand(&mut ts, expr, expr.precedence() < 3, dialect)?;
                }
                UnaryOperator::Minus => {
                    ts.push(Token::Minus);
                    append_operand(&mut ts, expr, expr.precedence() != u8::MAX, dialect)?;
                }
            },

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                let upper = name.to_uppercase();
                if upper == "SINGLE_VALUE" {
                    return single_value_tokens(args, *distinct, dialect);
                }
                if upper == "DATE_TRUNC"
                    && dialect.date_trunc_style() == DateTruncStyle::UnitLastBareWord
                {
                    return date_trunc_unit_last_tokens(args, dialect);
                }
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                append_list(&mut ts, args, dialect)?;
                ts.rparen();
            }

            Expr::Keyword(word) => {
                let bare = !word.is_empty()
                    && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !bare {
                    return Err(dialect.unsupported(format!("keyword {}", word)));
                }
                ts.push(Token::BareIdent(word.to_uppercase()));
            }

            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                ts.push(Token::Case);
                if let Some(op) = operand {
                    ts.space().append(&op.to_tokens(dialect)?);
                }
                for (when, then) in when_clauses {
                    ts.space().push(Token::When).space();
                    ts.append(&when.to_tokens(dialect)?);
                    ts.space().push(Token::Then).space();
                    ts.append(&then.to_tokens(dialect)?);
                }
                if let Some(else_expr) = else_clause {
                    ts.space().push(Token::Else).space();
                    ts.append(&else_expr.to_tokens(dialect)?);
                }
                ts.space().push(Token::End);
            }

            Expr::Subquery(query) => {
                ts.lparen();
                ts.append(&query.to_tokens(dialect)?);
                ts.rparen();
            }

            Expr::Exists { subquery, negated } => {
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::Exists).space().lparen();
                ts.append(&subquery.to_tokens(dialect)?);
                ts.rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // "x IN ()" is invalid SQL: it is FALSE, and NOT IN () is TRUE.
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    append_operand(&mut ts, expr, expr.precedence() <= 4, dialect)?;
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    append_list(&mut ts, values, dialect)?;
                    ts.rparen();
                }
            }

            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                append_operand(&mut ts, expr, expr.precedence() <= 4, dialect)?;
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::In).space().lparen();
                ts.append(&subquery.to_tokens(dialect)?);
                ts.rparen();
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                append_operand(&mut ts, expr, expr.precedence() <= 4, dialect)?;
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::Between).space();
                append_operand(&mut ts, low, low.precedence() <= 4, dialect)?;
                ts.space().push(Token::And).space();
                append_operand(&mut ts, high, high.precedence() <= 4, dialect)?;
            }

            Expr::IsNull { expr, negated } => {
                append_operand(&mut ts, expr, expr.precedence() <= 4, dialect)?;
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Like {
                expr,
                pattern,
                negated,
            } => {
                append_operand(&mut ts, expr, expr.precedence() <= 4, dialect)?;
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::Like).space();
                append_operand(&mut ts, pattern, pattern.precedence() <= 4, dialect)?;
            }

            Expr::Cast { expr, data_type } => {
                let type_name = dialect.emit_data_type(data_type)?;
                ts.push(Token::Cast).lparen();
                ts.append(&expr.to_tokens(dialect)?);
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::TypeName(type_name))
                    .rparen();
            }

            Expr::ArrayIndex { array, index } => {
                let style = dialect.array_index_style();
                if style == ArrayIndexStyle::Unsupported {
                    return Err(dialect.unsupported("array element access"));
                }
                append_operand(&mut ts, array, array.precedence() != u8::MAX, dialect)?;
                ts.push(Token::LBracket);
                match style {
                    ArrayIndexStyle::OneBasedBracket => {
                        ts.append(&index.to_tokens(dialect)?);
                    }
                    ArrayIndexStyle::Ordinal => {
                        ts.push(Token::FunctionName("ORDINAL".into())).lparen();
                        ts.append(&index.to_tokens(dialect)?);
                        ts.rparen();
                    }
                    ArrayIndexStyle::ZeroBasedBracket => match index.as_ref() {
                        Expr::Literal(Literal::Int(n)) => {
                            ts.push(Token::LitInt(n - 1));
                        }
                        other => {
                            ts.lparen().append(&other.to_tokens(dialect)?).rparen();
                            ts.space().push(Token::Minus).space().push(Token::LitInt(1));
                        }
                    },
                    ArrayIndexStyle::Unsupported => unreachable!("rejected above"),
                }
                ts.push(Token::RBracket);
            }

            Expr::Array(items) => match dialect.array_literal_style() {
                ArrayLiteralStyle::Bracket => {
                    ts.push(Token::LBracket);
                    append_list(&mut ts, items, dialect)?;
                    ts.push(Token::RBracket);
                }
                ArrayLiteralStyle::ArrayKeyword => {
                    ts.push(Token::Array).push(Token::LBracket);
                    append_list(&mut ts, items, dialect)?;
                    ts.push(Token::RBracket);
                }
                ArrayLiteralStyle::Function(name) => {
                    ts.push(Token::FunctionName(name.into())).lparen();
                    append_list(&mut ts, items, dialect)?;
                    ts.rparen();
                }
                ArrayLiteralStyle::Unsupported => {
                    return Err(dialect.unsupported("array constructors"));
                }
            },

            Expr::Star { qualifier } => {
                for part in qualifier {
                    ts.push(Token::Ident(part.clone())).push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens(dialect)?);
                ts.rparen();
            }

            Expr::Unsupported(detail) => {
                return Err(dialect.unsupported(detail.clone()));
            }
        }

        Ok(ts)
    }

    /// Render this expression as a SQL string.
    pub fn to_sql(&self, dialect: Dialect) -> EmitResult<String> {
        Ok(self.to_tokens(dialect)?.serialize(dialect))
    }

    /// The last qualifier part of a column reference, if any.
    pub fn column_qualifier(&self) -> Option<&str> {
        match self {
            Expr::Column { qualifier, .. } => qualifier.last().map(String::as_str),
            _ => None,
        }
    }
}

fn literal_token(lit: &Literal) -> EmitResult<Token> {
    Ok(match lit {
        Literal::Int(n) => Token::LitInt(*n),
        Literal::Float(f) => {
            if !f.is_finite() {
                return Err(EmitError::NonFiniteFloat(f.to_string()));
            }
            Token::LitFloat(*f)
        }
        Literal::Decimal(text) => Token::LitDecimal(text.clone()),
        Literal::String(s) => Token::LitString(s.clone()),
        Literal::Bool(b) => Token::LitBool(*b),
        Literal::Null => Token::LitNull,
        Literal::Placeholder(p) => Token::Placeholder(p.clone()),
    })
}

fn append_operand(
    ts: &mut TokenStream,
    expr: &Expr,
    parens: bool,
    dialect: Dialect,
) -> EmitResult<()> {
    if parens {
        ts.lparen().append(&expr.to_tokens(dialect)?).rparen();
    } else {
        ts.append(&expr.to_tokens(dialect)?);
    }
    Ok(())
}

fn append_list(ts: &mut TokenStream, exprs: &[Expr], dialect: Dialect) -> EmitResult<()> {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(&expr.to_tokens(dialect)?);
    }
    Ok(())
}

/// `SINGLE_VALUE(x)` has no native counterpart; it becomes a CASE on the
/// group's row count so a group of more than one row yields NULL.
fn single_value_tokens(args: &[Expr], distinct: bool, dialect: Dialect) -> EmitResult<TokenStream> {
    let [arg] = args else {
        return Err(EmitError::InvalidCall {
            function: "SINGLE_VALUE".into(),
            detail: format!("expected 1 argument, got {}", args.len()),
        });
    };
    if distinct {
        return Err(EmitError::InvalidCall {
            function: "SINGLE_VALUE".into(),
            detail: "DISTINCT is not allowed".into(),
        });
    }
    let rewritten = Expr::Case {
        operand: Some(Box::new(count_star())),
        when_clauses: vec![
            (lit_int(0), lit_null()),
            (lit_int(1), func(dialect.single_value_builtin(), vec![arg.clone()])),
        ],
        else_clause: Some(Box::new(lit_null())),
    };
    rewritten.to_tokens(dialect)
}

/// `DATE_TRUNC('month', x)` rendered as `DATE_TRUNC(x, MONTH)`.
fn date_trunc_unit_last_tokens(args: &[Expr], dialect: Dialect) -> EmitResult<TokenStream> {
    let invalid = |detail: String| EmitError::InvalidCall {
        function: "DATE_TRUNC".into(),
        detail,
    };
    let [unit, operand] = args else {
        return Err(invalid(format!("expected 2 arguments, got {}", args.len())));
    };
    let Expr::Literal(Literal::String(unit)) = unit else {
        return Err(invalid("date part must be a string literal".into()));
    };
    if unit.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return Err(invalid(format!("'{}' is not a date part", unit)));
    }

    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("DATE_TRUNC".into())).lparen();
    ts.append(&operand.to_tokens(dialect)?);
    ts.comma()
        .space()
        .push(Token::BareIdent(unit.to_uppercase()))
        .rparen();
    Ok(ts)
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Plus => Token::Plus,
        BinaryOperator::Minus => Token::Minus,
        BinaryOperator::Mul => Token::Mul,
        BinaryOperator::Div => Token::Div,
        BinaryOperator::Mod => Token::Mod,
        BinaryOperator::Concat => Token::Concat,
    }
}

// =============================================================================
// Conjunctions
// =============================================================================

/// Split a predicate on its top-level ANDs.
pub fn split_conjunction(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            let mut parts = split_conjunction(*left);
            parts.extend(split_conjunction(*right));
            parts
        }
        other => vec![other],
    }
}

/// AND a list of predicates back together. Empty input yields `None`.
pub fn conjunction(exprs: Vec<Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(|acc, e| acc.and(e))
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        qualifier: vec![],
        name: name.into(),
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        qualifier: vec![table.into()],
        name: column.into(),
    }
}

/// Create an integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// Create a float literal.
pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

/// Create a string literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// Create a boolean literal.
pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

/// Create a NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Create a star (*) expression.
pub fn star() -> Expr {
    Expr::Star { qualifier: vec![] }
}

/// COUNT(*)
pub fn count_star() -> Expr {
    func("COUNT", vec![star()])
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

/// CAST(expr AS data_type)
pub fn cast(expr: Expr, data_type: DataType) -> Expr {
    Expr::Cast {
        expr: Box::new(expr),
        data_type,
    }
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn binary(self, op: BinaryOperator, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op,
            right: Box::new(other.into()),
        }
    }

    // Comparison operators
    fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Ne, other)
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gt, other)
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lt, other)
    }

    // Logical operators
    fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Or, other)
    }

    fn not(self) -> Expr {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self.into_expr()),
        }
    }

    // Arithmetic operators
    fn add(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Plus, other)
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Minus, other)
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: false,
        }
    }

    fn index(self, i: impl Into<Expr>) -> Expr {
        Expr::ArrayIndex {
            array: Box::new(self.into_expr()),
            index: Box::new(i.into()),
        }
    }

    /// Alias this expression (for SELECT list).
    fn alias(self, name: &str) -> super::query::SelectExpr {
        super::query::SelectExpr {
            expr: self.into_expr(),
            alias: Some(name.into()),
        }
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        lit_float(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

impl From<Query> for Expr {
    fn from(query: Query) -> Self {
        Expr::Subquery(Box::new(query))
    }
}

// =============================================================================
// Tests
// =============================================================================
