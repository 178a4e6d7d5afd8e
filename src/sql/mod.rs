//! SQL generation module.
//!
//! This module holds the canonical query tree and everything that moves
//! SQL text in and out of it:
//!
//! - [`parser`] - SQL text → canonical tree (via sqlparser-rs)
//! - [`query`] - Query, SELECT, relations, joins
//! - [`expr`] - Expression AST and builder DSL
//! - [`types`] - Canonical scalar types and data types
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`error`] - Emission errors

pub mod dialect;
pub mod error;
pub mod expr;
pub mod parser;
pub mod query;
pub mod token;
pub mod types;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use error::{EmitError, EmitResult};
pub use expr::{
    cast, col, count_star, func, lit_bool, lit_float, lit_int, lit_null, lit_str, star,
    table_col, BinaryOperator, Expr, ExprExt, Literal, NullsOrder, SortDir, UnaryOperator,
};
pub use parser::{parse_query, ParseError, ParseResult};
pub use query::{
    Cte, Join, JoinConstraint, JoinType, OrderByExpr, Query, Select, SelectExpr, SetExpr,
    SetOperator, TableAlias, TableRef, TableWithJoins,
};
pub use token::{Token, TokenStream};
pub use types::{CanonicalType, DataType};
