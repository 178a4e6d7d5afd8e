//! Emission tokens.
//!
//! The emitter never concatenates SQL text directly. Expressions and queries
//! lower to a [`TokenStream`], and only the stream knows how to print itself
//! for a dialect. Keywords, punctuation and operators are fixed text; the
//! dynamic variants (identifiers, literals, function names) consult the
//! dialect.

use std::fmt::Write as _;

use super::dialect::{Dialect, SqlDialect};

/// One element of emitted SQL.
///
/// Adding a variant forces every `match` below to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Using,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    NullsFirst,
    NullsLast,
    Limit,
    Offset,
    Case,
    When,
    Then,
    Else,
    End,
    In,
    Between,
    Like,
    IsNull,
    IsNotNull,
    Distinct,
    All,
    Union,
    Intersect,
    Except,
    With,
    Recursive,
    Exists,
    Cast,
    Unnest,
    Array,
    True,
    False,

    // Punctuation
    Comma,
    Dot,
    Star,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // Operators
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    /// String concatenation; spelled by the dialect.
    Concat,

    Space,

    /// Table, column or alias name. Always quoted.
    Ident(String),
    /// A plain word printed as is, such as a date part (`MONTH`).
    ///
    /// Callers check the content is a single word of ASCII letters, digits or `_`.
    BareIdent(String),
    LitInt(i64),
    /// Must be finite; the expression layer rejects NaN and infinities.
    LitFloat(f64),
    /// Exact numeric kept as the source wrote it.
    LitDecimal(String),
    LitString(String),
    LitBool(bool),
    LitNull,
    /// Bind parameter (`?`, `$1`, `@name`).
    Placeholder(String),
    /// Type already rendered by [`SqlDialect::emit_data_type`].
    TypeName(String),
    /// Upper-cased and remapped through [`SqlDialect::remap_function`].
    FunctionName(String),
}

impl Token {
    /// The fixed text of a keyword, punctuation mark or operator.
    ///
    /// `None` for tokens whose text depends on content or dialect.
    pub fn fixed_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Select => "SELECT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::As => "AS",
            Token::On => "ON",
            Token::Using => "USING",
            Token::Join => "JOIN",
            Token::Inner => "INNER",
            Token::Left => "LEFT",
            Token::Right => "RIGHT",
            Token::Full => "FULL",
            Token::Outer => "OUTER",
            Token::Cross => "CROSS",
            Token::GroupBy => "GROUP BY",
            Token::Having => "HAVING",
            Token::OrderBy => "ORDER BY",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            Token::NullsFirst => "NULLS FIRST",
            Token::NullsLast => "NULLS LAST",
            Token::Limit => "LIMIT",
            Token::Offset => "OFFSET",
            Token::Case => "CASE",
            Token::When => "WHEN",
            Token::Then => "THEN",
            Token::Else => "ELSE",
            Token::End => "END",
            Token::In => "IN",
            Token::Between => "BETWEEN",
            Token::Like => "LIKE",
            Token::IsNull => "IS NULL",
            Token::IsNotNull => "IS NOT NULL",
            Token::Distinct => "DISTINCT",
            Token::All => "ALL",
            Token::Union => "UNION",
            Token::Intersect => "INTERSECT",
            Token::Except => "EXCEPT",
            Token::With => "WITH",
            Token::Recursive => "RECURSIVE",
            Token::Exists => "EXISTS",
            Token::Cast => "CAST",
            Token::Unnest => "UNNEST",
            Token::Array => "ARRAY",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::LitNull => "NULL",

            Token::Comma => ",",
            Token::Dot => ".",
            Token::Star | Token::Mul => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",

            Token::Eq => "=",
            Token::Ne => "<>",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lte => "<=",
            Token::Gte => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Div => "/",
            Token::Mod => "%",

            Token::Space => " ",

            Token::Concat
            | Token::Ident(_)
            | Token::BareIdent(_)
            | Token::LitInt(_)
            | Token::LitFloat(_)
            | Token::LitDecimal(_)
            | Token::LitString(_)
            | Token::LitBool(_)
            | Token::Placeholder(_)
            | Token::TypeName(_)
            | Token::FunctionName(_) => return None,
        };
        Some(text)
    }

    /// Append this token's text for `dialect` to `out`.
    pub fn write_to(&self, out: &mut String, dialect: Dialect) {
        if let Some(text) = self.fixed_text() {
            out.push_str(text);
            return;
        }
        match self {
            Token::Concat => out.push_str(dialect.concat_operator()),
            Token::Ident(name) => out.push_str(&dialect.quote_identifier(name)),
            Token::LitString(s) => out.push_str(&dialect.quote_string(s)),
            Token::LitBool(b) => out.push_str(dialect.format_bool(*b)),
            Token::LitInt(n) => {
                let _ = write!(out, "{n}");
            }
            Token::LitFloat(f) => out.push_str(ryu::Buffer::new().format(*f)),
            Token::BareIdent(text)
            | Token::LitDecimal(text)
            | Token::Placeholder(text)
            | Token::TypeName(text) => out.push_str(text),
            Token::FunctionName(name) => {
                let name = dialect.remap_function(name).unwrap_or(name.as_str());
                out.push_str(&name.to_uppercase());
            }
            _ => {}
        }
    }

    /// This token's text for `dialect`.
    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write_to(&mut out, dialect);
        out
    }
}

/// Tokens in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend_from_slice(&other.tokens);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Print the whole stream into one buffer.
    pub fn serialize(&self, dialect: Dialect) -> String {
        let mut out = String::with_capacity(self.tokens.len() * 6);
        for token in &self.tokens {
            token.write_to(&mut out, dialect);
        }
        out
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
