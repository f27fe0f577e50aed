//! Filter expressions
//!
//! Parses textual filters into a filter mapping. Supported syntax:
//! - `score > 90`
//! - `name == 'Alice'`, `name ^= 'A'` (starts with)
//! - `score > 90 AND name != 'Bob'`
//! - `(age >= 18) OR (age IS NULL)`
//! - `value IS NULL`, `value IS NOT NULL`
//!
//! A filter mapping holds one predicate per column, so `compile_filters`
//! splits the expression on its top-level `AND`s and requires each remaining
//! term to reference a single column. Terms on the same column are combined
//! with `AND`.
//!
//! ```
//! use tableview::{compile_filters, CellValue};
//!
//! let filters = compile_filters("id > 2 AND name ^= 'A'").unwrap();
//! let id = filters.get("id").unwrap();
//! let name = filters.get("name").unwrap();
//!
//! assert!(id(&CellValue::Int(3)));
//! assert!(!name(&CellValue::from("Bo")));
//! ```

use crate::error::ViewError;
use crate::mapping::Filters;
use crate::value::CellValue;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A parsed expression that can be evaluated against a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Compare column to a literal value
    Compare {
        column: String,
        op: CompareOp,
        value: CellValue,
    },
    /// Check if column is NULL
    IsNull { column: String },
    /// Check if column is NOT NULL
    IsNotNull { column: String },
    /// Logical AND of two expressions
    And(Box<Expr>, Box<Expr>),
    /// Logical OR of two expressions
    Or(Box<Expr>, Box<Expr>),
    /// Logical NOT of an expression
    Not(Box<Expr>),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    Eq,         // ==
    Ne,         // !=
    Lt,         // <
    Le,         // <=
    Gt,         // >
    Ge,         // >=
    StartsWith, // ^=
}

/// Token types for lexing
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    // Operators
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    StartsWith,
    And,
    Or,
    Not,
    Is,
    LParen,
    RParen,
    Eof,
}

/// Lexer for tokenizing expression strings
struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.advance();
        }
    }

    fn read_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    fn read_number(&mut self, negative: bool) -> Result<Token, ViewError> {
        let mut num_str = String::new();
        if negative {
            num_str.push('-');
        }
        let mut is_float = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
            } else if c == '.' && !is_float {
                is_float = true;
                num_str.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if is_float {
            num_str
                .parse()
                .map(Token::Float)
                .map_err(|_| ViewError::parse(format!("invalid number '{}'", num_str)))
        } else {
            num_str
                .parse()
                .map(Token::Int)
                .map_err(|_| ViewError::parse(format!("invalid number '{}'", num_str)))
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, ViewError> {
        self.advance(); // opening quote
        let mut s = String::new();

        while let Some(c) = self.advance() {
            if c == quote {
                return Ok(Token::String(s));
            }
            if c == '\\' {
                match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(escaped) => s.push(escaped),
                    None => break,
                }
            } else {
                s.push(c);
            }
        }

        Err(ViewError::parse("unterminated string"))
    }

    /// Consume the current char; return `two` if `=` follows, else `one`.
    fn with_eq(&mut self, one: Token, two: Token) -> Token {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            two
        } else {
            one
        }
    }

    fn next_token(&mut self) -> Result<Token, ViewError> {
        self.skip_whitespace();

        let c = match self.peek() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        match c {
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            // A single `=` also means `==`
            '=' => Ok(self.with_eq(Token::Eq, Token::Eq)),
            '!' => Ok(self.with_eq(Token::Not, Token::Ne)),
            '<' => Ok(self.with_eq(Token::Lt, Token::Le)),
            '>' => Ok(self.with_eq(Token::Gt, Token::Ge)),
            '^' if self.peek_next() == Some('=') => {
                self.pos += 2;
                Ok(Token::StartsWith)
            }
            '\'' | '"' => self.read_string(c),
            '-' if self.peek_next().map_or(false, |n| n.is_ascii_digit() || n == '.') => {
                self.advance();
                self.read_number(true)
            }
            _ if c.is_ascii_digit() => self.read_number(false),
            _ if c.is_alphabetic() || c == '_' => {
                let ident = self.read_ident();
                Ok(match ident.to_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    "IS" => Token::Is,
                    "NULL" => Token::Null,
                    "TRUE" => Token::Bool(true),
                    "FALSE" => Token::Bool(false),
                    _ => Token::Ident(ident),
                })
            }
            _ => Err(ViewError::parse(format!("unexpected character '{}'", c))),
        }
    }
}

/// Recursive-descent parser: OR < AND < NOT < comparison
struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    fn new(input: &str) -> Result<Self, ViewError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ViewError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ViewError> {
        if &self.current == expected {
            self.advance()
        } else {
            Err(ViewError::parse(format!("expected {:?}, got {:?}", expected, self.current)))
        }
    }

    fn parse(&mut self) -> Result<Expr, ViewError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ViewError> {
        let mut left = self.parse_and()?;
        while self.current == Token::Or {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ViewError> {
        let mut left = self.parse_not()?;
        while self.current == Token::And {
            self.advance()?;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ViewError> {
        if self.current == Token::Not {
            self.advance()?;
            let expr = self.parse_not()?;
            Ok(Expr::Not(Box::new(expr)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ViewError> {
        if self.current == Token::LParen {
            self.advance()?;
            let expr = self.parse()?;
            self.expect(&Token::RParen)?;
            return Ok(expr);
        }

        let column = match &self.current {
            Token::Ident(name) => name.clone(),
            other => return Err(ViewError::parse(format!("expected column name, got {:?}", other))),
        };
        self.advance()?;

        if self.current == Token::Is {
            self.advance()?;
            let negated = self.current == Token::Not;
            if negated {
                self.advance()?;
            }
            self.expect(&Token::Null)?;
            return Ok(if negated {
                Expr::IsNotNull { column }
            } else {
                Expr::IsNull { column }
            });
        }

        let op = match &self.current {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            Token::StartsWith => CompareOp::StartsWith,
            other => return Err(ViewError::parse(format!("expected comparison operator, got {:?}", other))),
        };
        self.advance()?;

        let value = match &self.current {
            Token::Int(n) => CellValue::Int(*n),
            Token::Float(f) => CellValue::Float(*f),
            Token::String(s) => CellValue::String(s.clone()),
            Token::Bool(b) => CellValue::Bool(*b),
            Token::Null => CellValue::Null,
            other => return Err(ViewError::parse(format!("expected literal value, got {:?}", other))),
        };
        self.advance()?;

        Ok(Expr::Compare { column, op, value })
    }
}

/// Parse an expression string into an Expr AST.
pub fn parse_expr(input: &str) -> Result<Expr, ViewError> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse()?;

    if parser.current != Token::Eof {
        return Err(ViewError::parse(format!("unexpected token after expression: {:?}", parser.current)));
    }

    Ok(expr)
}

impl Expr {
    /// Evaluate against a row, reading columns through `lookup`.
    pub fn eval<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> CellValue,
    {
        match self {
            Expr::Compare { column, op, value } => compare_values(&lookup(column), *op, value),
            Expr::IsNull { column } => lookup(column).is_null(),
            Expr::IsNotNull { column } => !lookup(column).is_null(),
            Expr::And(left, right) => left.eval(lookup) && right.eval(lookup),
            Expr::Or(left, right) => left.eval(lookup) || right.eval(lookup),
            Expr::Not(inner) => !inner.eval(lookup),
        }
    }

    /// Evaluate a single-column expression against that column's value.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            Expr::Compare { op, value: literal, .. } => compare_values(value, *op, literal),
            Expr::IsNull { .. } => value.is_null(),
            Expr::IsNotNull { .. } => !value.is_null(),
            Expr::And(left, right) => left.matches(value) && right.matches(value),
            Expr::Or(left, right) => left.matches(value) || right.matches(value),
            Expr::Not(inner) => !inner.matches(value),
        }
    }

    /// All column names referenced, sorted and deduplicated.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns.sort();
        columns.dedup();
        columns
    }

    fn collect_columns(&self, columns: &mut Vec<String>) {
        match self {
            Expr::Compare { column, .. } | Expr::IsNull { column } | Expr::IsNotNull { column } => {
                columns.push(column.clone())
            }
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_columns(columns);
                right.collect_columns(columns);
            }
            Expr::Not(inner) => inner.collect_columns(columns),
        }
    }

    /// Split on top-level ANDs.
    fn conjuncts(self, terms: &mut Vec<Expr>) {
        match self {
            Expr::And(left, right) => {
                left.conjuncts(terms);
                right.conjuncts(terms);
            }
            other => terms.push(other),
        }
    }
}

/// Compare a cell value to a literal. Any comparison involving NULL is
/// false; use IS NULL / IS NOT NULL to test for nulls. Mismatched kinds are
/// false.
fn compare_values(cell: &CellValue, op: CompareOp, literal: &CellValue) -> bool {
    match (cell, literal) {
        (CellValue::Null, _) | (_, CellValue::Null) => false,
        (CellValue::Int(a), CellValue::Int(b)) => compare_ord(a, b, op),
        (CellValue::String(a), CellValue::String(b)) => match op {
            CompareOp::StartsWith => a.starts_with(b.as_str()),
            _ => compare_ord(a.as_str(), b.as_str(), op),
        },
        (CellValue::Bool(a), CellValue::Bool(b)) => match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            _ => false,
        },
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => compare_ord(x, y, op),
            _ => false,
        },
    }
}

fn compare_ord<T: PartialOrd>(a: T, b: T, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Le => a <= b,
        CompareOp::Gt => a > b,
        CompareOp::Ge => a >= b,
        CompareOp::StartsWith => false,
    }
}

/// Compile an expression into one predicate per column.
pub fn compile_filters(input: &str) -> Result<Filters, ViewError> {
    let mut terms = Vec::new();
    parse_expr(input)?.conjuncts(&mut terms);

    let mut by_column: BTreeMap<String, Vec<Expr>> = BTreeMap::new();
    for term in terms {
        let mut columns = term.columns();
        if columns.len() != 1 {
            return Err(ViewError::CrossColumn { columns });
        }
        by_column.entry(columns.remove(0)).or_default().push(term);
    }

    let mut filters = Filters::new();
    for (column, terms) in by_column {
        let terms = Rc::new(terms);
        filters.insert(column, Rc::new(move |value: &CellValue| terms.iter().all(|t| t.matches(value))));
    }
    Ok(filters)
}
