use std::{collections::VecDeque, fmt::Display, str::FromStr};

use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{
    Consts, CreateInstance, CreateStmt, Domain, DomainRef, Expression, FieldDef, Operation, Param,
    RangeDef, RecordDef, Statement, UnaryOp,
};
use crate::sql::parser::lexer::{Keyword, Lexer, Token, TokenKind};

pub mod ast;
pub mod lexer;

/// Deepest expression nesting accepted, counted both as parser recursion and
/// as the height of the finished expression tree
const MAX_NESTING: usize = 256;

/// Magnitude of `i64::MIN`, only valid directly behind a unary minus
const I64_MIN_MAGNITUDE: &str = "9223372036854775808";

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq)]
enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// Expression operators known to the precedence table
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Or,
    And,
    Not,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    NotEqual,
    Equal,
    In,
    NotIn,
    Is,
    IsNot,
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    /// `.name`
    Attr,
    /// `:name`
    Field,
    /// `(params)`
    Call,
}

/// Binding levels from lowest to highest. An operator's level is its index + 1.
static PRECEDENCE: &[(Assoc, &[Operator])] = &[
    (Assoc::Left, &[Operator::Or]),
    (Assoc::Left, &[Operator::And]),
    (Assoc::Right, &[Operator::Not]),
    (
        Assoc::NonAssoc,
        &[
            Operator::Less,
            Operator::LessEqual,
            Operator::Greater,
            Operator::GreaterEqual,
            Operator::NotEqual,
            Operator::Equal,
        ],
    ),
    (
        Assoc::Left,
        &[Operator::In, Operator::NotIn, Operator::Is, Operator::IsNot],
    ),
    (Assoc::Left, &[Operator::Add, Operator::Subtract]),
    (Assoc::Left, &[Operator::Multiply, Operator::Divide]),
    (Assoc::Right, &[Operator::Negate]),
    (Assoc::Left, &[Operator::Attr, Operator::Field, Operator::Call]),
];

impl Operator {
    /// Maps a token in infix/postfix position to its operator
    fn infix(kind: &TokenKind) -> Option<Operator> {
        Some(match kind {
            TokenKind::Keyword(Keyword::Or) => Operator::Or,
            TokenKind::Keyword(Keyword::And) => Operator::And,
            TokenKind::Less => Operator::Less,
            TokenKind::LessEqual => Operator::LessEqual,
            TokenKind::Greater => Operator::Greater,
            TokenKind::GreaterEqual => Operator::GreaterEqual,
            TokenKind::BangEqual => Operator::NotEqual,
            TokenKind::EqualEqual => Operator::Equal,
            TokenKind::Keyword(Keyword::In) => Operator::In,
            TokenKind::Keyword(Keyword::NotIn) => Operator::NotIn,
            TokenKind::Keyword(Keyword::Is) => Operator::Is,
            TokenKind::Keyword(Keyword::IsNot) => Operator::IsNot,
            TokenKind::Plus => Operator::Add,
            TokenKind::Minus => Operator::Subtract,
            TokenKind::Star => Operator::Multiply,
            TokenKind::Slash => Operator::Divide,
            TokenKind::Dot => Operator::Attr,
            TokenKind::Colon => Operator::Field,
            TokenKind::OpenParen => Operator::Call,
            _ => return None,
        })
    }

    /// Returns the binding level and associativity of the operator
    fn precedence(self) -> (u8, Assoc) {
        PRECEDENCE
            .iter()
            .zip(1..)
            .find_map(|((assoc, ops), level)| ops.contains(&self).then_some((level, *assoc)))
            .unwrap_or((u8::MAX, Assoc::Left))
    }

    /// Builds the node for a binary operator
    fn build(self, lhs: Expression, rhs: Expression) -> Result<Expression> {
        let (l, r) = (Box::new(lhs), Box::new(rhs));
        Ok(match self {
            Operator::Or => Operation::Or(l, r),
            Operator::And => Operation::And(l, r),
            Operator::Less => Operation::Less(l, r),
            Operator::LessEqual => Operation::LessEqual(l, r),
            Operator::Greater => Operation::Greater(l, r),
            Operator::GreaterEqual => Operation::GreaterEqual(l, r),
            Operator::NotEqual => Operation::NotEqual(l, r),
            Operator::Equal => Operation::Equal(l, r),
            Operator::In => Operation::In(l, r),
            Operator::NotIn => Operation::NotIn(l, r),
            Operator::Is => Operation::Is(l, r),
            Operator::IsNot => Operation::IsNot(l, r),
            Operator::Add => Operation::Add(l, r),
            Operator::Subtract => Operation::Subtract(l, r),
            Operator::Multiply => Operation::Multiply(l, r),
            Operator::Divide => Operation::Divide(l, r),
            op => {
                return Err(Error::Parse(format!(
                    "[Parser] {:?} is not a binary operator",
                    op
                )));
            }
        }
        .into())
    }
}

/// Parser - Converts tokens into an Abstract Syntax Tree (AST)
///
/// Recognizes exactly one record definition or one create statement. Lexical
/// errors met on the way are collected as diagnostics and do not stop parsing;
/// syntax errors abort.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,
    diagnostics: Vec<Error>,
    /// Current expression recursion depth
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source text
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            lookahead: VecDeque::new(),
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Lexical errors seen so far
    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    /// Parses the input into a single top-level statement
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = match self.peek().cloned() {
            Some(TokenKind::Keyword(Keyword::Record)) => Statement::Record(self.parse_record()?),
            Some(TokenKind::Keyword(Keyword::Create)) => Statement::Create(self.parse_create()?),
            Some(_) => {
                let token = self.next()?;
                return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
            }
            None => return Err(Error::Parse("[Parser] Unexpected end of input".to_string())),
        };
        // Only one statement per compiled unit
        if self.peek().is_some() {
            let token = self.next()?;
            return Err(Error::Parse(format!(
                "[Parser] Unexpected token {} after statement",
                token
            )));
        }
        debug!(diagnostics = self.diagnostics.len(), "parsed statement");
        Ok(stmt)
    }

    /// Parses `record NAME { field* }`
    fn parse_record(&mut self) -> Result<RecordDef> {
        self.next_expect(TokenKind::Keyword(Keyword::Record))?;
        let name = self.next_ident()?;
        self.next_expect(TokenKind::OpenBrace)?;

        let mut fields = Vec::new();
        while self.next_if_token(TokenKind::CloseBrace).is_none() {
            fields.push(self.parse_field()?);
        }
        Ok(RecordDef { name, fields })
    }

    /// Parses `NAME ('!' | '?')? 'unique'? domain ';'`
    fn parse_field(&mut self) -> Result<FieldDef> {
        let name = self.next_ident()?;
        let is_key = self.next_if_token(TokenKind::Bang).is_some();
        let is_nullable = !is_key && self.next_if_token(TokenKind::Question).is_some();
        let is_unique = self
            .next_if_token(TokenKind::Keyword(Keyword::Unique))
            .is_some();
        let domain = self.parse_domain()?;
        self.next_expect(TokenKind::Semicolon)?;
        Ok(FieldDef {
            name,
            domain,
            is_key,
            is_nullable,
            is_unique,
        })
    }

    /// Parses a symbolic domain name or an inclusive range
    fn parse_domain(&mut self) -> Result<Domain> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Ident(name) => Ok(Domain::Ref(DomainRef { name })),
            TokenKind::OpenBracket => {
                let first = self.next_int()?;
                let second = match self.next_if_token(TokenKind::Comma) {
                    Some(_) => Some(self.next_int()?),
                    None => None,
                };
                self.next_expect(TokenKind::TwoDots)?;
                let last = self.next_int()?;
                self.next_expect(TokenKind::CloseBracket)?;
                Ok(Domain::Range(RangeDef {
                    first,
                    second,
                    last,
                }))
            }
            _ => Err(Error::Parse(format!(
                "[Parser] Expected domain, got token {}",
                token
            ))),
        }
    }

    /// Parses `create instance (',' instance)* ';'`
    fn parse_create(&mut self) -> Result<CreateStmt> {
        self.next_expect(TokenKind::Keyword(Keyword::Create))?;
        let mut instances = Vec::new();
        loop {
            let name = self.next_ident()?;
            self.next_expect(TokenKind::OpenParen)?;
            let params = self.parse_params()?;
            instances.push(CreateInstance { name, params });
            if self.next_if_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.next_expect(TokenKind::Semicolon)?;
        Ok(CreateStmt { instances })
    }

    /// Parses parameters up to and including the closing paren
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.next_if_token(TokenKind::CloseParen).is_some() {
            return Ok(params);
        }
        loop {
            params.push(self.parse_param()?);
            let token = self.next()?;
            match token.kind {
                TokenKind::CloseParen => break,
                TokenKind::Comma => {}
                _ => {
                    return Err(Error::Parse(format!("[Parser] Unexpected token {}", token)));
                }
            }
        }
        Ok(params)
    }

    /// Parses `NAME '=' expr` or a positional `expr`
    fn parse_param(&mut self) -> Result<Param> {
        let keyword = matches!(self.peek_nth(0), Some(TokenKind::Ident(_)))
            && matches!(self.peek_nth(1), Some(TokenKind::Equal));
        if keyword {
            let name = self.next_ident()?;
            self.next_expect(TokenKind::Equal)?;
            return Ok(Param::Keyword(name, self.parse_expression()?));
        }
        Ok(Param::Positional(self.parse_expression()?))
    }

    /// Parses an expression
    pub fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_expression_at(0)
    }

    /// Parses an expression one nesting level deeper than the caller
    fn parse_expression_at(&mut self, min_level: u8) -> Result<Expression> {
        if self.depth >= MAX_NESTING {
            return Err(Error::Parse(format!(
                "[Parser] Expression nested too deeply, limit is {}",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let result = self.parse_climb(min_level);
        self.depth -= 1;
        result
    }

    /// Precedence climbing: consumes infix and postfix operators binding at
    /// least as tightly as `min_level`. Left-associative chains grow the tree
    /// without recursing, so the tree height is tracked here as well.
    fn parse_climb(&mut self, min_level: u8) -> Result<Expression> {
        let mut lhs = self.parse_prefix()?;
        let mut height = lhs.height();
        if height > MAX_NESTING {
            return Err(Error::Parse(format!(
                "[Parser] Expression nested too deeply, limit is {}",
                MAX_NESTING
            )));
        }
        let mut last_nonassoc = None;
        while let Some(op) = self.peek().and_then(Operator::infix) {
            let (level, assoc) = op.precedence();
            if level < min_level {
                break;
            }
            let token = self.next()?;
            if assoc == Assoc::NonAssoc && last_nonassoc == Some(level) {
                return Err(Error::Parse(format!(
                    "[Parser] Operator {} cannot be chained",
                    token
                )));
            }
            lhs = match op {
                Operator::Attr => Expression::AttrAccess(Box::new(lhs), self.next_ident()?),
                Operator::Field => Expression::FieldAccess(Box::new(lhs), self.next_ident()?),
                Operator::Call => {
                    let params = self.parse_params()?;
                    for param in &params {
                        height = height.max(param.expression().height());
                    }
                    Expression::Call(Box::new(lhs), params)
                }
                _ => {
                    let next_level = match assoc {
                        Assoc::Right => level,
                        Assoc::Left | Assoc::NonAssoc => level + 1,
                    };
                    let rhs = self.parse_expression_at(next_level)?;
                    height = height.max(rhs.height());
                    op.build(lhs, rhs)?
                }
            };
            height += 1;
            if height > MAX_NESTING {
                return Err(Error::Parse(format!(
                    "[Parser] Expression nested too deeply at {}, limit is {}",
                    token, MAX_NESTING
                )));
            }
            last_nonassoc = (assoc == Assoc::NonAssoc).then_some(level);
        }
        Ok(lhs)
    }

    /// Parses a primary expression or a prefix operation
    fn parse_prefix(&mut self) -> Result<Expression> {
        let token = self.next()?;
        Ok(match token.kind {
            TokenKind::Keyword(Keyword::Not) => {
                let (level, _) = Operator::Not.precedence();
                Expression::Unary(UnaryOp::Not, Box::new(self.parse_expression_at(level)?))
            }
            TokenKind::Minus if self.next_is_min_magnitude() => {
                self.next()?;
                Consts::Integer(i64::MIN).into()
            }
            TokenKind::Minus => {
                let (level, _) = Operator::Negate.precedence();
                Expression::Unary(UnaryOp::Neg, Box::new(self.parse_expression_at(level)?))
            }
            TokenKind::OpenParen => {
                let expr = self.parse_expression()?;
                self.next_expect(TokenKind::CloseParen)?;
                expr
            }
            TokenKind::Int(ref n) => Consts::Integer(parse_number(n, &token)?).into(),
            TokenKind::Float(ref n) => Consts::Float(parse_number(n, &token)?).into(),
            TokenKind::String(s) => Consts::String(s).into(),
            TokenKind::Keyword(Keyword::True) => Consts::Boolean(true).into(),
            TokenKind::Keyword(Keyword::False) => Consts::Boolean(false).into(),
            TokenKind::Keyword(Keyword::Null) => Consts::Null.into(),
            TokenKind::Ident(name) => Expression::Ref(name),
            _ => {
                return Err(Error::Parse(format!(
                    "[Parser] Unexpected expression token {}",
                    token
                )));
            }
        })
    }

    /// Buffers up to `n` tokens, recording lexical errors on the way
    fn fill(&mut self, n: usize) {
        while self.lookahead.len() < n {
            match self.lexer.next() {
                Some(Ok(token)) => self.lookahead.push_back(token),
                Some(Err(err)) => {
                    debug!(error = %err, "skipping illegal character");
                    self.diagnostics.push(err);
                }
                None => break,
            }
        }
    }

    /// Peeks at the kind of the next token
    fn peek(&mut self) -> Option<&TokenKind> {
        self.peek_nth(0)
    }

    /// Peeks `n` tokens ahead
    fn peek_nth(&mut self, n: usize) -> Option<&TokenKind> {
        self.fill(n + 1);
        self.lookahead.get(n).map(|t| &t.kind)
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        self.fill(1);
        self.lookahead
            .pop_front()
            .ok_or_else(|| Error::Parse("[Parser] Unexpected end of input".to_string()))
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Ident(ident) => Ok(ident),
            _ => Err(Error::Parse(format!(
                "[Parser] Expected ident, got token {}",
                token
            ))),
        }
    }

    /// Expects and consumes an integer literal
    fn next_int(&mut self) -> Result<i64> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Int(ref n) => parse_number(n, &token),
            _ => Err(Error::Parse(format!(
                "[Parser] Expected integer, got token {}",
                token
            ))),
        }
    }

    /// Whether the next token is the magnitude of `i64::MIN` and no postfix
    /// operator binds to it before the minus does
    fn next_is_min_magnitude(&mut self) -> bool {
        matches!(self.peek(), Some(TokenKind::Int(n)) if n == I64_MIN_MAGNITUDE)
            && !matches!(
                self.peek_nth(1),
                Some(TokenKind::Dot | TokenKind::Colon | TokenKind::OpenParen)
            )
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: TokenKind) -> Result<()> {
        let token = self.next()?;
        if token.kind != expect {
            return Err(Error::Parse(format!(
                "[Parser] Expected token {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Consumes next token if it matches the given kind
    fn next_if_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek() != Some(&kind) {
            return None;
        }
        self.next().ok()
    }
}

/// Converts the digits of a number token, reporting failures at the token
fn parse_number<T>(digits: &str, token: &Token) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    digits.parse().map_err(|err: T::Err| {
        Error::Parse(format!("[Parser] Invalid number literal {} ({})", token, err))
    })
}
