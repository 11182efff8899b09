//! Lexer - Tokenizes record/create source text into a stream of positioned tokens

use std::fmt::Display;

use crate::error::{Error, Result};

/// A lexical token together with its 1-based source position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.kind, self.line, self.column)
    }
}

/// Token kinds, carrying the literal text for identifiers and literals
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Reserved keyword (including the composite `is not` / `not in`)
    Keyword(Keyword),
    /// Identifier such as a record, field or function name
    Ident(String),
    /// String literal, delimiters stripped
    String(String),
    /// Integer literal
    Int(String),
    /// Float literal (digits '.' digits)
    Float(String),
    /// Brackets and punctuation
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Colon,
    Comma,
    Dot,
    TwoDots,
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Minus,
    Plus,
    Question,
    Semicolon,
    Slash,
    Star,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Keyword(keyword) => f.write_str(keyword.to_str()),
            TokenKind::Ident(ident) => f.write_str(ident),
            TokenKind::String(v) => write!(f, "\"{}\"", v),
            TokenKind::Int(n) | TokenKind::Float(n) => f.write_str(n),
            TokenKind::OpenParen => f.write_str("("),
            TokenKind::CloseParen => f.write_str(")"),
            TokenKind::OpenBracket => f.write_str("["),
            TokenKind::CloseBracket => f.write_str("]"),
            TokenKind::OpenBrace => f.write_str("{"),
            TokenKind::CloseBrace => f.write_str("}"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Dot => f.write_str("."),
            TokenKind::TwoDots => f.write_str(".."),
            TokenKind::Equal => f.write_str("="),
            TokenKind::EqualEqual => f.write_str("=="),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::BangEqual => f.write_str("!="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::GreaterEqual => f.write_str(">="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::LessEqual => f.write_str("<="),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Question => f.write_str("?"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Star => f.write_str("*"),
        }
    }
}

/// Reserved keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Create,
    False,
    In,
    Is,
    Not,
    Null,
    Or,
    Record,
    True,
    Unique,
    // Composite phrases, never produced by `from_str`
    IsNot,
    NotIn,
}

impl Keyword {
    /// Reclassifies an identifier as a keyword (case-sensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident {
            "and" => Keyword::And,
            "create" => Keyword::Create,
            "false" => Keyword::False,
            "in" => Keyword::In,
            "is" => Keyword::Is,
            "not" => Keyword::Not,
            "null" => Keyword::Null,
            "or" => Keyword::Or,
            "record" => Keyword::Record,
            "true" => Keyword::True,
            "unique" => Keyword::Unique,
            _ => return None,
        })
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Keyword::And => "and",
            Keyword::Create => "create",
            Keyword::False => "false",
            Keyword::In => "in",
            Keyword::Is => "is",
            Keyword::Not => "not",
            Keyword::Null => "null",
            Keyword::Or => "or",
            Keyword::Record => "record",
            Keyword::True => "true",
            Keyword::Unique => "unique",
            Keyword::IsNot => "is not",
            Keyword::NotIn => "not in",
        }
    }

    /// The second word of a composite phrase starting with this keyword
    fn composite(&self) -> Option<(&'static str, Keyword)> {
        match self {
            Keyword::Is => Some(("not", Keyword::IsNot)),
            Keyword::Not => Some(("in", Keyword::NotIn)),
            _ => None,
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Lexical analyzer
///
/// Never aborts: an unrecognized character is yielded as an `Err` item and
/// skipped, and scanning resumes right after it. Cloning a lexer forks the
/// token sequence from the current position.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character
    pos: usize,
    line: usize,
    /// Column of the character at `pos`, counted in chars from 1
    column: usize,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan()
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes one character, keeping line bookkeeping current
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.peek().filter(|&c| predicate(c))?;
        self.bump()
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    /// Removes whitespace, newlines and `#` line comments
    fn erase_whitespace(&mut self) {
        loop {
            self.next_while(is_blank);
            if self.next_if(|c| c == '#').is_none() {
                break;
            }
            self.next_while(|c| c != '\n');
        }
    }

    /// Scans the next token, or reports and skips one unrecognized character
    fn scan(&mut self) -> Option<Result<Token>> {
        self.erase_whitespace();
        let (line, column) = (self.line, self.column);
        let c = self.peek()?;
        let kind = match c {
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_ident_start(c) => self.scan_ident(),
            _ => self.scan_symbol(),
        };
        Some(match kind {
            Some(kind) => Ok(Token { kind, line, column }),
            None => {
                self.bump();
                Err(Error::Lex {
                    character: c,
                    line,
                    column,
                })
            }
        })
    }

    /// Scans a string literal, which must close on the same line
    fn scan_string(&mut self) -> Option<TokenKind> {
        let body = self.rest().strip_prefix('"')?;
        let end = body.find(['"', '\n'])?;
        if !body[end..].starts_with('"') {
            return None;
        }
        let value = body[..end].to_string();
        // Opening quote, body and closing quote; no newline in between.
        let stop = self.pos + end + 2;
        while self.pos < stop {
            self.bump();
        }
        Some(TokenKind::String(value))
    }

    /// Scans a float (digits '.' digits) or else an integer literal
    fn scan_number(&mut self) -> Option<TokenKind> {
        let mut val = self.next_while(|c| c.is_ascii_digit())?;
        let mut after = self.rest().chars();
        if after.next() == Some('.') && after.next().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            val.push('.');
            val.push_str(&self.next_while(|c| c.is_ascii_digit())?);
            return Some(TokenKind::Float(val));
        }
        Some(TokenKind::Int(val))
    }

    /// Scans an identifier, keyword or composite keyword phrase
    fn scan_ident(&mut self) -> Option<TokenKind> {
        let val = self.next_while(is_ident_char)?;
        let Some(keyword) = Keyword::from_str(&val) else {
            return Some(TokenKind::Ident(val));
        };
        if let Some((second, composite)) = keyword.composite()
            && self.next_is_word(second)
        {
            self.next_while(is_blank);
            for _ in second.chars() {
                self.bump();
            }
            return Some(TokenKind::Keyword(composite));
        }
        Some(TokenKind::Keyword(keyword))
    }

    /// Whether at least one blank followed by exactly `word` comes next
    fn next_is_word(&self, word: &str) -> bool {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(is_blank);
        if trimmed.len() == rest.len() {
            return false;
        }
        trimmed
            .strip_prefix(word)
            .is_some_and(|tail| !tail.starts_with(is_ident_char))
    }

    /// Scans a one or two character symbol token
    fn scan_symbol(&mut self) -> Option<TokenKind> {
        let mut chars = self.rest().chars();
        let first = chars.next()?;
        let second = chars.next();
        let (kind, len) = match (first, second) {
            ('=', Some('=')) => (TokenKind::EqualEqual, 2),
            ('!', Some('=')) => (TokenKind::BangEqual, 2),
            ('>', Some('=')) => (TokenKind::GreaterEqual, 2),
            ('<', Some('=')) => (TokenKind::LessEqual, 2),
            ('.', Some('.')) => (TokenKind::TwoDots, 2),
            ('(', _) => (TokenKind::OpenParen, 1),
            (')', _) => (TokenKind::CloseParen, 1),
            ('[', _) => (TokenKind::OpenBracket, 1),
            (']', _) => (TokenKind::CloseBracket, 1),
            ('{', _) => (TokenKind::OpenBrace, 1),
            ('}', _) => (TokenKind::CloseBrace, 1),
            (':', _) => (TokenKind::Colon, 1),
            (',', _) => (TokenKind::Comma, 1),
            ('.', _) => (TokenKind::Dot, 1),
            ('=', _) => (TokenKind::Equal, 1),
            ('!', _) => (TokenKind::Bang, 1),
            ('>', _) => (TokenKind::Greater, 1),
            ('<', _) => (TokenKind::Less, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('?', _) => (TokenKind::Question, 1),
            (';', _) => (TokenKind::Semicolon, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('*', _) => (TokenKind::Star, 1),
            _ => return None,
        };
        for _ in 0..len {
            self.bump();
        }
        Some(kind)
    }
}
