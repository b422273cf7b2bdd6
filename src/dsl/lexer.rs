//! Lexer/tokenizer for the filter DSL.

use std::fmt;

use thiserror::Error;
use winnow::combinator::{alt, delimited, not, terminated};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

/// Token types for the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Bare words and literals
    Ident(String),  // field name, keyword, or identifier-shaped value
    Number(String), // bare numeric literal, kept as written
    Quoted(String), // 'quoted literal', quotes stripped
    Word(String),   // any other bare literal

    // Comparison operators
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=

    // Set operators (`in` is an Ident, recognized by the parser)
    NotIn,         // !in
    Intersects,    // ∩
    NotIntersects, // !∩

    // Punctuation
    LParen, // (
    RParen, // )
    Comma,  // ,

    // End of input
    Eof,
}

/// A token with the byte offset where it starts in the predicate text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated quoted literal starting at offset {offset}")]
    UnterminatedQuote { offset: usize },

    #[error("unrecognized symbol '{symbol}' at offset {offset}")]
    UnexpectedSymbol { symbol: char, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedQuote { offset } | LexError::UnexpectedSymbol { offset, .. } => {
                *offset
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Word(s) => write!(f, "'{}'", s),
            Token::Quoted(s) => write!(f, "quoted literal '{}'", s),
            Token::Eq => write!(f, "'='"),
            Token::Ne => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::NotIn => write!(f, "'!in'"),
            Token::Intersects => write!(f, "'∩'"),
            Token::NotIntersects => write!(f, "'!∩'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '\'' | '(' | ')' | ',' | '=' | '<' | '>' | '!' | '∩')
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => chars.all(is_ident_char),
        _ => false,
    }
}

/// Lex a single-quoted literal. No escape processing.
fn lex_quoted(input: &mut &str) -> PResult<Token> {
    delimited('\'', take_till(0.., '\''), '\'')
        .map(|s: &str| Token::Quoted(s.to_string()))
        .parse_next(input)
}

/// Lex a bare word: a maximal run up to whitespace, an operator, or punctuation.
fn lex_word(input: &mut &str) -> PResult<Token> {
    let word = take_while(1.., is_word_char).parse_next(input)?;

    if is_identifier(word) {
        Ok(Token::Ident(word.to_string()))
    } else if word.parse::<f64>().is_ok() {
        Ok(Token::Number(word.to_string()))
    } else {
        Ok(Token::Word(word.to_string()))
    }
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> PResult<Token> {
    alt((
        // Multi-char operators first
        "!=".value(Token::Ne),
        "<=".value(Token::Le),
        ">=".value(Token::Ge),
        terminated("!in", not(one_of(is_ident_char))).value(Token::NotIn),
        "!∩".value(Token::NotIntersects),
        // Single-char operators
        "∩".value(Token::Intersects),
        "=".value(Token::Eq),
        "<".value(Token::Lt),
        ">".value(Token::Gt),
        // Punctuation
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        ",".value(Token::Comma),
        lex_quoted,
        lex_word,
    ))
    .parse_next(input)
}

/// Tokenize the entire input. The result always ends with `Token::Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, LexError> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        let _: PResult<&str> = take_while(0.., char::is_whitespace).parse_next(&mut remaining);
        let offset = input.len() - remaining.len();

        if remaining.is_empty() {
            // A blank predicate reports its missing operand at the start.
            let offset = if tokens.is_empty() { 0 } else { offset };
            tokens.push(Spanned {
                token: Token::Eof,
                offset,
            });
            return Ok(tokens);
        }

        let before = remaining;
        match lex_token(&mut remaining) {
            Ok(token) => tokens.push(Spanned { token, offset }),
            Err(_) => return Err(classify_failure(before, offset)),
        }
    }
}

fn classify_failure(rest: &str, offset: usize) -> LexError {
    match rest.chars().next() {
        Some('\'') => LexError::UnterminatedQuote { offset },
        Some(symbol) => LexError::UnexpectedSymbol { symbol, offset },
        None => unreachable!("lexer only fails on non-empty input"),
    }
}
