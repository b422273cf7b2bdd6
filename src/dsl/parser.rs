//! Parser for the filter DSL.
//!
//! Grammar (in rough EBNF):
//!
//! expr       = and_term ("or" and_term)*
//! and_term   = factor ("and" factor)*
//! factor     = "(" expr ")" | comparison
//! comparison = FIELD compare_op LITERAL
//!            | FIELD set_op "(" LITERAL ("," LITERAL)* ")"
//! compare_op = "=" | "!=" | "<" | "<=" | ">" | ">="
//! set_op     = "in" | "!in" | "∩" | "!∩"

use thiserror::Error;

use super::ast::{CompareOp, Expr, Literal, SetOp};
use super::lexer::{LexError, Spanned, Token, tokenize};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found} at offset {offset}")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unknown operator {found} at offset {offset}")]
    UnknownOperator { found: String, offset: usize },

    #[error("unbalanced parenthesis at offset {offset}")]
    UnbalancedParen { offset: usize },

    #[error("empty literal list at offset {offset}")]
    EmptyList { offset: usize },

    #[error("unexpected {found} after complete expression at offset {offset}")]
    Trailing { found: String, offset: usize },
}

impl SyntaxError {
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::Unexpected { offset, .. }
            | SyntaxError::UnknownOperator { offset, .. }
            | SyntaxError::UnbalancedParen { offset }
            | SyntaxError::EmptyList { offset }
            | SyntaxError::Trailing { offset, .. } => *offset,
        }
    }
}

/// Any failure turning predicate text into an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.offset(),
            ParseError::Syntax(e) => e.offset(),
        }
    }
}

fn is_keyword(token: &Token, keyword: &str) -> bool {
    matches!(token, Token::Ident(word) if word == keyword)
}

/// Parser state.
struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Spanned>) -> Self {
        if !matches!(tokens.last(), Some(Spanned { token: Token::Eof, .. })) {
            let offset = tokens.last().map_or(0, |t| t.offset + 1);
            tokens.push(Spanned {
                token: Token::Eof,
                offset,
            });
        }
        Parser { tokens, pos: 0 }
    }

    // The token list always ends with Eof, and `advance` never moves past it.
    fn peek(&self) -> &Spanned {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Spanned {
        let tok = self.tokens[self.pos].clone();
        if tok.token != Token::Eof {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        let tok = self.peek();
        SyntaxError::Unexpected {
            expected,
            found: tok.token.to_string(),
            offset: tok.offset,
        }
    }

    /// Parse OR expression: and_term ("or" and_term)*
    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and_term()?;

        while is_keyword(&self.peek().token, "or") {
            self.advance(); // consume or
            let right = self.parse_and_term()?;
            left = Expr::or(left, right);
        }

        Ok(left)
    }

    /// Parse AND expression: factor ("and" factor)*
    fn parse_and_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_factor()?;

        while is_keyword(&self.peek().token, "and") {
            self.advance(); // consume and
            let right = self.parse_factor()?;
            left = Expr::and(left, right);
        }

        Ok(left)
    }

    /// Parse factor: "(" expr ")" | comparison
    fn parse_factor(&mut self) -> Result<Expr, SyntaxError> {
        match &self.peek().token {
            Token::LParen => {
                let open = self.advance();
                let inner = self.parse_expr()?;
                match self.peek().token {
                    Token::RParen => {
                        self.advance();
                        Ok(inner)
                    }
                    Token::Eof => Err(SyntaxError::UnbalancedParen {
                        offset: open.offset,
                    }),
                    _ => Err(self.unexpected("'and', 'or' or ')'")),
                }
            }
            Token::Ident(word) if word != "and" && word != "or" => self.parse_comparison(),
            _ => Err(self.unexpected("field name or '('")),
        }
    }

    /// Parse comparison: FIELD op LITERAL | FIELD set_op "(" literals ")"
    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let field = match self.advance().token {
            Token::Ident(name) => name,
            other => unreachable!("parse_factor only dispatches on identifiers, got {other:?}"),
        };

        let compare_op = match self.peek().token {
            Token::Eq => Some(CompareOp::Eq),
            Token::Ne => Some(CompareOp::Ne),
            Token::Lt => Some(CompareOp::Lt),
            Token::Le => Some(CompareOp::Le),
            Token::Gt => Some(CompareOp::Gt),
            Token::Ge => Some(CompareOp::Ge),
            _ => None,
        };

        if let Some(op) = compare_op {
            self.advance(); // consume operator
            let literal = self.parse_literal()?;
            return Ok(Expr::Compare { field, op, literal });
        }

        let set_op = match &self.peek().token {
            token if is_keyword(token, "in") => SetOp::In,
            Token::NotIn => SetOp::NotIn,
            Token::Intersects => SetOp::Intersects,
            Token::NotIntersects => SetOp::NotIntersects,
            Token::Eof => return Err(self.unexpected("operator")),
            other => {
                return Err(SyntaxError::UnknownOperator {
                    found: other.to_string(),
                    offset: self.peek().offset,
                });
            }
        };

        self.advance(); // consume operator
        let literals = self.parse_literal_list()?;
        Ok(Expr::SetTest {
            field,
            op: set_op,
            literals,
        })
    }

    /// Parse literal list: "(" LITERAL ("," LITERAL)* ")"
    fn parse_literal_list(&mut self) -> Result<Vec<Literal>, SyntaxError> {
        if self.peek().token != Token::LParen {
            return Err(self.unexpected("'(' after set operator"));
        }
        let open = self.advance();

        if self.peek().token == Token::RParen {
            return Err(SyntaxError::EmptyList {
                offset: open.offset,
            });
        }

        let mut literals = vec![self.parse_literal()?];
        loop {
            match self.peek().token {
                Token::Comma => {
                    self.advance(); // consume ,
                    literals.push(self.parse_literal()?);
                }
                Token::RParen => {
                    self.advance();
                    return Ok(literals);
                }
                Token::Eof => {
                    return Err(SyntaxError::UnbalancedParen {
                        offset: open.offset,
                    });
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    /// Parse a single literal: IDENT | NUMBER | WORD | QUOTED
    fn parse_literal(&mut self) -> Result<Literal, SyntaxError> {
        let literal = match &self.peek().token {
            Token::Quoted(text) => Literal::quoted(text.clone()),
            Token::Ident(text) | Token::Number(text) | Token::Word(text) => {
                Literal::bare(text.clone())
            }
            _ => return Err(self.unexpected("literal")),
        };
        self.advance();
        Ok(literal)
    }
}

/// Parse a token stream into an expression. Fails unless the whole stream
/// forms exactly one expression.
pub fn parse_tokens(tokens: Vec<Spanned>) -> Result<Expr, SyntaxError> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;

    // Ensure we consumed all tokens
    let rest = parser.peek();
    match rest.token {
        Token::Eof => Ok(expr),
        Token::RParen => Err(SyntaxError::UnbalancedParen {
            offset: rest.offset,
        }),
        ref other => Err(SyntaxError::Trailing {
            found: other.to_string(),
            offset: rest.offset,
        }),
    }
}

/// Parse predicate text into an expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    Ok(parse_tokens(tokens)?)
}
