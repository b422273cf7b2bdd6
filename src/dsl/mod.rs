//! Filter DSL for loosely-typed records.
//!
//! Syntax:
//!   field=value              - equality (numeric when both sides are numbers)
//!   field!=value             - inequality
//!   field>n, field<=n, etc.  - numeric ordering
//!   field in (a,b,c)         - membership; every element for list fields
//!   field !in (a,b,c)        - negated membership
//!   field ∩ (a,b,c)          - overlap; some element for list fields
//!   field !∩ (a,b,c)         - negated overlap
//!   'quoted value'           - literal taken verbatim
//!   expr1 and expr2          - AND
//!   expr1 or expr2           - OR (lower precedence than and)
//!   (expr)                   - grouping

mod ast;
mod coerce;
mod eval;
mod filter;
mod lexer;
mod parser;

pub use ast::*;
pub use coerce::EPSILON;
pub use eval::{evaluate, matches};
pub use filter::Filter;
pub use lexer::{LexError, Spanned, Token, tokenize};
pub use parser::{ParseError, SyntaxError, parse, parse_tokens};
