//! YQL: a boolean filter language for loosely-typed records.
//!
//! ```
//! use yql::{FieldValue, Record, matches};
//!
//! let record: Record = [
//!     ("age".to_string(), FieldValue::Int(24)),
//!     ("sex".to_string(), FieldValue::from("other")),
//! ]
//! .into();
//! let hit = matches("age>23 and (sex in (boy,girl) or sex='other')", Some(&record)).unwrap();
//! assert!(hit);
//! ```

pub mod dsl;
pub mod record;

pub use dsl::{Expr, Filter, ParseError, evaluate, matches, parse};
pub use record::{FieldValue, Record, record_from_json};
