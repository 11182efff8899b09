//! recsql - compiles record declarations and create statements into SQL
//!
//! This crate provides:
//! - Lexing and precedence-aware parsing into an AST
//! - Schema emission (`record` → CREATE TABLE with synthesized constraints)
//! - Data emission (`create` → INSERT, batched in deferred-constraint transactions)

pub mod error;
pub mod sql;

pub use error::{Error, Result};
pub use sql::compiler::Compiler;
