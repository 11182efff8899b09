//! Record/create compilation
//!
//! This module provides:
//! - `parser`: lexer, parser and AST
//! - `types`: built-in domains and domain resolution
//! - `schema`: table and column schema definitions
//! - `plan`: semantic checks, lowering statements into plan nodes
//! - `codegen`: SQL text generation
//! - `compiler`: the source-to-SQL pipeline

pub mod codegen;
pub mod compiler;
pub mod parser;
pub mod plan;
pub mod schema;
pub mod types;
