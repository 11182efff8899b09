use crate::{
    error::Result,
    sql::{
        codegen::Generator,
        parser::ast::{self, Expression},
        plan::planner::Planner,
        schema::Table,
    },
};

mod planner;

/// Validated, lowered form of one statement
#[derive(Debug, PartialEq)]
pub enum Node {
    /// One CREATE TABLE statement
    CreateTable { schema: Table },
    /// One INSERT per row, in source order
    Insert { rows: Vec<Row> },
}

/// A single row insertion
#[derive(Debug, PartialEq)]
pub struct Row {
    pub table_name: String,
    /// Explicit column list for keyword-form instances
    pub columns: Option<Vec<String>>,
    pub values: Vec<Expression>,
}

/// Execution plan: a root node ready for SQL generation
#[derive(Debug, PartialEq)]
pub struct Plan(pub Node);

impl Plan {
    /// Builds a plan from an AST statement, running all semantic checks
    pub fn build(stmt: ast::Statement) -> Result<Self> {
        Planner::new().build(stmt)
    }

    /// Generates SQL text for the plan
    pub fn generate(self) -> Result<String> {
        <dyn Generator>::build(self.0).generate()
    }
}
