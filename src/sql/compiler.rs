use std::path::Path;

use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        parser::{Parser, ast::Statement},
        plan::Plan,
    },
};

/// Compiles one source unit (a record definition or a create statement)
/// into SQL text.
///
/// Lexical errors do not stop compilation; they are kept as diagnostics for
/// the last compiled unit. Syntax and semantic errors abort with no output.
#[derive(Debug, Default)]
pub struct Compiler {
    diagnostics: Vec<Error>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lexical errors from the last `parse`/`compile` call
    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    /// Parses source text into its AST
    pub fn parse(&mut self, source: &str) -> Result<Statement> {
        let mut parser = Parser::new(source);
        let result = parser.parse();
        self.diagnostics = parser.diagnostics().to_vec();
        result
    }

    /// Compiles source text into SQL
    pub fn compile(&mut self, source: &str) -> Result<String> {
        let stmt = self.parse(source)?;
        let sql = Plan::build(stmt)?.generate()?;
        debug!(bytes = sql.len(), diagnostics = self.diagnostics.len(), "compiled unit");
        Ok(sql)
    }

    /// Reads a whole file and compiles it
    pub fn compile_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let source = std::fs::read_to_string(path)?;
        self.compile(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::Compiler;
    use crate::error::{Error, Result};

    #[test]
    fn test_compile_keeps_diagnostics() -> Result<()> {
        let mut compiler = Compiler::new();
        let sql = compiler.compile("record T { a @Integer; }")?;
        assert_eq!(sql, "create table T (\n\ta integer not null\n);");
        assert_eq!(
            compiler.diagnostics(),
            &[Error::Lex { character: '@', line: 1, column: 14 }]
        );

        // Diagnostics are reset per unit, and survive a failed parse
        assert!(compiler.compile("record @ {").is_err());
        assert_eq!(compiler.diagnostics().len(), 1);
        compiler.compile("create T(1);")?;
        assert!(compiler.diagnostics().is_empty());
        Ok(())
    }
}
