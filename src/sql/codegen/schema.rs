use crate::{
    error::Result,
    sql::{codegen::Generator, schema::Table},
};

/// CREATE TABLE generator
pub struct CreateTable {
    schema: Table,
}

impl CreateTable {
    pub fn new(schema: Table) -> Box<Self> {
        Box::new(Self { schema })
    }
}

impl Generator for CreateTable {
    fn generate(self: Box<Self>) -> Result<String> {
        let mut lines = self
            .schema
            .columns
            .iter()
            .map(|column| {
                let mut line = format!("{} {}", column.name, column.datatype());
                for constraint in column.constraints() {
                    line.push(' ');
                    line.push_str(&constraint.to_string());
                }
                line
            })
            .collect::<Vec<_>>();

        // Composite key over all key fields, in declaration order
        let keys = self.schema.primary_key();
        if !keys.is_empty() {
            lines.push(format!("primary key ({})", keys.join(", ")));
        }

        let mut sql = format!("create table {} (", self.schema.name);
        if !lines.is_empty() {
            sql.push_str("\n\t");
            sql.push_str(&lines.join(",\n\t"));
        }
        sql.push_str("\n);");
        Ok(sql)
    }
}
