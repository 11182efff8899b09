use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::{self, Domain, Param},
        plan::{Node, Plan, Row},
        schema::{self, Table},
        types::{ColumnType, DataType},
    },
};

/// Planner - lowers AST statements into validated plan nodes
#[derive(Debug, Default)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self {}
    }

    /// Builds an execution plan from an AST statement
    pub fn build(&self, stmt: ast::Statement) -> Result<Plan> {
        Ok(Plan(self.build_statement(stmt)?))
    }

    pub fn build_statement(&self, stmt: ast::Statement) -> Result<Node> {
        Ok(match stmt {
            ast::Statement::Record(record) => {
                let schema = Table {
                    columns: record
                        .fields
                        .into_iter()
                        .map(|f| self.build_column(&record.name, f))
                        .collect::<Result<Vec<_>>>()?,
                    name: record.name,
                };
                schema.validate()?;
                debug!(table = %schema.name, columns = schema.columns.len(), "planned table");
                Node::CreateTable { schema }
            }
            ast::Statement::Create(create) => {
                let rows = create
                    .instances
                    .into_iter()
                    .map(|i| self.build_row(i))
                    .collect::<Result<Vec<_>>>()?;
                debug!(rows = rows.len(), "planned insert");
                Node::Insert { rows }
            }
        })
    }

    /// Resolves a field's domain into a column
    fn build_column(&self, table: &str, field: ast::FieldDef) -> Result<schema::Column> {
        let (column_type, range) = match &field.domain {
            Domain::Ref(domain) => (ColumnType::resolve(domain), None),
            Domain::Range(range) => {
                if let Some(second) = range.second {
                    return Err(Error::Semantic(format!(
                        "unimplemented: stepped range domain [{}, {}..{}] for field {}.{}",
                        range.first, second, range.last, table, field.name
                    )));
                }
                (ColumnType::Builtin(DataType::Integer), Some((range.first, range.last)))
            }
        };
        Ok(schema::Column {
            name: field.name,
            column_type,
            range,
            unique: field.is_unique,
            nullable: field.is_nullable,
            primary_key: field.is_key,
        })
    }

    /// Splits an instance into a column list and values. Parameters must be
    /// all positional or all keyword.
    fn build_row(&self, instance: ast::CreateInstance) -> Result<Row> {
        let keywords = instance
            .params
            .iter()
            .filter(|p| matches!(p, Param::Keyword(..)))
            .count();
        if keywords == 0 {
            return Ok(Row {
                table_name: instance.name,
                columns: None,
                values: instance
                    .params
                    .into_iter()
                    .filter_map(|p| match p {
                        Param::Positional(expr) => Some(expr),
                        Param::Keyword(..) => None,
                    })
                    .collect(),
            });
        }
        if keywords != instance.params.len() {
            return Err(Error::Semantic(format!(
                "Incohesive use of keyword parameters in {}",
                instance.name
            )));
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for param in instance.params {
            if let Param::Keyword(name, expr) = param {
                if !seen.insert(name.clone()) {
                    return Err(Error::Semantic(format!(
                        "Duplicate keyword parameter {} in {}",
                        name, instance.name
                    )));
                }
                columns.push(name);
                values.push(expr);
            }
        }
        Ok(Row {
            table_name: instance.name,
            columns: Some(columns),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Planner;
    use crate::{
        error::{Error, Result},
        sql::{
            parser::{Parser, ast::Consts},
            plan::{Node, Row},
            types::ColumnType,
        },
    };

    fn plan(src: &str) -> Result<Node> {
        Planner::new().build_statement(Parser::new(src).parse()?)
    }

    #[test]
    fn test_plan_create_table() -> Result<()> {
        let Node::CreateTable { schema } = plan("record Emp { id! Integer; dept? Dept; }")? else {
            panic!("expected create table");
        };
        assert_eq!(schema.primary_key(), vec!["id"]);
        assert_eq!(
            schema.columns[1].column_type,
            ColumnType::Reference("dept".to_string())
        );
        assert!(schema.columns[1].nullable);
        Ok(())
    }

    #[test]
    fn test_plan_stepped_range_unimplemented() {
        match plan("record R { n [1, 3..9]; }") {
            Err(Error::Semantic(msg)) => assert!(msg.starts_with("unimplemented")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_plan_insert() -> Result<()> {
        assert_eq!(
            plan("create P(id=1, age=2), P(3, 4), P();")?,
            Node::Insert {
                rows: vec![
                    Row {
                        table_name: "P".to_string(),
                        columns: Some(vec!["id".to_string(), "age".to_string()]),
                        values: vec![Consts::Integer(1).into(), Consts::Integer(2).into()],
                    },
                    Row {
                        table_name: "P".to_string(),
                        columns: None,
                        values: vec![Consts::Integer(3).into(), Consts::Integer(4).into()],
                    },
                    Row {
                        table_name: "P".to_string(),
                        columns: None,
                        values: vec![],
                    },
                ]
            }
        );
        Ok(())
    }

    #[test]
    fn test_planner_is_reusable() -> Result<()> {
        let planner = Planner::default();
        let first = planner.build(Parser::new("create P(1);").parse()?)?;
        let second = planner.build(Parser::new("create P(1);").parse()?)?;
        assert_eq!(first.0, second.0);
        assert!(matches!(first.0, Node::Insert { .. }));
        Ok(())
    }

    #[test]
    fn test_plan_incohesive_params() {
        assert!(matches!(plan("create P(id=1, 2);"), Err(Error::Semantic(_))));
        assert!(matches!(plan("create P(1, age=2);"), Err(Error::Semantic(_))));
        assert!(matches!(plan("create P(id=1, id=2);"), Err(Error::Semantic(_))));
    }
}
