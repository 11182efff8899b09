use std::{collections::HashSet, fmt::Display};

use crate::{
    error::{Error, Result},
    sql::types::{ColumnType, DataType},
};

/// Table schema resolved from a record definition
#[derive(Debug, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Validates table schema
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::Semantic(format!(
                    "Duplicate field {} in record {}",
                    column.name, self.name
                )));
            }
            if column.primary_key && column.nullable {
                return Err(Error::Semantic(format!(
                    "Key field {}.{} cannot be nullable",
                    self.name, column.name
                )));
            }
            if let Some((low, high)) = column.range
                && low > high
            {
                return Err(Error::Semantic(format!(
                    "Empty range [{}..{}] for field {}.{}",
                    low, high, self.name, column.name
                )));
            }
        }
        Ok(())
    }

    /// Key columns in declaration order
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Column schema definition
#[derive(Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    /// Inclusive bounds for range domains
    pub range: Option<(i64, i64)>,
    pub unique: bool,
    pub nullable: bool,
    /// Whether this column is part of the primary key
    pub primary_key: bool,
}

impl Column {
    pub fn datatype(&self) -> DataType {
        self.column_type.datatype()
    }

    /// Column constraints in emission order
    pub fn constraints(&self) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        if let ColumnType::Reference(table) = &self.column_type {
            constraints.push(Constraint::References(table.clone()));
        }
        if let Some((low, high)) = self.range {
            constraints.push(Constraint::Check {
                column: self.name.clone(),
                low,
                high,
            });
        }
        if self.unique {
            constraints.push(Constraint::Unique);
        }
        if !self.nullable {
            constraints.push(Constraint::NotNull);
        }
        constraints
    }
}

/// Column-level SQL constraint
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    References(String),
    Check { column: String, low: i64, high: i64 },
    Unique,
    NotNull,
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::References(table) => write!(f, "references {}", table),
            Constraint::Check { column, low, high } => {
                write!(f, "check ({} between {} and {})", column, low, high)
            }
            Constraint::Unique => f.write_str("unique"),
            Constraint::NotNull => f.write_str("not null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, Constraint, Table};
    use crate::{
        error::{Error, Result},
        sql::types::{ColumnType, DataType},
    };

    fn column(name: &str) -> Column {
        Column {
            name: name.to_string(),
            column_type: ColumnType::Builtin(DataType::Integer),
            range: None,
            unique: false,
            nullable: false,
            primary_key: false,
        }
    }

    #[test]
    fn test_constraints_order() {
        let col = Column {
            column_type: ColumnType::Reference("team".to_string()),
            range: Some((1, 9)),
            unique: true,
            ..column("team_id")
        };
        let rendered = col
            .constraints()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                "references team",
                "check (team_id between 1 and 9)",
                "unique",
                "not null"
            ]
        );

        let col = Column { nullable: true, ..column("n") };
        assert!(!col.constraints().contains(&Constraint::NotNull));
    }

    #[test]
    fn test_validate() -> Result<()> {
        let table = Table {
            name: "t".to_string(),
            columns: vec![
                Column { primary_key: true, ..column("a") },
                column("b"),
                Column { primary_key: true, ..column("c") },
            ],
        };
        table.validate()?;
        assert_eq!(table.primary_key(), vec!["a", "c"]);

        let table = Table {
            name: "t".to_string(),
            columns: vec![Column { primary_key: true, nullable: true, ..column("a") }],
        };
        assert!(matches!(table.validate(), Err(Error::Semantic(_))));

        let table = Table {
            name: "t".to_string(),
            columns: vec![column("a"), column("a")],
        };
        assert!(matches!(table.validate(), Err(Error::Semantic(_))));

        let table = Table {
            name: "t".to_string(),
            columns: vec![Column { range: Some((5, 1)), ..column("a") }],
        };
        assert!(matches!(table.validate(), Err(Error::Semantic(_))));
        Ok(())
    }
}
