use std::fmt::Display;

use crate::sql::parser::ast::DomainRef;

/// Built-in SQL data types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    String,
}

/// Fixed table of built-in domain names
static BUILTIN_DOMAINS: &[(&str, DataType)] = &[
    ("Integer", DataType::Integer),
    ("String", DataType::String),
    ("Boolean", DataType::Boolean),
    ("Float", DataType::Float),
];

impl DataType {
    /// Looks up a built-in domain name (case-sensitive)
    pub fn from_domain(name: &str) -> Option<DataType> {
        BUILTIN_DOMAINS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, datatype)| *datatype)
    }

    /// SQL spelling of the type
    pub fn to_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Float => "real",
            DataType::String => "text",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Outcome of resolving a symbolic domain
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// One of the built-in types
    Builtin(DataType),
    /// Any other name refers to a record; holds the referenced table name
    Reference(String),
}

impl ColumnType {
    /// Resolves a domain name against the built-in table. Referenced records
    /// are not checked for existence.
    pub fn resolve(domain: &DomainRef) -> Self {
        match DataType::from_domain(&domain.name) {
            Some(datatype) => ColumnType::Builtin(datatype),
            None => ColumnType::Reference(domain.name.to_lowercase()),
        }
    }

    /// Physical column type; references are stored as integer keys
    pub fn datatype(&self) -> DataType {
        match self {
            ColumnType::Builtin(datatype) => *datatype,
            ColumnType::Reference(_) => DataType::Integer,
        }
    }
}
