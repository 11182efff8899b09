use crate::{
    error::Result,
    sql::{
        codegen::{Generator, expression},
        plan::Row,
    },
};

/// INSERT generator for one create statement
pub struct Insert {
    rows: Vec<Row>,
}

impl Insert {
    pub fn new(rows: Vec<Row>) -> Box<Self> {
        Box::new(Self { rows })
    }
}

impl Generator for Insert {
    fn generate(self: Box<Self>) -> Result<String> {
        let inserts = self
            .rows
            .iter()
            .map(insert_row)
            .collect::<Result<Vec<_>>>()?
            .join("\n");
        if self.rows.len() > 1 {
            // Rows in one batch may reference each other, so checks wait for commit
            return Ok(format!(
                "begin;\nset constraints all deferred;\n{}\ncommit;",
                inserts
            ));
        }
        Ok(inserts)
    }
}

// insert into tbl (a, b)
//     values (1, 2);
// insert into tbl values (1, 2);
fn insert_row(row: &Row) -> Result<String> {
    if row.values.is_empty() {
        return Ok(format!("insert into {} default values;", row.table_name));
    }
    let values = row
        .values
        .iter()
        .map(expression::to_sql)
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    Ok(match &row.columns {
        Some(columns) => format!(
            "insert into {} ({})\n\tvalues ({});",
            row.table_name,
            columns.join(", "),
            values
        ),
        None => format!("insert into {} values ({});", row.table_name, values),
    })
}
