use crate::{
    error::Result,
    sql::{
        codegen::{mutation::Insert, schema::CreateTable},
        plan::Node,
    },
};

mod expression;
mod mutation;
mod schema;

/// SQL text generator for one plan node
pub trait Generator {
    fn generate(self: Box<Self>) -> Result<String>;
}

/// Builds a generator from a plan node
impl dyn Generator {
    pub fn build(node: Node) -> Box<dyn Generator> {
        match node {
            Node::CreateTable { schema } => CreateTable::new(schema),
            Node::Insert { rows } => Insert::new(rows),
        }
    }
}
