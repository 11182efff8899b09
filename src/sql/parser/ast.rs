use serde::Serialize;

/// Abstract Syntax Tree (AST) node definitions. One compiled unit holds
/// exactly one top-level statement.
#[derive(Debug, PartialEq, Serialize)]
pub enum Statement {
    /// `record Name { field* }`
    Record(RecordDef),
    /// `create Name(...), Name(...);`
    Create(CreateStmt),
}

/// Table declaration
#[derive(Debug, PartialEq, Serialize)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

/// Column declaration inside a record
#[derive(Debug, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub domain: Domain,
    pub is_key: bool,
    pub is_nullable: bool,
    pub is_unique: bool,
}

/// A field's declared value-space
#[derive(Debug, PartialEq, Serialize)]
pub enum Domain {
    Ref(DomainRef),
    Range(RangeDef),
}

/// Symbolic domain name, either a built-in type or another record
#[derive(Debug, PartialEq, Serialize)]
pub struct DomainRef {
    pub name: String,
}

/// Inclusive integer range `[first (, second)? .. last]`
#[derive(Debug, PartialEq, Serialize)]
pub struct RangeDef {
    pub first: i64,
    pub second: Option<i64>,
    pub last: i64,
}

/// One batch of row insertions
#[derive(Debug, PartialEq, Serialize)]
pub struct CreateStmt {
    pub instances: Vec<CreateInstance>,
}

/// `Name(param, ...)`
#[derive(Debug, PartialEq, Serialize)]
pub struct CreateInstance {
    pub name: String,
    pub params: Vec<Param>,
}

/// Call or instance parameter
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Param {
    Positional(Expression),
    Keyword(String, Expression),
}

/// Expression types
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Expression {
    /// Constant value
    Consts(Consts),
    /// Name reference
    Ref(String),
    /// `value.attr`
    AttrAccess(Box<Expression>, String),
    /// `value:field`
    FieldAccess(Box<Expression>, String),
    /// `callee(params)`
    Call(Box<Expression>, Vec<Param>),
    /// Prefix operation
    Unary(UnaryOp, Box<Expression>),
    /// Infix operation
    Operation(Operation),
}

impl Param {
    pub fn expression(&self) -> &Expression {
        match self {
            Param::Positional(expr) | Param::Keyword(_, expr) => expr,
        }
    }
}

impl Expression {
    /// Height of the expression tree, walked with an explicit stack
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 1)];
        while let Some((expr, level)) = stack.pop() {
            height = height.max(level);
            match expr {
                Expression::Consts(_) | Expression::Ref(_) => {}
                Expression::AttrAccess(value, _)
                | Expression::FieldAccess(value, _)
                | Expression::Unary(_, value) => stack.push((value.as_ref(), level + 1)),
                Expression::Call(callee, params) => {
                    stack.push((callee.as_ref(), level + 1));
                    stack.extend(params.iter().map(|p| (p.expression(), level + 1)));
                }
                Expression::Operation(operation) => {
                    let (l, r) = operation.operands();
                    stack.push((l, level + 1));
                    stack.push((r, level + 1));
                }
            }
        }
        height
    }
}

impl From<Consts> for Expression {
    fn from(value: Consts) -> Self {
        Self::Consts(value)
    }
}

impl From<Operation> for Expression {
    fn from(value: Operation) -> Self {
        Self::Operation(value)
    }
}

/// Constant values
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Consts {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
}

/// Binary operations
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Operation {
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    LessEqual(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    GreaterEqual(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    In(Box<Expression>, Box<Expression>),
    NotIn(Box<Expression>, Box<Expression>),
    Is(Box<Expression>, Box<Expression>),
    IsNot(Box<Expression>, Box<Expression>),
}

impl Operation {
    pub fn operands(&self) -> (&Expression, &Expression) {
        let (l, r) = match self {
            Operation::Add(l, r)
            | Operation::Subtract(l, r)
            | Operation::Multiply(l, r)
            | Operation::Divide(l, r)
            | Operation::And(l, r)
            | Operation::Or(l, r)
            | Operation::Less(l, r)
            | Operation::LessEqual(l, r)
            | Operation::Greater(l, r)
            | Operation::GreaterEqual(l, r)
            | Operation::Equal(l, r)
            | Operation::NotEqual(l, r)
            | Operation::In(l, r)
            | Operation::NotIn(l, r)
            | Operation::Is(l, r)
            | Operation::IsNot(l, r) => (l, r),
        };
        (l.as_ref(), r.as_ref())
    }
}
