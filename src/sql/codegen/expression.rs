use crate::{
    error::{Error, Result},
    sql::parser::ast::{Consts, Expression, Operation, Param, UnaryOp},
};

/// Serializes an expression as a SQL value. Every binary operation is wrapped
/// in parentheses, so the output never depends on SQL's own precedence rules.
pub fn to_sql(expr: &Expression) -> Result<String> {
    Ok(match expr {
        Expression::Consts(consts) => constant(consts),
        Expression::Ref(name) => name.clone(),
        Expression::Unary(UnaryOp::Neg, value) => format!("(-{})", to_sql(value)?),
        Expression::Unary(UnaryOp::Not, value) => format!("(not {})", to_sql(value)?),
        Expression::Operation(operation) => {
            let (op, l, r) = infix(operation);
            format!("({} {} {})", to_sql(l)?, op, to_sql(r)?)
        }
        Expression::Call(callee, params) => {
            let Expression::Ref(name) = callee.as_ref() else {
                return Err(Error::Semantic(format!(
                    "Unsupported callee {}, only plain function names can be called",
                    describe(callee)
                )));
            };
            let args = params
                .iter()
                .map(|param| match param {
                    Param::Positional(arg) => to_sql(arg),
                    Param::Keyword(keyword, _) => Err(Error::Semantic(format!(
                        "Unsupported keyword argument {} in call to {}",
                        keyword, name
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            format!("{}({})", name, args.join(", "))
        }
        Expression::AttrAccess(..) | Expression::FieldAccess(..) => {
            return Err(Error::Semantic(format!(
                "Unsupported expression {} in value position",
                describe(expr)
            )));
        }
    })
}

/// Renders a literal; strings are single-quoted with embedded quotes doubled
fn constant(consts: &Consts) -> String {
    match consts {
        Consts::Null => "null".to_string(),
        Consts::Boolean(true) => "true".to_string(),
        Consts::Boolean(false) => "false".to_string(),
        Consts::Integer(i) => i.to_string(),
        // Debug keeps the decimal point on whole numbers (2.0, not 2)
        Consts::Float(f) => format!("{:?}", f),
        Consts::String(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// SQL spelling and operands of a binary operation
fn infix(operation: &Operation) -> (&'static str, &Expression, &Expression) {
    let op = match operation {
        Operation::Add(..) => "+",
        Operation::Subtract(..) => "-",
        Operation::Multiply(..) => "*",
        Operation::Divide(..) => "/",
        Operation::And(..) => "and",
        Operation::Or(..) => "or",
        Operation::Less(..) => "<",
        Operation::LessEqual(..) => "<=",
        Operation::Greater(..) => ">",
        Operation::GreaterEqual(..) => ">=",
        Operation::Equal(..) => "=",
        Operation::NotEqual(..) => "<>",
        Operation::In(..) => "in",
        Operation::NotIn(..) => "not in",
        Operation::Is(..) => "is",
        Operation::IsNot(..) => "is not",
    };
    let (l, r) = operation.operands();
    (op, l, r)
}

/// Short description of an expression's shape for diagnostics
fn describe(expr: &Expression) -> String {
    match expr {
        Expression::Ref(name) => name.clone(),
        Expression::AttrAccess(value, attr) => format!("{}.{}", describe(value), attr),
        Expression::FieldAccess(value, field) => format!("{}:{}", describe(value), field),
        Expression::Call(callee, _) => format!("{}(...)", describe(callee)),
        Expression::Consts(_) => "literal".to_string(),
        Expression::Unary(..) => "unary expression".to_string(),
        Expression::Operation(_) => "binary expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::to_sql;
    use crate::{
        error::{Error, Result},
        sql::parser::{
            Parser,
            ast::{Param, Statement},
        },
    };

    fn value(src: &str) -> Result<String> {
        let sql = format!("create T({});", src);
        let Statement::Create(mut create) = Parser::new(&sql).parse()? else {
            return Err(Error::Internal("expected create".to_string()));
        };
        match create.instances.remove(0).params.remove(0) {
            Param::Positional(expr) => to_sql(&expr),
            p => Err(Error::Internal(format!("unexpected param {:?}", p))),
        }
    }

    #[rstest]
    #[case("1 + 2 * 3", "(1 + (2 * 3))")]
    #[case("-1 + 2", "((-1) + 2)")]
    #[case("(1 + 2) * 3", "((1 + 2) * 3)")]
    #[case("a / b - c", "((a / b) - c)")]
    #[case("not a or b and c", "((not a) or (b and c))")]
    #[case("a == 1", "(a = 1)")]
    #[case("a != 1", "(a <> 1)")]
    #[case("a <= 1", "(a <= 1)")]
    #[case("x in y", "(x in y)")]
    #[case("x not in y", "(x not in y)")]
    #[case("x is null", "(x is null)")]
    #[case("x is not null", "(x is not null)")]
    #[case("now()", "now()")]
    #[case("lower(\"A\") == b", "(lower('A') = b)")]
    #[case("coalesce(a, 1 + 2)", "coalesce(a, (1 + 2))")]
    fn test_expression_sql(#[case] src: &str, #[case] expected: &str) -> Result<()> {
        assert_eq!(value(src)?, expected);
        Ok(())
    }

    #[test]
    fn test_constant_sql() -> Result<()> {
        assert_eq!(value("42")?, "42");
        assert_eq!(value("2.0")?, "2.0");
        assert_eq!(value("0.25")?, "0.25");
        assert_eq!(value("true")?, "true");
        assert_eq!(value("false")?, "false");
        assert_eq!(value("null")?, "null");
        assert_eq!(value("\"hello\"")?, "'hello'");
        assert_eq!(value("\"it's\"")?, "'it''s'");
        Ok(())
    }

    #[test]
    fn test_integer_bounds_sql() -> Result<()> {
        assert_eq!(value("-9223372036854775808")?, "-9223372036854775808");
        assert_eq!(value("-9223372036854775807")?, "(-9223372036854775807)");
        assert_eq!(value("-9223372036854775808 + 1")?, "(-9223372036854775808 + 1)");
        Ok(())
    }

    #[test]
    fn test_deep_expression_sql() -> Result<()> {
        let src = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(value(&src)?, "1");

        let src = format!("{}x", "- ".repeat(100));
        let expected = format!("{}x{}", "(-".repeat(100), ")".repeat(100));
        assert_eq!(value(&src)?, expected);
        Ok(())
    }

    #[rstest]
    #[case("a.b")]
    #[case("a:b")]
    #[case("a.b + 1")]
    #[case("a.f(1)")]
    #[case("f(1)(2)")]
    #[case("f(x=1)")]
    fn test_expression_unsupported(#[case] src: &str) {
        assert!(matches!(value(src), Err(Error::Semantic(_))));
    }
}
