use std::io::Write;

use pretty_assertions::assert_eq;
use recsql::{Compiler, Error, Result};

fn compile(source: &str) -> Result<String> {
    Compiler::new().compile(source)
}

#[test]
fn record_to_create_table() -> Result<()> {
    let sql = compile(
        "# people and their departments
        record Person {
            id! Integer;
            age [0..150];
            name String;
            nick? unique String;
            dept Department;
        }",
    )?;
    assert_eq!(
        sql,
        "create table Person (
\tid integer not null,
\tage integer check (age between 0 and 150) not null,
\tname text not null,
\tnick text unique,
\tdept integer references department not null,
\tprimary key (id)
);"
    );
    Ok(())
}

#[test]
fn nullability_and_uniqueness_follow_declarations() -> Result<()> {
    let sql = compile("record R { a Integer; b? Integer; c unique Integer; d? unique Integer; }")?;
    let lines = sql.lines().skip(1).take(4).collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "\ta integer not null,",
            "\tb integer,",
            "\tc integer unique not null,",
            "\td integer unique",
        ]
    );
    assert!(!sql.contains("primary key"));
    Ok(())
}

#[test]
fn composite_primary_key_in_declaration_order() -> Result<()> {
    let sql = compile("record Enrollment { course! Course; note String; student! Student; }")?;
    assert_eq!(sql.matches("primary key").count(), 1);
    assert!(sql.ends_with("\tprimary key (course, student)\n);"));
    Ok(())
}

#[test]
fn create_batch_is_transactional() -> Result<()> {
    let sql = compile("create Person(id=1, age=30), Person(id=2, age=40);")?;
    assert_eq!(
        sql,
        "begin;
set constraints all deferred;
insert into Person (id, age)
\tvalues (1, 30);
insert into Person (id, age)
\tvalues (2, 40);
commit;"
    );

    let single = compile("create Person(1, \"Bob\", 2 * (3 + 4));")?;
    assert_eq!(single, "insert into Person values (1, 'Bob', (2 * (3 + 4)));");
    assert!(!single.contains("begin"));
    Ok(())
}

#[test]
fn fatal_errors_produce_nothing() {
    assert!(matches!(compile("create P(id=1, 2);"), Err(Error::Semantic(_))));
    assert!(matches!(compile("create P(a < b < c);"), Err(Error::Parse(_))));
    assert!(matches!(compile("record R { n [1, 2..3]; }"), Err(Error::Semantic(_))));
    assert!(matches!(compile("create P(now.day);"), Err(Error::Semantic(_))));
    assert!(matches!(compile("record R { a Integer }"), Err(Error::Parse(_))));
}

#[test]
fn deep_nesting_fails_cleanly() {
    let nested = |open: &str, close: &str, n: usize| {
        format!("create P({}1{});", open.repeat(n), close.repeat(n))
    };
    for src in [
        nested("(", ")", 2000),
        nested("- ", "", 2000),
        nested("not ", "", 2000),
        nested("f(", ")", 2000),
        format!("create P({});", vec!["1"; 5000].join(" + ")),
    ] {
        assert!(matches!(compile(&src), Err(Error::Parse(_))));
    }
}

#[test]
fn extreme_integer_literals() -> Result<()> {
    assert_eq!(
        compile("create P(-9223372036854775808, 9223372036854775807);")?,
        "insert into P values (-9223372036854775808, 9223372036854775807);"
    );
    assert_eq!(
        compile("create P(9223372036854775808);"),
        Err(Error::Parse(
            "[Parser] Invalid number literal 9223372036854775808 at 1:10 \
             (number too large to fit in target type)"
                .to_string()
        ))
    );
    Ok(())
}

#[test]
fn long_lines_keep_positions() -> Result<()> {
    let instances = vec!["P(\"x\" == y)"; 1000].join(", ");
    let mut compiler = Compiler::new();
    compiler.compile(&format!("create {} @;", instances))?;
    let column = "create ".len() + instances.chars().count() + 2;
    assert_eq!(
        compiler.diagnostics(),
        &[Error::Lex { character: '@', line: 1, column }]
    );
    Ok(())
}

#[test]
fn illegal_characters_are_reported_and_skipped() -> Result<()> {
    let mut compiler = Compiler::new();
    let sql = compiler.compile("create P(1,\n  @2);")?;
    assert_eq!(sql, "insert into P values (1, 2);");
    assert_eq!(compiler.diagnostics().len(), 1);
    assert_eq!(
        compiler.diagnostics()[0].to_string(),
        "Illegal character '@' at 2:3"
    );
    assert!(compiler.diagnostics()[0].is_recoverable());
    Ok(())
}

#[test]
fn compile_from_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "create Tag(name=\"o'brien\", weight=-0.5);")?;
    let sql = Compiler::new().compile_file(file.path())?;
    assert_eq!(sql, "insert into Tag (name, weight)\n\tvalues ('o''brien', (-0.5));");
    Ok(())
}
