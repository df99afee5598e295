use super::*;

#[test]
fn test_parse_select() {
    let parser = SqlParser::duckdb();
    let stmts = parser
        .parse("SELECT id, name FROM users WHERE id = 1")
        .unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_parse_multiple_statements() {
    let parser = SqlParser::duckdb();
    let stmts = parser.parse("SELECT 1; SELECT 2;").unwrap();
    assert_eq!(stmts.len(), 2);
}

#[test]
fn test_parse_empty() {
    let parser = SqlParser::duckdb();
    let result = parser.parse("   \n ");
    assert!(matches!(result, Err(SqlError::EmptySql)));
}

#[test]
fn test_parse_error() {
    let parser = SqlParser::duckdb();
    let result = parser.parse("SELECT * FROM");
    assert!(result.is_err());
}

#[test]
fn test_parse_query_accepts_trailing_semicolon() {
    let parser = SqlParser::duckdb();
    let query = parser
        .parse_query("select id as customer_id from source;")
        .unwrap();
    assert_eq!(query.to_string(), "SELECT id AS customer_id FROM source");
}

#[test]
fn test_parse_query_accepts_cte_and_union() {
    let parser = SqlParser::duckdb();
    assert!(parser
        .parse_query("WITH s AS (SELECT * FROM raw) SELECT * FROM s")
        .is_ok());
    assert!(parser
        .parse_query("SELECT * FROM a UNION ALL SELECT * FROM b")
        .is_ok());
}

#[test]
fn test_parse_query_rejects_ddl() {
    let parser = SqlParser::duckdb();
    let result = parser.parse_query(
        r#"
        CREATE TABLE source (
            id INT,
            name VARCHAR(255)
        );
        "#,
    );
    match result {
        Err(SqlError::NotASelect(kind)) => assert_eq!(kind, "CREATE TABLE"),
        other => panic!("expected NotASelect, got {:?}", other),
    }
}

#[test]
fn test_parse_query_rejects_dml() {
    let parser = SqlParser::duckdb();
    let result = parser.parse_query("INSERT INTO t VALUES (1)");
    assert!(matches!(result, Err(SqlError::NotASelect(_))));
}

#[test]
fn test_parse_query_rejects_multiple_statements() {
    let parser = SqlParser::duckdb();
    let result = parser.parse_query("SELECT 1; SELECT 2;");
    assert!(matches!(result, Err(SqlError::MultipleStatements(2))));
}
