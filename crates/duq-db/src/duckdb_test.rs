use super::*;
use std::sync::Arc;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::new(IN_MEMORY).unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_materialize_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE OR REPLACE TABLE \"answer\" AS SELECT 42 AS value")
        .await
        .unwrap();

    assert!(db.relation_exists("answer").await.unwrap());
    assert_eq!(db.query_count("SELECT * FROM answer").await.unwrap(), 1);
}

#[tokio::test]
async fn test_materialize_view_twice() {
    let db = DuckDbBackend::in_memory().unwrap();
    for _ in 0..2 {
        db.execute_batch("CREATE OR REPLACE VIEW \"v\" AS SELECT 1 AS id")
            .await
            .unwrap();
    }
    assert!(db.relation_exists("v").await.unwrap());
}

#[tokio::test]
async fn test_query_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .await
        .unwrap();

    let count = db.query_count("SELECT * FROM nums").await.unwrap();
    assert_eq!(count, 10);
}

#[tokio::test]
async fn test_execute_returns_affected_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    let inserted = db.execute("INSERT INTO t VALUES (1), (2), (3)").await.unwrap();
    assert_eq!(inserted, 3);
}

#[tokio::test]
async fn test_execute_batch() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t1 (id INT); CREATE TABLE t2 (id INT); INSERT INTO t1 VALUES (1);",
    )
    .await
    .unwrap();

    assert!(db.relation_exists("t1").await.unwrap());
    assert!(db.relation_exists("t2").await.unwrap());
}

#[tokio::test]
async fn test_relation_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("nonexistent").await.unwrap());
    assert!(!db.relation_exists("it's").await.unwrap());
}

#[tokio::test]
async fn test_schema_qualified_relation() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE SCHEMA staging; CREATE TABLE staging.orders AS SELECT 1 AS id")
        .await
        .unwrap();

    assert!(db.relation_exists("staging.orders").await.unwrap());
    assert!(!db.relation_exists("orders").await.unwrap());
}

#[tokio::test]
async fn test_missing_table_is_execution_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .execute_batch("CREATE TABLE t AS SELECT * FROM missing_upstream")
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ExecutionError(_)));
    assert!(err.to_string().starts_with("[D002]"));
    assert!(err.to_string().contains("missing_upstream"));
}

#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("warehouse.duckdb");

    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.execute_batch("CREATE TABLE kept AS SELECT 1 AS id")
            .await
            .unwrap();
    }

    let reopened = DuckDbBackend::new(path.to_str().unwrap()).unwrap();
    assert!(reopened.relation_exists("kept").await.unwrap());
}

#[tokio::test]
async fn test_unopenable_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("no_such_dir").join("db.duckdb");

    let err = DuckDbBackend::from_path(&path).unwrap_err();
    assert!(matches!(err, DbError::ConnectionError(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_across_tasks() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let db = Arc::clone(&db);
            tokio::spawn(async move {
                db.execute_batch(&format!("CREATE TABLE t{} AS SELECT {} AS id", i, i))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..8 {
        assert!(db.relation_exists(&format!("t{}", i)).await.unwrap());
    }
}
