use super::*;
use duq_core::{FailurePolicy, NodeStatus};
use duq_db::DuckDbBackend;
use std::path::Path;

fn model(file: &str, sql: &str) -> SqlModel {
    SqlModel::parse(sql, Some(Path::new(file))).unwrap()
}

fn json_args() -> RunArgs {
    RunArgs {
        db_path: None,
        parallel: false,
        threads: None,
        fail_fast: false,
        output: OutputFormat::Json,
        quiet: true,
    }
}

fn context(db: Arc<DuckDbBackend>, models: &[SqlModel], mode: Materialization) -> ExecutionContext {
    ExecutionContext::new(
        db,
        render_statements(models, mode),
        mode,
        &json_args(),
        models.len(),
    )
}

fn healthy_models() -> Vec<SqlModel> {
    vec![
        model(
            "raw_orders.sql",
            "SELECT * FROM (VALUES (1, 10), (2, 20), (3, 30)) t(id, amount)",
        ),
        model("stg_orders.sql", "SELECT id, amount FROM raw_orders WHERE amount > 10"),
        model(
            "fct_revenue.sql",
            "SELECT sum(amount) AS revenue FROM stg_orders",
        ),
    ]
}

#[test]
fn test_render_statements() {
    let statements = render_statements(&healthy_models(), Materialization::View);
    assert_eq!(statements.len(), 3);
    assert!(statements["stg_orders"].starts_with("CREATE OR REPLACE VIEW \"stg_orders\" AS"));
}

#[test]
fn test_json_context_has_no_progress_bar() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ctx = context(db, &healthy_models(), Materialization::Table);
    assert!(ctx.progress.is_none());
}

#[tokio::test]
async fn test_sequential_run_materializes_everything() {
    let models = healthy_models();
    let graph = DependencyGraph::build(&models).unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ctx = context(Arc::clone(&db), &models, Materialization::Table);

    let result = execute_models(&ctx, &graph, RunOptions::default(), false)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(db.query_count("SELECT * FROM stg_orders").await.unwrap(), 2);
    assert!(db.relation_exists("fct_revenue").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_run_materializes_everything() {
    let models = healthy_models();
    let graph = DependencyGraph::build(&models).unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ctx = context(Arc::clone(&db), &models, Materialization::View);

    let result = execute_models(&ctx, &graph, RunOptions::default(), true)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.summary().succeeded, 3);
    assert_eq!(db.query_count("SELECT * FROM fct_revenue").await.unwrap(), 1);
}

#[tokio::test]
async fn test_failure_is_contained() {
    let mut models = healthy_models();
    // references a column that does not exist, fails at execution time
    models.push(model("broken.sql", "SELECT missing_column FROM raw_orders"));
    models.push(model("downstream.sql", "SELECT * FROM broken"));
    models.push(model("sibling.sql", "SELECT count(*) AS n FROM raw_orders"));

    let graph = DependencyGraph::build(&models).unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ctx = context(Arc::clone(&db), &models, Materialization::Table);

    let result = execute_models(&ctx, &graph, RunOptions::default(), true)
        .await
        .unwrap();

    assert!(!result.is_success());
    assert!(matches!(
        result.status_of("broken"),
        Some(NodeStatus::Failed { cause }) if cause.contains("[D002]")
    ));
    assert!(matches!(
        result.status_of("downstream"),
        Some(NodeStatus::Skipped { .. })
    ));
    assert_eq!(result.status_of("sibling"), Some(&NodeStatus::Succeeded));
    assert_eq!(result.status_of("fct_revenue"), Some(&NodeStatus::Succeeded));
    assert!(!db.relation_exists("downstream").await.unwrap());
}

#[tokio::test]
async fn test_fail_fast_sequential() {
    let models = vec![
        model("broken.sql", "SELECT * FROM not_a_table"),
        model("fine.sql", "SELECT 1 AS one"),
    ];
    let graph = DependencyGraph::build(&models).unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ctx = context(Arc::clone(&db), &models, Materialization::Table);
    let options = RunOptions {
        policy: FailurePolicy::FailFast,
        ..RunOptions::default()
    };

    let result = execute_models(&ctx, &graph, options, false).await.unwrap();

    assert_eq!(result.summary().failed, 1);
    assert_eq!(result.summary().skipped, 1);
    assert!(!db.relation_exists("fine").await.unwrap());
}

#[tokio::test]
async fn test_missing_statement_fails_model() {
    let models = healthy_models();
    let graph = DependencyGraph::build(&models).unwrap();
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ctx = ExecutionContext::new(
        db,
        HashMap::new(),
        Materialization::Table,
        &json_args(),
        0,
    );

    let result = execute_models(&ctx, &graph, RunOptions::default(), false)
        .await
        .unwrap();

    assert!(matches!(
        result.status_of("raw_orders"),
        Some(NodeStatus::Failed { cause }) if cause.contains("no statement rendered")
    ));
    assert_eq!(result.summary().skipped, 2);
}
