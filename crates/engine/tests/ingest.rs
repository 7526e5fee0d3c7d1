use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
    Statement,
};

use engine::{Engine, EngineError};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn upload_and_ingest(
    engine: &Engine,
    filename: &str,
    content: &str,
) -> (Uuid, engine::IngestOutcome) {
    let file_id = engine
        .upload_source_file("alice", filename, content)
        .await
        .unwrap();
    let outcome = engine.ingest(file_id, "alice").await.unwrap();
    (file_id, outcome)
}

#[tokio::test]
async fn ingest_reports_inserted_and_failed_counts() {
    let (engine, db) = engine_with_db().await;

    let (file_id, outcome) = upload_and_ingest(
        &engine,
        "statement.csv",
        "Category,2022,2023\nSales,1000,2000\nRent,abc,500\n,10,20\n",
    )
    .await;

    // Sales 2 cells + Rent 1 cell inserted; Rent "abc" and the empty
    // category row each produce one error record.
    assert_eq!(outcome.rows_inserted, 3);
    assert_eq!(outcome.rows_failed, 2);

    let records = engine::records::Entity::find()
        .filter(engine::records::Column::SourceFileId.eq(file_id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|record| record.recurring));

    let errors = engine.parse_errors(file_id, "alice").await.unwrap();
    assert_eq!(errors.len(), 2);
    let invalid = errors
        .iter()
        .find(|e| e.kind == engine::parse_errors::KIND_INVALID_NUMBER)
        .unwrap();
    assert_eq!(invalid.raw_value, "abc");
    assert_eq!(invalid.column, "2022");
    assert_eq!(invalid.row, 2);
    let empty = errors
        .iter()
        .find(|e| e.kind == engine::parse_errors::KIND_EMPTY_CELL)
        .unwrap();
    assert_eq!(empty.row, 3);
    assert_eq!(empty.column, "Category");
}

#[tokio::test]
async fn large_statements_are_ingested_in_full() {
    let (engine, db) = engine_with_db().await;

    // Enough rows that the record batch spans several inserts.
    let mut content = String::from("Category,2022,2023\n");
    for i in 0..180 {
        content.push_str(&format!("Vendor {i},10,20\n"));
    }
    let (file_id, outcome) = upload_and_ingest(&engine, "big.csv", &content).await;
    assert_eq!(outcome.rows_inserted, 360);
    assert_eq!(outcome.rows_failed, 0);

    let records = engine::records::Entity::find()
        .filter(engine::records::Column::SourceFileId.eq(file_id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(records.len(), 360);
}

#[tokio::test]
async fn category_names_are_reused_case_insensitively() {
    let (engine, db) = engine_with_db().await;

    upload_and_ingest(&engine, "first.csv", "Category,2022\nWages,100\n").await;
    upload_and_ingest(&engine, "second.csv", "Category,2022\n  wages ,200\n").await;

    let categories = engine.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Wages");
    assert_eq!(categories[0].kind, "income");

    let records = engine::records::Entity::find().all(&db).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(
        records
            .iter()
            .all(|record| record.category_id == categories[0].id)
    );
}

#[tokio::test]
async fn existing_category_kind_is_never_reclassified() {
    let (engine, _db) = engine_with_db().await;

    // "Wages" is created as income by the first file; a later file with
    // the same name cannot change that.
    upload_and_ingest(&engine, "first.csv", "Category,2022\nWages,100\n").await;
    upload_and_ingest(&engine, "second.csv", "Category,2023\nwages,50\n").await;

    let categories = engine.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].kind, "income");
}

#[tokio::test]
async fn new_categories_get_keyword_guessed_kinds() {
    let (engine, _db) = engine_with_db().await;

    upload_and_ingest(
        &engine,
        "statement.csv",
        "Category,2023\nEquipment Loan,10\nEmployee Wages,20\nOffice Rent,30\nMystery Item,40\n",
    )
    .await;

    let categories = engine.list_categories().await.unwrap();
    let kind_of = |name: &str| {
        categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.kind.clone())
            .unwrap()
    };
    assert_eq!(kind_of("Equipment Loan"), "debt");
    assert_eq!(kind_of("Employee Wages"), "income");
    assert_eq!(kind_of("Office Rent"), "expense");
    assert_eq!(kind_of("Mystery Item"), "expense");
}

#[tokio::test]
async fn reingest_of_processed_file_is_refused() {
    let (engine, db) = engine_with_db().await;

    let (file_id, _) =
        upload_and_ingest(&engine, "statement.csv", "Category,2023\nSales,100\n").await;

    let err = engine.ingest(file_id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyProcessed(_)));

    // No double-inserted records.
    let records = engine::records::Entity::find().all(&db).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn statement_without_year_columns_writes_nothing() {
    let (engine, db) = engine_with_db().await;

    let file_id = engine
        .upload_source_file("alice", "notes.csv", "Category,Notes\nSales,hello\n")
        .await
        .unwrap();
    let err = engine.ingest(file_id, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::NoYearColumns);

    let records = engine::records::Entity::find().all(&db).await.unwrap();
    assert!(records.is_empty());
    let categories = engine.list_categories().await.unwrap();
    assert!(categories.is_empty());

    // The file stays ingestable; the failed pass left no processed mark.
    let files = engine.list_source_files("alice").await.unwrap();
    assert!(files[0].processed_at.is_none());
}

#[tokio::test]
async fn other_users_files_are_hidden() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["bob".into(), "password".into()],
    ))
    .await
    .unwrap();

    let file_id = engine
        .upload_source_file("alice", "statement.csv", "Category,2023\nSales,100\n")
        .await
        .unwrap();

    let err = engine.ingest(file_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.pivot(file_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn pivot_sums_duplicate_category_year_rows() {
    let (engine, _db) = engine_with_db().await;

    let (file_id, _) = upload_and_ingest(
        &engine,
        "statement.csv",
        "Category,2023\nSales,1000\nSales,500\nOffice Rent,-200\n",
    )
    .await;

    let (file, pivot) = engine.pivot(file_id, "alice").await.unwrap();
    assert_eq!(file.id, file_id);
    assert!(file.processed_at.is_some());

    assert_eq!(pivot.by_category["Sales"][&2023], 1500.0);
    assert_eq!(pivot.summary.total_expenses, -200.0);
    assert_eq!(pivot.grand_total, 1300.0);
    assert_eq!(pivot.records.len(), 3);
}

#[tokio::test]
async fn pivot_of_empty_file_is_empty() {
    let (engine, _db) = engine_with_db().await;

    // A file that was parsed but produced only errors still pivots.
    let (file_id, outcome) =
        upload_and_ingest(&engine, "statement.csv", "Category,2023\nSales,abc\n").await;
    assert_eq!(outcome.rows_inserted, 0);
    assert_eq!(outcome.rows_failed, 1);

    let (_, pivot) = engine.pivot(file_id, "alice").await.unwrap();
    assert!(pivot.years.is_empty());
    assert!(pivot.category_names.is_empty());
    assert_eq!(pivot.grand_total, 0.0);
}
