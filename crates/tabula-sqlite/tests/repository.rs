//! Integration tests for the SQLite repository against a real database
//! file.

mod common;

use chrono::NaiveDate;
use common::{people_spec, test_db};
use tabula_core::builder::{ColumnDef, Order};
use tabula_core::schema::{ColumnType, GenericType};
use tabula_core::{CancellationToken, ColumnarTable, DynamicRow, Error, ErrorKind, SqlValue};
use tabula_sqlite::{Filter, UpsertOutcome, UpsertSummary};

fn person(name: &str, age: i64) -> DynamicRow {
    DynamicRow::new().with("Name", name).with("Age", age)
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

// =============================================================================
// Table lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_from_spec_and_read_back() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    db.repo.add("People", &person("Ada", 36)).await.unwrap();
    db.repo.add("People", &person("Bob", 25)).await.unwrap();

    let rows = db.repo.get_all("People").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Id"), Some(&SqlValue::Int(1)));
    assert_eq!(rows[0].get("name"), Some(&text("Ada")));
    assert_eq!(rows[1].get("Age"), Some(&SqlValue::Int(25)));
}

#[tokio::test]
async fn test_create_existing_table_is_conflict() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    let err = db.repo.create_table_from_spec(&people_spec()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_create_table_first_column_is_key() {
    let db = test_db();
    db.repo
        .create_table("notes", &[("id", ColumnType::Integer), ("body", ColumnType::Text)], None)
        .await
        .unwrap();
    db.repo
        .add("notes", &DynamicRow::new().with("body", "first"))
        .await
        .unwrap();

    let columns = db.repo.column_metadata("notes").await.unwrap();
    assert!(columns[0].is_primary_key);
    assert!(columns[0].is_auto_incrementing);
    assert!(!columns[1].is_primary_key);

    let row = db.repo.get_by_id("notes", "id", 1).await.unwrap().unwrap();
    assert_eq!(row.get("body"), Some(&text("first")));
}

#[tokio::test]
async fn test_create_table_with_text_key() {
    let db = test_db();
    db.repo
        .create_table(
            "codes",
            &[("label", ColumnType::Text), ("code", ColumnType::Text)],
            Some("code"),
        )
        .await
        .unwrap();

    let columns = db.repo.column_metadata("codes").await.unwrap();
    assert!(columns[1].is_primary_key);
    assert!(!columns[1].is_auto_incrementing);
}

#[tokio::test]
async fn test_create_table_unknown_key_column() {
    let db = test_db();
    let err = db
        .repo
        .create_table("t", &[("a", ColumnType::Text)], Some("b"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_create_table_with_is_idempotent() {
    let db = test_db();
    let columns = || {
        vec![
            ColumnDef::new("id", ColumnType::Integer).primary_key().auto_increment(),
            ColumnDef::new("status", ColumnType::Text)
                .not_null()
                .default_value("open"),
        ]
    };
    db.repo.create_table_with("tickets", columns()).await.unwrap();
    db.repo.create_table_with("tickets", columns()).await.unwrap();

    db.repo
        .add("tickets", &DynamicRow::new().with("id", 7))
        .await
        .unwrap();
    let row = db.repo.get_by_id("tickets", "id", 7).await.unwrap().unwrap();
    assert_eq!(row.get("status"), Some(&text("open")));
}

#[tokio::test]
async fn test_rename_and_drop() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    db.repo.rename_table("People", "Staff").await.unwrap();

    let err = db.repo.get_all("People").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(db.repo.get_all("Staff").await.unwrap().is_empty());

    db.repo.drop_table("Staff").await.unwrap();
    db.repo.drop_table("Staff").await.unwrap();
    assert_eq!(
        db.repo.get_all("Staff").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_rename_onto_existing_table_is_conflict() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    db.repo
        .create_table("Staff", &[("id", ColumnType::Integer)], None)
        .await
        .unwrap();
    let err = db.repo.rename_table("People", "Staff").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_invalid_names_never_reach_the_database() {
    let db = test_db();
    let err = db.repo.get_all("People; DROP TABLE x").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = db
        .repo
        .add("People", &DynamicRow::new().with("bad name", 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = db.repo.drop_table("select").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// Reads and writes
// =============================================================================

#[tokio::test]
async fn test_get_by_id_missing_row() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    assert!(db.repo.get_by_id("People", "Id", 42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_with_filters_and_order() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    for (name, age) in [("Ada", 36), ("Bob", 25), ("Cy", 51), ("Di", 19)] {
        db.repo.add("People", &person(name, age)).await.unwrap();
    }

    let filters = [
        Filter::parse("Age", ">", 40).unwrap(),
        Filter::eq("Name", "Di"),
    ];
    let rows = db
        .repo
        .get("People", &["Name"], &filters, &[("Age", Order::Desc)])
        .await
        .unwrap();

    let names: Vec<_> = rows.iter().filter_map(|r| r.get("Name").cloned()).collect();
    assert_eq!(names, vec![text("Cy"), text("Di")]);
    assert_eq!(rows[0].len(), 1);
}

#[tokio::test]
async fn test_get_like_filter() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    db.repo.add("People", &person("Alice", 30)).await.unwrap();
    db.repo.add("People", &person("Bob", 31)).await.unwrap();

    let filters = [Filter::parse("Name", "like", "Al%").unwrap()];
    let rows = db.repo.get("People", &[], &filters, &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Name"), Some(&text("Alice")));
}

#[tokio::test]
async fn test_update_and_delete_counts() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    for (name, age) in [("Ada", 36), ("Bob", 25), ("Cy", 51)] {
        db.repo.add("People", &person(name, age)).await.unwrap();
    }

    let changed = db
        .repo
        .update_by_id("People", &DynamicRow::new().with("Age", 37), "Id", 1)
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let changed = db
        .repo
        .update_where(
            "People",
            &DynamicRow::new().with("Age", 0),
            &[Filter::parse("Age", "<", 30).unwrap()],
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let gone = db
        .repo
        .delete_where("People", &[Filter::parse("Age", ">=", 37).unwrap()])
        .await
        .unwrap();
    assert_eq!(gone, 2);

    assert_eq!(db.repo.delete_by_id("People", "Id", 2).await.unwrap(), 1);
    assert_eq!(db.repo.delete_by_id("People", "Id", 2).await.unwrap(), 0);
    assert!(db.repo.get_all("People").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_where_operations_require_conditions() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    let err = db.repo.delete_where("People", &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_delete_where_matches_any_filter() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    for (name, age) in [("Ada", 36), ("Bob", 25), ("Cy", 51)] {
        db.repo.add("People", &person(name, age)).await.unwrap();
    }

    let filters = [Filter::eq("Name", "Ada"), Filter::eq("Name", "Cy")];
    let gone = db.repo.delete_where("People", &filters).await.unwrap();
    assert_eq!(gone, 2);

    let left = db.repo.get_all("People").await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].get("Name"), Some(&text("Bob")));
}

#[tokio::test]
async fn test_duplicate_key_is_conflict() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    let row = person("Ada", 36).with("Id", 5);
    db.repo.add("People", &row).await.unwrap();
    let err = db.repo.add("People", &row).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_datetime_is_stored_as_text() {
    let db = test_db();
    db.repo
        .create_table(
            "events",
            &[("id", ColumnType::Integer), ("at", ColumnType::Text)],
            None,
        )
        .await
        .unwrap();
    let at = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .unwrap();
    db.repo
        .add("events", &DynamicRow::new().with("at", at))
        .await
        .unwrap();

    let row = db.repo.get_by_id("events", "id", 1).await.unwrap().unwrap();
    assert_eq!(row.get("at"), Some(&text("2024-01-02 03:04:05")));
}

// =============================================================================
// Upserts
// =============================================================================

#[tokio::test]
async fn test_upsert_updates_existing_and_inserts_new() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    db.repo.add("People", &person("Ada", 36)).await.unwrap();

    let outcome = db
        .repo
        .upsert("People", &person("Ada L.", 37).with("Id", 1), "Id")
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(db.repo.get_all("People").await.unwrap().len(), 1);

    let outcome = db
        .repo
        .upsert("People", &person("Bob", 25).with("Id", 9), "Id")
        .await
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);

    let rows = db.repo.get_all("People").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Name"), Some(&text("Ada L.")));
    assert_eq!(rows[1].get("Id"), Some(&SqlValue::Int(9)));
}

#[tokio::test]
async fn test_upsert_requires_key_in_row() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    let err = db
        .repo
        .upsert("People", &person("Ada", 36), "Id")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(db.repo.get_all("People").await.unwrap().is_empty());
}

// =============================================================================
// Bulk operations
// =============================================================================

fn people_data() -> ColumnarTable {
    let mut data = ColumnarTable::new("People");
    data.push_column("Id", vec![SqlValue::Int(100), SqlValue::Int(200)]);
    data.push_column("Name", vec![text("Ada"), text("Bob")]);
    data.push_column("Age", vec![SqlValue::Int(36), SqlValue::Null]);
    data
}

#[tokio::test]
async fn test_insert_columnar_skips_identity_columns() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();

    let written = db
        .repo
        .insert_columnar(&people_data(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(written, 2);

    let rows = db.repo.get_all("People").await.unwrap();
    assert_eq!(rows[0].get("Id"), Some(&SqlValue::Int(1)));
    assert_eq!(rows[1].get("Id"), Some(&SqlValue::Int(2)));
    assert_eq!(rows[1].get("Age"), Some(&SqlValue::Null));
}

#[tokio::test]
async fn test_insert_columnar_cancelled_before_start() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let err = db
        .repo
        .insert_columnar(&people_data(), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(db.repo.get_all("People").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_columnar_cancelled_mid_run_keeps_written_rows() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();

    let total = 20_000;
    let mut data = ColumnarTable::new("People");
    data.push_column(
        "Name",
        (0..total).map(|i| text(&format!("P{i}"))).collect(),
    );
    data.push_column("Age", (0..total).map(|_| SqlValue::Null).collect());

    let token = CancellationToken::new();
    let first_row = [Filter::eq("Id", 1)];
    let cancel_after_first_row = async {
        for _ in 0..100_000 {
            let seen = db
                .repo
                .get("People", &["Id"], &first_row, &[])
                .await
                .unwrap_or_default();
            if !seen.is_empty() {
                token.cancel();
                return;
            }
            tokio::task::yield_now().await;
        }
    };

    let (result, ()) = tokio::join!(
        db.repo.insert_columnar(&data, &token),
        cancel_after_first_row
    );
    assert!(matches!(result, Err(Error::Cancelled)));

    let rows = db
        .repo
        .get("People", &[], &[], &[("Id", Order::Asc)])
        .await
        .unwrap();
    assert!(!rows.is_empty());
    assert!(rows.len() < total);
    for (i, row) in rows.iter().enumerate() {
        let id = i64::try_from(i).unwrap() + 1;
        assert_eq!(row.get("Id"), Some(&SqlValue::Int(id)));
        assert_eq!(row.get("Name"), Some(&text(&format!("P{i}"))));
    }
}

#[tokio::test]
async fn test_insert_columnar_missing_table() {
    let db = test_db();
    let err = db
        .repo
        .insert_columnar(&people_data(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_upsert_columnar_counts() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();
    db.repo
        .add("People", &person("Old", 1).with("Id", 100))
        .await
        .unwrap();

    let summary = db
        .repo
        .upsert_columnar(&people_data(), "Id", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        summary,
        UpsertSummary {
            inserted: 1,
            updated: 1
        }
    );

    let row = db.repo.get_by_id("People", "Id", 100).await.unwrap().unwrap();
    assert_eq!(row.get("Name"), Some(&text("Ada")));
}

// =============================================================================
// Introspection
// =============================================================================

#[tokio::test]
async fn test_column_metadata_of_compiled_table() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();

    let columns = db.repo.column_metadata("People").await.unwrap();
    assert_eq!(columns.len(), 3);

    assert_eq!(columns[0].name, "Id");
    assert!(columns[0].is_primary_key);
    assert!(columns[0].is_auto_incrementing);
    assert!(!columns[0].is_nullable);

    assert_eq!(columns[1].data_type, "VARCHAR");
    assert_eq!(columns[1].length, Some(50));
    assert!(!columns[1].is_nullable);

    assert!(columns[2].is_nullable);
}

#[tokio::test]
async fn test_get_columns_generic_types() {
    let db = test_db();
    db.repo.create_table_from_spec(&people_spec()).await.unwrap();

    let columns = db.repo.get_columns("People").await.unwrap();
    assert_eq!(
        columns,
        vec![
            (String::from("Id"), GenericType::Integer),
            (String::from("Name"), GenericType::String),
            (String::from("Age"), GenericType::Integer),
        ]
    );
}

#[tokio::test]
async fn test_column_metadata_missing_table() {
    let db = test_db();
    let err = db.repo.column_metadata("Nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
