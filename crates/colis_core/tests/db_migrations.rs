use colis_core::db::migrations::{apply_migrations, declared_columns, latest_version};
use colis_core::db::{open_db, open_db_in_memory, DbError};
use colis_core::repo::audit_repo::{AuditRepository, SqliteAuditRepository};
use colis_core::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use colis_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use colis_core::RepoError;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "records");
    assert_table_exists(&conn, "modification_log");
    for declared in declared_columns() {
        assert_column_exists(&conn, declared.table, declared.column);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colis.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO users (username, password) VALUES ('desk', 'secret1');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let mut conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let users: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);

    let report = apply_migrations(&mut conn_second).unwrap();
    assert!(report.is_noop(), "unexpected report: {report:?}");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn legacy_database_gains_missing_columns_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite3");
    write_legacy_database(&path);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    for declared in declared_columns() {
        assert_column_exists(&conn, declared.table, declared.column);
    }

    let records = SqliteRecordRepository::try_new(&conn).unwrap();
    let record = records.get_record(1).unwrap().expect("legacy record");
    assert_eq!(record.details.name_exp, "Samir");
    assert_eq!(record.details.nmbr_package, 2);
    assert!(record.modified_at.is_none());
    assert!(record.status.is_none());
    assert_eq!(
        record.created_at.to_rfc3339(),
        "2024-03-01T08:15:42.123456+00:00"
    );

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let user = users
        .find_by_credentials("desk", "secret1")
        .unwrap()
        .expect("legacy user");
    assert_eq!(user.phone.as_deref(), Some("612345678"));
}

#[test]
fn legacy_foreign_key_does_not_block_delete() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite3");
    write_legacy_database(&path);

    let conn = open_db(&path).unwrap();
    let records = SqliteRecordRepository::try_new(&conn).unwrap();
    records.delete_record(1).unwrap();
    assert!(records.get_record(1).unwrap().is_none());

    let audit = SqliteAuditRepository::try_new(&conn).unwrap();
    let history = audit.history(1).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action_type, "MODIFICATION");
    assert!(history[0].modified_at.is_none());
}

#[test]
fn repositories_reject_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteRecordRepository::try_new(&conn)
        .err()
        .expect("raw connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn repositories_reject_schema_missing_required_column() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("ALTER TABLE records DROP COLUMN status;")
        .unwrap();

    let err = SqliteRecordRepository::try_new(&conn)
        .err()
        .expect("missing column must be rejected");
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "records",
            column: "status"
        }
    ));
}

fn write_legacy_database(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            password TEXT NOT NULL,
            phone INTEGER
        );
        CREATE TABLE records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name_exp TEXT NOT NULL,
            city_exp TEXT NOT NULL,
            phone_exp TEXT NOT NULL,
            name_dest TEXT NOT NULL,
            phone_dest TEXT NOT NULL,
            city_dest TEXT NOT NULL,
            nmbr_package INTEGER NOT NULL,
            gender_package TEXT NOT NULL,
            value_package REAL NOT NULL,
            kilos REAL NOT NULL,
            price REAL NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE modification_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            record_id INTEGER,
            action_type TEXT,
            FOREIGN KEY (record_id) REFERENCES records(id)
        );
        INSERT INTO users (username, password, phone) VALUES ('desk', 'secret1', 612345678);
        INSERT INTO records (
            name_exp, city_exp, phone_exp, name_dest, phone_dest, city_dest,
            nmbr_package, gender_package, value_package, kilos, price, created_at
        ) VALUES (
            'Samir', 'Casablanca', '0611111111', 'Lea', '0622222222', 'Lyon',
            2, 'Documents', 45.5, 3.0, 12.0, '2024-03-01 08:15:42.123456'
        );
        INSERT INTO modification_log (record_id, action_type) VALUES (1, 'MODIFICATION');",
    )
    .unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_column_exists(conn: &Connection, table: &str, column: &str) {
    let exists: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM pragma_table_info('{table}') WHERE name = ?1;"),
            [column],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "column {table}.{column} does not exist");
}
