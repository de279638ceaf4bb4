use colis_core::db::open_db_in_memory;
use colis_core::model::record::{RecordField, RecordValidationError, ShipmentDetails};
use colis_core::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use colis_core::RepoError;
use rusqlite::Connection;

fn details(name_exp: &str) -> ShipmentDetails {
    ShipmentDetails {
        name_exp: name_exp.to_string(),
        city_exp: "Paris".to_string(),
        phone_exp: "0600000001".to_string(),
        name_dest: "Bob".to_string(),
        phone_dest: "0700000002".to_string(),
        city_dest: "Rabat".to_string(),
        nmbr_package: 2,
        gender_package: "Documents".to_string(),
        value_package: 100.0,
        kilos: 1.5,
        price: 20.0,
    }
}

#[test]
fn insert_then_get_returns_stored_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    let id = repo.insert_record(&details("Alice")).unwrap();
    assert_eq!(id, 1);

    let record = repo.get_record(id).unwrap().expect("record should exist");
    assert_eq!(record.id, 1);
    assert_eq!(record.details, details("Alice"));
    assert!(record.modified_at.is_none());
    assert!(record.status.is_none());
    assert!(!record.is_modified());
}

#[test]
fn text_is_stored_trimmed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    let mut padded = details(" Alice ");
    padded.phone_exp = " 0600000001\n".to_string();
    let id = repo.insert_record(&padded).unwrap();

    let stored = repo.get_record(id).unwrap().unwrap();
    assert_eq!(stored.details, details("Alice"));
}

#[test]
fn ids_are_never_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    let first = repo.insert_record(&details("Alice")).unwrap();
    let second = repo.insert_record(&details("Bruno")).unwrap();
    repo.delete_record(second).unwrap();
    let third = repo.insert_record(&details("Chloe")).unwrap();

    assert!(first < second);
    assert!(second < third);
}

#[test]
fn list_returns_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    for name in ["Alice", "Bruno", "Chloe"] {
        repo.insert_record(&details(name)).unwrap();
    }

    let ids = repo
        .list_records()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn list_on_empty_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    assert!(repo.list_records().unwrap().is_empty());
}

#[test]
fn update_replaces_fields_and_marks_record_modified() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let id = repo.insert_record(&details("Alice")).unwrap();
    let before = repo.get_record(id).unwrap().unwrap();

    let mut changed = details("Alice");
    changed.nmbr_package = 3;
    let stamp = repo.update_record(id, &changed).unwrap();

    let after = repo.get_record(id).unwrap().unwrap();
    assert_eq!(after.details.nmbr_package, 3);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.modified_at, Some(stamp));
    assert_eq!(after.status.as_deref(), Some("Modifié"));
    assert!(after.is_modified());

    let history = repo.modification_history(id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action_type, "MODIFICATION");
    assert_eq!(history[0].modified_at, Some(stamp));
}

#[test]
fn update_missing_record_returns_not_found_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();

    let err = repo.update_record(42, &details("Ghost")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert_eq!(log_row_count(&conn), 0);
}

#[test]
fn invalid_details_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let id = repo.insert_record(&details("Alice")).unwrap();

    let mut bad_phone = details("Alice");
    bad_phone.phone_dest = "07-00".to_string();
    let err = repo.update_record(id, &bad_phone).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RecordValidationError::InvalidPhone(RecordField::PhoneDest))
    ));

    let blank_name = details("   ");
    let err = repo.insert_record(&blank_name).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RecordValidationError::MissingField(RecordField::NameExp))
    ));

    let mut nan_price = details("Alice");
    nan_price.price = f64::NAN;
    let err = repo.insert_record(&nan_price).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RecordValidationError::InvalidNumber(RecordField::Price))
    ));

    let stored = repo.get_record(id).unwrap().unwrap();
    assert_eq!(stored.details, details("Alice"));
    assert!(stored.modified_at.is_none());
    assert_eq!(repo.list_records().unwrap().len(), 1);
    assert_eq!(log_row_count(&conn), 0);
}

#[test]
fn failed_log_append_rolls_back_the_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let id = repo.insert_record(&details("Alice")).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER reject_log BEFORE INSERT ON modification_log
         BEGIN
             SELECT RAISE(ABORT, 'log unavailable');
         END;",
    )
    .unwrap();

    let mut changed = details("Alice");
    changed.price = 99.0;
    let err = repo.update_record(id, &changed).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let stored = repo.get_record(id).unwrap().unwrap();
    assert_eq!(stored.details.price, 20.0);
    assert!(stored.modified_at.is_none());
    assert!(stored.status.is_none());
    assert!(conn.is_autocommit());
}

#[test]
fn delete_removes_record_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let keep = repo.insert_record(&details("Alice")).unwrap();
    let drop_id = repo.insert_record(&details("Bruno")).unwrap();

    repo.delete_record(drop_id).unwrap();
    assert!(repo.get_record(drop_id).unwrap().is_none());
    assert!(repo.get_record(keep).unwrap().is_some());

    let err = repo.delete_record(drop_id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == drop_id));
}

#[test]
fn search_matches_sender_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    repo.insert_record(&details("Alice Martin")).unwrap();
    repo.insert_record(&details("Bruno")).unwrap();
    repo.insert_record(&details("MARTINE")).unwrap();

    let names = repo
        .search_records("martin")
        .unwrap()
        .into_iter()
        .map(|record| record.details.name_exp)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["MARTINE".to_string(), "Alice Martin".to_string()]);
}

#[test]
fn search_matches_id_as_substring() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    for index in 0..12 {
        repo.insert_record(&details(&format!("Sender {index}")))
            .unwrap();
    }

    let ids = repo
        .search_records("1")
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect::<Vec<_>>();
    // id hits 1, 10, 11, 12; name hits "Sender 1" (id 2), "Sender 10", "Sender 11".
    assert_eq!(ids, vec![12, 11, 10, 2, 1]);
}

#[test]
fn search_treats_like_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    repo.insert_record(&details("Alice")).unwrap();
    repo.insert_record(&details("50% Shop")).unwrap();

    let hits = repo.search_records("%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].details.name_exp, "50% Shop");
    assert!(repo.search_records("_").unwrap().is_empty());
}

fn log_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM modification_log;", [], |row| {
        row.get(0)
    })
    .unwrap()
}
