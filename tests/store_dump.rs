use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rust_table_loader::source::{CollectionOptions, CollectionSource};
use rust_table_loader::types::Value;
use rust_table_loader::{DataStore, load};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rust-table-loader-dump-{nanos}.{ext}"))
}

fn loaded_store() -> DataStore {
    let data: Vec<Vec<Value>> = vec![
        vec!["name".into(), "note".into(), "score".into()],
        vec!["Cliff".into(), "it's\nmultiline".into(), 9.5.into()],
        vec!["Clair".into(), Value::Null, 10.into()],
        vec!["Rudy".into(), "tab\there".into(), Value::Null, "extra".into()],
    ];
    load(&mut CollectionSource::new(move || data.clone(), CollectionOptions::default())).unwrap()
}

#[test]
fn dump_brackets_statements_in_a_transaction() {
    let lines = loaded_store().dump().unwrap();
    assert_eq!(lines.first().map(String::as_str), Some("BEGIN TRANSACTION;"));
    assert_eq!(lines.last().map(String::as_str), Some("COMMIT;"));
    assert!(lines[1].starts_with("CREATE TABLE \"tbl\""));
    assert!(lines.iter().all(|line| !line.contains('\n')));
    assert_eq!(
        lines.iter().filter(|line| line.starts_with("INSERT INTO \"tbl\"")).count(),
        3
    );
}

#[test]
fn dump_file_rebuilds_an_equal_store() {
    let original = loaded_store();
    original
        .execute_batch(
            "create index idx_name on tbl(name); \
             create view guys as select * from tbl where name = 'Cliff';",
        )
        .unwrap();

    let path = tmp_file("sql");
    original.dump_to(&path).unwrap();
    let script = fs::read_to_string(&path).unwrap();

    let copy = DataStore::open_in_memory().unwrap();
    copy.execute_batch(&script).unwrap();

    let query = "select * from tbl order by row_id";
    assert_eq!(
        original.fetch_all(query, ()).unwrap(),
        copy.fetch_all(query, ()).unwrap()
    );
    assert_eq!(
        copy.fetch_one("select note from guys", ()).unwrap().unwrap()["note"],
        Value::from("it's\nmultiline")
    );
    assert_eq!(copy.dump().unwrap(), original.dump().unwrap());

    let _ = fs::remove_file(&path);
}

#[test]
fn dump_preserves_commented_and_multiline_ddl() {
    let original = DataStore::open_in_memory().unwrap();
    original
        .execute_batch(
            "create table t (a text, -- first column\n b text default 'l1\n   l2',\n c text);\n\
             create view v as select a, -- comment in a view\n 'x\ny' as d from t;\n\
             insert into t (a) values ('row');",
        )
        .unwrap();

    let lines = original.dump().unwrap();
    assert!(lines.iter().all(|line| !line.contains('\n')));

    let copy = DataStore::open_in_memory().unwrap();
    copy.execute_batch(&lines.join("\n")).unwrap();

    let names = |store: &DataStore| -> Vec<String> {
        store
            .column_schema("t")
            .unwrap()
            .into_iter()
            .map(|c| c.column_name)
            .collect()
    };
    assert_eq!(names(&copy), ["a", "b", "c"]);
    assert_eq!(names(&copy), names(&original));

    let query = "select * from t order by rowid";
    assert_eq!(
        copy.fetch_all(query, ()).unwrap(),
        original.fetch_all(query, ()).unwrap()
    );
    assert_eq!(
        copy.scalar("select b from t", ()).unwrap(),
        Some(Value::from("l1\n   l2"))
    );

    // The default still applies to rows inserted after the replay.
    copy.execute("insert into t (a) values (?)", "later").unwrap();
    assert_eq!(
        copy.scalar("select b from t where a = ?", "later").unwrap(),
        Some(Value::from("l1\n   l2"))
    );
    assert_eq!(
        copy.scalar("select d from v where a = ?", "row").unwrap(),
        Some(Value::from("x\ny"))
    );
}

#[test]
fn autoincrement_sequence_is_dumped() {
    let store = DataStore::open_in_memory().unwrap();
    store
        .execute_batch(
            "create table t (id integer primary key autoincrement, v text); \
             insert into t (v) values ('a'), ('b');",
        )
        .unwrap();

    let lines = store.dump().unwrap();
    assert!(lines.contains(&"DELETE FROM \"sqlite_sequence\";".to_string()));
    assert!(lines.contains(&"INSERT INTO \"sqlite_sequence\" VALUES('t',2);".to_string()));

    let copy = DataStore::open_in_memory().unwrap();
    copy.execute_batch(&lines.join("\n")).unwrap();
    copy.execute("insert into t (v) values (?)", "c").unwrap();
    assert_eq!(
        copy.scalar("select max(id) from t", ()).unwrap(),
        Some(Value::Integer(3))
    );
}

#[test]
fn on_disk_store_survives_reopen() {
    let path = tmp_file("db");
    {
        let store = DataStore::open(&path).unwrap();
        store.execute_batch(&loaded_store().dump().unwrap().join("\n")).unwrap();
        store.close().unwrap();
    }
    let reopened = DataStore::open(&path).unwrap();
    assert_eq!(
        reopened.scalar("select count(*) from tbl", ()).unwrap(),
        Some(Value::Integer(3))
    );
    drop(reopened);
    let _ = fs::remove_file(&path);
}
