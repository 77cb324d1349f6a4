use std::sync::{Arc, Mutex};

use rust_table_loader::loader::{CompositeObserver, LoadEvent, LoadObserver};
use rust_table_loader::source::{
    CollectionOptions, CollectionSource, FixedWidthOptions, FixedWidthSource, RecordSource,
};
use rust_table_loader::types::Value;
use rust_table_loader::{DataStore, LoadOptions, Loader, LoaderError};

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<LoadEvent>>,
}

impl RecordingObserver {
    fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| match e {
                LoadEvent::LoadStarted => "started",
                LoadEvent::TableCreated { .. } => "created",
                LoadEvent::TableWidened { .. } => "widened",
                LoadEvent::BatchCommitted { .. } => "committed",
                LoadEvent::LoadFinished { .. } => "finished",
                LoadEvent::LoadFailed { .. } => "failed",
            })
            .collect()
    }
}

impl LoadObserver for RecordingObserver {
    fn on_event(&self, event: &LoadEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn ragged_source() -> impl RecordSource {
    let data: Vec<Vec<Value>> = vec![
        vec!["a".into()],
        vec![1.into()],
        vec![2.into(), 3.into()],
        vec![4.into()],
    ];
    CollectionSource::new(move || data.clone(), CollectionOptions::default())
}

#[test]
fn observer_sees_the_load_lifecycle() {
    let obs = Arc::new(RecordingObserver::default());
    let loader = Loader::new(LoadOptions {
        batch_size: 2,
        ..Default::default()
    })
    .unwrap()
    .with_observer(obs.clone());

    let store = loader.load(&mut ragged_source()).unwrap();
    assert_eq!(
        store.scalar("select count(*) from tbl", ()).unwrap(),
        Some(Value::Integer(3))
    );

    assert_eq!(
        obs.kinds(),
        ["started", "created", "widened", "committed", "committed", "finished"]
    );

    let events = obs.events.lock().unwrap();
    assert_eq!(
        events[1],
        LoadEvent::TableCreated {
            table: "tbl".to_string(),
            columns: vec!["a".to_string()],
        }
    );
    match events.last() {
        Some(LoadEvent::LoadFinished { stats, .. }) => {
            assert_eq!(stats.rows, 3);
            assert_eq!(stats.commits, 2);
            assert_eq!(stats.tables, vec!["tbl".to_string()]);
        }
        other => panic!("unexpected last event: {other:?}"),
    }
}

#[test]
fn composite_observer_fans_out() {
    let first = Arc::new(RecordingObserver::default());
    let second = Arc::new(RecordingObserver::default());
    let mut composite = CompositeObserver::new(vec![first.clone()]);
    composite.push(second.clone());

    let loader = Loader::default().with_observer(Arc::new(composite));
    loader.load(&mut ragged_source()).unwrap();

    assert_eq!(first.kinds(), second.kinds());
    assert_eq!(first.kinds().last(), Some(&"finished"));
}

#[test]
fn observer_receives_failure_with_message() {
    let obs = Arc::new(RecordingObserver::default());
    let loader = Loader::default().with_observer(obs.clone());
    let mut source = FixedWidthSource::from_path(
        "tests/does/not/exist.txt",
        &[3],
        FixedWidthOptions::default(),
    )
    .unwrap();

    let store = DataStore::open_in_memory().unwrap();
    let err = loader.load_into(&mut source, &store).unwrap_err();
    assert!(matches!(err, LoaderError::Io(_)));
    assert!(!store.in_transaction());

    assert_eq!(obs.kinds(), ["started", "failed"]);
    let events = obs.events.lock().unwrap();
    match &events[1] {
        LoadEvent::LoadFailed { message, .. } => assert!(message.starts_with("io error")),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn options_can_come_from_json_config() {
    let options = LoadOptions::from_json_str(
        r#"{"auto_number_field": "id", "record_number_field": null, "batch_size": 1}"#,
    )
    .unwrap();
    let loader = Loader::new(options).unwrap();
    let store = loader.load(&mut ragged_source()).unwrap();

    let names: Vec<String> = store
        .column_schema("tbl")
        .unwrap()
        .into_iter()
        .map(|c| c.column_name)
        .collect();
    assert_eq!(names, ["id", "a", "unnamed_field002"]);
    assert_eq!(loader.options().batch_size, 1);
}
