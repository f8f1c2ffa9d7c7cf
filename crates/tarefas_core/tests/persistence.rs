use std::sync::{Arc, Mutex};
use tarefas_core::{
    KeyValueStore, MemoryKvStore, PersistError, PersistObserver, PersistOp, PersistenceGateway,
    SqliteKvStore, TaskAction, TaskList, TaskStore, TASKS_SLOT_KEY,
};

#[derive(Default)]
struct RecordingObserver {
    failures: Mutex<Vec<(PersistOp, &'static str)>>,
}

impl RecordingObserver {
    fn failures(&self) -> Vec<(PersistOp, &'static str)> {
        self.failures.lock().unwrap().clone()
    }
}

impl PersistObserver for RecordingObserver {
    fn on_failure(&self, op: PersistOp, error: &PersistError) {
        self.failures.lock().unwrap().push((op, error.code()));
    }
}

fn recorded_gateway(
    store: MemoryKvStore,
) -> (PersistenceGateway<MemoryKvStore>, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let gateway = PersistenceGateway::new(store).with_observer(observer.clone());
    (gateway, observer)
}

fn built_list() -> TaskList {
    let mut store = TaskStore::new();
    for text in ["Buy milk", "Walk dog", "Pay rent"] {
        store.add(text);
    }
    let second = store.tasks().as_slice()[1].id.clone();
    store.dispatch(TaskAction::Delete(second));
    store.add("Call mom");
    store.tasks().clone()
}

#[test]
fn load_of_absent_slot_is_empty_without_failure() {
    let (gateway, observer) = recorded_gateway(MemoryKvStore::new());

    assert!(gateway.load().is_empty());
    assert!(observer.failures().is_empty());
}

#[test]
fn save_then_load_round_trips_content_and_order() {
    let (gateway, observer) = recorded_gateway(MemoryKvStore::new());
    let list = built_list();

    gateway.save(&list).unwrap();
    assert_eq!(gateway.load(), list);
    assert_eq!(gateway.load().texts(), vec!["Buy milk", "Pay rent", "Call mom"]);
    assert!(observer.failures().is_empty());
}

#[test]
fn save_round_trips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tarefas.sqlite3");
    let list = built_list();

    PersistenceGateway::new(SqliteKvStore::open(&path).unwrap())
        .save(&list)
        .unwrap();

    let reopened = PersistenceGateway::new(SqliteKvStore::open(&path).unwrap());
    assert_eq!(reopened.load(), list);
}

#[test]
fn stored_payload_is_array_of_id_and_text() {
    let store = MemoryKvStore::new();
    let (gateway, _) = recorded_gateway(store.clone());
    let list = built_list();
    gateway.save(&list).unwrap();

    let raw = store.raw(TASKS_SLOT_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), list.len());
    for (entry, task) in entries.iter().zip(list.iter()) {
        let object = entry.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["id"], task.id.as_str());
        assert_eq!(object["text"], task.text.as_str());
    }
}

#[test]
fn clear_removes_slot_and_next_load_is_empty() {
    let store = MemoryKvStore::new();
    let (gateway, _) = recorded_gateway(store.clone());
    gateway.save(&built_list()).unwrap();

    gateway.clear().unwrap();
    assert_eq!(store.raw(TASKS_SLOT_KEY), None);
    assert!(gateway.load().is_empty());
}

#[test]
fn corrupt_payload_degrades_to_empty_and_reports_decode_failure() {
    let store = MemoryKvStore::new();
    store.insert_raw(TASKS_SLOT_KEY, "{not json");
    let (gateway, observer) = recorded_gateway(store);

    assert!(gateway.load().is_empty());
    assert_eq!(observer.failures(), vec![(PersistOp::Load, "decode_failed")]);
    assert!(matches!(gateway.try_load(), Err(PersistError::Decode(_))));
}

#[test]
fn legacy_payload_with_epoch_ids_loads() {
    let store = MemoryKvStore::new();
    store.insert_raw(
        TASKS_SLOT_KEY,
        r#"[{"id":"1700000000000","texto":"  Estudar "},{"id":"1700000000001","texto":"\uFEFFCorrer\n"}]"#,
    );
    let (gateway, observer) = recorded_gateway(store);

    let list = gateway.load();
    assert_eq!(list.texts(), vec!["Estudar", "Correr"]);
    assert_eq!(list.as_slice()[0].id.as_str(), "1700000000000");
    assert!(observer.failures().is_empty());

    gateway.save(&list).unwrap();
    assert_eq!(gateway.load().texts(), vec!["Estudar", "Correr"]);
}

#[test]
fn read_failure_degrades_to_empty_and_reports() {
    let store = MemoryKvStore::new();
    store.insert_raw(TASKS_SLOT_KEY, "[]");
    store.set_fail_reads(true);
    let (gateway, observer) = recorded_gateway(store);

    assert!(gateway.load().is_empty());
    assert_eq!(observer.failures(), vec![(PersistOp::Load, "storage_failed")]);
}

#[test]
fn write_failure_is_reported_and_leaves_previous_value() {
    let store = MemoryKvStore::new();
    let (gateway, observer) = recorded_gateway(store.clone());
    gateway.save(&built_list()).unwrap();
    let before = store.raw(TASKS_SLOT_KEY);

    store.set_fail_writes(true);
    let err = gateway.save(&TaskList::new()).unwrap_err();
    assert!(matches!(err, PersistError::Storage(_)));
    assert!(gateway.clear().is_err());

    assert_eq!(store.raw(TASKS_SLOT_KEY), before);
    assert_eq!(
        observer.failures(),
        vec![
            (PersistOp::Save, "storage_failed"),
            (PersistOp::Clear, "storage_failed")
        ]
    );
}

#[test]
fn custom_key_isolates_slots() {
    let store = MemoryKvStore::new();
    let gateway = PersistenceGateway::new(store.clone()).with_key("tarefas-test");
    gateway.save(&built_list()).unwrap();

    assert_eq!(gateway.key(), "tarefas-test");
    assert_eq!(store.get(TASKS_SLOT_KEY).unwrap(), None);
    assert!(store.get("tarefas-test").unwrap().is_some());
}
