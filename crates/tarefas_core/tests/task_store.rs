use tarefas_core::{Notice, PersistIntent, TaskAction, TaskId, TaskStore};

#[test]
fn add_appends_exactly_one_task_at_the_end() {
    let mut store = TaskStore::new();
    store.add("first");

    let dispatch = store.add("  second  ");
    assert_eq!(store.tasks().len(), 2);
    assert_eq!(store.tasks().texts(), vec!["first", "second"]);
    assert_eq!(
        dispatch.persist,
        Some(PersistIntent::Save(store.tasks().clone()))
    );
}

#[test]
fn whitespace_only_add_warns_and_changes_nothing() {
    let mut store = TaskStore::new();
    store.add("keep");
    let before = store.tasks().clone();

    let dispatch = store.add("   ");
    assert_eq!(dispatch.notice, Some(Notice::EmptyText));
    assert_eq!(dispatch.persist, None);
    assert_eq!(store.tasks(), &before);
}

#[test]
fn delete_removes_only_the_matching_task_and_keeps_order() {
    let mut store = TaskStore::new();
    for text in ["a", "b", "c", "d"] {
        store.add(text);
    }
    let target = store.tasks().as_slice()[2].id.clone();

    store.delete(&target);
    assert_eq!(store.tasks().texts(), vec!["a", "b", "d"]);
    assert!(store.tasks().get(&target).is_none());
}

#[test]
fn delete_of_unknown_id_is_a_no_op() {
    let mut store = TaskStore::new();
    store.add("a");
    let before = store.tasks().clone();

    let dispatch = store.dispatch(TaskAction::Delete(TaskId::from("unknown")));
    assert_eq!(store.tasks(), &before);
    assert_eq!(dispatch.notice, None);
    assert_eq!(dispatch.persist, Some(PersistIntent::Save(before)));
}

#[test]
fn clear_empties_and_requests_slot_removal() {
    let mut store = TaskStore::new();
    store.add("a");
    store.add("b");

    let dispatch = store.clear();
    assert!(store.tasks().is_empty());
    assert_eq!(dispatch.persist, Some(PersistIntent::RemoveSlot));
}
