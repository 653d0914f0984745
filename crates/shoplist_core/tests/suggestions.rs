use rusqlite::Connection;
use shoplist_core::suggest::CANDIDATE_POOL_LIMIT;
use shoplist_core::{
    open_db, open_db_in_memory, HistoryRepository, ItemService, ListService, ManualClock,
    SectionService, SharedClock, SqliteHistoryRepository, SqliteItemRepository,
    SqliteListRepository, SqliteSectionRepository, SuggestionService,
};
use std::sync::Arc;
use uuid::Uuid;

fn suggestions(conn: &Connection) -> SuggestionService<SqliteHistoryRepository<'_>> {
    SuggestionService::new(SqliteHistoryRepository::try_new(conn).unwrap())
}

fn record(service: &SuggestionService<SqliteHistoryRepository<'_>>, name: &str, times: usize) {
    for _ in 0..times {
        service.record_use(name, None).unwrap();
    }
}

fn names(found: &[shoplist_core::Suggestion]) -> Vec<&str> {
    found.iter().map(|suggestion| suggestion.name.as_str()).collect()
}

#[test]
fn exact_beats_boosted_substring_beats_fuzzy() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    record(&service, "Milk", 1);
    record(&service, "Almond Milk", 25);
    record(&service, "Silk", 1);
    record(&service, "Bread", 40);

    let found = service.suggest("milk", None).unwrap();
    assert_eq!(names(&found), vec!["Milk", "Almond Milk", "Silk"]);
    assert_eq!(found[1].usage_count, 25);
}

#[test]
fn equal_scores_fall_back_to_usage() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    record(&service, "Eggs large", 2);
    record(&service, "Eggs small", 9);
    record(&service, "Eggplant", 1);

    let found = service.suggest("egg", Some(2)).unwrap();
    assert_eq!(names(&found), vec!["Eggs small", "Eggs large"]);
}

#[test]
fn creating_items_upserts_history_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let list = ListService::new(SqliteListRepository::try_new(&conn).unwrap())
        .create_list("Weekly", None)
        .unwrap();
    let sections = SectionService::new(SqliteSectionRepository::try_new(&conn).unwrap());
    let dairy = sections.create_section(list.uuid, "Dairy").unwrap();
    let fridge = sections.create_section(list.uuid, "Fridge").unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    items.create_item(dairy.uuid, "milk", "").unwrap();
    items.create_item(fridge.uuid, "MILK", "").unwrap();

    let history = suggestions(&conn).history_entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].name, "milk");
    assert_eq!(history[0].usage_count, 2);
    assert_eq!(history[0].last_section_uuid, Some(fridge.uuid));
    assert_eq!(history[0].last_section_name.as_deref(), Some("Fridge"));

    let found = suggestions(&conn).suggest("Mi", None).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].last_section_name.as_deref(), Some("Fridge"));
}

#[test]
fn blank_query_returns_most_used_then_most_recent() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let shared: SharedClock = clock.clone();
    let service =
        SuggestionService::new(SqliteHistoryRepository::try_new(&conn).unwrap().with_clock(shared));

    service.record_use("Apples", None).unwrap();
    clock.advance(10);
    service.record_use("Bananas", None).unwrap();
    clock.advance(10);
    service.record_use("Cherries", None).unwrap();
    service.record_use("Cherries", None).unwrap();

    let found = service.suggest("   ", None).unwrap();
    assert_eq!(names(&found), vec!["Cherries", "Bananas", "Apples"]);

    let limited = service.suggest("", Some(1)).unwrap();
    assert_eq!(names(&limited), vec!["Cherries"]);
}

#[test]
fn non_positive_limit_uses_query_default() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    for index in 0..15 {
        service.record_use(&format!("Tea {index}"), None).unwrap();
    }

    assert_eq!(service.suggest("tea", Some(0)).unwrap().len(), 10);
    assert_eq!(service.suggest("tea", Some(-1)).unwrap().len(), 10);
    assert_eq!(service.suggest("tea", Some(12)).unwrap().len(), 12);
}

#[test]
fn entries_outside_candidate_pool_are_not_suggested() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    for index in 0..CANDIDATE_POOL_LIMIT {
        record(&service, &format!("Staple {index}"), 2);
    }
    record(&service, "Zucchini", 1);

    assert!(service.suggest("zucchini", None).unwrap().is_empty());

    record(&service, "Zucchini", 2);
    assert_eq!(names(&service.suggest("zucchini", None).unwrap()), vec!["Zucchini"]);
}

#[test]
fn history_entries_can_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    let milk = service.record_use("Milk", None).unwrap();
    let eggs = service.record_use("Eggs", None).unwrap();
    let tea = service.record_use("Tea", None).unwrap();

    service.delete_entry(milk.uuid).unwrap();
    assert!(service.delete_entry(milk.uuid).unwrap_err().is_not_found());

    assert_eq!(service.delete_entries(&[]).unwrap(), 0);
    assert_eq!(
        service
            .delete_entries(&[eggs.uuid, Uuid::new_v4(), tea.uuid])
            .unwrap(),
        2
    );
    assert!(service.history_entries().unwrap().is_empty());
}

#[test]
fn suggestion_serializes_with_section_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    service.record_use("Milk", None).unwrap();

    let found = service.suggest("milk", None).unwrap();
    let value = serde_json::to_value(&found[0]).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "name": "Milk",
            "last_section_uuid": null,
            "last_section_name": null,
            "usage_count": 1
        })
    );
}

#[test]
fn name_identity_folds_ascii_only_but_scoring_folds_unicode() {
    let conn = open_db_in_memory().unwrap();
    let service = suggestions(&conn);
    service.record_use("Äpfel", None).unwrap();
    service.record_use("äpfel", None).unwrap();
    service.record_use("MILK", None).unwrap();
    service.record_use("milk", None).unwrap();

    let history = service.history_entries().unwrap();
    assert_eq!(history.len(), 3);

    let found = service.suggest("ÄPFEL", None).unwrap();
    let mut found_names = names(&found);
    found_names.sort_unstable();
    assert_eq!(found_names, vec!["Äpfel", "äpfel"]);
}

#[test]
fn concurrent_writers_share_one_history_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shoplist.sqlite3");
    drop(open_db(&path).unwrap());

    std::thread::scope(|scope| {
        for _ in 0..2 {
            let path = path.clone();
            scope.spawn(move || {
                let conn = open_db(&path).unwrap();
                let history = SqliteHistoryRepository::try_new(&conn).unwrap();
                for _ in 0..25 {
                    history.record_use("Milk", None).unwrap();
                }
            });
        }
    });

    let conn = open_db(&path).unwrap();
    let history = SqliteHistoryRepository::try_new(&conn).unwrap();
    let entries = history.top_entries(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].usage_count, 50);
}
