use rusqlite::Connection;
use shoplist_core::{
    open_db_in_memory, EntityKind, HistoryRepository, ItemService, ListService, RepoError,
    SectionService, ServiceError, SqliteHistoryRepository, SqliteItemRepository,
    SqliteListRepository, SqliteSectionRepository,
};
use uuid::Uuid;

fn list_service(conn: &Connection) -> ListService<SqliteListRepository<'_>> {
    ListService::new(SqliteListRepository::try_new(conn).unwrap())
}

fn section_service(conn: &Connection) -> SectionService<SqliteSectionRepository<'_>> {
    SectionService::new(SqliteSectionRepository::try_new(conn).unwrap())
}

fn item_service(conn: &Connection) -> ItemService<SqliteItemRepository<'_>> {
    ItemService::new(SqliteItemRepository::try_new(conn).unwrap())
}

fn active_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM lists WHERE is_active = 1;", [], |row| row.get(0))
        .unwrap()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn first_list_becomes_active_and_later_lists_do_not() {
    let conn = open_db_in_memory().unwrap();
    let lists = list_service(&conn);

    let weekly = lists.create_list("  Weekly  ", None).unwrap();
    let party = lists.create_list("Party", Some("🎉")).unwrap();

    assert_eq!(weekly.name, "Weekly");
    assert_eq!(weekly.icon, "🛒");
    assert!(weekly.is_active);
    assert!(!party.is_active);
    assert_eq!((weekly.sort_order, party.sort_order), (0, 1));
    assert_eq!(active_count(&conn), 1);
}

#[test]
fn set_active_keeps_exactly_one_active_list() {
    let conn = open_db_in_memory().unwrap();
    let lists = list_service(&conn);
    let weekly = lists.create_list("Weekly", None).unwrap();
    let party = lists.create_list("Party", None).unwrap();

    lists.set_active_list(party.uuid).unwrap();
    assert_eq!(lists.active_list().unwrap().unwrap().uuid, party.uuid);
    assert_eq!(active_count(&conn), 1);

    lists.set_active_list(party.uuid).unwrap();
    assert_eq!(active_count(&conn), 1);

    let err = lists.set_active_list(Uuid::new_v4()).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(lists.active_list().unwrap().unwrap().uuid, party.uuid);
    assert!(!lists.get_list(weekly.uuid).unwrap().unwrap().is_active);
}

#[test]
fn deleting_active_list_promotes_first_remaining() {
    let conn = open_db_in_memory().unwrap();
    let lists = list_service(&conn);
    let weekly = lists.create_list("Weekly", None).unwrap();
    let party = lists.create_list("Party", None).unwrap();
    let camping = lists.create_list("Camping", None).unwrap();
    lists.set_active_list(camping.uuid).unwrap();

    lists.delete_list(camping.uuid).unwrap();
    assert_eq!(lists.active_list().unwrap().unwrap().uuid, weekly.uuid);

    lists.delete_list(party.uuid).unwrap();
    assert_eq!(lists.active_list().unwrap().unwrap().uuid, weekly.uuid);

    lists.delete_list(weekly.uuid).unwrap();
    assert!(lists.active_list().unwrap().is_none());
    assert!(lists.delete_list(weekly.uuid).unwrap_err().is_not_found());
}

#[test]
fn deleting_list_cascades_but_keeps_history() {
    let conn = open_db_in_memory().unwrap();
    let list = list_service(&conn).create_list("Weekly", None).unwrap();
    let section = section_service(&conn)
        .create_section(list.uuid, "Dairy")
        .unwrap();
    item_service(&conn)
        .create_item(section.uuid, "Milk", "")
        .unwrap();

    list_service(&conn).delete_list(list.uuid).unwrap();

    assert_eq!(count(&conn, "sections"), 0);
    assert_eq!(count(&conn, "items"), 0);
    let history = SqliteHistoryRepository::try_new(&conn).unwrap();
    let entry = history.find_by_name("milk").unwrap().unwrap();
    assert_eq!(entry.usage_count, 1);
    assert!(entry.last_section_uuid.is_none());
    assert!(entry.last_section_name.is_none());
}

#[test]
fn deleting_section_cascades_items() {
    let conn = open_db_in_memory().unwrap();
    let list = list_service(&conn).create_list("Weekly", None).unwrap();
    let sections = section_service(&conn);
    let dairy = sections.create_section(list.uuid, "Dairy").unwrap();
    let produce = sections.create_section(list.uuid, "Produce").unwrap();
    let items = item_service(&conn);
    items.create_item(dairy.uuid, "Milk", "").unwrap();
    items.create_item(produce.uuid, "Apples", "").unwrap();

    sections.delete_section(dairy.uuid).unwrap();

    assert_eq!(count(&conn, "items"), 1);
    assert!(sections.get_section(dairy.uuid).unwrap().is_none());
}

#[test]
fn batch_section_delete_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let list = list_service(&conn).create_list("Weekly", None).unwrap();
    let sections = section_service(&conn);
    let dairy = sections.create_section(list.uuid, "Dairy").unwrap();
    let produce = sections.create_section(list.uuid, "Produce").unwrap();

    let err = sections
        .delete_sections(&[dairy.uuid, Uuid::new_v4()])
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(count(&conn, "sections"), 2);

    assert_eq!(sections.delete_sections(&[dairy.uuid, produce.uuid]).unwrap(), 2);
    assert_eq!(count(&conn, "sections"), 0);
}

#[test]
fn list_tree_shows_incomplete_items_before_completed() {
    let conn = open_db_in_memory().unwrap();
    let list = list_service(&conn).create_list("Weekly", None).unwrap();
    let section = section_service(&conn)
        .create_section(list.uuid, "Dairy")
        .unwrap();
    let items = item_service(&conn);
    let milk = items.create_item(section.uuid, "Milk", "").unwrap();
    items.create_item(section.uuid, "Butter", "salted").unwrap();
    items.create_item(section.uuid, "Cheese", "").unwrap();
    items.toggle_completed(milk.uuid).unwrap();

    let tree = section_service(&conn).list_tree(list.uuid).unwrap();
    assert_eq!(tree.list.uuid, list.uuid);
    let names = tree.sections[0]
        .items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Butter", "Cheese", "Milk"]);
}

#[test]
fn stats_restart_and_delete_completed() {
    let conn = open_db_in_memory().unwrap();
    let lists = list_service(&conn);
    let list = lists.create_list("Weekly", None).unwrap();
    let sections = section_service(&conn);
    let dairy = sections.create_section(list.uuid, "Dairy").unwrap();
    let items = item_service(&conn);
    let milk = items.create_item(dairy.uuid, "Milk", "").unwrap();
    items.create_item(dairy.uuid, "Eggs", "").unwrap();
    let cheese = items.create_item(dairy.uuid, "Cheese", "").unwrap();
    items.toggle_completed(milk.uuid).unwrap();

    let stats = lists.list_stats(list.uuid).unwrap();
    assert_eq!((stats.total_items, stats.completed_items, stats.percentage), (3, 1, 33));
    assert_eq!(sections.section_stats(dairy.uuid).unwrap(), stats);

    assert_eq!(lists.restart_list(list.uuid).unwrap(), 1);
    assert_eq!(lists.list_stats(list.uuid).unwrap().completed_items, 0);

    items.toggle_completed(milk.uuid).unwrap();
    items.toggle_completed(cheese.uuid).unwrap();
    assert_eq!(items.delete_completed_items(list.uuid).unwrap(), 2);

    let summaries = lists.list_lists().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].stats.total_items, 1);
    assert_eq!(summaries[0].stats.percentage, 0);
}

#[test]
fn toggles_flip_flags_and_update_edits_fields() {
    let conn = open_db_in_memory().unwrap();
    let list = list_service(&conn).create_list("Weekly", None).unwrap();
    let section = section_service(&conn)
        .create_section(list.uuid, "Dairy")
        .unwrap();
    let items = item_service(&conn);
    let milk = items.create_item(section.uuid, "Milk", "").unwrap();

    assert!(items.toggle_uncertain(milk.uuid).unwrap().uncertain);
    assert!(!items.toggle_uncertain(milk.uuid).unwrap().uncertain);
    assert!(items.toggle_completed(milk.uuid).unwrap().completed);

    let updated = items.update_item(milk.uuid, " Oat milk ", " 2 cartons ").unwrap();
    assert_eq!(updated.name, "Oat milk");
    assert_eq!(updated.description, "2 cartons");
    assert!(updated.completed);
}

#[test]
fn validation_rejects_blank_and_oversized_input() {
    let conn = open_db_in_memory().unwrap();
    let lists = list_service(&conn);

    assert!(matches!(
        lists.create_list("   ", None),
        Err(ServiceError::InvalidName { .. })
    ));
    assert!(matches!(
        lists.create_list(&"x".repeat(101), None),
        Err(ServiceError::NameTooLong { max: 100, .. })
    ));

    let list = lists.create_list(&"x".repeat(100), None).unwrap();
    let section = section_service(&conn)
        .create_section(list.uuid, "Dairy")
        .unwrap();
    assert!(matches!(
        item_service(&conn).create_item(section.uuid, "Milk", &"d".repeat(501)),
        Err(ServiceError::FieldTooLong { max: 500, .. })
    ));
    assert_eq!(count(&conn, "item_history"), 0);
}

#[test]
fn creating_item_in_missing_section_leaves_no_history() {
    let conn = open_db_in_memory().unwrap();
    let err = item_service(&conn)
        .create_item(Uuid::new_v4(), "Milk", "")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::NotFound {
            kind: EntityKind::Section,
            ..
        })
    ));
    assert_eq!(count(&conn, "items"), 0);
    assert_eq!(count(&conn, "item_history"), 0);
}

#[test]
fn list_tree_serializes_with_flattened_sections() {
    let conn = open_db_in_memory().unwrap();
    let list = list_service(&conn).create_list("Weekly", None).unwrap();
    let section = section_service(&conn)
        .create_section(list.uuid, "Dairy")
        .unwrap();
    item_service(&conn)
        .create_item(section.uuid, "Milk", "")
        .unwrap();

    let tree = section_service(&conn).list_tree(list.uuid).unwrap();
    let value = serde_json::to_value(&tree).unwrap();

    assert_eq!(value["list"]["name"], "Weekly");
    assert_eq!(value["list"]["is_active"], true);
    assert_eq!(value["sections"][0]["name"], "Dairy");
    assert_eq!(value["sections"][0]["items"][0]["name"], "Milk");
    assert_eq!(value["sections"][0]["items"][0]["completed"], false);
}
