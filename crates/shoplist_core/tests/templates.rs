use rusqlite::Connection;
use shoplist_core::{
    open_db_in_memory, EntityKind, HistoryRepository, ItemService, ListService, MoveDirection,
    MoveOutcome, RepoError, SectionService, ServiceError, SqliteHistoryRepository,
    SqliteItemRepository, SqliteListRepository, SqliteSectionRepository, SqliteTemplateRepository,
    TemplateService,
};
use uuid::Uuid;

fn templates(conn: &Connection) -> TemplateService<SqliteTemplateRepository<'_>> {
    TemplateService::new(SqliteTemplateRepository::try_new(conn).unwrap())
}

fn lists(conn: &Connection) -> ListService<SqliteListRepository<'_>> {
    ListService::new(SqliteListRepository::try_new(conn).unwrap())
}

fn sections(conn: &Connection) -> SectionService<SqliteSectionRepository<'_>> {
    SectionService::new(SqliteSectionRepository::try_new(conn).unwrap())
}

fn items(conn: &Connection) -> ItemService<SqliteItemRepository<'_>> {
    ItemService::new(SqliteItemRepository::try_new(conn).unwrap())
}

#[test]
fn template_items_keep_insertion_order_and_can_be_edited() {
    let conn = open_db_in_memory().unwrap();
    let service = templates(&conn);
    let template = service.create_template("Weekend", "basics").unwrap();
    let milk = service
        .add_template_item(template.uuid, "Dairy", "Milk", "")
        .unwrap();
    let bread = service
        .add_template_item(template.uuid, "Bakery", "Bread", "sliced")
        .unwrap();
    assert_eq!((milk.sort_order, bread.sort_order), (0, 1));

    service
        .update_template_item(milk.uuid, "Dairy", "Oat milk", "")
        .unwrap();
    assert_eq!(
        service
            .move_template_item(bread.uuid, MoveDirection::Up)
            .unwrap(),
        MoveOutcome::Swapped {
            neighbor: milk.uuid
        }
    );

    let stored = service.get_template(template.uuid).unwrap().unwrap();
    let names = stored
        .items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Bread", "Oat milk"]);

    service.delete_template_item(bread.uuid).unwrap();
    assert_eq!(service.get_template(template.uuid).unwrap().unwrap().items.len(), 1);
}

#[test]
fn applying_template_reuses_sections_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let list = lists(&conn).create_list("Weekly", None).unwrap();
    let existing = sections(&conn).create_section(list.uuid, "DAIRY").unwrap();
    items(&conn).create_item(existing.uuid, "Butter", "").unwrap();

    let service = templates(&conn);
    let template = service.create_template("Weekend", "").unwrap();
    service
        .add_template_item(template.uuid, "Dairy", "Milk", "")
        .unwrap();
    service
        .add_template_item(template.uuid, "Produce", "Apples", "")
        .unwrap();
    service
        .add_template_item(template.uuid, "dairy", "Cheese", "")
        .unwrap();

    assert_eq!(service.apply_template(template.uuid, list.uuid).unwrap(), 3);

    let tree = sections(&conn).list_tree(list.uuid).unwrap();
    let layout = tree
        .sections
        .iter()
        .map(|entry| {
            (
                entry.section.name.as_str(),
                entry
                    .items
                    .iter()
                    .map(|item| item.name.as_str())
                    .collect::<Vec<_>>(),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        layout,
        vec![
            ("DAIRY", vec!["Butter", "Milk", "Cheese"]),
            ("Produce", vec!["Apples"]),
        ]
    );

    let history = SqliteHistoryRepository::try_new(&conn).unwrap();
    let apples = history.find_by_name("APPLES").unwrap().unwrap();
    assert_eq!(apples.last_section_name.as_deref(), Some("Produce"));
    assert_eq!(history.find_by_name("butter").unwrap().unwrap().usage_count, 1);
}

#[test]
fn applying_to_missing_list_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = templates(&conn);
    let template = service.create_template("Weekend", "").unwrap();
    service
        .add_template_item(template.uuid, "Dairy", "Milk", "")
        .unwrap();

    let err = service
        .apply_template(template.uuid, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::NotFound {
            kind: EntityKind::List,
            ..
        })
    ));
    let history_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM item_history;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(history_rows, 0);
}

#[test]
fn template_from_list_captures_incomplete_items_in_display_order() {
    let conn = open_db_in_memory().unwrap();
    let list = lists(&conn).create_list("Weekly", None).unwrap();
    let dairy = sections(&conn).create_section(list.uuid, "Dairy").unwrap();
    let produce = sections(&conn).create_section(list.uuid, "Produce").unwrap();
    let item_service = items(&conn);
    let milk = item_service.create_item(dairy.uuid, "Milk", "").unwrap();
    item_service.create_item(dairy.uuid, "Eggs", "dozen").unwrap();
    item_service.create_item(produce.uuid, "Apples", "").unwrap();
    item_service.toggle_completed(milk.uuid).unwrap();

    let template = templates(&conn)
        .create_template_from_list(list.uuid, "Copy of Weekly", "")
        .unwrap();

    let captured = template
        .items
        .iter()
        .map(|item| {
            (
                item.section_name.as_str(),
                item.name.as_str(),
                item.description.as_str(),
                item.sort_order,
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        captured,
        vec![("Dairy", "Eggs", "dozen", 0), ("Produce", "Apples", "", 1)]
    );
}

#[test]
fn templates_are_ordered_and_deleted_with_their_items() {
    let conn = open_db_in_memory().unwrap();
    let service = templates(&conn);
    let first = service.create_template("First", "").unwrap();
    let second = service.create_template("Second", "").unwrap();
    service
        .add_template_item(second.uuid, "Dairy", "Milk", "")
        .unwrap();

    service.move_template(second.uuid, MoveDirection::Up).unwrap();
    let order = service
        .list_templates()
        .unwrap()
        .into_iter()
        .map(|template| template.uuid)
        .collect::<Vec<_>>();
    assert_eq!(order, vec![second.uuid, first.uuid]);

    let renamed = service
        .update_template(first.uuid, "Renamed", "notes")
        .unwrap();
    assert_eq!((renamed.name.as_str(), renamed.description.as_str()), ("Renamed", "notes"));

    service.delete_template(second.uuid).unwrap();
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM template_items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
    assert!(service.delete_template(second.uuid).unwrap_err().is_not_found());
}
