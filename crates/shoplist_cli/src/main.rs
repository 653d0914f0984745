//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `shoplist_core` linkage and the configured store.
//! - Print list trees and suggestions for quick local checks.
//!
//! Usage:
//! - `shoplist` prints version and schema state.
//! - `shoplist lists` prints every list with completion counters.
//! - `shoplist tree [LIST_UUID]` prints a list (default: active) as JSON.
//! - `shoplist suggest [QUERY] [LIMIT]` prints ranked suggestions.

use log::error;
use shoplist_core::db::migrations::{latest_version, schema_version};
use shoplist_core::{
    init_from_config, open_db, CoreConfig, ListId, ListService, SectionService,
    SqliteHistoryRepository, SqliteListRepository, SqliteSectionRepository, SuggestionService,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("shoplist: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env();
    init_from_config(&config)?;
    let conn = open_db(&config.db_path)?;

    match args.first().map(String::as_str) {
        None => {
            println!("shoplist_core ping={}", shoplist_core::ping());
            println!("shoplist_core version={}", shoplist_core::core_version());
            println!(
                "store path={} schema={}/{}",
                config.db_path.display(),
                schema_version(&conn)?,
                latest_version()
            );
        }
        Some("lists") => {
            let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
            for summary in lists.list_lists()? {
                println!(
                    "{} {} {} {}/{} ({}%){}",
                    summary.list.uuid,
                    summary.list.icon,
                    summary.list.name,
                    summary.stats.completed_items,
                    summary.stats.total_items,
                    summary.stats.percentage,
                    if summary.list.is_active { " *" } else { "" }
                );
            }
        }
        Some("tree") => {
            let list_uuid = match args.get(1) {
                Some(raw) => parse_list_uuid(raw)?,
                None => ListService::new(SqliteListRepository::try_new(&conn)?)
                    .active_list()?
                    .ok_or("no lists yet")?
                    .uuid,
            };
            let sections = SectionService::new(SqliteSectionRepository::try_new(&conn)?);
            println!("{}", serde_json::to_string_pretty(&sections.list_tree(list_uuid)?)?);
        }
        Some("suggest") => {
            let query = args.get(1).map(String::as_str).unwrap_or_default();
            let limit = args.get(2).map(|raw| raw.parse::<i64>()).transpose()?;
            let suggestions = SuggestionService::new(SqliteHistoryRepository::try_new(&conn)?);
            for suggestion in suggestions.suggest(query, limit)? {
                match suggestion.last_section_name {
                    Some(section) => println!(
                        "{} [{section}] x{}",
                        suggestion.name, suggestion.usage_count
                    ),
                    None => println!("{} x{}", suggestion.name, suggestion.usage_count),
                }
            }
        }
        Some(other) => return Err(format!("unknown command `{other}`").into()),
    }
    Ok(())
}

fn parse_list_uuid(raw: &str) -> Result<ListId, String> {
    ListId::parse_str(raw.trim()).map_err(|err| format!("invalid list uuid `{raw}`: {err}"))
}
