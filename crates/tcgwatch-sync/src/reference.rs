//! Reference tables: groups, rarities, printings, conditions and languages.
//!
//! Each syncer maps the remote records field for field and persists them in a
//! single bulk insert, returning the rows with their local ids.

use anyhow::Context;
use rusqlite::Connection;

use tcgwatch_api::{RemoteCondition, RemoteGroup, RemoteLanguage, RemotePrinting, RemoteRarity};
use tcgwatch_core::models::catalog::{Condition, Group, Language, Printing, Rarity};
use tcgwatch_db::ops;

pub fn sync_groups(conn: &Connection, remote: &[RemoteGroup]) -> anyhow::Result<Vec<Group>> {
    let rows = remote
        .iter()
        .map(|g| Group::new(g.name.clone(), g.remote_id))
        .collect();
    let created = ops::insert_groups(conn, rows).context("inserting groups")?;
    tracing::info!(count = created.len(), "synced groups");
    Ok(created)
}

pub fn sync_rarities(conn: &Connection, remote: &[RemoteRarity]) -> anyhow::Result<Vec<Rarity>> {
    let rows = remote
        .iter()
        .map(|r| Rarity::new(r.name.clone(), r.remote_id))
        .collect();
    let created = ops::insert_rarities(conn, rows).context("inserting rarities")?;
    tracing::info!(count = created.len(), "synced rarities");
    Ok(created)
}

pub fn sync_printings(conn: &Connection, remote: &[RemotePrinting]) -> anyhow::Result<Vec<Printing>> {
    let rows = remote
        .iter()
        .map(|p| Printing::new(p.name.clone(), p.remote_id))
        .collect();
    let created = ops::insert_printings(conn, rows).context("inserting printings")?;
    tracing::info!(count = created.len(), "synced printings");
    Ok(created)
}

pub fn sync_conditions(
    conn: &Connection,
    remote: &[RemoteCondition],
) -> anyhow::Result<Vec<Condition>> {
    let rows = remote
        .iter()
        .map(|c| Condition::new(c.name.clone(), c.abbreviation.clone(), c.remote_id))
        .collect();
    let created = ops::insert_conditions(conn, rows).context("inserting conditions")?;
    tracing::info!(count = created.len(), "synced conditions");
    Ok(created)
}

pub fn sync_languages(conn: &Connection, remote: &[RemoteLanguage]) -> anyhow::Result<Vec<Language>> {
    let rows = remote
        .iter()
        .map(|l| Language::new(l.name.clone(), l.abbreviation.clone(), l.remote_id))
        .collect();
    let created = ops::insert_languages(conn, rows).context("inserting languages")?;
    tracing::info!(count = created.len(), "synced languages");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcgwatch_db::open_memory_db;

    #[test]
    fn test_sync_groups_assigns_local_ids() {
        let conn = open_memory_db().unwrap();
        let remote = vec![
            RemoteGroup {
                remote_id: 2300,
                name: "Legend of Blue Eyes White Dragon".into(),
            },
            RemoteGroup {
                remote_id: 2301,
                name: "Metal Raiders".into(),
            },
        ];

        let created = sync_groups(&conn, &remote).unwrap();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|g| g.id > 0));
        assert_eq!(created[1].remote_id, 2301);
        assert_eq!(ops::list_groups(&conn).unwrap(), created);
    }

    #[test]
    fn test_sync_conditions_keeps_abbreviation() {
        let conn = open_memory_db().unwrap();
        let created = sync_conditions(
            &conn,
            &[RemoteCondition {
                remote_id: 1,
                name: "Near Mint".into(),
                abbreviation: "NM".into(),
            }],
        )
        .unwrap();
        assert_eq!(created[0].abbreviation, "NM");
    }

    #[test]
    fn test_sync_rarities_keeps_remote_id() {
        let conn = open_memory_db().unwrap();
        let created = sync_rarities(
            &conn,
            &[RemoteRarity {
                remote_id: 7,
                name: "Secret Rare".into(),
            }],
        )
        .unwrap();
        assert_eq!(created[0].remote_id, Some(7));
    }

    #[test]
    fn test_empty_remote_list_writes_nothing() {
        let conn = open_memory_db().unwrap();
        assert!(sync_languages(&conn, &[]).unwrap().is_empty());
        assert!(sync_printings(&conn, &[]).unwrap().is_empty());
    }
}
