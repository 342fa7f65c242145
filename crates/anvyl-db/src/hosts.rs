//! Host table operations. Each function takes a borrowed
//! `Connection` and runs as a single short-lived transaction.

use anvyl_core::model::{Host, HostStatus};
use anvyl_core::time::now_ms;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{DbError, DbResult};

#[derive(Debug, Default, Clone)]
pub struct HostUpdate {
    pub name: Option<String>,
    pub status: Option<HostStatus>,
    pub tags: Option<Vec<String>>,
    pub resources: Option<String>,
    pub metadata: Option<String>,
    pub last_heartbeat: Option<i64>,
}

pub struct NewHost {
    pub name: String,
    pub ip: String,
    pub os: String,
    pub tags: Vec<String>,
    pub is_local: bool,
}

pub fn add_host(conn: &Connection, new: NewHost) -> DbResult<Host> {
    let now = now_ms();
    let host = Host {
        id: uuid::Uuid::new_v4().to_string(),
        name: new.name,
        ip: new.ip,
        os: new.os,
        status: HostStatus::Active,
        resources: "{}".to_string(),
        tags: new.tags,
        metadata: "{}".to_string(),
        created_at: now,
        updated_at: now,
        last_heartbeat: now,
        is_local: new.is_local,
    };

    if host.is_local {
        let already: Option<String> = conn
            .query_row("SELECT id FROM hosts WHERE is_local = 1", [], |r| r.get(0))
            .optional()?;
        if already.is_some() {
            return Err(DbError::Invariant(
                "a local host is already registered".to_string(),
            ));
        }
    }

    let tags_json = serde_json::to_string(&host.tags)
        .map_err(|e| DbError::Serialization(e.to_string()))?;

    let inserted = conn.execute(
        r#"
        INSERT INTO hosts
            (id, name, ip, os, status, resources, tags, metadata,
             created_at, updated_at, last_heartbeat, is_local)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(id) DO NOTHING
        "#,
        params![
            host.id,
            host.name,
            host.ip,
            host.os,
            host.status.to_string(),
            host.resources,
            tags_json,
            host.metadata,
            host.created_at,
            host.updated_at,
            host.last_heartbeat,
            host.is_local as i64,
        ],
    )?;

    if inserted == 0 {
        return Err(DbError::Conflict(format!("host {} already exists", host.id)));
    }

    Ok(host)
}

pub fn update_host(conn: &Connection, id: &str, update: HostUpdate) -> DbResult<Host> {
    let mut host = get_host(conn, id)?.ok_or_else(|| DbError::NotFound(id.to_string()))?;

    if let Some(name) = update.name {
        host.name = name;
    }
    if let Some(status) = update.status {
        host.status = status;
    }
    if let Some(tags) = update.tags {
        host.tags = tags;
    }
    if let Some(resources) = update.resources {
        host.resources = resources;
    }
    if let Some(metadata) = update.metadata {
        host.metadata = metadata;
    }
    if let Some(hb) = update.last_heartbeat {
        host.last_heartbeat = hb;
    }
    host.updated_at = now_ms();

    let tags_json = serde_json::to_string(&host.tags)
        .map_err(|e| DbError::Serialization(e.to_string()))?;

    conn.execute(
        r#"
        UPDATE hosts SET
            name = ?2, status = ?3, resources = ?4, tags = ?5,
            metadata = ?6, updated_at = ?7, last_heartbeat = ?8
        WHERE id = ?1
        "#,
        params![
            host.id,
            host.name,
            host.status.to_string(),
            host.resources,
            tags_json,
            host.metadata,
            host.updated_at,
            host.last_heartbeat,
        ],
    )?;

    Ok(host)
}

pub fn list_hosts(conn: &Connection) -> DbResult<Vec<Host>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, ip, os, status, resources, tags, metadata,
               created_at, updated_at, last_heartbeat, is_local
        FROM hosts ORDER BY created_at ASC
        "#,
    )?;
    let rows = stmt
        .query_map([], row_to_host)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_host(conn: &Connection, id: &str) -> DbResult<Option<Host>> {
    conn.query_row(
        r#"
        SELECT id, name, ip, os, status, resources, tags, metadata,
               created_at, updated_at, last_heartbeat, is_local
        FROM hosts WHERE id = ?1
        "#,
        params![id],
        row_to_host,
    )
    .optional()
    .map_err(DbError::from)
}

pub fn get_local_host(conn: &Connection) -> DbResult<Host> {
    conn.query_row(
        r#"
        SELECT id, name, ip, os, status, resources, tags, metadata,
               created_at, updated_at, last_heartbeat, is_local
        FROM hosts WHERE is_local = 1
        "#,
        [],
        row_to_host,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound("local host not registered".to_string()))
}

pub fn remove_host(conn: &Connection, id: &str) -> DbResult<()> {
    let host = get_host(conn, id)?.ok_or_else(|| DbError::NotFound(id.to_string()))?;
    if host.is_local {
        return Err(DbError::Invariant("the local host cannot be removed".to_string()));
    }
    conn.execute("DELETE FROM hosts WHERE id = ?1", params![id])?;
    Ok(())
}

fn row_to_host(row: &rusqlite::Row<'_>) -> rusqlite::Result<Host> {
    let tags_json: String = row.get(6)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let status_str: String = row.get(4)?;
    Ok(Host {
        id: row.get(0)?,
        name: row.get(1)?,
        ip: row.get(2)?,
        os: row.get(3)?,
        status: status_str.parse().unwrap_or(HostStatus::Unknown),
        resources: row.get(5)?,
        tags,
        metadata: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        last_heartbeat: row.get(10)?,
        is_local: row.get::<_, i64>(11)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn local_host_uniqueness_is_enforced() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().await;
        add_host(
            &conn,
            NewHost {
                name: "local".into(),
                ip: "127.0.0.1".into(),
                os: "Linux".into(),
                tags: vec![],
                is_local: true,
            },
        )
        .unwrap();

        let second = add_host(
            &conn,
            NewHost {
                name: "local2".into(),
                ip: "127.0.0.2".into(),
                os: "Linux".into(),
                tags: vec![],
                is_local: true,
            },
        );
        assert!(matches!(second, Err(DbError::Invariant(_))));
    }

    #[tokio::test]
    async fn local_host_cannot_be_removed() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().await;
        let host = add_host(
            &conn,
            NewHost {
                name: "local".into(),
                ip: "127.0.0.1".into(),
                os: "Linux".into(),
                tags: vec![],
                is_local: true,
            },
        )
        .unwrap();

        let result = remove_host(&conn, &host.id);
        assert!(matches!(result, Err(DbError::Invariant(_))));
    }

    #[tokio::test]
    async fn add_then_list_then_remove_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().await;
        let host = add_host(
            &conn,
            NewHost {
                name: "remote".into(),
                ip: "10.0.0.2".into(),
                os: "Linux".into(),
                tags: vec!["edge".into()],
                is_local: false,
            },
        )
        .unwrap();

        assert_eq!(list_hosts(&conn).unwrap().len(), 1);
        remove_host(&conn, &host.id).unwrap();
        assert_eq!(list_hosts(&conn).unwrap().len(), 0);
    }
}
