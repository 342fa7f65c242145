//! Container table operations.

use anvyl_core::model::{Container, ContainerStatus};
use anvyl_core::time::now_ms;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{DbError, DbResult};
use crate::hosts::get_host;

#[derive(Debug, Default, Clone)]
pub struct ContainerUpdate {
    pub docker_id: Option<Option<String>>,
    pub status: Option<ContainerStatus>,
    pub started_at: Option<Option<i64>>,
    pub finished_at: Option<Option<i64>>,
    pub exit_code: Option<Option<i32>>,
}

pub struct NewContainer {
    pub name: String,
    pub image: String,
    pub host_id: String,
    pub labels: String,
    pub ports: String,
    pub volumes: String,
    pub environment: String,
    pub command: String,
}

pub fn add_container(conn: &Connection, new: NewContainer) -> DbResult<Container> {
    if get_host(conn, &new.host_id)?.is_none() {
        return Err(DbError::NotFound(format!("host {} not found", new.host_id)));
    }

    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM containers WHERE host_id = ?1 AND name = ?2 AND status != 'removed'",
            params![new.host_id, new.name],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(DbError::Conflict(format!(
            "container {} already exists on host {}",
            new.name, new.host_id
        )));
    }

    let now = now_ms();
    let container = Container {
        id: uuid::Uuid::new_v4().to_string(),
        docker_id: None,
        name: new.name,
        image: new.image,
        host_id: new.host_id,
        status: ContainerStatus::Created,
        labels: new.labels,
        ports: new.ports,
        volumes: new.volumes,
        environment: new.environment,
        command: new.command,
        created_at: now,
        updated_at: now,
        started_at: None,
        finished_at: None,
        exit_code: None,
    };

    conn.execute(
        r#"
        INSERT INTO containers
            (id, docker_id, name, image, host_id, status, labels, ports,
             volumes, environment, command, created_at, updated_at,
             started_at, finished_at, exit_code)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
        params![
            container.id,
            container.docker_id,
            container.name,
            container.image,
            container.host_id,
            container.status.to_string(),
            container.labels,
            container.ports,
            container.volumes,
            container.environment,
            container.command,
            container.created_at,
            container.updated_at,
            container.started_at,
            container.finished_at,
            container.exit_code,
        ],
    )?;

    Ok(container)
}

pub fn update_container(conn: &Connection, id: &str, update: ContainerUpdate) -> DbResult<Container> {
    let mut container = get_container(conn, id)?.ok_or_else(|| DbError::NotFound(id.to_string()))?;

    if let Some(docker_id) = update.docker_id {
        container.docker_id = docker_id;
    }
    if let Some(status) = update.status {
        container.status = status;
    }
    if let Some(started_at) = update.started_at {
        container.started_at = started_at;
    }
    if let Some(finished_at) = update.finished_at {
        container.finished_at = finished_at;
    }
    if let Some(exit_code) = update.exit_code {
        container.exit_code = exit_code;
    }
    container.updated_at = now_ms();

    conn.execute(
        r#"
        UPDATE containers SET
            docker_id = ?2, status = ?3, started_at = ?4,
            finished_at = ?5, exit_code = ?6, updated_at = ?7
        WHERE id = ?1
        "#,
        params![
            container.id,
            container.docker_id,
            container.status.to_string(),
            container.started_at,
            container.finished_at,
            container.exit_code,
            container.updated_at,
        ],
    )?;

    Ok(container)
}

pub fn list_containers(conn: &Connection, host_id: Option<&str>) -> DbResult<Vec<Container>> {
    let mut stmt = if host_id.is_some() {
        conn.prepare(
            r#"
            SELECT id, docker_id, name, image, host_id, status, labels, ports,
                   volumes, environment, command, created_at, updated_at,
                   started_at, finished_at, exit_code
            FROM containers WHERE host_id = ?1 ORDER BY created_at DESC
            "#,
        )?
    } else {
        conn.prepare(
            r#"
            SELECT id, docker_id, name, image, host_id, status, labels, ports,
                   volumes, environment, command, created_at, updated_at,
                   started_at, finished_at, exit_code
            FROM containers ORDER BY created_at DESC
            "#,
        )?
    };

    let rows = if let Some(host_id) = host_id {
        stmt.query_map(params![host_id], row_to_container)?
            .collect::<Result<Vec<_>, _>>()?
    } else {
        stmt.query_map([], row_to_container)?
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(rows)
}

pub fn get_container(conn: &Connection, id: &str) -> DbResult<Option<Container>> {
    conn.query_row(
        r#"
        SELECT id, docker_id, name, image, host_id, status, labels, ports,
               volumes, environment, command, created_at, updated_at,
               started_at, finished_at, exit_code
        FROM containers WHERE id = ?1 OR docker_id = ?1
        "#,
        params![id],
        row_to_container,
    )
    .optional()
    .map_err(DbError::from)
}

pub fn get_container_by_docker_id(conn: &Connection, docker_id: &str) -> DbResult<Option<Container>> {
    conn.query_row(
        r#"
        SELECT id, docker_id, name, image, host_id, status, labels, ports,
               volumes, environment, command, created_at, updated_at,
               started_at, finished_at, exit_code
        FROM containers WHERE docker_id = ?1
        "#,
        params![docker_id],
        row_to_container,
    )
    .optional()
    .map_err(DbError::from)
}

pub fn remove_container(conn: &Connection, id: &str) -> DbResult<()> {
    let affected = conn.execute(
        "DELETE FROM containers WHERE id = ?1 OR docker_id = ?1",
        params![id],
    )?;
    if affected == 0 {
        return Err(DbError::NotFound(id.to_string()));
    }
    Ok(())
}

pub fn count_by_status(conn: &Connection) -> DbResult<(u64, u64, u64)> {
    let total: u64 = conn.query_row("SELECT COUNT(*) FROM containers", [], |r| r.get(0))?;
    let running: u64 = conn.query_row(
        "SELECT COUNT(*) FROM containers WHERE status = 'running'",
        [],
        |r| r.get(0),
    )?;
    let stopped: u64 = conn.query_row(
        "SELECT COUNT(*) FROM containers WHERE status IN ('exited', 'stopped')",
        [],
        |r| r.get(0),
    )?;
    Ok((running, stopped, total))
}

fn row_to_container(row: &rusqlite::Row<'_>) -> rusqlite::Result<Container> {
    let status_str: String = row.get(5)?;
    Ok(Container {
        id: row.get(0)?,
        docker_id: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        host_id: row.get(4)?,
        status: status_str.parse().unwrap_or(ContainerStatus::Unknown),
        labels: row.get(6)?,
        ports: row.get(7)?,
        volumes: row.get(8)?,
        environment: row.get(9)?,
        command: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        started_at: row.get(13)?,
        finished_at: row.get(14)?,
        exit_code: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::{add_host, NewHost};
    use crate::Database;

    async fn local_host(db: &Database) -> String {
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
        .unwrap()
        .id
    }

    fn new_container(host_id: &str) -> NewContainer {
        NewContainer {
            name: "t1".into(),
            image: "nginx:alpine".into(),
            host_id: host_id.to_string(),
            labels: "{}".into(),
            ports: "[]".into(),
            volumes: "[]".into(),
            environment: "{}".into(),
            command: "[]".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_name_on_same_host_conflicts() {
        let db = Database::open_in_memory().unwrap();
        let host_id = local_host(&db).await;
        let conn = db.conn.lock().await;

        add_container(&conn, new_container(&host_id)).unwrap();
        let second = add_container(&conn, new_container(&host_id));
        assert!(matches!(second, Err(DbError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_then_get_then_remove_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let host_id = local_host(&db).await;
        let conn = db.conn.lock().await;

        let created = add_container(&conn, new_container(&host_id)).unwrap();
        let fetched = get_container(&conn, &created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "t1");

        remove_container(&conn, &created.id).unwrap();
        assert!(get_container(&conn, &created.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn removed_name_can_be_reused() {
        let db = Database::open_in_memory().unwrap();
        let host_id = local_host(&db).await;
        let conn = db.conn.lock().await;

        let created = add_container(&conn, new_container(&host_id)).unwrap();
        update_container(
            &conn,
            &created.id,
            ContainerUpdate {
                status: Some(ContainerStatus::Removed),
                ..Default::default()
            },
        )
        .unwrap();

        // A row marked removed no longer blocks the (host_id, name) slot.
        let recreated = add_container(&conn, new_container(&host_id));
        assert!(recreated.is_ok());
    }
}
