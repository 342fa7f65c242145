//! Persistence layer: durable storage of Host and
//! Container rows in a single local SQLite file, accessed by a single
//! service process (the Infrastructure Service). A `Database` wrapper
//! holds one `tokio::sync::Mutex<Connection>` guarding a single
//! WAL-mode connection, with table operations implemented as plain
//! functions over a borrowed `Connection` in sibling modules.

pub mod containers;
pub mod error;
pub mod hosts;

pub use error::{DbError, DbResult};

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

const SCHEMA_VERSION: i64 = 1;

pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database file, running migrations under a
    /// process-local advisory lock (there is only ever one writer
    /// process, so a cross-process lock is unnecessary — see
    /// SPEC_FULL.md's anvyl-db section).
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::migrate(&conn)?;

        info!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests and by `anvyl-infra`'s own
    /// test harness.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> DbResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);

            CREATE TABLE IF NOT EXISTS hosts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                ip TEXT NOT NULL,
                os TEXT NOT NULL,
                status TEXT NOT NULL,
                resources TEXT NOT NULL,
                tags TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                last_heartbeat INTEGER NOT NULL,
                is_local INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS containers (
                id TEXT PRIMARY KEY,
                docker_id TEXT,
                name TEXT NOT NULL,
                image TEXT NOT NULL,
                host_id TEXT NOT NULL REFERENCES hosts(id) ON DELETE CASCADE,
                status TEXT NOT NULL,
                labels TEXT NOT NULL,
                ports TEXT NOT NULL,
                volumes TEXT NOT NULL,
                environment TEXT NOT NULL,
                command TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                started_at INTEGER,
                finished_at INTEGER,
                exit_code INTEGER
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_containers_host_name_active
                ON containers(host_id, name) WHERE status != 'removed';

            CREATE INDEX IF NOT EXISTS idx_containers_host
                ON containers(host_id);
            "#,
        )?;

        let has_version: i64 = conn.query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))?;
        if has_version == 0 {
            conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [SCHEMA_VERSION])?;
        }

        Ok(())
    }

    pub async fn add_host(&self, new: hosts::NewHost) -> DbResult<anvyl_core::model::Host> {
        let conn = self.conn.lock().await;
        hosts::add_host(&conn, new)
    }

    pub async fn update_host(&self, id: &str, update: hosts::HostUpdate) -> DbResult<anvyl_core::model::Host> {
        let conn = self.conn.lock().await;
        hosts::update_host(&conn, id, update)
    }

    pub async fn list_hosts(&self) -> DbResult<Vec<anvyl_core::model::Host>> {
        let conn = self.conn.lock().await;
        hosts::list_hosts(&conn)
    }

    pub async fn get_host(&self, id: &str) -> DbResult<Option<anvyl_core::model::Host>> {
        let conn = self.conn.lock().await;
        hosts::get_host(&conn, id)
    }

    pub async fn get_local_host(&self) -> DbResult<anvyl_core::model::Host> {
        let conn = self.conn.lock().await;
        hosts::get_local_host(&conn)
    }

    pub async fn remove_host(&self, id: &str) -> DbResult<()> {
        let conn = self.conn.lock().await;
        hosts::remove_host(&conn, id)
    }

    pub async fn add_container(&self, new: containers::NewContainer) -> DbResult<anvyl_core::model::Container> {
        let conn = self.conn.lock().await;
        containers::add_container(&conn, new)
    }

    pub async fn update_container(
        &self,
        id: &str,
        update: containers::ContainerUpdate,
    ) -> DbResult<anvyl_core::model::Container> {
        let conn = self.conn.lock().await;
        containers::update_container(&conn, id, update)
    }

    pub async fn list_containers(&self, host_id: Option<&str>) -> DbResult<Vec<anvyl_core::model::Container>> {
        let conn = self.conn.lock().await;
        containers::list_containers(&conn, host_id)
    }

    pub async fn get_container(&self, id: &str) -> DbResult<Option<anvyl_core::model::Container>> {
        let conn = self.conn.lock().await;
        containers::get_container(&conn, id)
    }

    pub async fn get_container_by_docker_id(
        &self,
        docker_id: &str,
    ) -> DbResult<Option<anvyl_core::model::Container>> {
        let conn = self.conn.lock().await;
        containers::get_container_by_docker_id(&conn, docker_id)
    }

    pub async fn remove_container(&self, id: &str) -> DbResult<()> {
        let conn = self.conn.lock().await;
        containers::remove_container(&conn, id)
    }

    pub async fn count_containers_by_status(&self) -> DbResult<(u64, u64, u64)> {
        let conn = self.conn.lock().await;
        containers::count_by_status(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn.lock().await;
        // Running migrate a second time on the same connection must not error.
        Database::migrate(&conn).unwrap();
    }
}
