//! Schema migrations for the SQLite chunk store.

use rusqlite::Connection;

use crate::error::Result;

/// Run all pending migrations on the given connection.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version < 1 {
        let tx = conn.transaction()?;
        tx.execute_batch(
            "CREATE TABLE IF NOT EXISTS chunks (
                reference BLOB PRIMARY KEY,
                payload   BLOB NOT NULL
            );
            PRAGMA user_version = 1;",
        )?;
        tx.commit()?;
    }

    Ok(())
}
