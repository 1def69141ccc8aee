use anyhow::Context;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// `MIGRATIONS_DIR` if set, else `./migrations`, else the directory shipped
/// next to this crate's manifest.
fn migrations_dir() -> Option<PathBuf> {
    let candidates = [
        std::env::var("MIGRATIONS_DIR").ok().map(PathBuf::from),
        Some(PathBuf::from("migrations")),
        Some(Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")),
    ];
    candidates.into_iter().flatten().find(|p| p.is_dir())
}

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    let Some(migrations_dir) = migrations_dir() else {
        anyhow::bail!("migrations directory not found");
    };

    let mut entries: Vec<_> = fs::read_dir(&migrations_dir)
        .with_context(|| format!("failed to read {}", migrations_dir.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "sql")
                .unwrap_or(false)
        })
        .collect();

    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();

        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [&name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        let sql = fs::read_to_string(entry.path())
            .with_context(|| format!("failed to read migration file: {name}"))?;

        conn.execute_batch(&sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [&name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .unwrap();
        assert!(applied >= 1);

        let settings_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(settings_rows, 1);
    }
}
