use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS dataset (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            source_path TEXT NOT NULL,
            sheet_count INTEGER NOT NULL,
            started_at  TEXT NOT NULL,
            ended_at    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS sheet (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            dataset_id   INTEGER NOT NULL,
            sheet_idx    INTEGER NOT NULL,
            name         TEXT NOT NULL,
            row_count    INTEGER NOT NULL,
            col_count    INTEGER NOT NULL,
            marked_cells INTEGER NOT NULL,
            FOREIGN KEY (dataset_id) REFERENCES dataset(id)
        );

        CREATE TABLE IF NOT EXISTS sheet_title (
            sheet_id    INTEGER NOT NULL,
            pos         INTEGER NOT NULL,
            title       TEXT NOT NULL,
            PRIMARY KEY (sheet_id, pos),
            FOREIGN KEY (sheet_id) REFERENCES sheet(id)
        );

        CREATE TABLE IF NOT EXISTS header_node (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            sheet_id          INTEGER NOT NULL,
            row               INTEGER NOT NULL,
            col               INTEGER NOT NULL,
            kind              TEXT NOT NULL,
            label             TEXT NOT NULL,
            parent_id         INTEGER,
            bound_property_id INTEGER,
            UNIQUE (sheet_id, row, col, kind),
            FOREIGN KEY (sheet_id) REFERENCES sheet(id)
        );

        CREATE TABLE IF NOT EXISTS observation (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            sheet_id    INTEGER NOT NULL,
            row         INTEGER NOT NULL,
            col         INTEGER NOT NULL,
            value       TEXT NOT NULL,
            UNIQUE (sheet_id, row, col),
            FOREIGN KEY (sheet_id) REFERENCES sheet(id)
        );

        CREATE TABLE IF NOT EXISTS observation_dimension (
            observation_id INTEGER NOT NULL,
            node_id        INTEGER NOT NULL,
            PRIMARY KEY (observation_id, node_id),
            FOREIGN KEY (observation_id) REFERENCES observation(id),
            FOREIGN KEY (node_id) REFERENCES header_node(id)
        );

        CREATE TABLE IF NOT EXISTS annotation (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            sheet_id    INTEGER NOT NULL,
            row         INTEGER NOT NULL,
            col         INTEGER NOT NULL,
            text        TEXT NOT NULL,
            author      TEXT,
            noted_on    TEXT,
            FOREIGN KEY (sheet_id) REFERENCES sheet(id)
        );

        CREATE INDEX IF NOT EXISTS idx_sheet_dataset
            ON sheet(dataset_id);

        CREATE INDEX IF NOT EXISTS idx_node_sheet
            ON header_node(sheet_id);

        CREATE INDEX IF NOT EXISTS idx_observation_sheet
            ON observation(sheet_id, row, col);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
