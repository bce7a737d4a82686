use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::domain::entities::header::NodeId;
use crate::domain::entities::observation::{DatasetExtract, SheetExtract};
use crate::infra::sqlite::schema::open_connection;
use crate::usecase::ports::repo::{
    DatasetRecord, NodeRecord, SheetRecord, StoredAnnotation, StoredObservation,
};

/// Persists a whole dataset extract in one transaction. Sheets without any
/// marked cell are left out, matching the descriptor emitter. Returns the
/// dataset row id.
pub fn insert_dataset_extract(db_path: &Path, extract: &DatasetExtract) -> Result<i64> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset insert transaction")?;

    let descriptor = &extract.descriptor;
    tx.execute(
        "INSERT INTO dataset(name, source_path, sheet_count, started_at, ended_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            descriptor.name,
            descriptor.source_path,
            descriptor.sheet_count,
            descriptor.started_at.to_rfc3339(),
            descriptor.ended_at.to_rfc3339(),
        ],
    )
    .context("failed to insert dataset")?;
    let dataset_id = tx.last_insert_rowid();

    for sheet in &extract.sheets {
        insert_sheet_extract(&tx, dataset_id, sheet)?;
    }

    tx.commit().context("failed to commit dataset insert")?;
    Ok(dataset_id)
}

fn insert_sheet_extract(
    tx: &rusqlite::Transaction<'_>,
    dataset_id: i64,
    sheet: &SheetExtract,
) -> Result<()> {
    let descriptor = &sheet.descriptor;
    tx.execute(
        "INSERT INTO sheet(dataset_id, sheet_idx, name, row_count, col_count, marked_cells)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            dataset_id,
            descriptor.id.0,
            descriptor.name,
            descriptor.row_count,
            descriptor.col_count,
            descriptor.marked_cells,
        ],
    )
    .with_context(|| format!("failed to insert sheet: {}", descriptor.name))?;
    let sheet_id = tx.last_insert_rowid();

    let mut insert_title = tx
        .prepare("INSERT INTO sheet_title(sheet_id, pos, title) VALUES (?1, ?2, ?3)")
        .context("failed to prepare title insert")?;
    for (pos, title) in descriptor.titles.iter().enumerate() {
        insert_title
            .execute(params![sheet_id, pos as i64, title])
            .context("failed to insert sheet title")?;
    }
    drop(insert_title);

    // Nodes first without links, then the parent/property references once
    // every node has a row id.
    let mut node_ids: HashMap<NodeId, i64> = HashMap::new();
    let mut insert_node = tx
        .prepare(
            "INSERT INTO header_node(sheet_id, row, col, kind, label)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare node insert")?;
    for node in sheet.nodes.iter() {
        insert_node
            .execute(params![
                sheet_id,
                node.id.cell.row,
                node.id.cell.col,
                node.kind.as_str(),
                node.label,
            ])
            .context("failed to insert header node")?;
        node_ids.insert(node.id, tx.last_insert_rowid());
    }
    drop(insert_node);

    let mut link_node = tx
        .prepare("UPDATE header_node SET parent_id = ?1, bound_property_id = ?2 WHERE id = ?3")
        .context("failed to prepare node link update")?;
    for node in sheet.nodes.iter() {
        let parent_id = node.parent.and_then(|p| node_ids.get(&p)).copied();
        let bound_property_id = node
            .bound_property
            .and_then(|p| node_ids.get(&p))
            .copied();
        if parent_id.is_some() || bound_property_id.is_some() {
            link_node
                .execute(params![parent_id, bound_property_id, node_ids[&node.id]])
                .context("failed to link header node")?;
        }
    }
    drop(link_node);

    let mut insert_observation = tx
        .prepare("INSERT INTO observation(sheet_id, row, col, value) VALUES (?1, ?2, ?3, ?4)")
        .context("failed to prepare observation insert")?;
    let mut insert_dimension = tx
        .prepare(
            "INSERT OR IGNORE INTO observation_dimension(observation_id, node_id)
             VALUES (?1, ?2)",
        )
        .context("failed to prepare dimension insert")?;
    for observation in &sheet.observations {
        insert_observation
            .execute(params![
                sheet_id,
                observation.cell.row,
                observation.cell.col,
                observation.value,
            ])
            .context("failed to insert observation")?;
        let observation_id = tx.last_insert_rowid();
        for dimension in &observation.dimensions {
            if let Some(node_id) = node_ids.get(dimension) {
                insert_dimension
                    .execute(params![observation_id, node_id])
                    .context("failed to insert observation dimension")?;
            }
        }
    }
    drop(insert_observation);
    drop(insert_dimension);

    let mut insert_annotation = tx
        .prepare(
            "INSERT INTO annotation(sheet_id, row, col, text, author, noted_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .context("failed to prepare annotation insert")?;
    for annotation in &sheet.annotations {
        insert_annotation
            .execute(params![
                sheet_id,
                annotation.cell.row,
                annotation.cell.col,
                annotation.text,
                annotation.author,
                annotation.date.map(|d| d.to_string()),
            ])
            .context("failed to insert annotation")?;
    }
    drop(insert_annotation);

    Ok(())
}

pub fn list_datasets(db_path: &Path) -> Result<Vec<DatasetRecord>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, source_path, sheet_count, started_at, ended_at
             FROM dataset
             ORDER BY id ASC",
        )
        .context("failed to prepare dataset query")?;

    let records = stmt
        .query_map([], |row| {
            Ok(DatasetRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                source_path: row.get(2)?,
                sheet_count: row.get(3)?,
                started_at: row.get(4)?,
                ended_at: row.get(5)?,
            })
        })
        .context("failed to query datasets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read dataset rows")?;

    Ok(records)
}

pub fn list_sheets(db_path: &Path, dataset_id: i64) -> Result<Vec<SheetRecord>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, sheet_idx, name, row_count, col_count, marked_cells
             FROM sheet
             WHERE dataset_id = ?1
             ORDER BY sheet_idx ASC",
        )
        .context("failed to prepare sheet query")?;

    let records = stmt
        .query_map([dataset_id], |row| {
            Ok(SheetRecord {
                id: row.get(0)?,
                sheet_idx: row.get(1)?,
                name: row.get(2)?,
                row_count: row.get(3)?,
                col_count: row.get(4)?,
                marked_cells: row.get(5)?,
            })
        })
        .context("failed to query sheets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read sheet rows")?;

    Ok(records)
}

pub fn list_nodes(db_path: &Path, sheet_id: i64) -> Result<Vec<NodeRecord>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, row, col, kind, label, parent_id, bound_property_id
             FROM header_node
             WHERE sheet_id = ?1
             ORDER BY row ASC, col ASC, kind ASC",
        )
        .context("failed to prepare node query")?;

    let records = stmt
        .query_map([sheet_id], |row| {
            Ok(NodeRecord {
                id: row.get(0)?,
                row: row.get(1)?,
                col: row.get(2)?,
                kind: row.get(3)?,
                label: row.get(4)?,
                parent_id: row.get(5)?,
                bound_property_id: row.get(6)?,
            })
        })
        .context("failed to query nodes")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read node rows")?;

    Ok(records)
}

pub fn load_observations(db_path: &Path, sheet_id: i64) -> Result<Vec<StoredObservation>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, row, col, value
             FROM observation
             WHERE sheet_id = ?1
             ORDER BY row ASC, col ASC",
        )
        .context("failed to prepare observation query")?;

    let mut dim_stmt = conn
        .prepare(
            "SELECT n.label
             FROM observation_dimension d
             JOIN header_node n ON n.id = d.node_id
             WHERE d.observation_id = ?1
             ORDER BY n.row ASC, n.col ASC, n.kind ASC",
        )
        .context("failed to prepare dimension query")?;

    let base = stmt
        .query_map([sheet_id], |row| {
            let id: i64 = row.get(0)?;
            Ok((
                id,
                StoredObservation {
                    row: row.get(1)?,
                    col: row.get(2)?,
                    value: row.get(3)?,
                    dimensions: Vec::new(),
                },
            ))
        })
        .context("failed to query observations")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read observation rows")?;

    let mut observations = Vec::with_capacity(base.len());
    for (observation_id, mut observation) in base {
        observation.dimensions = dim_stmt
            .query_map([observation_id], |row| row.get::<_, String>(0))
            .context("failed to query observation dimensions")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read observation dimensions")?;
        observations.push(observation);
    }

    Ok(observations)
}

pub fn load_annotations(db_path: &Path, sheet_id: i64) -> Result<Vec<StoredAnnotation>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT row, col, text, author, noted_on
             FROM annotation
             WHERE sheet_id = ?1
             ORDER BY row ASC, col ASC",
        )
        .context("failed to prepare annotation query")?;

    let records = stmt
        .query_map([sheet_id], |row| {
            Ok(StoredAnnotation {
                row: row.get(0)?,
                col: row.get(1)?,
                text: row.get(2)?,
                author: row.get(3)?,
                noted_on: row.get(4)?,
            })
        })
        .context("failed to query annotations")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read annotation rows")?;

    Ok(records)
}

pub fn observation_count(db_path: &Path, dataset_id: i64) -> Result<i64> {
    let conn = open_connection(db_path)?;
    let count = conn
        .query_row(
            "SELECT COUNT(*)
             FROM observation o
             JOIN sheet s ON s.id = o.sheet_id
             WHERE s.dataset_id = ?1",
            [dataset_id],
            |row| row.get(0),
        )
        .optional()
        .context("failed to count observations")?
        .unwrap_or(0);
    Ok(count)
}
