//! SQLite-backed vector index.
//!
//! An index directory holds a single `index.sqlite` with two tables:
//! `manifest` (one row describing the embedding space) and `chunks`
//! (passage text, source file name and little-endian f32 vector).
//! Loading reads everything into memory; search is exact L2.

use crate::types::Chunk;
use brandrag_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Index file name inside the index directory.
pub const INDEX_FILE: &str = "index.sqlite";

const TMP_SUFFIX: &str = ".tmp";

/// Which embedding space the stored vectors live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingManifest {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

/// A vector and the chunk it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub vector: Vec<f32>,
    pub chunk: Chunk,
}

/// Path of the index file for a directory.
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Write an index, replacing any index already in `dir`.
///
/// The database is written next to the target and renamed into place once
/// complete, so readers never observe a half-written file.
pub fn build(dir: &Path, manifest: &EmbeddingManifest, records: &[IndexRecord]) -> AppResult<()> {
    if manifest.chunk_count != records.len() {
        return Err(AppError::Other(format!(
            "Manifest lists {} chunks but {} records were given",
            manifest.chunk_count,
            records.len()
        )));
    }
    if let Some(bad) = records
        .iter()
        .find(|r| r.vector.len() != manifest.dimensions)
    {
        return Err(AppError::DimensionMismatch {
            expected: manifest.dimensions,
            actual: bad.vector.len(),
        });
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Other(format!("Failed to create index directory {:?}: {}", dir, e))
    })?;

    let final_path = index_path(dir);
    let tmp_path = dir.join(format!("{}{}", INDEX_FILE, TMP_SUFFIX));
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }

    write_database(&tmp_path, manifest, records)?;
    fs::rename(&tmp_path, &final_path)?;

    tracing::info!(
        "Wrote index with {} chunks ({} / {}, {} dims) to {:?}",
        records.len(),
        manifest.provider,
        manifest.model,
        manifest.dimensions,
        final_path
    );
    Ok(())
}

fn write_database(
    path: &Path,
    manifest: &EmbeddingManifest,
    records: &[IndexRecord],
) -> AppResult<()> {
    let sql_err = |what: &str, e: rusqlite::Error| AppError::Other(format!("{}: {}", what, e));

    let mut conn =
        Connection::open(path).map_err(|e| sql_err("Failed to create SQLite index", e))?;

    conn.execute_batch(
        r#"
        CREATE TABLE manifest (
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            dimensions INTEGER NOT NULL,
            chunk_count INTEGER NOT NULL,
            built_at TEXT NOT NULL
        );

        CREATE TABLE chunks (
            id INTEGER PRIMARY KEY,
            source TEXT NOT NULL,
            content TEXT NOT NULL,
            embedding BLOB NOT NULL
        );
        "#,
    )
    .map_err(|e| sql_err("Failed to create tables", e))?;

    let tx = conn
        .transaction()
        .map_err(|e| sql_err("Failed to start transaction", e))?;

    tx.execute(
        "INSERT INTO manifest (provider, model, dimensions, chunk_count, built_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            manifest.provider,
            manifest.model,
            manifest.dimensions as i64,
            manifest.chunk_count as i64,
            manifest.built_at.to_rfc3339(),
        ],
    )
    .map_err(|e| sql_err("Failed to write manifest", e))?;

    {
        let mut stmt = tx
            .prepare("INSERT INTO chunks (id, source, content, embedding) VALUES (?1, ?2, ?3, ?4)")
            .map_err(|e| sql_err("Failed to prepare insert", e))?;

        for (i, record) in records.iter().enumerate() {
            stmt.execute(params![
                i as i64,
                record.chunk.source,
                record.chunk.content,
                embedding_to_bytes(&record.vector),
            ])
            .map_err(|e| sql_err("Failed to insert chunk", e))?;
        }
    }

    tx.commit()
        .map_err(|e| sql_err("Failed to commit index", e))?;
    Ok(())
}

/// Load the index in `dir`.
///
/// Any problem (missing directory or file, unreadable database, missing
/// manifest, corrupt vectors) is reported as `IndexNotFound` with a reason.
pub fn load(dir: &Path) -> AppResult<IndexHandle> {
    let path = index_path(dir);
    let not_found = |reason: String| AppError::IndexNotFound {
        path: path.clone(),
        reason,
    };

    if !path.is_file() {
        return Err(not_found(
            "index file is missing; run `brandrag ingest` first".to_string(),
        ));
    }

    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| not_found(format!("cannot open SQLite database: {}", e)))?;

    let manifest = read_manifest(&conn).map_err(|e| not_found(format!("bad manifest: {}", e)))?;

    let records = read_records(&conn, manifest.dimensions).map_err(not_found)?;

    if records.len() != manifest.chunk_count {
        return Err(not_found(format!(
            "manifest lists {} chunks but {} are stored",
            manifest.chunk_count,
            records.len()
        )));
    }

    tracing::debug!(
        "Loaded index {:?}: {} chunks, {} / {} ({} dims)",
        path,
        records.len(),
        manifest.provider,
        manifest.model,
        manifest.dimensions
    );

    IndexHandle::from_records(manifest, records)
}

fn read_manifest(conn: &Connection) -> Result<EmbeddingManifest, String> {
    let (provider, model, dimensions, chunk_count, built_at): (String, String, i64, i64, String) =
        conn.query_row(
            "SELECT provider, model, dimensions, chunk_count, built_at FROM manifest LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .map_err(|e| e.to_string())?;

    let built_at = DateTime::parse_from_rfc3339(&built_at)
        .map_err(|e| format!("invalid built_at: {}", e))?
        .with_timezone(&Utc);

    if dimensions <= 0 || chunk_count < 0 {
        return Err(format!(
            "invalid sizes (dimensions {}, chunks {})",
            dimensions, chunk_count
        ));
    }

    Ok(EmbeddingManifest {
        provider,
        model,
        dimensions: dimensions as usize,
        chunk_count: chunk_count as usize,
        built_at,
    })
}

fn read_records(conn: &Connection, dimensions: usize) -> Result<Vec<IndexRecord>, String> {
    let mut stmt = conn
        .prepare("SELECT source, content, embedding FROM chunks ORDER BY id")
        .map_err(|e| format!("cannot read chunks: {}", e))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })
        .map_err(|e| format!("cannot read chunks: {}", e))?;

    let mut records = Vec::new();
    for row in rows {
        let (source, content, blob) = row.map_err(|e| format!("cannot read chunk: {}", e))?;
        let vector = bytes_to_embedding(&blob)
            .filter(|v| v.len() == dimensions)
            .ok_or_else(|| {
                format!(
                    "vector blob of {} bytes does not hold {} f32 values",
                    blob.len(),
                    dimensions
                )
            })?;
        records.push(IndexRecord {
            vector,
            chunk: Chunk { content, source },
        });
    }
    Ok(records)
}

/// A loaded, read-only index.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    manifest: EmbeddingManifest,
    records: Vec<IndexRecord>,
}

impl IndexHandle {
    /// Build a handle from in-memory records.
    pub fn from_records(manifest: EmbeddingManifest, records: Vec<IndexRecord>) -> AppResult<Self> {
        if let Some(bad) = records
            .iter()
            .find(|r| r.vector.len() != manifest.dimensions)
        {
            return Err(AppError::DimensionMismatch {
                expected: manifest.dimensions,
                actual: bad.vector.len(),
            });
        }
        Ok(Self { manifest, records })
    }

    pub fn manifest(&self) -> &EmbeddingManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `k` nearest chunks by Euclidean distance, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(Chunk, f32)>> {
        if query.len() != self.manifest.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.manifest.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, l2_distance(query, &r.vector)))
            .collect();

        // Stable sort: ties keep insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            scored.len(),
            k
        );

        Ok(scored
            .into_iter()
            .map(|(i, d)| (self.records[i].chunk.clone(), d))
            .collect())
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
