//! LanceDB connection and table housekeeping.
use anyhow::Result;
use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection, Table};
use std::sync::Arc;

use hybrag_core::error::Error;

use crate::schema::{build_arrow_schema, vector_dim};

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    let names = conn.table_names().execute().await?;
    if names.contains(&name.to_string()) {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

/// Open the chunk table, creating it empty when missing. An existing table
/// whose vector width differs from `dim` is rejected.
pub async fn ensure_chunk_table(conn: &Connection, name: &str, dim: usize) -> Result<Table> {
    let width = i32::try_from(dim).map_err(|_| Error::InvalidConfig(format!("embedding dimension {} too large", dim)))?;
    ensure_table(conn, name, build_arrow_schema(width)).await?;
    let table = conn.open_table(name).execute().await?;
    let schema = table.schema().await?;
    match vector_dim(&schema) {
        Some(actual) if actual == dim => Ok(table),
        Some(actual) => Err(Error::DimensionMismatch { expected: actual, actual: dim }.into()),
        None => Err(Error::Operation(format!("table {} has no vector column", name)).into()),
    }
}

/// Open an existing table; `None` when it was never created.
pub async fn open_existing(conn: &Connection, name: &str) -> Result<Option<Table>> {
    let names = conn.table_names().execute().await?;
    if !names.contains(&name.to_string()) { return Ok(None); }
    Ok(Some(conn.open_table(name).execute().await?))
}
