//! SQL for the external vector extension (pgvecto.rs dialect).
//!
//! The document table keeps the dense column as `vector(d)` and the sparse
//! column as `svector(s)`. These functions only render statements; executing
//! them is left to whatever database client the caller links.

use super::{DocumentRecord, IndexAlgorithm, IndexSpec, Schema, VectorColumn};
use crate::vector::DistanceMetric;

/// Loads the vector extension.
pub fn create_extension() -> String {
    "CREATE EXTENSION IF NOT EXISTS vectors;".to_string()
}

/// `CREATE TABLE` with the fixed `id`, `text`, `dense`, `sparse` columns.
pub fn create_table(schema: &Schema) -> String {
    format!(
        "CREATE TABLE {} (id UUID PRIMARY KEY, text TEXT NOT NULL, dense vector({}) NOT NULL, sparse svector({}) NOT NULL);",
        schema.table, schema.dense_dims, schema.sparse_dims
    )
}

/// Parameterised insert: `$1` id, `$2` text, `$3` dense, `$4` sparse indices and
/// `$5` sparse values.
pub fn insert(schema: &Schema) -> String {
    format!(
        "INSERT INTO {} (id, text, dense, sparse) VALUES ($1, $2, $3, to_svector({}, $4::int[], $5::real[]));",
        schema.table, schema.sparse_dims
    )
}

/// Insert with the row inlined as literals.
pub fn insert_literal(schema: &Schema, record: &DocumentRecord) -> String {
    format!(
        "INSERT INTO {} (id, text, dense, sparse) VALUES ('{}', '{}', '{}', '{}');",
        schema.table,
        record.id,
        quote(&record.text),
        record.dense,
        record.sparse
    )
}

fn quote(text: &str) -> String {
    text.replace('\'', "''")
}

/// Conventional index name: `<table>_<column>_idx`.
pub fn index_name(schema: &Schema, column: VectorColumn) -> String {
    format!("{}_{}_idx", schema.table, column)
}

fn column_type(column: VectorColumn) -> &'static str {
    match column {
        VectorColumn::Dense => "vector",
        VectorColumn::Sparse => "svector",
    }
}

pub fn create_index(schema: &Schema, spec: &IndexSpec) -> String {
    let options = match spec.algorithm {
        IndexAlgorithm::Hnsw { m, ef_construction } => format!(
            "[indexing.hnsw]\nm = {}\nef_construction = {}",
            m, ef_construction
        ),
        IndexAlgorithm::Flat => "[indexing.flat]".to_string(),
    };
    format!(
        "CREATE INDEX {} ON {} USING vectors ({} {}_{}) WITH (options = $$\n{}\n$$);",
        index_name(schema, spec.column),
        schema.table,
        spec.column,
        column_type(spec.column),
        spec.metric.opclass_suffix(),
        options
    )
}

/// Top-`k` query on one column; `$1` is the query vector.
pub fn nearest(schema: &Schema, column: VectorColumn, metric: DistanceMetric, k: usize) -> String {
    let op = metric.operator();
    format!(
        "SELECT id, text, {col} {op} $1 AS distance FROM {table} ORDER BY {col} {op} $1 LIMIT {k};",
        col = column,
        op = op,
        table = schema.table,
        k = k
    )
}
