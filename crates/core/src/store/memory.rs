//! In-memory store.
//!
//! Rows live in insertion order behind a `RwLock`; queries are exact scans
//! keeping the `k` closest rows in a bounded max-heap. Index specs are recorded
//! but never built: approximate search belongs to the external extension.

use super::{DocumentRecord, Hit, IndexSpec, QueryVector, Schema, Store};
use crate::config::MAX_K;
use crate::error::{Error, Result};
use crate::vector::{DenseVector, DistanceMetric, SparseVector};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

/// Stored row. Text is shared with every [`Hit`] that returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: Uuid,
    pub text: Arc<str>,
    pub dense: DenseVector,
    pub sparse: SparseVector,
}

/// Internal data for a store, protected by a `RwLock`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreData {
    pub schema: Option<Schema>,
    pub indexes: Vec<IndexSpec>,
    /// Rows in insertion order; position is the tie-break sequence number.
    pub documents: Vec<StoredDocument>,
    /// ID → position in `documents`.
    pub ids: HashMap<Uuid, u32>,
}

impl StoreData {
    /// Validate internal invariants after deserialization.
    ///
    /// Checks the ID map mirrors the document list, that every row matches the
    /// schema dimensions, and that no column carries two indexes.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let Some(schema) = &self.schema else {
            if !self.documents.is_empty() || !self.indexes.is_empty() {
                return Err(format!(
                    "no schema but {} documents and {} indexes",
                    self.documents.len(),
                    self.indexes.len()
                ));
            }
            return Ok(());
        };
        schema.validate().map_err(|e| e.to_string())?;

        if self.ids.len() != self.documents.len() {
            return Err(format!(
                "ids({}) != documents({})",
                self.ids.len(),
                self.documents.len()
            ));
        }

        for (pos, doc) in self.documents.iter().enumerate() {
            match self.ids.get(&doc.id) {
                Some(&p) if p as usize == pos => {}
                Some(&p) => {
                    return Err(format!("id {} maps to {} but is stored at {}", doc.id, p, pos));
                }
                None => return Err(format!("id {} at {} missing from id map", doc.id, pos)),
            }
            if doc.dense.dimension() != schema.dense_dims {
                return Err(format!(
                    "document {} dense dimension {} != schema {}",
                    doc.id,
                    doc.dense.dimension(),
                    schema.dense_dims
                ));
            }
            if doc.sparse.dims() != schema.sparse_dims {
                return Err(format!(
                    "document {} sparse dims {} != schema {}",
                    doc.id,
                    doc.sparse.dims(),
                    schema.sparse_dims
                ));
            }
        }

        for (i, spec) in self.indexes.iter().enumerate() {
            spec.validate().map_err(|e| e.to_string())?;
            if self.indexes[..i].iter().any(|s| s.column == spec.column) {
                return Err(format!("column {} indexed twice", spec.column));
            }
        }

        Ok(())
    }

    fn schema(&self) -> Result<&Schema> {
        self.schema.as_ref().ok_or(Error::SchemaMissing)
    }
}

/// A thread-safe document store with exact nearest-neighbour search.
///
/// Cloning a `MemoryStore` produces a new handle to the same shared data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub data: Arc<RwLock<StoreData>>,
}

impl MemoryStore {
    /// Creates an empty store with no schema.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_data(data: StoreData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Retrieves a row by ID.
    pub fn get(&self, id: &Uuid) -> Option<StoredDocument> {
        let data = self.data.read();
        let pos = *data.ids.get(id)?;
        data.documents.get(pos as usize).cloned()
    }
}

impl Store for MemoryStore {
    fn create_schema(&self, schema: &Schema) -> Result<()> {
        schema.validate()?;
        let mut data = self.data.write();
        if let Some(existing) = &data.schema {
            return Err(Error::SchemaExists(existing.table.clone()));
        }
        tracing::debug!(
            "Created schema '{}' (dense={}, sparse={})",
            schema.table,
            schema.dense_dims,
            schema.sparse_dims
        );
        data.schema = Some(schema.clone());
        Ok(())
    }

    fn insert(&self, record: DocumentRecord) -> Result<Uuid> {
        let mut data = self.data.write();
        let schema = data.schema()?;
        if record.dense.dimension() != schema.dense_dims {
            return Err(Error::DimensionMismatch {
                expected: schema.dense_dims,
                actual: record.dense.dimension(),
            });
        }
        if record.sparse.dims() != schema.sparse_dims {
            return Err(Error::DimensionMismatch {
                expected: schema.sparse_dims as usize,
                actual: record.sparse.dims() as usize,
            });
        }
        if data.ids.contains_key(&record.id) {
            return Err(Error::DuplicateId(record.id));
        }

        let pos = data.documents.len() as u32;
        let id = record.id;
        data.ids.insert(id, pos);
        data.documents.push(StoredDocument {
            id,
            text: Arc::from(record.text),
            dense: record.dense,
            sparse: record.sparse,
        });
        Ok(id)
    }

    fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let mut data = self.data.write();
        data.schema()?;
        spec.validate()?;
        if let Some(existing) = data.indexes.iter().find(|s| s.column == spec.column) {
            return Err(Error::InvalidIndex(format!(
                "column {} already has a {} index",
                spec.column, existing.metric
            )));
        }
        tracing::debug!(
            "Registered {:?} index on {} ({})",
            spec.algorithm,
            spec.column,
            spec.metric
        );
        data.indexes.push(*spec);
        Ok(())
    }

    fn query(&self, vector: QueryVector<'_>, metric: DistanceMetric, k: usize) -> Result<Vec<Hit>> {
        let data = self.data.read();
        let schema = data.schema()?;
        match vector {
            QueryVector::Dense(q) if q.dimension() != schema.dense_dims => {
                return Err(Error::DimensionMismatch {
                    expected: schema.dense_dims,
                    actual: q.dimension(),
                });
            }
            QueryVector::Sparse(q) if q.dims() != schema.sparse_dims => {
                return Err(Error::DimensionMismatch {
                    expected: schema.sparse_dims as usize,
                    actual: q.dims() as usize,
                });
            }
            _ => {}
        }

        let k = k.min(MAX_K);
        if k == 0 {
            return Ok(Vec::new());
        }

        let column = vector.column();
        let indexed = data
            .indexes
            .iter()
            .any(|s| s.column == column && s.metric == metric);

        // Max-heap on (distance, position): the root is the worst kept row.
        let mut heap: BinaryHeap<(OrderedFloat<f32>, u32)> = BinaryHeap::with_capacity(k + 1);
        for (pos, doc) in data.documents.iter().enumerate() {
            let distance = match vector {
                QueryVector::Dense(q) => metric.dense_distance(q, &doc.dense),
                QueryVector::Sparse(q) => metric.sparse_distance(q, &doc.sparse),
            };
            heap.push((OrderedFloat(distance), pos as u32));
            if heap.len() > k {
                heap.pop();
            }
        }

        let hits: Vec<Hit> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|(distance, pos)| {
                let doc = &data.documents[pos as usize];
                Hit {
                    id: doc.id,
                    text: Arc::clone(&doc.text),
                    distance: distance.0,
                }
            })
            .collect();

        tracing::debug!(
            column = %column,
            metric = %metric,
            indexed,
            scanned = data.documents.len(),
            hits = hits.len(),
            "query"
        );
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.data.read().documents.len()
    }

    fn schema(&self) -> Option<Schema> {
        self.data.read().schema.clone()
    }

    fn indexes(&self) -> Vec<IndexSpec> {
        self.data.read().indexes.clone()
    }
}
