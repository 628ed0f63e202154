use serde_json::Value as Json;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::mql::{apply_sort, evaluate, validate, CompiledQuery};
use crate::store::{ModelBackend, ModelDefinition, Record, SearchResult};
use crate::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Buckets
// ─────────────────────────────────────────────────────────────────────────────

/// `(domain, plural_name)`.
type BucketKey = (String, String);

fn bucket_key(model: &ModelDefinition) -> BucketKey {
    (model.domain.clone(), model.plural_name.clone())
}

/// Primary keys are matched on their JSON text form.
fn pk_key(pk: &Json) -> String {
    pk.to_string()
}

/// Records of one model, in insertion order, with their own key counter.
#[derive(Debug, Default)]
struct Bucket {
    /// Last auto-assigned (or explicitly seen integer) key. Never decreases.
    last_id: u64,
    /// Insertion sequence; only ever grows.
    next_seq: u64,
    records: BTreeMap<u64, Record>,
    seq_by_key: HashMap<String, u64>,
}

impl Bucket {
    /// `None` once the counter has reached `u64::MAX`.
    fn next_id(&mut self) -> Option<u64> {
        self.last_id = self.last_id.checked_add(1)?;
        Some(self.last_id)
    }

    fn observe_id(&mut self, pk: &Json) {
        if let Some(n) = pk.as_u64() {
            self.last_id = self.last_id.max(n);
        }
    }

    fn get(&self, pk: &Json) -> Option<&Record> {
        let seq = self.seq_by_key.get(&pk_key(pk))?;
        self.records.get(seq)
    }

    /// Insert, or replace in place when the key already exists.
    fn put(&mut self, pk: &Json, record: Record) {
        let key = pk_key(pk);
        let seq = match self.seq_by_key.get(&key) {
            Some(seq) => *seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.seq_by_key.insert(key, seq);
                seq
            }
        };
        self.records.insert(seq, record);
    }

    fn remove(&mut self, pk: &Json) -> Option<Record> {
        let seq = self.seq_by_key.remove(&pk_key(pk))?;
        self.records.remove(&seq)
    }

    fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryBackend
// ─────────────────────────────────────────────────────────────────────────────

/// Reference in-memory backend.
///
/// Each model gets an isolated bucket, created lazily on first `create`.
/// There is no internal locking: mutation takes `&mut self`, so sharing a
/// backend across threads is up to the caller.
#[derive(Debug)]
pub struct MemoryBackend {
    connection_string: String,
    buckets: HashMap<BucketKey, Bucket>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_connection_string(Self::create_unique_connection_string())
    }

    pub fn with_connection_string(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            buckets: HashMap::new(),
        }
    }

    /// `memory://<random-token>`; distinct on every call.
    pub fn create_unique_connection_string() -> String {
        format!("memory://{}", Uuid::new_v4().simple())
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Number of records currently held for `model`.
    pub fn len(&self, model: &ModelDefinition) -> usize {
        self.buckets
            .get(&bucket_key(model))
            .map_or(0, |b| b.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|b| b.records.is_empty())
    }

    fn bucket(&self, model: &ModelDefinition) -> Option<&Bucket> {
        self.buckets.get(&bucket_key(model))
    }
}

impl ModelBackend for MemoryBackend {
    #[tracing::instrument(skip_all, fields(model = %model))]
    fn create(&mut self, model: &ModelDefinition, mut data: Record) -> Result<Record> {
        let bucket = self.buckets.entry(bucket_key(model)).or_default();
        let pk_name = &model.primary_key_name;

        let pk = match data.get(pk_name) {
            Some(pk) => {
                bucket.observe_id(pk);
                pk.clone()
            }
            None => {
                let Some(id) = bucket.next_id() else {
                    return Err(Error::backend(format!(
                        "{model} has exhausted its primary key counter"
                    )));
                };
                let pk = Json::from(id);
                data.insert(pk_name.clone(), pk.clone());
                pk
            }
        };

        debug!(pk = %pk, "creating instance");
        let out = data.clone();
        bucket.put(&pk, data);
        Ok(out)
    }

    fn retrieve(&self, model: &ModelDefinition, pk: &Json) -> Result<Option<Record>> {
        Ok(self.bucket(model).and_then(|b| b.get(pk)).cloned())
    }

    #[tracing::instrument(skip_all, fields(model = %model, pk = %pk))]
    fn update(&mut self, model: &ModelDefinition, pk: &Json, partial: Record) -> Result<Record> {
        let Some(bucket) = self.buckets.get_mut(&bucket_key(model)) else {
            return Err(Error::not_found(model, pk));
        };
        let Some(mut record) = bucket.get(pk).cloned() else {
            return Err(Error::not_found(model, pk));
        };

        record.extend(partial);
        record.insert(model.primary_key_name.clone(), pk.clone());

        debug!("updating instance");
        let out = record.clone();
        bucket.put(pk, record);
        Ok(out)
    }

    #[tracing::instrument(skip_all, fields(model = %model, pk = %pk))]
    fn delete(&mut self, model: &ModelDefinition, pk: &Json) -> Result<()> {
        let removed = self
            .buckets
            .get_mut(&bucket_key(model))
            .and_then(|b| b.remove(pk));
        debug!(removed = removed.is_some(), "deleting instance");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(model = %model))]
    fn search(&self, model: &ModelDefinition, query: &CompiledQuery) -> Result<SearchResult> {
        validate(&query.tokens)?;

        let mut instances = Vec::new();
        if let Some(bucket) = self.bucket(model) {
            for record in bucket.iter() {
                if evaluate(&query.tokens, record)? {
                    instances.push(record.clone());
                }
            }
        }

        if let Some(sort) = &query.sort {
            apply_sort(&mut instances, sort);
        }
        if let Some(take) = query.take {
            instances.truncate(take);
        }

        trace!(hits = instances.len(), "search finished");
        Ok(SearchResult {
            instances,
            page: query.page.clone(),
        })
    }

    fn dispose(&mut self) -> Result<()> {
        debug!(
            connection = %self.connection_string,
            buckets = self.buckets.len(),
            "disposing memory backend"
        );
        self.buckets.clear();
        Ok(())
    }
}
