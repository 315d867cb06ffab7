//! In-process CRUD service
//!
//! Entities are stored as their marshaled wire JSON, so every call goes
//! through the same codec a remote round trip would.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use cfgmap_core::wire;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::service::{CrudService, Entity, Stub};

pub struct InMemoryService<T> {
    kind: String,
    documents: Mutex<BTreeMap<String, Value>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for InMemoryService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryService")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T: Entity> InMemoryService<T> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            documents: Mutex::new(BTreeMap::new()),
            _entity: PhantomData,
        }
    }

    fn documents(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        // A poisoned map is still consistent: every write is a single insert or remove.
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wire JSON stored under `id`.
    pub fn document(&self, id: &str) -> Option<Value> {
        self.documents().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    /// Encode `entity` with `id` as its identifier.
    fn marshal(entity: &T, id: &str) -> Result<Value> {
        let mut copy: T = wire::from_value(wire::to_value(entity)?)?;
        copy.set_remote_id(Some(id.to_string()));
        Ok(wire::to_value(&copy)?)
    }
}

#[async_trait]
impl<T: Entity> CrudService<T> for InMemoryService<T> {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn create(&self, entity: &T) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let document = Self::marshal(entity, &id)?;
        self.documents().insert(id.clone(), document);
        debug!(kind = %self.kind, %id, "stored");
        Ok(id)
    }

    async fn update(&self, id: &str, entity: &T) -> Result<()> {
        let document = Self::marshal(entity, id)?;
        let mut documents = self.documents();
        match documents.get_mut(id) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(Error::not_found(&self.kind, id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.documents()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(&self.kind, id))
    }

    async fn get(&self, id: &str) -> Result<T> {
        let document = self
            .document(id)
            .ok_or_else(|| Error::not_found(&self.kind, id))?;
        Ok(wire::from_value(document)?)
    }

    async fn list(&self) -> Result<Vec<Stub>> {
        let documents: Vec<(String, Value)> = self
            .documents()
            .iter()
            .map(|(id, document)| (id.clone(), document.clone()))
            .collect();
        documents
            .into_iter()
            .map(|(id, document)| {
                let entity: T = wire::from_value(document)?;
                Ok(Stub {
                    id,
                    name: entity.display_name().map(str::to_string),
                })
            })
            .collect()
    }
}
