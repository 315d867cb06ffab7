//! CRUD service contract

use async_trait::async_trait;
use cfgmap_core::{Identified, WireEntity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Entities a [`CrudService`] can store
pub trait Entity: WireEntity + Identified + Send + Sync + 'static {}

impl<T> Entity for T where T: WireEntity + Identified + Send + Sync + 'static {}

/// Identifier and name projection returned by list calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stub {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Create, read, update and delete for one entity kind
#[async_trait]
pub trait CrudService<T: Entity>: Send + Sync {
    /// Kind name used in errors and logs.
    fn kind(&self) -> &str;

    /// Store a new entity and return the identifier assigned to it.
    async fn create(&self, entity: &T) -> Result<String>;

    async fn update(&self, id: &str, entity: &T) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn get(&self, id: &str) -> Result<T>;

    async fn list(&self) -> Result<Vec<Stub>>;
}

/// Identity preconditions checked before the inner service is called.
///
/// - create rejects an entity that already carries an identifier,
/// - update and delete reject an empty identifier,
/// - update rejects an entity whose identifier disagrees with `id`.
#[derive(Debug, Clone)]
pub struct Guarded<S> {
    inner: S,
}

impl<S> Guarded<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn require_id(kind: &str, operation: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::identity(
            kind,
            format!("{operation} requires a remote identifier"),
        ));
    }
    Ok(())
}

impl<S> Guarded<S> {
    /// Create `entity` when it has no identifier yet, update it otherwise.
    /// The assigned identifier is written back into `entity`.
    pub async fn apply<T>(&self, entity: &mut T) -> Result<String>
    where
        T: Entity,
        S: CrudService<T>,
    {
        match entity.remote_id().map(str::to_string) {
            Some(id) => {
                CrudService::<T>::update(self, &id, &*entity).await?;
                Ok(id)
            }
            None => {
                let id = CrudService::<T>::create(self, &*entity).await?;
                entity.set_remote_id(Some(id.clone()));
                Ok(id)
            }
        }
    }
}

#[async_trait]
impl<T, S> CrudService<T> for Guarded<S>
where
    T: Entity,
    S: CrudService<T>,
{
    fn kind(&self) -> &str {
        CrudService::<T>::kind(&self.inner)
    }

    async fn create(&self, entity: &T) -> Result<String> {
        let kind = CrudService::<T>::kind(&self.inner);
        if let Some(id) = entity.remote_id() {
            return Err(Error::identity(
                kind,
                format!("create payload already carries identifier {id}"),
            ));
        }
        let id = self.inner.create(entity).await?;
        info!(kind, %id, "created");
        Ok(id)
    }

    async fn update(&self, id: &str, entity: &T) -> Result<()> {
        let kind = CrudService::<T>::kind(&self.inner);
        require_id(kind, "update", id)?;
        if let Some(own) = entity.remote_id().filter(|own| *own != id) {
            return Err(Error::identity(
                kind,
                format!("payload identifier {own} does not match {id}"),
            ));
        }
        self.inner.update(id, entity).await?;
        info!(kind, id, "updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let kind = CrudService::<T>::kind(&self.inner);
        require_id(kind, "delete", id)?;
        CrudService::<T>::delete(&self.inner, id).await?;
        info!(kind, id, "deleted");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<T> {
        let kind = CrudService::<T>::kind(&self.inner);
        require_id(kind, "get", id)?;
        debug!(kind, id, "get");
        CrudService::<T>::get(&self.inner, id).await
    }

    async fn list(&self) -> Result<Vec<Stub>> {
        let stubs = CrudService::<T>::list(&self.inner).await?;
        debug!(
            kind = CrudService::<T>::kind(&self.inner),
            count = stubs.len(),
            "listed"
        );
        Ok(stubs)
    }
}
