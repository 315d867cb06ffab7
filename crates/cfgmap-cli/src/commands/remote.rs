//! Commands talking to the configuration API

use std::path::Path;

use cfgmap_client::{ClientConfig, CrudService, Entity, Guarded, RestService};
use cfgmap_core::mapper::to_tree_value;
use cfgmap_core::{Mapper, TreeFormat, from_tree, load_tree};
use cfgmap_entities::{AlertingProfile, EntityKind, MetricThreshold, SpanCaptureRule};
use colored::Colorize;

use super::convert::write_tree;
use crate::error::{CliError, Result};

fn service<T: Entity>(config: &ClientConfig, kind: EntityKind) -> Result<Guarded<RestService<T>>> {
    let base_url = config.require_base_url()?;
    let path = config.endpoint(kind.as_str())?;
    let credentials = config.credentials();
    if !credentials.configured() {
        return Err(CliError::user(format!(
            "no API token found; set {} or change token_env in the config file",
            config.token_env
        )));
    }
    let rest = RestService::new(kind.as_str(), base_url, path, credentials);
    Ok(Guarded::new(rest))
}

fn singleton(kind: EntityKind) -> CliError {
    CliError::user(format!("{kind} has no identifier and cannot be pushed or pulled"))
}

pub async fn run_push(
    config: &ClientConfig,
    kind: EntityKind,
    tree: &Path,
    id: Option<String>,
) -> Result<()> {
    let id = match kind {
        EntityKind::AlertingProfile => push::<AlertingProfile>(config, kind, tree, id).await?,
        EntityKind::MetricThreshold => push::<MetricThreshold>(config, kind, tree, id).await?,
        EntityKind::SpanCaptureRule => push::<SpanCaptureRule>(config, kind, tree, id).await?,
        EntityKind::HostAnomalyDetection => return Err(singleton(kind)),
    };
    println!("{id}");
    Ok(())
}

async fn push<T: Entity + Mapper>(
    config: &ClientConfig,
    kind: EntityKind,
    tree: &Path,
    id: Option<String>,
) -> Result<String> {
    // Validate the document before asking for credentials.
    let tree = load_tree(tree)?;
    let mut entity: T = from_tree(&tree)?;
    if id.is_some() {
        entity.set_remote_id(id);
    }
    let service = service::<T>(config, kind)?;
    let created = entity.remote_id().is_none();
    let id = service.apply(&mut entity).await?;
    let verb = if created { "Created" } else { "Updated" };
    eprintln!("{} {kind} {}", verb.green(), id.cyan());
    Ok(id)
}

pub async fn run_pull(
    config: &ClientConfig,
    kind: EntityKind,
    id: &str,
    format: Option<TreeFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let tree = match kind {
        EntityKind::AlertingProfile => pull::<AlertingProfile>(config, kind, id).await?,
        EntityKind::MetricThreshold => pull::<MetricThreshold>(config, kind, id).await?,
        EntityKind::SpanCaptureRule => pull::<SpanCaptureRule>(config, kind, id).await?,
        EntityKind::HostAnomalyDetection => return Err(singleton(kind)),
    };
    write_tree(&tree, format, output)
}

async fn pull<T: Entity + Mapper>(
    config: &ClientConfig,
    kind: EntityKind,
    id: &str,
) -> Result<serde_json::Value> {
    let service = service::<T>(config, kind)?;
    let entity: T = CrudService::<T>::get(&service, id).await?;
    Ok(to_tree_value(&entity)?)
}
