//! Idempotent database/container provisioning
//!
//! Walks a [`ProvisioningSpec`] in order and creates each database and its
//! container through a [`DatabaseService`]. A resource that already exists is
//! reported as such; any other failure stops the run.

mod spec;

pub use spec::{
    ProvisionOutcome, ProvisionResult, ProvisioningSpec, LODE_RUNNER_CONTAINER,
    PARTITION_KEY_PATH,
};

use async_trait::async_trait;

use crate::error::{ProvisionError, ServiceError};

/// The calls provisioning needs from a database service.
///
/// Implementations must report an existing resource as
/// [`ServiceError::AlreadyExists`].
#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Create a database with the given id
    async fn create_database(&self, id: &str) -> Result<(), ServiceError>;

    /// Create a container inside `database`, partitioned on `partition_key_path`
    async fn create_container(
        &self,
        database: &str,
        id: &str,
        partition_key_path: &str,
    ) -> Result<(), ServiceError>;
}

/// Provision every pair in `spec`, returning the per-pair outcomes in order.
pub async fn provision<S>(
    service: &S,
    spec: &ProvisioningSpec,
) -> Result<Vec<ProvisionResult>, ProvisionError>
where
    S: DatabaseService + ?Sized,
{
    provision_with(service, spec, |_| {}).await
}

/// Like [`provision`], calling `on_result` as soon as each pair completes.
///
/// Outcomes reported before a fatal error stay reported; pairs after it are
/// never attempted.
pub async fn provision_with<S, F>(
    service: &S,
    spec: &ProvisioningSpec,
    mut on_result: F,
) -> Result<Vec<ProvisionResult>, ProvisionError>
where
    S: DatabaseService + ?Sized,
    F: FnMut(&ProvisionResult),
{
    let mut results = Vec::with_capacity(spec.len());

    for (database, container) in spec.pairs() {
        let result = provision_pair(service, database, container).await?;
        on_result(&result);
        results.push(result);
    }

    tracing::info!(pairs = results.len(), "Provisioning complete");

    Ok(results)
}

async fn provision_pair<S>(
    service: &S,
    database: &str,
    container: &str,
) -> Result<ProvisionResult, ProvisionError>
where
    S: DatabaseService + ?Sized,
{
    match service.create_database(database).await {
        Ok(()) => {
            tracing::debug!(database = %database, "Created database");
        }
        Err(e) if e.is_already_exists() => {
            tracing::debug!(database = %database, "Database already exists");
            return Ok(ProvisionResult::already_exists(database, container));
        }
        Err(source) => {
            return Err(ProvisionError::Database {
                database: database.to_string(),
                source,
            });
        }
    }

    match service
        .create_container(database, container, PARTITION_KEY_PATH)
        .await
    {
        Ok(()) => {
            tracing::debug!(
                database = %database,
                container = %container,
                partition_key = PARTITION_KEY_PATH,
                "Created container"
            );
            Ok(ProvisionResult::created(database, container))
        }
        Err(e) if e.is_already_exists() => {
            tracing::debug!(database = %database, container = %container, "Container already exists");
            Ok(ProvisionResult::already_exists(database, container))
        }
        Err(source) => Err(ProvisionError::Container {
            database: database.to_string(),
            container: container.to_string(),
            source,
        }),
    }
}
