//! Provisioning plan and per-pair outcomes

use std::fmt;

use crate::error::ConfigError;

/// Partition key path every provisioned container is created with
pub const PARTITION_KEY_PATH: &str = "/partitionKey";

/// Container created in each LodeRunner database
pub const LODE_RUNNER_CONTAINER: &str = "LodeRunner";

/// Ordered database -> container pairs to ensure exist.
///
/// Database names are unique; container names may repeat across databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningSpec {
    pairs: Vec<(String, String)>,
}

impl ProvisioningSpec {
    /// An empty spec
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// The LodeRunner databases: `LodeRunnerDB` and `LodeRunnerTestDB`,
    /// each holding a `LodeRunner` container.
    pub fn lode_runner() -> Self {
        Self {
            pairs: vec![
                ("LodeRunnerDB".to_string(), LODE_RUNNER_CONTAINER.to_string()),
                ("LodeRunnerTestDB".to_string(), LODE_RUNNER_CONTAINER.to_string()),
            ],
        }
    }

    /// Append a pair, rejecting a database name already present
    pub fn with_pair(
        mut self,
        database: impl Into<String>,
        container: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let database = database.into();
        if self.pairs.iter().any(|(db, _)| *db == database) {
            return Err(ConfigError::DuplicateDatabase(database));
        }
        self.pairs.push((database, container.into()));
        Ok(self)
    }

    /// Pairs in insertion order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(db, c)| (db.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// What happened to a single pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
}

/// Outcome for one database/container pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub database: String,
    pub container: String,
    pub outcome: ProvisionOutcome,
}

impl ProvisionResult {
    pub fn created(database: &str, container: &str) -> Self {
        Self {
            database: database.to_string(),
            container: container.to_string(),
            outcome: ProvisionOutcome::Created,
        }
    }

    pub fn already_exists(database: &str, container: &str) -> Self {
        Self {
            database: database.to_string(),
            container: container.to_string(),
            outcome: ProvisionOutcome::AlreadyExists,
        }
    }
}

impl fmt::Display for ProvisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            ProvisionOutcome::Created => write!(
                f,
                "Created DB: {}, Container: {}",
                self.database, self.container
            ),
            ProvisionOutcome::AlreadyExists => {
                write!(f, "{}/{} Already exists", self.database, self.container)
            }
        }
    }
}
