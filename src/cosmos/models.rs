//! Cosmos REST request and response bodies

use serde::{Deserialize, Serialize};

/// Body of a create-database request
#[derive(Debug, Serialize)]
pub struct DatabaseDefinition<'a> {
    pub id: &'a str,
}

/// Body of a create-container request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition<'a> {
    pub id: &'a str,
    pub partition_key: PartitionKeyDefinition<'a>,
}

impl<'a> ContainerDefinition<'a> {
    /// Container hash-partitioned on a single path
    pub fn hash_partitioned(id: &'a str, path: &'a str) -> Self {
        Self {
            id,
            partition_key: PartitionKeyDefinition {
                paths: vec![path],
                kind: PartitionKind::Hash,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PartitionKeyDefinition<'a> {
    pub paths: Vec<&'a str>,
    pub kind: PartitionKind,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum PartitionKind {
    Hash,
}

/// Subset of the database account returned by `GET /`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseAccount {
    #[serde(default)]
    pub id: Option<String>,
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_container_definition_json() {
        let body = ContainerDefinition::hash_partitioned("LodeRunner", "/partitionKey");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "id": "LodeRunner",
                "partitionKey": { "paths": ["/partitionKey"], "kind": "Hash" }
            })
        );
    }

    #[test]
    fn test_error_body_tolerates_missing_fields() {
        let body: ErrorBody = serde_json::from_str(r#"{"code":"Conflict"}"#).unwrap();
        assert_eq!(body.code.as_deref(), Some("Conflict"));
        assert!(body.message.is_none());
    }
}
