//! Object-storage replication settings
//!
//! Typed declarative model for a bucket's replication configuration and
//! the pure mapping between it and the wire representation. Writes are
//! full-replace: the API's only update mode is submitting the complete
//! configuration atomically.

use crate::client::NimbusClient;
use crate::error::{NimbusError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

impl NimbusClient {
    /// Replace the bucket's replication configuration wholesale. Create
    /// and update are the same operation; there is no partial update
    /// path.
    pub async fn put_bucket_replication(
        &self,
        bucket: &str,
        config: &ReplicationConfiguration,
    ) -> Result<()> {
        tracing::debug!("putting replication configuration for bucket {}", bucket);
        let body = build_replication_configuration(config);
        let result: Option<ApiReplicationConfiguration> = self
            .put_json(&format!("/storage/buckets/{bucket}/replication"), &body)
            .await?;

        // The API echoes the stored configuration; nothing back means the
        // bucket itself does not exist.
        match result {
            Some(_) => Ok(()),
            None => Err(NimbusError::not_found(format!("bucket {bucket}"))),
        }
    }

    /// Read the bucket's replication configuration. An absent
    /// configuration (or bucket) is benign empty state, not an error;
    /// any other failure propagates.
    pub async fn get_bucket_replication(
        &self,
        bucket: &str,
    ) -> Result<Option<ReplicationConfiguration>> {
        tracing::debug!("reading replication configuration for bucket {}", bucket);
        let result: Option<ApiReplicationConfiguration> = self
            .get_json(&format!("/storage/buckets/{bucket}/replication"))
            .await?;

        Ok(result.map(flatten_replication_configuration))
    }

    /// Delete the bucket's replication configuration. Deleting an
    /// already-absent configuration (including a missing bucket) is a
    /// successful no-op.
    pub async fn delete_bucket_replication(&self, bucket: &str) -> Result<()> {
        tracing::debug!("deleting replication configuration for bucket {}", bucket);
        let result: Option<serde_json::Value> = self
            .delete_json(&format!("/storage/buckets/{bucket}/replication"))
            .await?;

        if result.is_none() {
            tracing::debug!(
                "replication configuration for bucket {} already absent",
                bucket
            );
        }
        Ok(())
    }
}

// ============ Declarative Model ============

/// Replication configuration for a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationConfiguration {
    /// Role the storage service assumes to replicate objects
    pub role: String,

    /// Replication rules, applied as a complete set
    pub rules: Vec<ReplicationRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationRule {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default)]
    pub prefix: Option<String>,

    pub status: RuleStatus,

    #[serde(default)]
    pub filter: Option<ReplicationFilter>,

    pub destination: Destination,

    #[serde(default)]
    pub source_selection_criteria: Option<SourceSelectionCriteria>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Target bucket for replicated objects
    pub bucket: String,

    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub storage_class: Option<StorageClass>,

    #[serde(default)]
    pub replica_kms_key_id: Option<String>,

    #[serde(default)]
    pub access_control_translation: Option<AccessControlTranslation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageClass {
    Standard,
    InfrequentAccess,
    Archive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessControlTranslation {
    pub owner: OwnerOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerOverride {
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSelectionCriteria {
    #[serde(default)]
    pub sse_kms_encrypted_objects: Option<SseKmsEncryptedObjects>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseKmsEncryptedObjects {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplicationFilter {
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

// ============ API Types ============

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiReplicationConfiguration {
    role: String,
    rules: Vec<ApiReplicationRule>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiReplicationRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,

    status: RuleStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<ApiReplicationFilter>,

    destination: ApiDestination,

    #[serde(skip_serializing_if = "Option::is_none")]
    source_selection_criteria: Option<ApiSourceSelectionCriteria>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDestination {
    bucket: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    storage_class: Option<StorageClass>,

    #[serde(skip_serializing_if = "Option::is_none")]
    replica_kms_key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    access_control_translation: Option<ApiAccessControlTranslation>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAccessControlTranslation {
    owner: OwnerOverride,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSourceSelectionCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    sse_kms_encrypted_objects: Option<ApiSseKmsEncryptedObjects>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSseKmsEncryptedObjects {
    enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiReplicationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    tags: HashMap<String, String>,
}

// ============ Mapping ============

/// Build the wire configuration from the declarative model.
fn build_replication_configuration(
    config: &ReplicationConfiguration,
) -> ApiReplicationConfiguration {
    ApiReplicationConfiguration {
        role: config.role.clone(),
        rules: config
            .rules
            .iter()
            .map(|rule| ApiReplicationRule {
                id: rule.id.clone(),
                priority: rule.priority,
                prefix: rule.prefix.clone(),
                status: rule.status,
                filter: rule.filter.as_ref().map(|f| ApiReplicationFilter {
                    prefix: f.prefix.clone(),
                    tags: f.tags.clone(),
                }),
                destination: ApiDestination {
                    bucket: rule.destination.bucket.clone(),
                    account_id: rule.destination.account_id.clone(),
                    storage_class: rule.destination.storage_class,
                    replica_kms_key_id: rule.destination.replica_kms_key_id.clone(),
                    access_control_translation: rule
                        .destination
                        .access_control_translation
                        .as_ref()
                        .map(|t| ApiAccessControlTranslation { owner: t.owner }),
                },
                source_selection_criteria: rule.source_selection_criteria.as_ref().map(|c| {
                    ApiSourceSelectionCriteria {
                        sse_kms_encrypted_objects: c
                            .sse_kms_encrypted_objects
                            .map(|o| ApiSseKmsEncryptedObjects { enabled: o.enabled }),
                    }
                }),
            })
            .collect(),
    }
}

/// Flatten an API response back into the declarative model.
fn flatten_replication_configuration(
    api: ApiReplicationConfiguration,
) -> ReplicationConfiguration {
    ReplicationConfiguration {
        role: api.role,
        rules: api
            .rules
            .into_iter()
            .map(|rule| ReplicationRule {
                id: rule.id,
                priority: rule.priority,
                prefix: rule.prefix,
                status: rule.status,
                filter: rule.filter.map(|f| ReplicationFilter {
                    prefix: f.prefix,
                    tags: f.tags,
                }),
                destination: Destination {
                    bucket: rule.destination.bucket,
                    account_id: rule.destination.account_id,
                    storage_class: rule.destination.storage_class,
                    replica_kms_key_id: rule.destination.replica_kms_key_id,
                    access_control_translation: rule
                        .destination
                        .access_control_translation
                        .map(|t| AccessControlTranslation { owner: t.owner }),
                },
                source_selection_criteria: rule.source_selection_criteria.map(|c| {
                    SourceSelectionCriteria {
                        sse_kms_encrypted_objects: c
                            .sse_kms_encrypted_objects
                            .map(|o| SseKmsEncryptedObjects { enabled: o.enabled }),
                    }
                }),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NimbusConfig;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NimbusClient {
        NimbusClient::new(NimbusConfig::new("test-token", server.uri()))
    }

    fn sample_configuration() -> ReplicationConfiguration {
        ReplicationConfiguration {
            role: "nimbus:role/replication".to_string(),
            rules: vec![ReplicationRule {
                id: Some("archive-logs".to_string()),
                priority: Some(1),
                prefix: None,
                status: RuleStatus::Enabled,
                filter: Some(ReplicationFilter {
                    prefix: Some("logs/".to_string()),
                    tags: HashMap::from([("team".to_string(), "platform".to_string())]),
                }),
                destination: Destination {
                    bucket: "acme-logs-replica".to_string(),
                    account_id: Some("824516".to_string()),
                    storage_class: Some(StorageClass::InfrequentAccess),
                    replica_kms_key_id: None,
                    access_control_translation: Some(AccessControlTranslation {
                        owner: OwnerOverride::Destination,
                    }),
                },
                source_selection_criteria: Some(SourceSelectionCriteria {
                    sse_kms_encrypted_objects: Some(SseKmsEncryptedObjects { enabled: true }),
                }),
            }],
        }
    }

    #[test]
    fn test_build_then_flatten_preserves_configuration() {
        let config = sample_configuration();
        let flattened = flatten_replication_configuration(build_replication_configuration(&config));
        assert_eq!(flattened, config);
    }

    #[tokio::test]
    async fn test_put_submits_complete_configuration() {
        let server = MockServer::start().await;
        let wire = serde_json::json!({
            "role": "nimbus:role/replication",
            "rules": [{
                "id": "archive-logs",
                "priority": 1,
                "status": "Enabled",
                "filter": { "prefix": "logs/", "tags": { "team": "platform" } },
                "destination": {
                    "bucket": "acme-logs-replica",
                    "accountId": "824516",
                    "storageClass": "INFREQUENT_ACCESS",
                    "accessControlTranslation": { "owner": "Destination" },
                },
                "sourceSelectionCriteria": {
                    "sseKmsEncryptedObjects": { "enabled": true },
                },
            }],
        });

        Mock::given(method("PUT"))
            .and(path("/storage/buckets/acme-logs/replication"))
            .and(body_json(wire.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": wire,
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .put_bucket_replication("acme-logs", &sample_configuration())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_put_missing_bucket_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/storage/buckets/ghost/replication"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{ "code": 4004, "message": "no such bucket" }],
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .put_bucket_replication("ghost", &sample_configuration())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_flattens_wire_configuration() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/buckets/acme-logs/replication"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": {
                    "role": "nimbus:role/replication",
                    "rules": [{
                        "id": "archive-logs",
                        "priority": 1,
                        "status": "Enabled",
                        "filter": { "prefix": "logs/", "tags": { "team": "platform" } },
                        "destination": {
                            "bucket": "acme-logs-replica",
                            "accountId": "824516",
                            "storageClass": "INFREQUENT_ACCESS",
                            "accessControlTranslation": { "owner": "Destination" },
                        },
                        "sourceSelectionCriteria": {
                            "sseKmsEncryptedObjects": { "enabled": true },
                        },
                    }],
                },
            })))
            .mount(&server)
            .await;

        let config = client_for(&server)
            .get_bucket_replication("acme-logs")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(config, sample_configuration());
    }

    #[tokio::test]
    async fn test_get_absent_configuration_is_benign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/buckets/acme-logs/replication"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{ "code": 4004, "message": "no replication configuration" }],
            })))
            .mount(&server)
            .await;

        let config = client_for(&server)
            .get_bucket_replication("acme-logs")
            .await
            .unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn test_get_transport_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/buckets/acme-logs/replication"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{ "code": 5000, "message": "backend unavailable" }],
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_bucket_replication("acme-logs")
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_absent_configuration_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/buckets/acme-logs/replication"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{ "code": 4004, "message": "no such bucket" }],
            })))
            .mount(&server)
            .await;

        client_for(&server)
            .delete_bucket_replication("acme-logs")
            .await
            .unwrap();
    }
}
