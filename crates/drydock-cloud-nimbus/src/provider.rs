//! Managed resource lifecycles
//!
//! [`ManagedResource`] implementations the declarative engine drives.
//! Each resource holds the injected client handle; composite ids are
//! encoded once at creation and decoded back on every later operation.

use crate::apps::{
    CreateBackendEnvironmentRequest, CreateBranchRequest, CreateWebhookRequest,
    UpdateBranchRequest, UpdateWebhookRequest,
};
use crate::client::NimbusClient;
use crate::error::NimbusError;
use crate::replication::ReplicationConfiguration;
use async_trait::async_trait;
use drydock_cloud::{CloudError, CompositeIdCodec, ManagedResource, ResourceConfig, ResourceRecord};
use serde::Deserialize;
use std::sync::Arc;

const BRANCH_ID: CompositeIdCodec = CompositeIdCodec::new("APP-ID", "BRANCH-NAME");
const BACKEND_ENVIRONMENT_ID: CompositeIdCodec =
    CompositeIdCodec::new("APP-ID", "ENVIRONMENT-NAME");

/// Map a provider error at the lifecycle seam, preserving the not-found
/// kind and attaching operation context to everything else.
fn map_api_err(
    operation: &'static str,
    resource: impl Into<String>,
) -> impl FnOnce(NimbusError) -> CloudError {
    let resource = resource.into();
    move |e| match e {
        NimbusError::NotFound { resource: absent } => CloudError::ResourceNotFound {
            operation,
            resource: absent,
        },
        other => CloudError::Api {
            operation,
            resource,
            message: other.to_string(),
        },
    }
}

// ========== Branches ==========

#[derive(Debug, Deserialize)]
struct BranchSpec {
    app_id: String,
    branch_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    enable_auto_build: Option<bool>,
}

/// Branches of an app, keyed by the composite `app_id/branch_name` id
pub struct BranchResource {
    client: Arc<NimbusClient>,
}

impl BranchResource {
    pub fn new(client: Arc<NimbusClient>) -> Self {
        Self { client }
    }

    fn record(id: &str, app_id: &str, branch: &crate::apps::Branch) -> ResourceRecord {
        ResourceRecord::new(id, "branch")
            .with_attribute("app_id", serde_json::json!(app_id))
            .with_attribute("branch_name", serde_json::json!(branch.branch_name))
            .with_attribute("description", serde_json::json!(branch.description))
            .with_attribute("stage", serde_json::json!(branch.stage))
            .with_attribute("display_name", serde_json::json!(branch.display_name))
            .with_attribute(
                "enable_auto_build",
                serde_json::json!(branch.enable_auto_build),
            )
    }
}

#[async_trait]
impl ManagedResource for BranchResource {
    fn kind(&self) -> &str {
        "branch"
    }

    async fn create(&self, config: &ResourceConfig) -> drydock_cloud::Result<ResourceRecord> {
        let spec: BranchSpec = config.parse()?;
        let id = BRANCH_ID.encode(&spec.app_id, &spec.branch_name);
        let request = CreateBranchRequest {
            branch_name: spec.branch_name.clone(),
            description: spec.description.clone(),
            stage: spec.stage.clone(),
            enable_auto_build: spec.enable_auto_build,
        };

        let branch = self
            .client
            .create_branch(&spec.app_id, &request)
            .await
            .map_err(map_api_err("create", format!("branch {id}")))?;

        Ok(Self::record(&id, &spec.app_id, &branch))
    }

    async fn read(&self, record: &ResourceRecord) -> drydock_cloud::Result<Option<ResourceRecord>> {
        let (app_id, branch_name) = BRANCH_ID.decode(&record.id)?;

        match self.client.get_branch(app_id, branch_name).await {
            Ok(branch) => Ok(Some(Self::record(&record.id, app_id, &branch))),
            Err(e) if e.is_not_found() => {
                tracing::debug!("branch {} no longer exists, dropping from state", record.id);
                Ok(None)
            }
            Err(e) => Err(map_api_err("read", format!("branch {}", record.id))(e)),
        }
    }

    async fn update(
        &self,
        record: &ResourceRecord,
        config: &ResourceConfig,
    ) -> drydock_cloud::Result<ResourceRecord> {
        let spec: BranchSpec = config.parse()?;
        let (app_id, branch_name) = BRANCH_ID.decode(&record.id)?;
        let request = UpdateBranchRequest {
            description: spec.description.clone(),
            stage: spec.stage.clone(),
            enable_auto_build: spec.enable_auto_build,
        };

        let branch = self
            .client
            .update_branch(app_id, branch_name, &request)
            .await
            .map_err(map_api_err("update", format!("branch {}", record.id)))?;

        Ok(Self::record(&record.id, app_id, &branch))
    }

    async fn delete(&self, record: &ResourceRecord) -> drydock_cloud::Result<()> {
        let (app_id, branch_name) = BRANCH_ID.decode(&record.id)?;
        self.client
            .delete_branch(app_id, branch_name)
            .await
            .map_err(map_api_err("delete", format!("branch {}", record.id)))?;
        Ok(())
    }

    async fn import(&self, id: &str) -> drydock_cloud::Result<ResourceRecord> {
        let (app_id, branch_name) = BRANCH_ID.decode(id)?;
        let branch = self
            .client
            .get_branch(app_id, branch_name)
            .await
            .map_err(map_api_err("import", format!("branch {id}")))?;

        Ok(Self::record(id, app_id, &branch))
    }
}

// ========== Backend Environments ==========

#[derive(Debug, Deserialize)]
struct BackendEnvironmentSpec {
    app_id: String,
    environment_name: String,
    #[serde(default)]
    stack_name: Option<String>,
    #[serde(default)]
    deployment_artifacts: Option<String>,
}

/// Backend environments of an app, keyed by the composite
/// `app_id/environment_name` id. The platform offers no update
/// operation for these; configuration changes are delete-and-recreate,
/// which the engine expresses as a replacement.
pub struct BackendEnvironmentResource {
    client: Arc<NimbusClient>,
}

impl BackendEnvironmentResource {
    pub fn new(client: Arc<NimbusClient>) -> Self {
        Self { client }
    }

    fn record(
        id: &str,
        app_id: &str,
        environment: &crate::apps::BackendEnvironment,
    ) -> ResourceRecord {
        ResourceRecord::new(id, "backend-environment")
            .with_attribute("app_id", serde_json::json!(app_id))
            .with_attribute(
                "environment_name",
                serde_json::json!(environment.environment_name),
            )
            .with_attribute("stack_name", serde_json::json!(environment.stack_name))
            .with_attribute(
                "deployment_artifacts",
                serde_json::json!(environment.deployment_artifacts),
            )
    }
}

#[async_trait]
impl ManagedResource for BackendEnvironmentResource {
    fn kind(&self) -> &str {
        "backend-environment"
    }

    async fn create(&self, config: &ResourceConfig) -> drydock_cloud::Result<ResourceRecord> {
        let spec: BackendEnvironmentSpec = config.parse()?;
        let id = BACKEND_ENVIRONMENT_ID.encode(&spec.app_id, &spec.environment_name);
        let request = CreateBackendEnvironmentRequest {
            environment_name: spec.environment_name.clone(),
            stack_name: spec.stack_name.clone(),
            deployment_artifacts: spec.deployment_artifacts.clone(),
        };

        let environment = self
            .client
            .create_backend_environment(&spec.app_id, &request)
            .await
            .map_err(map_api_err("create", format!("backend environment {id}")))?;

        Ok(Self::record(&id, &spec.app_id, &environment))
    }

    async fn read(&self, record: &ResourceRecord) -> drydock_cloud::Result<Option<ResourceRecord>> {
        let (app_id, environment_name) = BACKEND_ENVIRONMENT_ID.decode(&record.id)?;

        match self
            .client
            .get_backend_environment(app_id, environment_name)
            .await
        {
            Ok(environment) => Ok(Some(Self::record(&record.id, app_id, &environment))),
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    "backend environment {} no longer exists, dropping from state",
                    record.id
                );
                Ok(None)
            }
            Err(e) => Err(map_api_err("read", format!("backend environment {}", record.id))(e)),
        }
    }

    async fn update(
        &self,
        record: &ResourceRecord,
        _config: &ResourceConfig,
    ) -> drydock_cloud::Result<ResourceRecord> {
        Err(CloudError::InvalidConfig(format!(
            "backend environment {} cannot be updated in place; replace it instead",
            record.id
        )))
    }

    async fn delete(&self, record: &ResourceRecord) -> drydock_cloud::Result<()> {
        let (app_id, environment_name) = BACKEND_ENVIRONMENT_ID.decode(&record.id)?;
        self.client
            .delete_backend_environment(app_id, environment_name)
            .await
            .map_err(map_api_err("delete", format!("backend environment {}", record.id)))?;
        Ok(())
    }

    async fn import(&self, id: &str) -> drydock_cloud::Result<ResourceRecord> {
        let (app_id, environment_name) = BACKEND_ENVIRONMENT_ID.decode(id)?;
        let environment = self
            .client
            .get_backend_environment(app_id, environment_name)
            .await
            .map_err(map_api_err("import", format!("backend environment {id}")))?;

        Ok(Self::record(id, app_id, &environment))
    }
}

// ========== Webhooks ==========

#[derive(Debug, Deserialize)]
struct WebhookSpec {
    app_id: String,
    branch_name: String,
    #[serde(default)]
    description: Option<String>,
}

/// Build webhooks, keyed by their provider-native id
pub struct WebhookResource {
    client: Arc<NimbusClient>,
}

impl WebhookResource {
    pub fn new(client: Arc<NimbusClient>) -> Self {
        Self { client }
    }

    fn record(webhook: &crate::apps::Webhook) -> ResourceRecord {
        ResourceRecord::new(&webhook.webhook_id, "webhook")
            .with_attribute("webhook_url", serde_json::json!(webhook.webhook_url))
            .with_attribute("branch_name", serde_json::json!(webhook.branch_name))
            .with_attribute("description", serde_json::json!(webhook.description))
    }
}

#[async_trait]
impl ManagedResource for WebhookResource {
    fn kind(&self) -> &str {
        "webhook"
    }

    async fn create(&self, config: &ResourceConfig) -> drydock_cloud::Result<ResourceRecord> {
        let spec: WebhookSpec = config.parse()?;
        let request = CreateWebhookRequest {
            branch_name: spec.branch_name.clone(),
            description: spec.description.clone(),
        };

        let webhook = self
            .client
            .create_webhook(&spec.app_id, &request)
            .await
            .map_err(map_api_err(
                "create",
                format!("webhook for {}/{}", spec.app_id, spec.branch_name),
            ))?;

        Ok(Self::record(&webhook))
    }

    async fn read(&self, record: &ResourceRecord) -> drydock_cloud::Result<Option<ResourceRecord>> {
        match self.client.get_webhook(&record.id).await {
            Ok(webhook) => Ok(Some(Self::record(&webhook))),
            Err(e) if e.is_not_found() => {
                tracing::debug!("webhook {} no longer exists, dropping from state", record.id);
                Ok(None)
            }
            Err(e) => Err(map_api_err("read", format!("webhook {}", record.id))(e)),
        }
    }

    async fn update(
        &self,
        record: &ResourceRecord,
        config: &ResourceConfig,
    ) -> drydock_cloud::Result<ResourceRecord> {
        let spec: WebhookSpec = config.parse()?;
        let request = UpdateWebhookRequest {
            branch_name: Some(spec.branch_name.clone()),
            description: spec.description.clone(),
        };

        let webhook = self
            .client
            .update_webhook(&record.id, &request)
            .await
            .map_err(map_api_err("update", format!("webhook {}", record.id)))?;

        Ok(Self::record(&webhook))
    }

    async fn delete(&self, record: &ResourceRecord) -> drydock_cloud::Result<()> {
        self.client
            .delete_webhook(&record.id)
            .await
            .map_err(map_api_err("delete", format!("webhook {}", record.id)))?;
        Ok(())
    }

    async fn import(&self, id: &str) -> drydock_cloud::Result<ResourceRecord> {
        let webhook = self
            .client
            .get_webhook(id)
            .await
            .map_err(map_api_err("import", format!("webhook {id}")))?;

        Ok(Self::record(&webhook))
    }
}

// ========== Bucket Replication ==========

#[derive(Debug, Deserialize)]
struct BucketReplicationSpec {
    bucket: String,
    replication_configuration: ReplicationConfiguration,
}

/// Replication settings of a storage bucket, keyed by the bucket name.
///
/// The configuration is declarative-replacement only: create and update
/// both submit the complete configuration, mirroring the API's own
/// replace-only contract.
pub struct BucketReplicationResource {
    client: Arc<NimbusClient>,
}

impl BucketReplicationResource {
    pub fn new(client: Arc<NimbusClient>) -> Self {
        Self { client }
    }

    fn record(bucket: &str, config: Option<&ReplicationConfiguration>) -> drydock_cloud::Result<ResourceRecord> {
        let mut record = ResourceRecord::new(bucket, "bucket-replication")
            .with_attribute("bucket", serde_json::json!(bucket));
        if let Some(config) = config {
            record = record
                .with_attribute("replication_configuration", serde_json::to_value(config)?);
        }
        Ok(record)
    }

    async fn put(&self, config: &ResourceConfig) -> drydock_cloud::Result<ResourceRecord> {
        let spec: BucketReplicationSpec = config.parse()?;
        self.client
            .put_bucket_replication(&spec.bucket, &spec.replication_configuration)
            .await
            .map_err(map_api_err("put", format!("bucket replication {}", spec.bucket)))?;

        // Refresh from the API rather than trusting the submitted tree.
        let stored = self
            .client
            .get_bucket_replication(&spec.bucket)
            .await
            .map_err(map_api_err("read", format!("bucket replication {}", spec.bucket)))?;

        Self::record(&spec.bucket, stored.as_ref())
    }
}

#[async_trait]
impl ManagedResource for BucketReplicationResource {
    fn kind(&self) -> &str {
        "bucket-replication"
    }

    async fn create(&self, config: &ResourceConfig) -> drydock_cloud::Result<ResourceRecord> {
        self.put(config).await
    }

    /// An absent remote configuration is benign empty state: the record
    /// survives with the configuration attribute unset. Only transport
    /// failures propagate.
    async fn read(&self, record: &ResourceRecord) -> drydock_cloud::Result<Option<ResourceRecord>> {
        let stored = self
            .client
            .get_bucket_replication(&record.id)
            .await
            .map_err(map_api_err("read", format!("bucket replication {}", record.id)))?;

        Ok(Some(Self::record(&record.id, stored.as_ref())?))
    }

    async fn update(
        &self,
        _record: &ResourceRecord,
        config: &ResourceConfig,
    ) -> drydock_cloud::Result<ResourceRecord> {
        self.put(config).await
    }

    async fn delete(&self, record: &ResourceRecord) -> drydock_cloud::Result<()> {
        self.client
            .delete_bucket_replication(&record.id)
            .await
            .map_err(map_api_err("delete", format!("bucket replication {}", record.id)))?;
        Ok(())
    }

    async fn import(&self, id: &str) -> drydock_cloud::Result<ResourceRecord> {
        let stored = self
            .client
            .get_bucket_replication(id)
            .await
            .map_err(map_api_err("import", format!("bucket replication {id}")))?;

        Self::record(id, stored.as_ref())
    }
}
