//! App platform operations
//!
//! Accessors and mutations for apps, branches, backend environments and
//! webhooks on the Nimbus app platform. Each accessor issues exactly one
//! request; the API's explicit not-found condition and a success
//! envelope with an empty payload both surface as the same
//! [`NimbusError::NotFound`] kind.

use crate::client::NimbusClient;
use crate::error::{NimbusError, Result};
use serde::{Deserialize, Serialize};

impl NimbusClient {
    // ========== Lookup Accessors ==========

    /// Fetch a single app by id.
    pub async fn get_app(&self, app_id: &str) -> Result<App> {
        let result = self.get_json(&format!("/apps/{app_id}")).await?;
        require_present(result, format!("app {app_id}"))
    }

    /// Fetch a backend environment by app id and environment name.
    pub async fn get_backend_environment(
        &self,
        app_id: &str,
        environment_name: &str,
    ) -> Result<BackendEnvironment> {
        let result = self
            .get_json(&format!("/apps/{app_id}/environments/{environment_name}"))
            .await?;
        require_present(
            result,
            format!("backend environment {app_id}/{environment_name}"),
        )
    }

    /// Fetch a branch by app id and branch name.
    pub async fn get_branch(&self, app_id: &str, branch_name: &str) -> Result<Branch> {
        let result = self
            .get_json(&format!("/apps/{app_id}/branches/{branch_name}"))
            .await?;
        require_present(result, format!("branch {app_id}/{branch_name}"))
    }

    /// Fetch a webhook by id.
    pub async fn get_webhook(&self, webhook_id: &str) -> Result<Webhook> {
        let result = self.get_json(&format!("/webhooks/{webhook_id}")).await?;
        require_present(result, format!("webhook {webhook_id}"))
    }

    // ========== Branch Operations ==========

    /// Create a branch under an app.
    pub async fn create_branch(&self, app_id: &str, request: &CreateBranchRequest) -> Result<Branch> {
        tracing::info!("creating branch {} for app {}", request.branch_name, app_id);
        let result = self
            .post_json(&format!("/apps/{app_id}/branches"), request)
            .await?;
        require_present(result, format!("branch {app_id}/{}", request.branch_name))
    }

    /// Update a branch.
    pub async fn update_branch(
        &self,
        app_id: &str,
        branch_name: &str,
        request: &UpdateBranchRequest,
    ) -> Result<Branch> {
        tracing::info!("updating branch {} for app {}", branch_name, app_id);
        let result = self
            .put_json(&format!("/apps/{app_id}/branches/{branch_name}"), request)
            .await?;
        require_present(result, format!("branch {app_id}/{branch_name}"))
    }

    /// Delete a branch. Deleting a branch that does not exist is an
    /// error, not a no-op.
    pub async fn delete_branch(&self, app_id: &str, branch_name: &str) -> Result<Branch> {
        tracing::info!("deleting branch {} for app {}", branch_name, app_id);
        let result = self
            .delete_json(&format!("/apps/{app_id}/branches/{branch_name}"))
            .await?;
        require_present(result, format!("branch {app_id}/{branch_name}"))
    }

    // ========== Backend Environment Operations ==========

    /// Create a backend environment under an app. Backend environments
    /// have no update operation; reconfiguration is delete-and-recreate.
    pub async fn create_backend_environment(
        &self,
        app_id: &str,
        request: &CreateBackendEnvironmentRequest,
    ) -> Result<BackendEnvironment> {
        tracing::info!(
            "creating backend environment {} for app {}",
            request.environment_name,
            app_id
        );
        let result = self
            .post_json(&format!("/apps/{app_id}/environments"), request)
            .await?;
        require_present(
            result,
            format!("backend environment {app_id}/{}", request.environment_name),
        )
    }

    /// Delete a backend environment.
    pub async fn delete_backend_environment(
        &self,
        app_id: &str,
        environment_name: &str,
    ) -> Result<BackendEnvironment> {
        tracing::info!(
            "deleting backend environment {} for app {}",
            environment_name,
            app_id
        );
        let result = self
            .delete_json(&format!("/apps/{app_id}/environments/{environment_name}"))
            .await?;
        require_present(
            result,
            format!("backend environment {app_id}/{environment_name}"),
        )
    }

    // ========== Webhook Operations ==========

    /// Create a webhook for a branch of an app.
    pub async fn create_webhook(
        &self,
        app_id: &str,
        request: &CreateWebhookRequest,
    ) -> Result<Webhook> {
        tracing::info!(
            "creating webhook for branch {} of app {}",
            request.branch_name,
            app_id
        );
        let result = self
            .post_json(&format!("/apps/{app_id}/webhooks"), request)
            .await?;
        require_present(result, format!("webhook for {app_id}/{}", request.branch_name))
    }

    /// Update a webhook.
    pub async fn update_webhook(
        &self,
        webhook_id: &str,
        request: &UpdateWebhookRequest,
    ) -> Result<Webhook> {
        tracing::info!("updating webhook {}", webhook_id);
        let result = self
            .put_json(&format!("/webhooks/{webhook_id}"), request)
            .await?;
        require_present(result, format!("webhook {webhook_id}"))
    }

    /// Delete a webhook.
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<Webhook> {
        tracing::info!("deleting webhook {}", webhook_id);
        let result = self.delete_json(&format!("/webhooks/{webhook_id}")).await?;
        require_present(result, format!("webhook {webhook_id}"))
    }
}

/// Collapse an absent payload into the uniform not-found error.
fn require_present<T>(result: Option<T>, resource: String) -> Result<T> {
    result.ok_or_else(|| NimbusError::not_found(resource))
}

// ============ API Types ============

/// App on the deployment platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub app_id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub default_domain: Option<String>,
}

/// Branch of an app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub stage: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub enable_auto_build: Option<bool>,
}

/// Backend environment of an app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendEnvironment {
    pub environment_name: String,

    #[serde(default)]
    pub stack_name: Option<String>,

    #[serde(default)]
    pub deployment_artifacts: Option<String>,
}

/// Webhook triggering builds for a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub webhook_id: String,

    pub webhook_url: String,

    pub branch_name: String,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchRequest {
    pub branch_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_build: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_build: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackendEnvironmentRequest {
    pub environment_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_artifacts: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    pub branch_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWebhookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
