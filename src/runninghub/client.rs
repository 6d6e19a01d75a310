use crate::{
    config::ProviderConfig,
    error::{RelayError, Result},
    image::{ImageFormat, ImagePayload},
    models::{AccountStatus, ProviderReply, RemoteAssetReference, TaskCreated, TaskStatus, WorkflowConfig},
    runninghub::{response, staging::StagedImage, ProviderApi},
};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde_json::{json, Value};
use std::path::PathBuf;

const UPLOAD_PATH: &str = "/task/openapi/upload";
const CREATE_PATH: &str = "/task/openapi/create";
const OUTPUTS_PATH: &str = "/task/openapi/outputs";
const CANCEL_PATH: &str = "/task/openapi/cancel";
const ACCOUNT_PATH: &str = "/uc/openapi/accountStatus";

/// HTTP client for the RunningHub open API. Holds configuration only and is
/// shared freely between requests.
#[derive(Clone)]
pub struct RunningHubClient {
    client: Client,
    base_url: String,
    api_key: String,
    staging_dir: PathBuf,
}

impl RunningHubClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            staging_dir: config.staging_dir.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<ProviderReply> {
        let response = self
            .client
            .post(self.url(path))
            .json(payload)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("RunningHub request failed: {}", e)))?;

        Self::into_reply(path, response).await
    }

    async fn into_reply(path: &str, response: reqwest::Response) -> Result<ProviderReply> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            RelayError::Transport(format!("Failed to read RunningHub response: {}", e))
        })?;

        log::debug!("RunningHub {} responded {}: {}", path, status, body);
        Ok(ProviderReply::new(status, body))
    }
}

#[async_trait]
impl ProviderApi for RunningHubClient {
    async fn upload_asset(&self, image: &ImagePayload) -> Result<RemoteAssetReference> {
        let format = image.format().unwrap_or(ImageFormat::Jpeg);
        let staged = StagedImage::create(&self.staging_dir, image.bytes(), format.extension()).await?;

        let bytes = staged.read().await?;
        let part = Part::bytes(bytes)
            .file_name(staged.file_name())
            .mime_str(format.mime_type())
            .map_err(|e| RelayError::Upload(format!("Image upload failed: {}", e)))?;
        let form = Form::new()
            .text("apiKey", self.api_key.clone())
            .part("file", part)
            .text("fileType", "image");

        log::info!("Uploading {} byte image to RunningHub", image.len());

        let sent = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await;

        // `staged` is dropped on every return below, removing the file.
        let response = sent
            .map_err(|e| RelayError::Transport(format!("Image upload failed: {}", e)))?;
        let reply = Self::into_reply(UPLOAD_PATH, response).await?;

        let asset = response::interpret_upload(&reply).map_err(|e| {
            log::warn!("Upload rejected: {}", e);
            e
        })?;
        if let Err(e) = staged.remove() {
            log::warn!("{}", e);
        }

        Ok(asset)
    }

    async fn create_task(
        &self,
        asset: &RemoteAssetReference,
        workflow: &WorkflowConfig,
    ) -> Result<TaskCreated> {
        let payload = json!({
            "workflowId": workflow.workflow_id,
            "apiKey": self.api_key,
            "nodeInfoList": workflow.node_info_list(asset),
        });

        log::info!(
            "Creating task for workflow {} with asset {}",
            workflow.workflow_id,
            asset.file_name
        );

        let reply = self.post_json(CREATE_PATH, &payload).await?;
        let task = response::interpret_create(&reply).map_err(|e| {
            log::warn!("Task creation failed: {}", e);
            e
        })?;

        log::info!("Task {} created", task.task_id);
        Ok(task)
    }

    async fn fetch_task_outputs(&self, task_id: &str) -> Result<TaskStatus> {
        let payload = json!({
            "taskId": task_id,
            "apiKey": self.api_key,
        });

        let reply = self.post_json(OUTPUTS_PATH, &payload).await?;
        response::interpret_outputs(&reply)
    }

    async fn cancel_task(&self, task_id: &str) -> Result<()> {
        let payload = json!({
            "taskId": task_id,
            "apiKey": self.api_key,
        });

        log::info!("Cancelling task {}", task_id);
        let reply = self.post_json(CANCEL_PATH, &payload).await?;
        response::interpret_cancel(&reply)
    }

    async fn check_account_status(&self) -> Result<AccountStatus> {
        // This endpoint spells the key in lower case.
        let payload = json!({ "apikey": self.api_key });

        let reply = self.post_json(ACCOUNT_PATH, &payload).await?;
        response::interpret_account(&reply)
    }
}
