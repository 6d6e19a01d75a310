pub mod client;
pub mod response;
pub mod staging;

use crate::{
    error::Result,
    image::ImagePayload,
    models::{AccountStatus, RemoteAssetReference, TaskCreated, TaskStatus, WorkflowConfig},
};
use async_trait::async_trait;

pub use client::RunningHubClient;
pub use response::{QUEUE_FULL_SENTINEL, TASK_RUNNING_SENTINEL};
pub use staging::StagedImage;

/// Calls the image-generation provider exposes. Every implementation must
/// check the provider's application-level code before trusting a payload.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    async fn upload_asset(&self, image: &ImagePayload) -> Result<RemoteAssetReference>;

    async fn create_task(
        &self,
        asset: &RemoteAssetReference,
        workflow: &WorkflowConfig,
    ) -> Result<TaskCreated>;

    async fn fetch_task_outputs(&self, task_id: &str) -> Result<TaskStatus>;

    async fn cancel_task(&self, task_id: &str) -> Result<()>;

    async fn check_account_status(&self) -> Result<AccountStatus>;
}
