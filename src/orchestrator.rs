use crate::{
    error::Result,
    image::ImagePayload,
    logger,
    models::{AccountStatus, TaskCreated, TaskStatus, WorkflowConfig},
    runninghub::ProviderApi,
};
use std::sync::Arc;

/// Sequences provider calls for a new job and forwards status and cancel
/// requests. Holds no per-request state.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn ProviderApi>,
    default_workflow: WorkflowConfig,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ProviderApi>, default_workflow: WorkflowConfig) -> Self {
        Self {
            provider,
            default_workflow,
        }
    }

    pub fn default_workflow(&self) -> &WorkflowConfig {
        &self.default_workflow
    }

    /// The default workflow, retargeted when the client named another one.
    pub fn workflow_for(&self, selector: Option<&str>) -> WorkflowConfig {
        match selector.map(str::trim).filter(|s| !s.is_empty()) {
            Some(workflow_id) => self.default_workflow.clone().with_workflow_id(workflow_id),
            None => self.default_workflow.clone(),
        }
    }

    /// Upload, then create the task. Creation is never attempted when the
    /// upload fails; errors propagate unchanged.
    pub async fn process_image(
        &self,
        image: &ImagePayload,
        workflow: &WorkflowConfig,
    ) -> Result<TaskCreated> {
        let _timer = logger::timer("process_image");

        let asset = self.provider.upload_asset(image).await?;
        self.provider.create_task(&asset, workflow).await
    }

    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.provider.fetch_task_outputs(task_id).await
    }

    pub async fn cancel_task(&self, task_id: &str) -> Result<()> {
        self.provider.cancel_task(task_id).await
    }

    pub async fn account_status(&self) -> Result<AccountStatus> {
        self.provider.check_account_status().await
    }
}
