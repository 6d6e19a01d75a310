use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{DEFAULT_FIELD_NAME, DEFAULT_NODE_ID};

/// The provider's handle for an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAssetReference {
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// Which workflow to run and which input slot receives the uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub workflow_id: String,
    pub node_id: String,
    pub field_name: String,
}

impl WorkflowConfig {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        WorkflowConfig {
            workflow_id: workflow_id.into(),
            node_id: DEFAULT_NODE_ID.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
        }
    }

    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = workflow_id.into();
        self
    }

    pub fn with_input_slot(mut self, node_id: impl Into<String>, field_name: impl Into<String>) -> Self {
        self.node_id = node_id.into();
        self.field_name = field_name.into();
        self
    }

    /// The `nodeInfoList` entries binding `asset` into the workflow's input node.
    pub fn node_info_list(&self, asset: &RemoteAssetReference) -> Value {
        json!([{
            "nodeId": self.node_id,
            "fieldName": self.field_name,
            "fieldValue": asset.file_name,
        }])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreated {
    pub task_id: String,
    pub client_id: Option<String>,
    pub task_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Success {
        #[serde(rename = "fileUrl")]
        file_url: String,
        #[serde(rename = "fileType")]
        file_type: Option<String>,
    },
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskStatus::Success { .. })
    }
}
