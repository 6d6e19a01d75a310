use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    /// Balance exactly as the provider reported it; may be fractional.
    pub remain_coins: String,
    pub current_task_counts: i64,
}
