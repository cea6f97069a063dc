use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A candidate assigned to the signed-in panel member. Every column is
/// nullable upstream, so every field is optional here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub interview_performance: Option<Value>,
    #[serde(default)]
    pub interview_feedback: Option<String>,
    #[serde(default)]
    pub interview_conversation: Option<Value>,
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub selected: Option<Value>,
    #[serde(default)]
    pub candidate_level: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}
