use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named working set previously stored by the question-bank service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub question_id: i64,
    pub question_title: String,
    /// Stored verbatim; the bank does not validate the payload shape.
    pub questions: Value,
    pub exam_type: String,
}
