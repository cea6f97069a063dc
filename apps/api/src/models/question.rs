use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two question families the panel service can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    Interview,
}

impl QuestionKind {
    /// Label the question-bank service files saved sets under.
    pub fn exam_type(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "MCQ",
            QuestionKind::Interview => "Interview",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "MCQ"),
            QuestionKind::Interview => write!(f, "interview"),
        }
    }
}

/// Backend-assigned identifier of an interview question. The generation
/// service has emitted both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    /// Fields the backend sent that this console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: QuestionId,
    pub question: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(
        rename = "expectedAnswer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_answer: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A generated question. Serialized exactly in the backend's wire shape so
/// the same payload can be cached locally and submitted for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Question {
    MultipleChoice(McqQuestion),
    Interview(InterviewQuestion),
}

/// Dedup key inside a working set.
///
/// Interview questions carry a backend id; MCQ questions carry none, so
/// they are keyed by their exact text. Two distinct MCQ questions with
/// identical wording therefore collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionIdentity {
    Id(QuestionId),
    Text(String),
}

impl Question {
    /// Decodes one backend payload as a question of `kind`.
    pub fn from_value(kind: QuestionKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            QuestionKind::MultipleChoice => Question::MultipleChoice(serde_json::from_value(value)?),
            QuestionKind::Interview => Question::Interview(serde_json::from_value(value)?),
        })
    }

    /// Decodes a JSON array of questions of `kind`.
    pub fn parse_list(kind: QuestionKind, raw: &str) -> Result<Vec<Self>, serde_json::Error> {
        Ok(match kind {
            QuestionKind::MultipleChoice => serde_json::from_str::<Vec<McqQuestion>>(raw)?
                .into_iter()
                .map(Question::MultipleChoice)
                .collect(),
            QuestionKind::Interview => serde_json::from_str::<Vec<InterviewQuestion>>(raw)?
                .into_iter()
                .map(Question::Interview)
                .collect(),
        })
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice(_) => QuestionKind::MultipleChoice,
            Question::Interview(_) => QuestionKind::Interview,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.question,
            Question::Interview(q) => &q.question,
        }
    }

    pub fn identity(&self) -> QuestionIdentity {
        match self {
            Question::MultipleChoice(q) => QuestionIdentity::Text(q.question.clone()),
            Question::Interview(q) => QuestionIdentity::Id(q.id.clone()),
        }
    }

    /// Category badge shown next to an interview question.
    pub fn display_type(&self) -> Option<&str> {
        match self {
            Question::MultipleChoice(_) => None,
            Question::Interview(q) => Some(q.question_type.as_deref().unwrap_or("conceptual")),
        }
    }

    /// Answer text shown under an interview question.
    pub fn display_answer(&self) -> Option<&str> {
        match self {
            Question::MultipleChoice(_) => None,
            Question::Interview(q) => Some(
                q.answer
                    .as_deref()
                    .or(q.expected_answer.as_deref())
                    .unwrap_or("No answer provided"),
            ),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mcq_decodes_camel_case_wire_shape() {
        let q = Question::from_value(
            QuestionKind::MultipleChoice,
            json!({
                "question": "What is ownership?",
                "options": ["a", "b", "c", "d"],
                "correctAnswer": 2,
                "explanation": "Rust moves values"
            }),
        )
        .unwrap();
        assert_eq!(q.kind(), QuestionKind::MultipleChoice);
        assert_eq!(q.identity(), QuestionIdentity::Text("What is ownership?".into()));
        match q {
            Question::MultipleChoice(m) => assert_eq!(m.correct_answer, 2),
            _ => panic!("expected MCQ"),
        }
    }

    #[test]
    fn test_interview_accepts_string_and_numeric_ids() {
        let numeric = Question::from_value(
            QuestionKind::Interview,
            json!({"id": 7, "question": "Explain borrowing"}),
        )
        .unwrap();
        let text = Question::from_value(
            QuestionKind::Interview,
            json!({"id": "q-7", "question": "Explain borrowing"}),
        )
        .unwrap();
        assert_eq!(numeric.identity(), QuestionIdentity::Id(QuestionId::Number(7)));
        assert_eq!(text.identity(), QuestionIdentity::Id(QuestionId::Text("q-7".into())));
        assert_ne!(numeric.identity(), text.identity());
    }

    #[test]
    fn test_interview_without_id_is_rejected() {
        let result = Question::from_value(QuestionKind::Interview, json!({"question": "No id"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_survive_serialization() {
        let payload = json!({
            "id": 1,
            "question": "What is a trait?",
            "type": "technical",
            "difficulty": "medium"
        });
        let q = Question::from_value(QuestionKind::Interview, payload.clone()).unwrap();
        assert_eq!(serde_json::to_value(&q).unwrap(), payload);
    }

    #[test]
    fn test_display_defaults_for_interview_questions() {
        let q = Question::from_value(
            QuestionKind::Interview,
            json!({"id": 1, "question": "Q", "expectedAnswer": "E"}),
        )
        .unwrap();
        assert_eq!(q.display_type(), Some("conceptual"));
        assert_eq!(q.display_answer(), Some("E"));

        let bare = Question::from_value(QuestionKind::Interview, json!({"id": 2, "question": "Q"}))
            .unwrap();
        assert_eq!(bare.display_answer(), Some("No answer provided"));
        assert_eq!(fixtures::mcq("x").display_answer(), None);
    }

    #[test]
    fn test_identity_serializes_externally_tagged() {
        let id = QuestionIdentity::Id(QuestionId::Number(3));
        assert_eq!(serde_json::to_value(&id).unwrap(), json!({"id": 3}));
        let text: QuestionIdentity = serde_json::from_value(json!({"text": "Q"})).unwrap();
        assert_eq!(text, QuestionIdentity::Text("Q".into()));
    }
}
