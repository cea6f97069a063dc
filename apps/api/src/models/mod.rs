pub mod candidate;
pub mod question;
pub mod question_set;

pub use candidate::Candidate;
pub use question::{Question, QuestionIdentity, QuestionKind};
pub use question_set::QuestionSet;
