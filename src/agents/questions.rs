use crate::types::AppError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of clarifying questions asked per topic
pub const QUESTION_COUNT: usize = 3;

/// One clarifying question as produced by the generator agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Question {
    /// A meaningful question based on the search query that the user gave, whose answer will help the research
    pub question: String,
}

/// Output shape of the generator agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Questions {
    /// A list of meaningful questions based on the search query that the user gave
    pub questions: Vec<Question>,
}

/// Exactly three questions, in the order they are shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet([String; QUESTION_COUNT]);

impl QuestionSet {
    pub fn new(questions: [String; QUESTION_COUNT]) -> Self {
        Self(questions)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl TryFrom<Questions> for QuestionSet {
    type Error = AppError;

    /// Rejects any other count outright; nothing is padded or truncated.
    fn try_from(value: Questions) -> Result<Self, Self::Error> {
        let count = value.questions.len();
        let texts: Vec<String> = value.questions.into_iter().map(|q| q.question).collect();

        let array: [String; QUESTION_COUNT] = texts.try_into().map_err(|_| {
            AppError::InvalidOutput(format!(
                "expected {} clarifying questions, got {}",
                QUESTION_COUNT, count
            ))
        })?;

        Ok(Self(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn questions(n: usize) -> Questions {
        Questions {
            questions: (1..=n)
                .map(|i| Question {
                    question: format!("Question {}?", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_exactly_three_accepted() {
        let set = QuestionSet::try_from(questions(3)).unwrap();
        assert_eq!(set.get(0), Some("Question 1?"));
        assert_eq!(set.get(2), Some("Question 3?"));
        assert_eq!(set.get(3), None);
        assert_eq!(set.iter().count(), 3);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn test_other_counts_rejected(#[case] n: usize) {
        match QuestionSet::try_from(questions(n)) {
            Err(AppError::InvalidOutput(msg)) => {
                assert!(msg.contains(&format!("got {}", n)), "{}", msg);
            }
            other => panic!("expected InvalidOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_questions_deserialize_from_model_json() {
        let json = r#"{"questions":[{"question":"a"},{"question":"b"},{"question":"c"}]}"#;
        let parsed: Questions = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, questions_from(&["a", "b", "c"]));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"questions":[],"extra":1}"#;
        assert!(serde_json::from_str::<Questions>(json).is_err());
    }

    fn questions_from(texts: &[&str]) -> Questions {
        Questions {
            questions: texts
                .iter()
                .map(|t| Question {
                    question: t.to_string(),
                })
                .collect(),
        }
    }
}
