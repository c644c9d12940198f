use crate::agents::{QUESTION_COUNT, QuestionSet};

/// Combine the topic with the three question/answer pairs into the prompt
/// handed to the research pipeline.
///
/// Pairs stay in question order and answers are copied verbatim, empty ones
/// included.
pub fn enrich_query(topic: &str, questions: &QuestionSet, answers: &[String; QUESTION_COUNT]) -> String {
    let mut enriched = format!("Main Topic:\n{}\nClarifications:\n", topic);
    for (i, (question, answer)) in questions.iter().zip(answers.iter()).enumerate() {
        enriched.push_str(&format!("Q{n}: {question}\nA{n}: {answer}\n", n = i + 1));
    }
    enriched
}
