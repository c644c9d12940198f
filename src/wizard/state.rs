use crate::agents::{QUESTION_COUNT, QuestionSet};
use crate::research::enrich_query;
use crate::types::{AppError, Result};
use crate::utils::markdown::render_report;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Notice attached to a report stopped by the user
pub const CANCELLED_NOTICE: &str = "Research cancelled.";

/// Which screen of the wizard is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    AwaitingAnswers,
    Reporting,
}

/// Lifecycle of the report once research has started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Streaming,
    Complete,
    Failed,
    Cancelled,
}

/// A labeled answer input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnswerField {
    /// The clarifying question shown as the field label
    pub label: String,
    pub value: String,
}

/// Everything the page needs to render a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WizardView {
    pub stage: Stage,
    pub topic: String,
    pub topic_form_visible: bool,
    pub followup_visible: bool,
    /// Always three entries, in question order
    pub questions: Vec<AnswerField>,
    /// Markdown report accumulated so far
    pub report: String,
    /// `report` rendered to HTML, raw HTML escaped
    pub report_html: String,
    /// Latest status line from the research run
    pub progress: Option<String>,
    pub report_status: Option<ReportStatus>,
    /// Shown below the report after a failure
    pub notice: Option<String>,
}

/// Per-session wizard state machine
///
/// Transitions take what they need as arguments and never touch the
/// current value when they fail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WizardState {
    #[default]
    Initial,
    AwaitingAnswers {
        topic: String,
        questions: QuestionSet,
    },
    Reporting {
        topic: String,
        questions: QuestionSet,
        answers: [String; QUESTION_COUNT],
        report: String,
        progress: Option<String>,
        status: ReportStatus,
        notice: Option<String>,
    },
}

impl WizardState {
    pub fn stage(&self) -> Stage {
        match self {
            WizardState::Initial => Stage::Initial,
            WizardState::AwaitingAnswers { .. } => Stage::AwaitingAnswers,
            WizardState::Reporting { .. } => Stage::Reporting,
        }
    }

    /// Check a topic may be submitted, before paying for generation
    pub fn ensure_can_submit(&self) -> Result<()> {
        match self {
            WizardState::Initial => Ok(()),
            other => Err(AppError::Conflict(format!(
                "cannot submit a topic while {:?}",
                other.stage()
            ))),
        }
    }

    /// `Initial -> AwaitingAnswers`
    pub fn submit(&self, topic: &str, questions: QuestionSet) -> Result<WizardState> {
        self.ensure_can_submit()?;
        Ok(WizardState::AwaitingAnswers {
            topic: topic.to_string(),
            questions,
        })
    }

    /// Topic to regenerate questions for
    pub fn regenerate_topic(&self) -> Result<&str> {
        match self {
            WizardState::AwaitingAnswers { topic, .. } => Ok(topic),
            other => Err(AppError::Conflict(format!(
                "cannot regenerate questions while {:?}",
                other.stage()
            ))),
        }
    }

    /// `AwaitingAnswers -> AwaitingAnswers` with the topic kept and the
    /// questions replaced
    pub fn regenerate(&self, questions: QuestionSet) -> Result<WizardState> {
        let topic = self.regenerate_topic()?;
        Ok(WizardState::AwaitingAnswers {
            topic: topic.to_string(),
            questions,
        })
    }

    /// `AwaitingAnswers -> Reporting`, returning the enriched query to research
    pub fn begin_report(&self, answers: [String; QUESTION_COUNT]) -> Result<(WizardState, String)> {
        match self {
            WizardState::AwaitingAnswers { topic, questions } => {
                let query = enrich_query(topic, questions, &answers);
                let next = WizardState::Reporting {
                    topic: topic.clone(),
                    questions: questions.clone(),
                    answers,
                    report: String::new(),
                    progress: None,
                    status: ReportStatus::Streaming,
                    notice: None,
                };
                Ok((next, query))
            }
            other => Err(AppError::Conflict(format!(
                "cannot continue while {:?}",
                other.stage()
            ))),
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            WizardState::Reporting {
                status: ReportStatus::Streaming,
                ..
            }
        )
    }

    /// Append a report fragment; ignored unless the report is streaming
    pub fn append_chunk(&mut self, chunk: &str) -> bool {
        match self {
            WizardState::Reporting {
                report,
                status: ReportStatus::Streaming,
                ..
            } => {
                report.push_str(chunk);
                true
            }
            _ => false,
        }
    }

    pub fn set_progress(&mut self, text: &str) {
        if let WizardState::Reporting {
            progress,
            status: ReportStatus::Streaming,
            ..
        } = self
        {
            *progress = Some(text.to_string());
        }
    }

    /// Close a streaming report; the partial report is kept
    pub fn finish(&mut self, outcome: ReportStatus, message: Option<String>) -> bool {
        match self {
            WizardState::Reporting { status, notice, .. } if *status == ReportStatus::Streaming => {
                *status = outcome;
                *notice = message;
                true
            }
            _ => false,
        }
    }

    /// Stop a streaming report
    pub fn cancel(&mut self) -> Result<()> {
        if self.finish(ReportStatus::Cancelled, Some(CANCELLED_NOTICE.to_string())) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "nothing to cancel while {:?}",
                self.stage()
            )))
        }
    }

    /// Any state -> `Initial`
    pub fn reset(&self) -> WizardState {
        WizardState::Initial
    }

    pub fn view(&self) -> WizardView {
        match self {
            WizardState::Initial => WizardView {
                stage: Stage::Initial,
                topic: String::new(),
                topic_form_visible: true,
                followup_visible: false,
                questions: fields(None, None),
                report: String::new(),
                report_html: String::new(),
                progress: None,
                report_status: None,
                notice: None,
            },
            WizardState::AwaitingAnswers { topic, questions } => WizardView {
                stage: Stage::AwaitingAnswers,
                topic: topic.clone(),
                topic_form_visible: false,
                followup_visible: true,
                questions: fields(Some(questions), None),
                report: String::new(),
                report_html: String::new(),
                progress: None,
                report_status: None,
                notice: None,
            },
            WizardState::Reporting {
                topic,
                questions,
                answers,
                report,
                progress,
                status,
                notice,
            } => WizardView {
                stage: Stage::Reporting,
                topic: topic.clone(),
                topic_form_visible: false,
                followup_visible: false,
                questions: fields(Some(questions), Some(answers)),
                report: report.clone(),
                report_html: render_report(report),
                progress: progress.clone(),
                report_status: Some(*status),
                notice: notice.clone(),
            },
        }
    }
}

fn fields(
    questions: Option<&QuestionSet>,
    answers: Option<&[String; QUESTION_COUNT]>,
) -> Vec<AnswerField> {
    (0..QUESTION_COUNT)
        .map(|i| AnswerField {
            label: questions
                .and_then(|q| q.get(i))
                .unwrap_or_default()
                .to_string(),
            value: answers.map(|a| a[i].clone()).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qs(prefix: &str) -> QuestionSet {
        QuestionSet::new([
            format!("{prefix} 1?"),
            format!("{prefix} 2?"),
            format!("{prefix} 3?"),
        ])
    }

    fn answers() -> [String; QUESTION_COUNT] {
        ["a1".to_string(), "a2".to_string(), "a3".to_string()]
    }

    #[test]
    fn test_initial_view() {
        let view = WizardState::Initial.view();
        assert_eq!(view.stage, Stage::Initial);
        assert!(view.topic_form_visible);
        assert!(!view.followup_visible);
        assert_eq!(view.questions.len(), 3);
        assert!(view.questions.iter().all(|f| f.label.is_empty() && f.value.is_empty()));
    }

    #[test]
    fn test_submit_labels_fields() {
        let state = WizardState::Initial.submit("housing", qs("Q")).unwrap();
        let view = state.view();
        assert_eq!(view.stage, Stage::AwaitingAnswers);
        assert_eq!(view.topic, "housing");
        assert!(!view.topic_form_visible);
        assert!(view.followup_visible);
        let labels: Vec<_> = view.questions.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Q 1?", "Q 2?", "Q 3?"]);
        assert!(view.questions.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_regenerate_keeps_topic() {
        let state = WizardState::Initial.submit("housing", qs("Old")).unwrap();
        let next = state.regenerate(qs("New")).unwrap();
        assert_eq!(
            next,
            WizardState::AwaitingAnswers {
                topic: "housing".to_string(),
                questions: qs("New"),
            }
        );
    }

    #[test]
    fn test_begin_report_builds_query() {
        let state = WizardState::Initial.submit("housing", qs("Q")).unwrap();
        let (next, query) = state.begin_report(answers()).unwrap();
        assert!(next.is_streaming());
        assert_eq!(query, enrich_query("housing", &qs("Q"), &answers()));

        let view = next.view();
        assert_eq!(view.report_status, Some(ReportStatus::Streaming));
        assert_eq!(view.questions[1].value, "a2");
    }

    #[test]
    fn test_invalid_transitions_conflict() {
        let initial = WizardState::Initial;
        assert!(matches!(initial.begin_report(answers()), Err(AppError::Conflict(_))));
        assert!(matches!(initial.regenerate(qs("Q")), Err(AppError::Conflict(_))));

        let awaiting = initial.submit("t", qs("Q")).unwrap();
        assert!(matches!(awaiting.submit("t", qs("Q")), Err(AppError::Conflict(_))));

        let mut awaiting_copy = awaiting.clone();
        assert!(matches!(awaiting_copy.cancel(), Err(AppError::Conflict(_))));
        assert_eq!(awaiting_copy, awaiting);
    }

    #[test]
    fn test_chunks_append_in_order_until_finished() {
        let (mut state, _) = WizardState::Initial
            .submit("t", qs("Q"))
            .unwrap()
            .begin_report(answers())
            .unwrap();

        assert!(state.append_chunk("# Title\n"));
        assert!(state.append_chunk("body"));
        assert!(state.finish(ReportStatus::Failed, Some("boom".to_string())));
        assert!(!state.append_chunk(" late"));

        let view = state.view();
        assert_eq!(view.report, "# Title\nbody");
        assert_eq!(view.report_status, Some(ReportStatus::Failed));
        assert_eq!(view.notice.as_deref(), Some("boom"));
    }

    #[test]
    fn test_cancel_keeps_partial_report() {
        let (mut state, _) = WizardState::Initial
            .submit("t", qs("Q"))
            .unwrap()
            .begin_report(answers())
            .unwrap();
        state.append_chunk("partial");
        state.cancel().unwrap();

        assert_eq!(state.view().report, "partial");
        assert_eq!(state.view().report_status, Some(ReportStatus::Cancelled));
        assert!(matches!(state.cancel(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_reset_from_any_state() {
        let awaiting = WizardState::Initial.submit("t", qs("Q")).unwrap();
        assert_eq!(awaiting.reset(), WizardState::Initial);
    }
}
