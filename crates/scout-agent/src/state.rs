use serde::{Deserialize, Serialize};

use scout_core::error::{Result, ScoutError};

use crate::graph::GraphState;

/// The record threaded through one research run.
///
/// Only `user_input` is set up front. Every other field has exactly one
/// writer in the workflow graph and stays `None` until that node finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub user_input: Option<String>,
    pub google_results: Option<String>,
    pub bing_results: Option<String>,
    pub yandex_results: Option<String>,
    pub reddit_results: Option<String>,
    pub selected_urls: Option<Vec<String>>,
    pub post_detail_data: Option<String>,
    pub google_analysis: Option<String>,
    pub bing_analysis: Option<String>,
    pub yandex_analysis: Option<String>,
    pub reddit_analysis: Option<String>,
    pub final_answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    UserInput,
    GoogleResults,
    BingResults,
    YandexResults,
    RedditResults,
    SelectedUrls,
    PostDetailData,
    GoogleAnalysis,
    BingAnalysis,
    YandexAnalysis,
    RedditAnalysis,
    FinalAnswer,
}

impl StateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserInput => "user_input",
            Self::GoogleResults => "google_results",
            Self::BingResults => "bing_results",
            Self::YandexResults => "yandex_results",
            Self::RedditResults => "reddit_results",
            Self::SelectedUrls => "selected_urls",
            Self::PostDetailData => "post_detail_data",
            Self::GoogleAnalysis => "google_analysis",
            Self::BingAnalysis => "bing_analysis",
            Self::YandexAnalysis => "yandex_analysis",
            Self::RedditAnalysis => "reddit_analysis",
            Self::FinalAnswer => "final_answer",
        }
    }
}

impl std::fmt::Display for StateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value written into one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Text(String),
    Urls(Vec<String>),
}

/// The writes a node hands back to the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate(pub Vec<(StateField, StateValue)>);

impl StateUpdate {
    pub fn text(field: StateField, value: impl Into<String>) -> Self {
        Self(vec![(field, StateValue::Text(value.into()))])
    }

    pub fn urls(urls: Vec<String>) -> Self {
        Self(vec![(StateField::SelectedUrls, StateValue::Urls(urls))])
    }

    pub fn fields(&self) -> Vec<StateField> {
        self.0.iter().map(|(f, _)| *f).collect()
    }
}

impl WorkflowState {
    /// Fresh state for a query.
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: Some(user_input.into()),
            ..Self::default()
        }
    }

    /// A text field, with "unset" read as empty.
    pub fn text(&self, field: StateField) -> &str {
        let value = match field {
            StateField::UserInput => &self.user_input,
            StateField::GoogleResults => &self.google_results,
            StateField::BingResults => &self.bing_results,
            StateField::YandexResults => &self.yandex_results,
            StateField::RedditResults => &self.reddit_results,
            StateField::PostDetailData => &self.post_detail_data,
            StateField::GoogleAnalysis => &self.google_analysis,
            StateField::BingAnalysis => &self.bing_analysis,
            StateField::YandexAnalysis => &self.yandex_analysis,
            StateField::RedditAnalysis => &self.reddit_analysis,
            StateField::FinalAnswer => &self.final_answer,
            StateField::SelectedUrls => return "",
        };
        value.as_deref().unwrap_or_default()
    }

    /// Selected URLs, with "unset" read as empty.
    pub fn urls(&self) -> &[String] {
        self.selected_urls.as_deref().unwrap_or_default()
    }

    fn text_slot(&mut self, field: StateField) -> Option<&mut Option<String>> {
        Some(match field {
            StateField::UserInput => &mut self.user_input,
            StateField::GoogleResults => &mut self.google_results,
            StateField::BingResults => &mut self.bing_results,
            StateField::YandexResults => &mut self.yandex_results,
            StateField::RedditResults => &mut self.reddit_results,
            StateField::PostDetailData => &mut self.post_detail_data,
            StateField::GoogleAnalysis => &mut self.google_analysis,
            StateField::BingAnalysis => &mut self.bing_analysis,
            StateField::YandexAnalysis => &mut self.yandex_analysis,
            StateField::RedditAnalysis => &mut self.reddit_analysis,
            StateField::FinalAnswer => &mut self.final_answer,
            StateField::SelectedUrls => return None,
        })
    }
}

impl GraphState for WorkflowState {
    type Field = StateField;
    type Update = StateUpdate;

    fn input_fields() -> Vec<StateField> {
        vec![StateField::UserInput]
    }

    fn update_fields(update: &StateUpdate) -> Vec<StateField> {
        update.fields()
    }

    fn apply(&mut self, update: StateUpdate) -> Result<()> {
        for (field, value) in update.0 {
            match (field, value) {
                (StateField::SelectedUrls, StateValue::Urls(urls)) => {
                    self.selected_urls = Some(urls);
                }
                (StateField::SelectedUrls, StateValue::Text(_)) => {
                    return Err(ScoutError::StateMismatch {
                        field: field.to_string(),
                        message: "expected a URL list, got text".into(),
                    });
                }
                (field, StateValue::Text(text)) => {
                    if let Some(slot) = self.text_slot(field) {
                        *slot = Some(text);
                    }
                }
                (field, StateValue::Urls(_)) => {
                    return Err(ScoutError::StateMismatch {
                        field: field.to_string(),
                        message: "expected text, got a URL list".into(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_only_input() {
        let state = WorkflowState::new("what is rust?");
        assert_eq!(state.user_input.as_deref(), Some("what is rust?"));
        assert!(state.google_results.is_none());
        assert!(state.selected_urls.is_none());
        assert!(state.final_answer.is_none());
    }

    #[test]
    fn test_unset_reads_as_empty() {
        let state = WorkflowState::default();
        assert_eq!(state.text(StateField::RedditResults), "");
        assert!(state.urls().is_empty());
    }

    #[test]
    fn test_apply_merges_without_touching_other_fields() {
        let mut state = WorkflowState::new("q");
        state
            .apply(StateUpdate::text(StateField::GoogleResults, "g"))
            .unwrap();
        state
            .apply(StateUpdate::urls(vec!["u1".into()]))
            .unwrap();

        assert_eq!(state.text(StateField::GoogleResults), "g");
        assert_eq!(state.urls(), ["u1".to_string()]);
        assert_eq!(state.text(StateField::UserInput), "q");
        assert!(state.bing_results.is_none());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut state = WorkflowState::default();
        let err = state
            .apply(StateUpdate(vec![(
                StateField::FinalAnswer,
                StateValue::Urls(vec![]),
            )]))
            .unwrap_err();
        assert!(matches!(err, ScoutError::StateMismatch { ref field, .. } if field == "final_answer"));

        assert!(state
            .apply(StateUpdate::text(StateField::SelectedUrls, "u1"))
            .is_err());
    }

    #[test]
    fn test_field_names_match_serialization() {
        let json = serde_json::to_value(WorkflowState::new("q")).unwrap();
        for field in [
            StateField::UserInput,
            StateField::PostDetailData,
            StateField::SelectedUrls,
            StateField::FinalAnswer,
        ] {
            assert!(json.get(field.as_str()).is_some(), "missing {}", field);
        }
    }
}
