//! The agent workflow: classify the latest user message, then route it to
//! the matching handler.

use std::sync::Arc;

use adsight_data::Dataset;
use adsight_gemini::GeminiClient;

use crate::compose;
use crate::intent::{classify_intent, Intent};
use crate::response::{AgentResponse, ChatMessage};

/// Shared state the workflow runs against. The dataset is immutable after
/// startup; the model client is absent when no API key is configured.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub dataset: Arc<Dataset>,
    pub gemini: Option<GeminiClient>,
}

impl AgentContext {
    #[must_use]
    pub fn new(dataset: Arc<Dataset>, gemini: Option<GeminiClient>) -> Self {
        Self { dataset, gemini }
    }

    fn client(&self) -> Option<&GeminiClient> {
        self.gemini.as_ref()
    }
}

/// Runs one conversational turn over the full message history.
///
/// Always produces a response: a missing user message yields a Vietnamese
/// notice, and every downstream failure degrades inside its handler.
pub async fn run_workflow(ctx: &AgentContext, messages: &[ChatMessage]) -> AgentResponse {
    tracing::info!(message_count = messages.len(), "agent workflow started");

    let Some(query) = messages
        .iter()
        .filter(|m| m.role == "user")
        .filter_map(ChatMessage::text)
        .next_back()
        .map(str::to_string)
    else {
        return AgentResponse::text("Không tìm thấy tin nhắn từ người dùng.");
    };
    tracing::info!(query = %query, "user query");

    let history = conversation_history(messages);
    let result = classify_intent(ctx.client(), &query, &history).await;
    tracing::info!(intent = ?result.intent, "routing query");

    match result.intent {
        Intent::DataAnalysis | Intent::Comparison => {
            compose::data_analysis(&ctx.dataset, ctx.client(), &query, &result.entities).await
        }
        Intent::DataQuery => compose::data_query(&ctx.dataset, &query),
        Intent::Explanation => compose::explanation(ctx.client(), &query, &history).await,
        Intent::Research => {
            compose::research(ctx.client(), &query, &result.entities, &history).await
        }
        Intent::Followup => {
            let q = query.to_lowercase();
            let wants_explanation = ["tại sao", "why", "giải thích", "explain"]
                .iter()
                .any(|word| q.contains(word));
            if wants_explanation {
                compose::explanation(ctx.client(), &query, &history).await
            } else {
                compose::data_analysis(&ctx.dataset, ctx.client(), &query, &result.entities).await
            }
        }
    }
}

/// Flattens all but the last message into classifier context. Structured
/// contents (prior composite responses) collapse to a placeholder line.
fn conversation_history(messages: &[ChatMessage]) -> String {
    let mut history = String::new();
    for message in messages.iter().take(messages.len().saturating_sub(1)) {
        let role = if message.role.is_empty() {
            "user"
        } else {
            &message.role
        };
        match message.text() {
            Some(text) => {
                history.push_str(role);
                history.push_str(": ");
                history.push_str(text);
                history.push('\n');
            }
            None => {
                history.push_str(role);
                history.push_str(": [Previous data/chart response]\n");
            }
        }
    }
    history
}
