//! Intent classification via the external language model.
//!
//! The category set is closed; anything the model returns outside it (or
//! any parse failure at all) degrades to `DataAnalysis` with empty
//! entities, so classification can never fail the request.

use serde::{Deserialize, Serialize};

use adsight_gemini::GeminiClient;

use crate::markdown::strip_code_fences;

/// The closed set of query intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DataAnalysis,
    DataQuery,
    Comparison,
    Explanation,
    Followup,
    Research,
}

/// Entities the classifier extracted from the query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntentEntities {
    pub time_range: Option<String>,
    pub metrics: Option<Vec<String>>,
    pub campaigns: Option<Vec<String>>,
    pub niche: Option<String>,
}

impl IntentEntities {
    /// The extracted time range, if non-empty.
    #[must_use]
    pub fn time_range(&self) -> Option<&str> {
        self.time_range
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct IntentResult {
    pub intent: Intent,
    pub entities: IntentEntities,
}

impl IntentResult {
    /// The documented fallback: `data_analysis` with empty entities.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            intent: Intent::DataAnalysis,
            entities: IntentEntities::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawIntentResponse {
    intent: Intent,
    #[serde(default)]
    entities: IntentEntities,
}

/// Builds the Vietnamese classification prompt for one query.
#[must_use]
pub fn classification_prompt(query: &str, history: &str) -> String {
    let history = if history.trim().is_empty() {
        "Chưa có"
    } else {
        history
    };

    format!(
        r#"Bạn là một bộ phân loại intent cho một ứng dụng quản lý quảng cáo affiliate.

Phân loại câu hỏi của người dùng vào MỘT trong các loại sau:

1. **data_analysis** - Người dùng muốn xem dữ liệu, biểu đồ, metrics về quảng cáo
   Ví dụ: "Chi phí tháng 11", "Hiển thị clicks tuần này", "ROAS của tôi thế nào?", "CPC", "Cost per click"

2. **data_query** - Người dùng muốn danh sách, bảng dữ liệu cụ thể về campaigns/accounts
   Ví dụ: "Liệt kê các chiến dịch", "Campaigns nào có CPC cao nhất?", "Tài khoản nào đang active?"

3. **comparison** - Người dùng muốn so sánh dữ liệu giữa các khoảng thời gian hoặc đối tượng
   Ví dụ: "So sánh tháng 10 và 11", "Campaign nào tốt hơn?", "Tuần này vs tuần trước"

4. **explanation** - Người dùng cần giải thích, hướng dẫn, hoặc hiểu một khái niệm
   Ví dụ: "CPC là gì?", "Tại sao chi phí tăng?", "Giải thích ROAS"

5. **followup** - Người dùng hỏi tiếp về response trước đó
   Ví dụ: "Chi tiết hơn", "Tại sao ngày 15 lại cao?", "Giải thích thêm"

6. **research** - Người dùng muốn TÌM KIẾM chương trình affiliate, niche, hoặc cơ hội kiếm tiền
   Ví dụ: "Crypto", "Forex", "Finance", "Gaming", "Tìm affiliate program", "Ngách nào tốt?"

Câu hỏi: "{query}"

Lịch sử hội thoại: {history}

Trả lời CHÍNH XÁC theo format JSON:
{{"intent": "<loại>", "entities": {{"time_range": "<khoảng thời gian nếu có>", "metrics": ["<metrics được nhắc đến>"], "campaigns": ["<campaigns nếu có>"], "niche": "<ngách/lĩnh vực nếu có>"}}}}
"#
    )
}

/// Parses a model response into an intent result. Strips code fences first;
/// returns `None` on any shape mismatch (including unknown intent labels).
#[must_use]
pub fn parse_intent_response(text: &str) -> Option<IntentResult> {
    let cleaned = strip_code_fences(text);
    let raw: RawIntentResponse = serde_json::from_str(&cleaned).ok()?;
    Some(IntentResult {
        intent: raw.intent,
        entities: raw.entities,
    })
}

/// Classifies `query` using the language model.
///
/// Guarantees a result: a missing client, a failed call, or an unparseable
/// response all yield [`IntentResult::fallback`].
pub async fn classify_intent(
    client: Option<&GeminiClient>,
    query: &str,
    history: &str,
) -> IntentResult {
    tracing::info!(query, "classifying intent");

    let Some(client) = client else {
        tracing::warn!("no language model configured; defaulting to data_analysis");
        return IntentResult::fallback();
    };

    let prompt = classification_prompt(query, history);
    match client.generate(&prompt).await {
        Ok(text) => match parse_intent_response(&text) {
            Some(result) => {
                tracing::info!(intent = ?result.intent, "intent classified");
                result
            }
            None => {
                tracing::warn!(
                    response = %text,
                    "failed to parse intent response; defaulting to data_analysis"
                );
                IntentResult::fallback()
            }
        },
        Err(error) => {
            tracing::warn!(%error, "intent classification call failed; defaulting to data_analysis");
            IntentResult::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_response() {
        let result = parse_intent_response(
            r#"{"intent": "research", "entities": {"niche": "Crypto", "metrics": []}}"#,
        )
        .expect("valid response");
        assert_eq!(result.intent, Intent::Research);
        assert_eq!(result.entities.niche.as_deref(), Some("Crypto"));
    }

    #[test]
    fn parses_fenced_json_response() {
        let fenced = "```json\n{\"intent\": \"data_query\", \"entities\": {}}\n```";
        let result = parse_intent_response(fenced).expect("fenced response");
        assert_eq!(result.intent, Intent::DataQuery);
    }

    #[test]
    fn missing_entities_default_to_empty() {
        let result = parse_intent_response(r#"{"intent": "explanation"}"#).expect("no entities");
        assert_eq!(result.intent, Intent::Explanation);
        assert!(result.entities.time_range.is_none());
        assert!(result.entities.niche.is_none());
    }

    #[test]
    fn unknown_intent_label_fails_parse() {
        assert!(parse_intent_response(r#"{"intent": "chitchat", "entities": {}}"#).is_none());
    }

    #[test]
    fn garbage_fails_parse() {
        assert!(parse_intent_response("I think the user wants a chart").is_none());
    }

    #[test]
    fn empty_time_range_reads_as_none() {
        let entities: IntentEntities =
            serde_json::from_str(r#"{"time_range": "  "}"#).unwrap();
        assert!(entities.time_range().is_none());

        let entities: IntentEntities =
            serde_json::from_str(r#"{"time_range": "tháng 11"}"#).unwrap();
        assert_eq!(entities.time_range(), Some("tháng 11"));
    }

    #[test]
    fn prompt_embeds_query_and_history() {
        let prompt = classification_prompt("Chi phí tháng 11", "user: xin chào\n");
        assert!(prompt.contains("Câu hỏi: \"Chi phí tháng 11\""));
        assert!(prompt.contains("user: xin chào"));

        let prompt = classification_prompt("CPC", "");
        assert!(prompt.contains("Lịch sử hội thoại: Chưa có"));
    }

    #[tokio::test]
    async fn classify_without_client_falls_back() {
        let result = classify_intent(None, "Chi phí tháng 11", "").await;
        assert_eq!(result.intent, Intent::DataAnalysis);
        assert!(result.entities.time_range.is_none());
    }
}
