//! Intent handlers: each turns a classified query into an [`AgentResponse`].
//!
//! Handlers never fail. Language-model calls are best-effort; when the
//! model is missing or errors, each handler substitutes its documented
//! Vietnamese fallback text.

use serde_json::{json, Value};

use adsight_data::{
    account_overview, compute_metrics, list_campaigns, query_campaign_metrics,
    CampaignListFilter, Dataset, MetricsFilter, MetricsInput,
};
use adsight_gemini::GeminiClient;

use crate::charts::select_chart;
use crate::intent::IntentEntities;
use crate::markdown::strip_code_fences;
use crate::response::{
    AgentResponse, ChartConfig, ChartContent, CompositeContent, ResponseContext, Section,
};

const DEFAULT_TIME_RANGE: &str = "last 30 days";

/// Groups the digits of `n` with commas for prompt and narrative text.
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_to_u64(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

/// Runs a prompt through the model, substituting `fallback` when the model
/// is unavailable or the call fails.
async fn narrate(client: Option<&GeminiClient>, prompt: &str, fallback: String) -> String {
    let Some(client) = client else {
        return fallback;
    };
    match client.generate(prompt).await {
        Ok(text) => text.trim().to_string(),
        Err(error) => {
            tracing::warn!(%error, "narrative generation failed; using fallback text");
            fallback
        }
    }
}

/// Metrics query plus chart: the main analytics path.
pub async fn data_analysis(
    dataset: &Dataset,
    client: Option<&GeminiClient>,
    query: &str,
    entities: &IntentEntities,
) -> AgentResponse {
    let time_range = entities.time_range().unwrap_or(DEFAULT_TIME_RANGE);
    tracing::info!(time_range, "running data analysis");

    let filter = MetricsFilter::for_date_range(time_range);
    let report = query_campaign_metrics(dataset, &filter);

    let inputs: Vec<MetricsInput> = report
        .data
        .iter()
        .map(|row| MetricsInput {
            clicks: row.clicks,
            impressions: row.impressions,
            cost: row.cost,
            conversions: row.conversions,
            revenue: row.revenue,
        })
        .collect();
    let calculated = compute_metrics(
        &inputs,
        &["cpc".to_string(), "roas".to_string(), "ctr".to_string()],
    );

    let total_clicks = group_thousands(report.summary.total_clicks);
    let total_cost = group_thousands(report.summary.total_cost);
    let total_revenue = group_thousands(report.summary.total_revenue);
    let avg_cpc = group_thousands(round_to_u64(calculated.metrics.cpc.unwrap_or(0.0)));
    let roas = calculated.metrics.roas.unwrap_or(0.0);

    let prompt = format!(
        r"Bạn là một chuyên gia phân tích quảng cáo thân thiện.

Dựa trên dữ liệu sau, viết một đoạn giới thiệu ngắn gọn (2-3 câu) bằng tiếng Việt:

Thời gian: {time_range}
Tổng clicks: {total_clicks}
Tổng chi phí: {total_cost} VND
Tổng doanh thu: {total_revenue} VND
CPC trung bình: {avg_cpc} VND
ROAS: {roas:.2}

Yêu cầu:
- Thân thiện nhưng chuyên nghiệp
- Highlight điểm quan trọng nhất
- Kết thúc bằng câu dẫn vào biểu đồ

Chỉ trả về đoạn văn, không có format markdown phức tạp."
    );
    let fallback = format!(
        "Trong khoảng {time_range}, bạn có {total_clicks} lượt click với tổng chi phí \
         {total_cost} VND và doanh thu {total_revenue} VND (ROAS {roas:.2}). \
         Dưới đây là biểu đồ chi tiết:"
    );
    let narrative = narrate(client, &prompt, fallback).await;

    let chart = select_chart(query);
    let sections = vec![
        Section::Narrative(narrative),
        Section::Chart(ChartContent {
            chart_type: chart.chart_type,
            title: format!("{} - {time_range}", chart.title),
            data: report.data,
            config: ChartConfig {
                x_axis: "date".to_string(),
                series: chart.series,
            },
        }),
    ];

    AgentResponse::Composite {
        content: CompositeContent {
            sections,
            summary: Some(calculated),
        },
        context: Some(ResponseContext {
            filters: Some(json!({ "timeRange": time_range })),
            niche: None,
            followup_suggestions: vec![
                "So sánh với tháng trước".to_string(),
                "Phân tích theo chiến dịch".to_string(),
                "Chi tiết hơn về dữ liệu này".to_string(),
            ],
        }),
    }
}

/// Campaign or account listing as a table.
pub fn data_query(dataset: &Dataset, query: &str) -> AgentResponse {
    let q = query.to_lowercase();

    let (narrative, table) = if q.contains("campaign") || q.contains("chiến dịch") {
        let list = list_campaigns(dataset, &CampaignListFilter::default());
        let narrative = format!(
            "Đây là danh sách {} chiến dịch hiện có trong hệ thống của bạn:",
            list.campaigns.len()
        );
        (narrative, to_table(&list.campaigns))
    } else if q.contains("account") || q.contains("tài khoản") {
        let overview = account_overview(dataset);
        let narrative = format!(
            "Bạn đang có {} tài khoản đang hoạt động trong tổng số {} tài khoản:",
            overview.active_accounts, overview.total_accounts
        );
        (narrative, to_table(&overview.accounts))
    } else {
        let list = list_campaigns(dataset, &CampaignListFilter::default());
        (
            "Đây là dữ liệu bạn yêu cầu:".to_string(),
            to_table(&list.campaigns),
        )
    };

    AgentResponse::Composite {
        content: CompositeContent {
            sections: vec![Section::Narrative(narrative), Section::Table(table)],
            summary: None,
        },
        context: None,
    }
}

fn to_table<T: serde::Serialize>(rows: &T) -> Value {
    serde_json::to_value(rows).unwrap_or_default()
}

/// Free-form conceptual answer as plain text.
pub async fn explanation(
    client: Option<&GeminiClient>,
    query: &str,
    history: &str,
) -> AgentResponse {
    let history = if history.trim().is_empty() {
        "Chưa có"
    } else {
        history
    };
    let prompt = format!(
        r"Bạn là một chuyên gia affiliate marketing thân thiện.

Trả lời câu hỏi sau bằng tiếng Việt một cách dễ hiểu:

Câu hỏi: {query}

Ngữ cảnh trước đó: {history}

Yêu cầu:
- Giải thích rõ ràng, dễ hiểu
- Dùng ví dụ thực tế khi cần
- Format với markdown khi phù hợp
- Thân thiện nhưng chuyên nghiệp"
    );
    let fallback = "Hiện tại tôi chưa thể kết nối tới trợ lý AI để trả lời câu hỏi này. \
                    Bạn vui lòng thử lại sau nhé."
        .to_string();

    AgentResponse::text(narrate(client, &prompt, fallback).await)
}

/// Affiliate program research: the model proposes programs for a niche and
/// we render whatever parses as a table.
pub async fn research(
    client: Option<&GeminiClient>,
    query: &str,
    entities: &IntentEntities,
    history: &str,
) -> AgentResponse {
    let niche = entities
        .niche
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(query);

    let prompt = format!(
        r#"Research Niche: {niche}
Context from previous conversation (if any):
{history}

Generate 5-10 high-quality affiliate programs (native or network) relevant to this niche in Vietnam (or global programs popular in Vietnam).
If the niche is vague (e.g. "more", "others"), use the Context to determine the actual topic.

For each program, provide:
- brand: Name of the brand.
- program_url: Direct link to affiliate page.
- commission_percent: Commission percentage as number (e.g., 10 for 10%, 15 for 15%). If CPA/flat rate, use 0.
- commission_type: Type of commission ("percentage", "cpa", "hybrid").
- can_use_brand: Boolean (true/false) - whether affiliates can use brand name in ads.
- traffic_3m: Estimated monthly visits or trend (e.g., "500k/tháng", "12M+").
- legitimacy_score: A confidence score (0-10) based on brand reputation.

Return ONLY the JSON array.
"#
    );

    let table = match client {
        Some(client) => match client.generate(&prompt).await {
            Ok(text) => parse_research_table(&text),
            Err(error) => {
                tracing::warn!(%error, "research call failed");
                json!([{ "error": "Không thể parse kết quả từ AI" }])
            }
        },
        None => json!([{ "error": "Không thể parse kết quả từ AI" }]),
    };

    let narrative = format!(
        "Đây là các chương trình affiliate trong lĩnh vực **{niche}** mà tôi tìm được cho bạn:"
    );

    AgentResponse::Composite {
        content: CompositeContent {
            sections: vec![Section::Narrative(narrative), Section::Table(table)],
            summary: None,
        },
        context: Some(ResponseContext {
            filters: None,
            niche: Some(niche.to_string()),
            followup_suggestions: vec![
                format!("Thêm programs trong lĩnh vực {niche}"),
                "So sánh commission rates".to_string(),
                "Ngách liên quan khác".to_string(),
            ],
        }),
    }
}

/// Accepts either a bare JSON array or an object wrapping one under
/// `content`; anything else becomes a one-row error table.
fn parse_research_table(text: &str) -> Value {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Array(rows)) => Value::Array(rows),
        Ok(Value::Object(mut object)) => match object.remove("content") {
            Some(Value::Array(rows)) => Value::Array(rows),
            _ => Value::Array(vec![]),
        },
        Ok(_) => Value::Array(vec![]),
        Err(_) => json!([{ "error": "Không thể parse kết quả từ AI" }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use adsight_core::app_config::DatasetConfig;
    use adsight_core::programs::default_programs;

    fn test_dataset() -> Dataset {
        let config = DatasetConfig {
            accounts: 2,
            campaigns_per_account: 3,
            days_history: 10,
            seed: Some(7),
        };
        Dataset::generate(&config, &default_programs())
    }

    #[test]
    fn groups_thousands_with_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(950), "950");
        assert_eq!(group_thousands(1_234), "1,234");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn data_query_lists_campaigns_for_campaign_keywords() {
        let dataset = test_dataset();
        let total = dataset.campaigns.len();
        let response = data_query(&dataset, "Liệt kê các chiến dịch");

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["type"], "composite");
        let narrative = json["content"]["sections"][0]["content"].as_str().unwrap();
        assert!(narrative.contains(&format!("danh sách {total} chiến dịch")));
        let table = json["content"]["sections"][1]["content"].as_array().unwrap();
        assert_eq!(table.len(), total);
        assert!(table[0]["id"].as_str().unwrap().starts_with("camp_"));
    }

    #[test]
    fn data_query_lists_accounts_for_account_keywords() {
        let dataset = test_dataset();
        let response = data_query(&dataset, "Tài khoản nào đang active?");

        let json = serde_json::to_value(response).unwrap();
        let narrative = json["content"]["sections"][0]["content"].as_str().unwrap();
        assert!(narrative.contains("trong tổng số 2 tài khoản"));
        let table = json["content"]["sections"][1]["content"].as_array().unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn data_query_defaults_to_campaign_table() {
        let dataset = test_dataset();
        let response = data_query(&dataset, "cho tôi xem dữ liệu");

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(
            json["content"]["sections"][0]["content"],
            "Đây là dữ liệu bạn yêu cầu:"
        );
    }

    #[tokio::test]
    async fn data_analysis_without_model_uses_fallback_narrative() {
        let dataset = test_dataset();
        let response =
            data_analysis(&dataset, None, "chi phí 7 ngày qua", &IntentEntities::default()).await;

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["type"], "composite");

        let narrative = json["content"]["sections"][0]["content"].as_str().unwrap();
        assert!(narrative.contains("last 30 days"));

        let chart = &json["content"]["sections"][1]["content"];
        assert_eq!(chart["title"], "Chi phí quảng cáo - last 30 days");
        assert_eq!(chart["config"]["series"][0]["dataKey"], "cost");
        assert!(!chart["data"].as_array().unwrap().is_empty());

        assert!(json["content"]["summary"]["metrics"]["cpc"].is_number());
        assert_eq!(json["context"]["filters"]["timeRange"], "last 30 days");
        assert_eq!(
            json["context"]["followupSuggestions"][0],
            "So sánh với tháng trước"
        );
    }

    #[tokio::test]
    async fn data_analysis_honors_extracted_time_range() {
        let dataset = test_dataset();
        let entities = IntentEntities {
            time_range: Some("last 7 days".to_string()),
            ..IntentEntities::default()
        };
        let response = data_analysis(&dataset, None, "clicks", &entities).await;

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["context"]["filters"]["timeRange"], "last 7 days");
        let chart = &json["content"]["sections"][1]["content"];
        assert_eq!(chart["title"], "Lượt click - last 7 days");
    }

    #[tokio::test]
    async fn explanation_without_model_returns_fallback_text() {
        let response = explanation(None, "CPC là gì?", "").await;
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["type"], "text");
        assert!(json["content"].as_str().unwrap().contains("thử lại sau"));
    }

    #[tokio::test]
    async fn research_without_model_returns_error_table() {
        let entities = IntentEntities {
            niche: Some("Crypto".to_string()),
            ..IntentEntities::default()
        };
        let response = research(None, "crypto", &entities, "").await;

        let json = serde_json::to_value(response).unwrap();
        let narrative = json["content"]["sections"][0]["content"].as_str().unwrap();
        assert!(narrative.contains("**Crypto**"));
        assert_eq!(
            json["content"]["sections"][1]["content"][0]["error"],
            "Không thể parse kết quả từ AI"
        );
        assert_eq!(json["context"]["niche"], "Crypto");
        assert_eq!(
            json["context"]["followupSuggestions"][0],
            "Thêm programs trong lĩnh vực Crypto"
        );
    }

    #[test]
    fn research_table_accepts_array_and_wrapped_object() {
        let rows = parse_research_table(r#"[{"brand": "Shopee"}]"#);
        assert_eq!(rows[0]["brand"], "Shopee");

        let wrapped = parse_research_table(r#"{"content": [{"brand": "Lazada"}]}"#);
        assert_eq!(wrapped[0]["brand"], "Lazada");

        let fenced = parse_research_table("```json\n[{\"brand\": \"Tiki\"}]\n```");
        assert_eq!(fenced[0]["brand"], "Tiki");

        let garbage = parse_research_table("no JSON here");
        assert_eq!(garbage[0]["error"], "Không thể parse kết quả từ AI");

        let scalar = parse_research_table("42");
        assert_eq!(scalar, json!([]));
    }
}
