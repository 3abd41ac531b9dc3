//! Chart selection from query keywords.
//!
//! Keyword checks run in a fixed order and accumulate series; the last
//! matching rule wins the title and chart type. A query mentioning nothing
//! recognizable falls back to a cost-plus-revenue area chart.

use crate::response::{ChartSeries, ChartType};

/// A chart choice: type, title, and the series to plot.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub series: Vec<ChartSeries>,
}

/// Picks a chart for `query` by keyword.
#[must_use]
pub fn select_chart(query: &str) -> ChartSpec {
    let q = query.to_lowercase();

    let mut series = Vec::new();
    let mut title = "Hiệu suất quảng cáo";
    let mut chart_type = ChartType::Area;

    if q.contains("cpc") || q.contains("cost per click") {
        series.push(ChartSeries::new("cpc", "CPC", "#3b82f6"));
        title = "Chi phí mỗi click (CPC)";
        chart_type = ChartType::Line;
    }
    if q.contains("roas") {
        series.push(ChartSeries::new("roas", "ROAS", "#8b5cf6"));
        title = "ROAS - Return on Ad Spend";
        chart_type = ChartType::Line;
    }
    if q.contains("ctr") {
        series.push(ChartSeries::new("ctr", "CTR %", "#06b6d4"));
        title = "Click-Through Rate (CTR)";
        chart_type = ChartType::Line;
    }
    if q.contains("click") || q.contains("lượt") {
        series.push(ChartSeries::new("clicks", "Clicks", "#3b82f6"));
        title = "Lượt click";
        chart_type = ChartType::Line;
    }
    if q.contains("impression") || q.contains("hiển thị") {
        series.push(ChartSeries::new("impressions", "Impressions", "#8b5cf6"));
        title = "Lượt hiển thị";
        chart_type = ChartType::Area;
    }
    if q.contains("chi phí") || q.contains("cost") {
        series.push(ChartSeries::new("cost", "Chi phí", "#ef4444"));
        if q.contains("chi phí") {
            title = "Chi phí quảng cáo";
        }
    }
    if q.contains("doanh thu") || q.contains("revenue") {
        series.push(ChartSeries::new("revenue", "Doanh thu", "#22c55e"));
        if q.contains("doanh thu") {
            title = "Doanh thu từ quảng cáo";
        }
    }
    if q.contains("conversion") || q.contains("chuyển đổi") {
        series.push(ChartSeries::new("conversions", "Chuyển đổi", "#f59e0b"));
        title = "Lượt chuyển đổi";
        chart_type = ChartType::Bar;
    }

    if series.is_empty() {
        series = vec![
            ChartSeries::new("cost", "Chi phí", "#ef4444"),
            ChartSeries::new("revenue", "Doanh thu", "#22c55e"),
        ];
        title = "Chi phí và Doanh thu";
    }

    tracing::info!(
        chart_type = ?chart_type,
        series = ?series.iter().map(|s| s.data_key.as_str()).collect::<Vec<_>>(),
        title,
        "chart selected"
    );

    ChartSpec {
        chart_type,
        title: title.to_string(),
        series,
    }
}
