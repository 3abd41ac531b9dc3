//! The campaign metrics query engine: filter, group, derive, summarize.
//!
//! Input is a [`MetricsFilter`]; the JSON field names of the output report
//! (`dateRange`, `totalRecords`, `avgCPC`, ...) are the compatibility
//! contract consumed by the dashboard front end and must not drift.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{parse_date_range, DateRange};
use crate::metrics::{round0, round2, safe_ratio};
use crate::models::{Account, Campaign, DailyRecord, Dataset};

/// Grouping dimension for aggregated rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
    Account,
    Campaign,
}

/// Per-entity-per-day breakdown dimension. When present it overrides
/// `group_by` and the report switches to granular rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakdown {
    Account,
    Campaign,
}

/// Filters for [`query_campaign_metrics`]. All fields optional, ANDed together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsFilter {
    pub date_range: Option<String>,
    pub account_ids: Vec<String>,
    pub campaign_ids: Vec<String>,
    pub program: Option<String>,
    pub keywords: Vec<String>,
    pub group_by: GroupBy,
    pub breakdown: Option<Breakdown>,
}

impl MetricsFilter {
    /// Lenient boundary parse: a JSON object is deserialized as a filter,
    /// anything else (including malformed JSON) is treated as a bare
    /// date-range phrase. Never fails.
    #[must_use]
    pub fn from_request(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            match serde_json::from_str::<Self>(trimmed) {
                Ok(filter) => return filter,
                Err(error) => {
                    tracing::debug!(%error, "filter payload is not a valid JSON object; treating input as a date phrase");
                }
            }
        }

        Self {
            date_range: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_date_range(phrase: impl Into<String>) -> Self {
        Self {
            date_range: Some(phrase.into()),
            ..Self::default()
        }
    }
}

/// One aggregated row. For day/week/month grouping `date` is the bucket
/// date; for account/campaign grouping it carries the entity display name
/// (the front end uses it as the x-axis label either way). Granular
/// breakdown rows additionally set `entity`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricRow {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: u64,
    pub conversions: u64,
    pub revenue: u64,
    pub cpc: f64,
    pub ctr: f64,
    pub roas: f64,
    pub cpa: f64,
}

/// Grand totals and weighted averages over the rows of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(rename = "totalClicks")]
    pub total_clicks: u64,
    #[serde(rename = "totalCost")]
    pub total_cost: u64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: u64,
    #[serde(rename = "totalConversions")]
    pub total_conversions: u64,
    #[serde(rename = "totalImpressions")]
    pub total_impressions: u64,
    #[serde(rename = "avgCPC")]
    pub avg_cpc: f64,
    #[serde(rename = "avgCTR")]
    pub avg_ctr: f64,
    #[serde(rename = "avgROAS")]
    pub avg_roas: f64,
    #[serde(rename = "avgCPA")]
    pub avg_cpa: f64,
}

/// Result of a metrics query.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub data: Vec<MetricRow>,
    #[serde(rename = "dateRange")]
    pub date_range: DateRange,
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
    #[serde(rename = "is_granular", skip_serializing_if = "std::ops::Not::not")]
    pub is_granular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    clicks: u64,
    impressions: u64,
    cost: u64,
    conversions: u64,
    revenue: u64,
}

impl Totals {
    fn absorb(&mut self, record: &DailyRecord) {
        self.clicks += record.clicks;
        self.impressions += record.impressions;
        self.cost += record.cost;
        self.conversions += record.conversions;
        self.revenue += record.revenue;
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_row(self, date: String, entity: Option<String>) -> MetricRow {
        let clicks = self.clicks as f64;
        let impressions = self.impressions as f64;
        let cost = self.cost as f64;
        let conversions = self.conversions as f64;
        let revenue = self.revenue as f64;

        MetricRow {
            date,
            entity,
            clicks: self.clicks,
            impressions: self.impressions,
            cost: self.cost,
            conversions: self.conversions,
            revenue: self.revenue,
            cpc: round0(safe_ratio(cost, clicks)),
            ctr: round2(safe_ratio(clicks, impressions) * 100.0),
            roas: round2(safe_ratio(revenue, cost)),
            cpa: round0(safe_ratio(cost, conversions)),
        }
    }
}

/// Aggregation map that remembers first-occurrence insertion order.
#[derive(Default)]
struct OrderedBuckets {
    index: HashMap<(String, Option<String>), usize>,
    keys: Vec<(String, Option<String>)>,
    totals: Vec<Totals>,
}

impl OrderedBuckets {
    fn absorb(&mut self, date: String, entity: Option<String>, record: &DailyRecord) {
        let key = (date, entity);
        if let Some(&slot) = self.index.get(&key) {
            self.totals[slot].absorb(record);
        } else {
            self.index.insert(key.clone(), self.totals.len());
            self.keys.push(key);
            let mut totals = Totals::default();
            totals.absorb(record);
            self.totals.push(totals);
        }
    }

    fn into_rows(self) -> Vec<MetricRow> {
        self.keys
            .into_iter()
            .zip(self.totals)
            .map(|((date, entity), totals)| totals.into_row(date, entity))
            .collect()
    }
}

/// Runs a metrics query against `dataset`, resolving relative date phrases
/// against the current UTC date.
#[must_use]
pub fn query_campaign_metrics(dataset: &Dataset, filter: &MetricsFilter) -> MetricsReport {
    query_campaign_metrics_as_of(dataset, filter, Utc::now().date_naive())
}

/// Runs a metrics query with an explicit "today" (for deterministic tests).
///
/// Filter predicates are conjunctive, applied account → campaign → program
/// → keywords, then daily records are restricted to the resolved date range
/// (inclusive both ends) before grouping.
#[must_use]
pub fn query_campaign_metrics_as_of(
    dataset: &Dataset,
    filter: &MetricsFilter,
    today: NaiveDate,
) -> MetricsReport {
    let date_range = parse_date_range(
        filter.date_range.as_deref().unwrap_or("last 30 days"),
        today,
    );

    let selected: Vec<&Campaign> = dataset
        .campaigns
        .iter()
        .filter(|c| filter.account_ids.is_empty() || filter.account_ids.contains(&c.account_id))
        .filter(|c| filter.campaign_ids.is_empty() || filter.campaign_ids.contains(&c.id))
        .filter(|c| {
            filter.program.as_deref().is_none_or(|program| {
                c.program.to_lowercase().contains(&program.to_lowercase())
            })
        })
        .filter(|c| filter.keywords.is_empty() || matches_keywords(c, &filter.keywords))
        .collect();

    let selected_ids: HashSet<&str> = selected.iter().map(|c| c.id.as_str()).collect();
    let relevant: Vec<&DailyRecord> = dataset
        .daily
        .iter()
        .filter(|r| selected_ids.contains(r.campaign_id.as_str()) && date_range.contains(r.date))
        .collect();

    let campaign_names: HashMap<&str, &str> = dataset
        .campaigns
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let account_names: HashMap<&str, &str> = dataset
        .accounts
        .iter()
        .map(|a| (a.id.as_str(), a.name.as_str()))
        .collect();

    let mut buckets = OrderedBuckets::default();
    let mut rows = if let Some(breakdown) = filter.breakdown {
        for record in &relevant {
            let entity = match breakdown {
                Breakdown::Account => entity_name(&account_names, &record.account_id),
                Breakdown::Campaign => entity_name(&campaign_names, &record.campaign_id),
            };
            buckets.absorb(record.date.to_string(), Some(entity), record);
        }
        let mut rows = buckets.into_rows();
        // Stable sort: same-day entities keep first-occurrence order.
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        rows
    } else {
        for record in &relevant {
            let key = match filter.group_by {
                GroupBy::Day => record.date.to_string(),
                GroupBy::Week => week_start(record.date).to_string(),
                GroupBy::Month => month_start(record.date).to_string(),
                GroupBy::Account => entity_name(&account_names, &record.account_id),
                GroupBy::Campaign => entity_name(&campaign_names, &record.campaign_id),
            };
            buckets.absorb(key, None, record);
        }
        let mut rows = buckets.into_rows();
        match filter.group_by {
            GroupBy::Day | GroupBy::Week | GroupBy::Month => {
                rows.sort_by(|a, b| a.date.cmp(&b.date));
            }
            // Top spenders first, capped so charts stay readable.
            GroupBy::Campaign => {
                rows.sort_by(|a, b| b.cost.cmp(&a.cost));
                rows.truncate(10);
            }
            // First-occurrence order.
            GroupBy::Account => {}
        }
        rows
    };

    // The summary covers the rows actually returned, so a capped campaign
    // report summarizes the top spenders only.
    let summary = summarize(&rows);
    rows.shrink_to_fit();

    MetricsReport {
        total_records: rows.len(),
        is_granular: filter.breakdown.is_some(),
        breakdown: filter.breakdown,
        data: rows,
        date_range,
        summary,
    }
}

/// A campaign matches if ANY filter keyword is a case-insensitive substring
/// of ANY of its own keywords, or of its name.
fn matches_keywords(campaign: &Campaign, filters: &[String]) -> bool {
    let name = campaign.name.to_lowercase();
    filters.iter().any(|raw| {
        let needle = raw.to_lowercase();
        name.contains(&needle)
            || campaign
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    })
}

fn entity_name(names: &HashMap<&str, &str>, id: &str) -> String {
    names.get(id).copied().unwrap_or("Unknown").to_string()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[allow(clippy::cast_precision_loss)]
fn summarize(rows: &[MetricRow]) -> Summary {
    let total_clicks: u64 = rows.iter().map(|r| r.clicks).sum();
    let total_impressions: u64 = rows.iter().map(|r| r.impressions).sum();
    let total_cost: u64 = rows.iter().map(|r| r.cost).sum();
    let total_conversions: u64 = rows.iter().map(|r| r.conversions).sum();
    let total_revenue: u64 = rows.iter().map(|r| r.revenue).sum();

    Summary {
        total_clicks,
        total_cost,
        total_revenue,
        total_conversions,
        total_impressions,
        avg_cpc: round0(safe_ratio(total_cost as f64, total_clicks as f64)),
        avg_ctr: round2(safe_ratio(total_clicks as f64, total_impressions as f64) * 100.0),
        avg_roas: round2(safe_ratio(total_revenue as f64, total_cost as f64)),
        avg_cpa: round0(safe_ratio(total_cost as f64, total_conversions as f64)),
    }
}

/// Filters for [`list_campaigns`]. Parsed leniently like [`MetricsFilter`],
/// except malformed input degrades to "no filters" rather than a date phrase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CampaignListFilter {
    pub account_id: Option<String>,
    pub program: Option<String>,
    pub keyword: Option<String>,
}

impl CampaignListFilter {
    #[must_use]
    pub fn from_request(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            serde_json::from_str(trimmed).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

/// Campaign metadata as listed in data_query tables.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub id: String,
    pub name: String,
    pub program: String,
    pub keywords: Vec<String>,
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub status: crate::models::EntityStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignList {
    pub campaigns: Vec<CampaignSummary>,
    #[serde(rename = "totalCampaigns")]
    pub total_campaigns: usize,
}

/// Lists campaigns matching the filter, with their metadata.
#[must_use]
pub fn list_campaigns(dataset: &Dataset, filter: &CampaignListFilter) -> CampaignList {
    let campaigns: Vec<CampaignSummary> = dataset
        .campaigns
        .iter()
        .filter(|c| {
            filter
                .account_id
                .as_deref()
                .is_none_or(|account_id| c.account_id == account_id)
        })
        .filter(|c| {
            filter.program.as_deref().is_none_or(|program| {
                c.program.to_lowercase().contains(&program.to_lowercase())
            })
        })
        .filter(|c| {
            filter
                .keyword
                .as_deref()
                .is_none_or(|keyword| matches_keywords(c, &[keyword.to_string()]))
        })
        .map(|c| CampaignSummary {
            id: c.id.clone(),
            name: c.name.clone(),
            program: c.program.clone(),
            keywords: c.keywords.clone(),
            account_id: c.account_id.clone(),
            status: c.status,
        })
        .collect();

    CampaignList {
        total_campaigns: campaigns.len(),
        campaigns,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountOverview {
    pub accounts: Vec<Account>,
    #[serde(rename = "totalAccounts")]
    pub total_accounts: usize,
    #[serde(rename = "activeAccounts")]
    pub active_accounts: usize,
}

/// Lists all connected accounts with active/total counts.
#[must_use]
pub fn account_overview(dataset: &Dataset) -> AccountOverview {
    let active_accounts = dataset
        .accounts
        .iter()
        .filter(|a| a.status == crate::models::EntityStatus::Active)
        .count();

    AccountOverview {
        accounts: dataset.accounts.clone(),
        total_accounts: dataset.accounts.len(),
        active_accounts,
    }
}
