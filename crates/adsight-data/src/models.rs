use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state shared by accounts and campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Paused,
}

/// A connected ad account. Immutable after generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub status: EntityStatus,
}

/// Per-campaign baselines the daily generator derives its numbers from.
///
/// Monetary baselines are VND; `ctr` and `conversion_rate` are percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseRates {
    pub base_cpc: f64,
    pub base_ctr: f64,
    pub base_cr: f64,
    pub avg_order_value: f64,
}

/// An ad campaign promoting one affiliate program. Immutable after generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub name: String,
    pub program: String,
    pub niche: String,
    pub keywords: Vec<String>,
    pub status: EntityStatus,
    pub budget: u64,
    pub base_config: BaseRates,
}

/// One day of performance for one campaign. All counters non-negative;
/// `cost` and `revenue` are whole VND.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: u64,
    pub conversions: u64,
    pub revenue: u64,
}

/// The in-memory dataset: generated once per process, read-only thereafter.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub accounts: Vec<Account>,
    pub campaigns: Vec<Campaign>,
    pub daily: Vec<DailyRecord>,
    pub generated_at: DateTime<Utc>,
}

impl Dataset {
    /// Display name of the account owning `campaign_id`, or `"Unknown"`.
    #[must_use]
    pub fn account_name_for_campaign(&self, campaign_id: &str) -> String {
        self.campaigns
            .iter()
            .find(|c| c.id == campaign_id)
            .and_then(|c| self.accounts.iter().find(|a| a.id == c.account_id))
            .map_or_else(|| "Unknown".to_string(), |a| a.name.clone())
    }

    /// Display name of `campaign_id`, or `"Unknown"`.
    #[must_use]
    pub fn campaign_name(&self, campaign_id: &str) -> String {
        self.campaigns
            .iter()
            .find(|c| c.id == campaign_id)
            .map_or_else(|| "Unknown".to_string(), |c| c.name.clone())
    }
}
