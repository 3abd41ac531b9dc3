//! Synthetic dataset store and the campaign metrics query engine.
//!
//! The dataset is generated once at startup and is immutable afterwards;
//! every query borrows it read-only, so an `Arc<Dataset>` can be shared
//! across concurrent requests without locking.

pub mod dates;
pub mod generator;
pub mod metrics;
pub mod models;
pub mod query;

pub use dates::{parse_date_range, parse_date_range_now, DateRange};
pub use metrics::{
    calculate_metrics, compute_metrics, CalculatedMetrics, MetricsError, MetricsInput,
};
pub use models::{Account, BaseRates, Campaign, DailyRecord, Dataset, EntityStatus};
pub use query::{
    account_overview, list_campaigns, query_campaign_metrics, query_campaign_metrics_as_of,
    AccountOverview, Breakdown, CampaignList, CampaignListFilter, GroupBy, MetricRow,
    MetricsFilter, MetricsReport, Summary,
};
