//! Synthetic dataset generation.
//!
//! Shapes mirror what a real affiliate dashboard ingests: accounts on a
//! handful of ad platforms, campaigns tied to affiliate programs, and one
//! performance record per campaign per day derived from campaign baselines
//! with weekend dampening and per-day variance.

use chrono::{Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use adsight_core::programs::{ProgramConfig, AD_PLATFORMS, CAMPAIGN_TYPES};
use adsight_core::DatasetConfig;

use crate::models::{Account, BaseRates, Campaign, DailyRecord, Dataset, EntityStatus};

impl Dataset {
    /// Generates a fresh dataset ending today.
    #[must_use]
    pub fn generate(config: &DatasetConfig, programs: &[ProgramConfig]) -> Self {
        Self::generate_as_of(config, programs, Utc::now().date_naive())
    }

    /// Generates a fresh dataset with daily records covering
    /// `[end_date - days_history, end_date]`.
    ///
    /// A fixed `config.seed` yields an identical dataset on every call.
    #[must_use]
    pub fn generate_as_of(
        config: &DatasetConfig,
        programs: &[ProgramConfig],
        end_date: NaiveDate,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        tracing::info!(
            accounts = config.accounts,
            campaigns_per_account = config.campaigns_per_account,
            days_history = config.days_history,
            seeded = config.seed.is_some(),
            "generating synthetic dataset"
        );

        let accounts = generate_accounts(&mut rng, config.accounts);
        let campaigns =
            generate_campaigns(&mut rng, &accounts, config.campaigns_per_account, programs);
        let daily = generate_daily_records(&mut rng, &campaigns, config.days_history, end_date);

        tracing::info!(
            campaigns = campaigns.len(),
            daily_records = daily.len(),
            "dataset ready"
        );

        Self {
            accounts,
            campaigns,
            daily,
            generated_at: Utc::now(),
        }
    }
}

fn generate_accounts(rng: &mut StdRng, count: usize) -> Vec<Account> {
    (0..count)
        .map(|i| {
            let platform = AD_PLATFORMS
                .choose(rng)
                .copied()
                .unwrap_or(AD_PLATFORMS[0]);
            Account {
                id: format!("acc_{:03}", i + 1),
                name: format!("{platform} Account - {}", i + 1),
                platform: platform.to_string(),
                status: EntityStatus::Active,
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn generate_campaigns(
    rng: &mut StdRng,
    accounts: &[Account],
    count_per_account: usize,
    programs: &[ProgramConfig],
) -> Vec<Campaign> {
    let mut campaigns = Vec::new();
    let mut next_id = 1usize;

    for account in accounts {
        let low = count_per_account.saturating_sub(2);
        let num_campaigns = rng.random_range(low..=count_per_account + 3);

        for _ in 0..num_campaigns {
            let Some(program) = programs.choose(rng) else {
                continue;
            };

            let keyword_count = program.keywords.len().min(3);
            let keywords: Vec<String> = program
                .keywords
                .choose_multiple(rng, keyword_count)
                .cloned()
                .collect();

            let campaign_type = CAMPAIGN_TYPES
                .choose(rng)
                .copied()
                .unwrap_or(CAMPAIGN_TYPES[0]);
            let lead_keyword = keywords.first().map_or("", String::as_str);
            let name = format!("[{}] {campaign_type} - {lead_keyword}", program.name);

            let mut base_cpc = rng.random_range(2_000..=15_000) as f64;
            let base_ctr = rng.random_range(1.5..8.0);
            let mut base_cr = rng.random_range(0.5..5.0);
            let mut avg_order_value = rng.random_range(200_000..=5_000_000) as f64;

            // Niche economics: finance clicks are expensive and convert rarely
            // but pay out big; e-commerce is the opposite.
            match program.niche.as_str() {
                "Finance" => {
                    base_cpc *= 2.5;
                    base_cr *= 0.6;
                    avg_order_value *= 3.0;
                }
                "E-commerce" => {
                    base_cpc *= 0.6;
                    base_cr *= 1.5;
                    avg_order_value *= 0.5;
                }
                _ => {}
            }

            let status = if rng.random_range(0..4) == 3 {
                EntityStatus::Paused
            } else {
                EntityStatus::Active
            };

            campaigns.push(Campaign {
                id: format!("camp_{next_id:04}"),
                account_id: account.id.clone(),
                name,
                program: program.name.clone(),
                niche: program.niche.clone(),
                keywords,
                status,
                budget: rng.random_range(500_000..=10_000_000),
                base_config: BaseRates {
                    base_cpc,
                    base_ctr,
                    base_cr,
                    avg_order_value,
                },
            });
            next_id += 1;
        }
    }

    campaigns
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn generate_daily_records(
    rng: &mut StdRng,
    campaigns: &[Campaign],
    days_history: i64,
    end_date: NaiveDate,
) -> Vec<DailyRecord> {
    let start_date = end_date - chrono::Duration::days(days_history);
    let mut records = Vec::new();

    for campaign in campaigns {
        let volatility: f64 = rng.random_range(0.8..1.2);

        let mut current = start_date;
        while current <= end_date {
            let is_weekend = current.weekday().number_from_monday() >= 6;
            let seasonality = if is_weekend { 0.9 } else { 1.1 };
            let daily_variance: f64 = rng.random_range(0.7..1.3);

            let base_impressions = rng.random_range(100..=5_000) as f64;
            let impressions =
                (base_impressions * seasonality * daily_variance * volatility).max(0.0) as u64;

            let ctr = campaign.base_config.base_ctr * rng.random_range(0.9..1.1) / 100.0;
            let clicks = (impressions as f64 * ctr) as u64;

            let cpc = campaign.base_config.base_cpc * rng.random_range(0.9..1.1);
            let cost = (clicks as f64 * cpc) as u64;

            let conversion_rate = campaign.base_config.base_cr * rng.random_range(0.8..1.2) / 100.0;
            let conversions = (clicks as f64 * conversion_rate) as u64;

            let order_value = campaign.base_config.avg_order_value * rng.random_range(0.9..1.1);
            let revenue = (conversions as f64 * order_value) as u64;

            records.push(DailyRecord {
                date: current,
                campaign_id: campaign.id.clone(),
                account_id: campaign.account_id.clone(),
                clicks,
                impressions,
                cost,
                conversions,
                revenue,
            });

            current += chrono::Duration::days(1);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use adsight_core::programs::default_programs;

    use super::*;

    fn seeded_config() -> DatasetConfig {
        DatasetConfig {
            accounts: 3,
            campaigns_per_account: 4,
            days_history: 10,
            seed: Some(7),
        }
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    #[test]
    fn generates_expected_account_shape() {
        let dataset = Dataset::generate_as_of(&seeded_config(), &default_programs(), fixed_today());
        assert_eq!(dataset.accounts.len(), 3);
        assert_eq!(dataset.accounts[0].id, "acc_001");
        assert!(dataset.accounts[0].name.contains("Account - 1"));
    }

    #[test]
    fn generates_one_record_per_campaign_per_day() {
        let config = seeded_config();
        let dataset = Dataset::generate_as_of(&config, &default_programs(), fixed_today());
        let days = config.days_history as usize + 1; // inclusive window
        assert_eq!(dataset.daily.len(), dataset.campaigns.len() * days);

        let first_campaign = &dataset.campaigns[0];
        let campaign_days = dataset
            .daily
            .iter()
            .filter(|r| r.campaign_id == first_campaign.id)
            .count();
        assert_eq!(campaign_days, days);
    }

    #[test]
    fn campaign_fields_are_consistent() {
        let dataset = Dataset::generate_as_of(&seeded_config(), &default_programs(), fixed_today());
        let account_ids: Vec<&str> = dataset.accounts.iter().map(|a| a.id.as_str()).collect();
        for campaign in &dataset.campaigns {
            assert!(account_ids.contains(&campaign.account_id.as_str()));
            assert!(campaign.name.starts_with(&format!("[{}]", campaign.program)));
            assert!(!campaign.keywords.is_empty() && campaign.keywords.len() <= 3);
            assert!(campaign.base_config.base_cpc > 0.0);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = Dataset::generate_as_of(&seeded_config(), &default_programs(), fixed_today());
        let b = Dataset::generate_as_of(&seeded_config(), &default_programs(), fixed_today());
        assert_eq!(a.campaigns.len(), b.campaigns.len());
        assert_eq!(a.daily.len(), b.daily.len());
        for (ra, rb) in a.daily.iter().zip(&b.daily) {
            assert_eq!(ra.clicks, rb.clicks);
            assert_eq!(ra.cost, rb.cost);
            assert_eq!(ra.revenue, rb.revenue);
        }
    }
}
