use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Ad platforms an account can be connected to.
pub const AD_PLATFORMS: [&str; 4] = [
    "Google Search",
    "Facebook Ads",
    "TikTok Ads",
    "YouTube Ads",
];

/// Campaign delivery types used in generated campaign names.
pub const CAMPAIGN_TYPES: [&str; 4] = ["Search", "Display", "Video", "Conversion"];

/// An affiliate program the synthetic campaigns can promote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub name: String,
    pub niche: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgramsFile {
    pub programs: Vec<ProgramConfig>,
}

/// The built-in program catalog used when no YAML override is configured.
#[must_use]
pub fn default_programs() -> Vec<ProgramConfig> {
    let entries: [(&str, &str, &[&str]); 10] = [
        (
            "Exness",
            "Finance",
            &["forex", "trading", "gold", "xauusd", "đầu tư", "sàn forex"],
        ),
        (
            "Binance",
            "Crypto",
            &["bitcoin", "crypto", "usdt", "mua coin", "sàn binance", "p2p"],
        ),
        (
            "Shopee",
            "E-commerce",
            &["mua sắm", "khuyến mãi", "shopee sale", "voucher", "freeship"],
        ),
        (
            "Lazada",
            "E-commerce",
            &["lazada", "tiki", "điện máy", "gia dụng", "deal hot"],
        ),
        (
            "Sephora",
            "Beauty",
            &["mỹ phẩm", "skincare", "son môi", "nước hoa", "makeup"],
        ),
        (
            "Razer",
            "Gaming",
            &["chuột gaming", "bàn phím cơ", "tai nghe", "laptop gaming"],
        ),
        (
            "Hostinger",
            "Tech",
            &["hosting", "cloud server", "domain", "wordpress", "vps"],
        ),
        (
            "Klook",
            "Travel",
            &["du lịch", "vé tham quan", "tour", "sim 4g", "thuê xe"],
        ),
        (
            "Uniqlo",
            "Fashion",
            &[
                "quần áo",
                "áo thun",
                "thời trang nam",
                "thời trang nữ",
                "áo khoác",
            ],
        ),
        (
            "Adidas",
            "Fashion",
            &[
                "giày thể thao",
                "sneaker",
                "đồ tập gym",
                "áo bóng đá",
                "running",
            ],
        ),
    ];

    entries
        .into_iter()
        .map(|(name, niche, keywords)| ProgramConfig {
            name: name.to_string(),
            niche: niche.to_string(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
        })
        .collect()
}

/// Load and validate a program catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_programs(path: &Path) -> Result<ProgramsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProgramsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let programs_file: ProgramsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::ProgramsFileParse)?;

    validate_programs(&programs_file.programs)?;

    Ok(programs_file)
}

fn validate_programs(programs: &[ProgramConfig]) -> Result<(), ConfigError> {
    if programs.is_empty() {
        return Err(ConfigError::Validation(
            "program catalog must not be empty".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    for program in programs {
        if program.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "program name must be non-empty".to_string(),
            ));
        }

        if program.keywords.is_empty() {
            return Err(ConfigError::Validation(format!(
                "program '{}' must list at least one keyword",
                program.name
            )));
        }

        if !seen_names.insert(program.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate program name: '{}'",
                program.name
            )));
        }
    }

    Ok(())
}
