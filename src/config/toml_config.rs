use crate::adapters::webhook::WebhookSettings;
use crate::core::listing::{ListingQuery, SortMode};
use crate::domain::model::Money;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_positive_number, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_seed_path")]
    pub seed_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Upper end of the default price band, in minor units.
    #[serde(default = "default_price_ceiling")]
    pub price_ceiling: u64,
    #[serde(default = "default_max_delivery_days")]
    pub max_delivery_days: u32,
    #[serde(default)]
    pub default_sort: SortMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

fn default_seed_path() -> String {
    "data/marketplace.json".to_string()
}

fn default_price_ceiling() -> u64 {
    200_000
}

fn default_max_delivery_days() -> u32 {
    30
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed_path: default_seed_path(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            price_ceiling: default_price_ceiling(),
            max_delivery_days: default_max_delivery_days(),
            default_sort: SortMode::default(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MarketError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WEBHOOK_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MarketError::Config {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("data.seed_path", &self.data.seed_path)?;
        validate_file_extension("data.seed_path", &self.data.seed_path, &["json"])?;

        validate_positive_number(
            "listing.max_delivery_days",
            u64::from(self.listing.max_delivery_days),
            1,
        )?;

        if let Some(webhook) = self.webhook.as_ref().filter(|w| w.enabled) {
            let url = validate_required_field("webhook.url", &webhook.url)?;
            validate_url("webhook.url", url)?;
            if let Some(timeout) = webhook.timeout_seconds {
                validate_positive_number("webhook.timeout_seconds", timeout, 1)?;
            }
            if let Some(capacity) = webhook.queue_capacity {
                validate_positive_number("webhook.queue_capacity", capacity as u64, 1)?;
            }
        }

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(MarketError::InvalidConfigValue {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// 取得 webhook 設定；未啟用時為 None
    pub fn webhook_settings(&self) -> Option<WebhookSettings> {
        let webhook = self.webhook.as_ref().filter(|w| w.enabled)?;
        Some(WebhookSettings {
            url: webhook.url.clone()?,
            timeout: Duration::from_secs(webhook.timeout_seconds.unwrap_or(10)),
            queue_capacity: webhook.queue_capacity.unwrap_or(256),
        })
    }

    /// 瀏覽頁預設條件：價格 [0, 上限]、交期上限、預設排序
    pub fn default_query(&self) -> ListingQuery {
        ListingQuery::new()
            .priced_between(Money::ZERO, Money::from_minor(self.listing.price_ceiling))
            .delivered_within(self.listing.max_delivery_days)
            .sorted_by(self.listing.default_sort)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
