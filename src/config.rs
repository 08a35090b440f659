use crate::model::{ConfigError, DirectRefs, TitleTarget, VendorRefs};
use crate::store::SortStrategy;
use serde::Deserialize;
use serde_json::Value;
use std::fs;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Runtime configuration, read once at startup and never written back.
#[derive(Debug)]
pub struct AppConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub sort: SortStrategy,
    pub discounted_only: bool,
    /// Tracked titles, in the order the file lists them.
    pub titles: Vec<TitleTarget>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_webdriver_url")]
    webdriver_url: String,
    #[serde(default = "default_headless")]
    headless: bool,
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    discounted_only: bool,
    /// Ordered: serde_json's preserve_order keeps the file order, which
    /// is the pass's arrival order.
    games_to_check: serde_json::Map<String, Value>,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_headless() -> bool {
    true
}

/// A title's value is either the legacy shared aggregator URL (bare
/// string) or a record of per-vendor product links.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRefs {
    Aggregator(String),
    Direct(RawDirect),
}

#[derive(Debug, Deserialize, Default)]
struct RawDirect {
    #[serde(default)]
    psn_site: Option<String>,
    #[serde(default)]
    xbox_site: Option<String>,
    #[serde(default)]
    nintendo_site: Option<String>,
    #[serde(default)]
    steam_site: Option<String>,
    #[serde(default)]
    gog_site: Option<String>,
}

/// Empty or blank URLs are the "not tracked" sentinel the config editor
/// writes for cleared fields.
fn tracked(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_config(path, &content)
}

fn parse_config(path: &str, content: &str) -> Result<AppConfig, ConfigError> {
    let raw: RawConfig = serde_json::from_str(content).map_err(|source| ConfigError::Json {
        path: path.to_string(),
        source,
    })?;

    let sort = match raw.sort.as_deref() {
        None | Some("saved-order") => SortStrategy::SavedOrder,
        Some("price-ascending") => SortStrategy::CurrentPriceAscending,
        Some("discount-descending") => SortStrategy::DiscountPercentDescending,
        Some(other) => return Err(ConfigError::UnknownSort(other.to_string())),
    };

    let mut titles = Vec::with_capacity(raw.games_to_check.len());
    for (name, value) in raw.games_to_check {
        let refs: RawRefs =
            serde_json::from_value(value).map_err(|source| ConfigError::Json {
                path: path.to_string(),
                source,
            })?;
        let refs = match refs {
            RawRefs::Aggregator(url) => VendorRefs::Aggregator(url),
            RawRefs::Direct(d) => VendorRefs::Direct(DirectRefs {
                psn: tracked(d.psn_site),
                xbox: tracked(d.xbox_site),
                nintendo: tracked(d.nintendo_site),
                steam: tracked(d.steam_site),
                gog: tracked(d.gog_site),
            }),
        };
        titles.push(TitleTarget { name, refs });
    }

    Ok(AppConfig {
        webdriver_url: raw.webdriver_url,
        headless: raw.headless,
        sort,
        discounted_only: raw.discounted_only,
        titles,
    })
}
