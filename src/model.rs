// Core structs: TitleTarget, VendorPriceSnapshot, TitlePriceRecord
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A storefront we know how to scrape. Ordering is the display order
/// of the per-title vendor columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VendorId {
    Psn,
    Xbox,
    Nintendo,
    Steam,
    Gog,
}

impl VendorId {
    pub fn label(&self) -> &'static str {
        match self {
            VendorId::Psn => "PSN",
            VendorId::Xbox => "Xbox",
            VendorId::Nintendo => "Nintendo",
            VendorId::Steam => "Steam",
            VendorId::Gog => "GOG",
        }
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One tracked game plus where to look for its prices.
#[derive(Debug, Clone)]
pub struct TitleTarget {
    pub name: String,
    pub refs: VendorRefs,
}

#[derive(Debug, Clone)]
pub enum VendorRefs {
    /// Legacy form: one shared deal-aggregator page listing several vendors.
    Aggregator(String),
    /// One product page URL per tracked vendor.
    Direct(DirectRefs),
}

/// Typed per-vendor product links. `None` means the vendor is not tracked
/// for this title.
#[derive(Debug, Clone, Default)]
pub struct DirectRefs {
    pub psn: Option<String>,
    pub xbox: Option<String>,
    pub nintendo: Option<String>,
    pub steam: Option<String>,
    pub gog: Option<String>,
}

impl DirectRefs {
    /// Tracked vendors in display order.
    pub fn iter(&self) -> impl Iterator<Item = (VendorId, &str)> {
        [
            (VendorId::Psn, &self.psn),
            (VendorId::Xbox, &self.xbox),
            (VendorId::Nintendo, &self.nintendo),
            (VendorId::Steam, &self.steam),
            (VendorId::Gog, &self.gog),
        ]
        .into_iter()
        .filter_map(|(vendor, url)| url.as_deref().map(|u| (vendor, u)))
    }
}

/// What one vendor reported for one title during one pass.
///
/// When `error` is set both prices are 0.0 and mean nothing; consumers
/// must check `error` before reading them.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorPriceSnapshot {
    pub current_price: f64,
    pub base_price: f64,
    pub link: Option<String>,
    pub error: Option<String>,
}

impl VendorPriceSnapshot {
    pub fn ok(current_price: f64, base_price: f64, link: Option<String>) -> Self {
        Self {
            current_price,
            base_price,
            link,
            error: None,
        }
    }

    pub fn failed(link: Option<String>, message: impl Into<String>) -> Self {
        Self {
            current_price: 0.0,
            base_price: 0.0,
            link,
            error: Some(message.into()),
        }
    }
}

/// All vendor snapshots collected for one title during one pass.
#[derive(Debug, Clone)]
pub struct TitlePriceRecord {
    pub name: String,
    pub vendors: BTreeMap<VendorId, VendorPriceSnapshot>,
    /// Shared deal-page URL when the title came through the legacy
    /// aggregator path.
    pub aggregator_link: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl TitlePriceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendors: BTreeMap::new(),
            aggregator_link: None,
            fetched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("webdriver request failed: {0}")]
    Http(String),
    #[error("webdriver error `{error}`: {message}")]
    Driver { error: String, message: String },
    #[error("timed out after {timeout_secs}s waiting for `{selector}`")]
    WaitTimeout { selector: String, timeout_secs: u64 },
    #[error("no element matched `{0}`")]
    NoSuchElement(String),
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("age verification handling failed: {0}")]
    AgeGate(String),
    #[error("no price found on page")]
    MissingPrice,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{path}`: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed config file `{path}`: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("unknown sort strategy `{0}`")]
    UnknownSort(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("title `{0}` was already appended this pass")]
    DuplicateTitle(String),
}
