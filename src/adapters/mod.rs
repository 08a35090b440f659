// Storefront adapters: one per vendor, all speaking RawQuote.
pub mod aggregator;
pub mod console;
pub mod gog;
pub mod steam;

pub use aggregator::AggregatorAdapter;

use crate::model::{AdapterError, VendorId};
use crate::session::PageSession;
use std::time::Duration;

/// Price text as extracted from the page, before normalization. When a
/// page shows no separate base price, `base_text` repeats `current_text`
/// (no discount by construction).
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub current_text: String,
    pub base_text: String,
    /// Canonical product link when the page yields a better one than the
    /// configured reference (Steam after its redirects).
    pub link: Option<String>,
}

/// Per-vendor extraction over a loaded browser session.
#[async_trait::async_trait]
pub trait StorefrontAdapter: Send + Sync {
    fn vendor(&self) -> VendorId;

    async fn fetch(
        &self,
        session: &dyn PageSession,
        product_url: &str,
    ) -> Result<RawQuote, AdapterError>;
}

pub fn adapter_for(vendor: VendorId) -> Box<dyn StorefrontAdapter> {
    match vendor {
        VendorId::Psn => Box::new(console::PsnAdapter),
        VendorId::Xbox => Box::new(console::XboxAdapter),
        VendorId::Nintendo => Box::new(console::NintendoAdapter),
        VendorId::Steam => Box::new(steam::SteamAdapter),
        VendorId::Gog => Box::new(gog::GogAdapter),
    }
}

/// Locator rules for the plain storefront layouts: wait, then read two
/// price elements, optionally scoped to a price card.
pub(crate) struct SelectorRules {
    pub wait: &'static str,
    pub wait_timeout: Duration,
    pub price_card: Option<&'static str>,
    pub current: &'static str,
    pub base: &'static str,
}

/// Shared fetch path for rule-driven storefronts. A missing base-price
/// element is not an error: the base falls back to the current price.
pub(crate) async fn fetch_with_rules(
    session: &dyn PageSession,
    url: &str,
    rules: &SelectorRules,
) -> Result<RawQuote, AdapterError> {
    session.goto(url).await?;
    session.wait_for(rules.wait, rules.wait_timeout).await?;

    let (current_text, base_text) = match rules.price_card {
        Some(card_css) => {
            let card = session.find(card_css).await?;
            let current = card.find(rules.current).await?.text().await?;
            let base = match card.try_find(rules.base).await? {
                Some(el) => el.text().await?,
                None => current.clone(),
            };
            (current, base)
        }
        None => {
            let current = session.find(rules.current).await?.text().await?;
            let base = match session.try_find(rules.base).await? {
                Some(el) => el.text().await?,
                None => current.clone(),
            };
            (current, base)
        }
    };

    Ok(RawQuote {
        current_text,
        base_text,
        link: None,
    })
}
