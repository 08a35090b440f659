// Legacy deal-aggregator page: one shared page, one row per vendor.
use crate::adapters::RawQuote;
use crate::model::{AdapterError, VendorId};
use crate::normalizer;
use crate::session::PageSession;
use std::time::Duration;

/// The aggregator lists every storefront's offer for a title on a single
/// page, so this adapter yields several vendor quotes per fetch instead
/// of one.
pub struct AggregatorAdapter;

impl AggregatorAdapter {
    /// Scans the offer rows and returns a quote per recognized vendor.
    /// Row text leads with the vendor label; the second price substring
    /// in a row is the current price, the third the base.
    pub async fn fetch_rows(
        &self,
        session: &dyn PageSession,
        page_url: &str,
    ) -> Result<Vec<(VendorId, RawQuote)>, AdapterError> {
        session.goto(page_url).await?;
        session
            .wait_for(".svelte-1l4u06e", Duration::from_secs(60))
            .await?;

        let mut quotes = Vec::new();
        for row in session.find_all(".row").await? {
            let text = row.text().await?;
            let vendor = if text.starts_with("Steam\n") {
                VendorId::Steam
            } else if text.starts_with("GOG\n") {
                VendorId::Gog
            } else {
                continue;
            };

            let prices = normalizer::extract_price_texts(&text);
            let current_text = prices
                .get(1)
                .or_else(|| prices.first())
                .cloned()
                .unwrap_or_default();
            let base_text = prices.get(2).cloned().unwrap_or_else(|| current_text.clone());
            let link = row.attr("href").await?;

            quotes.push((
                vendor,
                RawQuote {
                    current_text,
                    base_text,
                    link,
                },
            ));
        }
        Ok(quotes)
    }
}
