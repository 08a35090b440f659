// GOG: straightforward two-selector layout.
use crate::adapters::{RawQuote, SelectorRules, StorefrontAdapter, fetch_with_rules};
use crate::model::{AdapterError, VendorId};
use crate::session::PageSession;
use std::time::Duration;

pub struct GogAdapter;

#[async_trait::async_trait]
impl StorefrontAdapter for GogAdapter {
    fn vendor(&self) -> VendorId {
        VendorId::Gog
    }

    async fn fetch(
        &self,
        session: &dyn PageSession,
        product_url: &str,
    ) -> Result<RawQuote, AdapterError> {
        // The base-amount element disappears outside of sales.
        fetch_with_rules(
            session,
            product_url,
            &SelectorRules {
                wait: ".product-actions-price__final-amount",
                wait_timeout: Duration::from_secs(10),
                price_card: None,
                current: ".product-actions-price__final-amount",
                base: ".product-actions-price__base-amount",
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{MockElement, MockPage, MockSession};

    const URL: &str = "https://store.example/game/x";

    #[tokio::test]
    async fn reads_sale_prices() {
        let session = MockSession::new().page(
            URL,
            MockPage::new()
                .with(
                    ".product-actions-price__final-amount",
                    MockElement::with_text("10.49"),
                )
                .with(
                    ".product-actions-price__base-amount",
                    MockElement::with_text("69.99"),
                ),
        );

        let quote = GogAdapter.fetch(&session, URL).await.unwrap();
        assert_eq!(quote.current_text, "10.49");
        assert_eq!(quote.base_text, "69.99");
    }

    #[tokio::test]
    async fn base_falls_back_to_current_outside_sales() {
        let session = MockSession::new().page(
            URL,
            MockPage::new().with(
                ".product-actions-price__final-amount",
                MockElement::with_text("69.99"),
            ),
        );

        let quote = GogAdapter.fetch(&session, URL).await.unwrap();
        assert_eq!(quote.base_text, "69.99");
    }
}
