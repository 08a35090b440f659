// Console storefronts: PSN, Xbox, Nintendo.
use crate::adapters::{RawQuote, SelectorRules, StorefrontAdapter, fetch_with_rules};
use crate::model::{AdapterError, VendorId};
use crate::normalizer;
use crate::session::PageSession;
use std::time::Duration;

const CONSOLE_WAIT: Duration = Duration::from_secs(20);

/// PSN renders several title-sized spans inside the price card; only one
/// of them is the price, so the adapter scans for the first span whose
/// text looks like one.
pub struct PsnAdapter;

#[async_trait::async_trait]
impl StorefrontAdapter for PsnAdapter {
    fn vendor(&self) -> VendorId {
        VendorId::Psn
    }

    async fn fetch(
        &self,
        session: &dyn PageSession,
        product_url: &str,
    ) -> Result<RawQuote, AdapterError> {
        session.goto(product_url).await?;
        session.wait_for("div.psw-fill-x", CONSOLE_WAIT).await?;

        let card = session.find(".psw-c-bg-card-1").await?;

        let mut current_text: Option<String> = None;
        for span in card.find_all("span.psw-t-title-m").await? {
            let text = span.text().await?;
            let is_price = normalizer::extract_price_text(&text).is_some();
            current_text = Some(text);
            if is_price {
                break;
            }
        }
        let current_text = current_text.ok_or(AdapterError::MissingPrice)?;

        let base_text = match card.try_find("span.psw-t-title-s").await? {
            Some(el) => el.text().await?,
            None => current_text.clone(),
        };

        Ok(RawQuote {
            current_text,
            base_text,
            link: None,
        })
    }
}

pub struct XboxAdapter;

#[async_trait::async_trait]
impl StorefrontAdapter for XboxAdapter {
    fn vendor(&self) -> VendorId {
        VendorId::Xbox
    }

    async fn fetch(
        &self,
        session: &dyn PageSession,
        product_url: &str,
    ) -> Result<RawQuote, AdapterError> {
        fetch_with_rules(
            session,
            product_url,
            &SelectorRules {
                wait: ".CommonButtonStyles-module__variableLineDesktopButton___cxDyV",
                wait_timeout: CONSOLE_WAIT,
                price_card: None,
                current: ".Price-module__boldText___1i2Li",
                base: ".Price-module__brandOriginalPrice___ayJAn",
            },
        )
        .await
    }
}

pub struct NintendoAdapter;

#[async_trait::async_trait]
impl StorefrontAdapter for NintendoAdapter {
    fn vendor(&self) -> VendorId {
        VendorId::Nintendo
    }

    async fn fetch(
        &self,
        session: &dyn PageSession,
        product_url: &str,
    ) -> Result<RawQuote, AdapterError> {
        // The discounted price reuses the wait selector; the base price
        // only renders while a discount is active.
        fetch_with_rules(
            session,
            product_url,
            &SelectorRules {
                wait: ".W990N",
                wait_timeout: CONSOLE_WAIT,
                price_card: None,
                current: ".W990N",
                base: ".o2BsP",
            },
        )
        .await
    }
}
