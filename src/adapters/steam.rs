// Steam: age gate bypass, coming-soon short circuit, layered price layout.
use crate::adapters::{RawQuote, StorefrontAdapter};
use crate::model::{AdapterError, SessionError, VendorId};
use crate::session::{PageElement, PageSession};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const WAIT: Duration = Duration::from_secs(10);
/// Steam swaps the page in place after the age gate; give it a moment.
const AGE_GATE_SETTLE: Duration = Duration::from_secs(2);

pub struct SteamAdapter;

#[async_trait::async_trait]
impl StorefrontAdapter for SteamAdapter {
    fn vendor(&self) -> VendorId {
        VendorId::Steam
    }

    async fn fetch(
        &self,
        session: &dyn PageSession,
        product_url: &str,
    ) -> Result<RawQuote, AdapterError> {
        session.goto(product_url).await?;

        if session.current_url().await?.contains("agecheck") {
            debug!("steam age check hit for {}", product_url);
            bypass_age_gate(session)
                .await
                .map_err(|e| AdapterError::AgeGate(e.to_string()))?;
        }

        session.wait_for(".breadcrumbs", WAIT).await?;
        let link = Some(session.current_url().await?);

        // Unreleased titles have no purchase area at all.
        if session.try_find(".game_area_comingsoon").await?.is_some() {
            return Ok(zero_quote(link));
        }

        let Some(purchase) = valid_purchase_area(session).await? else {
            return Ok(zero_quote(link));
        };

        let (current_text, base_text) = match purchase.try_find(".discount_final_price").await? {
            Some(current) => {
                let current_text = current.text().await?;
                let base_text = match purchase.try_find(".discount_original_price").await? {
                    Some(base) => base.text().await?,
                    None => current_text.clone(),
                };
                (current_text, base_text)
            }
            None => {
                let text = purchase.find(".game_purchase_price").await?.text().await?;
                (text.clone(), text)
            }
        };

        Ok(RawQuote {
            current_text,
            base_text,
            link,
        })
    }
}

/// Picks a birth year and submits the age form.
async fn bypass_age_gate(session: &dyn PageSession) -> Result<(), SessionError> {
    session.wait_for("#ageYear", WAIT).await?;
    session.find("#ageYear").await?.click().await?;
    session.find("option[value='1990']").await?.click().await?;
    session.find("#view_product_page_btn").await?.click().await?;
    sleep(AGE_GATE_SETTLE).await;
    Ok(())
}

/// First purchase block that actually carries a price. Pages list one
/// block per edition and some blocks only hold a "add to wishlist" form.
async fn valid_purchase_area(
    session: &dyn PageSession,
) -> Result<Option<Box<dyn PageElement>>, SessionError> {
    for area in session.find_all(".game_purchase_action_bg").await? {
        if area.try_find(".discount_final_price").await?.is_some()
            || area.try_find(".game_purchase_price").await?.is_some()
        {
            return Ok(Some(area));
        }
    }
    Ok(None)
}

fn zero_quote(link: Option<String>) -> RawQuote {
    RawQuote {
        current_text: "0,00".into(),
        base_text: "0,00".into(),
        link,
    }
}
