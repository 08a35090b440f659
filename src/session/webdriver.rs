// W3C WebDriver client over plain HTTP + JSON (chromedriver et al).
use crate::model::SessionError;
use crate::session::{PageElement, PageSession};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// W3C element identifier key in find-element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shared wire-level state: one driver endpoint, one session id.
struct Wire {
    http: Client,
    base: String,
    session_id: String,
}

impl Wire {
    fn path(&self, tail: &str) -> String {
        format!("{}/session/{}{}", self.base, self.session_id, tail)
    }

    async fn decode(resp: reqwest::Response) -> Result<Value, SessionError> {
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        let value = body.get("value").cloned().unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(value);
        }
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Err(SessionError::Driver { error, message })
    }

    async fn get(&self, tail: &str) -> Result<Value, SessionError> {
        let resp = self
            .http
            .get(self.path(tail))
            .send()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        Self::decode(resp).await
    }

    async fn post(&self, tail: &str, body: Value) -> Result<Value, SessionError> {
        let resp = self
            .http
            .post(self.path(tail))
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        Self::decode(resp).await
    }

    fn element_id(value: &Value, selector: &str) -> Result<String, SessionError> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SessionError::NoSuchElement(selector.to_string()))
    }
}

/// Maps the driver's expected-absence error onto `NoSuchElement` so
/// `try_find` can turn it into `None`.
fn classify(err: SessionError, selector: &str) -> SessionError {
    match err {
        SessionError::Driver { ref error, .. } if error == "no such element" => {
            SessionError::NoSuchElement(selector.to_string())
        }
        other => other,
    }
}

pub struct WebDriverSession {
    wire: Arc<Wire>,
}

impl WebDriverSession {
    /// Opens a new session against a running WebDriver endpoint.
    pub async fn connect(driver_url: &str, headless: bool) -> Result<Self, SessionError> {
        let http = Client::builder()
            .build()
            .map_err(|e| SessionError::Http(e.to_string()))?;

        let mut args: Vec<&str> = Vec::new();
        if headless {
            args.push("--headless=new");
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let base = driver_url.trim_end_matches('/').to_string();
        let resp = http
            .post(format!("{}/session", base))
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        let value = Wire::decode(resp).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| SessionError::Driver {
                error: "session not created".into(),
                message: "response carried no sessionId".into(),
            })?
            .to_string();
        debug!("webdriver session {} opened at {}", session_id, base);

        Ok(Self {
            wire: Arc::new(Wire {
                http,
                base,
                session_id,
            }),
        })
    }

    /// Wraps an already-established session id, skipping the handshake.
    #[cfg(test)]
    fn stub(base: String) -> Self {
        Self {
            wire: Arc::new(Wire {
                http: Client::new(),
                base,
                session_id: "stub".into(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl PageSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        self.wire.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        let value = self.wire.get("/url").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<(), SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_all(css).await {
                Ok(elements) if !elements.is_empty() => return Ok(()),
                Ok(_) => {}
                // Drivers answer with transient faults while a page is
                // still loading; keep polling until the deadline.
                Err(SessionError::Driver { error, message }) => {
                    debug!("poll for `{}` failed: {}: {}", css, error, message);
                }
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(SessionError::WaitTimeout {
                    selector: css.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn find(&self, css: &str) -> Result<Box<dyn PageElement>, SessionError> {
        let value = self
            .wire
            .post("/element", locator(css))
            .await
            .map_err(|e| classify(e, css))?;
        let id = Wire::element_id(&value, css)?;
        Ok(Box::new(WebDriverElement {
            wire: self.wire.clone(),
            id,
        }))
    }

    async fn try_find(&self, css: &str) -> Result<Option<Box<dyn PageElement>>, SessionError> {
        match self.find(css).await {
            Ok(el) => Ok(Some(el)),
            Err(SessionError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Box<dyn PageElement>>, SessionError> {
        let value = self.wire.post("/elements", locator(css)).await?;
        collect_elements(&self.wire, value, css)
    }

    async fn close(&self) -> Result<(), SessionError> {
        let resp = self
            .wire
            .http
            .delete(self.wire.path(""))
            .send()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        Wire::decode(resp).await?;
        debug!("webdriver session {} closed", self.wire.session_id);
        Ok(())
    }
}

struct WebDriverElement {
    wire: Arc<Wire>,
    id: String,
}

impl WebDriverElement {
    fn tail(&self, rest: &str) -> String {
        format!("/element/{}{}", self.id, rest)
    }
}

#[async_trait::async_trait]
impl PageElement for WebDriverElement {
    async fn text(&self) -> Result<String, SessionError> {
        let value = self.wire.get(&self.tail("/text")).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError> {
        let value = self
            .wire
            .get(&self.tail(&format!("/attribute/{}", name)))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn click(&self) -> Result<(), SessionError> {
        self.wire.post(&self.tail("/click"), json!({})).await?;
        Ok(())
    }

    async fn find(&self, css: &str) -> Result<Box<dyn PageElement>, SessionError> {
        let value = self
            .wire
            .post(&self.tail("/element"), locator(css))
            .await
            .map_err(|e| classify(e, css))?;
        let id = Wire::element_id(&value, css)?;
        Ok(Box::new(WebDriverElement {
            wire: self.wire.clone(),
            id,
        }))
    }

    async fn try_find(&self, css: &str) -> Result<Option<Box<dyn PageElement>>, SessionError> {
        match PageElement::find(self, css).await {
            Ok(el) => Ok(Some(el)),
            Err(SessionError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Box<dyn PageElement>>, SessionError> {
        let value = self.wire.post(&self.tail("/elements"), locator(css)).await?;
        collect_elements(&self.wire, value, css)
    }
}

fn locator(css: &str) -> Value {
    json!({ "using": "css selector", "value": css })
}

fn collect_elements(
    wire: &Arc<Wire>,
    value: Value,
    selector: &str,
) -> Result<Vec<Box<dyn PageElement>>, SessionError> {
    let items = value.as_array().cloned().unwrap_or_default();
    let mut out: Vec<Box<dyn PageElement>> = Vec::with_capacity(items.len());
    for item in &items {
        let id = Wire::element_id(item, selector)?;
        out.push(Box::new(WebDriverElement {
            wire: wire.clone(),
            id,
        }));
    }
    Ok(out)
}
