// Scripted in-memory session used by adapter and orchestrator tests.
use crate::model::SessionError;
use crate::session::{PageElement, PageSession};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One scripted DOM node. Children are keyed by the selector used to
/// reach them.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub children: HashMap<String, Vec<MockElement>>,
}

impl MockElement {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, el: MockElement) -> Self {
        self.children
            .entry(selector.to_string())
            .or_default()
            .push(el);
        self
    }
}

/// One scripted page: selector -> matching elements. `url_override`
/// models a redirect observed after navigation (Steam's age check).
#[derive(Debug, Clone, Default)]
pub(crate) struct MockPage {
    pub url_override: Option<String>,
    pub elements: HashMap<String, Vec<MockElement>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects_to(mut self, url: &str) -> Self {
        self.url_override = Some(url.to_string());
        self
    }

    pub fn with(mut self, selector: &str, el: MockElement) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(el);
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    current_page: MockPage,
}

/// Scripted [`PageSession`]. Unregistered URLs land on an empty page, so
/// any wait against them times out immediately.
pub(crate) struct MockSession {
    pages: HashMap<String, MockPage>,
    state: Mutex<MockState>,
    closed: Arc<AtomicBool>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            state: Mutex::new(MockState::default()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn page(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

#[async_trait::async_trait]
impl PageSession for MockSession {
    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        let page = self.pages.get(url).cloned().unwrap_or_default();
        let mut state = self.state.lock().await;
        state.current_url = page
            .url_override
            .clone()
            .unwrap_or_else(|| url.to_string());
        state.current_page = page;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.state.lock().await.current_url.clone())
    }

    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<(), SessionError> {
        // Scripted pages never change, so an absent selector fails the
        // wait without burning real time.
        let state = self.state.lock().await;
        match state.current_page.elements.get(css) {
            Some(els) if !els.is_empty() => Ok(()),
            _ => Err(SessionError::WaitTimeout {
                selector: css.to_string(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    async fn find(&self, css: &str) -> Result<Box<dyn PageElement>, SessionError> {
        self.try_find(css)
            .await?
            .ok_or_else(|| SessionError::NoSuchElement(css.to_string()))
    }

    async fn try_find(&self, css: &str) -> Result<Option<Box<dyn PageElement>>, SessionError> {
        let state = self.state.lock().await;
        Ok(state
            .current_page
            .elements
            .get(css)
            .and_then(|els| els.first())
            .cloned()
            .map(|el| Box::new(el) as Box<dyn PageElement>))
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Box<dyn PageElement>>, SessionError> {
        let state = self.state.lock().await;
        Ok(state
            .current_page
            .elements
            .get(css)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|el| Box::new(el) as Box<dyn PageElement>)
            .collect())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageElement for MockElement {
    async fn text(&self) -> Result<String, SessionError> {
        Ok(self.text.clone())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn click(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn find(&self, css: &str) -> Result<Box<dyn PageElement>, SessionError> {
        PageElement::try_find(self, css)
            .await?
            .ok_or_else(|| SessionError::NoSuchElement(css.to_string()))
    }

    async fn try_find(&self, css: &str) -> Result<Option<Box<dyn PageElement>>, SessionError> {
        Ok(self
            .children
            .get(css)
            .and_then(|els| els.first())
            .cloned()
            .map(|el| Box::new(el) as Box<dyn PageElement>))
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Box<dyn PageElement>>, SessionError> {
        Ok(self
            .children
            .get(css)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|el| Box::new(el) as Box<dyn PageElement>)
            .collect())
    }
}
