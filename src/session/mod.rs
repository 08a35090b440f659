// Browser session abstraction: the adapters only see these traits.
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

use crate::model::SessionError;
use std::time::Duration;

pub use webdriver::WebDriverSession;

/// A live browser tab, driven by CSS locators.
///
/// `try_find` is the expected-absence primitive: a missing element is
/// `Ok(None)`, not an error. Errors are reserved for timeouts, transport
/// failures and driver-level faults.
#[async_trait::async_trait]
pub trait PageSession: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), SessionError>;

    /// URL after any redirects (Steam rewrites to the age-check page).
    async fn current_url(&self) -> Result<String, SessionError>;

    /// Polls until at least one element matches, or fails with
    /// [`SessionError::WaitTimeout`].
    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<(), SessionError>;

    async fn find(&self, css: &str) -> Result<Box<dyn PageElement>, SessionError>;

    async fn try_find(&self, css: &str) -> Result<Option<Box<dyn PageElement>>, SessionError>;

    async fn find_all(&self, css: &str) -> Result<Vec<Box<dyn PageElement>>, SessionError>;

    /// Ends the browser session. Called on every pass exit path.
    async fn close(&self) -> Result<(), SessionError>;
}

/// A DOM element handle scoped to its session.
#[async_trait::async_trait]
pub trait PageElement: Send + Sync {
    async fn text(&self) -> Result<String, SessionError>;

    async fn attr(&self, name: &str) -> Result<Option<String>, SessionError>;

    async fn click(&self) -> Result<(), SessionError>;

    async fn find(&self, css: &str) -> Result<Box<dyn PageElement>, SessionError>;

    async fn try_find(&self, css: &str) -> Result<Option<Box<dyn PageElement>>, SessionError>;

    async fn find_all(&self, css: &str) -> Result<Vec<Box<dyn PageElement>>, SessionError>;
}
