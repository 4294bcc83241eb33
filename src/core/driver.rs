use crate::errors::DriverError;
use crate::types::Selector;
use async_trait::async_trait;

/// The browser capability the resolver drives.
///
/// Implementations answer single, non-waiting lookups; polling and retrying
/// are layered on top by [`crate::ElementResolver`]. An element handle that
/// outlives its DOM node must surface as [`DriverError::StaleElement`].
#[async_trait]
pub trait WebDriverTrait: Send + Sync {
    type Element: Clone + Send + Sync;

    /// Navigate the session to a URL
    async fn open(&self, url: &str) -> Result<(), DriverError>;

    /// Look up the first element matching `selector`
    async fn find_one(&self, selector: &Selector) -> Result<Self::Element, DriverError>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Empty an editable element
    async fn clear(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    /// Rendered text of the element
    async fn get_text(&self, element: &Self::Element) -> Result<String, DriverError>;
}
