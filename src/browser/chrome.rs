use crate::core::{BrowserConfig, WebDriverTrait};
use crate::errors::DriverError;
use crate::types::Selector;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Runtime::RemoteObjectSubtype;
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const IS_DISPLAYED_JS: &str = r#"
    function() {
        const style = window.getComputedStyle(this);
        if (style.visibility === 'hidden' || style.display === 'none') return false;
        return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length);
    }
"#;

const IS_ENABLED_JS: &str = "function() { return !this.disabled; }";

const CLEAR_JS: &str = r#"
    function() {
        if ('value' in this) {
            this.value = '';
        } else if (this.isContentEditable) {
            this.textContent = '';
        }
        this.dispatchEvent(new Event('input', { bubbles: true }));
        this.dispatchEvent(new Event('change', { bubbles: true }));
    }
"#;

/// Expression that yields the first node matching `selector`, or `null`.
///
/// XPath goes through `document.evaluate` so that only a real XPath match
/// counts; a malformed expression throws.
fn lookup_script(selector: &Selector) -> String {
    let query = serde_json::Value::String(selector.as_str().to_string());
    match selector {
        Selector::XPath(_) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            query
        ),
        Selector::Css(_) => format!("document.querySelector({})", query),
    }
}

/// Handle to a DOM node in the driver's tab.
///
/// Keyed by backend node id, which stays valid for as long as the node
/// lives, unlike frontend node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeElement {
    backend_node_id: DOM::BackendNodeId,
}

/// [`WebDriverTrait`] over a single headless_chrome tab.
pub struct ChromeDriver {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(config: &BrowserConfig) -> Result<Self, DriverError> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );

        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }

        if config.disable_images {
            args.push(OsStr::new("--blink-settings=imagesEnabled=false"));
        }

        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .idle_browser_timeout(Duration::from_millis(config.timeout_ms))
            .args(args)
            .build()
            .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| DriverError::LaunchFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| DriverError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched (headless: {})", config.headless);
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    pub fn title(&self) -> Result<String, DriverError> {
        let result = self
            .tab
            .evaluate("document.title", false)
            .map_err(|e| DriverError::JavaScriptFailed(e.to_string()))?;
        Ok(result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string())
    }

    /// Rebind a handle to its node; a node that left the DOM is stale.
    fn element(&self, handle: &ChromeElement) -> Result<Element<'_>, DriverError> {
        self.tab
            .get_document()
            .map_err(|_| DriverError::StaleElement)?;
        let node_id = self
            .tab
            .call_method(DOM::PushNodesByBackendIdsToFrontend {
                backend_node_ids: vec![handle.backend_node_id],
            })
            .map_err(|_| DriverError::StaleElement)?
            .node_ids
            .first()
            .copied()
            .unwrap_or(0);
        Element::new(&self.tab, node_id).map_err(|_| DriverError::StaleElement)
    }

    fn call_bool(&self, handle: &ChromeElement, function: &str) -> Result<bool, DriverError> {
        let element = self.element(handle)?;
        let result = element
            .call_js_fn(function, vec![], false)
            .map_err(|e| DriverError::JavaScriptFailed(e.to_string()))?;
        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

#[async_trait]
impl WebDriverTrait for ChromeDriver {
    type Element = ChromeElement;

    async fn open(&self, url: &str) -> Result<(), DriverError> {
        url::Url::parse(url).map_err(|e| DriverError::NavigationFailed(e.to_string()))?;

        self.tab
            .navigate_to(url)
            .map_err(|e| DriverError::NavigationFailed(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| DriverError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    async fn find_one(&self, selector: &Selector) -> Result<Self::Element, DriverError> {
        let object = self
            .tab
            .evaluate(&lookup_script(selector), false)
            .map_err(|e| DriverError::JavaScriptFailed(format!("{}: {}", selector, e)))?;

        match object.subtype {
            Some(RemoteObjectSubtype::Node) => {}
            Some(RemoteObjectSubtype::Error) => {
                return Err(DriverError::JavaScriptFailed(format!(
                    "invalid selector {}: {}",
                    selector,
                    object.description.unwrap_or_default()
                )))
            }
            _ => return Err(DriverError::NoSuchElement(selector.to_string())),
        }
        let object_id = object
            .object_id
            .ok_or_else(|| DriverError::NoSuchElement(selector.to_string()))?;

        self.tab
            .get_document()
            .map_err(|e| DriverError::JavaScriptFailed(e.to_string()))?;
        let node_id = self
            .tab
            .call_method(DOM::RequestNode { object_id })
            .map_err(|_| DriverError::StaleElement)?
            .node_id;
        let element = Element::new(&self.tab, node_id).map_err(|_| DriverError::StaleElement)?;

        Ok(ChromeElement {
            backend_node_id: element.backend_node_id,
        })
    }

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, DriverError> {
        self.call_bool(element, IS_DISPLAYED_JS)
    }

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, DriverError> {
        self.call_bool(element, IS_ENABLED_JS)
    }

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError> {
        self.element(element)?
            .click()
            .map_err(|e| DriverError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self, element: &Self::Element) -> Result<(), DriverError> {
        self.element(element)?
            .call_js_fn(CLEAR_JS, vec![], false)
            .map_err(|e| DriverError::JavaScriptFailed(e.to_string()))?;
        Ok(())
    }

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), DriverError> {
        self.element(element)?
            .type_into(text)
            .map_err(|e| DriverError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn get_text(&self, element: &Self::Element) -> Result<String, DriverError> {
        self.element(element)?
            .get_inner_text()
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }
}
