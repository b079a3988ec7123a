use crate::{
    browser::config::LaunchOptions,
    driver::Stage,
    error::{InvoiceError, Result},
    invoice::TypingPace,
};
use headless_chrome::{Browser, Element, Tab};
use rand::Rng;
use std::{ffi::OsStr, sync::Arc, thread, time::Duration};

/// Browser session owning the Chrome instance used to drive the portal.
///
/// The session is the sole shared mutable resource of the run: the driver
/// owns it exclusively and every step executes sequentially against it.
pub struct PortalSession {
    browser: Browser,
}

impl PortalSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // A full run over many invoice chunks can take a while; raise the
        // idle timeout well above headless_chrome's 30 second default.
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| InvoiceError::LaunchFailed(e.to_string()))?;

        browser
            .new_tab()
            .map_err(|e| InvoiceError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser })
    }

    /// Get all tabs
    pub fn tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| InvoiceError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the tab created at launch
    pub fn first_tab(&self) -> Result<Arc<Tab>> {
        self.tabs()?
            .into_iter()
            .next()
            .ok_or_else(|| InvoiceError::TabOperationFailed("No open tabs".to_string()))
    }

    /// Get the most recently opened tab and bring it to the front.
    ///
    /// The portal spawns the invoice generator in a new tab; all submissions
    /// happen there.
    pub fn newest_tab(&self) -> Result<Arc<Tab>> {
        let tab = self
            .tabs()?
            .into_iter()
            .last()
            .ok_or_else(|| InvoiceError::TabOperationFailed("No open tabs".to_string()))?;

        tab.activate()
            .map_err(|e| InvoiceError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;

        Ok(tab)
    }

    /// Navigate the given tab to a URL
    pub fn navigate(&self, tab: &Arc<Tab>, url: &str, stage: Stage) -> Result<()> {
        tab.navigate_to(url).map_err(|e| InvoiceError::Navigation {
            stage,
            reason: format!("Failed to navigate to {}: {}", url, e),
        })?;

        Ok(())
    }

    /// Block until the tab's pending navigation settles.
    ///
    /// Form field identifiers are only valid on the settled page, so every
    /// navigation-triggering action must be followed by this call before the
    /// next step runs.
    pub fn wait_for_navigation(&self, tab: &Arc<Tab>, stage: Stage) -> Result<()> {
        tab.wait_until_navigated().map_err(|e| InvoiceError::Navigation {
            stage,
            reason: format!("Navigation did not settle: {}", e),
        })?;

        Ok(())
    }

    /// Find an element by CSS selector on the given tab
    pub fn find_element<'a>(&self, tab: &'a Arc<Tab>, selector: &str, stage: Stage) -> Result<Element<'a>> {
        tab.find_element(selector).map_err(|e| InvoiceError::ElementNotFound {
            stage,
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    }

    /// Wait for an element to appear, then return it
    pub fn wait_for_element<'a>(&self, tab: &'a Arc<Tab>, selector: &str, stage: Stage) -> Result<Element<'a>> {
        tab.wait_for_element(selector).map_err(|e| InvoiceError::ElementNotFound {
            stage,
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    }

    /// Check whether an element is currently present, without erroring
    pub fn element_exists(&self, tab: &Arc<Tab>, selector: &str) -> bool {
        tab.find_element(selector).is_ok()
    }

    /// Click the element matched by a CSS selector
    pub fn click(&self, tab: &Arc<Tab>, selector: &str, stage: Stage) -> Result<()> {
        self.find_element(tab, selector, stage)?
            .click()
            .map_err(|e| InvoiceError::Navigation {
                stage,
                reason: format!("Failed to click '{}': {}", selector, e),
            })?;

        Ok(())
    }

    /// Click the element matched by an XPath expression.
    ///
    /// Used for the portal's text-labelled menu links, which carry no stable
    /// id or class.
    pub fn click_xpath(&self, tab: &Arc<Tab>, xpath: &str, stage: Stage) -> Result<()> {
        let element = tab
            .find_element_by_xpath(xpath)
            .map_err(|e| InvoiceError::ElementNotFound {
                stage,
                selector: xpath.to_string(),
                reason: e.to_string(),
            })?;

        element.click().map_err(|e| InvoiceError::Navigation {
            stage,
            reason: format!("Failed to click '{}': {}", xpath, e),
        })?;

        Ok(())
    }

    /// Type text into the input matched by a CSS selector.
    ///
    /// `TypingPace::Human` sends one keystroke at a time with a jittered
    /// delay to mimic human input pacing; `TypingPace::Fast` types the whole
    /// string at once. The pacing has no semantic effect on the outcome.
    pub fn type_text(&self, tab: &Arc<Tab>, selector: &str, text: &str, pace: TypingPace, stage: Stage) -> Result<()> {
        let element = self.find_element(tab, selector, stage)?;

        // Focus the field first
        element.click().map_err(|e| InvoiceError::Navigation {
            stage,
            reason: format!("Failed to focus '{}': {}", selector, e),
        })?;

        match pace {
            TypingPace::Fast => {
                element.type_into(text).map_err(|e| InvoiceError::Navigation {
                    stage,
                    reason: format!("Failed to type into '{}': {}", selector, e),
                })?;
            }
            TypingPace::Human => {
                let mut rng = rand::thread_rng();
                let mut buf = [0u8; 4];
                for ch in text.chars() {
                    tab.send_character(ch.encode_utf8(&mut buf))
                        .map_err(|e| InvoiceError::Navigation {
                            stage,
                            reason: format!("Failed to type into '{}': {}", selector, e),
                        })?;
                    thread::sleep(Duration::from_millis(rng.gen_range(45..=75)));
                }
            }
        }

        Ok(())
    }

    /// Select a `<select>` option by its value attribute and fire a change
    /// event, the way a user picking it would
    pub fn select_value(&self, tab: &Arc<Tab>, selector: &str, value: &str, stage: Stage) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                el.value = {value};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = serde_json::to_string(selector).unwrap_or_default(),
            value = serde_json::to_string(value).unwrap_or_default(),
        );
        self.evaluate_bool(tab, &js, selector, stage)
    }

    /// Select a `<select>` option by position and fire a change event
    pub fn select_option_index(&self, tab: &Arc<Tab>, selector: &str, index: usize, stage: Stage) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el || el.options.length <= {index}) return false;
                el.selectedIndex = {index};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = serde_json::to_string(selector).unwrap_or_default(),
            index = index,
        );
        self.evaluate_bool(tab, &js, selector, stage)
    }

    /// Make the next `window.confirm` on this page return true.
    ///
    /// Armed explicitly right before the click that raises the confirmation
    /// dialog, so there is no race between listener registration and dialog
    /// appearance.
    pub fn arm_confirm_dialog(&self, tab: &Arc<Tab>, stage: Stage) -> Result<()> {
        tab.evaluate("window.confirm = () => true;", false)
            .map_err(|e| InvoiceError::Navigation {
                stage,
                reason: format!("Failed to arm confirm dialog: {}", e),
            })?;

        Ok(())
    }

    fn evaluate_bool(&self, tab: &Arc<Tab>, js: &str, selector: &str, stage: Stage) -> Result<()> {
        let result = tab.evaluate(js, false).map_err(|e| InvoiceError::Navigation {
            stage,
            reason: format!("Script evaluation failed: {}", e),
        })?;

        let found = result.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false);
        if !found {
            return Err(InvoiceError::ElementNotFound {
                stage,
                selector: selector.to_string(),
                reason: "querySelector returned nothing".to_string(),
            });
        }

        Ok(())
    }

    /// Close the browser by closing every tab; the Chrome process exits when
    /// the Browser instance is dropped
    pub fn close(&self) -> Result<()> {
        let tabs = self.tabs()?;
        for tab in tabs {
            let _ = tab.close(false); // Ignore errors on individual tab closes
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::config::LaunchOptions;

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new().headless(true).window_size(800, 600);

        assert!(opts.headless);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
    }

    #[test]
    fn test_launch_options_default_is_headed() {
        let opts = LaunchOptions::default();

        assert!(!opts.headless);
        assert!(opts.sandbox);
    }

    // Integration tests (require Chrome to be installed)
    #[test]
    #[ignore] // Ignore by default, run with: cargo test -- --ignored
    fn test_launch_browser() {
        let result = PortalSession::launch(LaunchOptions::new().headless(true));
        assert!(result.is_ok());
    }

    #[test]
    #[ignore]
    fn test_first_tab() {
        let session =
            PortalSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        let tab = session.first_tab();
        assert!(tab.is_ok());
    }

    #[test]
    #[ignore]
    fn test_select_value_missing_element() {
        let session =
            PortalSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        let tab = session.first_tab().expect("Failed to get tab");
        session
            .navigate(&tab, "about:blank", Stage::PointOfSale)
            .expect("Failed to navigate");

        let result = session.select_value(&tab, "#does-not-exist", "1", Stage::PointOfSale);
        assert!(matches!(result, Err(InvoiceError::ElementNotFound { .. })));
    }
}
