use miette::{Context, IntoDiagnostic, Result};
use thirtyfour::{
    error::WebDriverError, By, ChromiumLikeCapabilities, Cookie, DesiredCapabilities, Key,
    WebDriver, WebElement,
};
use tokio::runtime::Runtime;
use tracing::debug;

use super::{Clicked, Page, Selector, StoredCookie};

/// A Chrome page driven through a WebDriver server (e.g. `chromedriver`).
///
/// The driver is asynchronous, each call is run to completion on a runtime owned by the page.
pub struct WebDriverPage {
    runtime: Runtime,
    driver: WebDriver,
}

impl WebDriverPage {
    /// Start a new browser session on the WebDriver server
    pub fn connect(server_url: &str, headless: bool) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .into_diagnostic()
            .wrap_err("Could not start the async runtime")?;

        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--no-first-run").into_diagnostic()?;
        caps.add_arg("--no-service-autorun").into_diagnostic()?;
        if headless {
            caps.set_headless().into_diagnostic()?;
        }

        debug!("Connecting to the WebDriver server at {server_url}");
        let driver = runtime
            .block_on(WebDriver::new(server_url, caps))
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not start a browser through {server_url}"))?;

        Ok(Self { runtime, driver })
    }
}

fn by(selector: Selector<'_>) -> By {
    match selector {
        Selector::Id(id) => By::Id(id),
        Selector::Tag(tag) => By::Tag(tag),
        Selector::Class(class) => By::ClassName(class),
    }
}

/// The key used with `A` to select all text
fn select_modifier() -> Key {
    if cfg!(target_os = "macos") {
        Key::Command
    } else {
        Key::Control
    }
}

impl Page for WebDriverPage {
    type Element = WebElement;

    fn goto(&self, url: &str) -> Result<()> {
        debug!("Opening {url}");
        self.runtime
            .block_on(self.driver.goto(url))
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not open {url}"))
    }

    fn find_all(&self, selector: Selector<'_>) -> Result<Vec<WebElement>> {
        self.runtime
            .block_on(self.driver.find_all(by(selector)))
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not look for {selector}"))
    }

    fn attribute(&self, element: &WebElement, name: &str) -> Result<Option<String>> {
        self.runtime.block_on(element.attr(name)).into_diagnostic()
    }

    fn text(&self, element: &WebElement) -> Result<String> {
        self.runtime.block_on(element.text()).into_diagnostic()
    }

    fn is_displayed(&self, element: &WebElement) -> Result<bool> {
        self.runtime.block_on(element.is_displayed()).into_diagnostic()
    }

    fn click(&self, element: &WebElement) -> Result<Clicked> {
        match self.runtime.block_on(element.click()) {
            Ok(()) => Ok(Clicked::Done),
            Err(WebDriverError::ElementClickIntercepted(_)) => Ok(Clicked::Intercepted),
            Err(err) => Err(err).into_diagnostic().wrap_err("Could not click"),
        }
    }

    fn send_keys(&self, element: &WebElement, text: &str) -> Result<()> {
        self.runtime
            .block_on(element.send_keys(text))
            .into_diagnostic()
            .wrap_err("Could not type text")
    }

    fn replace_text(&self, _element: &WebElement, text: &str) -> Result<()> {
        let chain = self
            .driver
            .action_chain()
            .key_down(select_modifier())
            .send_keys("a")
            .key_up(select_modifier())
            .send_keys(char::from(Key::Backspace).to_string())
            .send_keys(text);

        self.runtime
            .block_on(chain.perform())
            .into_diagnostic()
            .wrap_err("Could not replace text")
    }

    fn cookies(&self) -> Result<Vec<StoredCookie>> {
        let cookies = self
            .runtime
            .block_on(self.driver.get_all_cookies())
            .into_diagnostic()
            .wrap_err("Could not read the browser cookies")?;

        Ok(cookies
            .into_iter()
            .map(|cookie| StoredCookie {
                name: cookie.name,
                value: cookie.value,
                domain: cookie.domain,
                path: cookie.path,
                secure: cookie.secure,
                http_only: cookie.http_only,
                expiry: cookie.expiry,
            })
            .collect())
    }

    fn add_cookie(&self, stored: &StoredCookie) -> Result<()> {
        let mut cookie = Cookie::new(stored.name.clone(), stored.value.clone());
        cookie.domain = stored.domain.clone();
        cookie.path = stored.path.clone();
        cookie.secure = stored.secure;
        cookie.http_only = stored.http_only;
        cookie.expiry = stored.expiry;

        self.runtime
            .block_on(self.driver.add_cookie(cookie))
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not add cookie {}", stored.name))
    }

    fn close(&self) -> Result<()> {
        debug!("Closing the browser");
        self.runtime
            .block_on(self.driver.clone().quit())
            .into_diagnostic()
            .wrap_err("Could not close the browser")
    }
}
