mod cookies;
mod session;
mod webdriver;

use std::{fmt::Display, thread, time::Duration};

use miette::{bail, miette, Result};

pub use cookies::StoredCookie;
pub use session::{Pacing, UploadSession};
pub use webdriver::WebDriverPage;

/// Interval between two checks while waiting for elements
const WAIT_POLL: Duration = Duration::from_millis(250);

/// How to locate elements on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    Id(&'a str),
    Tag(&'a str),
    Class(&'a str),
}

impl Display for Selector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Tag(tag) => write!(f, "<{tag}>"),
            Selector::Class(class) => write!(f, ".{class}"),
        }
    }
}

/// Outcome of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clicked {
    Done,
    /// Another element, such as an error dialog, received the click
    Intercepted,
}

/// Interface for driving a browser page.
///
/// Element handles are only valid for the page that returned them.
pub trait Page {
    type Element: Clone;

    fn goto(&self, url: &str) -> Result<()>;

    /// Every element matching the selector, in document order
    fn find_all(&self, selector: Selector<'_>) -> Result<Vec<Self::Element>>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    fn text(&self, element: &Self::Element) -> Result<String>;

    fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    fn click(&self, element: &Self::Element) -> Result<Clicked>;

    fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Select all the text of the focused element and type the new one instead
    fn replace_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    fn cookies(&self) -> Result<Vec<StoredCookie>>;

    fn add_cookie(&self, cookie: &StoredCookie) -> Result<()>;

    /// Close the browser. The page must not be used afterwards.
    fn close(&self) -> Result<()>;

    /// The first element matching the selector
    fn find(&self, selector: Selector<'_>) -> Result<Self::Element> {
        self.find_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| miette!("No element matches {selector}"))
    }

    /// The first element matching the selector for which the predicate holds
    fn find_where<F>(&self, selector: Selector<'_>, mut predicate: F) -> Result<Option<Self::Element>>
    where
        Self: Sized,
        F: FnMut(&Self, &Self::Element) -> Result<bool>,
    {
        for element in self.find_all(selector)? {
            if predicate(self, &element)? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// Wait until at least one element matches the selector and all of them are visible
    fn wait_all_visible(&self, selector: Selector<'_>, timeout: Duration) -> Result<Vec<Self::Element>>
    where
        Self: Sized,
    {
        let start = std::time::Instant::now();
        loop {
            let elements = self.find_all(selector)?;
            // Elements being replaced by the page count as not visible yet
            let visible = !elements.is_empty()
                && elements
                    .iter()
                    .all(|e| self.is_displayed(e).unwrap_or(false));
            if visible {
                return Ok(elements);
            }

            if start.elapsed() >= timeout {
                bail!("Timed out waiting for {selector} to be visible");
            }
            thread::sleep(WAIT_POLL.min(timeout));
        }
    }
}

#[cfg(test)]
pub(crate) mod fake;
