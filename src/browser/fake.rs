//! In-memory page mimicking the upload form

use std::cell::{Cell, RefCell};

use miette::{bail, Result};

use super::{Clicked, Page, Selector, StoredCookie};

pub struct FakeElement {
    pub id: Option<&'static str>,
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub attrs: Vec<(&'static str, &'static str)>,
    pub text: String,
    pub displayed: bool,
    pub intercept: bool,
    /// Number of lookups the element is still absent from
    pub hidden_for: Cell<u32>,
}

impl FakeElement {
    pub fn new(tag: &'static str) -> Self {
        Self {
            id: None,
            tag,
            class: None,
            attrs: vec![],
            text: String::new(),
            displayed: true,
            intercept: false,
            hidden_for: Cell::new(0),
        }
    }

    pub fn id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn attr(mut self, name: &'static str, value: &'static str) -> Self {
        self.attrs.push((name, value));
        self
    }

    fn matches(&self, selector: Selector<'_>) -> bool {
        match selector {
            Selector::Id(id) => self.id == Some(id),
            Selector::Tag(tag) => self.tag == tag,
            Selector::Class(class) => self.class == Some(class),
        }
    }

    fn label(&self) -> String {
        match self.id {
            Some(id) => format!("#{id}"),
            None => format!("<{}>", self.tag),
        }
    }
}

#[derive(Default)]
pub struct FakePage {
    pub elements: Vec<FakeElement>,
    pub actions: RefCell<Vec<String>>,
    pub cookies: RefCell<Vec<StoredCookie>>,
    pub closed: Cell<bool>,
}

impl FakePage {
    /// The upload form, where the upload completes after a few progress polls
    pub fn studio() -> Self {
        let elements = vec![
            FakeElement::new("input").attr("type", "text"),
            FakeElement::new("input").attr("type", "file"),
            FakeElement::new("div").id("textbox"),
            FakeElement::new("div").id("textbox"),
            FakeElement::new("button").id("toggle-button"),
            FakeElement::new("input")
                .id("text-input")
                .attr("aria-label", "Search"),
            FakeElement::new("input")
                .id("text-input")
                .attr("aria-label", "Tags"),
            FakeElement::new("div").id("step-badge-3"),
            FakeElement::new("button").id("done-button"),
            FakeElement::new("span").class("progress-label"),
            FakeElement::new("span").class("progress-label"),
            FakeElement::new("div").class("error-area"),
        ];
        elements[10].hidden_for.set(3);

        Self {
            elements,
            ..Default::default()
        }
    }

    pub fn element(&mut self, selector: Selector<'_>) -> &mut FakeElement {
        self.elements
            .iter_mut()
            .find(|e| e.matches(selector))
            .unwrap()
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.borrow().clone()
    }

    fn act(&self, action: String) -> Result<()> {
        if self.closed.get() {
            bail!("Page used after close: {action}");
        }
        self.actions.borrow_mut().push(action);
        Ok(())
    }
}

impl Page for FakePage {
    type Element = usize;

    fn goto(&self, url: &str) -> Result<()> {
        self.act(format!("goto {url}"))
    }

    fn find_all(&self, selector: Selector<'_>) -> Result<Vec<usize>> {
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(selector))
            .filter(|(_, e)| match e.hidden_for.get() {
                0 => true,
                n => {
                    e.hidden_for.set(n - 1);
                    false
                }
            })
            .map(|(idx, _)| idx)
            .collect())
    }

    fn attribute(&self, element: &usize, name: &str) -> Result<Option<String>> {
        Ok(self.elements[*element]
            .attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string()))
    }

    fn text(&self, element: &usize) -> Result<String> {
        Ok(self.elements[*element].text.clone())
    }

    fn is_displayed(&self, element: &usize) -> Result<bool> {
        Ok(self.elements[*element].displayed)
    }

    fn click(&self, element: &usize) -> Result<Clicked> {
        let element = &self.elements[*element];
        if element.intercept {
            return Ok(Clicked::Intercepted);
        }
        self.act(format!("click {}", element.label()))?;
        Ok(Clicked::Done)
    }

    fn send_keys(&self, element: &usize, text: &str) -> Result<()> {
        let element = &self.elements[*element];
        let name = element
            .attrs
            .iter()
            .find(|(k, _)| *k == "aria-label")
            .map(|(_, v)| format!("{}[{v}]", element.label()))
            .unwrap_or_else(|| element.label());
        self.act(format!("keys {name}: {text}"))
    }

    fn replace_text(&self, element: &usize, text: &str) -> Result<()> {
        self.act(format!("replace {}: {text}", self.elements[*element].label()))
    }

    fn cookies(&self) -> Result<Vec<StoredCookie>> {
        Ok(self.cookies.borrow().clone())
    }

    fn add_cookie(&self, cookie: &StoredCookie) -> Result<()> {
        self.act(format!("add_cookie {}", cookie.name))?;
        self.cookies.borrow_mut().push(cookie.clone());
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.act("close".to_owned())?;
        self.closed.set(true);
        Ok(())
    }
}
