//! Declarative element queries compiled to in-page JavaScript
//!
//! A [`Locator`] starts from a CSS selector and narrows the match list with
//! filters applied in call order:
//!
//! ```text
//! Locator::css(".swiper-slide-active")
//!     .find("a, button")          descendants of every match, deduplicated
//!     .with_text(r"Shop\s*Now")   case-insensitive regex over trimmed text
//!     .visible()                  rendered with a non-empty box
//!     .nth(0)                     keep a single match
//! ```
//!
//! The driver evaluates the generated scripts in the page, so the same query
//! is re-resolved on every call and never holds a stale element handle.

use std::fmt;

use serde_json::Value;

/// JS helpers shared by every generated script
const PRELUDE: &str = r#"const __visible = (el) => {
    if (!el || !el.isConnected) return false;
    if (el.tagName === 'OPTION' || el.tagName === 'OPTGROUP') {
      return __visible(el.closest('select'));
    }
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  };
  const __text = (el) => (el.innerText || el.textContent || '').trim();"#;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Visible,
    Text(String),
    Attribute { name: String, pattern: String },
    Nth(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    scope: Option<Box<Locator>>,
    css: String,
    filters: Vec<Filter>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            scope: None,
            css: selector.into(),
            filters: Vec::new(),
        }
    }

    /// Shorthand for `Locator::css(selector).visible()`
    pub fn visible_css(selector: impl Into<String>) -> Self {
        Self::css(selector).visible()
    }

    pub fn visible(mut self) -> Self {
        self.filters.push(Filter::Visible);
        self
    }

    /// Keep elements whose text matches `pattern` (JS regex, case-insensitive)
    pub fn with_text(mut self, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::Text(pattern.into()));
        self
    }

    /// Keep elements whose attribute matches `pattern` (JS regex, case-insensitive)
    pub fn with_attribute(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::Attribute {
            name: name.into(),
            pattern: pattern.into(),
        });
        self
    }

    /// Descendants of every current match
    pub fn find(&self, selector: impl Into<String>) -> Self {
        Self {
            scope: Some(Box::new(self.clone())),
            css: selector.into(),
            filters: Vec::new(),
        }
    }

    pub fn nth(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.filters.push(Filter::Nth(index));
        next
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// JS expression evaluating to the array of matched elements
    pub fn to_js_array(&self) -> String {
        let mut expr = match &self.scope {
            Some(scope) => format!(
                "[...new Set(({}).flatMap((p) => Array.from(p.querySelectorAll({}))))]",
                scope.to_js_array(),
                quote(&self.css)
            ),
            None => format!("Array.from(document.querySelectorAll({}))", quote(&self.css)),
        };

        for filter in &self.filters {
            match filter {
                Filter::Visible => expr.push_str(".filter(__visible)"),
                Filter::Text(pattern) => expr.push_str(&format!(
                    ".filter((el) => new RegExp({}, 'i').test(__text(el)))",
                    quote(pattern)
                )),
                Filter::Attribute { name, pattern } => expr.push_str(&format!(
                    ".filter((el) => new RegExp({}, 'i').test(el.getAttribute({}) || ''))",
                    quote(pattern),
                    quote(name)
                )),
                Filter::Nth(index) => {
                    expr.push_str(&format!(".slice({}, {})", index, index + 1))
                }
            }
        }

        expr
    }

    /// Script returning the number of matches
    pub fn count_script(&self) -> String {
        self.wrap("return __els.length;")
    }

    /// Script scrolling the first match into view and returning its
    /// viewport rect, or `null` when nothing matches
    pub fn target_script(&self) -> String {
        self.wrap(
            "const el = __els[0];
  if (!el) return null;
  el.scrollIntoView({ block: 'center', inline: 'center' });
  const r = el.getBoundingClientRect();
  return { x: r.left, y: r.top, width: r.width, height: r.height };",
        )
    }

    fn wrap(&self, body: &str) -> String {
        format!(
            "(() => {{\n  {}\n  const __els = {};\n  {}\n}})()",
            PRELUDE,
            self.to_js_array(),
            body
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{} >> ", scope)?;
        }
        write!(f, "'{}'", self.css)?;
        for filter in &self.filters {
            match filter {
                Filter::Visible => write!(f, ":visible")?,
                Filter::Text(pattern) => write!(f, ":text(/{}/i)", pattern)?,
                Filter::Attribute { name, pattern } => write!(f, ":attr({}~/{}/i)", name, pattern)?,
                Filter::Nth(index) => write!(f, ":nth({})", index)?,
            }
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
