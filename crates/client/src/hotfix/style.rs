//! Style patch injection.
//!
//! Patches are prepended to the document body so they come after every
//! stylesheet bundled in the head and win on equal specificity.

use std::sync::LazyLock;

use regex::Regex;

use super::Environment;

static BODY_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<body(?:\s[^>]*)?>").unwrap());

/// A document that can receive a style element as the first child of its body.
pub trait StyleTarget {
    fn prepend_to_body(&mut self, css: &str);
}

/// An HTML document held as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPage {
    html: String,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

impl StyleTarget for HtmlPage {
    /// Without a `<body>` tag the element is prepended to the whole document.
    fn prepend_to_body(&mut self, css: &str) {
        let element = format!("<style>{}</style>", css.replace("</style", "<\\/style"));
        let at = BODY_OPEN.find(&self.html).map_or(0, |m| m.end());
        self.html.insert_str(at, &element);
    }
}

/// Prepend `css` to the body of `target` unless the build is a development or
/// enterprise one, or there is nothing to inject.
///
/// Returns whether the document was modified.
pub fn inject_style_patch<S: StyleTarget + ?Sized>(target: &mut S, env: &Environment, css: &str) -> bool {
    if env.is_development() || env.enterprise || css.is_empty() {
        return false;
    }

    target.prepend_to_body(css);
    true
}
