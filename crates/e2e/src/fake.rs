//! In-memory DOM implementing [`Browser`]
//!
//! Lets page objects and scenarios run without a WebDriver. Nodes are kept in
//! insertion order, which is taken as document order, so build parents before
//! their children.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::browser::{Browser, Locator, PageElement};
use crate::error::{E2eError, E2eResult};

pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    text: String,
    displayed: bool,
    parent: Option<NodeId>,
}

#[derive(Debug)]
struct Dom {
    nodes: RwLock<Vec<Node>>,
    url: RwLock<String>,
    navigations: AtomicUsize,
}

impl Dom {
    fn children(&self, id: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        (0..nodes.len()).filter(|&i| nodes[i].parent == Some(id)).collect()
    }

    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let nodes = self.nodes.read();
        let mut cursor = nodes[id].parent;
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = nodes[parent].parent;
        }
        false
    }

    fn matches(&self, id: NodeId, locator: &Locator) -> bool {
        let nodes = self.nodes.read();
        let node = &nodes[id];
        match locator {
            Locator::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
            Locator::TextContains { tag, text } => {
                id != BODY
                    && tag.as_deref().map(|t| node.tag.eq_ignore_ascii_case(t)).unwrap_or(true)
                    && node.text.contains(text.as_str())
            }
            Locator::TextEquals(text) => {
                id != BODY && node.text.split_whitespace().collect::<Vec<_>>().join(" ") == *text
            }
        }
    }

    fn rendered_text(&self, id: NodeId) -> String {
        let own = self.nodes.read()[id].text.clone();
        let mut parts = vec![own];
        for child in self.children(id) {
            parts.push(self.rendered_text(child));
        }
        parts.retain(|p| !p.is_empty());
        parts.join("\n")
    }

    fn displayed(&self, id: NodeId) -> bool {
        let nodes = self.nodes.read();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !nodes[current].displayed {
                return false;
            }
            cursor = nodes[current].parent;
        }
        true
    }
}

/// The `<body>` node every fake page starts with
pub const BODY: NodeId = 0;

/// A fake browser tab holding a single mutable page
#[derive(Debug, Clone)]
pub struct FakeBrowser {
    dom: Arc<Dom>,
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBrowser {
    pub fn new() -> Self {
        let body = Node {
            tag: "body".to_string(),
            text: String::new(),
            displayed: true,
            parent: None,
        };
        Self {
            dom: Arc::new(Dom {
                nodes: RwLock::new(vec![body]),
                url: RwLock::new("about:blank".to_string()),
                navigations: AtomicUsize::new(0),
            }),
        }
    }

    /// Append a displayed element under `parent`
    pub fn append(&self, parent: NodeId, tag: &str, text: &str) -> NodeId {
        let mut nodes = self.dom.nodes.write();
        nodes.push(Node {
            tag: tag.to_string(),
            text: text.to_string(),
            displayed: true,
            parent: Some(parent),
        });
        nodes.len() - 1
    }

    pub fn hide(&self, id: NodeId) {
        self.dom.nodes.write()[id].displayed = false;
    }

    /// Number of `navigate` calls so far
    pub fn navigations(&self) -> usize {
        self.dom.navigations.load(Ordering::SeqCst)
    }

    /// A catalog page with a heading, one list row per entry and the total label
    pub fn catalog(rows: &[&str]) -> Self {
        let browser = Self::new();
        browser.append(BODY, "h1", "Catálogo de Palas");
        let list = browser.append(BODY, "ul", "");
        for row in rows {
            browser.append(list, "li", row);
        }
        browser.append(BODY, "p", &format!("Total de palas mostradas: {}", rows.len()));
        browser
    }

    fn element(&self, id: NodeId) -> FakeElement {
        FakeElement { dom: Arc::clone(&self.dom), id }
    }
}

/// Handle to one node of a [`FakeBrowser`] page
#[derive(Debug, Clone)]
pub struct FakeElement {
    dom: Arc<Dom>,
    id: NodeId,
}

#[async_trait]
impl PageElement for FakeElement {
    async fn rendered_text(&self) -> E2eResult<String> {
        Ok(self.dom.rendered_text(self.id))
    }

    async fn displayed(&self) -> E2eResult<bool> {
        Ok(self.dom.displayed(self.id))
    }

    async fn locate_all(&self, locator: &Locator) -> E2eResult<Vec<Self>> {
        let count = self.dom.nodes.read().len();
        Ok((0..count)
            .filter(|&i| self.dom.is_descendant(i, self.id) && self.dom.matches(i, locator))
            .map(|id| FakeElement { dom: Arc::clone(&self.dom), id })
            .collect())
    }

    async fn parent_element(&self) -> E2eResult<Self> {
        let parent = self.dom.nodes.read()[self.id].parent;
        match parent {
            Some(id) => Ok(FakeElement { dom: Arc::clone(&self.dom), id }),
            None => Err(E2eError::ElementNotFound("parent of <body>".to_string())),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> E2eResult<()> {
        *self.dom.url.write() = url.to_string();
        self.dom.navigations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        Ok(self.dom.url.read().clone())
    }

    async fn locate_all(&self, locator: &Locator) -> E2eResult<Vec<Self::Element>> {
        let count = self.dom.nodes.read().len();
        Ok((0..count)
            .filter(|&i| self.dom.matches(i, locator))
            .map(|id| self.element(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rendered_text_includes_descendants() {
        let browser = FakeBrowser::new();
        let row = browser.append(BODY, "li", "");
        browser.append(row, "h3", "Vertex 04");
        browser.append(row, "span", "219,95 €");

        let rows = browser.locate_all(&Locator::tag("li")).await.unwrap();
        assert_eq!(rows[0].rendered_text().await.unwrap(), "Vertex 04\n219,95 €");
    }

    #[tokio::test]
    async fn test_hidden_ancestor_hides_children() {
        let browser = FakeBrowser::new();
        let banner = browser.append(BODY, "div", "");
        let message = browser.append(banner, "span", "Error: boom");
        browser.hide(banner);

        let found = browser.locate_all(&Locator::text("Error:")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, message);
        assert!(!found[0].displayed().await.unwrap());
    }

    #[tokio::test]
    async fn test_scoped_lookup_and_parent() {
        let browser = FakeBrowser::catalog(&["A", "B"]);
        browser.append(BODY, "li", "outside");

        let list = browser.locate_first(&Locator::tag("ul")).await.unwrap();
        assert_eq!(list.locate_all(&Locator::tag("li")).await.unwrap().len(), 2);
        assert_eq!(browser.locate_all(&Locator::tag("li")).await.unwrap().len(), 3);

        let parent = list.parent_element().await.unwrap();
        assert_eq!(parent.id, BODY);
        assert!(parent.parent_element().await.is_err());
    }
}
