//! Document index over a parsed page
//!
//! A [`Document`] flattens the parsed node tree of one page into pre-order
//! once, then answers every query (title, images, links, product-page
//! classification) by scanning that flat list. Encounter order is document
//! order, which the title and the image/link lists depend on.

use crate::url::{file_extension, is_crawlable, resolve_image_src, resolve_reference, Origin};
use ego_tree::NodeRef;
use scraper::{Html, Node};
use std::collections::HashSet;
use url::Url;

/// Phrase whose occurrences mark a purchase control
const ADD_TO_CART: &str = "add to cart";

/// Heading elements that make up a page title, in document order
const TITLE_TAGS: &[&str] = &["h1", "h2", "h3"];

/// Elements whose subtrees are searched for the purchase phrase
const CONTROL_TAGS: &[&str] = &["button", "a"];

/// Anchor targets with these extensions are treated as images
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Immutable pre-order index of one page's nodes
#[derive(Debug, Clone)]
pub struct Document<'a> {
    nodes: Vec<NodeRef<'a, Node>>,
    origin: Origin,
}

impl<'a> Document<'a> {
    /// Builds the index from a parsed HTML document
    ///
    /// # Example
    ///
    /// ```
    /// use rumble_crawl::crawler::Document;
    /// use rumble_crawl::url::Origin;
    /// use scraper::Html;
    ///
    /// let html = Html::parse_document(r#"<h1>Boots</h1><button>Add to cart</button>"#);
    /// let origin = Origin::parse("http://shop.example").unwrap();
    /// let doc = Document::parse(&html, &origin);
    ///
    /// assert_eq!(doc.title(), "boots");
    /// assert!(doc.product_page());
    /// ```
    pub fn parse(html: &'a Html, origin: &Origin) -> Self {
        Self::build(html.tree.root(), origin)
    }

    /// Builds the pre-order flattening of the tree rooted at `root`
    ///
    /// Uses an explicit stack, so the depth of the markup never touches the
    /// call stack. Every node appears exactly once.
    pub fn build(root: NodeRef<'a, Node>, origin: &Origin) -> Self {
        let mut nodes = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            nodes.push(node);

            // Children go on in reverse so the first child is popped next
            let mut child = node.last_child();
            while let Some(c) = child {
                stack.push(c);
                child = c.prev_sibling();
            }
        }

        Self {
            nodes,
            origin: origin.clone(),
        }
    }

    /// The flattened nodes, in pre-order
    pub fn nodes(&self) -> &[NodeRef<'a, Node>] {
        &self.nodes
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the document has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The origin references on this page are resolved against
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Extracts the page title from its headings
    ///
    /// Every h1, h2 and h3 contributes the content of its first text child,
    /// in the order the headings appear (not grouped by level). A heading with
    /// no text child contributes an empty string. The parts are joined with
    /// spaces, lower-cased and trimmed.
    pub fn title(&self) -> String {
        let mut title = String::new();

        for node in self.elements_named(TITLE_TAGS) {
            title.push(' ');
            title.push_str(first_text_child(node).unwrap_or_default());
        }

        title.to_lowercase().trim().to_string()
    }

    /// Extracts image references in document order
    ///
    /// # Extraction Rules
    ///
    /// - `<a href>` whose path ends in `.jpg`, `.jpeg` or `.png` (exact case)
    ///   is emitted exactly as written, relative or not
    /// - `<img src>` is resolved against the origin with its query and
    ///   fragment removed; malformed values are logged and skipped
    ///
    /// Duplicates are kept.
    pub fn images(&self) -> Vec<String> {
        let mut images = Vec::new();

        for node in &self.nodes {
            let Some(element) = node.value().as_element() else {
                continue;
            };

            match element.name() {
                "a" => {
                    let Some(href) = element.attr("href") else {
                        continue;
                    };
                    if let Ok(url) = resolve_reference(href, &self.origin) {
                        if file_extension(&url).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
                        {
                            images.push(href.to_string());
                        }
                    }
                }
                "img" => {
                    let Some(src) = element.attr("src") else {
                        continue;
                    };
                    match resolve_image_src(src, &self.origin) {
                        Ok(url) => images.push(url.to_string()),
                        Err(e) => tracing::warn!("Skipping malformed image src {:?}: {}", src, e),
                    }
                }
                _ => {}
            }
        }

        images
    }

    /// Counts "add to cart" text across every button and anchor subtree
    ///
    /// Each `button` or `a` element counts the text nodes beneath it whose
    /// lower-cased content contains the phrase. Nested controls are counted
    /// once per enclosing control.
    pub fn add_to_cart_count(&self) -> usize {
        self.elements_named(CONTROL_TAGS)
            .map(|control| {
                control
                    .descendants()
                    .filter(|n| {
                        n.value()
                            .as_text()
                            .is_some_and(|t| t.text.to_lowercase().contains(ADD_TO_CART))
                    })
                    .count()
            })
            .sum()
    }

    /// Classifies the page as a single-product page
    ///
    /// True only when "add to cart" occurs exactly once across all buttons and
    /// anchors. Listing pages repeat the phrase per item and are rejected, as
    /// are pages without it.
    pub fn product_page(&self) -> bool {
        self.add_to_cart_count() == 1
    }

    /// Extracts the same-site links this page contributes to the frontier
    ///
    /// Anchors are taken in document order and de-duplicated by their raw
    /// `href` value (first occurrence wins). Each is resolved against the
    /// origin; anything that is not http(s) or whose host differs from the
    /// origin's is dropped.
    pub fn links(&self) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for node in self.elements_named(&["a"]) {
            let Some(href) = node.value().as_element().and_then(|e| e.attr("href")) else {
                continue;
            };

            if !seen.insert(href) {
                continue;
            }

            let url = match resolve_reference(href, &self.origin) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping unparseable link {:?}: {}", href, e);
                    continue;
                }
            };

            if is_crawlable(&url, &self.origin) {
                links.push(url);
            }
        }

        links
    }

    /// Iterates element nodes whose tag is one of `names`, in document order
    fn elements_named<'s>(
        &'s self,
        names: &'s [&'s str],
    ) -> impl Iterator<Item = NodeRef<'a, Node>> + 's {
        self.nodes.iter().copied().filter(move |node| {
            node.value()
                .as_element()
                .is_some_and(|e| names.contains(&e.name()))
        })
    }
}

/// Returns the content of the first text child of `node`, if any
fn first_text_child<'a>(node: NodeRef<'a, Node>) -> Option<&'a str> {
    node.children()
        .find_map(|child| child.value().as_text().map(|t| &*t.text))
}
