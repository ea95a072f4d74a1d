use std::collections::{HashMap, HashSet};

use crate::document::{Document, Element, NodeId};

/// Attribute that carries the stable identity assigned to each eligible element.
pub const IDENTITY_ATTR: &str = "data-patch-id";

/// Attributes consulted (in order) when neither the identity nor `id` locates a target.
pub const ALT_LOOKUP_ATTRS: &[&str] = &["data-id", "data-name", "inkscape:label"];

/// Local tag names of non-content containers; the element and its whole subtree are skipped.
pub const NON_CONTENT_TAGS: &[&str] = &[
    "style",
    "defs",
    "linearGradient",
    "radialGradient",
    "clipPath",
    "mask",
    "filter",
    "pattern",
    "marker",
    "symbol",
    "metadata",
    "title",
    "desc",
    "namedview",
];

/// Placeholder phrase used as template filler; elements showing only this text are ignored.
pub const FILLER_TEXT: &str = "Lorem Ipsum";

pub fn is_non_content(el: &Element) -> bool {
    NON_CONTENT_TAGS.contains(&el.local_name())
}

pub fn is_filler_text(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(FILLER_TEXT)
}

/// Whether `id` takes part in identity assignment and field extraction.
pub fn is_eligible(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    if is_non_content(el) || doc.has_ancestor(id, is_non_content) {
        return false;
    }
    !is_filler_text(&doc.text(id))
}

/// Hands out `base`, `base_2`, `base_3`, ... per base key, never repeating a key.
#[derive(Debug, Default)]
pub struct OccurrenceCounter {
    seen: HashMap<String, u32>,
    taken: HashSet<String>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self, base: &str) -> String {
        let n = self.seen.entry(base.to_owned()).or_insert(0);
        loop {
            *n += 1;
            let key = if *n == 1 {
                base.to_owned()
            } else {
                format!("{base}_{n}")
            };
            if self.taken.insert(key.clone()) {
                return key;
            }
        }
    }
}

/// Identity assigned to every eligible element of one document, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityMap {
    entries: Vec<(NodeId, String)>,
    by_node: HashMap<NodeId, usize>,
    by_key: HashMap<String, usize>,
}

impl IdentityMap {
    fn push(&mut self, node: NodeId, key: String) {
        let idx = self.entries.len();
        self.by_node.insert(node, idx);
        self.by_key.insert(key.clone(), idx);
        self.entries.push((node, key));
    }

    pub fn get(&self, node: NodeId) -> Option<&str> {
        self.by_node
            .get(&node)
            .map(|i| self.entries[*i].1.as_str())
    }

    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).map(|i| self.entries[*i].0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.entries.iter().map(|(n, k)| (*n, k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute identities without touching the document.
///
/// Base key is the element `id`, else a previously assigned identity, else `el-<tag>`.
/// Repeats of a base key are numbered by occurrence, so the n-th structurally identical element
/// gets the same identity on every run over an unmodified document.
pub fn assign_identities(doc: &Document) -> IdentityMap {
    let mut counter = OccurrenceCounter::new();
    let mut map = IdentityMap::default();
    for id in doc.elements() {
        if !is_eligible(doc, id) {
            continue;
        }
        let base = doc
            .attr(id, "id")
            .filter(|s| !s.is_empty())
            .or_else(|| doc.attr(id, IDENTITY_ATTR).filter(|s| !s.is_empty()))
            .map(str::to_owned)
            .unwrap_or_else(|| format!("el-{}", doc.tag(id)));
        map.push(id, counter.next_key(&base));
    }
    map
}

impl Document {
    /// Write [`IDENTITY_ATTR`] on every eligible element and return the assignment.
    #[tracing::instrument(skip(self))]
    pub fn identify(&mut self) -> IdentityMap {
        let map = assign_identities(self);
        for (node, key) in map.iter() {
            self.set_attr(node, IDENTITY_ATTR, key);
        }
        tracing::debug!(elements = map.len(), "assigned identities");
        map
    }
}
