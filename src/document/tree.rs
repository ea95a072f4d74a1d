/// Stable handle to a node in a [`Document`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written in the source (`xlink:href`, `xmlns:inkscape`).
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name (`svg`, `sodipodi:namedview`).
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl Element {
    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Comment(String),
    Pi { target: String, value: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Arena-backed markup document.
///
/// Nodes are addressed by [`NodeId`] handles that never change while the document lives.
/// Detached nodes stay in the arena but are unreachable from the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) prolog: Vec<NodeId>,
    pub(crate) xml_decl: bool,
}

impl Document {
    pub(crate) fn with_root(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            prolog: Vec::new(),
            xml_decl: false,
        }
    }

    /// Root element handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.index())?.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Element children only.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
    }

    /// Local tag name of an element, empty for non-element nodes.
    pub fn tag(&self, id: NodeId) -> &str {
        self.element(id).map(Element::local_name).unwrap_or("")
    }

    /// Every element reachable from the root, in document order (root first).
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.element(id).is_none() {
                continue;
            }
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value,
            None => el.attrs.push(Attribute {
                name: name.to_owned(),
                value,
            }),
        }
    }

    /// Remove an attribute; returns `true` when it was present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let before = el.attrs.len();
        el.attrs.retain(|a| a.name != name);
        el.attrs.len() != before
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.index()].kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(_) => {
                for child in &self.nodes[id.index()].children {
                    self.collect_text(*child, out);
                }
            }
            NodeKind::Comment(_) | NodeKind::Pi { .. } => {}
        }
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if self.element(id).is_none() {
            return;
        }
        self.clear_children(id);
        if !text.is_empty() {
            let t = self.push_node(NodeKind::Text(text.to_owned()));
            self.append_child(id, t);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for c in children {
            self.nodes[c.index()].parent = None;
        }
    }

    pub(crate) fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str, attrs: Vec<Attribute>) -> NodeId {
        self.push_node(NodeKind::Element(Element {
            name: name.to_owned(),
            attrs,
        }))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(p) = self.nodes[id.index()].parent.take() {
            self.nodes[p.index()].children.retain(|c| *c != id);
        }
    }

    /// Move `node` so it directly follows `reference` under the same parent.
    ///
    /// Returns `false` (and changes nothing) when the two nodes do not share a parent.
    pub fn move_after(&mut self, node: NodeId, reference: NodeId) -> bool {
        self.move_relative(node, reference, 1)
    }

    /// Move `node` so it directly precedes `reference` under the same parent.
    pub fn move_before(&mut self, node: NodeId, reference: NodeId) -> bool {
        self.move_relative(node, reference, 0)
    }

    fn move_relative(&mut self, node: NodeId, reference: NodeId, offset: usize) -> bool {
        if node == reference {
            return false;
        }
        let (Some(parent), Some(ref_parent)) = (self.parent(node), self.parent(reference)) else {
            return false;
        };
        if parent != ref_parent {
            return false;
        }
        let siblings = &mut self.nodes[parent.index()].children;
        siblings.retain(|c| *c != node);
        let Some(pos) = siblings.iter().position(|c| *c == reference) else {
            return false;
        };
        siblings.insert(pos + offset, node);
        true
    }

    /// `true` when any ancestor of `id` (excluding `id`) satisfies `pred`.
    pub fn has_ancestor(&self, id: NodeId, mut pred: impl FnMut(&Element) -> bool) -> bool {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if self.element(p).is_some_and(&mut pred) {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// First element in document order whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attr(*id, name) == Some(value))
    }

    /// Presentation property from the attribute of the same name or the `style` declaration.
    ///
    /// The `style` declaration wins, matching CSS precedence over presentation attributes.
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        let from_style = self.attr(id, "style").and_then(|style| {
            style.split(';').find_map(|decl| {
                let (k, v) = decl.split_once(':')?;
                (k.trim() == name).then(|| v.trim().to_owned())
            })
        });
        from_style.or_else(|| self.attr(id, name).map(|v| v.trim().to_owned()))
    }

    /// Set `name` in the element's `style` declarations, replacing an existing one.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) {
        let mut decls = self.style_declarations(id);
        match decls.iter_mut().find(|(k, _)| k == name) {
            Some(decl) => decl.1 = value.to_owned(),
            None => decls.push((name.to_owned(), value.to_owned())),
        }
        self.write_style(id, &decls);
    }

    /// Drop `name` from the element's `style` declarations. An emptied `style` is removed.
    pub fn remove_style_property(&mut self, id: NodeId, name: &str) -> bool {
        let mut decls = self.style_declarations(id);
        let before = decls.len();
        decls.retain(|(k, _)| k != name);
        if decls.len() == before {
            return false;
        }
        self.write_style(id, &decls);
        true
    }

    fn style_declarations(&self, id: NodeId) -> Vec<(String, String)> {
        let Some(style) = self.attr(id, "style") else {
            return Vec::new();
        };
        style
            .split(';')
            .filter_map(|decl| {
                let (k, v) = decl.split_once(':')?;
                Some((k.trim().to_owned(), v.trim().to_owned()))
            })
            .collect()
    }

    fn write_style(&mut self, id: NodeId, decls: &[(String, String)]) {
        if decls.is_empty() {
            self.remove_attr(id, "style");
            return;
        }
        let style = decls
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";");
        self.set_attr(id, "style", style);
    }

    /// [`Self::style_property`] on `id` or its nearest ancestor that defines it.
    pub fn inherited_style_property(&self, id: NodeId, name: &str) -> Option<String> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let Some(v) = self.style_property(n, name) {
                return Some(v);
            }
            cur = self.parent(n);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="g"><rect id="a"/><rect id="b"/><rect id="c"/></g><text id="t">hi <tspan>there</tspan></text></svg>"#,
        )
        .unwrap()
    }

    fn order(d: &Document) -> Vec<String> {
        let g = d.find_by_attr("id", "g").unwrap();
        d.child_elements(g)
            .map(|c| d.attr(c, "id").unwrap().to_owned())
            .collect()
    }

    #[test]
    fn elements_are_in_document_order() {
        let d = doc();
        let tags: Vec<&str> = d.elements().iter().map(|id| d.tag(*id)).collect();
        assert_eq!(tags, vec!["svg", "g", "rect", "rect", "rect", "text", "tspan"]);
    }

    #[test]
    fn text_concatenates_descendants() {
        let d = doc();
        let t = d.find_by_attr("id", "t").unwrap();
        assert_eq!(d.text(t), "hi there");
    }

    #[test]
    fn set_text_replaces_children() {
        let mut d = doc();
        let t = d.find_by_attr("id", "t").unwrap();
        d.set_text(t, "bye");
        assert_eq!(d.text(t), "bye");
        assert_eq!(d.children(t).len(), 1);
    }

    #[test]
    fn move_after_and_before() {
        let mut d = doc();
        let a = d.find_by_attr("id", "a").unwrap();
        let c = d.find_by_attr("id", "c").unwrap();
        assert!(d.move_after(a, c));
        assert_eq!(order(&d), vec!["b", "c", "a"]);
        assert!(d.move_before(a, d.find_by_attr("id", "b").unwrap()));
        assert_eq!(order(&d), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_across_parents_is_refused() {
        let mut d = doc();
        let a = d.find_by_attr("id", "a").unwrap();
        let t = d.find_by_attr("id", "t").unwrap();
        assert!(!d.move_after(a, t));
        assert_eq!(order(&d), vec!["a", "b", "c"]);
    }

    #[test]
    fn attribute_set_and_remove() {
        let mut d = doc();
        let a = d.find_by_attr("id", "a").unwrap();
        d.set_attr(a, "fill", "red");
        assert_eq!(d.attr(a, "fill"), Some("red"));
        assert!(d.remove_attr(a, "fill"));
        assert!(!d.remove_attr(a, "fill"));
    }

    #[test]
    fn style_declarations_are_rewritten_in_place() {
        let mut d = Document::parse(
            r#"<svg><rect id="a" style="fill: red; display:none" display="inline"/></svg>"#,
        )
        .unwrap();
        let a = d.find_by_attr("id", "a").unwrap();
        assert_eq!(d.style_property(a, "display").as_deref(), Some("none"));

        d.set_style_property(a, "fill", "blue");
        assert_eq!(d.attr(a, "style"), Some("fill:blue;display:none"));
        assert!(d.remove_style_property(a, "display"));
        assert_eq!(d.style_property(a, "display").as_deref(), Some("inline"));
        assert!(!d.remove_style_property(a, "display"));

        assert!(d.remove_style_property(a, "fill"));
        assert_eq!(d.attr(a, "style"), None);
        d.set_style_property(a, "visibility", "hidden");
        assert_eq!(d.attr(a, "style"), Some("visibility:hidden"));
    }
}
