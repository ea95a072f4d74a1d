use anyhow::Context as _;

use crate::document::tree::{Attribute, Document, Element, NodeId, NodeKind};
use crate::foundation::error::{SvgformError, SvgformResult};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

impl Document {
    /// Parse markup into an arena document.
    ///
    /// This is the one fatal path of the engine: text that is not well-formed XML yields
    /// [`SvgformError::Document`].
    #[tracing::instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> SvgformResult<Self> {
        let opts = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let src = roxmltree::Document::parse_with_options(text, opts)
            .map_err(|e| SvgformError::document(format!("parse markup: {e}")))?;

        let root_el = src.root_element();
        let mut doc = Document::with_root(convert_element(root_el));
        doc.xml_decl = text.trim_start().starts_with("<?xml");

        for n in src.root().children() {
            if n == root_el {
                break;
            }
            if let Some(kind) = convert_misc(n) {
                let id = doc.push_node(kind);
                doc.prolog.push(id);
            }
        }

        let root = doc.root();
        convert_children(&mut doc, root, root_el);
        tracing::debug!(nodes = doc.node_count(), "parsed document");
        Ok(doc)
    }

    /// Parse raw bytes that must be UTF-8 markup.
    pub fn parse_bytes(bytes: &[u8]) -> SvgformResult<Self> {
        let text = std::str::from_utf8(bytes).context("document is not valid UTF-8")?;
        Self::parse(text)
    }
}

fn convert_children(doc: &mut Document, parent: NodeId, src: roxmltree::Node<'_, '_>) {
    for child in src.children() {
        if child.is_element() {
            let id = doc.push_node(NodeKind::Element(convert_element(child)));
            doc.append_child(parent, id);
            convert_children(doc, id, child);
            continue;
        }
        let kind = if child.is_text() {
            NodeKind::Text(child.text().unwrap_or_default().to_owned())
        } else {
            match convert_misc(child) {
                Some(kind) => kind,
                None => continue,
            }
        };
        let id = doc.push_node(kind);
        doc.append_child(parent, id);
    }
}

fn convert_misc(n: roxmltree::Node<'_, '_>) -> Option<NodeKind> {
    if n.is_comment() {
        return Some(NodeKind::Comment(n.text().unwrap_or_default().to_owned()));
    }
    n.pi().map(|pi| NodeKind::Pi {
        target: pi.target.to_owned(),
        value: pi.value.map(str::to_owned),
    })
}

fn convert_element(n: roxmltree::Node<'_, '_>) -> Element {
    let mut attrs = Vec::new();

    // Namespace declarations introduced on this element (not inherited from the parent).
    let inherited: Vec<(Option<&str>, &str)> = n
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in n.namespaces() {
        if ns.uri() == XML_NS || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_owned(),
        };
        attrs.push(Attribute {
            name,
            value: ns.uri().to_owned(),
        });
    }

    for a in n.attributes() {
        attrs.push(Attribute {
            name: qualify(n, a.namespace(), a.name()),
            value: a.value().to_owned(),
        });
    }

    let tag = n.tag_name();
    Element {
        name: qualify(n, tag.namespace(), tag.name()),
        attrs,
    }
}

fn qualify(n: roxmltree::Node<'_, '_>, ns: Option<&str>, local: &str) -> String {
    let prefix = match ns {
        Some(XML_NS) => Some("xml"),
        Some(uri) => n.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}:{local}"),
        _ => local.to_owned(),
    }
}
