use std::io::Write as _;

use anyhow::Context as _;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::document::tree::{Document, NodeId, NodeKind};
use crate::foundation::error::SvgformResult;

impl Document {
    /// Serialize the document back to markup text.
    pub fn to_xml_string(&self) -> SvgformResult<String> {
        let mut writer = Writer::new(Vec::new());
        if self.xml_decl {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .context("write xml declaration")?;
            writer.get_mut().push(b'\n');
        }
        for id in &self.prolog {
            self.write_node(&mut writer, *id)?;
            writer.get_mut().push(b'\n');
        }
        self.write_node(&mut writer, self.root)?;
        let bytes = writer.into_inner();
        Ok(String::from_utf8(bytes).context("serialized markup is not UTF-8")?)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> SvgformResult<()> {
        match self.kind(id) {
            NodeKind::Element(el) => {
                let mut start = BytesStart::new(el.name.as_str());
                for a in &el.attrs {
                    start.push_attribute((a.name.as_str(), a.value.as_str()));
                }
                let children = self.children(id);
                if children.is_empty() {
                    writer
                        .write_event(Event::Empty(start))
                        .with_context(|| format!("write <{}/>", el.name))?;
                    return Ok(());
                }
                writer
                    .write_event(Event::Start(start))
                    .with_context(|| format!("write <{}>", el.name))?;
                for child in children {
                    self.write_node(writer, *child)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(el.name.as_str())))
                    .with_context(|| format!("write </{}>", el.name))?;
            }
            NodeKind::Text(t) => {
                writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .context("write text")?;
            }
            NodeKind::Comment(c) => {
                write!(writer.get_mut(), "<!--{c}-->").context("write comment")?;
            }
            NodeKind::Pi { target, value } => {
                let out = writer.get_mut();
                match value {
                    Some(v) => write!(out, "<?{target} {v}?>"),
                    None => write!(out, "<?{target}?>"),
                }
                .context("write processing instruction")?;
            }
        }
        Ok(())
    }
}
