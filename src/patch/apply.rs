use serde::Serialize;

use crate::document::{Document, NodeId};
use crate::patch::identity::{ALT_LOOKUP_ATTRS, IDENTITY_ATTR};
use crate::patch::model::{Patch, PatchOp, ReorderTarget};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TargetNotFound,
    ReferenceNotFound,
    ReferenceNotSibling,
    InvalidValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedPatch {
    /// Position of the patch in the replayed list.
    pub index: usize,
    pub id: String,
    pub reason: SkipReason,
}

/// Partial-success summary of one replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: usize,
    pub total: usize,
    pub skipped: Vec<SkippedPatch>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.applied == self.total
    }
}

/// Resolve a patch target: identity attribute, then `id`, then [`ALT_LOOKUP_ATTRS`].
pub fn locate(doc: &Document, key: &str) -> Option<NodeId> {
    if key.is_empty() {
        return None;
    }
    std::iter::once(IDENTITY_ATTR)
        .chain(std::iter::once("id"))
        .chain(ALT_LOOKUP_ATTRS.iter().copied())
        .find_map(|attr| doc.find_by_attr(attr, key))
}

/// Apply patches in list order. Unresolvable patches are skipped and reported.
#[tracing::instrument(skip_all, fields(total = patches.len()))]
pub fn apply_patches(doc: &mut Document, patches: &[Patch]) -> ApplyReport {
    let mut report = ApplyReport {
        total: patches.len(),
        ..ApplyReport::default()
    };

    for (index, patch) in patches.iter().enumerate() {
        match apply_one(doc, patch) {
            Ok(()) => report.applied += 1,
            Err(reason) => {
                tracing::debug!(
                    index,
                    id = %patch.id,
                    attribute = %patch.attribute,
                    ?reason,
                    "skipped patch"
                );
                report.skipped.push(SkippedPatch {
                    index,
                    id: patch.id.clone(),
                    reason,
                });
            }
        }
    }

    tracing::debug!(applied = report.applied, total = report.total, "patches applied");
    report
}

fn apply_one(doc: &mut Document, patch: &Patch) -> Result<(), SkipReason> {
    let target = locate(doc, &patch.id).ok_or(SkipReason::TargetNotFound)?;
    match patch.op().ok_or(SkipReason::InvalidValue)? {
        PatchOp::InnerText(text) => doc.set_text(target, &text),
        PatchOp::SetAttribute { name, value } => doc.set_attr(target, &name, value),
        PatchOp::RemoveAttribute { name } => {
            doc.remove_attr(target, &name);
        }
        PatchOp::Reorder(to) => reorder(doc, target, &to)?,
    }
    Ok(())
}

fn reorder(doc: &mut Document, target: NodeId, to: &ReorderTarget) -> Result<(), SkipReason> {
    let before = to.before_id.as_deref().and_then(|k| locate(doc, k));
    let after = to.after_id.as_deref().and_then(|k| locate(doc, k));
    let moved = match (before, after) {
        (Some(r), _) if r != target => doc.move_before(target, r),
        (_, Some(r)) if r != target => doc.move_after(target, r),
        _ => return Err(SkipReason::ReferenceNotFound),
    };
    if moved {
        Ok(())
    } else {
        Err(SkipReason::ReferenceNotSibling)
    }
}

/// Reproduce an edited state: clone `base`, assign identities, replay `patches`.
pub fn replay(base: &Document, patches: &[Patch]) -> (Document, ApplyReport) {
    let mut doc = base.clone();
    doc.identify();
    let report = apply_patches(&mut doc, patches);
    (doc, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <g id="layer"><rect id="a"/><rect id="b"/><rect id="c"/></g>
        <text id="title">Old</text>
        <circle data-name="dot"/>
    </svg>"#;

    fn layer_order(doc: &Document) -> Vec<String> {
        let g = locate(doc, "layer").unwrap();
        doc.child_elements(g)
            .map(|c| doc.attr(c, "id").unwrap().to_owned())
            .collect()
    }

    fn base() -> Document {
        Document::parse(BASE).unwrap()
    }

    #[test]
    fn text_and_attribute_patches() {
        let patches = vec![
            Patch::inner_text("title", "New"),
            Patch::set_attr("a", "fill", "red"),
            Patch::set_attr("a", "fill", "blue"),
            Patch::set_attr("dot", "r", "4"),
        ];
        let (doc, report) = replay(&base(), &patches);
        assert!(report.is_complete());
        let title = locate(&doc, "title").unwrap();
        assert_eq!(doc.text(title), "New");
        assert_eq!(doc.attr(locate(&doc, "a").unwrap(), "fill"), Some("blue"));
        assert_eq!(doc.attr(locate(&doc, "dot").unwrap(), "r"), Some("4"));
    }

    #[test]
    fn empty_value_removes_attribute() {
        let patches = vec![
            Patch::set_attr("a", "fill", "red"),
            Patch::set_attr("a", "fill", ""),
        ];
        let (doc, _) = replay(&base(), &patches);
        assert_eq!(doc.attr(locate(&doc, "a").unwrap(), "fill"), None);
    }

    #[test]
    fn reorder_before_wins_over_after() {
        let patch = Patch::reorder(
            "c",
            ReorderTarget {
                after_id: Some("b".into()),
                before_id: Some("a".into()),
            },
        );
        let (doc, report) = replay(&base(), &[patch]);
        assert_eq!(report.applied, 1);
        assert_eq!(layer_order(&doc), vec!["c", "a", "b"]);
    }

    #[test]
    fn reorder_falls_back_to_after_when_before_is_missing() {
        let patch = Patch::reorder(
            "a",
            ReorderTarget {
                after_id: Some("c".into()),
                before_id: Some("missing".into()),
            },
        );
        let (doc, _) = replay(&base(), &[patch]);
        assert_eq!(layer_order(&doc), vec!["b", "c", "a"]);
    }

    #[test]
    fn unresolvable_patches_are_counted_not_fatal() {
        let patches = vec![
            Patch::inner_text("nope", "x"),
            Patch::reorder(
                "a",
                ReorderTarget {
                    after_id: Some("title".into()),
                    before_id: None,
                },
            ),
            Patch::reorder("a", ReorderTarget::default()),
            Patch::set_attr("b", "fill", "green"),
        ];
        let (doc, report) = replay(&base(), &patches);
        assert_eq!(report.applied, 1);
        assert_eq!(report.total, 4);
        let reasons: Vec<SkipReason> = report.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::TargetNotFound,
                SkipReason::ReferenceNotSibling,
                SkipReason::ReferenceNotFound
            ]
        );
        assert_eq!(layer_order(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn replaying_twice_matches_replaying_once() {
        let patches = vec![
            Patch::reorder(
                "a",
                ReorderTarget {
                    after_id: Some("c".into()),
                    before_id: None,
                },
            ),
            Patch::set_attr("b", "opacity", "0.5"),
            Patch::inner_text("title", "Once"),
        ];
        let (once, _) = replay(&base(), &patches);
        let mut twice = once.clone();
        apply_patches(&mut twice, &patches);
        assert_eq!(once.to_xml_string().unwrap(), twice.to_xml_string().unwrap());
    }
}
