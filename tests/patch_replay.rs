use svgform::patch::{IDENTITY_ATTR, SkipReason, locate};
use svgform::{Document, Patch, apply_patches, assign_identities, replay};

const TEMPLATE: &str = include_str!("data/id_card.svg");
const PATCHES: &str = include_str!("data/patches.json");

fn patches() -> Vec<Patch> {
    serde_json::from_str(PATCHES).unwrap()
}

fn child_ids(doc: &Document, parent: svgform::NodeId) -> Vec<String> {
    doc.child_elements(parent)
        .map(|c| doc.attr(c, IDENTITY_ATTR).unwrap_or_default().to_owned())
        .collect()
}

#[test]
fn fixture_log_replays_with_partial_success() {
    let base = Document::parse(TEMPLATE).unwrap();
    let (doc, report) = replay(&base, &patches());
    assert_eq!(report.total, 7);
    assert_eq!(report.applied, 6);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 5);
    assert_eq!(report.skipped[0].reason, SkipReason::TargetNotFound);

    let title = locate(&doc, "title").unwrap();
    assert_eq!(doc.text(title), "ID CARD");
    assert_eq!(doc.attr(title, "fill"), Some("#003366"));

    let surname = locate(&doc, "surname.text.max_20").unwrap();
    assert_eq!(doc.attr(surname, "font-size"), None);

    let gold = locate(&doc, "el-rect_2").unwrap();
    assert_eq!(doc.attr(gold, "fill"), Some("gold"));
    let group = doc.parent(gold).unwrap();
    assert_eq!(child_ids(&doc, group), ["el-rect_3", "el-rect_2"]);

    let top = child_ids(&doc, doc.root());
    let photo = top.iter().position(|k| k == "photo.upload").unwrap();
    assert_eq!(top[photo + 1], "title");
}

#[test]
fn identities_are_stable_across_parses() {
    let a = Document::parse(TEMPLATE).unwrap();
    let b = Document::parse(TEMPLATE).unwrap();
    let keys = |d: &Document| {
        assign_identities(d)
            .iter()
            .map(|(_, k)| k.to_owned())
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&a), keys(&b));
    let ka = keys(&a);
    assert!(ka.contains(&"el-rect_3".to_owned()));
    assert!(!ka.iter().any(|k| k == "note.text" || k == "bg.text"));
}

#[test]
fn replay_is_idempotent() {
    let base = Document::parse(TEMPLATE).unwrap();
    let log = patches();
    let (once, _) = replay(&base, &log);
    let mut twice = once.clone();
    apply_patches(&mut twice, &log);
    assert_eq!(once.to_xml_string().unwrap(), twice.to_xml_string().unwrap());
}

#[test]
fn patches_survive_a_serialization_round_trip() {
    let base = Document::parse(TEMPLATE).unwrap();
    let (first, _) = replay(&base, &patches());
    let saved = Document::parse(&base.to_xml_string().unwrap()).unwrap();
    let (second, report) = replay(&saved, &patches());
    assert_eq!(report.applied, 6);
    assert_eq!(first.to_xml_string().unwrap(), second.to_xml_string().unwrap());
}
