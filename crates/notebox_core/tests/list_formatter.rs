use notebox_core::{
    apply_kind, char_count, BufferRegion, Caret, EditableRegion, ListKind, Region,
};

fn item_labels(content: &str) -> Vec<String> {
    let region = Region::parse(content);
    region
        .item_nodes()
        .into_iter()
        .map(|index| match &region.nodes[index] {
            notebox_core::format::region::Node::Item(item) => item.label_text(),
            _ => unreachable!(),
        })
        .collect()
}

fn selection_of(region: &BufferRegion) -> notebox_core::Selection {
    region.selection().expect("selection should resolve")
}

#[test]
fn wrapping_n_lines_yields_n_items_preserving_text() {
    let applied = apply_kind("alpha<br>beta<br>gamma<br>delta", None, ListKind::Bullet).unwrap();
    assert_eq!(item_labels(&applied.content), vec![
        "alpha", "beta", "gamma", "delta"
    ]);
}

#[test]
fn checkbox_scenario_round_trips_three_lines() {
    let applied = apply_kind("a<br>b<br>c", None, ListKind::Checkbox).unwrap();
    assert_eq!(item_labels(&applied.content), vec!["a", "b", "c"]);

    let mut buffer = BufferRegion::new(applied.content);
    buffer.select_all();
    let sel = selection_of(&buffer);
    let toggled = apply_kind(&buffer.content(), Some(&sel), ListKind::Checkbox).unwrap();
    assert_eq!(toggled.content, "a<br>b<br>c");
}

#[test]
fn number_to_bullet_and_back_renumbers_sequentially() {
    let numbered = apply_kind("x<br>y<br>z", None, ListKind::Number).unwrap();
    assert!(numbered.content.contains(">1.</span>"));
    assert!(numbered.content.contains(">3.</span>"));

    let mut buffer = BufferRegion::new(numbered.content);
    buffer.select_all();
    let sel = selection_of(&buffer);
    let bulleted = apply_kind(&buffer.content(), Some(&sel), ListKind::Bullet).unwrap();
    assert!(!bulleted.content.contains("number-marker"));

    let mut buffer = BufferRegion::new(bulleted.content);
    buffer.select_all();
    let sel = selection_of(&buffer);
    let renumbered = apply_kind(&buffer.content(), Some(&sel), ListKind::Number).unwrap();
    assert!(renumbered.content.contains(">1.</span>"));
    assert!(renumbered.content.contains(">2.</span>"));
    assert!(renumbered.content.contains(">3.</span>"));
    assert!(!renumbered.content.contains(">4.</span>"));
}

#[test]
fn number_on_empty_region_seeds_ordinal_one_with_caret() {
    let applied = apply_kind("", None, ListKind::Number).unwrap();
    assert!(applied.content.contains(">1.</span>"));
    assert_eq!(item_labels(&applied.content), vec![""]);
    assert_eq!(
        applied.caret,
        Some(Caret::ItemLabel { item: 0, offset: 0 })
    );
}

#[test]
fn mixed_kinds_convert_to_the_target_kind() {
    let bulleted = apply_kind("a<br>b", None, ListKind::Bullet).unwrap();

    // Convert only the first line to a checkbox.
    let mut buffer = BufferRegion::new(bulleted.content);
    buffer.select(1, 2);
    let sel = selection_of(&buffer);
    assert_eq!(sel.text, "a");
    let mixed = apply_kind(&buffer.content(), Some(&sel), ListKind::Checkbox).unwrap();
    assert!(mixed.content.contains("checkbox-item"));
    assert!(mixed.content.contains("bullet-item"));

    // A selection spanning both converts everything to checkboxes.
    let mut buffer = BufferRegion::new(mixed.content);
    buffer.select_all();
    let sel = selection_of(&buffer);
    let unified = apply_kind(&buffer.content(), Some(&sel), ListKind::Checkbox).unwrap();
    assert!(!unified.content.contains("bullet-item"));
    assert_eq!(item_labels(&unified.content), vec!["a", "b"]);
}

#[test]
fn char_count_equals_marker_stripped_text_length() {
    let plain = "one<br>two<br>three";
    let stripped_len = char_count(plain);

    for kind in [ListKind::Checkbox, ListKind::Bullet, ListKind::Number] {
        let applied = apply_kind(plain, None, kind).unwrap();
        assert_eq!(char_count(&applied.content), stripped_len);
    }
}

#[test]
fn rich_labels_survive_kind_changes() {
    let applied = apply_kind("<b>bold</b><br><i>lean</i>", None, ListKind::Checkbox).unwrap();
    assert!(applied.content.contains("<b>bold</b>"));

    let mut buffer = BufferRegion::new(applied.content);
    buffer.select_all();
    let sel = selection_of(&buffer);
    let bulleted = apply_kind(&buffer.content(), Some(&sel), ListKind::Bullet).unwrap();
    assert!(bulleted.content.contains("<b>bold</b>"));
    assert!(bulleted.content.contains("<i>lean</i>"));
}

#[test]
fn free_text_selection_wraps_only_selected_lines() {
    let content = "keep<br>wrap me<br>also keep";
    // Projection: "keep\nwrap me\nalso keep"; select "wrap me".
    let mut buffer = BufferRegion::new(content);
    buffer.select(5, 12);
    let sel = selection_of(&buffer);
    assert_eq!(sel.text, "wrap me");

    let applied = apply_kind(content, Some(&sel), ListKind::Checkbox).unwrap();
    assert_eq!(item_labels(&applied.content), vec!["wrap me"]);
    assert!(applied.content.contains("keep"));
    assert!(applied.content.contains("also keep"));
}

#[test]
fn empty_region_ignores_checkbox_and_bullet() {
    assert!(apply_kind("", None, ListKind::Checkbox).is_none());
    assert!(apply_kind("   ", None, ListKind::Bullet).is_none());
    assert!(apply_kind("<br>", None, ListKind::Checkbox).is_none());
}
