//! List-kind conversion over an editable region's content.
//!
//! # Responsibility
//! - Convert a selection or a whole region between plain lines and
//!   checkbox/bullet/number items, and back.
//! - Maintain the numbering invariant after every structural change.
//! - Provide the per-line editing operations (split, soft break,
//!   backspace merge, checked toggle).
//!
//! # Invariants
//! - Matched-item detection is a substring test of each label's plain
//!   text against the selection's plain text. Repeated or overlapping
//!   label text can over-match; this mirrors the shipped behavior and
//!   is a known limitation, not a text diff.
//! - Defensive short-circuits return `None`; callers cannot tell
//!   "nothing to do" from "not applicable".

use super::region::{
    escape_html, split_html_at, strip_tags, ListItem, ListKind, Node, Region, Selection,
};
use once_cell::sync::Lazy;
use regex::Regex;

// Leading bullet/number literals typed as plain text, stripped before
// wrapping free-text lines into items.
static ARTIFACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:•|\d+\.)\s*").expect("valid artifact regex"));

/// Result of a formatter mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Re-serialized region content.
    pub content: String,
    /// Where the caller should place the caret, when it matters.
    pub caret: Option<Caret>,
}

/// Caret placement hint for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    /// Inside the label of the `item`-th item line (char offset).
    ItemLabel { item: usize, offset: usize },
}

/// Applies a list kind to the selection, or to the whole region when
/// there is no usable selection.
///
/// Returns `None` for every no-op case: empty region for non-number
/// kinds, selection endpoints inside a marker, selection outside the
/// region, or nothing wrappable.
pub fn apply_kind(content: &str, selection: Option<&Selection>, kind: ListKind) -> Option<Applied> {
    let region = Region::parse(content);
    match selection {
        Some(sel) if !sel.text.trim().is_empty() => apply_to_selection(region, sel, kind),
        _ => wrap_region(region, kind),
    }
}

/// Reassigns number ordinals to 1-based document-order positions.
pub fn renumber(region: &mut Region) {
    let mut ordinal = 0;
    for node in &mut region.nodes {
        if let Node::Item(item) = node {
            if item.kind == ListKind::Number {
                ordinal += 1;
                item.ordinal = ordinal;
            }
        }
    }
}

/// Splits an item's label at the caret; the text after the caret moves
/// into a new item of the same kind inserted immediately after.
pub fn split_item(content: &str, item_index: usize, offset: usize) -> Option<Applied> {
    let mut region = Region::parse(content);
    let node_index = *region.item_nodes().get(item_index)?;
    let Node::Item(current) = &mut region.nodes[node_index] else {
        return None;
    };

    let kind = current.kind;
    let (head, tail) = split_html_at(&current.label, offset);
    current.label = head;
    region
        .nodes
        .insert(node_index + 1, Node::Item(ListItem::new(kind, tail)));

    if kind == ListKind::Number {
        renumber(&mut region);
    }
    Some(Applied {
        content: region.serialize(),
        caret: Some(Caret::ItemLabel {
            item: item_index + 1,
            offset: 0,
        }),
    })
}

/// Inserts a soft `<br>` line break inside an item's label without
/// creating a new item.
pub fn soft_break(content: &str, item_index: usize, offset: usize) -> Option<Applied> {
    let mut region = Region::parse(content);
    let node_index = *region.item_nodes().get(item_index)?;
    let Node::Item(item) = &mut region.nodes[node_index] else {
        return None;
    };

    let (head, tail) = split_html_at(&item.label, offset);
    item.label = format!("{head}<br>{tail}");
    Some(Applied {
        content: region.serialize(),
        caret: Some(Caret::ItemLabel {
            item: item_index,
            offset,
        }),
    })
}

/// Backspace at the start of an empty number label: the item collapses
/// into a plain line break and the list renumbers.
pub fn backspace_merge(content: &str, item_index: usize) -> Option<Applied> {
    let mut region = Region::parse(content);
    let node_index = *region.item_nodes().get(item_index)?;
    let Node::Item(item) = &region.nodes[node_index] else {
        return None;
    };
    if item.kind != ListKind::Number || !item.label_text().trim().is_empty() {
        return None;
    }

    region.nodes[node_index] = Node::Break;
    renumber(&mut region);
    Some(Applied {
        content: region.serialize(),
        caret: None,
    })
}

/// Flips a checkbox item's presentational checked flag.
pub fn toggle_checked(content: &str, item_index: usize) -> Option<Applied> {
    let mut region = Region::parse(content);
    let node_index = *region.item_nodes().get(item_index)?;
    let Node::Item(item) = &mut region.nodes[node_index] else {
        return None;
    };
    if item.kind != ListKind::Checkbox {
        return None;
    }

    item.checked = !item.checked;
    Some(Applied {
        content: region.serialize(),
        caret: None,
    })
}

fn apply_to_selection(mut region: Region, sel: &Selection, kind: ListKind) -> Option<Applied> {
    let projection = region.projection();
    if sel.start >= sel.end || sel.end > projection.char_len() {
        return None;
    }
    // Markers are not editable content; refuse endpoints inside one.
    if projection.in_marker(sel.start) || projection.in_marker(sel.end) {
        return None;
    }

    let matched: Vec<usize> = region
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| match node {
            Node::Item(item) => {
                let label = item.label_text();
                let label = label.trim().to_string();
                (!label.is_empty() && sel.text.contains(&label)).then_some(index)
            }
            _ => None,
        })
        .collect();

    if matched.is_empty() {
        return wrap_selection(region, sel, kind);
    }

    let kind_of = |region: &Region, index: usize| match &region.nodes[index] {
        Node::Item(item) => item.kind,
        _ => unreachable!("matched indices point at items"),
    };
    let all_target = matched.iter().all(|&index| kind_of(&region, index) == kind);
    let any_number = matched
        .iter()
        .any(|&index| kind_of(&region, index) == ListKind::Number);

    if all_target {
        // Toggle off: every matched item is already the target kind.
        for &index in matched.iter().rev() {
            let Node::Item(item) = &region.nodes[index] else {
                continue;
            };
            let label = item.label.clone();
            let is_last = index + 1 == region.nodes.len();
            let mut replacement = vec![Node::Text(label)];
            if !is_last {
                replacement.push(Node::Break);
            }
            region.nodes.splice(index..index + 1, replacement);
        }
        if kind == ListKind::Number {
            renumber(&mut region);
        }
    } else {
        // Kind conversion: rewrap matched lines, preserving labels.
        for &index in &matched {
            if let Node::Item(item) = &mut region.nodes[index] {
                item.kind = kind;
                item.checked = false;
            }
        }
        if kind == ListKind::Number || any_number {
            renumber(&mut region);
        }
    }

    Some(Applied {
        content: region.serialize(),
        caret: None,
    })
}

// Free-text case: no existing item matched. The selected plain lines
// are stripped of literal bullet/number artifacts and wrapped into new
// items inserted in place of the deleted selection.
fn wrap_selection(region: Region, sel: &Selection, kind: ListKind) -> Option<Applied> {
    let projection = region.projection();

    // A selection that touches an item line without matching it has no
    // defined transformation; bail out silently.
    let overlaps_item = projection
        .node_spans()
        .iter()
        .any(|span| span.is_item && span.range.start < sel.end && sel.start < span.range.end);
    if overlaps_item {
        return None;
    }

    let lines: Vec<String> = sel
        .text
        .split('\n')
        .map(|line| ARTIFACT_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }
    let new_items: Vec<Node> = lines
        .into_iter()
        .map(|line| Node::Item(ListItem::new(kind, escape_html(&line))))
        .collect();

    let mut out: Vec<Node> = Vec::new();
    let mut inserted = false;
    for span in projection.node_spans() {
        let node = &region.nodes[span.node];
        let covered = span.range.start < sel.end && sel.start < span.range.end;
        if !covered {
            out.push(node.clone());
            continue;
        }

        match node {
            Node::Text(run) => {
                let local_start = sel.start.saturating_sub(span.range.start);
                let local_end = sel.end.min(span.range.end) - span.range.start;
                let (head, rest) = split_html_at(run, local_start);
                let (_, tail) = split_html_at(&rest, local_end - local_start);
                if !head.is_empty() {
                    out.push(Node::Text(head));
                }
                if !inserted {
                    out.extend(new_items.iter().cloned());
                    inserted = true;
                }
                if !tail.is_empty() {
                    out.push(Node::Text(tail));
                }
            }
            Node::Break => {
                if !inserted {
                    out.extend(new_items.iter().cloned());
                    inserted = true;
                }
            }
            Node::Item(_) => out.push(node.clone()),
        }
    }
    if !inserted {
        return None;
    }

    let mut region = Region { nodes: out };
    if kind == ListKind::Number {
        renumber(&mut region);
    }
    Some(Applied {
        content: region.serialize(),
        caret: None,
    })
}

// Whole-region application: every line becomes an item of the target
// kind. An empty region only reacts to Number, seeding one empty
// numbered line with the caret inside it.
fn wrap_region(region: Region, kind: ListKind) -> Option<Applied> {
    if region.is_empty() {
        if kind != ListKind::Number {
            return None;
        }
        let mut region = Region {
            nodes: vec![Node::Item(ListItem::new(ListKind::Number, ""))],
        };
        renumber(&mut region);
        return Some(Applied {
            content: region.serialize(),
            caret: Some(Caret::ItemLabel { item: 0, offset: 0 }),
        });
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for node in &region.nodes {
        match node {
            Node::Text(run) => current.push_str(run),
            Node::Break => lines.push(std::mem::take(&mut current)),
            Node::Item(item) => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(item.label.clone());
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.retain(|line| !strip_tags(line).trim().is_empty());
    if lines.is_empty() {
        return None;
    }

    let mut region = Region {
        nodes: lines
            .into_iter()
            .map(|line| Node::Item(ListItem::new(kind, line.trim().to_string())))
            .collect(),
    };
    if kind == ListKind::Number {
        renumber(&mut region);
    }
    Some(Applied {
        content: region.serialize(),
        caret: None,
    })
}

#[cfg(test)]
mod tests {
    use super::super::region::{BufferRegion, EditableRegion, ListKind, Node, Region};
    use super::{apply_kind, backspace_merge, renumber, soft_break, split_item, toggle_checked};

    fn labels(content: &str) -> Vec<String> {
        let region = Region::parse(content);
        region
            .item_nodes()
            .into_iter()
            .map(|index| match &region.nodes[index] {
                Node::Item(item) => item.label.clone(),
                _ => unreachable!(),
            })
            .collect()
    }

    fn ordinals(content: &str) -> Vec<usize> {
        let region = Region::parse(content);
        region
            .item_nodes()
            .into_iter()
            .filter_map(|index| match &region.nodes[index] {
                Node::Item(item) if item.kind == ListKind::Number => Some(item.ordinal),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn whole_region_wrap_preserves_line_text() {
        let applied = apply_kind("a<br>b<br>c", None, ListKind::Checkbox).unwrap();
        assert_eq!(labels(&applied.content), vec!["a", "b", "c"]);
    }

    #[test]
    fn number_on_empty_region_seeds_single_line() {
        let applied = apply_kind("", None, ListKind::Number).unwrap();
        assert_eq!(ordinals(&applied.content), vec![1]);
        assert!(applied.caret.is_some());
        assert!(apply_kind("", None, ListKind::Bullet).is_none());
    }

    #[test]
    fn toggle_off_restores_plain_lines() {
        let applied = apply_kind("a<br>b<br>c", None, ListKind::Checkbox).unwrap();
        let mut buffer = BufferRegion::new(applied.content);
        buffer.select_all();
        let sel = buffer.selection().unwrap();
        let toggled = apply_kind(&buffer.content(), Some(&sel), ListKind::Checkbox).unwrap();
        assert_eq!(toggled.content, "a<br>b<br>c");
    }

    #[test]
    fn conversion_renumbers_without_gaps() {
        let numbered = apply_kind("a<br>b<br>c", None, ListKind::Number).unwrap();
        let mut buffer = BufferRegion::new(numbered.content);
        buffer.select_all();
        let sel = buffer.selection().unwrap();
        let bulleted = apply_kind(&buffer.content(), Some(&sel), ListKind::Bullet).unwrap();
        assert!(ordinals(&bulleted.content).is_empty());

        let mut buffer = BufferRegion::new(bulleted.content);
        buffer.select_all();
        let sel = buffer.selection().unwrap();
        let renumbered = apply_kind(&buffer.content(), Some(&sel), ListKind::Number).unwrap();
        assert_eq!(ordinals(&renumbered.content), vec![1, 2, 3]);
    }

    #[test]
    fn free_text_selection_strips_leading_artifacts() {
        let content = "• one<br>2. two";
        let mut buffer = BufferRegion::new(content);
        buffer.select_all();
        let sel = buffer.selection().unwrap();
        let applied = apply_kind(content, Some(&sel), ListKind::Bullet).unwrap();
        assert_eq!(labels(&applied.content), vec!["one", "two"]);
    }

    #[test]
    fn selection_inside_marker_is_a_noop() {
        let numbered = apply_kind("ten<br>eleven", None, ListKind::Number).unwrap();
        // Offset 1 sits inside the "1." marker of the first item.
        let mut buffer = BufferRegion::new(numbered.content.clone());
        buffer.select(1, 6);
        let sel = buffer.selection().unwrap();
        assert!(apply_kind(&numbered.content, Some(&sel), ListKind::Number).is_none());
    }

    #[test]
    fn split_moves_tail_into_new_item() {
        let numbered = apply_kind("alpha<br>beta", None, ListKind::Number).unwrap();
        let split = split_item(&numbered.content, 0, 2).unwrap();
        assert_eq!(labels(&split.content), vec!["al", "pha", "beta"]);
        assert_eq!(ordinals(&split.content), vec![1, 2, 3]);
    }

    #[test]
    fn soft_break_keeps_single_item() {
        let bulleted = apply_kind("hello", None, ListKind::Bullet).unwrap();
        let broken = soft_break(&bulleted.content, 0, 3).unwrap();
        assert_eq!(labels(&broken.content), vec!["hel<br>lo"]);
        assert_eq!(labels(&broken.content).len(), 1);
    }

    #[test]
    fn backspace_on_empty_number_label_merges_and_renumbers() {
        let numbered = apply_kind("a<br>b", None, ListKind::Number).unwrap();
        let split = split_item(&numbered.content, 0, 1).unwrap();
        assert_eq!(ordinals(&split.content), vec![1, 2, 3]);
        let merged = backspace_merge(&split.content, 1).unwrap();
        assert_eq!(ordinals(&merged.content), vec![1, 2]);
        // Non-empty labels refuse the merge.
        assert!(backspace_merge(&merged.content, 0).is_none());
    }

    #[test]
    fn toggle_checked_flips_presentational_flag_only() {
        let boxed = apply_kind("task", None, ListKind::Checkbox).unwrap();
        let checked = toggle_checked(&boxed.content, 0).unwrap();
        assert!(checked.content.contains("checkbox-item checked"));
        let unchecked = toggle_checked(&checked.content, 0).unwrap();
        assert_eq!(unchecked.content, boxed.content);
    }

    #[test]
    fn renumber_closes_gaps_from_stale_ordinals() {
        let html = "<div class=\"number-item\"><span class=\"number-marker\" contenteditable=\"false\">4.</span><span>x</span></div><div class=\"number-item\"><span class=\"number-marker\" contenteditable=\"false\">9.</span><span>y</span></div>";
        let mut region = Region::parse(html);
        renumber(&mut region);
        assert_eq!(ordinals(&region.serialize()), vec![1, 2]);
    }
}
