//! Parsed model of an editable region's content.
//!
//! # Responsibility
//! - Parse the widget's serialized fragments (item `<div>`s, inline
//!   runs, `<br>` separators) into a node list and back, losslessly.
//! - Project content to plain text with marker-span bookkeeping so
//!   selection offsets can be resolved against it.
//!
//! # Invariants
//! - Item `<div>`s never nest; labels hold inline HTML only.
//! - Serialization of an unmodified parse returns the input grammar.
//! - An item `<div>` that does not match the grammar degrades to an
//!   inline run instead of being dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static ITEM_DIV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="(checkbox-item(?: checked)?|bullet-item|number-item)">(.*?)</div>"#)
        .expect("valid item div regex")
});
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static CHECKBOX_INNER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)^<input type="checkbox"( checked)? contenteditable="false"><span>(.*)</span>$"#,
    )
    .expect("valid checkbox inner regex")
});
static BULLET_INNER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^<span class="bullet-marker" contenteditable="false">•</span><span>(.*)</span>$"#)
        .expect("valid bullet inner regex")
});
static NUMBER_INNER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)^<span class="number-marker" contenteditable="false">(\d+)\.</span><span>(.*)</span>$"#,
    )
    .expect("valid number inner regex")
});

/// The three mutually exclusive per-line item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Checkbox,
    Bullet,
    Number,
}

/// One marker'ed line: a non-editable marker plus an editable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub kind: ListKind,
    /// Inner HTML of the label span.
    pub label: String,
    /// Presentational flag; checkbox kind only.
    pub checked: bool,
    /// Visible ordinal; number kind only. Maintained by renumbering.
    pub ordinal: usize,
}

impl ListItem {
    pub fn new(kind: ListKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            checked: false,
            ordinal: 1,
        }
    }

    /// Plain text of the label, tags stripped and entities decoded.
    pub fn label_text(&self) -> String {
        strip_tags(&self.label)
    }

    fn marker_text(&self) -> String {
        match self.kind {
            // The checkbox control has no text representation.
            ListKind::Checkbox => String::new(),
            ListKind::Bullet => "•".to_string(),
            ListKind::Number => format!("{}.", self.ordinal),
        }
    }
}

/// One parsed node of a region's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A marker'ed line.
    Item(ListItem),
    /// An inline rich-text run without line breaks.
    Text(String),
    /// A `<br>` line separator between inline runs.
    Break,
}

/// Parsed content of one editable region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub nodes: Vec<Node>,
}

/// Plain-text projection of a region, with span bookkeeping.
///
/// Lines are separated by `\n`; marker glyphs are part of the text
/// (they are visible), but their spans are recorded so callers can
/// refuse selections that land inside a marker. All offsets are char
/// offsets, not byte offsets.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub text: String,
    marker_spans: Vec<Range<usize>>,
    node_spans: Vec<NodeSpan>,
}

#[derive(Debug, Clone)]
pub struct NodeSpan {
    /// Index into `Region::nodes`.
    pub node: usize,
    /// Char range this node's text occupies in the projection.
    pub range: Range<usize>,
    pub is_item: bool,
}

impl Projection {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// True when the offset falls strictly inside a marker glyph.
    pub fn in_marker(&self, offset: usize) -> bool {
        self.marker_spans
            .iter()
            .any(|span| offset > span.start && offset < span.end)
    }

    pub fn node_spans(&self) -> &[NodeSpan] {
        &self.node_spans
    }

    /// Char slice of the projection text.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.text
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}

/// An active text selection over a region's plain-text projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected plain text.
    pub text: String,
    /// Char offset of the selection start in the projection.
    pub start: usize,
    /// Char offset one past the selection end.
    pub end: usize,
}

/// Editable-region collaborator contract.
///
/// The rendering layer owns the real widget; the core only needs its
/// serialized content and the active selection, and writes new
/// content back after a mutation.
pub trait EditableRegion {
    fn content(&self) -> String;
    fn set_content(&mut self, html: &str);
    fn selection(&self) -> Option<Selection>;
}

/// In-memory region used by tests and headless callers.
#[derive(Debug, Clone, Default)]
pub struct BufferRegion {
    html: String,
    selection: Option<(usize, usize)>,
}

impl BufferRegion {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            selection: None,
        }
    }

    /// Selects `[start, end)` in projection char offsets.
    pub fn select(&mut self, start: usize, end: usize) {
        self.selection = Some((start, end));
    }

    /// Selects the whole projection.
    pub fn select_all(&mut self) {
        let len = Region::parse(&self.html).projection().char_len();
        self.selection = Some((0, len));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

impl EditableRegion for BufferRegion {
    fn content(&self) -> String {
        self.html.clone()
    }

    fn set_content(&mut self, html: &str) {
        self.html = html.to_string();
        self.selection = None;
    }

    fn selection(&self) -> Option<Selection> {
        let (start, end) = self.selection?;
        let projection = Region::parse(&self.html).projection();
        let end = end.min(projection.char_len());
        let start = start.min(end);
        Some(Selection {
            text: projection.slice(start, end),
            start,
            end,
        })
    }
}

impl Region {
    /// Parses a serialized fragment into the node model.
    pub fn parse(html: &str) -> Self {
        let mut nodes = Vec::new();
        let mut cursor = 0;

        for caps in ITEM_DIV_RE.captures_iter(html) {
            let whole = caps.get(0).expect("match group 0");
            push_inline_run(&mut nodes, &html[cursor..whole.start()]);

            let class = caps.get(1).map_or("", |m| m.as_str());
            let inner = caps.get(2).map_or("", |m| m.as_str());
            match parse_item(class, inner) {
                Some(item) => nodes.push(Node::Item(item)),
                None => push_inline_run(&mut nodes, whole.as_str()),
            }
            cursor = whole.end();
        }
        push_inline_run(&mut nodes, &html[cursor..]);

        Self { nodes }
    }

    /// Serializes the node model back into the content grammar.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Item(item) => out.push_str(&item_html(item)),
                Node::Text(run) => out.push_str(run),
                Node::Break => out.push_str("<br>"),
            }
        }
        out
    }

    /// True when the region holds no visible content at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|node| match node {
            Node::Item(_) => false,
            Node::Break => true,
            Node::Text(run) => strip_tags(run).trim().is_empty(),
        })
    }

    /// Node indices of every item line, in document order.
    pub fn item_nodes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| matches!(node, Node::Item(_)).then_some(index))
            .collect()
    }

    /// Builds the plain-text projection with span bookkeeping.
    pub fn projection(&self) -> Projection {
        let mut text = String::new();
        let mut len = 0usize;
        let mut marker_spans = Vec::new();
        let mut node_spans = Vec::new();

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Break => {
                    node_spans.push(NodeSpan {
                        node: index,
                        range: len..len + 1,
                        is_item: false,
                    });
                    text.push('\n');
                    len += 1;
                }
                Node::Text(run) => {
                    let plain = strip_tags(run);
                    let chars = plain.chars().count();
                    node_spans.push(NodeSpan {
                        node: index,
                        range: len..len + chars,
                        is_item: false,
                    });
                    text.push_str(&plain);
                    len += chars;
                }
                Node::Item(item) => {
                    // Block lines separate from preceding inline text.
                    if len > 0 && !text.ends_with('\n') {
                        text.push('\n');
                        len += 1;
                    }
                    let start = len;
                    let marker = item.marker_text();
                    let marker_chars = marker.chars().count();
                    if marker_chars > 0 {
                        marker_spans.push(start..start + marker_chars);
                    }
                    let label = item.label_text();
                    let label_chars = label.chars().count();
                    text.push_str(&marker);
                    text.push_str(&label);
                    len += marker_chars + label_chars;
                    node_spans.push(NodeSpan {
                        node: index,
                        range: start..len,
                        is_item: true,
                    });
                    text.push('\n');
                    len += 1;
                }
            }
        }

        Projection {
            text,
            marker_spans,
            node_spans,
        }
    }
}

fn parse_item(class: &str, inner: &str) -> Option<ListItem> {
    if class.starts_with("checkbox-item") {
        let caps = CHECKBOX_INNER_RE.captures(inner)?;
        let checked = caps.get(1).is_some() || class.ends_with(" checked");
        return Some(ListItem {
            kind: ListKind::Checkbox,
            label: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            checked,
            ordinal: 1,
        });
    }
    if class == "bullet-item" {
        let caps = BULLET_INNER_RE.captures(inner)?;
        return Some(ListItem::new(
            ListKind::Bullet,
            caps.get(1).map_or("", |m| m.as_str()),
        ));
    }
    if class == "number-item" {
        let caps = NUMBER_INNER_RE.captures(inner)?;
        let ordinal: usize = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1);
        let mut item = ListItem::new(ListKind::Number, caps.get(2).map_or("", |m| m.as_str()));
        item.ordinal = ordinal;
        return Some(item);
    }
    None
}

fn item_html(item: &ListItem) -> String {
    match item.kind {
        ListKind::Checkbox => {
            let checked = if item.checked { " checked" } else { "" };
            format!(
                "<div class=\"checkbox-item{checked}\"><input type=\"checkbox\"{checked} contenteditable=\"false\"><span>{}</span></div>",
                item.label
            )
        }
        ListKind::Bullet => format!(
            "<div class=\"bullet-item\"><span class=\"bullet-marker\" contenteditable=\"false\">•</span><span>{}</span></div>",
            item.label
        ),
        ListKind::Number => format!(
            "<div class=\"number-item\"><span class=\"number-marker\" contenteditable=\"false\">{}.</span><span>{}</span></div>",
            item.ordinal, item.label
        ),
    }
}

fn push_inline_run(nodes: &mut Vec<Node>, html: &str) {
    if html.is_empty() {
        return;
    }
    let mut cursor = 0;
    for br in BR_RE.find_iter(html) {
        let run = &html[cursor..br.start()];
        if !run.is_empty() {
            nodes.push(Node::Text(run.to_string()));
        }
        nodes.push(Node::Break);
        cursor = br.end();
    }
    let tail = &html[cursor..];
    if !tail.is_empty() {
        nodes.push(Node::Text(tail.to_string()));
    }
}

/// Strips tags and decodes the entities the widget itself produces.
///
/// Mirrors `textContent` semantics: soft `<br>` breaks inside labels
/// contribute nothing.
pub fn strip_tags(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, "");
    decode_entities(&without_tags)
}

/// Escapes plain text for insertion as label/run HTML.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Splits inline HTML at a plain-text char offset.
///
/// Tags contribute zero chars; an entity counts as one. The split
/// point always lands between HTML tokens, never inside a tag or
/// entity.
pub(crate) fn split_html_at(html: &str, text_offset: usize) -> (String, String) {
    if text_offset == 0 {
        return (String::new(), html.to_string());
    }

    let mut seen = 0usize;
    let mut i = 0usize;
    while i < html.len() {
        let c = html[i..].chars().next().expect("char at boundary");
        if c == '<' {
            match html[i..].find('>') {
                Some(close) => i += close + 1,
                None => i = html.len(),
            }
            continue;
        }

        let advance = if c == '&' {
            match html[i..].find(';') {
                // Entities are short; anything longer is a bare ampersand.
                Some(close) if close <= 9 => close + 1,
                _ => c.len_utf8(),
            }
        } else {
            c.len_utf8()
        };

        seen += 1;
        i += advance;
        if seen == text_offset {
            return (html[..i].to_string(), html[i..].to_string());
        }
    }

    (html.to_string(), String::new())
}

#[cfg(test)]
mod tests {
    use super::{split_html_at, strip_tags, ListKind, Node, Region};

    #[test]
    fn plain_runs_and_breaks_round_trip() {
        let region = Region::parse("a<br>b<br>c");
        assert_eq!(region.nodes.len(), 5);
        assert_eq!(region.serialize(), "a<br>b<br>c");
    }

    #[test]
    fn item_divs_parse_with_kind_and_label() {
        let html = "<div class=\"bullet-item\"><span class=\"bullet-marker\" contenteditable=\"false\">•</span><span>milk</span></div>";
        let region = Region::parse(html);
        match &region.nodes[0] {
            Node::Item(item) => {
                assert_eq!(item.kind, ListKind::Bullet);
                assert_eq!(item.label, "milk");
            }
            other => panic!("expected item node, got {other:?}"),
        }
        assert_eq!(region.serialize(), html);
    }

    #[test]
    fn checked_checkbox_round_trips() {
        let html = "<div class=\"checkbox-item checked\"><input type=\"checkbox\" checked contenteditable=\"false\"><span>done</span></div>";
        let region = Region::parse(html);
        match &region.nodes[0] {
            Node::Item(item) => assert!(item.checked),
            other => panic!("expected item node, got {other:?}"),
        }
        assert_eq!(region.serialize(), html);
    }

    #[test]
    fn malformed_item_div_degrades_to_inline_run() {
        let html = "<div class=\"checkbox-item\">no label span here</div>";
        let region = Region::parse(html);
        assert!(region.item_nodes().is_empty());
        assert_eq!(region.serialize(), html);
    }

    #[test]
    fn projection_marks_marker_spans() {
        let html = "<div class=\"number-item\"><span class=\"number-marker\" contenteditable=\"false\">12.</span><span>x</span></div>";
        let projection = Region::parse(html).projection();
        assert_eq!(projection.text, "12.x\n");
        assert!(projection.in_marker(1));
        assert!(projection.in_marker(2));
        assert!(!projection.in_marker(0));
        assert!(!projection.in_marker(3));
    }

    #[test]
    fn strip_tags_decodes_entities_and_drops_soft_breaks() {
        assert_eq!(strip_tags("a<br>b"), "ab");
        assert_eq!(strip_tags("<b>x &amp; y</b>"), "x & y");
        assert_eq!(strip_tags("one&nbsp;two"), "one two");
    }

    #[test]
    fn split_html_skips_tags_and_counts_entities_once() {
        let (head, tail) = split_html_at("a<b>bc</b>d", 2);
        assert_eq!(head, "a<b>b");
        assert_eq!(tail, "c</b>d");

        let (head, tail) = split_html_at("x&amp;y", 2);
        assert_eq!(head, "x&amp;");
        assert_eq!(tail, "y");

        let (head, tail) = split_html_at("ab", 9);
        assert_eq!(head, "ab");
        assert_eq!(tail, "");
    }
}
