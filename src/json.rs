//! [`TreeSource`] implementation for [`serde_json::Value`].
//!
//! The JSON document stays wherever the caller keeps it; the walker only
//! borrows it per pass and materializes one [`JsonNode`] per visible value.
//! Identity is the path of [`Selector`]s from the root, so openness survives
//! the document being re-fetched or partially changing.

use std::borrow::Cow;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;

use crate::node::NodeData;
use crate::walker::{TreeSource, TreeWalker, WalkStep};

/// One step on the path from the JSON root to a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Key(String),
    Index(usize),
}

const KEY: Style = Style::new().fg(Color::Blue);
const INDEX: Style = Style::new().fg(Color::Cyan);

const NAME_SEPARATOR: Span = Span {
    content: Cow::Borrowed(": "),
    style: Style::new().fg(Color::DarkGray),
};

const BOOL: Style = Style::new().fg(Color::Magenta);
const NULL: Style = Style::new().fg(Color::DarkGray);
const NUMBER: Style = Style::new().fg(Color::LightBlue);
const STRING: Style = Style::new().fg(Color::Green);

fn has_children(value: &Value) -> bool {
    match value {
        Value::Array(array) => !array.is_empty(),
        Value::Object(object) => !object.is_empty(),
        _ => false,
    }
}

fn children_of(value: &Value) -> Vec<(Selector, &Value)> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Vec::new(),
        Value::Array(array) => array
            .iter()
            .enumerate()
            .map(|(index, value)| (Selector::Index(index), value))
            .collect(),
        Value::Object(object) => object
            .iter()
            .map(|(key, value)| (Selector::Key(key.clone()), value))
            .collect(),
    }
}

fn value_span(value: &Value) -> Span<'static> {
    match value {
        Value::Array(array) if array.is_empty() => Span::raw("[]"),
        Value::Array(_) => Span::raw("["),
        Value::Object(object) if object.is_empty() => Span::raw("{}"),
        Value::Object(_) => Span::raw("{"),
        Value::Null => Span::styled("null", NULL),
        Value::Bool(true) => Span::styled("true", BOOL),
        Value::Bool(false) => Span::styled("false", BOOL),
        Value::Number(number) => Span::styled(number.to_string(), NUMBER),
        Value::String(string) => Span::styled(string.clone(), STRING),
    }
}

/// Snapshot of one JSON value as kept in the record store.
///
/// Everything needed to render the row is materialized at walk time, the
/// original document is not referenced afterwards.
#[derive(Debug, Clone)]
pub struct JsonNode {
    identifier: Vec<Selector>,
    line: Line<'static>,
    depth: usize,
    has_children: bool,
}

impl JsonNode {
    fn new(identifier: Vec<Selector>, value: &Value) -> Self {
        let key_span = identifier.last().map(|selector| match selector {
            Selector::Key(key) => Span::styled(key.clone(), KEY),
            Selector::Index(index) => Span::styled(index.to_string(), INDEX),
        });
        let spans = key_span.map_or_else(
            || vec![value_span(value)],
            |key| vec![key, NAME_SEPARATOR, value_span(value)],
        );
        Self {
            depth: identifier.len().saturating_sub(1),
            has_children: has_children(value),
            line: Line::from(spans),
            identifier,
        }
    }

    /// Zero based depth. Depth 0 means top level with 0 indentation.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn has_children(&self) -> bool {
        self.has_children
    }
}

impl NodeData for JsonNode {
    type Identifier = Vec<Selector>;

    fn identifier(&self) -> &Vec<Selector> {
        &self.identifier
    }

    fn is_open_by_default(&self) -> bool {
        false
    }

    fn render(
        &self,
        is_open: bool,
        area: ratatui::layout::Rect,
        buffer: &mut ratatui::buffer::Buffer,
    ) {
        let indent_width = self.depth * 2;
        let (after_indent_x, _) = buffer.set_stringn(
            area.x,
            area.y,
            " ".repeat(indent_width),
            area.width as usize,
            Style::new(),
        );

        let symbol = if !self.has_children {
            crate::NODE_NO_CHILDREN_SYMBOL
        } else if is_open {
            crate::NODE_OPEN_SYMBOL
        } else {
            crate::NODE_CLOSED_SYMBOL
        };
        let max_width = area.width.saturating_sub(after_indent_x - area.x);
        let (after_symbol_x, _) = buffer.set_stringn(
            after_indent_x,
            area.y,
            symbol,
            max_width as usize,
            Style::new(),
        );

        let max_line_width = area.width.saturating_sub(after_symbol_x - area.x);
        buffer.set_line(after_symbol_x, area.y, &self.line, max_line_width);
    }
}

/// Depth-first walker over a borrowed [`serde_json::Value`].
///
/// A root with children is transparent: its entries are the top level.
/// A scalar or empty root is yielded as a single node with an empty path.
pub struct JsonWalker<'json> {
    stack: Vec<Frame<'json>>,
    pending_children: Option<(&'json Value, Vec<Selector>)>,
    scalar_root: Option<&'json Value>,
}

struct Frame<'json> {
    entries: std::vec::IntoIter<(Selector, &'json Value)>,
    path: Vec<Selector>,
}

impl<'json> JsonWalker<'json> {
    #[must_use]
    pub fn new(root: &'json Value) -> Self {
        if has_children(root) {
            Self {
                stack: vec![Frame {
                    entries: children_of(root).into_iter(),
                    path: Vec::new(),
                }],
                pending_children: None,
                scalar_root: None,
            }
        } else {
            Self {
                stack: Vec::new(),
                pending_children: None,
                scalar_root: Some(root),
            }
        }
    }
}

impl TreeWalker for JsonWalker<'_> {
    type Data = JsonNode;

    fn next_node(&mut self, was_previous_open: bool) -> Option<WalkStep<JsonNode>> {
        if let Some(root) = self.scalar_root.take() {
            return Some(WalkStep::Node(JsonNode::new(Vec::new(), root)));
        }

        if let Some((value, path)) = self.pending_children.take() {
            if was_previous_open && has_children(value) {
                self.stack.push(Frame {
                    entries: children_of(value).into_iter(),
                    path,
                });
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            if let Some((selector, value)) = frame.entries.next() {
                let mut identifier = frame.path.clone();
                identifier.push(selector);
                self.pending_children = Some((value, identifier.clone()));
                return Some(WalkStep::Node(JsonNode::new(identifier, value)));
            }
            self.stack.pop();
        }
    }
}

impl TreeSource for Value {
    type Data = JsonNode;
    type Walker<'a> = JsonWalker<'a> where Self: 'a;

    fn walk(&self, _refresh_nodes: bool) -> JsonWalker<'_> {
        JsonWalker::new(self)
    }
}

#[cfg(test)]
fn key(key: &str) -> Selector {
    Selector::Key(key.to_owned())
}

#[cfg(test)]
const fn index(index: usize) -> Selector {
    Selector::Index(index)
}

#[cfg(test)]
mod walk_tests {
    use super::*;

    #[track_caller]
    fn case(json: &str, open: &[Vec<Selector>]) -> Vec<Vec<Selector>> {
        let json: Value = serde_json::from_str(json).expect("invalid JSON string");
        let mut walker = json.walk(false);
        let mut result = Vec::new();
        let mut was_previous_open = false;
        while let Some(step) = walker.next_node(was_previous_open) {
            let WalkStep::Node(node) = step else {
                unreachable!("json walker only yields full nodes");
            };
            was_previous_open = open.contains(node.identifier());
            result.push(node.identifier().clone());
        }
        result
    }

    #[test]
    fn empty_array_has_root_node() {
        assert_eq!(case("[]", &[]), [Vec::new()]);
    }

    #[test]
    fn empty_object_has_root_node() {
        assert_eq!(case("{}", &[]), [Vec::new()]);
    }

    #[test]
    fn number_has_single_node() {
        assert_eq!(case("42", &[]), [Vec::new()]);
    }

    #[test]
    fn root_array_has_multiple_nodes() {
        assert_eq!(case("[13, 37]", &[]), [vec![index(0)], vec![index(1)]]);
    }

    #[test]
    fn root_object_has_multiple_nodes() {
        assert_eq!(
            case(r#"{"foo": "bar", "something": true}"#, &[]),
            [vec![key("foo")], vec![key("something")]]
        );
    }

    #[test]
    fn deep_example() {
        let open = [vec![key("foo")], vec![key("foo"), key("bar")]];
        assert_eq!(
            case(r#"{"foo": {"bar": [13, 37]}, "something": [42]}"#, &open),
            [
                vec![key("foo")],
                vec![key("foo"), key("bar")],
                vec![key("foo"), key("bar"), index(0)],
                vec![key("foo"), key("bar"), index(1)],
                vec![key("something")],
            ]
        );
    }
}

#[cfg(test)]
mod render_tests {
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    use super::*;
    use crate::{Tree, TreeState, UpdateOptions};

    /// Strips colors after render
    #[must_use]
    #[track_caller]
    fn render(width: u16, height: u16, json: &Value, state: &mut TreeState<JsonNode>) -> Buffer {
        let tree = Tree::new(json);
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        ratatui::widgets::StatefulWidget::render(tree, area, &mut buffer, state);
        buffer.set_style(area, Style::reset());
        buffer
    }

    #[test]
    fn number() {
        let json = serde_json::json!(42);
        let buffer = render(5, 2, &json, &mut TreeState::default());
        let expected = Buffer::with_lines(["  42 ", "     "]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn all_simple_in_array() {
        let json: Value =
            serde_json::from_str(r#"[null, true, false, [], {}, 42, "lalala"]"#).unwrap();
        let buffer = render(12, 8, &json, &mut TreeState::default());
        let expected = Buffer::with_lines([
            "  0: null   ",
            "  1: true   ",
            "  2: false  ",
            "  3: []     ",
            "  4: {}     ",
            "  5: 42     ",
            "  6: lalala ",
            "            ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn bigger_example() {
        let json: Value =
            serde_json::from_str(r#"{"foo": {"bar": [13, 37]}, "test": true}"#).unwrap();

        let mut state = TreeState::default();
        state.recompute(&json, UpdateOptions::default()).unwrap();
        state.toggle(&json, &vec![key("foo")]).unwrap();
        state.toggle(&json, &vec![key("foo"), key("bar")]).unwrap();

        let buffer = render(14, 6, &json, &mut state);
        let expected = Buffer::with_lines([
            "▼ foo: {      ",
            "  ▼ bar: [    ",
            "      0: 13   ",
            "      1: 37   ",
            "  test: true  ",
            "              ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn toggled_state_survives_document_change() {
        let before: Value = serde_json::from_str(r#"{"foo": {"bar": 1}}"#).unwrap();
        let after: Value = serde_json::from_str(r#"{"foo": {"bar": 2}, "new": null}"#).unwrap();

        let mut state = TreeState::default();
        state.recompute(&before, UpdateOptions::default()).unwrap();
        state.toggle(&before, &vec![key("foo")]).unwrap();

        state.refresh(&after).unwrap();
        assert!(state.is_open(&vec![key("foo")]));

        let buffer = render(12, 4, &after, &mut state);
        let expected = Buffer::with_lines([
            "▼ foo: {    ",
            "    bar: 2  ",
            "  new: null ",
            "            ",
        ]);
        assert_eq!(buffer, expected);
    }
}
