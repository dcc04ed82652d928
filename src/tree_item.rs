use std::collections::HashSet;

use ratatui::style::Style;
use ratatui::text::Text;

use crate::node::NodeData;
use crate::walker::{TreeSource, TreeWalker, WalkStep};

/// One item of an in-memory tree usable as a [`TreeSource`].
///
/// Can have zero or more `children`.
///
/// # Identifier
///
/// The `identifier` needs to be unique among its siblings but can be used again on parent or child `TreeItem`s.
/// A common example would be a filename which has to be unique in its directory while it can exist in another.
///
/// The walker yields the path from the root as the node identity
/// (see [`NodeData::Identifier`]), so `vec!["src", "main.rs"]` identifies the
/// main file in a Rust cargo project regardless of what else is visible.
///
/// The `text` can be different from its `identifier`.
/// To repeat the filename analogy: File browsers sometimes hide file extensions.
/// The filename `main.rs` is the identifier while its shown as `main`.
/// Two files `main.rs` and `main.toml` can exist in the same directory and can both be displayed as `main` but their identifier is different.
///
/// # Example
///
/// ```
/// # use tui_lazy_tree::TreeItem;
/// let a = TreeItem::new_leaf("l", "Leaf");
/// let b = TreeItem::new("r", "Root", vec![a])?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeItem<'text, Identifier> {
    pub(super) identifier: Identifier,
    pub(super) text: Text<'text>,
    pub(super) style: Style,
    pub(super) open_by_default: bool,
    pub(super) children: Vec<TreeItem<'text, Identifier>>,
}

impl<'text, Identifier> TreeItem<'text, Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash,
{
    /// Create a new `TreeItem` without children.
    #[must_use]
    pub fn new_leaf<T>(identifier: Identifier, text: T) -> Self
    where
        T: Into<Text<'text>>,
    {
        Self {
            identifier,
            text: text.into(),
            style: Style::new(),
            open_by_default: false,
            children: Vec::new(),
        }
    }

    /// Create a new `TreeItem` with children.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the children.
    pub fn new<T>(
        identifier: Identifier,
        text: T,
        children: Vec<TreeItem<'text, Identifier>>,
    ) -> std::io::Result<Self>
    where
        T: Into<Text<'text>>,
    {
        let identifiers = children
            .iter()
            .map(|item| &item.identifier)
            .collect::<HashSet<_>>();
        if identifiers.len() != children.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "The children contain duplicate identifiers",
            ));
        }

        Ok(Self {
            identifier,
            text: text.into(),
            style: Style::new(),
            open_by_default: false,
            children,
        })
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Get a reference to a child by index.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }

    /// Get a mutable reference to a child by index.
    ///
    /// When you choose to change the `identifier` the [`TreeState`](crate::TreeState) might not work as expected afterwards.
    #[must_use]
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.children.get_mut(index)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.text.height()
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Openness applied when the node is first seen or default openness is (re)established.
    #[must_use]
    pub const fn open_by_default(mut self, open_by_default: bool) -> Self {
        self.open_by_default = open_by_default;
        self
    }

    /// Add a child to the `TreeItem`.
    ///
    /// # Errors
    ///
    /// Errors when the `identifier` of the `child` already exists in the children.
    pub fn add_child(&mut self, child: TreeItem<'text, Identifier>) -> std::io::Result<()> {
        let existing = self
            .children
            .iter()
            .map(|item| &item.identifier)
            .collect::<HashSet<_>>();
        if existing.contains(&child.identifier) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "identifier already exists in the children",
            ));
        }

        self.children.push(child);
        Ok(())
    }
}

impl TreeItem<'static, &'static str> {
    #[cfg(test)]
    pub(crate) fn example() -> Vec<Self> {
        vec![
            Self::new_leaf("a", "Alfa"),
            Self::new(
                "b",
                "Bravo",
                vec![
                    Self::new_leaf("c", "Charlie"),
                    Self::new(
                        "d",
                        "Delta",
                        vec![Self::new_leaf("e", "Echo"), Self::new_leaf("f", "Foxtrot")],
                    )
                    .expect("all item identifiers are unique"),
                    Self::new_leaf("g", "Golf"),
                ],
            )
            .expect("all item identifiers are unique"),
            Self::new_leaf("h", "Hotel"),
        ]
    }
}

/// Node data materialized by the walker over [`TreeItem`]s.
///
/// Snapshots everything needed to render the row later, so the record store
/// stays usable even when the item temporarily vanishes from the walk.
#[derive(Debug, Clone)]
pub struct ItemNode<'text, Identifier> {
    identifier: Vec<Identifier>,
    text: Text<'text>,
    style: Style,
    depth: usize,
    has_children: bool,
    open_by_default: bool,
}

impl<Identifier> ItemNode<'_, Identifier> {
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

impl<Identifier> NodeData for ItemNode<'_, Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash,
{
    type Identifier = Vec<Identifier>;

    fn identifier(&self) -> &Vec<Identifier> {
        &self.identifier
    }

    fn is_open_by_default(&self) -> bool {
        self.open_by_default
    }

    fn height(&self) -> usize {
        self.text.height()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render(
        &self,
        is_open: bool,
        area: ratatui::layout::Rect,
        buffer: &mut ratatui::buffer::Buffer,
    ) {
        buffer.set_style(area, self.style);

        let indent_width = self.depth * 2;
        let (after_indent_x, _) = buffer.set_stringn(
            area.x,
            area.y,
            " ".repeat(indent_width),
            area.width as usize,
            self.style,
        );

        let symbol = if !self.has_children {
            crate::NODE_NO_CHILDREN_SYMBOL
        } else if is_open {
            crate::NODE_OPEN_SYMBOL
        } else {
            crate::NODE_CLOSED_SYMBOL
        };
        let max_width = area.width.saturating_sub(after_indent_x - area.x);
        let (after_symbol_x, _) =
            buffer.set_stringn(after_indent_x, area.y, symbol, max_width as usize, self.style);

        let max_text_width = area.width.saturating_sub(after_symbol_x - area.x);
        for (line_index, line) in self.text.lines.iter().enumerate() {
            buffer.set_line(
                after_symbol_x,
                area.y + line_index as u16,
                line,
                max_text_width,
            );
        }
    }
}

/// Depth-first walker over a slice of [`TreeItem`]s.
///
/// Descends into an item's children only when the openness feedback for the
/// item was `true`. Always yields full [`ItemNode`]s since the items are
/// already in memory; the `refresh_nodes` hint has nothing to re-read.
pub struct ItemWalker<'items, 'text, Identifier> {
    stack: Vec<Frame<'items, 'text, Identifier>>,
    pending_children: Option<(&'items [TreeItem<'text, Identifier>], Vec<Identifier>, usize)>,
}

struct Frame<'items, 'text, Identifier> {
    remaining: std::slice::Iter<'items, TreeItem<'text, Identifier>>,
    path: Vec<Identifier>,
    depth: usize,
}

impl<'items, 'text, Identifier> ItemWalker<'items, 'text, Identifier> {
    #[must_use]
    pub fn new(items: &'items [TreeItem<'text, Identifier>]) -> Self {
        Self {
            stack: vec![Frame {
                remaining: items.iter(),
                path: Vec::new(),
                depth: 0,
            }],
            pending_children: None,
        }
    }
}

impl<'text, Identifier> TreeWalker for ItemWalker<'_, 'text, Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash,
{
    type Data = ItemNode<'text, Identifier>;

    fn next_node(
        &mut self,
        was_previous_open: bool,
    ) -> Option<WalkStep<ItemNode<'text, Identifier>>> {
        if let Some((children, path, depth)) = self.pending_children.take() {
            if was_previous_open && !children.is_empty() {
                self.stack.push(Frame {
                    remaining: children.iter(),
                    path,
                    depth,
                });
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            if let Some(item) = frame.remaining.next() {
                let mut identifier = frame.path.clone();
                identifier.push(item.identifier.clone());
                let depth = frame.depth;
                self.pending_children = Some((&item.children, identifier.clone(), depth + 1));
                return Some(WalkStep::Node(ItemNode {
                    identifier,
                    text: item.text.clone(),
                    style: item.style,
                    depth,
                    has_children: !item.children.is_empty(),
                    open_by_default: item.open_by_default,
                }));
            }
            self.stack.pop();
        }
    }
}

impl<'text, Identifier> TreeSource for Vec<TreeItem<'text, Identifier>>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash,
{
    type Data = ItemNode<'text, Identifier>;
    type Walker<'a> = ItemWalker<'a, 'text, Identifier> where Self: 'a;

    fn walk(&self, _refresh_nodes: bool) -> ItemWalker<'_, 'text, Identifier> {
        ItemWalker::new(self)
    }
}

#[test]
#[should_panic = "duplicate identifiers"]
fn tree_item_new_errors_with_duplicate_identifiers() {
    let item = TreeItem::new_leaf("same", "text");
    let another = item.clone();
    TreeItem::new("root", "Root", vec![item, another]).unwrap();
}

#[test]
#[should_panic = "identifier already exists"]
fn tree_item_add_child_errors_with_duplicate_identifiers() {
    let item = TreeItem::new_leaf("same", "text");
    let another = item.clone();
    let mut root = TreeItem::new("root", "Root", vec![item]).unwrap();
    root.add_child(another).unwrap();
}

#[cfg(test)]
mod walk_tests {
    use super::*;
    use crate::walker::TreeWalker;

    /// Drive the walker with a fixed set of open paths, like one engine pass would.
    fn walk_with_open(open: &[Vec<&'static str>]) -> Vec<(Vec<&'static str>, usize)> {
        let items = TreeItem::example();
        let mut walker = ItemWalker::new(&items);
        let mut result = Vec::new();
        let mut was_previous_open = false;
        while let Some(step) = walker.next_node(was_previous_open) {
            let WalkStep::Node(node) = step else {
                unreachable!("item walker only yields full nodes");
            };
            was_previous_open = open.contains(node.identifier());
            result.push((node.identifier().clone(), node.depth()));
        }
        result
    }

    fn identifiers(open: &[Vec<&'static str>]) -> Vec<&'static str> {
        walk_with_open(open)
            .into_iter()
            .map(|(identifier, _)| *identifier.last().unwrap())
            .collect()
    }

    #[test]
    fn nothing_open_is_top_level() {
        assert_eq!(identifiers(&[]), ["a", "b", "h"]);
    }

    #[test]
    fn open_leaf_changes_nothing() {
        assert_eq!(identifiers(&[vec!["a"]]), ["a", "b", "h"]);
    }

    #[test]
    fn hidden_open_node_is_not_descended() {
        assert_eq!(identifiers(&[vec!["b", "d"]]), ["a", "b", "h"]);
    }

    #[test]
    fn one_is_open() {
        assert_eq!(identifiers(&[vec!["b"]]), ["a", "b", "c", "d", "g", "h"]);
    }

    #[test]
    fn all_open() {
        assert_eq!(
            identifiers(&[vec!["b"], vec!["b", "d"]]),
            ["a", "b", "c", "d", "e", "f", "g", "h"]
        );
    }

    #[test]
    fn depth_works() {
        let depths = walk_with_open(&[vec!["b"], vec!["b", "d"]])
            .into_iter()
            .map(|(_, depth)| depth)
            .collect::<Vec<_>>();
        assert_eq!(depths, [0, 0, 1, 1, 2, 2, 1, 0]);
    }
}
