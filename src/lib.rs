#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Widget built to lazily walk and render tree data structures.

The tree topology stays with the caller: a [`TreeSource`] hands out a resumable
[`TreeWalker`] per pass which yields the visible nodes in depth-first order,
descending into a node only when the openness feedback it receives says so.
The [`TreeState`] merges every pass into a persistent per-node record store,
so openness toggled by the user survives data refreshes and even nodes
temporarily disappearing from the walk.

The [`Tree`] widget is a thin windowed rendering surface over the computed
order. In-memory trees can use the bundled [`TreeItem`]s instead of writing a
walker by hand.
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Scrollbar, ScrollbarState, StatefulWidget, Widget};

mod compute;
mod node;
mod tree_item;
mod tree_state;
mod walker;

#[cfg(feature = "json")]
pub mod json;

pub use crate::compute::UpdateOptions;
pub use crate::node::{NodeData, NodeRecord};
pub use crate::tree_item::{ItemNode, ItemWalker, TreeItem};
pub use crate::tree_state::TreeState;
pub use crate::walker::{TreeSource, TreeWalker, WalkStep};

/// Symbol in front of a closed node (as in the children are currently not visible)
pub(crate) const NODE_CLOSED_SYMBOL: &str = "\u{25b6} "; // Arrow to right
/// Symbol in front of an open node (as in the children are currently visible)
pub(crate) const NODE_OPEN_SYMBOL: &str = "\u{25bc} "; // Arrow down
/// Symbol in front of a node without children
pub(crate) const NODE_NO_CHILDREN_SYMBOL: &str = "  ";

/// A `Tree` which can be rendered.
///
/// It only borrows the [`TreeSource`] for the current frame.
/// Everything that has to survive between frames (records, order, scroll
/// position) lives in the [`TreeState`].
///
/// # Example
///
/// ```
/// # use tui_lazy_tree::{Tree, TreeItem, TreeState};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let items = vec![TreeItem::new_leaf("l", "leaf")];
/// let mut state = TreeState::default();
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let tree_widget = Tree::new(&items).block(Block::bordered().title("Tree Widget"));
///
///     frame.render_stateful_widget(tree_widget, area, &mut state);
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tree<'a, Source> {
    source: &'a Source,

    block: Option<Block<'a>>,
    scrollbar: Option<Scrollbar<'a>>,
    /// Style used as a base style for the widget
    style: Style,
}

impl<'a, Source: TreeSource> Tree<'a, Source> {
    #[must_use]
    pub const fn new(source: &'a Source) -> Self {
        Self {
            source,
            block: None,
            scrollbar: None,
            style: Style::new(),
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show the scrollbar when rendering this widget.
    ///
    /// Experimental: Can change on any release without any additional notice.
    /// Its there to test and experiment with whats possible with scrolling widgets.
    /// Also see <https://github.com/ratatui-org/ratatui/issues/174>
    #[must_use]
    pub const fn experimental_scrollbar(mut self, scrollbar: Option<Scrollbar<'a>>) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl<Source: TreeSource> StatefulWidget for Tree<'_, Source> {
    type State = TreeState<Source::Data>;

    #[allow(clippy::too_many_lines)]
    fn render(self, full_area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        // First ever computation. Errors of a malformed source are only
        // observable through an explicit recompute, the render stays blank.
        if state.order.is_none() && state.recompute(self.source, UpdateOptions::default()).is_err()
        {
            return;
        }

        let visible_count = state.row_count();
        if visible_count == 0 {
            return;
        }
        let available_height = area.height as usize;

        let ensure_visible = state.ensure_visible_on_next_render.take();
        let ensure_index_in_view = ensure_visible.and_then(|identifier| {
            state
                .order()
                .iter()
                .position(|visible| *visible == identifier)
        });

        // Ensure last line is still visible
        let mut start = state.offset.min(visible_count.saturating_sub(1));

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
        }

        let mut end = start;
        let mut height = 0;
        while end < visible_count {
            let item_height = state
                .record_at(end)
                .map_or(1, |record| record.data().height());
            if height + item_height > available_height {
                break;
            }
            height += item_height;
            end += 1;
        }

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            while ensure_index_in_view >= end {
                height += state
                    .record_at(end)
                    .map_or(1, |record| record.data().height());
                end += 1;
                while height > available_height {
                    height = height.saturating_sub(
                        state
                            .record_at(start)
                            .map_or(1, |record| record.data().height()),
                    );
                    start += 1;
                }
            }
        }

        state.offset = start;

        if let Some(scrollbar) = self.scrollbar {
            let mut scrollbar_state = ScrollbarState::new(visible_count.saturating_sub(height))
                .position(start)
                .viewport_content_length(height);
            let scrollbar_area = Rect {
                // Inner height to be exactly as the content
                y: area.y,
                height: area.height,
                // Outer width to stay on the right border
                x: full_area.x,
                width: full_area.width,
            };
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }

        let mut current_height = 0;
        #[allow(clippy::cast_possible_truncation)]
        for index in start..end {
            let Some(record) = state.record_at(index) else {
                debug_assert!(false, "order entry without a record");
                continue;
            };

            let row_height = record.data().height() as u16;
            let row_area = Rect {
                x: area.x,
                y: area.y + current_height,
                width: area.width,
                height: row_height,
            };
            current_height += row_height;

            record.data().render(record.is_open(), row_area, buf);
        }
    }
}

impl<Source: TreeSource> Widget for Tree<'_, Source> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut state = TreeState::default();
        StatefulWidget::render(self, area, buf, &mut state);
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;

    type Items = Vec<TreeItem<'static, &'static str>>;
    type State = TreeState<ItemNode<'static, &'static str>>;

    #[track_caller]
    fn render(width: u16, height: u16, items: &Items, state: &mut State) -> Buffer {
        let tree = Tree::new(items);
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        StatefulWidget::render(tree, area, &mut buffer, state);
        buffer.set_style(area, Style::reset());
        buffer
    }

    #[test]
    fn no_items_renders_nothing() {
        let items = Items::new();
        let buffer = render(5, 2, &items, &mut State::default());
        let expected = Buffer::with_lines(["     ", "     "]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn closed_top_level() {
        let items = TreeItem::example();
        let buffer = render(14, 4, &items, &mut State::default());
        let expected = Buffer::with_lines([
            "  Alfa        ",
            "▶ Bravo       ",
            "  Hotel       ",
            "              ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn opened_nodes_show_their_children() {
        let items = TreeItem::example();
        let mut state = State::default();
        state.recompute(&items, UpdateOptions::default()).unwrap();
        state.set_open(&items, &vec!["b"], true).unwrap();
        state.set_open(&items, &vec!["b", "d"], true).unwrap();

        let buffer = render(14, 8, &items, &mut state);
        let expected = Buffer::with_lines([
            "  Alfa        ",
            "▼ Bravo       ",
            "    Charlie   ",
            "  ▼ Delta     ",
            "      Echo    ",
            "      Foxtrot ",
            "    Golf      ",
            "  Hotel       ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn scroll_to_item_moves_window() {
        let items = TreeItem::example();
        let mut state = State::default();
        state.recompute(&items, UpdateOptions::default()).unwrap();
        state.set_open(&items, &vec!["b"], true).unwrap();
        state.set_open(&items, &vec!["b", "d"], true).unwrap();
        assert!(state.scroll_to_item(&vec!["b", "d", "f"]));

        let buffer = render(14, 3, &items, &mut state);
        let expected = Buffer::with_lines([
            "  ▼ Delta     ",
            "      Echo    ",
            "      Foxtrot ",
        ]);
        assert_eq!(buffer, expected);
        assert_eq!(state.get_offset(), 3);
    }

    #[test]
    fn scrolled_down_window() {
        let items = TreeItem::example();
        let mut state = State::default();
        state.recompute(&items, UpdateOptions::default()).unwrap();
        state.set_open(&items, &vec!["b"], true).unwrap();
        state.set_open(&items, &vec!["b", "d"], true).unwrap();
        state.scroll_down(6);

        let buffer = render(14, 4, &items, &mut state);
        let expected = Buffer::with_lines([
            "    Golf      ",
            "  Hotel       ",
            "              ",
            "              ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn multiline_text_uses_multiple_rows() {
        let items = vec![
            TreeItem::new_leaf("m", "Multi\nLine"),
            TreeItem::new_leaf("x", "Xray"),
        ];
        let buffer = render(8, 3, &items, &mut State::default());
        let expected = Buffer::with_lines(["  Multi ", "  Line  ", "  Xray  "]);
        assert_eq!(buffer, expected);
    }
}
