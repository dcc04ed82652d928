/// Data of one tree node as produced by a [`TreeWalker`](crate::TreeWalker).
///
/// The engine never inspects the payload beyond this trait.
/// It keeps the last yielded snapshot per identifier in a [`NodeRecord`] and
/// asks it for its height and rendering when the node is visible.
pub trait NodeData {
    /// Unique identifier of the node within the whole tree.
    ///
    /// It is the only key by which the node's [`NodeRecord`] is found, updated or toggled.
    /// It has to stay stable across recomputations for the openness state to survive.
    ///
    /// The identifier does not need to be a `String` and is therefore generic.
    /// Sources traversing nested structures commonly use the path from the root,
    /// like `vec!["src", "main.rs"]` for the main file in a Rust cargo project.
    type Identifier: Clone + PartialEq + Eq + core::hash::Hash;

    #[must_use]
    fn identifier(&self) -> &Self::Identifier;

    /// Openness applied when the node is first seen or when default openness is (re)established.
    ///
    /// Once a user action changed the openness this value is ignored until a
    /// recomputation with [`use_default_openness`](crate::UpdateOptions::use_default_openness) resets it.
    #[must_use]
    fn is_open_by_default(&self) -> bool;

    /// Height of the node in terminal rows.
    #[must_use]
    fn height(&self) -> usize {
        1
    }

    /// Render the node to the buffer.
    ///
    /// Very similar to [`ratatui::widgets::Widget`].
    fn render(
        &self,
        is_open: bool,
        area: ratatui::layout::Rect,
        buffer: &mut ratatui::buffer::Buffer,
    );
}

/// State the engine keeps for one [identifier](NodeData::Identifier) ever seen during a walk.
///
/// Created on first sighting, then mutated on every later sighting.
/// Records are never deleted: an identifier absent from the newest walk simply
/// does not appear in the order, but its record (and with it the user-toggled
/// openness) persists in case the node reappears.
#[derive(Debug, Clone)]
pub struct NodeRecord<Data> {
    pub(crate) data: Data,
    pub(crate) is_open: bool,
}

impl<Data> NodeRecord<Data> {
    /// Last-known data snapshot, overwritten whenever a walk re-yields the node.
    #[must_use]
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Current openness of the node.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }
}
