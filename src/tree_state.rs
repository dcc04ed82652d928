use std::collections::HashMap;

use crate::compute::{compute_tree, UpdateOptions};
use crate::node::{NodeData, NodeRecord};
use crate::walker::TreeSource;

/// Keeps the visible order, the per-node records and the scroll position of a
/// [`Tree`](crate::Tree).
///
/// The state outlives any single traversal: records are created on first
/// sighting of an identifier and never deleted, so user-toggled openness
/// survives nodes temporarily disappearing from the walk (after filtering,
/// for example).
///
/// All mutating operations take `&mut self`, so recomputations are serialized
/// by the borrow checker. A stale pass overwriting a newer one cannot occur;
/// a multi-threaded host wraps the state in its own mutual exclusion.
///
/// # Example
///
/// ```
/// # use tui_lazy_tree::{TreeItem, TreeState};
/// let items = vec![TreeItem::new_leaf("l", "leaf")];
/// let mut state = TreeState::default();
/// state.recompute(&items, tui_lazy_tree::UpdateOptions::default())?;
/// assert_eq!(state.row_count(), 1);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct TreeState<Data: NodeData> {
    pub(super) offset: usize,
    pub(super) order: Option<Vec<Data::Identifier>>,
    pub(super) records: HashMap<Data::Identifier, NodeRecord<Data>>,
    pub(super) ensure_visible_on_next_render: Option<Data::Identifier>,
}

impl<Data: NodeData> Default for TreeState<Data> {
    fn default() -> Self {
        Self {
            offset: 0,
            order: None,
            records: HashMap::new(),
            ensure_visible_on_next_render: None,
        }
    }
}

impl<Data: NodeData> TreeState<Data> {
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    /// Identifiers of the currently visible rows in depth-first order.
    ///
    /// Empty before the first computation.
    #[must_use]
    pub fn order(&self) -> &[Data::Identifier] {
        self.order.as_deref().unwrap_or_default()
    }

    /// Amount of currently visible rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.order.as_ref().map_or(0, Vec::len)
    }

    /// Get the record of the given identifier, however it was last seen.
    #[must_use]
    pub fn record(&self, identifier: &Data::Identifier) -> Option<&NodeRecord<Data>> {
        self.records.get(identifier)
    }

    /// Resolve a visible row index to its record.
    #[must_use]
    pub fn record_at(&self, index: usize) -> Option<&NodeRecord<Data>> {
        self.order()
            .get(index)
            .and_then(|identifier| self.records.get(identifier))
    }

    #[must_use]
    pub fn is_open(&self, identifier: &Data::Identifier) -> bool {
        self.records
            .get(identifier)
            .map_or(false, NodeRecord::is_open)
    }

    /// Identifiers of all currently open records, visible or not.
    #[must_use]
    pub fn opened(&self) -> Vec<Data::Identifier> {
        self.records
            .iter()
            .filter(|(_, record)| record.is_open)
            .map(|(identifier, _)| identifier.clone())
            .collect()
    }

    /// Run one traversal pass of the source and merge it into this state.
    ///
    /// The first ever computation always runs with
    /// [`refresh_nodes`](UpdateOptions::refresh_nodes) enabled.
    /// The order is only replaced when the pass succeeds.
    ///
    /// # Errors
    ///
    /// Errors when the walker yields a [`Reference`](crate::WalkStep::Reference)
    /// to an identifier without a record.
    pub fn recompute<Source>(&mut self, source: &Source, options: UpdateOptions) -> std::io::Result<()>
    where
        Source: TreeSource<Data = Data>,
    {
        let options = UpdateOptions {
            refresh_nodes: options.refresh_nodes || self.order.is_none(),
            ..options
        };
        let order = compute_tree(source, options, &mut self.records)?;
        self.order = Some(order);
        Ok(())
    }

    /// Recompute with [`refresh_nodes`](UpdateOptions::refresh_nodes) enabled.
    ///
    /// Call this after replacing or reshaping the underlying source tree.
    /// No record is discarded, the usual merge semantics apply.
    ///
    /// # Errors
    ///
    /// See [`recompute`](Self::recompute).
    pub fn refresh<Source>(&mut self, source: &Source) -> std::io::Result<()>
    where
        Source: TreeSource<Data = Data>,
    {
        self.recompute(
            source,
            UpdateOptions {
                refresh_nodes: true,
                use_default_openness: false,
            },
        )
    }

    /// Flip the openness of a node and recompute.
    ///
    /// The pass runs with [`refresh_nodes`](UpdateOptions::refresh_nodes) set
    /// to the new openness, so freshly opened subtrees are re-read from source.
    ///
    /// Returns the new openness.
    ///
    /// # Errors
    ///
    /// Errors when no record exists for the identifier.
    pub fn toggle<Source>(
        &mut self,
        source: &Source,
        identifier: &Data::Identifier,
    ) -> std::io::Result<bool>
    where
        Source: TreeSource<Data = Data>,
    {
        let Some(record) = self.records.get_mut(identifier) else {
            return Err(unknown_identifier());
        };
        let is_open = !record.is_open;
        record.is_open = is_open;
        self.recompute(
            source,
            UpdateOptions {
                refresh_nodes: is_open,
                use_default_openness: false,
            },
        )?;
        Ok(is_open)
    }

    /// Set the openness of a node explicitly and recompute.
    ///
    /// # Errors
    ///
    /// Errors when no record exists for the identifier.
    pub fn set_open<Source>(
        &mut self,
        source: &Source,
        identifier: &Data::Identifier,
        is_open: bool,
    ) -> std::io::Result<()>
    where
        Source: TreeSource<Data = Data>,
    {
        let Some(record) = self.records.get_mut(identifier) else {
            return Err(unknown_identifier());
        };
        record.is_open = is_open;
        self.recompute(
            source,
            UpdateOptions {
                refresh_nodes: is_open,
                use_default_openness: false,
            },
        )
    }

    /// Scroll to the given visible row offset.
    pub fn scroll_to(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Scroll the specified amount of lines up
    ///
    /// Returns `true` when the scroll position changed.
    /// Returns `false` when the scrolling has reached the top.
    pub fn scroll_up(&mut self, lines: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(lines);
        before != self.offset
    }

    /// Scroll the specified amount of lines down
    ///
    /// In contrast to [`scroll_up()`](Self::scroll_up) this can not return whether the view position changed or not as the actual change is determined on render.
    /// Always returns `true`.
    pub fn scroll_down(&mut self, lines: usize) -> bool {
        self.offset = self.offset.saturating_add(lines);
        true
    }

    /// Ensure the node with the given identifier is visible on next render.
    ///
    /// Returns `false` without scrolling when the identifier is not part of
    /// the current visible order.
    pub fn scroll_to_item(&mut self, identifier: &Data::Identifier) -> bool {
        let found = self.order().contains(identifier);
        if found {
            self.ensure_visible_on_next_render = Some(identifier.clone());
        }
        found
    }
}

fn unknown_identifier() -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "no record exists for the identifier",
    )
}
