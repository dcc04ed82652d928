use crate::node::NodeData;

/// One step yielded by a [`TreeWalker`].
///
/// Traversal completion is signaled by the walker returning `None` instead.
pub enum WalkStep<Data: NodeData> {
    /// The node is unchanged. Reuse the existing record's data verbatim.
    ///
    /// Yielding a reference to an identifier the engine has never seen is a
    /// walker bug and aborts the recomputation with an error.
    Reference(Data::Identifier),

    /// The node's data is new or changed. (Re)materialize its record.
    Node(Data),
}

/// A resumable depth-first traversal over the visible part of a tree.
///
/// The engine drives the walker to completion once per recomputation,
/// resuming it exactly once per consumed step.
pub trait TreeWalker {
    type Data: NodeData;

    /// Yield the next visible node, or `None` when the traversal is complete.
    ///
    /// `was_previous_open` is the current openness of the node most recently
    /// yielded (`false` on the first resume). The walker decides based on this
    /// feedback whether to descend: children of a closed node must not be
    /// yielded. Nodes have to come in the exact depth-first visible order
    /// wanted for the final rows, the engine never sorts.
    fn next_node(&mut self, was_previous_open: bool) -> Option<WalkStep<Self::Data>>;
}

/// Factory for [`TreeWalker`]s, implemented by the owner of the tree.
///
/// The engine does not store any tree topology itself.
/// It obtains a fresh walker from the source on every recomputation.
pub trait TreeSource {
    type Data: NodeData;
    type Walker<'a>: TreeWalker<Data = Self::Data>
    where
        Self: 'a;

    /// Begin a new traversal pass.
    ///
    /// `refresh_nodes` hints that cached node data may be stale and should be
    /// re-read from the underlying source. Walkers over purely in-memory data
    /// can ignore it and always yield full nodes.
    fn walk(&self, refresh_nodes: bool) -> Self::Walker<'_>;
}
