use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::node::{NodeData, NodeRecord};
use crate::walker::{TreeSource, TreeWalker, WalkStep};

/// Options for one recomputation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOptions {
    /// Hint to the walker that cached node data may be stale and should be re-read.
    pub refresh_nodes: bool,

    /// Reset the openness of **every** record (yielded by this pass or not)
    /// to its [`is_open_by_default`](crate::NodeData::is_open_by_default)
    /// before the walk begins.
    pub use_default_openness: bool,
}

/// Drive one walker pass to completion and merge it into the record store.
///
/// Records of identifiers the pass does not yield stay untouched in the store.
/// Returns the new visible order. The caller replaces its previous order with
/// it; the store itself is updated in place and only ever grows, so an order
/// entry without a record cannot occur.
pub(crate) fn compute_tree<Source: TreeSource>(
    source: &Source,
    options: UpdateOptions,
    records: &mut HashMap<<Source::Data as NodeData>::Identifier, NodeRecord<Source::Data>>,
) -> std::io::Result<Vec<<Source::Data as NodeData>::Identifier>> {
    if options.use_default_openness {
        for record in records.values_mut() {
            record.is_open = record.data.is_open_by_default();
        }
    }

    let mut walker = source.walk(options.refresh_nodes);
    let mut order = Vec::new();
    let mut is_previous_open = false;

    while let Some(step) = walker.next_node(is_previous_open) {
        let identifier = match step {
            WalkStep::Reference(identifier) => {
                let Some(record) = records.get_mut(&identifier) else {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "walker yielded a reference to an identifier without a record",
                    ));
                };
                if options.use_default_openness {
                    record.is_open = record.data.is_open_by_default();
                }
                is_previous_open = record.is_open;
                identifier
            }
            WalkStep::Node(data) => {
                let identifier = data.identifier().clone();
                match records.entry(identifier.clone()) {
                    Entry::Vacant(entry) => {
                        let is_open = data.is_open_by_default();
                        entry.insert(NodeRecord { data, is_open });
                        is_previous_open = is_open;
                    }
                    Entry::Occupied(mut entry) => {
                        let record = entry.get_mut();
                        record.data = data;
                        if options.use_default_openness {
                            record.is_open = record.data.is_open_by_default();
                        }
                        is_previous_open = record.is_open;
                    }
                }
                identifier
            }
        };
        order.push(identifier);
    }

    Ok(order)
}
