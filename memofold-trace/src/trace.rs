use std::collections::HashMap;

use memofold::{Collapsible, MappableFrame};
use serde::Serialize;

/// One step of an instrumented fold. Node ids are assigned in expansion
/// order: the root is 0 and the children of any node get consecutive ids in
/// left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Expand { id: usize, parent: Option<usize> },
    Collapse { id: usize },
}

/// An ordered log of the expand/collapse events of one fold.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FoldTrace {
    events: Vec<TraceEvent>,
}

impl FoldTrace {
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Node ids in the order their algebra invocations ran.
    pub fn collapse_order(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Collapse { id } => Some(*id),
                TraceEvent::Expand { .. } => None,
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::Expand { .. }))
            .count()
    }

    /// True iff every node collapsed strictly after all of its children, and
    /// siblings collapsed left to right.
    pub fn is_post_order(&self) -> bool {
        let mut parents: HashMap<usize, Option<usize>> = HashMap::new();
        let mut collapse_pos: HashMap<usize, usize> = HashMap::new();

        for (pos, event) in self.events.iter().enumerate() {
            match event {
                TraceEvent::Expand { id, parent } => {
                    parents.insert(*id, *parent);
                }
                TraceEvent::Collapse { id } => {
                    collapse_pos.insert(*id, pos);
                }
            }
        }

        // every expanded node must have collapsed exactly once
        if parents.len() != collapse_pos.len() {
            return false;
        }

        let mut last_sibling_pos: HashMap<usize, usize> = HashMap::new();
        let mut ids: Vec<usize> = parents.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let pos = match collapse_pos.get(&id) {
                Some(pos) => *pos,
                None => return false,
            };
            if let Some(Some(parent)) = parents.get(&id) {
                match collapse_pos.get(parent) {
                    Some(parent_pos) if pos < *parent_pos => {}
                    _ => return false,
                }
                // ids ascend left to right within a frame, so each sibling
                // must collapse after the previous one
                if let Some(prev) = last_sibling_pos.insert(*parent, pos) {
                    if prev >= pos {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Collapse a structure while recording a [`FoldTrace`] of the traversal.
pub trait CollapsibleTraceExt: Collapsible {
    /// Same result as [`Collapsible::collapse_frames`], plus the event log.
    fn collapse_frames_traced<Out>(
        self,
        collapse_frame: impl FnMut(<Self::FrameToken as MappableFrame>::Frame<Out>) -> Out,
    ) -> (Out, FoldTrace);
}

impl<X: Collapsible> CollapsibleTraceExt for X {
    fn collapse_frames_traced<Out>(
        self,
        mut collapse_frame: impl FnMut(<Self::FrameToken as MappableFrame>::Frame<Out>) -> Out,
    ) -> (Out, FoldTrace) {
        enum State<Seed, CollapsibleInternal> {
            Expand(usize, Seed),
            Collapse(usize, CollapsibleInternal),
        }

        // the stack machine from memofold's collapse_frames, with node ids
        // (val slot indices) doubling as trace ids
        let mut trace = FoldTrace::default();
        let mut parents: Vec<Option<usize>> = vec![None];
        let mut vals: Vec<Option<Out>> = vec![None];
        let mut stack = vec![State::Expand(0, self)];

        while let Some(item) = stack.pop() {
            match item {
                State::Expand(val_idx, seed) => {
                    trace.events.push(TraceEvent::Expand {
                        id: val_idx,
                        parent: parents[val_idx],
                    });
                    let node = seed.into_frame();
                    let mut seeds = Vec::new();
                    let node = <Self::FrameToken as MappableFrame>::map_frame(node, |seed| {
                        vals.push(None);
                        parents.push(Some(val_idx));
                        let idx = vals.len() - 1;
                        seeds.push(State::Expand(idx, seed));
                        idx
                    });

                    stack.push(State::Collapse(val_idx, node));
                    stack.extend(seeds.into_iter().rev());
                }
                State::Collapse(val_idx, node) => {
                    let node = <Self::FrameToken as MappableFrame>::map_frame(node, |k| {
                        vals[k].take().unwrap()
                    });
                    vals[val_idx] = Some(collapse_frame(node));
                    trace.events.push(TraceEvent::Collapse { id: val_idx });
                }
            };
        }
        (vals[0].take().unwrap(), trace)
    }
}
