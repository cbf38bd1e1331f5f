//! Transient per-cursor segment graph (spec §3, §4.3.2–§4.3.3).
//!
//! A [`SegmentArena`] owns every candidate segment considered at one outer
//! cursor position. Nodes are addressed by [`SegmentHandle`] rather than by
//! reference, so a chain can walk root-to-leaf and leaf-to-root without
//! fighting the borrow checker over back-links — the arena-of-nodes
//! structure spec §9 calls out as the natural implementation, and the one
//! that keeps chain traversal (the rule cascade walks each chain twice)
//! cache-friendly. The arena, and every handle into it, is scoped to a
//! single outer-loop step; nothing escapes but the emitted `Token`s.

/// Index into a [`SegmentArena`]. Cheap to copy, meaningless outside the
/// arena that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHandle(usize);

/// One candidate lexeme in a chain, plus enough bookkeeping to resolve
/// ambiguity without re-walking the source text.
#[derive(Debug, Clone, Copy)]
pub struct SegmentNode<'a> {
    /// The lexeme text this segment spans, or `""` for the synthetic root.
    pub seg_string: &'a str,
    /// Dictionary frequency of `seg_string` (`-1` for the synthetic root).
    pub frequency: i64,
    /// Position in the chain; the synthetic root is depth 0.
    pub depth: u32,
    /// Code points spanned by this segment alone.
    pub num_runes: u32,
    /// Code points spanned by the whole chain from root through this segment.
    pub cumulative_runes: u32,
    /// Byte offset in the source text immediately past this segment.
    pub text_offset: usize,
    /// Back-link to the parent segment; `None` only for the root.
    pub parent: Option<SegmentHandle>,
}

/// Owns every segment considered while resolving ambiguity at one cursor
/// position.
#[derive(Debug, Default)]
pub struct SegmentArena<'a> {
    nodes: Vec<SegmentNode<'a>>,
}

impl<'a> SegmentArena<'a> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Push the synthetic root segment for a cursor position and return its
    /// handle. `cumulative_runes` starts at 0; `depth` is 0.
    pub fn push_root(&mut self, text_offset: usize) -> SegmentHandle {
        self.nodes.push(SegmentNode {
            seg_string: "",
            frequency: -1,
            depth: 0,
            num_runes: 0,
            cumulative_runes: 0,
            text_offset,
            parent: None,
        });
        SegmentHandle(self.nodes.len() - 1)
    }

    /// Push a child segment extending `parent` by one dictionary lexeme.
    pub fn push_child(
        &mut self,
        parent: SegmentHandle,
        seg_string: &'a str,
        frequency: i64,
        num_runes: u32,
        text_offset: usize,
    ) -> SegmentHandle {
        let parent_node = self.get(parent);
        self.nodes.push(SegmentNode {
            seg_string,
            frequency,
            depth: parent_node.depth + 1,
            num_runes,
            cumulative_runes: parent_node.cumulative_runes + num_runes,
            text_offset,
            parent: Some(parent),
        });
        SegmentHandle(self.nodes.len() - 1)
    }

    pub fn get(&self, handle: SegmentHandle) -> &SegmentNode<'a> {
        &self.nodes[handle.0]
    }

    /// Walk from `leaf` back to (but excluding) the synthetic root,
    /// returning segments in root-to-leaf order.
    pub fn chain_root_to_leaf(&self, leaf: SegmentHandle) -> Vec<&SegmentNode<'a>> {
        let mut rev = Vec::new();
        let mut cur = Some(leaf);
        while let Some(h) = cur {
            let node = self.get(h);
            if node.depth == 0 {
                break;
            }
            rev.push(node);
            cur = node.parent;
        }
        rev.reverse();
        rev
    }
}
