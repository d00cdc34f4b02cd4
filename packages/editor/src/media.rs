//! # Media Node Interaction
//!
//! Pointer-drag resize state for image and video nodes. Drag state is
//! interaction-transient: it lives here, keyed by node ID, never inside the
//! document tree, so the tree stays pure data.

use crate::document::Document;
use pressroom_schema::{NodeId, MAX_MEDIA_WIDTH, MIN_MEDIA_WIDTH};
use std::collections::HashMap;

/// In-progress resize drag for one media node.
#[derive(Debug, Clone, Copy)]
struct DragState {
    start_x: f64,
    start_width: u32,
}

/// Tracks active resize drags across the media nodes of one session.
#[derive(Debug, Default)]
pub struct MediaInteraction {
    drags: HashMap<NodeId, DragState>,
}

impl MediaInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer-down on a resize handle: capture the pointer's horizontal
    /// position and the node's current rendered width.
    ///
    /// A node at the default "100%" starts the drag from the maximum width.
    pub fn begin_resize(&mut self, doc: &Document, id: &str, pointer_x: f64) {
        let Some(attrs) = doc.find(id).and_then(|n| n.media_attrs()) else {
            return;
        };
        let start_width = attrs.width_px().unwrap_or(MAX_MEDIA_WIDTH);
        self.drags.insert(
            id.to_string(),
            DragState {
                start_x: pointer_x,
                start_width,
            },
        );
    }

    /// Pointer-move during a drag: the width the node should take now.
    ///
    /// Returns `None` when no drag is active for the node (moves after
    /// pointer-up are ignored). Each sample is an independent, idempotent
    /// width; duplicate or out-of-order moves are harmless.
    pub fn resize_width(&self, id: &str, pointer_x: f64) -> Option<u32> {
        let drag = self.drags.get(id)?;
        let delta = pointer_x - drag.start_x;
        let raw = drag.start_width as f64 + delta;
        Some(clamp_width(raw))
    }

    /// Pointer-up: end the drag. Further moves produce no width until a new
    /// drag starts.
    pub fn end_resize(&mut self, id: &str) {
        self.drags.remove(id);
    }

    pub fn is_resizing(&self, id: &str) -> bool {
        self.drags.contains_key(id)
    }

    /// Drop all drag state (document reset).
    pub fn clear(&mut self) {
        self.drags.clear();
    }
}

fn clamp_width(raw: f64) -> u32 {
    raw.clamp(MIN_MEDIA_WIDTH as f64, MAX_MEDIA_WIDTH as f64) as u32
}
