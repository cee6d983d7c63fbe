//! Coalesces positioning requests to one per context per render tick.

use std::collections::BTreeMap;

use crate::messages::ContextId;

/// The request a context honours at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRequest {
    pub x: f64,
    pub y: f64,
    /// Skip the exited-row check and recompute the row.
    pub force: bool,
}

/// Pending position requests, keyed by context.
///
/// The latest point wins; `force` sticks once any request in the tick asked
/// for it.
#[derive(Debug, Default)]
pub struct PositionRequests {
    pending: BTreeMap<ContextId, PositionRequest>,
}

impl PositionRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer motion inside a context.
    pub fn request_pointer(&mut self, context: ContextId, x: f64, y: f64) {
        self.record(context, x, y, false);
    }

    /// The context scrolled under a stationary pointer.
    pub fn request_scroll(&mut self, context: ContextId, x: f64, y: f64) {
        self.record(context, x, y, true);
    }

    /// The pointer just entered the context.
    pub fn request_enter(&mut self, context: ContextId, x: f64, y: f64) {
        self.record(context, x, y, true);
    }

    /// Drops whatever a context had pending, e.g. when the pointer left it.
    pub fn cancel(&mut self, context: ContextId) {
        self.pending.remove(&context);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every pending request, in context order.
    pub fn take(&mut self) -> Vec<(ContextId, PositionRequest)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    fn record(&mut self, context: ContextId, x: f64, y: f64, force: bool) {
        self.pending
            .entry(context)
            .and_modify(|req| {
                req.x = x;
                req.y = y;
                req.force |= force;
            })
            .or_insert(PositionRequest { x, y, force });
    }
}
