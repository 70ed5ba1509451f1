//! Inbound frame dispatch.
//!
//! Received OTA frames are routed through up to three registries: a handler
//! keyed by the frame's program id, a handler keyed by its source address,
//! and finally the "firehose" — an ordered list of universal handlers. Any
//! handler can stop a frame from going further by returning `false`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use npilink_protocol::RadioFrame;

use crate::link::Link;

/// Receives inbound OTA frames.
///
/// Handlers are invoked synchronously on the dispatch task; a slow handler
/// stalls all further RX delivery. The `link` back-reference lets a handler
/// synthesize responses, e.g. echo replies.
pub trait FrameHandler: Send + Sync {
    /// Handle one received frame. Return `true` to let later handlers see
    /// the frame too, `false` to stop processing it.
    fn receive(&self, link: &Link, src_addr: u32, program: u16, rssi: i8, payload: &[u8]) -> bool;
}

/// The three handler registries, guarded by one mutex on the link.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    by_program: HashMap<u16, Arc<dyn FrameHandler>>,
    by_address: HashMap<u32, Arc<dyn FrameHandler>>,
    firehose: Vec<Arc<dyn FrameHandler>>,
}

impl Link {
    /// Register `handler` for frames carrying `program`, replacing any
    /// previous handler for that program id.
    pub fn register_program_handler(&self, program: u16, handler: Arc<dyn FrameHandler>) {
        self.registry().by_program.insert(program, handler);
    }

    /// Register `handler` for frames originating from `src_addr`, replacing
    /// any previous handler for that address.
    pub fn register_address_handler(&self, src_addr: u32, handler: Arc<dyn FrameHandler>) {
        self.registry().by_address.insert(src_addr, handler);
    }

    /// Append `handler` to the firehose, the ordered list of universal
    /// handlers. Returns `false` if it is already there.
    pub fn register_firehose_handler(&self, handler: Arc<dyn FrameHandler>) -> bool {
        let mut registry = self.registry();
        if registry.firehose.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            return false;
        }
        registry.firehose.push(handler);
        true
    }

    /// Remove `handler` from every registry it occupies, the firehose
    /// included. Returns whether anything was removed.
    pub fn deregister_handler(&self, handler: &Arc<dyn FrameHandler>) -> bool {
        let mut registry = self.registry();
        let mut purged = false;
        registry.by_program.retain(|_, h| {
            let keep = !Arc::ptr_eq(h, handler);
            purged |= !keep;
            keep
        });
        registry.by_address.retain(|_, h| {
            let keep = !Arc::ptr_eq(h, handler);
            purged |= !keep;
            keep
        });
        let before = registry.firehose.len();
        registry.firehose.retain(|h| !Arc::ptr_eq(h, handler));
        purged |= registry.firehose.len() != before;
        purged
    }

    /// Remove the handler for `program`, if any.
    pub fn deregister_program_handler(&self, program: u16) -> bool {
        self.registry().by_program.remove(&program).is_some()
    }

    /// Remove the handler for `src_addr`, if any.
    pub fn deregister_address_handler(&self, src_addr: u32) -> bool {
        self.registry().by_address.remove(&src_addr).is_some()
    }
}

/// Dispatch task: route each received OTA frame through the registries.
pub(crate) async fn dispatch_loop(link: Link, mut frames: mpsc::Receiver<RadioFrame>) {
    loop {
        let frame = tokio::select! {
            _ = link.fault_token().cancelled() => return,
            frame = frames.recv() => match frame {
                Some(frame) => frame,
                None => return,
            },
        };
        deliver(&link, &frame);
    }
}

/// Walk one frame through program handler, address handler, firehose.
fn deliver(link: &Link, frame: &RadioFrame) {
    // Handlers are cloned out of the registry and invoked with the lock
    // released, so they are free to register and deregister.
    let by_program = link.registry().by_program.get(&frame.program).cloned();
    if let Some(handler) = by_program {
        if !handler.receive(link, frame.address, frame.program, frame.rssi, &frame.payload) {
            return;
        }
    }

    let by_address = link.registry().by_address.get(&frame.address).cloned();
    if let Some(handler) = by_address {
        if !handler.receive(link, frame.address, frame.program, frame.rssi, &frame.payload) {
            return;
        }
    }

    let firehose = link.registry().firehose.clone();
    for handler in firehose {
        if !handler.receive(link, frame.address, frame.program, frame.rssi, &frame.payload) {
            break;
        }
    }
}
