//! Serial PHY engine.
//!
//! Three cooperating tasks own the byte channel:
//!
//! - the **reader** reassembles inbound bytes into frames, handing OTA
//!   frames to the dispatch path and control replies to the coordinator;
//! - the **writer** serializes outbound frames, honoring the device's
//!   squelch back-pressure;
//! - the **coordinator** intercepts flow-control replies, correlates the
//!   remaining replies with pending control requests, and forwards client
//!   submissions to the writer.
//!
//! A single cancellation token is the shared fault signal: any PHY error
//! cancels it, and every task exits when it fires. The byte-channel halves
//! are dropped (closing the port) as their owning tasks return.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use npilink_protocol::{
    ControlReply, ControlRequest, FrameDecoder, InboundFrame, RadioFrame, CTRL_SQUELCH_HOST,
    CTRL_UNSQUELCH_HOST, STATUS_OK,
};

/// Depth of the control-side channels between the link and the PHY.
const CTRL_QUEUE_DEPTH: usize = 4;
/// Depth of the inbound OTA frame channel feeding the dispatcher.
const RX_QUEUE_DEPTH: usize = 4;
/// Serial read chunk size. Reads may return far less; the decoder copes.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// A control request paired with the channel its reply is delivered on.
pub(crate) struct CtrlSubmission {
    pub request: ControlRequest,
    pub reply_tx: oneshot::Sender<(u8, Vec<u8>)>,
}

/// Channel endpoints the link layer uses to talk to the PHY tasks.
pub(crate) struct PhyHandle {
    pub ota_tx: mpsc::UnboundedSender<RadioFrame>,
    pub ctrl_tx: mpsc::Sender<CtrlSubmission>,
    pub ota_rx: mpsc::Receiver<RadioFrame>,
    pub fault: CancellationToken,
}

/// Split the byte channel and launch the reader, writer, and coordinator.
pub(crate) fn spawn<T>(io: T) -> PhyHandle
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(io);
    let fault = CancellationToken::new();

    let (ota_tx, ota_out_rx) = mpsc::unbounded_channel();
    let (ota_in_tx, ota_rx) = mpsc::channel(RX_QUEUE_DEPTH);
    let (ctrl_tx, submit_rx) = mpsc::channel(CTRL_QUEUE_DEPTH);
    let (reply_tx, reply_rx) = mpsc::channel(CTRL_QUEUE_DEPTH);
    let (ctrl_write_tx, ctrl_write_rx) = mpsc::channel(CTRL_QUEUE_DEPTH);
    let (squelch_tx, squelch_rx) = watch::channel(false);

    tokio::spawn(read_loop(read_half, ota_in_tx, reply_tx, fault.clone()));
    tokio::spawn(write_loop(
        write_half,
        squelch_rx,
        ota_out_rx,
        ctrl_write_rx,
        fault.clone(),
    ));
    tokio::spawn(coordinate(
        reply_rx,
        submit_rx,
        ctrl_write_tx,
        squelch_tx,
        fault.clone(),
    ));

    PhyHandle {
        ota_tx,
        ctrl_tx,
        ota_rx,
        fault,
    }
}

/// Reader task: pull bytes off the PHY and emit parsed frames.
async fn read_loop<R>(
    mut phy: R,
    ota_in_tx: mpsc::Sender<RadioFrame>,
    reply_tx: mpsc::Sender<ControlReply>,
    fault: CancellationToken,
) where
    R: AsyncRead + Unpin + Send,
{
    let mut decoder = FrameDecoder::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let read = tokio::select! {
            _ = fault.cancelled() => return,
            read = phy.read(&mut chunk) => read,
        };
        let n = match read {
            Ok(0) => {
                warn!("PHY read hit end of stream");
                fault.cancel();
                return;
            }
            Ok(n) => n,
            Err(err) => {
                warn!("PHY read failed: {err}");
                fault.cancel();
                return;
            }
        };
        for &byte in &chunk[..n] {
            match decoder.feed(byte) {
                Some(InboundFrame::Radio(frame)) => {
                    trace!(
                        "RX OTA frame src={:08x} prog={:04x} len={}",
                        frame.address,
                        frame.program,
                        frame.payload.len()
                    );
                    if ota_in_tx.send(frame).await.is_err() {
                        return;
                    }
                }
                Some(InboundFrame::Ctrl(reply)) => {
                    if reply_tx.send(reply).await.is_err() {
                        return;
                    }
                }
                None => {}
            }
        }
    }
}

/// Writer task: serialize outbound frames onto the PHY.
async fn write_loop<W>(
    mut phy: W,
    mut squelch: watch::Receiver<bool>,
    mut ota_frames: mpsc::UnboundedReceiver<RadioFrame>,
    mut ctrl_frames: mpsc::Receiver<ControlRequest>,
    fault: CancellationToken,
) where
    W: AsyncWrite + Unpin + Send,
{
    loop {
        if *squelch.borrow_and_update() {
            // Squelched: the frame queues are left untouched until the
            // device clears the squelch or the link faults.
            debug!("writer squelched");
            loop {
                tokio::select! {
                    _ = fault.cancelled() => return,
                    changed = squelch.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if !*squelch.borrow_and_update() {
                            break;
                        }
                    }
                }
            }
            debug!("writer unsquelched");
        }

        let wire = tokio::select! {
            _ = fault.cancelled() => return,
            changed = squelch.changed() => {
                if changed.is_err() {
                    return;
                }
                continue;
            }
            frame = ota_frames.recv() => {
                let Some(frame) = frame else { return };
                match frame.serialize() {
                    Ok(wire) => wire,
                    Err(err) => {
                        warn!("dropping unencodable OTA frame: {err}");
                        continue;
                    }
                }
            }
            request = ctrl_frames.recv() => {
                let Some(request) = request else { return };
                match request.serialize() {
                    Ok(wire) => wire,
                    Err(err) => {
                        warn!("dropping unencodable control request: {err}");
                        continue;
                    }
                }
            }
        };

        let write = async {
            phy.write_all(&wire).await?;
            phy.flush().await
        };
        if let Err(err) = write.await {
            warn!("PHY write failed: {err}");
            fault.cancel();
            return;
        }
    }
}

/// Coordinator task: flow-control interception and reply correlation.
async fn coordinate(
    mut replies: mpsc::Receiver<ControlReply>,
    mut submissions: mpsc::Receiver<CtrlSubmission>,
    ctrl_write_tx: mpsc::Sender<ControlRequest>,
    squelch_tx: watch::Sender<bool>,
    fault: CancellationToken,
) {
    // At most one awaited request per command code. A resubmission for a
    // code overwrites the slot; the superseded waiter runs out its own
    // deadline.
    let mut pending: HashMap<u8, oneshot::Sender<(u8, Vec<u8>)>> = HashMap::new();
    loop {
        tokio::select! {
            _ = fault.cancelled() => return,
            reply = replies.recv() => {
                let Some(reply) = reply else { return };
                handle_reply(reply, &mut pending, &squelch_tx);
            }
            submission = submissions.recv() => {
                let Some(CtrlSubmission { request, reply_tx }) = submission else {
                    return;
                };
                pending.insert(request.command, reply_tx);
                if ctrl_write_tx.send(request).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Route one control reply: squelch toggles are consumed here, everything
/// else completes a pending request or is dropped.
fn handle_reply(
    reply: ControlReply,
    pending: &mut HashMap<u8, oneshot::Sender<(u8, Vec<u8>)>>,
    squelch_tx: &watch::Sender<bool>,
) {
    if reply.command == CTRL_SQUELCH_HOST && reply.status == STATUS_OK {
        debug!("device squelched host transmit");
        let _ = squelch_tx.send(true);
        return;
    }
    if reply.command == CTRL_UNSQUELCH_HOST && reply.status == STATUS_OK {
        debug!("device cleared host squelch");
        let _ = squelch_tx.send(false);
        return;
    }

    match pending.remove(&reply.command) {
        Some(reply_tx) => {
            // Fails if the waiter already timed out; the reply is dropped.
            let _ = reply_tx.send((reply.status, reply.reply));
        }
        None => {
            trace!("dropping unsolicited control reply cmd={:#04x}", reply.command);
        }
    }
}
