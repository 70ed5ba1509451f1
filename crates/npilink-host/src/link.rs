//! The client-facing link manager.
//!
//! [`Link`] sits on top of the PHY engine: it provides the OTA send path,
//! the synchronous control request/reply path with its deadline, handler
//! registration, and shutdown.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use npilink_protocol::{ControlRequest, ProtocolError, RadioFrame, MAX_PAYLOAD};

use crate::dispatch::{self, HandlerRegistry};
use crate::error::LinkError;
use crate::phy::{self, CtrlSubmission};

/// Link tunables.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// How long a synchronous control call waits for the device's reply.
    pub ctrl_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            ctrl_timeout: Duration::from_secs(3),
        }
    }
}

/// Handle to a running NPI link.
///
/// Cloning is cheap; all clones refer to the same link. The link runs until
/// [`Link::close`] is called or the PHY faults; either way every pending
/// operation resolves to [`LinkError::LinkFaulted`].
#[derive(Clone)]
pub struct Link {
    inner: Arc<LinkInner>,
}

struct LinkInner {
    ota_tx: mpsc::UnboundedSender<RadioFrame>,
    ctrl_tx: mpsc::Sender<CtrlSubmission>,
    fault: CancellationToken,
    registry: Mutex<HandlerRegistry>,
    config: LinkConfig,
}

impl Link {
    /// Attach to an open byte channel and start the PHY and dispatch tasks.
    ///
    /// The channel is typically a serial port opened 8-N-1 by the caller,
    /// but anything `AsyncRead + AsyncWrite` works, which is how the test
    /// suites drive the link end to end. Must be called from within a
    /// tokio runtime.
    pub fn attach<T>(io: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::attach_with_config(io, LinkConfig::default())
    }

    /// [`Link::attach`] with explicit tunables.
    pub fn attach_with_config<T>(io: T, config: LinkConfig) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let phy::PhyHandle {
            ota_tx,
            ctrl_tx,
            ota_rx,
            fault,
        } = phy::spawn(io);

        let link = Link {
            inner: Arc::new(LinkInner {
                ota_tx,
                ctrl_tx,
                fault,
                registry: Mutex::new(HandlerRegistry::default()),
                config,
            }),
        };
        tokio::spawn(dispatch::dispatch_loop(link.clone(), ota_rx));
        debug!("NPI link attached");
        link
    }

    /// Queue an OTA frame for transmission to `dst_addr`.
    ///
    /// The transmit queue is unbounded on the host side; pacing is the
    /// device's job, via squelch.
    pub fn send(&self, dst_addr: u32, program: u16, payload: &[u8]) -> Result<(), LinkError> {
        if self.inner.fault.is_cancelled() {
            return Err(LinkError::LinkFaulted);
        }
        if payload.len() > MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLong {
                max: MAX_PAYLOAD,
                actual: payload.len(),
            }
            .into());
        }
        let frame = RadioFrame::new(dst_addr, program, payload.to_vec());
        self.inner
            .ota_tx
            .send(frame)
            .map_err(|_| LinkError::LinkFaulted)
    }

    /// Send a control request and wait for the device's reply.
    ///
    /// Returns the reply's status byte and data. Fails with
    /// [`LinkError::CtrlTimeout`] when no reply arrives within
    /// [`LinkConfig::ctrl_timeout`], and [`LinkError::LinkFaulted`] when the
    /// link goes down while waiting.
    pub async fn ctrl(&self, command: u8, data: &[u8]) -> Result<(u8, Vec<u8>), LinkError> {
        let mut reply_rx = self.submit_ctrl(command, data).await?;

        let deadline = sleep(self.inner.config.ctrl_timeout);
        tokio::pin!(deadline);
        tokio::select! {
            _ = self.inner.fault.cancelled() => Err(LinkError::LinkFaulted),
            _ = &mut deadline => Err(LinkError::CtrlTimeout),
            reply = &mut reply_rx => match reply {
                Ok((status, data)) => Ok((status, data)),
                // Superseded by a newer request for the same command code;
                // this call still runs out its own deadline.
                Err(_) => {
                    tokio::select! {
                        _ = self.inner.fault.cancelled() => Err(LinkError::LinkFaulted),
                        _ = &mut deadline => Err(LinkError::CtrlTimeout),
                    }
                }
            },
        }
    }

    /// Send a control request without waiting for the reply.
    ///
    /// The reply, if one ever arrives, is dropped by the coordinator.
    pub async fn ctrl_forget(&self, command: u8, data: &[u8]) -> Result<(), LinkError> {
        let _reply_rx = self.submit_ctrl(command, data).await?;
        Ok(())
    }

    async fn submit_ctrl(
        &self,
        command: u8,
        data: &[u8],
    ) -> Result<oneshot::Receiver<(u8, Vec<u8>)>, LinkError> {
        if self.inner.fault.is_cancelled() {
            return Err(LinkError::LinkFaulted);
        }
        if data.len() > MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLong {
                max: MAX_PAYLOAD,
                actual: data.len(),
            }
            .into());
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        let submission = CtrlSubmission {
            request: ControlRequest::new(command, data.to_vec()),
            reply_tx,
        };
        self.inner
            .ctrl_tx
            .send(submission)
            .await
            .map_err(|_| LinkError::LinkFaulted)?;
        Ok(reply_rx)
    }

    /// Shut the link down. Every task exits and in-flight control calls
    /// resolve to [`LinkError::LinkFaulted`]. Nothing is drained.
    pub fn close(&self) -> Result<(), LinkError> {
        if self.inner.fault.is_cancelled() {
            return Err(LinkError::DoubleClose);
        }
        debug!("closing NPI link");
        self.inner.fault.cancel();
        Ok(())
    }

    /// Whether the PHY has faulted or the link was closed.
    pub fn is_faulted(&self) -> bool {
        self.inner.fault.is_cancelled()
    }

    pub(crate) fn fault_token(&self) -> &CancellationToken {
        &self.inner.fault
    }

    pub(crate) fn registry(&self) -> MutexGuard<'_, HandlerRegistry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
