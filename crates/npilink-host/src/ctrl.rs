//! High-level control API.
//!
//! Typed wrappers over the individual control commands. Each one issues the
//! command through [`Link::ctrl`], translates a non-OK status byte into
//! [`LinkError::CtrlStatus`], and parses the reply where the command
//! returns data.

use npilink_protocol::{
    AddressPair, ControlStatus, ProtocolError, RadioParams, CTRL_GET_ADDRESSES,
    CTRL_GET_IDENTIFIER, CTRL_GET_RF, CTRL_RUN_TX, CTRL_SET_ALTERNATE_ADDR, CTRL_SET_CENTERFREQ,
    CTRL_SET_LEDS, CTRL_SET_RF_ON, CTRL_SET_TXPOWER, CTRL_SET_TX_TICK, STATUS_OK,
};

use crate::error::LinkError;
use crate::link::Link;

impl Link {
    /// Read the firmware's compiled-in identifier string.
    pub async fn get_identifier(&self) -> Result<String, LinkError> {
        let reply = self.ctrl_ok(CTRL_GET_IDENTIFIER, &[]).await?;
        String::from_utf8(reply).map_err(|_| ProtocolError::InvalidUtf8.into())
    }

    /// Read the current radio parameters.
    pub async fn get_radio(&self) -> Result<RadioParams, LinkError> {
        let reply = self.ctrl_ok(CTRL_GET_RF, &[]).await?;
        Ok(RadioParams::parse(&reply)?)
    }

    /// Read the device's IEEE address and alternate address.
    pub async fn get_addresses(&self) -> Result<AddressPair, LinkError> {
        let reply = self.ctrl_ok(CTRL_GET_ADDRESSES, &[]).await?;
        Ok(AddressPair::parse(&reply)?)
    }

    /// Set the secondary listen address, or disable it with 0. Base
    /// stations use this to listen on a shared address besides their own.
    pub async fn set_alternate_address(&self, addr: u32) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_SET_ALTERNATE_ADDR, &addr.to_le_bytes())
            .await?;
        Ok(())
    }

    /// Set the RF center frequency.
    pub async fn set_frequency(&self, freq: u32) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_SET_CENTERFREQ, &freq.to_le_bytes()).await?;
        Ok(())
    }

    /// Set the TX power in dBm. The supported range depends on the firmware
    /// build; out-of-range values come back as a status error.
    pub async fn set_power(&self, dbm: i8) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_SET_TXPOWER, &[dbm as u8]).await?;
        Ok(())
    }

    /// Set the interval between automatic transmit ticks in milliseconds,
    /// or disable the tick with 0.
    pub async fn set_tx_interval(&self, ms: u16) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_SET_TX_TICK, &ms.to_le_bytes()).await?;
        Ok(())
    }

    /// Trigger a transmit of any frames queued on the device.
    pub async fn run_tx(&self) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_RUN_TX, &[]).await?;
        Ok(())
    }

    /// Switch the receiver on or off.
    pub async fn set_rx_on(&self, on: bool) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_SET_RF_ON, &[on as u8]).await?;
        Ok(())
    }

    /// Switch the device LEDs on or off.
    pub async fn set_leds(&self, on: bool) -> Result<(), LinkError> {
        self.ctrl_ok(CTRL_SET_LEDS, &[on as u8]).await?;
        Ok(())
    }

    /// Issue a control command and require an OK status.
    async fn ctrl_ok(&self, command: u8, data: &[u8]) -> Result<Vec<u8>, LinkError> {
        let (status, reply) = self.ctrl(command, data).await?;
        if status != STATUS_OK {
            return Err(LinkError::CtrlStatus(ControlStatus::from(status)));
        }
        Ok(reply)
    }
}
