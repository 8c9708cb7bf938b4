//! Packet radio emulated over UDP.
//!
//! Each node binds one socket and sends every frame as one datagram to its
//! peer. Receiver semantics follow the transceiver: datagrams that arrive
//! while the receiver is off are lost, frames are padded to the fixed payload
//! size, and carrier sense reports whether anything was heard during the last
//! listening window.

use std::{
    collections::VecDeque,
    io,
    net::{SocketAddr, UdpSocket},
};

use telelink_core::{
    config::RadioSettings,
    proto::{HEADER_SIZE, PACKET_SIZE},
    radio::Radio,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest datagram accepted from the socket.
const MAX_DATAGRAM: usize = 32;

/// Errors raised while bringing the emulated radio up.
#[derive(Debug, Error)]
pub enum UdpRadioError {
    /// Socket option could not be applied.
    #[error("socket setup failed: {0}")]
    Io(#[from] io::Error),

    /// Payload size cannot hold a packet.
    #[error("payload size {size} outside {min}..={max}")]
    PayloadSize {
        /// Requested size
        size: u8,
        /// Smallest usable size
        min: usize,
        /// Largest usable size
        max: usize,
    },
}

/// [`Radio`] over a non-blocking UDP socket.
#[derive(Debug)]
pub struct UdpRadio {
    socket: UdpSocket,
    peer: SocketAddr,
    payload_size: usize,
    listening: bool,
    heard: bool,
    rx_queue: VecDeque<Vec<u8>>,
}

impl UdpRadio {
    /// Bind `local` and address every frame to `peer`.
    pub fn bind(local: SocketAddr, peer: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            peer,
            payload_size: PACKET_SIZE,
            listening: false,
            heard: false,
            rx_queue: VecDeque::new(),
        })
    }

    /// Address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Address every following frame to `peer`.
    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.peer = peer;
    }

    /// Frames waiting in the receive queue.
    pub fn queued(&self) -> usize {
        self.rx_queue.len()
    }

    /// Drain the socket. Datagrams are kept only while the receiver is on.
    fn pump(&mut self) {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, from)) if self.listening => {
                    debug!(%from, len, "datagram received");
                    self.heard = true;
                    self.rx_queue.push_back(buf[..len].to_vec());
                },
                Ok((len, from)) => debug!(%from, len, "datagram lost, receiver off"),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!(error = %e, "socket receive failed");
                    break;
                },
            }
        }
    }
}

impl Radio for UdpRadio {
    type Error = UdpRadioError;

    fn configure(&mut self, settings: &RadioSettings) -> Result<(), Self::Error> {
        let size = usize::from(settings.payload_size);
        if !(HEADER_SIZE..=PACKET_SIZE).contains(&size) {
            return Err(UdpRadioError::PayloadSize {
                size: settings.payload_size,
                min: HEADER_SIZE,
                max: PACKET_SIZE,
            });
        }
        self.socket.set_nonblocking(true)?;
        self.payload_size = size;

        info!(
            channel = settings.channel,
            power = ?settings.power,
            data_rate = ?settings.data_rate,
            payload_size = size,
            auto_ack = settings.auto_ack,
            crc = settings.crc,
            "radio configured"
        );
        Ok(())
    }

    fn start_listening(&mut self) {
        self.pump();
        self.listening = true;
        self.heard = false;
    }

    fn stop_listening(&mut self) {
        self.pump();
        self.listening = false;
    }

    fn write(&mut self, frame: &[u8]) -> bool {
        if self.listening {
            warn!("write while listening");
            return false;
        }
        let mut datagram = frame.to_vec();
        if datagram.len() < self.payload_size {
            datagram.resize(self.payload_size, 0);
        }
        match self.socket.send_to(&datagram, self.peer) {
            Ok(sent) => sent == datagram.len(),
            Err(e) => {
                warn!(error = %e, peer = %self.peer, "datagram send failed");
                false
            },
        }
    }

    fn available(&mut self) -> bool {
        self.pump();
        !self.rx_queue.is_empty()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let Some(frame) = self.rx_queue.pop_front() else {
            return 0;
        };
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        frame.len()
    }

    fn flush_rx(&mut self) {
        self.pump();
        self.rx_queue.clear();
    }

    fn carrier_detected(&mut self) -> bool {
        self.pump();
        self.heard
    }
}
