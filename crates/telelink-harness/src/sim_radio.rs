//! Simulated transceiver and air.
//!
//! The sender's radio writes onto a shared [`Air`]. The scripted peer hears
//! every successful transmit immediately and schedules its replies; a reply
//! is only captured if the sender's receiver is on when it arrives, and
//! anything arriving while the receiver is off is lost, as on real hardware.

use std::{cell::RefCell, collections::VecDeque, convert::Infallible, rc::Rc, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use telelink_core::{config::RadioSettings, env::Environment, radio::Radio};
use telelink_proto::{Control, Packet};
use tracing::trace;

use crate::{sim_env::SimEnv, sim_peer::SimPeer};

/// Carrier behaviour seen by the sender's probes.
#[derive(Debug, Clone)]
pub enum Contention {
    /// Channel always clear
    Clear,
    /// Channel busy for this many probes, clear afterwards
    BusyFor(u32),
    /// Channel never clears
    Always,
    /// Each probe independently busy with `probability`
    Random {
        /// Chance that a probe senses a carrier
        probability: f64,
        /// RNG seed
        seed: u64,
    },
}

/// Which way a frame crossed the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Written by the node under test
    Tx,
    /// Sent to the node under test
    Rx,
}

/// One frame on the air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEvent {
    /// Time the frame was written (Tx) or arrived (Rx)
    pub at: Duration,
    /// Direction relative to the node under test
    pub direction: Direction,
    /// Raw bytes
    pub bytes: Vec<u8>,
    /// Tx: radio reported success. Rx: the receiver captured it.
    pub delivered: bool,
}

impl WireEvent {
    /// Decoded packet, if the bytes form one.
    pub fn packet(&self) -> Option<Packet> {
        Packet::decode(&self.bytes).ok()
    }

    /// Control type, if the bytes form a packet.
    pub fn control(&self) -> Option<Control> {
        self.packet().map(|p| p.control)
    }
}

#[derive(Debug)]
struct AirState {
    peer: Option<SimPeer>,
    contention: Contention,
    rng: ChaCha8Rng,
    failing_writes: Vec<Control>,
    settings: Option<RadioSettings>,
    listening_since: Option<Duration>,
    in_flight: Vec<(Duration, Vec<u8>)>,
    rx_queue: VecDeque<Vec<u8>>,
    wire: Vec<WireEvent>,
    probes: u32,
    busy_probes: u32,
    flushes: u32,
    discipline_violations: u32,
}

impl AirState {
    /// Move frames that have arrived by `now` into the receive queue, or
    /// drop them if the receiver was off when they arrived.
    fn settle(&mut self, now: Duration) {
        let (due, later): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.in_flight).into_iter().partition(|(at, _)| *at <= now);
        self.in_flight = later;

        for (at, bytes) in due {
            let captured = self.listening_since.is_some_and(|since| at >= since);
            if captured {
                self.rx_queue.push_back(bytes.clone());
            }
            self.wire.push(WireEvent { at, direction: Direction::Rx, bytes, delivered: captured });
        }
    }

    fn carrier(&mut self) -> bool {
        self.probes += 1;
        let busy = match self.contention {
            Contention::Clear => false,
            Contention::BusyFor(n) => self.probes <= n,
            Contention::Always => true,
            Contention::Random { probability, .. } => self.rng.gen_bool(probability),
        };
        if busy {
            self.busy_probes += 1;
        }
        busy
    }
}

/// Shared view of the simulated air, for inspection after a run.
#[derive(Debug, Clone)]
pub struct Air {
    state: Rc<RefCell<AirState>>,
}

impl Air {
    /// Every frame so far, in order.
    pub fn wire(&self) -> Vec<WireEvent> {
        let mut wire = self.state.borrow().wire.clone();
        wire.sort_by_key(|event| event.at);
        wire
    }

    /// Frames of type `control` the node under test transmitted
    /// successfully.
    pub fn transmitted(&self, control: Control) -> usize {
        self.state
            .borrow()
            .wire
            .iter()
            .filter(|e| e.direction == Direction::Tx && e.delivered)
            .filter(|e| e.control() == Some(control))
            .count()
    }

    /// Carrier-sense probes made.
    pub fn probes(&self) -> u32 {
        self.state.borrow().probes
    }

    /// Probes that sensed a carrier.
    pub fn busy_probes(&self) -> u32 {
        self.state.borrow().busy_probes
    }

    /// Receive queue flushes.
    pub fn flushes(&self) -> u32 {
        self.state.borrow().flushes
    }

    /// Writes made while listening plus reads made while not listening.
    pub fn discipline_violations(&self) -> u32 {
        self.state.borrow().discipline_violations
    }

    /// Settings the node configured the radio with.
    pub fn settings(&self) -> Option<RadioSettings> {
        self.state.borrow().settings
    }

    /// Values the scripted peer has received in MSG packets.
    pub fn peer_delivered(&self) -> u64 {
        self.state.borrow().peer.as_ref().map_or(0, |peer| peer.responder().delivered())
    }

    /// Put an arbitrary frame on the air, arriving at `at`.
    pub fn inject(&self, at: Duration, bytes: Vec<u8>) {
        self.state.borrow_mut().in_flight.push((at, bytes));
    }
}

/// Simulated transceiver for the node under test.
#[derive(Debug, Clone)]
pub struct SimRadio {
    env: SimEnv,
    air: Air,
}

impl SimRadio {
    /// Radio on a clear channel with no peer.
    pub fn new(env: SimEnv) -> Self {
        let state = AirState {
            peer: None,
            contention: Contention::Clear,
            rng: ChaCha8Rng::seed_from_u64(0),
            failing_writes: Vec::new(),
            settings: None,
            listening_since: None,
            in_flight: Vec::new(),
            rx_queue: VecDeque::new(),
            wire: Vec::new(),
            probes: 0,
            busy_probes: 0,
            flushes: 0,
            discipline_violations: 0,
        };
        Self { env, air: Air { state: Rc::new(RefCell::new(state)) } }
    }

    /// Attach the scripted peer.
    #[must_use]
    pub fn with_peer(self, peer: SimPeer) -> Self {
        self.air.state.borrow_mut().peer = Some(peer);
        self
    }

    /// Set carrier behaviour.
    #[must_use]
    pub fn with_contention(self, contention: Contention) -> Self {
        {
            let mut state = self.air.state.borrow_mut();
            if let Contention::Random { seed, .. } = contention {
                state.rng = ChaCha8Rng::seed_from_u64(seed);
            }
            state.contention = contention;
        }
        self
    }

    /// Make every write of a `control` packet fail.
    #[must_use]
    pub fn failing_writes(self, control: Control) -> Self {
        self.air.state.borrow_mut().failing_writes.push(control);
        self
    }

    /// Handle on the shared air.
    pub fn air(&self) -> Air {
        self.air.clone()
    }
}

impl Radio for SimRadio {
    type Error = Infallible;

    fn configure(&mut self, settings: &RadioSettings) -> Result<(), Self::Error> {
        self.air.state.borrow_mut().settings = Some(*settings);
        Ok(())
    }

    fn start_listening(&mut self) {
        let mut state = self.air.state.borrow_mut();
        let now = self.env.now();
        state.settle(now);
        state.listening_since = Some(now);
    }

    fn stop_listening(&mut self) {
        let mut state = self.air.state.borrow_mut();
        state.settle(self.env.now());
        state.listening_since = None;
    }

    fn write(&mut self, frame: &[u8]) -> bool {
        let now = self.env.now();
        let mut state = self.air.state.borrow_mut();
        state.settle(now);

        if state.listening_since.is_some() {
            state.discipline_violations += 1;
        }

        let packet = Packet::decode(frame).ok();
        let fails = packet.is_some_and(|p| state.failing_writes.contains(&p.control));
        state.wire.push(WireEvent {
            at: now,
            direction: Direction::Tx,
            bytes: frame.to_vec(),
            delivered: !fails,
        });
        trace!(delivered = !fails, len = frame.len(), "sim write");

        if let (false, Some(packet)) = (fails, packet) {
            let replies = state.peer.as_mut().map(|peer| peer.on_air(&packet, now));
            for (at, reply) in replies.into_iter().flatten() {
                state.in_flight.push((at, reply.encode()));
            }
        }
        !fails
    }

    fn available(&mut self) -> bool {
        let mut state = self.air.state.borrow_mut();
        state.settle(self.env.now());
        if state.listening_since.is_none() {
            state.discipline_violations += 1;
        }
        !state.rx_queue.is_empty()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut state = self.air.state.borrow_mut();
        state.settle(self.env.now());
        let Some(frame) = state.rx_queue.pop_front() else {
            return 0;
        };
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        frame.len()
    }

    fn flush_rx(&mut self) {
        let mut state = self.air.state.borrow_mut();
        state.settle(self.env.now());
        state.rx_queue.clear();
        state.flushes += 1;
    }

    fn carrier_detected(&mut self) -> bool {
        self.air.state.borrow_mut().carrier()
    }
}
