use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use image::RgbaImage;
use tracing::debug;

use super::codec;
use crate::error::Result;

/// Handle identifying one submitted decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecodeTicket(pub u64);

/// A finished decode, successful or not.
#[derive(Debug)]
pub struct DecodeOutcome {
    pub ticket: DecodeTicket,
    pub result: Result<RgbaImage>,
}

/// Background image decoding.
///
/// Decodes run on the rayon pool and report back over a channel. Nothing is
/// applied to a raster here: the owner drains outcomes on its own thread,
/// in completion order. There is no cancellation.
#[derive(Debug)]
pub struct DecodeQueue {
    sender: Sender<DecodeOutcome>,
    receiver: Receiver<DecodeOutcome>,
    next_ticket: u64,
    in_flight: usize,
}

impl Default for DecodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            sender,
            receiver,
            next_ticket: 1,
            in_flight: 0,
        }
    }

    /// Start decoding `bytes`, scaled to `size x size`.
    pub fn submit(&mut self, bytes: Vec<u8>, size: u32) -> DecodeTicket {
        let ticket = DecodeTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight += 1;

        debug!(ticket = ticket.0, bytes = bytes.len(), "Queueing raster decode");

        let sender = self.sender.clone();
        rayon::spawn(move || {
            let result = codec::decode_to_size(&bytes, size);
            // The receiver lives as long as the queue; a send error only
            // means the queue was dropped and nobody wants the result.
            let _ = sender.send(DecodeOutcome { ticket, result });
        });

        ticket
    }

    /// Decodes submitted but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Every outcome that has completed so far, oldest completion first.
    pub fn try_drain(&mut self) -> Vec<DecodeOutcome> {
        let outcomes: Vec<_> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Block until the next outcome arrives or `timeout` elapses.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<DecodeOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.receiver.recv_timeout(timeout).ok()?;
        self.in_flight -= 1;
        Some(outcome)
    }
}
