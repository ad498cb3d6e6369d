// src/encoder/quadrature.rs

//! # Quadrature Decoder Module
//!
//! This module converts two-bit quadrature channel samples, delivered once
//! per edge-interrupt event, into a monotonically adjustable signed position
//! count.
//!
//! The decoder is edge-chasing: it works off discrete edge notifications
//! rather than a continuously sampled level, so after every event it asks
//! for both channels to be re-armed on the *next* transition of their
//! now-current level. The [`EncoderPins`] collaborator carries those
//! requests to the hardware.

use core::sync::atomic::{AtomicI32, Ordering};

/// A quadrature channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Channel A, the high bit of the two-bit sample.
    A,
    /// Channel B, the low bit of the two-bit sample.
    B,
}

/// The transition direction an edge interrupt should fire on next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTrigger {
    /// Fire when the channel rises.
    LowToHigh,
    /// Fire when the channel falls.
    HighToLow,
}

/// Instantaneous levels of the two quadrature channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelLevels {
    /// Channel A level.
    pub a: bool,
    /// Channel B level.
    pub b: bool,
}

impl ChannelLevels {
    /// Packs the two levels into the two-bit state `(A << 1) | B`.
    pub fn state(self) -> u8 {
        ((self.a as u8) << 1) | (self.b as u8)
    }

    /// The edge directions that chase the next transition of each channel:
    /// a low channel is armed for a rising edge and a high channel for a
    /// falling edge.
    pub fn rearm(self) -> [EdgeTrigger; 2] {
        let chase = |level: bool| {
            if level {
                EdgeTrigger::HighToLow
            } else {
                EdgeTrigger::LowToHigh
            }
        };
        [chase(self.a), chase(self.b)]
    }
}

/// Interface to the encoder pin hardware for one wheel.
///
/// Implementations sample the two channel levels on demand and accept
/// edge-direction reconfiguration requests from the decoder.
pub trait EncoderPins {
    /// Reads the current levels of channels A and B.
    fn levels(&mut self) -> ChannelLevels;
    /// Re-arms the edge interrupt of one channel for the given transition.
    fn set_edge_trigger(&mut self, channel: Channel, trigger: EdgeTrigger);
}

/// Increment per 4-bit transition code `(current << 2) | previous`.
///
/// The four codes in which both channels appear to change at once cannot be
/// produced by a single valid step; they are glitches and map to zero so the
/// count self-corrects at the next valid edge.
const TRANSITION_TABLE: [i8; 16] = [
    0,  // 0b0000: no movement
    1,  // 0b0001: count up
    -1, // 0b0010: count down
    0,  // 0b0011: glitch, both channels changed
    -1, // 0b0100: count down
    0,  // 0b0101: no movement
    0,  // 0b0110: glitch, both channels changed
    1,  // 0b0111: count up
    1,  // 0b1000: count up
    0,  // 0b1001: glitch, both channels changed
    0,  // 0b1010: no movement
    -1, // 0b1011: count down
    0,  // 0b1100: glitch, both channels changed
    -1, // 0b1101: count down
    1,  // 0b1110: count up
    0,  // 0b1111: no movement
];

/// Decodes quadrature edge events into a signed position count.
///
/// The count lives in an [`AtomicI32`] because it is written by the
/// asynchronous edge interrupt while the periodic control tick reads it;
/// [`QuadratureDecoder::position`] is safe to call from the tick without
/// masking the edge interrupt. The count accumulates net rotation with no
/// saturation or wraparound handling.
#[derive(Debug, Default)]
pub struct QuadratureDecoder {
    state_prev: u8,
    count: AtomicI32,
}

impl QuadratureDecoder {
    /// Creates a decoder with a zero count and an all-low previous state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the channel levels observed before edge interrupts are armed
    /// and returns the initial edge directions to configure.
    pub fn seed(&mut self, levels: ChannelLevels) -> [EdgeTrigger; 2] {
        self.state_prev = levels.state();
        levels.rearm()
    }

    /// Handles one edge event.
    ///
    /// Combines the previous and current two-bit samples into a 4-bit code,
    /// applies the transition table to the count, and returns the edge
    /// directions both channels must be re-armed with.
    pub fn on_edge(&mut self, levels: ChannelLevels) -> [EdgeTrigger; 2] {
        let state = levels.state();
        let code = (state << 2) | self.state_prev;
        let increment = TRANSITION_TABLE[code as usize];
        self.count.fetch_add(increment as i32, Ordering::Relaxed);
        self.state_prev = state;
        levels.rearm()
    }

    /// Returns the accumulated signed position count.
    pub fn position(&self) -> i32 {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Channel levels for a packed two-bit state.
    fn levels(state: u8) -> ChannelLevels {
        ChannelLevels {
            a: state & 0b10 != 0,
            b: state & 0b01 != 0,
        }
    }

    /// One full electrical cycle in the count-up direction.
    const UP_CYCLE: [u8; 4] = [0b10, 0b11, 0b01, 0b00];

    /// Test that a full up cycle counts one step per edge.
    #[test]
    fn test_quadrature_up_cycle() {
        let mut decoder = QuadratureDecoder::new();
        decoder.seed(levels(0b00));

        for state in UP_CYCLE {
            decoder.on_edge(levels(state));
        }
        assert_eq!(decoder.position(), 4, "One full cycle is four counts.");
    }

    /// Test that reversing the cycle counts back down to the start.
    #[test]
    fn test_quadrature_direction_reversal() {
        let mut decoder = QuadratureDecoder::new();
        decoder.seed(levels(0b00));

        for state in UP_CYCLE {
            decoder.on_edge(levels(state));
        }
        for state in [0b01, 0b11, 0b10, 0b00] {
            decoder.on_edge(levels(state));
        }
        assert_eq!(
            decoder.position(),
            0,
            "Forward and backward transitions should cancel."
        );
    }

    /// Test that sixteen consecutive valid up-count edges add exactly 16.
    #[test]
    fn test_quadrature_sixteen_up_counts() {
        let mut decoder = QuadratureDecoder::new();
        decoder.seed(levels(0b00));

        for _ in 0..4 {
            for state in UP_CYCLE {
                decoder.on_edge(levels(state));
            }
        }
        assert_eq!(decoder.position(), 16);
    }

    /// Test that a glitch code leaves the count unchanged.
    #[test]
    fn test_quadrature_glitch_is_ignored() {
        let mut decoder = QuadratureDecoder::new();
        decoder.seed(levels(0b00));

        decoder.on_edge(levels(0b10)); // valid, +1
        decoder.on_edge(levels(0b01)); // both channels changed: glitch
        assert_eq!(
            decoder.position(),
            1,
            "A simultaneous two-channel transition must not move the count."
        );

        // The decoder self-corrects on the next valid edge from the glitch
        // state.
        decoder.on_edge(levels(0b00));
        assert_eq!(decoder.position(), 2);
    }

    /// Test that every both-channels-changed code is a no-op.
    #[test]
    fn test_quadrature_all_glitch_codes_are_noops() {
        for state in 0b00..=0b11u8 {
            let mut decoder = QuadratureDecoder::new();
            decoder.seed(levels(state));
            decoder.on_edge(levels(state ^ 0b11));
            assert_eq!(
                decoder.position(),
                0,
                "Glitch from state {:02b} changed the count.",
                state
            );
        }
    }

    /// Test that re-arm requests chase the next transition of each channel.
    #[test]
    fn test_quadrature_edge_chasing() {
        let mut decoder = QuadratureDecoder::new();

        let triggers = decoder.seed(levels(0b10));
        assert_eq!(
            triggers,
            [EdgeTrigger::HighToLow, EdgeTrigger::LowToHigh],
            "A high channel waits for a fall, a low channel for a rise."
        );

        let triggers = decoder.on_edge(levels(0b11));
        assert_eq!(triggers, [EdgeTrigger::HighToLow, EdgeTrigger::HighToLow]);
    }

    /// Test the final count over an arbitrary mixed event sequence.
    #[test]
    fn test_quadrature_net_count_matches_valid_transitions() {
        let mut decoder = QuadratureDecoder::new();
        decoder.seed(levels(0b00));

        // up, up, up, glitch, down, no-move, down, down
        let sequence = [0b10u8, 0b11, 0b01, 0b10, 0b00, 0b00, 0b01, 0b11];
        let expected = [1, 1, 1, 0, -1, 0, -1, -1];

        let mut net = 0;
        for (state, inc) in sequence.iter().zip(expected) {
            decoder.on_edge(levels(*state));
            net += inc;
            assert_eq!(decoder.position(), net);
        }
    }
}
