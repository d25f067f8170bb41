//! Streaming leading-delimiter COBS decoder.
//!
//! The decoder works directly against an [`RxConsumer`] and never needs a
//! whole message to be buffered before it starts. A group is only consumed
//! once its code byte and all of its literals are in the ring, so a poll that
//! finds too few bytes leaves everything in place and can simply be retried.
//!
//! ```text
//!            ┌──────────── skip ────────────┐
//!            ▼                              │
//!   [discard through next 0x00] ──► [unstuff groups] ──► header probe
//!                                        │   ▲               │
//!                                        └───┘        complete ─► RawPacket
//! ```
//!
//! After a packet is handed out, or a candidate is judged invalid, the
//! decoder enters skip mode: the rest of that message is discarded up to the
//! next delimiter, which always marks the start of the next message.

use crate::cobs::{DELIMITER, MAX_GROUP_CODE};
use crate::packet::{HeaderProbe, PacketHeader, RawPacket, HEADER_SIZE, MAX_PACKET_SIZE};
use crate::ring::RxConsumer;

/// Running counters kept by the decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeStats {
    /// Complete packets handed out
    pub packets: u32,
    /// Candidates that hit a `0x00` inside a group
    pub framing_errors: u32,
    /// Candidates whose header tag did not match
    pub bad_tags: u32,
    /// Candidates declaring more payload than the buffer holds
    pub oversized: u32,
    /// Candidates cut short by the next delimiter
    pub truncated: u32,
}

impl DecodeStats {
    /// Discarded candidates of any kind
    pub fn discarded(&self) -> u32 {
        self.framing_errors
            .wrapping_add(self.bad_tags)
            .wrapping_add(self.oversized)
            .wrapping_add(self.truncated)
    }
}

/// Why a candidate was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discard {
    /// Back-to-back delimiters; nothing was lost
    Empty,
    Framing,
    BadTag,
    Oversized,
    Truncated,
}

/// Result of trying to consume one group from the ring
enum Step {
    /// Not enough bytes yet
    Starved,
    /// One group appended to the assembly buffer
    Unstuffed,
    /// Candidate is dead
    Dead(Discard),
}

/// Resumable decoder with an assembly buffer of `CAP` bytes
pub struct StreamDecoder<const CAP: usize = MAX_PACKET_SIZE> {
    buffer: [u8; CAP],
    len: usize,
    /// A group ended with an implied zero that is emitted when the next group starts
    owed_zero: bool,
    skip: bool,
    stats: DecodeStats,
}

impl<const CAP: usize> Default for StreamDecoder<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> StreamDecoder<CAP> {
    /// Create a decoder waiting for the first delimiter
    pub const fn new() -> Self {
        Self {
            buffer: [0; CAP],
            len: 0,
            owed_zero: false,
            skip: true,
            stats: DecodeStats {
                packets: 0,
                framing_errors: 0,
                bad_tags: 0,
                oversized: 0,
                truncated: 0,
            },
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// True while discarding bytes up to the next delimiter
    pub fn is_skipping(&self) -> bool {
        self.skip
    }

    /// Bytes assembled for the current candidate
    pub fn assembled(&self) -> usize {
        self.len
    }

    /// Drain as much of `rx` as possible and return the next complete packet
    ///
    /// Calling this with nothing new in the ring has no effect.
    pub fn poll<const N: usize>(&mut self, rx: &mut RxConsumer<'_, N>) -> Option<RawPacket<'_>> {
        let header = self.advance(rx)?;
        let end = HEADER_SIZE + header.length as usize;
        Some(RawPacket::new(header.command, &self.buffer[HEADER_SIZE..end]))
    }

    fn advance<const N: usize>(&mut self, rx: &mut RxConsumer<'_, N>) -> Option<PacketHeader> {
        loop {
            if self.skip {
                if !rx.skip_past_delimiter() {
                    return None;
                }
                self.restart();
            }

            match self.unstuff_group(rx) {
                Step::Starved => return None,
                Step::Dead(reason) => self.discard(reason),
                Step::Unstuffed => match PacketHeader::probe(&self.buffer[..self.len]) {
                    HeaderProbe::Incomplete => {}
                    HeaderProbe::BadTag => self.discard(Discard::BadTag),
                    HeaderProbe::Oversized => self.discard(Discard::Oversized),
                    HeaderProbe::Valid(header) => {
                        if self.len - HEADER_SIZE >= header.length as usize {
                            self.skip = true;
                            self.stats.packets = self.stats.packets.wrapping_add(1);
                            return Some(header);
                        }
                    }
                },
            }
        }
    }

    fn unstuff_group<const N: usize>(&mut self, rx: &mut RxConsumer<'_, N>) -> Step {
        let Some(code) = rx.peek(0) else {
            return Step::Starved;
        };
        if code == DELIMITER {
            if self.len == 0 {
                return Step::Dead(Discard::Empty);
            }
            return Step::Dead(Discard::Truncated);
        }

        let literals = usize::from(code - 1);
        if rx.available() < 1 + literals {
            // Any delimiter already queued must fall inside this group
            if rx.pending_delimiters() > 0 {
                return Step::Dead(Discard::Truncated);
            }
            return Step::Starved;
        }
        if (1..=literals).any(|offset| rx.peek(offset) == Some(DELIMITER)) {
            return Step::Dead(Discard::Framing);
        }
        if self.len + usize::from(self.owed_zero) + literals > CAP {
            return Step::Dead(Discard::Oversized);
        }

        rx.pop();
        if self.owed_zero {
            self.buffer[self.len] = 0;
            self.len += 1;
        }
        for _ in 0..literals {
            if let Some(byte) = rx.pop() {
                self.buffer[self.len] = byte;
                self.len += 1;
            }
        }
        self.owed_zero = code != MAX_GROUP_CODE;
        Step::Unstuffed
    }

    fn discard(&mut self, reason: Discard) {
        self.skip = true;
        let counter = match reason {
            Discard::Empty => return,
            Discard::Framing => &mut self.stats.framing_errors,
            Discard::BadTag => &mut self.stats.bad_tags,
            Discard::Oversized => &mut self.stats.oversized,
            Discard::Truncated => &mut self.stats.truncated,
        };
        *counter = counter.wrapping_add(1);
    }

    fn restart(&mut self) {
        self.len = 0;
        self.owed_zero = false;
        self.skip = false;
    }
}

/// The controller's process-wide decode state: ring consumer plus decoder
pub struct DecodeSession<'a, const N: usize, const CAP: usize = MAX_PACKET_SIZE> {
    rx: RxConsumer<'a, N>,
    decoder: StreamDecoder<CAP>,
}

impl<'a, const N: usize, const CAP: usize> DecodeSession<'a, N, CAP> {
    pub fn new(rx: RxConsumer<'a, N>) -> Self {
        Self {
            rx,
            decoder: StreamDecoder::new(),
        }
    }

    /// Return the next complete packet, if the queued bytes finish one
    pub fn poll(&mut self) -> Option<RawPacket<'_>> {
        self.decoder.poll(&mut self.rx)
    }

    pub fn stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    /// Bytes dropped by the producer because the ring was full
    pub fn overflow_count(&self) -> u32 {
        self.rx.overflow_count()
    }

    /// Bytes waiting in the ring
    pub fn backlog(&self) -> usize {
        self.rx.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use crate::ring::RxRing;
    use heapless::Vec;

    type Wire = Vec<u8, 2048>;

    fn wire(command: u8, payload: &[u8]) -> Wire {
        let encoded = Packet::new(command, payload).unwrap().encode_to_vec().unwrap();
        Vec::from_slice(&encoded).unwrap()
    }

    fn owned(packet: RawPacket<'_>) -> (u8, Vec<u8, 1024>) {
        (packet.command, Vec::from_slice(packet.payload).unwrap())
    }

    #[test]
    fn test_single_packet() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        tx.push_slice(&wire(5, &[3]));
        let (command, payload) = owned(session.poll().unwrap());
        assert_eq!(command, 5);
        assert_eq!(payload.as_slice(), &[3]);
        assert!(session.poll().is_none());
        assert_eq!(session.stats().packets, 1);
    }

    #[test]
    fn test_update_frame_scenario() {
        // header 0xA4, length 9, frame 0 at 30 fps, repeat 5, one point (10, 20)
        let raw = [0xA4, 0x09, 0x00, 0x00, 0x1E, 0x00, 0x05, 0x00, 0x01, 0x00, 0x0A, 0x14];
        let mut encoded = [0u8; 32];
        let len = crate::cobs::encode_message(&raw, &mut encoded).unwrap();

        let mut ring = RxRing::<64>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 64> = DecodeSession::new(rx);

        tx.push_slice(&encoded[..len]);
        let packet = session.poll().unwrap();
        assert_eq!(packet.command, 4);
        assert_eq!(packet.length(), 9);
        assert_eq!(packet.payload, &raw[3..]);
    }

    #[test]
    fn test_back_to_back_packets() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        tx.push_slice(&wire(6, &[]));
        tx.push_slice(&wire(5, &[0, 7, 0]));

        let (first, _) = owned(session.poll().unwrap());
        assert_eq!(first, 6);
        let (second, payload) = owned(session.poll().unwrap());
        assert_eq!(second, 5);
        assert_eq!(payload.as_slice(), &[0, 7, 0]);
        assert!(session.poll().is_none());
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        let bytes = wire(4, &[0, 30, 0, 1, 0, 1, 0, 10, 20]);
        let mut decoded = None;
        for &byte in bytes.iter() {
            tx.push(byte).unwrap();
            if let Some(packet) = session.poll() {
                assert!(decoded.is_none());
                decoded = Some(owned(packet));
            }
            // Polling again without new bytes changes nothing
            assert!(session.poll().is_none());
        }

        let (command, payload) = decoded.unwrap();
        assert_eq!(command, 4);
        assert_eq!(payload.as_slice(), &[0, 30, 0, 1, 0, 1, 0, 10, 20]);
    }

    #[test]
    fn test_truncated_then_valid() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        let full = wire(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        tx.push_slice(&full[..6]);
        tx.push_slice(&wire(7, &[]));

        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 7);
        assert!(session.poll().is_none());
        assert_eq!(session.stats().truncated, 1);
        assert_eq!(session.stats().packets, 1);
    }

    #[test]
    fn test_truncated_group_waits_for_delimiter() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        // Group code promises 9 literals but only two arrive
        tx.push_slice(&[0x00, 0x0A, 0xA4, 0x09]);
        assert!(session.poll().is_none());
        assert_eq!(session.stats().discarded(), 0);

        // Next message is shorter than the outstanding group
        tx.push_slice(&wire(1, &[]));
        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 1);
        assert_eq!(session.stats().truncated, 1);
    }

    #[test]
    fn test_zero_inside_group_is_framing_error() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        // Code 0x04 claims three literals; the third slot holds the next delimiter,
        // and enough bytes follow to complete the group
        tx.push_slice(&[0x00, 0x04, 0xA0, 0x05]);
        tx.push_slice(&wire(0, &[]));

        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 0);
        assert_eq!(session.stats().framing_errors, 1);
    }

    #[test]
    fn test_bad_tag_discarded() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        tx.push_slice(&[0x00, 0x04, 0x53, 0x01, 0x01]);
        tx.push_slice(&wire(8, &[]));

        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 8);
        assert_eq!(session.stats().bad_tags, 1);
    }

    #[test]
    fn test_oversized_length_discarded() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        // Declares 0xFFFF payload bytes
        tx.push_slice(&[0x00, 0x04, 0xA4, 0xFF, 0xFF]);
        tx.push_slice(&wire(9, &[]));

        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 9);
        assert_eq!(session.stats().oversized, 1);
    }

    #[test]
    fn test_leading_garbage_skipped() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        tx.push_slice(&[0x12, 0xA4, 0x34]);
        assert!(session.poll().is_none());
        tx.push_slice(&wire(2, &[]));

        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 2);
        assert_eq!(session.stats().discarded(), 0);
    }

    #[test]
    fn test_short_message_silently_dropped() {
        let mut ring = RxRing::<1024>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 1024> = DecodeSession::new(rx);

        // Two decoded bytes can never form a header
        tx.push_slice(&[0x00, 0x03, 0xA1, 0x02]);
        tx.push_slice(&wire(3, &[]));

        let (command, _) = owned(session.poll().unwrap());
        assert_eq!(command, 3);
        assert_eq!(session.stats().packets, 1);
    }

    #[test]
    fn test_max_payload() {
        let mut ring = RxRing::<2048>::new();
        let (mut tx, rx) = ring.split();
        let mut session: DecodeSession<'_, 2048> = DecodeSession::new(rx);

        let mut payload = [0u8; 1021];
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte = (i % 7) as u8;
        }
        let bytes = wire(4, &payload);
        assert_eq!(tx.push_slice(&bytes), bytes.len());

        let (command, decoded) = owned(session.poll().unwrap());
        assert_eq!(command, 4);
        assert_eq!(decoded.as_slice(), &payload[..]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::vec::Vec as StdVec;

        proptest! {
            #[test]
            fn roundtrip_any_payload(
                command in 0u8..16,
                payload in prop::collection::vec(any::<u8>(), 0..=1021),
            ) {
                let bytes = wire(command, &payload);
                let mut ring = RxRing::<2048>::new();
                let (mut tx, rx) = ring.split();
                let mut session: DecodeSession<'_, 2048> = DecodeSession::new(rx);

                prop_assert_eq!(tx.push_slice(&bytes), bytes.len());
                let packet = session.poll();
                prop_assert!(packet.is_some());
                let packet = packet.unwrap();
                prop_assert_eq!(packet.command, command);
                prop_assert_eq!(packet.payload, payload.as_slice());
            }

            #[test]
            fn roundtrip_zero_heavy(len in 0usize..=1021) {
                let payload: StdVec<u8> = (0..len).map(|i| if i % 5 == 0 { 1 } else { 0 }).collect();
                let bytes = wire(4, &payload);
                let mut ring = RxRing::<2048>::new();
                let (mut tx, rx) = ring.split();
                let mut session: DecodeSession<'_, 2048> = DecodeSession::new(rx);

                tx.push_slice(&bytes);
                let packet = session.poll();
                prop_assert!(packet.is_some());
                prop_assert_eq!(packet.unwrap().payload, payload.as_slice());
            }

            #[test]
            fn chunking_does_not_matter(
                payload in prop::collection::vec(any::<u8>(), 0..300),
                cuts in prop::collection::vec(1usize..40, 1..64),
            ) {
                let mut bytes: StdVec<u8> = StdVec::new();
                bytes.extend_from_slice(&wire(5, &[2]));
                bytes.extend_from_slice(&wire(4, &payload));

                let mut ring = RxRing::<2048>::new();
                let (mut tx, rx) = ring.split();
                let mut session: DecodeSession<'_, 2048> = DecodeSession::new(rx);

                let mut seen: StdVec<(u8, StdVec<u8>)> = StdVec::new();
                let mut rest = bytes.as_slice();
                let mut cut = cuts.iter().cycle();
                while !rest.is_empty() {
                    let take = (*cut.next().unwrap()).min(rest.len());
                    tx.push_slice(&rest[..take]);
                    rest = &rest[take..];
                    while let Some(packet) = session.poll() {
                        seen.push((packet.command, packet.payload.to_vec()));
                    }
                }

                prop_assert_eq!(seen.len(), 2);
                prop_assert_eq!(&seen[0], &(5u8, std::vec![2u8]));
                prop_assert_eq!(&seen[1], &(4u8, payload));
            }

            #[test]
            fn corruption_never_yields_extra_packets(
                payload in prop::collection::vec(1u8..=255, 4..64),
                cut in 1usize..60,
            ) {
                let broken = wire(4, &payload);
                let cut = cut.min(broken.len() - 1);

                let mut bytes: StdVec<u8> = StdVec::new();
                bytes.extend_from_slice(&broken[..cut]);
                bytes.extend_from_slice(&wire(7, &[]));

                let mut ring = RxRing::<2048>::new();
                let (mut tx, rx) = ring.split();
                let mut session: DecodeSession<'_, 2048> = DecodeSession::new(rx);
                tx.push_slice(&bytes);

                let mut commands: StdVec<u8> = StdVec::new();
                while let Some(packet) = session.poll() {
                    commands.push(packet.command);
                }
                prop_assert_eq!(commands, std::vec![7u8]);
            }
        }
    }
}
