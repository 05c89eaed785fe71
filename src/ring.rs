//! Frames-in-flight ring
//!
//! Contract records must not be mutated between submission and the
//! consumer's completion signal for that frame. The ring keeps one payload
//! per slot so the producer can record frame N+1 while frame N is still in
//! flight. The depth must exceed the maximum number of frames the consumer
//! may have in flight at once; with that discipline no locking is needed for
//! a single producer.

use crate::error::{ContractError, ContractResult};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Recording,
    InFlight,
}

/// Identifies a submitted frame slot until it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken {
    index: usize,
}

impl FrameToken {
    pub fn index(self) -> usize {
        self.index
    }
}

/// Fixed-depth ring of per-frame payloads.
///
/// Slots cycle Free -> Recording -> InFlight -> Free. Beginning a new frame
/// while the cursor slot is still recording drops the recorded frame and
/// reuses the slot; no partial-consumption state exists to reconcile.
#[derive(Debug)]
pub struct FrameRing<T> {
    slots: Vec<(SlotState, T)>,
    cursor: usize,
}

impl<T> FrameRing<T> {
    /// Smallest useful depth: one slot recording, one in flight.
    pub const MIN_DEPTH: usize = 2;

    pub fn new(depth: usize) -> Self
    where
        T: Default,
    {
        Self::with_slots(depth, |_| T::default())
    }

    pub fn with_slots(depth: usize, mut make: impl FnMut(usize) -> T) -> Self {
        assert!(
            depth >= Self::MIN_DEPTH,
            "frame ring depth must be at least 2"
        );
        Self {
            slots: (0..depth).map(|i| (SlotState::Free, make(i))).collect(),
            cursor: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub fn in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|(state, _)| *state == SlotState::InFlight)
            .count()
    }

    /// Begins recording into the cursor slot and hands out its payload.
    ///
    /// Fails with [`ContractError::RingExhausted`] while the slot is still
    /// in flight; the caller either waits for a completion or drops the
    /// frame. A slot that was recording but never submitted is silently
    /// reused.
    pub fn begin(&mut self) -> ContractResult<&mut T> {
        let depth = self.depth();
        let (state, payload) = &mut self.slots[self.cursor];
        match *state {
            SlotState::InFlight => Err(ContractError::RingExhausted { depth }),
            SlotState::Recording => {
                trace!("frame slot {} reused without submission", self.cursor);
                Ok(payload)
            }
            SlotState::Free => {
                *state = SlotState::Recording;
                trace!("frame slot {} recording", self.cursor);
                Ok(payload)
            }
        }
    }

    /// Marks the recorded slot as submitted and advances the cursor.
    pub fn submit(&mut self) -> ContractResult<FrameToken> {
        let (state, _) = &mut self.slots[self.cursor];
        if *state != SlotState::Recording {
            return Err(ContractError::NoFrameRecording);
        }
        *state = SlotState::InFlight;
        let token = FrameToken { index: self.cursor };
        trace!("frame slot {} submitted", self.cursor);
        self.cursor = (self.cursor + 1) % self.slots.len();
        Ok(token)
    }

    /// Releases a slot after the consumer signals completion.
    pub fn complete(&mut self, token: FrameToken) -> ContractResult<()> {
        let (state, _) = &mut self.slots[token.index];
        if *state != SlotState::InFlight {
            return Err(ContractError::NotInFlight { index: token.index });
        }
        *state = SlotState::Free;
        trace!("frame slot {} completed", token.index);
        Ok(())
    }

    /// Payload of an in-flight slot, read-only (the consumer's view).
    pub fn in_flight_payload(&self, token: FrameToken) -> Option<&T> {
        let (state, payload) = &self.slots[token.index];
        (*state == SlotState::InFlight).then_some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_cycle_through_the_ring() {
        let mut ring: FrameRing<u32> = FrameRing::new(3);
        *ring.begin().unwrap() = 10;
        let a = ring.submit().unwrap();
        *ring.begin().unwrap() = 20;
        let b = ring.submit().unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(ring.in_flight(), 2);
        assert_eq!(ring.in_flight_payload(a), Some(&10));

        ring.complete(a).unwrap();
        ring.complete(b).unwrap();
        assert_eq!(ring.in_flight(), 0);
    }

    #[test]
    fn exhaustion_is_reported_not_overwritten() {
        let mut ring: FrameRing<u32> = FrameRing::new(2);
        ring.begin().unwrap();
        let a = ring.submit().unwrap();
        ring.begin().unwrap();
        let _b = ring.submit().unwrap();
        // Cursor is back at slot 0, which is still in flight.
        assert!(matches!(
            ring.begin(),
            Err(ContractError::RingExhausted { depth: 2 })
        ));
        ring.complete(a).unwrap();
        assert!(ring.begin().is_ok());
    }

    #[test]
    fn dropped_frames_reuse_their_slot() {
        let mut ring: FrameRing<u32> = FrameRing::new(2);
        *ring.begin().unwrap() = 1;
        // Never submitted; the next begin reuses the same slot.
        *ring.begin().unwrap() = 2;
        let token = ring.submit().unwrap();
        assert_eq!(token.index(), 0);
        assert_eq!(ring.in_flight_payload(token), Some(&2));
    }

    #[test]
    fn submit_without_recording_fails() {
        let mut ring: FrameRing<u32> = FrameRing::new(2);
        assert!(matches!(
            ring.submit(),
            Err(ContractError::NoFrameRecording)
        ));
    }

    #[test]
    fn double_completion_fails() {
        let mut ring: FrameRing<u32> = FrameRing::new(2);
        ring.begin().unwrap();
        let token = ring.submit().unwrap();
        ring.complete(token).unwrap();
        assert!(matches!(
            ring.complete(token),
            Err(ContractError::NotInFlight { index: 0 })
        ));
    }

    #[test]
    #[should_panic(expected = "frame ring depth")]
    fn depth_below_minimum_panics() {
        let _ = FrameRing::<u32>::new(1);
    }
}
