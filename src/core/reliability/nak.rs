//! NAK suppression.
//!
//! A receiver that keeps seeing frames past a gap must not answer each one
//! with a NAK. The gate closes when a NAK is sent and reopens when the gap
//! it named is filled.
//!
//! NAK 抑制。接收方在缺口之后持续收到帧时，不能对每一帧都回应 NAK。发送 NAK
//! 时门关闭，当其指明的缺口被填补后重新打开。

use crate::{
    config::NakPolicy,
    core::sequence::{SeqNum, SequenceSpace},
};

/// Whether a NAK may be sent right now.
/// 当前是否可以发送 NAK。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    /// A NAK was sent and its gap is not yet filled.
    /// 已发送 NAK，且其缺口尚未被填补。
    Outstanding,
}

#[derive(Debug, Clone)]
pub enum NakGate {
    /// One gate for the whole window.
    Global(GateState),
    /// One gate per receive-window position.
    PerSlot(Vec<GateState>),
}

impl NakGate {
    pub fn new(policy: NakPolicy, space: &SequenceSpace) -> Self {
        match policy {
            NakPolicy::Global => NakGate::Global(GateState::Open),
            NakPolicy::PerSlot => NakGate::PerSlot(vec![GateState::Open; space.window_size()]),
        }
    }

    fn state_mut(&mut self, space: &SequenceSpace, seq: SeqNum) -> &mut GateState {
        match self {
            NakGate::Global(state) => state,
            NakGate::PerSlot(states) => &mut states[space.slot(seq)],
        }
    }

    /// Whether a NAK for `seq` is allowed.
    pub fn is_open(&self, space: &SequenceSpace, seq: SeqNum) -> bool {
        let state = match self {
            NakGate::Global(state) => *state,
            NakGate::PerSlot(states) => states[space.slot(seq)],
        };
        state == GateState::Open
    }

    /// Closes the gate for `seq` if it is open. Returns true when the caller
    /// should send the NAK.
    ///
    /// 如果 `seq` 的门是打开的则关闭它。返回 true 表示调用方应发送 NAK。
    pub fn try_close(&mut self, space: &SequenceSpace, seq: SeqNum) -> bool {
        if !self.is_open(space, seq) {
            return false;
        }
        *self.state_mut(space, seq) = GateState::Outstanding;
        true
    }

    /// Reopens the gate once `seq` has been delivered.
    /// 在 `seq` 被交付后重新打开门。
    pub fn reopen(&mut self, space: &SequenceSpace, seq: SeqNum) {
        *self.state_mut(space, seq) = GateState::Open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_slot_gates_are_independent() {
        let space = SequenceSpace::new(7, 4);
        let mut gate = NakGate::new(NakPolicy::PerSlot, &space);
        assert!(gate.try_close(&space, 1));
        assert!(!gate.try_close(&space, 1));
        assert!(!gate.is_open(&space, 5), "5 shares a slot with 1");
        assert!(gate.try_close(&space, 2));

        gate.reopen(&space, 1);
        assert!(gate.is_open(&space, 1));
        assert!(!gate.is_open(&space, 2));
    }

    #[test]
    fn global_gate_covers_every_sequence_number() {
        let space = SequenceSpace::new(7, 4);
        let mut gate = NakGate::new(NakPolicy::Global, &space);
        assert!(gate.try_close(&space, 1));
        assert!(!gate.try_close(&space, 2));
        gate.reopen(&space, 1);
        assert!(gate.try_close(&space, 2));
    }
}
