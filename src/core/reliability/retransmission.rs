//! Retransmission pacing
//!
//! At most one timeout-driven retransmission is in flight at a time. A data
//! timeout for a frame beyond it is deferred until the in-flight one is
//! acknowledged, which keeps a burst of expiring timers from flooding a link
//! that is already losing frames.
//!
//! 重传节奏控制
//!
//! 任一时刻最多只有一个由超时驱动的重传在途。位于其之后的帧的超时会被推迟，
//! 直到在途的那个被确认为止。

use crate::core::sequence::{SeqNum, SequenceSpace};

/// State of timeout-driven retransmission.
/// 超时驱动重传的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetransmitPacing {
    /// No timeout retransmission awaits acknowledgment.
    /// 没有等待确认的超时重传。
    #[default]
    Idle,
    /// `seq` was retransmitted on timeout and is not yet acknowledged.
    /// `seq` 因超时被重传且尚未被确认。
    InFlight { seq: SeqNum },
}

/// What to do with a data timeout under the current pacing state.
/// 在当前节奏状态下如何处理一次数据超时。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingDecision {
    Retransmit,
    Defer,
}

impl RetransmitPacing {
    /// Decides whether a timeout for `seq` may retransmit now.
    ///
    /// Allowed when idle, or when `seq` lies in `[ack_expected, r]` where `r`
    /// is the retransmission in flight.
    ///
    /// 决定 `seq` 的超时是否可以立即重传。
    pub fn decide(&self, space: &SequenceSpace, ack_expected: SeqNum, seq: SeqNum) -> PacingDecision {
        match *self {
            RetransmitPacing::Idle => PacingDecision::Retransmit,
            RetransmitPacing::InFlight { seq: r } if space.between(ack_expected, seq, space.next(r)) => {
                PacingDecision::Retransmit
            }
            RetransmitPacing::InFlight { .. } => PacingDecision::Defer,
        }
    }

    /// Records a timeout retransmission of `seq`.
    pub fn record(&mut self, seq: SeqNum) {
        *self = RetransmitPacing::InFlight { seq };
    }

    /// Called as the cumulative ack passes `seq`; returns to idle once the
    /// in-flight retransmission is covered.
    ///
    /// 当累积确认越过 `seq` 时调用；在途重传被覆盖后回到空闲状态。
    pub fn on_acknowledged(&mut self, seq: SeqNum) {
        if *self == (RetransmitPacing::InFlight { seq }) {
            *self = RetransmitPacing::Idle;
        }
    }
}
