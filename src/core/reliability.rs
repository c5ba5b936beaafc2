//! The reliability layer.
//!
//! This layer owns both halves of the sliding window: the sender side tracks
//! outstanding frames and retransmits them, the receiver side buffers
//! out-of-order arrivals and delivers them in order. Neither side performs
//! I/O itself; everything goes through a [`LinkIo`](crate::core::endpoint::LinkIo).
//!
//! 可靠性层。
//!
//! 该层拥有滑动窗口的两半：发送端跟踪在途帧并进行重传，接收端缓存乱序到达的帧
//! 并按序交付。两者都不直接执行 I/O，一切都通过 `LinkIo` 完成。

pub mod nak;
pub mod recv_window;
pub mod retransmission;
pub mod send_window;

pub use nak::{GateState, NakGate};
pub use recv_window::{DataOutcome, ReceiveWindow};
pub use retransmission::RetransmitPacing;
pub use send_window::{NakOutcome, SendWindow, SlotTimer, TimeoutOutcome};
