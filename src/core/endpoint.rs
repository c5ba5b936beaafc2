//! The endpoint of a link, which is the "brain" of the protocol: it turns
//! events into calls on the two window halves and keeps the upper layer's
//! admission signal in sync.
//!
//! 链路的端点，是协议的“大脑”：它把事件转换为对窗口两半的调用，并保持上层
//! 接纳信号的同步。

mod event_dispatcher;
mod stats;
mod traits;
mod types;


pub use event_dispatcher::EventDispatcher;
pub use stats::LinkStats;
pub use traits::LinkIo;
pub use types::{LinkEvent, PhysicalState};
