//! The async link driver.
//!
//! [`Link`] runs one [`EventDispatcher`](crate::core::endpoint::EventDispatcher)
//! on a tokio task, turning physical-layer datagrams, timer deadlines and
//! upper-layer packets into events. The upper layer talks to it through a
//! [`LinkHandle`].
//!
//! 异步链路驱动。[`Link`] 在一个 tokio 任务上运行一个事件分发器，把物理层数据报、
//! 定时器截止时间和上层数据包转换为事件。上层通过 [`LinkHandle`] 与其交互。

mod event_loop;
mod handle;
mod traits;


pub use event_loop::Link;
pub use handle::LinkHandle;
pub use traits::PhysicalLayer;
