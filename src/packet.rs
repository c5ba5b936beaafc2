//! The packet module, containing the wire format of data-link frames.
//! packet 模块，包含数据链路帧的线路格式。

pub mod checksum;
pub mod command;
pub mod frame;
pub mod half_ack;
pub mod header;

#[cfg(test)]
mod tests;
