//! Shared mocks for Koko crate tests.

mod gateway;
mod tools;

pub use gateway::{MockGateway, RecordedCall};
pub use tools::{EchoTool, FailingTool};
