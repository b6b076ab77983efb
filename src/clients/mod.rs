pub mod dashscope;
pub mod mock;

pub use dashscope::DashScopeTransport;
pub use mock::*;
