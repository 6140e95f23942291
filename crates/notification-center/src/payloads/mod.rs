//! 内置通知类型

mod new_block;

pub use new_block::NewBlockNotification;
