pub mod chat;
pub mod common;
pub mod vision;

pub use chat::*;
pub use common::*;
pub use vision::*;
