//! Core trait definitions

mod client;
mod liveness;

pub use client::{ClientFactory, RemoteSessionClient};
pub use liveness::DevLoopLiveness;
