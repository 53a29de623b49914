//! Core types shared by the provider, tools and agent layers.

pub mod message;
pub mod usage;
pub mod generation;

pub use message::*;
pub use usage::*;
pub use generation::*;
