#![doc = include_str!("../README.md")]

mod blittable;
mod buffer;
pub mod error;
pub mod memory;

pub use blittable::*;
pub use buffer::*;
pub use error::*;

#[cfg(feature = "derive")]
pub use rawbuf_derive::Blittable;
