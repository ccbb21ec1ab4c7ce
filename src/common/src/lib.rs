//! Types shared between the Kestrel console core and the kernel.
//!
//! - [`control`]: the raw input control-byte protocol
//! - [`error`]: console and fatal error types
//! - [`device`]: the character-device contract

#![no_std]
#![warn(missing_docs)]

pub mod control;
pub mod device;
pub mod error;

pub use control::{ctrl, ControlCode};
pub use device::CharDevice;
pub use error::{ConsoleError, FatalError};
