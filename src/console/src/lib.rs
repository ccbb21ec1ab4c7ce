//! Kestrel console line discipline.
//!
//! Turns keystrokes delivered one at a time from an interrupt handler into
//! lines that blocked readers consume, while echoing to a text screen and a
//! serial mirror.
//!
//! # Architecture
//!
//! - [`ring`]: the four-index circular input buffer
//! - [`editor`]: in-place line editing over the ring
//! - [`render`]: pure cursor and scrolling decisions
//! - [`sink`]: applies rendering to the serial port and the screen
//! - [`device`]: the lock, reader wait loop and device entry points
//! - [`platform`]: scheduler and CPU hooks supplied by the kernel
//! - [`testing`]: simulated screen, serial port and platform
//!
//! # Example
//!
//! ```ignore
//! static CONSOLE: Console<KernelPlatform, Com1, VgaScreen> =
//!     Console::new(KernelPlatform::new(), Com1, VgaScreen::new());
//!
//! // keyboard interrupt
//! CONSOLE.interrupt_feed(|| keyboard::next_byte());
//!
//! // read system call
//! let n = CONSOLE.read(&mut buf)?;
//! ```

#![no_std]
#![warn(missing_docs)]

pub mod device;
pub mod editor;
pub mod platform;
pub mod render;
pub mod ring;
pub mod sink;
pub mod testing;

pub use device::{Console, TRACE_DEPTH};
pub use editor::{FeedEffects, LineEditor};
pub use platform::{Platform, WaitChannel};
pub use render::Glyph;
pub use ring::{InputRing, LineIndices, INPUT_CAPACITY};
pub use sink::OutputSink;
