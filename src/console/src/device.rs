//! The console device: lock, wait channel and entry points.
//!
//! One [`Console`] is created at boot and shared by reference. The
//! interrupt path ([`Console::interrupt_feed`]) and the read path
//! ([`Console::read`]) meet on a single spin lock; readers block on the
//! ring's read index until a line is committed.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};

use kestrel_common::control::EOF;
use kestrel_common::{CharDevice, ConsoleError, FatalError};
use kestrel_hal::{Serial, TextScreen};
use spin::{Mutex, MutexGuard};

use crate::editor::{FeedEffects, LineEditor};
use crate::platform::Platform;
use crate::render::Glyph;
use crate::ring::LineIndices;
use crate::sink::OutputSink;

/// Return addresses printed by a panic.
pub const TRACE_DEPTH: usize = 10;

/// State guarded by the console lock.
struct Shared<S, T> {
    editor: LineEditor,
    sink: OutputSink<S, T>,
}

/// Line-disciplined console over a serial mirror and a text screen.
pub struct Console<P, S, T> {
    shared: Mutex<Shared<S, T>>,
    platform: P,
    /// Set once; every later output call halts the calling CPU.
    halted: AtomicBool,
    /// Set by a panic; printing no longer waits for the lock.
    panicking: AtomicBool,
}

impl<P: Platform, S: Serial, T: TextScreen> Console<P, S, T> {
    /// Creates a console with an empty input buffer.
    pub const fn new(platform: P, serial: S, screen: T) -> Self {
        Self {
            shared: Mutex::new(Shared {
                editor: LineEditor::new(),
                sink: OutputSink::new(serial, screen),
            }),
            platform,
            halted: AtomicBool::new(false),
            panicking: AtomicBool::new(false),
        }
    }

    /// The platform hooks.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Returns `true` once the system has halted.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Snapshot of the ring indices.
    pub fn indices(&self) -> LineIndices {
        self.shared.lock().editor.indices()
    }

    /// Current relocation counter.
    pub fn back_counter(&self) -> usize {
        self.shared.lock().editor.back_counter()
    }

    /// Runs `f` against the output sink under the lock.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut OutputSink<S, T>) -> R) -> R {
        f(&mut self.shared.lock().sink)
    }

    /// Feeds every byte `next` yields into the line editor.
    ///
    /// Called from the input interrupt. Readers are woken on each committed
    /// line; a requested process listing runs after the lock is released.
    pub fn interrupt_feed(&self, mut next: impl FnMut() -> Option<u8>) -> FeedEffects {
        if self.stop_if_halted() {
            return FeedEffects::empty();
        }
        let mut effects = FeedEffects::empty();
        {
            let mut guard = self.shared.lock();
            let shared = &mut *guard;
            while let Some(byte) = next() {
                match shared.editor.feed(byte, &mut shared.sink) {
                    Ok(fed) => {
                        if fed.contains(FeedEffects::COMMITTED) {
                            log::debug!("console: waking readers");
                            self.platform.wakeup(shared.editor.ring().read_channel());
                        }
                        effects |= fed;
                    }
                    Err(err) => {
                        self.escalate(&mut shared.sink, err);
                        return effects;
                    }
                }
            }
        }
        if effects.contains(FeedEffects::PROC_DUMP) {
            self.platform.proc_dump();
        }
        effects
    }

    /// Copies up to one committed line into `dst`.
    ///
    /// Blocks until data is committed. Stops after a newline or when `dst`
    /// is full. An end-of-file byte is never copied: as the first byte it
    /// yields `Ok(0)`; later in a request it is left for the next call.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize, ConsoleError> {
        if self.stop_if_halted() {
            return Err(ConsoleError::Halted);
        }
        let mut copied = 0;
        let mut guard = self.shared.lock();

        while copied < dst.len() {
            while !guard.editor.ring().has_committed() {
                if self.platform.killed() {
                    drop(guard);
                    log::warn!("console: reader killed after {} bytes", copied);
                    return if copied > 0 {
                        Ok(copied)
                    } else {
                        Err(ConsoleError::Killed)
                    };
                }
                let chan = guard.editor.ring().read_channel();
                guard = self.platform.sleep(chan, guard, &self.shared);
            }

            let ring = guard.editor.ring_mut();
            let Some(byte) = ring.pop() else {
                continue;
            };
            if byte == EOF {
                if copied > 0 {
                    ring.unread();
                }
                break;
            }
            dst[copied] = byte;
            copied += 1;
            if byte == b'\n' {
                break;
            }
        }
        Ok(copied)
    }

    /// Echoes every byte of `src` through the output sink.
    pub fn write(&self, src: &[u8]) -> Result<usize, ConsoleError> {
        if self.stop_if_halted() {
            return Err(ConsoleError::Halted);
        }
        let mut guard = self.shared.lock();
        for &byte in src {
            if let Err(err) = guard.sink.put_char(Glyph::Byte(byte), true) {
                self.escalate(&mut guard.sink, err);
                return Err(ConsoleError::Halted);
            }
        }
        Ok(src.len())
    }

    /// Prints formatted kernel output.
    pub fn print(&self, args: fmt::Arguments<'_>) {
        if self.stop_if_halted() {
            return;
        }
        let mut guard = self.lock_for_output();
        let mut writer = SinkWriter {
            sink: &mut guard.sink,
            failed: None,
        };
        let _ = writer.write_fmt(args);
        let failed = writer.failed;
        if let Some(err) = failed {
            self.escalate(&mut guard.sink, err);
        }
    }

    /// Explicit kernel-wide fatal request.
    ///
    /// Prints the message and a fixed-depth return-address trace, freezes
    /// every other CPU at its next output call, and halts this one.
    pub fn panic(&self, args: fmt::Arguments<'_>) {
        self.panicking.store(true, Ordering::SeqCst);
        let mut guard = self.lock_for_output();
        self.report(&mut guard.sink, true, args);
        drop(guard);
        self.halt();
    }

    /// Escalates a renderer fault raised while the lock is held.
    ///
    /// The screen can no longer be trusted, so the report goes to serial only.
    fn escalate(&self, sink: &mut OutputSink<S, T>, err: FatalError) {
        self.panicking.store(true, Ordering::SeqCst);
        log::error!("console: fatal: {}", err);
        self.report(sink, false, format_args!("{}", err));
        self.halt();
    }

    fn report(&self, sink: &mut OutputSink<S, T>, screen: bool, args: fmt::Arguments<'_>) {
        let mut pcs = [0usize; TRACE_DEPTH];
        self.platform.caller_pcs(&mut pcs);

        let mut writer = PanicWriter { sink, screen };
        let _ = write!(writer, "cpu {}: panic: ", self.platform.cpu_id());
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\n");
        for pc in pcs {
            let _ = write!(writer, " {:x}", pc);
        }
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
        self.platform.halt();
    }

    /// Halts the caller if the system is already halted.
    fn stop_if_halted(&self) -> bool {
        if self.is_halted() {
            self.platform.halt();
            return true;
        }
        false
    }

    fn lock_for_output(&self) -> MutexGuard<'_, Shared<S, T>> {
        if !self.panicking.load(Ordering::SeqCst) {
            return self.shared.lock();
        }
        match self.shared.try_lock() {
            Some(guard) => guard,
            None => {
                // SAFETY: a panic is in progress. The holder may be the CPU we
                // interrupted and will never release the lock; every other
                // CPU stops at its next output call.
                unsafe { self.shared.force_unlock() };
                self.shared.lock()
            }
        }
    }
}

impl<P, S, T> CharDevice for Console<P, S, T>
where
    P: Platform + Sync,
    S: Serial + Send,
    T: TextScreen + Send,
{
    fn read(&self, dst: &mut [u8]) -> Result<usize, ConsoleError> {
        Console::read(self, dst)
    }

    fn write(&self, src: &[u8]) -> Result<usize, ConsoleError> {
        Console::write(self, src)
    }
}

/// Formats into the output sink, remembering the first fault.
struct SinkWriter<'a, S, T> {
    sink: &'a mut OutputSink<S, T>,
    failed: Option<FatalError>,
}

impl<S: Serial, T: TextScreen> Write for SinkWriter<'_, S, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if let Err(err) = self.sink.put_char(Glyph::Byte(byte), true) {
                self.failed = Some(err);
                return Err(fmt::Error);
            }
        }
        Ok(())
    }
}

/// Formats a panic report, dropping to serial only if the screen faults.
struct PanicWriter<'a, S, T> {
    sink: &'a mut OutputSink<S, T>,
    screen: bool,
}

impl<S: Serial, T: TextScreen> Write for PanicWriter<'_, S, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if self.screen {
                if self.sink.put_char(Glyph::Byte(byte), true).is_err() {
                    self.screen = false;
                }
            } else {
                self.sink.put_serial(Glyph::Byte(byte));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CELLS;
    use crate::ring::INPUT_CAPACITY;
    use crate::testing::{ScriptedPlatform, SimScreen, SimSerial};
    use kestrel_common::control::PROC_DUMP;

    type TestConsole = Console<ScriptedPlatform, SimSerial, SimScreen>;

    fn console() -> TestConsole {
        Console::new(ScriptedPlatform::new(), SimSerial::new(), SimScreen::new())
    }

    fn feed(console: &TestConsole, bytes: &[u8]) -> FeedEffects {
        let mut iter = bytes.iter().copied();
        console.interrupt_feed(|| iter.next())
    }

    #[test]
    fn test_read_basic_line() {
        let console = console();
        feed(&console, b"hi\n");
        let mut buf = [0u8; 10];
        assert_eq!(console.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"hi\n");
        assert_eq!(console.platform().wakeups(), 1);
    }

    #[test]
    fn test_read_after_backspace() {
        let console = console();
        feed(&console, b"hix\x08\n");
        let mut buf = [0u8; 10];
        assert_eq!(console.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"hi\n");
    }

    #[test]
    fn test_read_stops_at_newline() {
        let console = console();
        feed(&console, b"one\ntwo\n");
        let mut buf = [0u8; 16];
        assert_eq!(console.read(&mut buf), Ok(4));
        assert_eq!(&buf[..4], b"one\n");
        assert_eq!(console.read(&mut buf), Ok(4));
        assert_eq!(&buf[..4], b"two\n");
    }

    #[test]
    fn test_read_stops_at_requested_length() {
        let console = console();
        feed(&console, b"abcdef\n");
        let mut buf = [0u8; 4];
        assert_eq!(console.read(&mut buf), Ok(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(console.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"ef\n");
    }

    #[test]
    fn test_eof_alone_reads_zero_and_is_consumed() {
        let console = console();
        feed(&console, b"\x04");
        let mut buf = [0u8; 10];
        assert_eq!(console.read(&mut buf), Ok(0));
        let indices = console.indices();
        assert_eq!(indices.read, indices.commit);
    }

    #[test]
    fn test_eof_mid_request_is_pushed_back() {
        let console = console();
        feed(&console, b"ab\x04");
        let mut buf = [0u8; 10];
        assert_eq!(console.read(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(console.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_killed_reader_fails_without_consuming() {
        let console = console();
        feed(&console, b"pending");
        let before = console.indices();
        console.platform().kill();

        let mut buf = [0u8; 10];
        assert_eq!(console.read(&mut buf), Err(ConsoleError::Killed));
        assert_eq!(console.indices(), before);
        assert_eq!(console.platform().sleeps(), 0);
    }

    #[test]
    fn test_killed_reader_keeps_partial_copy() {
        let console = console();
        feed(&console, &[b'x'; INPUT_CAPACITY]);
        console.platform().kill();

        let mut buf = [0u8; 2 * INPUT_CAPACITY];
        assert_eq!(console.read(&mut buf), Ok(INPUT_CAPACITY));
        assert!(buf[..INPUT_CAPACITY].iter().all(|&b| b == b'x'));
        assert_eq!(console.platform().sleeps(), 0);
    }

    #[test]
    fn test_ready_line_is_read_without_sleeping() {
        let console = console();
        feed(&console, b"ready\n");
        let mut buf = [0u8; 16];
        assert_eq!(console.read(&mut buf), Ok(6));
        assert_eq!(console.platform().sleeps(), 0);
    }

    #[test]
    fn test_write_echoes_bytes() {
        let console = console();
        assert_eq!(console.write(b"out"), Ok(3));
        console.with_sink(|sink| {
            assert_eq!(sink.serial().output(), b"out");
            assert_eq!(&sink.screen().text::<3>(0), b"out");
        });
    }

    #[test]
    fn test_proc_dump_runs_after_feed() {
        let console = console();
        let effects = feed(&console, &[b'a', PROC_DUMP, b'b']);
        assert!(effects.contains(FeedEffects::PROC_DUMP));
        assert_eq!(console.platform().dumps(), 1);
        assert_eq!(console.indices().end, 2);
    }

    #[test]
    fn test_print_formats_through_sink() {
        let console = console();
        console.print(format_args!("pid {} at {:x}\n", 7, 255));
        console.with_sink(|sink| assert_eq!(sink.serial().output(), b"pid 7 at ff\n"));
    }

    #[test]
    fn test_bounds_violation_halts() {
        let console = console();
        console.with_sink(|sink| sink.screen_mut().set_cursor(CELLS + 1));
        feed(&console, b"x");

        assert!(console.is_halted());
        assert_eq!(console.platform().halts(), 1);
        console.with_sink(|sink| {
            assert!(sink.serial().output().starts_with(b"xcpu 0: panic: pos under/overflow\n"));
        });

        // Every later output call halts again and does nothing else.
        assert_eq!(console.write(b"more"), Err(ConsoleError::Halted));
        assert_eq!(console.platform().halts(), 2);
        let mut buf = [0u8; 4];
        assert_eq!(console.read(&mut buf), Err(ConsoleError::Halted));
        assert_eq!(console.platform().halts(), 3);
    }

    #[test]
    fn test_panic_prints_fixed_trace() {
        let console = console();
        console.panic(format_args!("bad {}", "thing"));

        assert!(console.is_halted());
        assert_eq!(console.platform().halts(), 1);
        console.with_sink(|sink| {
            assert_eq!(
                sink.serial().output(),
                b"cpu 0: panic: bad thing\n 1000 1010 0 0 0 0 0 0 0 0"
            );
        });
    }
}
