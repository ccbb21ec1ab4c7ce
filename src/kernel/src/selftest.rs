//! Boot self-test: drives a simulated console through the kernel's own
//! build of the line discipline and reports on the serial port.

use kestrel_common::control::{ctrl, BACKSPACE, KILL_LINE};
use kestrel_console::testing::{ScriptedPlatform, SimScreen, SimSerial};
use kestrel_console::Console;

use crate::serial_println;

type SimConsole = Console<ScriptedPlatform, SimSerial, SimScreen>;

/// Runs every check. A failed check panics.
pub fn run_all() {
    serial_println!("Running console self-test...");

    check_line_read();
    check_relocation_insert();
    check_backspace();
    check_kill_line();
    check_echo_position();
    check_write_then_read();

    serial_println!("All console checks passed!");
}

fn console() -> SimConsole {
    Console::new(ScriptedPlatform::new(), SimSerial::new(), SimScreen::new())
}

fn feed(console: &SimConsole, bytes: &[u8]) {
    let mut next = bytes.iter().copied();
    console.interrupt_feed(|| next.next());
}

fn read_line<'a>(console: &SimConsole, buf: &'a mut [u8]) -> &'a [u8] {
    match console.read(buf) {
        Ok(n) => &buf[..n],
        Err(err) => panic!("read failed: {}", err),
    }
}

fn check_line_read() {
    serial_println!("check_line_read... ");
    let console = console();
    feed(&console, b"hi\n");
    let mut buf = [0u8; 16];
    assert_eq!(read_line(&console, &mut buf), b"hi\n");
    assert_eq!(console.platform().wakeups(), 1);
    serial_println!("[ok]");
}

fn check_relocation_insert() {
    serial_println!("check_relocation_insert... ");
    let console = console();
    feed(&console, b"bc{a}\n");
    let mut buf = [0u8; 16];
    assert_eq!(read_line(&console, &mut buf), b"abc\n");
    assert_eq!(console.back_counter(), 0);
    console.with_sink(|sink| assert_eq!(&sink.screen().text::<3>(0), b"abc"));
    serial_println!("[ok]");
}

fn check_backspace() {
    serial_println!("check_backspace... ");
    let console = console();
    feed(&console, &[b'a', b'b', BACKSPACE, b'c', b'\n']);
    let mut buf = [0u8; 16];
    assert_eq!(read_line(&console, &mut buf), b"ac\n");
    serial_println!("[ok]");
}

fn check_kill_line() {
    serial_println!("check_kill_line... ");
    let console = console();
    feed(&console, &[b'x', b'y', KILL_LINE, b'z', b'\n']);
    let mut buf = [0u8; 16];
    assert_eq!(read_line(&console, &mut buf), b"z\n");
    assert_eq!(ctrl(b'U'), KILL_LINE);
    serial_println!("[ok]");
}

fn check_echo_position() {
    serial_println!("check_echo_position... ");
    let console = console();
    feed(&console, b"ok");
    console.with_sink(|sink| {
        assert_eq!(&sink.screen().text::<2>(0), b"ok");
        assert_eq!(sink.screen().cursor(), 2);
        assert_eq!(sink.serial().output(), b"ok");
    });
    serial_println!("[ok]");
}

fn check_write_then_read() {
    serial_println!("check_write_then_read... ");
    let console = console();
    assert_eq!(console.write(b"$ "), Ok(2));
    feed(&console, b"ls\n");
    let mut buf = [0u8; 16];
    assert_eq!(read_line(&console, &mut buf), b"ls\n");
    console.with_sink(|sink| {
        assert_eq!(&sink.screen().text::<4>(0), b"$ ls");
        assert_eq!(sink.screen().cursor(), 80);
    });
    serial_println!("[ok]");
}
