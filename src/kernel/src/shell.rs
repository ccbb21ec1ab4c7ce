//! The boot shell: reads lines from the console device and runs a few
//! built-in commands.

use kestrel_common::{CharDevice, ConsoleError};
use x86_64::instructions::interrupts;

use crate::console::CONSOLE;
use crate::devsw::{self, CONSOLE_MAJOR};
use crate::println;

/// Longest line the shell reads in one go.
const LINE_MAX: usize = 128;

/// Runs the shell forever.
pub fn run() -> ! {
    let Some(dev) = devsw::device(CONSOLE_MAJOR) else {
        CONSOLE.panic(format_args!("console device missing"));
        crate::arch::x86_64::halt_loop();
    };

    let mut line = [0u8; LINE_MAX];
    loop {
        let _ = interrupts::without_interrupts(|| dev.write(b"$ "));

        // Readers sleep with interrupts off; the sleep re-enables them.
        match interrupts::without_interrupts(|| dev.read(&mut line)) {
            Ok(0) => {
                log::debug!("shell: end of input");
                println!();
            }
            Ok(n) => execute(dev, &line[..n]),
            Err(ConsoleError::Killed) => {
                log::info!("shell: killed, restarting");
                println!("\nkilled");
                CONSOLE.platform().revive();
            }
            Err(ConsoleError::Halted) => crate::arch::x86_64::halt_loop(),
        }
    }
}

fn execute(dev: &dyn CharDevice, line: &[u8]) {
    let text = core::str::from_utf8(line).unwrap_or("");
    let text = text.trim_end_matches(['\n', '\r']);
    let mut words = text.split_whitespace();

    match words.next() {
        None => {}
        Some("help") => {
            println!("commands: help, echo <text>, kill, panic; anything else is echoed");
            println!("keys: ^P process list, ^U kill line, ^H erase, ^D end of input");
            println!("      Home/'{{' edit earlier in the line, End/'}}' return to the end");
        }
        Some("echo") => {
            let rest = text.trim_start().strip_prefix("echo").unwrap_or("");
            println!("{}", rest.trim_start());
        }
        Some("kill") => CONSOLE.platform().kill(),
        Some("panic") => CONSOLE.panic(format_args!("requested from shell")),
        Some(_) => {
            let _ = interrupts::without_interrupts(|| dev.write(line));
        }
    }
}
