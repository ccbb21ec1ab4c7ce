//! Reader blocking, wake-up and cancellation across real threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex as StdMutex};
use std::thread;
use std::time::Duration;

use kestrel_common::ConsoleError;
use kestrel_console::testing::{SimScreen, SimSerial};
use kestrel_console::{Console, Platform, WaitChannel};
use spin::{Mutex, MutexGuard};

/// Platform backed by a condvar generation counter.
#[derive(Default)]
struct ThreadPlatform {
    generation: StdMutex<u64>,
    cond: Condvar,
    killed: AtomicBool,
    sleepers: AtomicUsize,
}

impl ThreadPlatform {
    fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
        let _generation = self.generation.lock().unwrap();
        self.cond.notify_all();
    }

    fn wait_for_sleepers(&self, count: usize) {
        while self.sleepers.load(Ordering::SeqCst) < count {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Platform for ThreadPlatform {
    fn sleep<'a, T>(
        &self,
        _chan: WaitChannel,
        guard: MutexGuard<'a, T>,
        lock: &'a Mutex<T>,
    ) -> MutexGuard<'a, T> {
        let mut generation = self.generation.lock().unwrap();
        let seen = *generation;
        self.sleepers.fetch_add(1, Ordering::SeqCst);
        drop(guard);
        while *generation == seen && !self.killed.load(Ordering::SeqCst) {
            generation = self.cond.wait(generation).unwrap();
        }
        drop(generation);
        lock.lock()
    }

    fn wakeup(&self, _chan: WaitChannel) {
        *self.generation.lock().unwrap() += 1;
        self.cond.notify_all();
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn proc_dump(&self) {}

    fn cpu_id(&self) -> u32 {
        0
    }

    fn caller_pcs(&self, pcs: &mut [usize]) {
        pcs.fill(0);
    }

    fn halt(&self) {}
}

type ThreadConsole = Console<ThreadPlatform, SimSerial, SimScreen>;

fn console() -> Arc<ThreadConsole> {
    Arc::new(Console::new(
        ThreadPlatform::default(),
        SimSerial::new(),
        SimScreen::new(),
    ))
}

fn feed(console: &ThreadConsole, bytes: &[u8]) {
    let mut iter = bytes.iter().copied();
    console.interrupt_feed(|| iter.next());
}

#[test]
fn test_blocked_reader_wakes_on_commit() {
    let console = console();
    let reader = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            let mut buf = [0u8; 10];
            let n = console.read(&mut buf)?;
            Ok::<_, ConsoleError>(buf[..n].to_vec())
        })
    };

    console.platform().wait_for_sleepers(1);
    // An uncommitted line does not release the reader.
    feed(&console, b"h");
    feed(&console, b"i\n");

    assert_eq!(reader.join().unwrap(), Ok(b"hi\n".to_vec()));
}

#[test]
fn test_killed_reader_returns_error_and_leaves_buffer() {
    let console = console();
    feed(&console, b"typed but not entered");
    let before = console.indices();

    let reader = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            let mut buf = [0u8; 10];
            console.read(&mut buf)
        })
    };

    console.platform().wait_for_sleepers(1);
    console.platform().kill();

    assert_eq!(reader.join().unwrap(), Err(ConsoleError::Killed));
    assert_eq!(console.indices(), before);
}

#[test]
fn test_competing_readers_never_share_a_byte() {
    const READERS: usize = 4;
    const LINES_EACH: usize = 5;

    let console = console();
    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let console = Arc::clone(&console);
            thread::spawn(move || {
                let mut lines = Vec::new();
                for _ in 0..LINES_EACH {
                    let mut buf = [0u8; 16];
                    let n = console.read(&mut buf).unwrap();
                    lines.push(buf[..n].to_vec());
                }
                lines
            })
        })
        .collect();

    let mut expected = Vec::new();
    for i in 0..READERS * LINES_EACH {
        let line = format!("line{:02}\n", i).into_bytes();
        feed(&console, &line);
        expected.push(line);
        // Keep the ring from filling while readers catch up.
        while console.indices().read != console.indices().commit {
            thread::yield_now();
        }
    }

    let mut received: Vec<Vec<u8>> = readers
        .into_iter()
        .flat_map(|reader| reader.join().unwrap())
        .collect();
    received.sort();
    assert_eq!(received, expected);
}

#[test]
fn test_reads_concatenate_to_fed_lines() {
    let console = console();
    let mut seed: u32 = 0x2545_f491;
    let mut fed = Vec::new();
    let mut read = Vec::new();

    for _ in 0..200 {
        let mut line = Vec::new();
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let len = (seed >> 16) as usize % 60;
        for _ in 0..len {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            // Printable ASCII minus the relocation markers.
            let byte = b' ' + ((seed >> 16) % 91) as u8;
            line.push(byte);
        }
        line.push(b'\n');
        feed(&console, &line);
        fed.extend_from_slice(&line);

        let mut buf = [0u8; 128];
        let n = console.read(&mut buf).unwrap();
        read.extend_from_slice(&buf[..n]);
    }

    assert_eq!(read, fed);
}
