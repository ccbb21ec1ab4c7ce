//! Boot banner.

use crate::println;

/// Prints the Kestrel boot banner.
pub fn print_banner() {
    println!("  _  __        _            _ ");
    println!(" | |/ /___ ___| |_ _ __ ___| |");
    println!(" | ' // _ / __| __| '__/ _ \\ |");
    println!(" | . \\  __\\__ \\ |_| | |  __/ |");
    println!(" |_|\\_\\___|___/\\__|_|  \\___|_|");
    println!();
    println!(" Kestrel v{}", env!("CARGO_PKG_VERSION"));
    println!();
}
