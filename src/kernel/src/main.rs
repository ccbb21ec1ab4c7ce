//! Kestrel Kernel Entry Point
//!
//! Boots the console and hands control to the shell. Built only for the
//! bare-metal target; on a host it is an empty program.

#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
mod bare {
    use bootloader::{entry_point, BootInfo};
    use core::panic::PanicInfo;
    use kestrel_kernel::arch::x86_64;
    use kestrel_kernel::boot::{self, Status};
    use kestrel_kernel::console::CONSOLE;
    use kestrel_kernel::println;

    entry_point!(kernel_main);

    /// Kernel entry point.
    ///
    /// Called by the bootloader after setting up the initial environment.
    fn kernel_main(_boot_info: &'static BootInfo) -> ! {
        kestrel_kernel::init();

        boot::banner::print_banner();
        boot::log(Status::Ok, "Serial port initialized");
        boot::log(Status::Ok, "IDT configured");
        boot::log(Status::Ok, "Keyboard and COM1 interrupts enabled");

        #[cfg(feature = "selftest")]
        {
            use kestrel_kernel::testutil::{exit_qemu, QemuExitCode};

            kestrel_kernel::selftest::run_all();
            boot::log(Status::Ok, "Self-test passed");
            exit_qemu(QemuExitCode::Success);
        }

        boot::log(Status::Info, "Boot complete");
        println!("\n Type 'help' for available commands.\n");

        kestrel_kernel::shell::run()
    }

    /// Panic handler.
    ///
    /// Reports through the console's fatal path, which never returns.
    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        #[cfg(feature = "selftest")]
        {
            use kestrel_kernel::serial_println;
            use kestrel_kernel::testutil::{exit_qemu, QemuExitCode};

            serial_println!("[failed]");
            serial_println!("Error: {}", info);
            exit_qemu(QemuExitCode::Failed);
        }

        CONSOLE.panic(format_args!("{}", info));
        x86_64::halt_loop()
    }
}

#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
fn main() {}
