//! Interrupt Descriptor Table (IDT) and exception handlers for x86_64.
//!
//! The keyboard and COM1 handlers are the console's input producers.

use crate::arch::x86_64::pic::{self, InterruptIndex, Pic};
use crate::console::{CONSOLE, KEYBOARD};
use kestrel_hal::{InterruptController, Serial};
use lazy_static::lazy_static;
use x86_64::instructions::port::Port;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

/// PS/2 controller data port.
const PS2_DATA_PORT: u16 = 0x60;

lazy_static! {
    /// The Interrupt Descriptor Table (IDT).
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
        idt.divide_error.set_handler_fn(divide_error_handler);

        // Hardware interrupts
        idt[InterruptIndex::Timer.as_usize()]
            .set_handler_fn(timer_interrupt_handler);
        idt[InterruptIndex::Keyboard.as_usize()]
            .set_handler_fn(keyboard_interrupt_handler);
        idt[InterruptIndex::Com1.as_usize()]
            .set_handler_fn(com1_interrupt_handler);

        idt
    };
}

/// Loads the IDT, programs the PICs and enables hardware interrupts.
pub fn init_idt() {
    IDT.load();
    pic::init();
    Pic.enable();
}

/// Handler for the timer interrupt.
extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    Pic.end_of_interrupt(InterruptIndex::Timer.as_u8());
}

/// Handler for the keyboard interrupt.
extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    let mut port = Port::new(PS2_DATA_PORT);
    // SAFETY: reading the PS/2 data port acknowledges the pending scancode.
    let scancode: u8 = unsafe { port.read() };
    let mut byte = KEYBOARD.lock().decode(scancode);
    CONSOLE.interrupt_feed(|| byte.take());

    Pic.end_of_interrupt(InterruptIndex::Keyboard.as_u8());
}

/// Handler for bytes arriving on COM1.
extern "x86-interrupt" fn com1_interrupt_handler(_stack_frame: InterruptStackFrame) {
    let mut port = crate::arch::x86_64::Com1;
    CONSOLE.interrupt_feed(|| port.read_byte());

    Pic.end_of_interrupt(InterruptIndex::Com1.as_u8());
}

/// Handler for the breakpoint exception (INT3).
extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::info!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

/// Handler for the double fault exception.
extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

/// Handler for the page fault exception.
extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    panic!(
        "EXCEPTION: PAGE FAULT at {:?} ({:?})\n{:#?}",
        Cr2::read(),
        error_code,
        stack_frame
    );
}

/// Handler for the general protection fault exception.
extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        "EXCEPTION: GENERAL PROTECTION FAULT ({:#x})\n{:#?}",
        error_code, stack_frame
    );
}

/// Handler for the divide error exception.
extern "x86-interrupt" fn divide_error_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: DIVIDE ERROR\n{:#?}", stack_frame);
}
