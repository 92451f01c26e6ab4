//! # Nested Vectored Interrupt Controller
//!
//! Enables, disables and prioritises interrupt lines in the NVIC's banked
//! register file. Lines are numbered as in the device vector table
//! ([`pac::Interrupt`](crate::pac::Interrupt)); any raw number can be passed
//! through [`Line`].
//!
//! ```rust,ignore
//! let cp = cortex_m::Peripherals::take().unwrap();
//! let mut nvic = InterruptController::new(cp.NVIC);
//! nvic.set_priority(pac::Interrupt::TIM3, 2);
//! nvic.enable(pac::Interrupt::TIM3);
//! ```
//!
//! Only the first three enable/disable banks (lines 0..96) are handled, which
//! covers every STM32F1 vector. Requests for higher lines are ignored.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::{nvic::RegisterBlock, NVIC};

/// Number of 32-line enable/disable banks this driver touches
pub const HANDLED_BANKS: usize = 3;

/// Priority bits implemented by the STM32F1 (upper nibble of each byte)
pub const PRIORITY_BITS: u8 = 4;

const PRIORITY_MASK: u8 = (1 << PRIORITY_BITS) - 1;
const PRIORITY_OFFSET: u8 = 8 - PRIORITY_BITS;

/// An interrupt line number with its bank and priority slot coordinates
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line(u16);

impl Line {
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    /// Line of any interrupt enumeration known to `cortex-m`
    pub fn of<I: InterruptNumber>(irq: I) -> Self {
        Self(irq.number())
    }

    pub const fn number(self) -> u16 {
        self.0
    }

    /// Index of the enable/disable/pending word holding this line
    pub const fn bank(self) -> usize {
        self.0 as usize / 32
    }

    /// Bit of this line inside its bank word
    pub const fn bit(self) -> u32 {
        self.0 as u32 % 32
    }

    /// Index of the priority word holding this line
    pub const fn priority_slot(self) -> usize {
        self.0 as usize / 4
    }

    /// Position of this line's priority level inside its priority word
    ///
    /// The level is left-justified in the line's byte, only the upper
    /// [`PRIORITY_BITS`] are implemented.
    pub const fn priority_shift(self) -> u32 {
        8 * (self.0 as u32 % 4) + (8 - PRIORITY_BITS as u32)
    }
}

impl From<u16> for Line {
    fn from(number: u16) -> Self {
        Self(number)
    }
}

impl From<crate::pac::Interrupt> for Line {
    fn from(irq: crate::pac::Interrupt) -> Self {
        Self::of(irq)
    }
}

/// Owner of the NVIC enable, pending and priority registers
pub struct InterruptController {
    nvic: NVIC,
    rb: &'static RegisterBlock,
}

impl InterruptController {
    /// Takes ownership of the core `NVIC` peripheral
    pub fn new(nvic: NVIC) -> Self {
        Self {
            nvic,
            rb: unsafe { &*NVIC::PTR },
        }
    }

    #[cfg(test)]
    pub(crate) fn from_registers(nvic: NVIC, rb: &'static RegisterBlock) -> Self {
        Self { nvic, rb }
    }

    /// Gives the `NVIC` peripheral back
    pub fn release(self) -> NVIC {
        self.nvic
    }

    /// Bank of `line` if it lies within [`HANDLED_BANKS`]
    fn bank(line: Line) -> Option<usize> {
        let bank = line.bank();
        if bank < HANDLED_BANKS {
            Some(bank)
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("interrupt line {} outside handled banks, ignored", line.number());
            None
        }
    }

    /// Enables or disables `line`
    ///
    /// Enabling sets the line's bit in its set-enable word. Disabling writes
    /// only the line's bit to the clear-enable word, other lines keep their
    /// state. Lines beyond [`HANDLED_BANKS`] are ignored.
    pub fn set_enabled(&mut self, line: impl Into<Line>, enabled: bool) {
        let line = line.into();
        let Some(bank) = Self::bank(line) else {
            return;
        };
        let mask = 1 << line.bit();
        unsafe {
            if enabled {
                self.rb.iser[bank].modify(|w| w | mask);
            } else {
                self.rb.icer[bank].write(mask);
            }
        }
    }

    #[inline]
    pub fn enable(&mut self, line: impl Into<Line>) {
        self.set_enabled(line, true);
    }

    #[inline]
    pub fn disable(&mut self, line: impl Into<Line>) {
        self.set_enabled(line, false);
    }

    pub fn is_enabled(&self, line: impl Into<Line>) -> bool {
        let line = line.into();
        Self::bank(line).is_some_and(|bank| self.rb.iser[bank].read() & (1 << line.bit()) != 0)
    }

    /// ORs `level` into the priority byte of `line`
    ///
    /// The previous level is not cleared, so re-prioritising a line with
    /// this call merges both values. Use [`set_priority`](Self::set_priority)
    /// to replace a level.
    pub fn or_priority(&mut self, line: impl Into<Line>, level: u8) {
        let line = line.into();
        if let Some(ipr) = self.rb.ipr.get(usize::from(line.number())) {
            unsafe { ipr.modify(|b| b | ((level & PRIORITY_MASK) << PRIORITY_OFFSET)) };
        }
    }

    /// Replaces the priority level of `line`
    ///
    /// Lower values are more urgent. Only the low [`PRIORITY_BITS`] of
    /// `level` are kept.
    pub fn set_priority(&mut self, line: impl Into<Line>, level: u8) {
        let line = line.into();
        if let Some(ipr) = self.rb.ipr.get(usize::from(line.number())) {
            unsafe {
                ipr.modify(|b| {
                    (b & !(PRIORITY_MASK << PRIORITY_OFFSET))
                        | ((level & PRIORITY_MASK) << PRIORITY_OFFSET)
                })
            };
        }
    }

    /// Current priority level of `line`
    pub fn priority(&self, line: impl Into<Line>) -> u8 {
        let line = line.into();
        self.rb
            .ipr
            .get(usize::from(line.number()))
            .map_or(0, |ipr| (ipr.read() >> PRIORITY_OFFSET) & PRIORITY_MASK)
    }

    /// Forces `line` into the pending state
    pub fn pend(&mut self, line: impl Into<Line>) {
        let line = line.into();
        if let Some(bank) = Self::bank(line) {
            unsafe { self.rb.ispr[bank].write(1 << line.bit()) };
        }
    }

    /// Clears the pending state of `line`
    pub fn unpend(&mut self, line: impl Into<Line>) {
        let line = line.into();
        if let Some(bank) = Self::bank(line) {
            unsafe { self.rb.icpr[bank].write(1 << line.bit()) };
        }
    }

    pub fn is_pending(&self, line: impl Into<Line>) -> bool {
        let line = line.into();
        Self::bank(line).is_some_and(|bank| self.rb.ispr[bank].read() & (1 << line.bit()) != 0)
    }

    /// Whether the handler of `line` is currently running or preempted
    pub fn is_active(&self, line: impl Into<Line>) -> bool {
        let line = line.into();
        Self::bank(line).is_some_and(|bank| self.rb.iabr[bank].read() & (1 << line.bit()) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use crate::pac::Interrupt;

    fn controller() -> (InterruptController, &'static RegisterBlock) {
        let (token, rb) = mock::nvic();
        (InterruptController::from_registers(token, rb), rb)
    }

    /// Priority word `slot` as seen through the word-wide view of the table
    fn priority_word(rb: &RegisterBlock, slot: usize) -> u32 {
        (0..4).fold(0, |word, i| word | (u32::from(rb.ipr[4 * slot + i].read()) << (8 * i)))
    }

    #[test]
    fn line_coordinates() {
        let line = Line::new(35);
        assert_eq!(line.bank(), 1);
        assert_eq!(line.bit(), 3);

        let line = Line::new(10);
        assert_eq!(line.priority_slot(), 2);
        assert_eq!(line.priority_shift(), 20);

        assert_eq!(Line::from(Interrupt::TIM2).number(), 28);
    }

    #[test]
    fn enable_line_in_second_bank() {
        let (mut nvic, rb) = controller();
        nvic.enable(Line::new(35));
        assert_eq!(rb.iser[1].read(), 1 << 3);
        assert_eq!(rb.iser[0].read(), 0);
        assert_eq!(rb.iser[2].read(), 0);
        assert!(nvic.is_enabled(Line::new(35)));
    }

    #[test]
    fn disable_line_in_second_bank() {
        let (mut nvic, rb) = controller();
        nvic.enable(Line::new(33));
        nvic.enable(Line::new(40));
        nvic.disable(Line::new(35));
        assert_eq!(rb.icer[1].read(), 1 << 3);
        assert_eq!(rb.iser[1].read(), (1 << 1) | (1 << 8));
    }

    #[test]
    fn enabling_twice_is_idempotent() {
        let (mut nvic, rb) = controller();
        nvic.enable(Interrupt::TIM3);
        let once = rb.iser[0].read();
        nvic.enable(Interrupt::TIM3);
        assert_eq!(rb.iser[0].read(), once);
        assert_eq!(once, 1 << 29);
    }

    #[test]
    fn enable_keeps_neighbours() {
        let (mut nvic, rb) = controller();
        nvic.enable(Interrupt::TIM2);
        nvic.enable(Interrupt::TIM4);
        assert_eq!(rb.iser[0].read(), (1 << 28) | (1 << 30));
    }

    #[test]
    fn lines_beyond_third_bank_are_ignored() {
        let (mut nvic, rb) = controller();
        nvic.enable(Line::new(96));
        nvic.disable(Line::new(130));
        nvic.pend(Line::new(100));
        nvic.unpend(Line::new(100));
        for bank in 0..8 {
            assert_eq!(rb.iser[bank].read(), 0);
            assert_eq!(rb.icer[bank].read(), 0);
            assert_eq!(rb.ispr[bank].read(), 0);
            assert_eq!(rb.icpr[bank].read(), 0);
        }
    }

    #[test]
    fn queries_beyond_third_bank_report_false() {
        let (nvic, rb) = controller();
        unsafe {
            rb.iser[3].write(!0);
            rb.ispr[3].write(!0);
        }
        assert!(!nvic.is_enabled(Line::new(96)));
        assert!(!nvic.is_pending(Line::new(97)));
        assert!(!nvic.is_active(Line::new(98)));
    }

    #[test]
    fn or_priority_is_additive() {
        let (mut nvic, rb) = controller();
        unsafe { rb.ipr[8].write(0xA0) };
        nvic.or_priority(Line::new(10), 2);
        assert_eq!(priority_word(rb, 2), 0x0000_00A0 | (2 << 20));

        nvic.or_priority(Line::new(10), 1);
        assert_eq!(nvic.priority(Line::new(10)), 3);
    }

    #[test]
    fn set_priority_replaces_level() {
        let (mut nvic, rb) = controller();
        unsafe { rb.ipr[8].write(0xA0) };
        nvic.or_priority(Line::new(10), 2);
        nvic.set_priority(Line::new(10), 1);
        assert_eq!(priority_word(rb, 2), 0x0000_00A0 | (1 << 20));
        assert_eq!(nvic.priority(Line::new(10)), 1);
        assert_eq!(nvic.priority(Line::new(8)), 0xA);
    }

    #[test]
    fn priority_level_is_truncated_to_implemented_bits() {
        let (mut nvic, rb) = controller();
        nvic.set_priority(Line::new(11), 0x1F);
        assert_eq!(priority_word(rb, 2), 0xF << 28);
        assert_eq!(priority_word(rb, 3), 0);
    }

    #[test]
    fn pending_state() {
        let (mut nvic, rb) = controller();
        nvic.pend(Interrupt::TIM3);
        assert_eq!(rb.ispr[0].read(), 1 << 29);
        assert!(nvic.is_pending(Interrupt::TIM3));
        nvic.unpend(Interrupt::TIM3);
        assert_eq!(rb.icpr[0].read(), 1 << 29);
        assert!(!nvic.is_active(Interrupt::TIM3));
    }

    #[test]
    fn release_returns_the_peripheral() {
        let (mut nvic, rb) = controller();
        nvic.enable(Interrupt::TIM2);
        let token = nvic.release();
        let nvic = InterruptController::from_registers(token, rb);
        assert!(nvic.is_enabled(Interrupt::TIM2));
    }
}
