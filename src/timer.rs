/*!
  # Timer

  Handles for the TIM1..TIM4 peripherals. A [`Timer`] owns one timer token,
  carries its [configuration blocks](config) and exposes

  - the base counting lifecycle (this module),
  - PWM output on each channel ([`pwm`]),
  - input capture on each channel ([`capture`]),
  - interrupt dispatch to callbacks or to a queue ([`dispatch`]).

  ### TIM1

  Advanced-control timer, not available on STM32F101. Its outputs are
  additionally gated by the main output enable (BDTR.MOE) which
  [`Timer::init_pwm`] sets. Update and capture/compare requests use separate
  interrupt lines.

  ### TIM2, TIM3, TIM4

  General-purpose timers, TIM4 is not available on low density devices. A
  single interrupt line carries every request.
*/
#![allow(non_upper_case_globals)]

use core::ops::Deref;

use crate::pac;
use crate::rcc::{self, Rcc};

pub mod capture;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod pwm;
pub use channel::*;
pub use config::*;
pub use dispatch::*;
pub use pwm::*;

mod hal_02;
mod hal_1;

/// CR1.CEN, counter enable
const CR1_CEN: u32 = 1 << 0;
/// CR1.DIR, set for down-counting
const CR1_DIR: u32 = 1 << 4;
/// BDTR.MOE, main output enable of the advanced timer
const BDTR_MOE: u32 = 1 << 15;

#[cfg(feature = "stm32f100")]
pub(crate) const TIM1_UPDATE_IRQ: pac::Interrupt = pac::Interrupt::TIM1_UP_TIM16;
#[cfg(any(feature = "stm32f103", feature = "connectivity"))]
pub(crate) const TIM1_UPDATE_IRQ: pac::Interrupt = pac::Interrupt::TIM1_UP;

/// Timer wrapper
pub struct Timer<TIM> {
    pub(crate) tim: TIM,
    /// Applied by [`Timer::init`]
    pub base: BaseConfig,
    /// Applied by [`Timer::init_pwm`]
    pub pwm: PwmConfig,
    /// Applied by [`Timer::init_capture`]
    pub capture: CaptureConfig,
    pub(crate) callbacks: Callbacks<TIM>,
}

/// Timer peripheral identity
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerId {
    Tim1,
    Tim2,
    Tim3,
    Tim4,
}

impl TimerId {
    /// Whether the instance is an advanced-control timer
    pub const fn is_advanced(self) -> bool {
        matches!(self, TimerId::Tim1)
    }
}

bitflags::bitflags! {
    /// Interrupt events, laid out as in DIER and SR
    pub struct Event: u32 {
        const Update  = 1 << 0;
        const C1 = 1 << 1;
        const C2 = 1 << 2;
        const C3 = 1 << 3;
        const C4 = 1 << 4;
    }
}

impl Event {
    /// Capture/compare events of every channel
    pub fn capture() -> Self {
        Self::C1 | Self::C2 | Self::C3 | Self::C4
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Error {
    /// Channel number outside 1..=4
    InvalidChannel(u8),
    /// The callback slot was already registered
    CallbackAlreadySet,
    /// The deferred event queue had no room left
    QueueFull,
}

mod sealed {
    use super::{Direction, Event, ModeRegister};

    pub trait General {
        fn enable_counter(&self, b: bool);
        fn is_counter_enabled(&self) -> bool;
        fn set_direction(&self, dir: Direction);
        fn set_prescaler(&self, psc: u16);
        fn read_prescaler(&self) -> u16;
        fn set_auto_reload(&self, arr: u16);
        fn read_auto_reload(&self) -> u16;
        fn read_count(&self) -> u16;
        fn listen_interrupt(&self, event: Event, b: bool);
        fn is_listening(&self) -> Event;
        fn get_interrupt_flag(&self) -> Event;
        fn clear_interrupt_flag(&self, event: Event);
    }

    pub trait WithChannel: General {
        /// Whether the channels implement the complementary polarity bit
        const COMPLEMENTARY: bool;
        fn read_cc_value(&self, c: usize) -> u16;
        fn set_cc_value(&self, c: usize, value: u16);
        fn modify_ccmr(&self, reg: ModeRegister, mask: u32, bits: u32);
        fn read_ccmr(&self, reg: ModeRegister) -> u32;
        fn modify_ccer(&self, mask: u32, bits: u32);
        fn read_ccer(&self) -> u32;
        fn enable_main_output(&self) {}
    }
}
pub(crate) use sealed::{General, WithChannel};

/// A timer peripheral this crate can drive
pub trait Instance: crate::Sealed + rcc::Enable + Deref<Target: WithChannel> {
    const ID: TimerId;
    /// Line raised by the update event
    const UPDATE_IRQ: pac::Interrupt;
    /// Line raised by the capture/compare events
    const CAPTURE_IRQ: pac::Interrupt;
}

macro_rules! with_channels {
    ($RB:ty, $complementary:literal $(, $bdtr:ident)?) => {
        impl General for $RB {
            #[inline(always)]
            fn enable_counter(&self, b: bool) {
                self.cr1().modify(|r, w| unsafe {
                    w.bits(if b { r.bits() | CR1_CEN } else { r.bits() & !CR1_CEN })
                });
            }
            #[inline(always)]
            fn is_counter_enabled(&self) -> bool {
                self.cr1().read().bits() & CR1_CEN != 0
            }
            #[inline(always)]
            fn set_direction(&self, dir: Direction) {
                self.cr1().modify(|r, w| unsafe {
                    w.bits(match dir {
                        Direction::Up => r.bits() & !CR1_DIR,
                        Direction::Down => r.bits() | CR1_DIR,
                    })
                });
            }
            #[inline(always)]
            fn set_prescaler(&self, psc: u16) {
                self.psc().write(|w| unsafe { w.bits(psc.into()) });
            }
            #[inline(always)]
            fn read_prescaler(&self) -> u16 {
                self.psc().read().bits() as u16
            }
            #[inline(always)]
            fn set_auto_reload(&self, arr: u16) {
                self.arr().write(|w| unsafe { w.bits(arr.into()) });
            }
            #[inline(always)]
            fn read_auto_reload(&self) -> u16 {
                self.arr().read().bits() as u16
            }
            #[inline(always)]
            fn read_count(&self) -> u16 {
                self.cnt().read().bits() as u16
            }
            #[inline(always)]
            fn listen_interrupt(&self, event: Event, b: bool) {
                self.dier().modify(|r, w| unsafe { w.bits(
                    if b {
                        r.bits() | event.bits()
                    } else {
                        r.bits() & !event.bits()
                    }
                ) });
            }
            #[inline(always)]
            fn is_listening(&self) -> Event {
                Event::from_bits_truncate(self.dier().read().bits())
            }
            #[inline(always)]
            fn get_interrupt_flag(&self) -> Event {
                Event::from_bits_truncate(self.sr().read().bits())
            }
            #[inline(always)]
            fn clear_interrupt_flag(&self, event: Event) {
                self.sr().write(|w| unsafe { w.bits(0xffff & !event.bits()) });
            }
        }

        impl WithChannel for $RB {
            const COMPLEMENTARY: bool = $complementary;

            #[inline(always)]
            fn read_cc_value(&self, c: usize) -> u16 {
                self.ccr(c).read().bits() as u16
            }
            #[inline(always)]
            fn set_cc_value(&self, c: usize, value: u16) {
                self.ccr(c).write(|w| unsafe { w.bits(value.into()) });
            }
            #[inline(always)]
            fn modify_ccmr(&self, reg: ModeRegister, mask: u32, bits: u32) {
                match reg {
                    ModeRegister::Ccmr1 => self
                        .ccmr1_output()
                        .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) }),
                    ModeRegister::Ccmr2 => self
                        .ccmr2_output()
                        .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) }),
                };
            }
            #[inline(always)]
            fn read_ccmr(&self, reg: ModeRegister) -> u32 {
                match reg {
                    ModeRegister::Ccmr1 => self.ccmr1_output().read().bits(),
                    ModeRegister::Ccmr2 => self.ccmr2_output().read().bits(),
                }
            }
            #[inline(always)]
            fn modify_ccer(&self, mask: u32, bits: u32) {
                self.ccer().modify(|r, w| unsafe { w.bits((r.bits() & !mask) | bits) });
            }
            #[inline(always)]
            fn read_ccer(&self) -> u32 {
                self.ccer().read().bits()
            }
            $(
                #[inline(always)]
                fn enable_main_output(&self) {
                    self.$bdtr().modify(|r, w| unsafe { w.bits(r.bits() | BDTR_MOE) });
                }
            )?
        }
    };
}

with_channels!(pac::tim2::RegisterBlock, false);
#[cfg(any(feature = "stm32f100", feature = "stm32f103", feature = "connectivity"))]
with_channels!(pac::tim1::RegisterBlock, true, bdtr);

macro_rules! hal {
    ($($TIM:ty: [$Timer:ident, $id:ident, $up:expr, $cc:expr],)+) => {
        $(
            impl Instance for $TIM {
                const ID: TimerId = TimerId::$id;
                const UPDATE_IRQ: pac::Interrupt = $up;
                const CAPTURE_IRQ: pac::Interrupt = $cc;
            }

            pub type $Timer = Timer<$TIM>;
        )+
    };
}

hal! {
    pac::TIM2: [Timer2, Tim2, pac::Interrupt::TIM2, pac::Interrupt::TIM2],
    pac::TIM3: [Timer3, Tim3, pac::Interrupt::TIM3, pac::Interrupt::TIM3],
}

#[cfg(any(feature = "stm32f100", feature = "stm32f103", feature = "connectivity"))]
hal! {
    pac::TIM1: [Timer1, Tim1, TIM1_UPDATE_IRQ, pac::Interrupt::TIM1_CC],
}

#[cfg(feature = "medium")]
hal! {
    pac::TIM4: [Timer4, Tim4, pac::Interrupt::TIM4, pac::Interrupt::TIM4],
}

impl<TIM: Instance> Timer<TIM> {
    /// Wraps a timer token with the default configuration
    ///
    /// No register is touched until [`init`](Self::init).
    pub fn new(tim: TIM) -> Self {
        Self {
            tim,
            base: BaseConfig::default(),
            pwm: PwmConfig::default(),
            capture: CaptureConfig::default(),
            callbacks: Callbacks::default(),
        }
    }

    pub const fn id(&self) -> TimerId {
        TIM::ID
    }

    /// Enables the timer's bus clock and applies [`BaseConfig`]
    ///
    /// Prescaler and period are written verbatim. Calling it again re-applies
    /// the current configuration.
    pub fn init(&mut self, rcc: &mut Rcc) {
        TIM::enable(rcc);
        let BaseConfig {
            prescaler,
            period,
            direction,
        } = self.base;
        self.tim.set_prescaler(prescaler);
        self.tim.set_auto_reload(period);
        self.tim.set_direction(direction);
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{}: psc={=u16} arr={=u16} {}",
            TIM::ID,
            prescaler,
            period,
            direction
        );
    }

    /// Starts counting
    pub fn start(&mut self) {
        self.tim.enable_counter(true);
    }

    /// Stops counting, the counter keeps its value
    pub fn stop(&mut self) {
        self.tim.enable_counter(false);
    }

    /// Enables the update interrupt, then starts counting
    pub fn start_with_interrupt(&mut self) {
        self.tim.listen_interrupt(Event::Update, true);
        self.tim.enable_counter(true);
    }

    /// Disables the update interrupt, then stops counting
    pub fn stop_with_interrupt(&mut self) {
        self.tim.listen_interrupt(Event::Update, false);
        self.tim.enable_counter(false);
    }

    pub fn is_running(&self) -> bool {
        self.tim.is_counter_enabled()
    }

    /// Current counter value
    pub fn counter(&self) -> u16 {
        self.tim.read_count()
    }

    /// Prescaler as currently programmed in the peripheral
    pub fn prescaler(&self) -> u16 {
        self.tim.read_prescaler()
    }

    /// Auto-reload value as currently programmed in the peripheral
    pub fn period(&self) -> u16 {
        self.tim.read_auto_reload()
    }

    /// Starts listening for an `event`
    pub fn listen(&mut self, event: Event) {
        self.tim.listen_interrupt(event, true);
    }

    /// Stops listening for an `event`
    pub fn unlisten(&mut self, event: Event) {
        self.tim.listen_interrupt(event, false);
    }

    /// Events currently enabled in DIER
    pub fn listening(&self) -> Event {
        self.tim.is_listening()
    }

    /// Clears interrupt associated with `event`.
    ///
    /// If the interrupt is not cleared, it will immediately retrigger after
    /// the ISR has finished.
    pub fn clear_interrupt(&mut self, event: Event) {
        self.tim.clear_interrupt_flag(event);
    }

    /// Pending interrupt flags
    pub fn get_interrupt(&self) -> Event {
        self.tim.get_interrupt_flag()
    }

    /// Releases the TIM peripheral
    pub fn release(self) -> TIM {
        self.tim
    }
}
