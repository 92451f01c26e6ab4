//! Host stand-ins for the memory mapped peripherals
//!
//! Each register block is zero-initialised plain memory, so a write-one-to-clear
//! or write-only register keeps whatever was last written to it.

use core::ops::Deref;

use cortex_m::peripheral::{nvic, NVIC};

use crate::pac;
use crate::rcc::Rcc;
use crate::timer::{Instance, TimerId};

fn leak<T>() -> &'static T {
    Box::leak(Box::new(unsafe { core::mem::zeroed::<T>() }))
}

pub(crate) fn rcc() -> &'static pac::rcc::RegisterBlock {
    leak()
}

pub(crate) fn constrained_rcc() -> Rcc {
    Rcc::from_registers(rcc())
}

/// Core NVIC token paired with a fake register file
pub(crate) fn nvic() -> (NVIC, &'static nvic::RegisterBlock) {
    (unsafe { cortex_m::Peripherals::steal() }.NVIC, leak())
}

macro_rules! fake_timer {
    ($($(#[$attr:meta])* $Fake:ident: $RB:ty, $id:ident, ($bus:ident, $bit:literal), $up:expr, $cc:expr;)+) => {
        $(
            $(#[$attr])*
            pub(crate) struct $Fake(&'static $RB);

            $(#[$attr])*
            impl $Fake {
                pub(crate) fn new() -> Self {
                    Self(leak())
                }

                /// Registers stay reachable after the fake moves into a `Timer`
                pub(crate) fn regs(&self) -> &'static $RB {
                    self.0
                }
            }

            $(#[$attr])*
            impl Deref for $Fake {
                type Target = $RB;
                fn deref(&self) -> &Self::Target {
                    self.0
                }
            }

            $(#[$attr])*
            crate::rcc::bus! {
                $Fake => (crate::rcc::$bus, $bit),
            }

            $(#[$attr])*
            impl Instance for $Fake {
                const ID: TimerId = TimerId::$id;
                const UPDATE_IRQ: pac::Interrupt = $up;
                const CAPTURE_IRQ: pac::Interrupt = $cc;
            }
        )+
    };
}

fake_timer! {
    #[cfg(any(feature = "stm32f100", feature = "stm32f103", feature = "connectivity"))]
    Tim1: pac::tim1::RegisterBlock, Tim1, (APB2, 11), crate::timer::TIM1_UPDATE_IRQ, pac::Interrupt::TIM1_CC;
    Tim2: pac::tim2::RegisterBlock, Tim2, (APB1, 0), pac::Interrupt::TIM2, pac::Interrupt::TIM2;
    Tim3: pac::tim2::RegisterBlock, Tim3, (APB1, 1), pac::Interrupt::TIM3, pac::Interrupt::TIM3;
    Tim4: pac::tim2::RegisterBlock, Tim4, (APB1, 2), pac::Interrupt::TIM4, pac::Interrupt::TIM4;
}
