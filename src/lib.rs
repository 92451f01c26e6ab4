//! # Timer driver for the STM32F1 family of microcontrollers
//!
//! Base counting, PWM output, input capture and interrupt dispatch for the
//! TIM1..TIM4 peripherals, plus the slice of the NVIC needed to route their
//! interrupt lines.
//!
//! # Usage
//!
//! Select the microcontroller with the corresponding Cargo feature
//! (`stm32f103` and `medium` are enabled by default):
//!
//! ```toml
//! [dependencies.stm32f1xx-timer]
//! version = "0.1.0"
//! default-features = false
//! features = ["stm32f100", "rt"]
//! ```
//!
//! ## Usage example
//!
//! Generate an update interrupt every second from TIM2 running off an 72 MHz
//! APB1 timer clock.
//!
//! ```rust,ignore
//! use stm32f1xx_timer::{nvic::InterruptController, pac, prelude::*, timer::{Direction, Timer}};
//!
//! let dp = pac::Peripherals::take().unwrap();
//! let cp = cortex_m::Peripherals::take().unwrap();
//! let mut rcc = dp.RCC.constrain();
//!
//! let mut timer = Timer::new(dp.TIM2);
//! timer.base = timer.base.prescaler(7199).period(9999).direction(Direction::Up);
//! timer.init(&mut rcc);
//! timer.start_with_interrupt();
//!
//! let mut nvic = InterruptController::new(cp.NVIC);
//! nvic.set_priority(pac::Interrupt::TIM2, 1);
//! nvic.enable(pac::Interrupt::TIM2);
//! ```
//!
//! # More examples
//!
//! See the `demos` folder.

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "stm32f100")]
pub use stm32f1::stm32f100 as pac;

#[cfg(feature = "stm32f101")]
pub use stm32f1::stm32f101 as pac;

#[cfg(feature = "stm32f103")]
pub use stm32f1::stm32f103 as pac;

#[cfg(any(feature = "stm32f105", feature = "stm32f107"))]
pub use stm32f1::stm32f107 as pac;

pub mod nvic;
pub mod prelude;
pub mod rcc;
pub mod timer;

#[cfg(test)]
pub(crate) mod mock;

mod sealed {
    pub trait Sealed {}
}
pub(crate) use sealed::Sealed;
