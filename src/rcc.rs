//! # Reset & Control Clock
//!
//! Only peripheral clock gating lives here: a timer's registers stay dead
//! until its bus-enable bit is set. Clock tree configuration is left to the
//! application.

use core::ops::Deref;

use crate::pac::{rcc, RCC};

mod enable;
#[allow(unused_imports)]
pub(crate) use enable::{bus, bus_enable};

/// Extension trait that constrains the `RCC` peripheral
pub trait RccExt {
    /// Constrains the `RCC` peripheral so it plays nicely with the other abstractions
    fn constrain(self) -> Rcc;
}

impl RccExt for RCC {
    fn constrain(self) -> Rcc {
        Rcc {
            rb: unsafe { &*RCC::ptr() },
        }
    }
}

/// Constrained RCC peripheral
///
/// Aquired by calling the [constrain](RccExt::constrain) method
/// on the `RCC` struct from the `PAC`
///
/// ```rust,ignore
/// let dp = pac::Peripherals::take().unwrap();
/// let mut rcc = dp.RCC.constrain();
/// ```
pub struct Rcc {
    rb: &'static rcc::RegisterBlock,
}

impl Rcc {
    #[cfg(test)]
    pub(crate) fn from_registers(rb: &'static rcc::RegisterBlock) -> Self {
        Self { rb }
    }
}

impl Deref for Rcc {
    type Target = rcc::RegisterBlock;
    fn deref(&self) -> &Self::Target {
        self.rb
    }
}

/// Advanced Peripheral Bus 1 (APB1) registers
pub struct APB1 {
    _0: (),
}

impl APB1 {
    pub(crate) fn enr(rcc: &rcc::RegisterBlock) -> &rcc::APB1ENR {
        rcc.apb1enr()
    }
}

/// Advanced Peripheral Bus 2 (APB2) registers
pub struct APB2 {
    _0: (),
}

impl APB2 {
    pub(crate) fn enr(rcc: &rcc::RegisterBlock) -> &rcc::APB2ENR {
        rcc.apb2enr()
    }
}

/// Bus associated to peripheral
pub trait RccBus: crate::Sealed {
    /// Bus type;
    type Bus;
}

/// Enable/disable peripheral
pub trait Enable: RccBus {
    /// Sets the peripheral's bus-enable bit
    fn enable(rcc: &rcc::RegisterBlock);
    /// Clears the peripheral's bus-enable bit
    fn disable(rcc: &rcc::RegisterBlock);
    fn is_enabled(rcc: &rcc::RegisterBlock) -> bool;
}
