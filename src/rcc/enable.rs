use super::*;

macro_rules! bus_enable {
    ($PER:ty => $bit:literal) => {
        impl $crate::rcc::Enable for $PER {
            #[inline(always)]
            fn enable(rcc: &$crate::pac::rcc::RegisterBlock) {
                <Self as $crate::rcc::RccBus>::Bus::enr(rcc)
                    .modify(|r, w| unsafe { w.bits(r.bits() | (1 << $bit)) });
                // Stall the pipeline to work around erratum 2.1.13 (DM00037591)
                #[cfg(all(target_arch = "arm", target_os = "none"))]
                cortex_m::asm::dsb();
                #[cfg(feature = "defmt")]
                defmt::trace!("{=str}: bus clock enabled", stringify!($PER));
            }
            #[inline(always)]
            fn disable(rcc: &$crate::pac::rcc::RegisterBlock) {
                <Self as $crate::rcc::RccBus>::Bus::enr(rcc)
                    .modify(|r, w| unsafe { w.bits(r.bits() & !(1 << $bit)) });
            }
            #[inline(always)]
            fn is_enabled(rcc: &$crate::pac::rcc::RegisterBlock) -> bool {
                (<Self as $crate::rcc::RccBus>::Bus::enr(rcc).read().bits() >> $bit) & 0x1 != 0
            }
        }
    };
}
pub(crate) use bus_enable;

macro_rules! bus {
    ($($PER:ty => ($busX:ty, $bit:literal),)+) => {
        $(
            impl $crate::Sealed for $PER {}
            impl $crate::rcc::RccBus for $PER {
                type Bus = $busX;
            }
            $crate::rcc::bus_enable!($PER => $bit);
        )+
    }
}
pub(crate) use bus;

bus! {
    crate::pac::TIM2 => (APB1, 0),
    crate::pac::TIM3 => (APB1, 1),
}

#[cfg(any(feature = "stm32f100", feature = "stm32f103", feature = "connectivity"))]
bus! {
    crate::pac::TIM1 => (APB2, 11),
}

#[cfg(feature = "medium")]
bus! {
    crate::pac::TIM4 => (APB1, 2),
}
