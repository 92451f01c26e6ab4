pub use crate::rcc::RccExt as _stm32_timer_rcc_RccExt;
pub use embedded_hal::pwm::SetDutyCycle as _embedded_hal_pwm_SetDutyCycle;
pub use embedded_hal_02::PwmPin as _embedded_hal_02_PwmPin;
