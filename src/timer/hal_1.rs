use core::convert::Infallible;

use super::{Instance, PwmChannel};

impl<TIM: Instance> embedded_hal::pwm::ErrorType for PwmChannel<'_, TIM> {
    type Error = Infallible;
}

impl<TIM: Instance> embedded_hal::pwm::SetDutyCycle for PwmChannel<'_, TIM> {
    fn max_duty_cycle(&self) -> u16 {
        self.get_max_duty()
    }
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.set_duty(duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::pwm::SetDutyCycle;

    use crate::mock;
    use crate::timer::{Channel, Timer};

    #[test]
    fn percent_of_period() {
        let mut rcc = mock::constrained_rcc();
        let mut timer = Timer::new(mock::Tim2::new());
        timer.base = timer.base.period(99);
        timer.init(&mut rcc);

        let mut ch = timer.pwm_channel(Channel::C2);
        ch.set_duty_cycle_percent(25).unwrap();
        assert_eq!(ch.get_duty(), 25);
        ch.set_duty_cycle_fully_on().unwrap();
        assert_eq!(ch.get_duty(), 100);
        ch.set_duty_cycle_fully_off().unwrap();
        assert_eq!(timer.duty_cycle(Channel::C2), 0);
    }
}
