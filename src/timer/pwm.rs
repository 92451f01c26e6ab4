//! # Pulse width modulation
//!
//! Every channel of a timer can drive its own PWM output. The period is
//! shared and set by [`BaseConfig::period`](super::BaseConfig), the duty cycle
//! is the channel's compare value.
//!
//! ```rust,ignore
//! let mut pwm = Timer::new(dp.TIM3);
//! pwm.base = pwm.base.prescaler(71).period(999);
//! pwm.pwm = PwmConfig::default().mode(Ocm::PwmMode1).pulse(250);
//! pwm.init(&mut rcc);
//! pwm.init_pwm(Channel::C1);
//! pwm.start_pwm(Channel::C1);
//! pwm.start();
//!
//! // 75 %
//! pwm.set_duty_cycle(Channel::C1, 750);
//! ```

use super::channel::{output_polarity_bits, CCER_ENABLE, CCER_POLARITY};
use super::{Channel, General, Instance, Polarity, PwmConfig, Timer, WithChannel};

impl<TIM: Instance> Timer<TIM> {
    /// Programs `channel` for output compare from [`PwmConfig`]
    ///
    /// The channel's mode byte gets the compare mode with preload, its CCER
    /// nibble gets the polarity with the output still disabled, and the
    /// compare register gets the initial pulse. On the advanced timer the
    /// main output enable is set as well.
    pub fn init_pwm(&mut self, channel: Channel) {
        let PwmConfig {
            mode,
            pulse,
            polarity,
        } = self.pwm;
        self.tim.modify_ccmr(
            channel.mode_register(),
            channel.mode_mask(),
            channel.output_mode_bits(mode),
        );
        self.tim.modify_ccer(
            channel.ccer_mask(),
            output_polarity_bits(polarity) << channel.ccer_offset(),
        );
        self.tim.set_cc_value(channel.index(), pulse);
        self.tim.enable_main_output();
        #[cfg(feature = "defmt")]
        defmt::debug!("{}: {} {} pulse={=u16} {}", TIM::ID, channel, mode, pulse, polarity);
    }

    /// Enables the output of `channel`
    ///
    /// Only CCxE changes, the counter must be started separately.
    pub fn start_pwm(&mut self, channel: Channel) {
        self.enable_channel(channel, true);
    }

    /// Disables the output of `channel`
    pub fn stop_pwm(&mut self, channel: Channel) {
        self.enable_channel(channel, false);
    }

    /// Writes the compare value of `channel`
    ///
    /// The value is not validated against the period, anything above the
    /// auto-reload value keeps the output at its active level.
    pub fn set_duty_cycle(&mut self, channel: Channel, pulse: u16) {
        self.tim.set_cc_value(channel.index(), pulse);
    }

    /// Compare value of `channel`
    pub fn duty_cycle(&self, channel: Channel) -> u16 {
        self.tim.read_cc_value(channel.index())
    }

    /// Compare value giving a 100 % duty cycle
    ///
    /// Saturates at `u16::MAX` when the period spans the whole counter.
    pub fn max_duty_cycle(&self) -> u16 {
        self.tim.read_auto_reload().saturating_add(1)
    }

    pub(crate) fn enable_channel(&mut self, channel: Channel, b: bool) {
        let bit = CCER_ENABLE << channel.ccer_offset();
        self.tim.modify_ccer(bit, if b { bit } else { 0 });
    }

    pub(crate) fn is_channel_enabled(&self, channel: Channel) -> bool {
        self.tim.read_ccer() & (CCER_ENABLE << channel.ccer_offset()) != 0
    }

    /// Borrows one channel as a standalone PWM output
    pub fn pwm_channel(&mut self, channel: Channel) -> PwmChannel<'_, TIM> {
        PwmChannel {
            timer: self,
            channel,
        }
    }
}

/// A single PWM output borrowed from a [`Timer`]
pub struct PwmChannel<'a, TIM> {
    timer: &'a mut Timer<TIM>,
    channel: Channel,
}

impl<TIM: Instance> PwmChannel<'_, TIM> {
    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Disable PWM channel
    #[inline]
    pub fn disable(&mut self) {
        self.timer.stop_pwm(self.channel);
    }

    /// Enable PWM channel
    #[inline]
    pub fn enable(&mut self) {
        self.timer.start_pwm(self.channel);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.timer.is_channel_enabled(self.channel)
    }

    /// Get PWM channel duty cycle
    #[inline]
    pub fn get_duty(&self) -> u16 {
        self.timer.duty_cycle(self.channel)
    }

    /// Get the maximum duty cycle value of the PWM channel
    #[inline]
    pub fn get_max_duty(&self) -> u16 {
        self.timer.max_duty_cycle()
    }

    /// Set PWM channel duty cycle
    #[inline]
    pub fn set_duty(&mut self, duty: u16) {
        self.timer.set_duty_cycle(self.channel, duty);
    }

    /// Set PWM channel polarity, the enable bit is kept
    #[inline]
    pub fn set_polarity(&mut self, p: Polarity) {
        let offset = self.channel.ccer_offset();
        self.timer
            .tim
            .modify_ccer(CCER_POLARITY << offset, output_polarity_bits(p) << offset);
    }
}
