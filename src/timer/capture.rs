//! # Input capture
//!
//! A channel in capture mode latches the counter into its capture register
//! on the selected input edge and raises its CCxIF flag.
//!
//! ```rust,ignore
//! let mut ic = Timer::new(dp.TIM3);
//! ic.base = ic.base.prescaler(71);
//! ic.capture = CaptureConfig::default()
//!     .polarity(CapturePolarity::Rising)
//!     .filter(CaptureFilter::FckIntN8);
//! ic.init(&mut rcc);
//! ic.init_capture(Channel::C1);
//! ic.start_capture_interrupt(Channel::C1);
//! ```

use super::channel::{capture_polarity_bits, CCER_ENABLE, CCER_NPOLARITY, CCER_POLARITY};
use super::{CaptureConfig, CapturePolarity, Channel, General, Instance, Timer, WithChannel};

impl<TIM: Instance> Timer<TIM> {
    /// Programs `channel` for input capture from [`CaptureConfig`]
    ///
    /// The channel's mode byte gets input selection, capture prescaler and
    /// filter; its CCER nibble gets the edge polarity with capture enabled.
    pub fn init_capture(&mut self, channel: Channel) {
        let CaptureConfig {
            polarity,
            selection,
            prescaler,
            filter,
        } = self.capture;
        self.tim.modify_ccmr(
            channel.mode_register(),
            channel.mode_mask(),
            channel.capture_mode_bits(selection, prescaler, filter),
        );
        let nibble = capture_polarity_bits(polarity, Self::complementary()) | CCER_ENABLE;
        self.tim
            .modify_ccer(channel.ccer_mask(), nibble << channel.ccer_offset());
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{}: {} capture {} {} {} {}",
            TIM::ID,
            channel,
            polarity,
            selection,
            prescaler,
            filter
        );
    }

    /// Enables the capture interrupt of `channel` and starts counting
    pub fn start_capture_interrupt(&mut self, channel: Channel) {
        self.tim.listen_interrupt(channel.event(), true);
        self.tim.enable_counter(true);
    }

    /// Disables the capture interrupt of `channel`, the counter keeps running
    pub fn stop_capture_interrupt(&mut self, channel: Channel) {
        self.tim.listen_interrupt(channel.event(), false);
    }

    /// Value latched by the last capture on `channel`
    ///
    /// Compare and capture share one register, so on a PWM channel this is
    /// the duty cycle.
    pub fn read_capture(&self, channel: Channel) -> u16 {
        self.tim.read_cc_value(channel.index())
    }

    /// Changes the capture edge of `channel`, capture enable is kept
    pub fn set_capture_polarity(&mut self, channel: Channel, polarity: CapturePolarity) {
        let offset = channel.ccer_offset();
        self.tim.modify_ccer(
            (CCER_POLARITY | CCER_NPOLARITY) << offset,
            capture_polarity_bits(polarity, Self::complementary()) << offset,
        );
    }

    pub fn enable_capture(&mut self, channel: Channel) {
        self.enable_channel(channel, true);
    }

    pub fn disable_capture(&mut self, channel: Channel) {
        self.enable_channel(channel, false);
    }

    fn complementary() -> bool {
        <TIM::Target as WithChannel>::COMPLEMENTARY
    }
}
