//! Configuration blocks carried by a [`Timer`](super::Timer) handle
//!
//! Every block is plain data: filling it touches no register. The values are
//! applied by [`Timer::init`](super::Timer::init),
//! [`Timer::init_pwm`](super::Timer::init_pwm) and
//! [`Timer::init_capture`](super::Timer::init_capture).
//!
//! ```rust,ignore
//! timer.base = BaseConfig::default().prescaler(7199).period(9999);
//! timer.pwm = PwmConfig::default().mode(Ocm::PwmMode1).pulse(2500);
//! ```

/// Counting direction
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Count from 0 up to the auto-reload value
    #[default]
    Up,
    /// Count from the auto-reload value down to 0
    Down,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseConfig {
    /// Written verbatim to PSC, the counter clock is divided by `prescaler + 1`
    pub prescaler: u16,
    /// Written verbatim to ARR
    pub period: u16,
    pub direction: Direction,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            prescaler: 0,
            period: u16::MAX,
            direction: Direction::Up,
        }
    }
}

impl BaseConfig {
    pub fn prescaler(mut self, prescaler: u16) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub fn period(mut self, period: u16) -> Self {
        self.period = period;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Output compare mode
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Ocm {
    /// Comparison has no effect on the output
    Frozen = 0,
    /// Output goes active on match
    ActiveOnMatch = 1,
    /// Output goes inactive on match
    InactiveOnMatch = 2,
    /// Output toggles on match
    Toggle = 3,
    /// Active while the counter is below the compare value (up-counting)
    PwmMode1 = 6,
    /// Inactive while the counter is below the compare value (up-counting)
    PwmMode2 = 7,
}

/// Compare/PWM polarity
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmConfig {
    pub mode: Ocm,
    /// Initial compare value
    pub pulse: u16,
    pub polarity: Polarity,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            mode: Ocm::PwmMode1,
            pulse: 0,
            polarity: Polarity::ActiveHigh,
        }
    }
}

impl PwmConfig {
    pub fn mode(mut self, mode: Ocm) -> Self {
        self.mode = mode;
        self
    }

    pub fn pulse(mut self, pulse: u16) -> Self {
        self.pulse = pulse;
        self
    }

    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }
}

/// Capture polarity
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapturePolarity {
    #[default]
    Rising,
    Falling,
    /// Writes CCxNP next to CCxP on timers with complementary channels and
    /// [`Falling`](Self::Falling) elsewhere. The F1 input stage ignores
    /// CCxNP, so the captured edge is the one CCxP selects.
    BothEdges,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
/// Input routed to a capture channel (CCxS)
pub enum CaptureSelection {
    /// Channel captures its own input (IC1 ← TI1, IC2 ← TI2, …)
    #[default]
    Direct = 1,
    /// Channel captures its neighbour's input (IC1 ← TI2, IC2 ← TI1, IC3 ← TI4, IC4 ← TI3)
    Indirect = 2,
    /// Channel captures the internal trigger input (TRC)
    TriggerInput = 3,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
/// Enum for configuring the Input Capture prescaler.
/// Determines how many input events are required for one capture.
pub enum CapturePrescaler {
    /// No prescaler (00): Capture every input event.
    #[default]
    Div1 = 0,
    /// Prescaler 2 (01): Capture every second input event.
    Div2 = 1,
    /// Prescaler 4 (10): Capture every fourth input event.
    Div4 = 2,
    /// Prescaler 8 (11): Capture every eighth input event.
    Div8 = 3,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
/// Enum representing the input capture filter settings.
pub enum CaptureFilter {
    /// No filter, sampling frequency = fDTS, N = 1
    #[default]
    NoFilter,
    /// Sampling frequency = fCK_INT, N = 2
    FckIntN2,
    /// Sampling frequency = fCK_INT, N = 4
    FckIntN4,
    /// Sampling frequency = fCK_INT, N = 8
    FckIntN8,
    /// Sampling frequency = fDTS/2, N = 6
    FdtsDiv2N6,
    /// Sampling frequency = fDTS/2, N = 8
    FdtsDiv2N8,
    /// Sampling frequency = fDTS/4, N = 6
    FdtsDiv4N6,
    /// Sampling frequency = fDTS/4, N = 8
    FdtsDiv4N8,
    /// Sampling frequency = fDTS/8, N = 6
    FdtsDiv8N6,
    /// Sampling frequency = fDTS/8, N = 8
    FdtsDiv8N8,
    /// Sampling frequency = fDTS/16, N = 5
    FdtsDiv16N5,
    /// Sampling frequency = fDTS/16, N = 6
    FdtsDiv16N6,
    /// Sampling frequency = fDTS/16, N = 8
    FdtsDiv16N8,
    /// Sampling frequency = fDTS/32, N = 5
    FdtsDiv32N5,
    /// Sampling frequency = fDTS/32, N = 6
    FdtsDiv32N6,
    /// Sampling frequency = fDTS/32, N = 8
    FdtsDiv32N8,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureConfig {
    pub polarity: CapturePolarity,
    pub selection: CaptureSelection,
    pub prescaler: CapturePrescaler,
    pub filter: CaptureFilter,
}

impl CaptureConfig {
    pub fn polarity(mut self, polarity: CapturePolarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn selection(mut self, selection: CaptureSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn prescaler(mut self, prescaler: CapturePrescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub fn filter(mut self, filter: CaptureFilter) -> Self {
        self.filter = filter;
        self
    }
}
