//! Capture/compare channel register layout
//!
//! Each channel owns one byte of a mode register (CCMR1 holds channels 1 and
//! 2, CCMR2 holds channels 3 and 4) and one nibble of the enable register
//! CCER. The functions here only compute masks and field values, the
//! register access itself goes through [`Timer`](super::Timer).

use core::convert::TryFrom;

use super::{CapturePolarity, CapturePrescaler, CaptureFilter, CaptureSelection, Error, Event};
use super::{Ocm, Polarity};

/// CCxE, channel output / capture enable
pub(crate) const CCER_ENABLE: u32 = 1 << 0;
/// CCxP, inverted output / falling edge
pub(crate) const CCER_POLARITY: u32 = 1 << 1;
/// CCxNP, complementary output polarity
pub(crate) const CCER_NPOLARITY: u32 = 1 << 3;

/// OCxPE, preload the compare register at the next update event
const CCMR_PRELOAD: u32 = 1 << 3;

/// Capture/compare channel, numbered 1..=4 on the register side
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Channel {
    C1 = 0,
    C2 = 1,
    C3 = 2,
    C4 = 3,
}

/// Capture/compare mode register holding a channel's configuration byte
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeRegister {
    Ccmr1,
    Ccmr2,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::C1, Channel::C2, Channel::C3, Channel::C4];

    /// Channel number as printed in the reference manual (1..=4)
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn mode_register(self) -> ModeRegister {
        match self {
            Channel::C1 | Channel::C2 => ModeRegister::Ccmr1,
            Channel::C3 | Channel::C4 => ModeRegister::Ccmr2,
        }
    }

    /// Offset of the channel's byte inside its mode register
    pub const fn mode_shift(self) -> u32 {
        match self {
            Channel::C1 | Channel::C3 => 0,
            Channel::C2 | Channel::C4 => 8,
        }
    }

    /// The whole configuration byte of the channel
    pub const fn mode_mask(self) -> u32 {
        0xFF << self.mode_shift()
    }

    /// Output compare byte: OCxM with the compare preload enabled
    pub const fn output_mode_bits(self, mode: Ocm) -> u32 {
        (((mode as u32) << 4) | CCMR_PRELOAD) << self.mode_shift()
    }

    /// Input capture byte: CCxS, ICxPSC and ICxF
    pub const fn capture_mode_bits(
        self,
        selection: CaptureSelection,
        prescaler: CapturePrescaler,
        filter: CaptureFilter,
    ) -> u32 {
        ((selection as u32 & 0b11) | ((prescaler as u32 & 0b11) << 2) | ((filter as u32 & 0xF) << 4))
            << self.mode_shift()
    }

    /// Offset of the channel's nibble inside CCER
    pub const fn ccer_offset(self) -> u32 {
        4 * self as u32
    }

    /// The whole CCER nibble of the channel
    pub const fn ccer_mask(self) -> u32 {
        0xF << self.ccer_offset()
    }

    /// Interrupt enable / status flag of the channel
    pub const fn event(self) -> Event {
        match self {
            Channel::C1 => Event::C1,
            Channel::C2 => Event::C2,
            Channel::C3 => Event::C3,
            Channel::C4 => Event::C4,
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    /// Accepts register-side numbering, 1..=4
    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Channel::C1),
            2 => Ok(Channel::C2),
            3 => Ok(Channel::C3),
            4 => Ok(Channel::C4),
            n => Err(Error::InvalidChannel(n)),
        }
    }
}

/// CCER nibble of an output channel, enable bit clear
pub const fn output_polarity_bits(polarity: Polarity) -> u32 {
    match polarity {
        Polarity::ActiveHigh => 0,
        Polarity::ActiveLow => CCER_POLARITY,
    }
}

/// CCER nibble of a capture channel, enable bit clear
///
/// `complementary` tells whether the timer implements CCxNP. A both-edges
/// request writes CCxNP alongside CCxP there, otherwise it is written as the
/// falling edge. CCxNP has no effect on an F1 input channel.
pub const fn capture_polarity_bits(polarity: CapturePolarity, complementary: bool) -> u32 {
    match polarity {
        CapturePolarity::Rising => 0,
        CapturePolarity::Falling => CCER_POLARITY,
        CapturePolarity::BothEdges if complementary => CCER_POLARITY | CCER_NPOLARITY,
        CapturePolarity::BothEdges => CCER_POLARITY,
    }
}
