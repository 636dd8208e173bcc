//! Baud-rate divisor calculation.
//!
//! The UART divides its input clock by 16 (oversampling), by a 16-bit integer
//! divisor, and by a fractional factor `1 + numerator / denominator`:
//!
//! ```text
//! baud = clock / (16 * divisor * (1 + numerator / denominator))
//! ```
//!
//! [`calculate`] fixes the integer divisor at `clock / (16 * baud)`, then
//! searches every fraction with `0 <= numerator < denominator <= 15` for the
//! output rate closest to the target. All arithmetic is exact integer math.

use crate::error::{UartError, UartResult};

/// Largest value of the DLM:DLL divisor latch.
pub const MAX_DIVISOR: u32 = 0xFFFF;

/// Largest fractional divider denominator (MULVAL).
pub const MAX_DENOMINATOR: u8 = 15;

/// Smallest divisor the fractional divider tolerates while DIVADDVAL > 0.
pub const MIN_FRACTIONAL_DIVISOR: u32 = 3;

/// Receiver oversampling factor.
const OVERSAMPLING: u64 = 16;

/// Divisor latch and fractional divider values for one baud rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudSettings {
    /// Integer divisor, DLM:DLL (1..=0xFFFF)
    pub divisor: u16,
    /// DIVADDVAL, always below `denominator`
    pub numerator: u8,
    /// MULVAL (1..=15)
    pub denominator: u8,
}

impl BaudSettings {
    /// Baud rate these settings produce from `clock_hz`, rounded down.
    pub fn output_rate(&self, clock_hz: u32) -> u32 {
        let denominator = u64::from(self.denominator);
        let scale =
            OVERSAMPLING * u64::from(self.divisor) * (denominator + u64::from(self.numerator));
        if scale == 0 {
            return 0;
        }
        (u64::from(clock_hz) * denominator / scale) as u32
    }
}

/// Compute divisor settings for `baud_rate` from a `clock_hz` input clock.
///
/// Fails with [`UartError::UnachievableBaudRate`] when the baud rate exceeds
/// `clock / 32` or needs a divisor above [`MAX_DIVISOR`]. Ties between
/// fractions are broken toward the smaller denominator.
///
/// Divisors below [`MIN_FRACTIONAL_DIVISOR`] get no fractional correction,
/// since the hardware requires DLM:DLL >= 3 whenever DIVADDVAL is non-zero.
pub fn calculate(clock_hz: u32, baud_rate: u32) -> UartResult<BaudSettings> {
    if clock_hz == 0 || baud_rate == 0 {
        return Err(UartError::UnachievableBaudRate);
    }

    let clock = u64::from(clock_hz);
    let baud = u64::from(baud_rate);

    // Half the divisor rounds to zero once baud > clock / 32.
    if clock / (2 * OVERSAMPLING * baud) == 0 {
        return Err(UartError::UnachievableBaudRate);
    }

    let divisor = clock / (OVERSAMPLING * baud);
    if divisor > u64::from(MAX_DIVISOR) {
        return Err(UartError::UnachievableBaudRate);
    }

    let mut best = BaudSettings {
        divisor: divisor as u16,
        numerator: 0,
        denominator: 1,
    };
    if divisor < u64::from(MIN_FRACTIONAL_DIVISOR) {
        return Ok(best);
    }

    // Error of a candidate is |clock * d - baud * scale| / scale; kept as a
    // fraction and compared by cross-multiplication.
    let mut best_error = (
        clock.abs_diff(baud * OVERSAMPLING * divisor),
        OVERSAMPLING * divisor,
    );

    for denominator in 1..=u64::from(MAX_DENOMINATOR) {
        for numerator in 0..denominator {
            let scale = OVERSAMPLING * divisor * (denominator + numerator);
            let error = (clock * denominator).abs_diff(baud * scale);

            if u128::from(error) * u128::from(best_error.1)
                < u128::from(best_error.0) * u128::from(scale)
            {
                best = BaudSettings {
                    divisor: divisor as u16,
                    numerator: numerator as u8,
                    denominator: denominator as u8,
                };
                best_error = (error, scale);
            }
        }
    }

    Ok(best)
}
