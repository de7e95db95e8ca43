/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Divider search.

use crate::divider::{DividerSpec, OutputDivider};
use crate::Error;

/// Minimum crystal frequency
pub const XTAL_FREQ_MIN: u32 = 10_000_000;

/// Maximum crystal frequency
pub const XTAL_FREQ_MAX: u32 = 40_000_000;

/// Output frequency must be above this
pub const OUTPUT_FREQ_MIN: u32 = 2;

/// Maximum output frequency
pub const OUTPUT_FREQ_MAX: u32 = 200_000_000;

pub const VCO_FREQ_MIN: u64 = 600_000_000;
pub const VCO_FREQ_MAX: u64 = 900_000_000;

/// Above this the output Multisynth must run in divide by 4 mode.
pub const DIV_BY_4_THRESHOLD: u32 = 150_000_000;

/// Above this (and up to `DIV_BY_4_THRESHOLD`) the output Multisynth divides by 6.
pub const DIV_BY_6_THRESHOLD: u32 = 100_000_000;

/// Above this (and up to `DIV_BY_6_THRESHOLD`) the output Multisynth divides by 8.
pub const DIV_BY_8_THRESHOLD: u32 = 75_000_000;

/// Largest integer output Multisynth divider.
pub const MULTISYNTH_DIVIDER_MAX: u64 = 2048;

pub const PLL_MULTIPLIER_MIN: u32 = 15;
pub const PLL_MULTIPLIER_MAX: u32 = 90;

/// Value of the 2 bit MSx_DIVBY4 field in divide by 4 mode.
pub const DIV_BY_4_MODE: u8 = 0b11;

/// A complete divider chain for one output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StageConfig {
    /// PLL feedback Multisynth.
    pub stage1: DividerSpec,
    /// Output Multisynth. `0 + 0/1` in divide by 4 mode.
    pub stage2: DividerSpec,
    /// `0b11` in divide by 4 mode, `0b00` otherwise.
    pub div_by_4: u8,
    pub r_div: OutputDivider,
}

impl StageConfig {
    pub fn is_div_by_4(&self) -> bool {
        self.div_by_4 == DIV_BY_4_MODE
    }

    /// The output Multisynth divisor as the hardware applies it, i.e. 4 in
    /// divide by 4 mode and the integer part otherwise.
    pub fn stage2_effective_divisor(&self) -> u32 {
        if self.is_div_by_4() {
            4
        } else {
            self.stage2.integer_part
        }
    }

    /// VCO frequency, Hz, rounded down.
    /// Fvco = Fxtal * (a + b/c)
    pub fn vco_frequency(&self, xtal_freq: u32) -> u64 {
        let s1 = &self.stage1;
        let c = s1.denominator.max(1) as u128;
        let scaled = s1.integer_part as u128 * c + s1.numerator as u128;

        (xtal_freq as u128 * scaled / c) as u64
    }

    /// Output frequency, Hz, rounded down.
    /// Fout = Fxtal * (a1 + b1/c1) / ((a2 + b2/c2) * R)
    pub fn output_frequency(&self, xtal_freq: u32) -> u64 {
        let s1 = &self.stage1;
        let c1 = s1.denominator.max(1) as u128;
        let s1_scaled = s1.integer_part as u128 * c1 + s1.numerator as u128;

        let (c2, s2_scaled) = if self.is_div_by_4() {
            (1, 4)
        } else {
            let s2 = &self.stage2;
            let c2 = s2.denominator.max(1) as u128;
            (c2, s2.integer_part as u128 * c2 + s2.numerator as u128)
        };

        let num = xtal_freq as u128 * s1_scaled * c2;
        let den = c1 * s2_scaled * self.r_div.divisor() as u128;
        if den == 0 {
            return 0;
        }

        (num / den) as u64
    }
}

/// Seeks a divider chain producing `output_freq` from `xtal_freq`.
///
/// The output Multisynth and R divider are picked by output band so that the
/// VCO lands at or above 600 MHz, then the PLL feedback divider is the exact
/// ratio of the VCO to the crystal, reduced to lowest terms.
///
/// `integer_mode` asks for an integer output Multisynth. Every band below
/// already yields one, so the flag does not change the result.
pub fn seek(xtal_freq: u32, output_freq: u32, integer_mode: bool) -> Result<StageConfig, Error> {
    if !(XTAL_FREQ_MIN..=XTAL_FREQ_MAX).contains(&xtal_freq) {
        return Err(Error::InvalidCrystalFrequency);
    }
    if output_freq <= OUTPUT_FREQ_MIN || output_freq > OUTPUT_FREQ_MAX {
        return Err(Error::InvalidOutputFrequency);
    }

    debug!("xtal frequency is {} Hz", xtal_freq);
    debug!("output frequency is {} Hz", output_freq);
    debug!("integer mode: {}", integer_mode);
    let _ = integer_mode;

    let (stage2, div_by_4, r_div, divisor) = if output_freq > DIV_BY_4_THRESHOLD {
        debug!("above 150 MHz, output multisynth in divide by 4 mode");
        (
            DividerSpec {
                integer_part: 0,
                numerator: 0,
                denominator: 1,
            },
            DIV_BY_4_MODE,
            OutputDivider::Div1,
            4,
        )
    } else if output_freq > DIV_BY_6_THRESHOLD {
        debug!("above 100 MHz, output multisynth divides by 6");
        (DividerSpec::integer(6), 0, OutputDivider::Div1, 6)
    } else if output_freq > DIV_BY_8_THRESHOLD {
        debug!("above 75 MHz, output multisynth divides by 8");
        (DividerSpec::integer(8), 0, OutputDivider::Div1, 8)
    } else {
        let (divisor, r_div) = find_int_divider(output_freq)?;
        (DividerSpec::integer(divisor), 0, r_div, divisor)
    };

    let vco_freq = output_freq as u64 * divisor as u64 * r_div.divisor() as u64;
    debug!("vco frequency is {} Hz", vco_freq);
    if vco_freq < VCO_FREQ_MIN || vco_freq > VCO_FREQ_MAX {
        return Err(Error::NoSolution);
    }

    let stage1 = find_pll_divider(vco_freq, xtal_freq)?;
    debug!(
        "pll feedback {} + {}/{}",
        stage1.integer_part, stage1.numerator, stage1.denominator
    );

    Ok(StageConfig {
        stage1,
        stage2,
        div_by_4,
        r_div,
    })
}

/// Smallest integer output Multisynth divider that keeps the VCO at or above
/// its minimum, doubling the R divider until that divider fits.
fn find_int_divider(output_freq: u32) -> Result<(u32, OutputDivider), Error> {
    let mut r = 1u32;
    loop {
        let total = r as u64 * output_freq as u64;
        let divisor = (VCO_FREQ_MIN + total - 1) / total;
        debug!("r_div {}: output multisynth divider {}", r, divisor);

        if divisor <= MULTISYNTH_DIVIDER_MAX {
            return Ok((divisor as u32, OutputDivider::from_divisor(r)?));
        }
        if r >= OutputDivider::Div128.divisor() {
            return Err(Error::NoSolution);
        }
        r *= 2;
    }
}

/// PLL feedback divider `vco_freq / xtal_freq` as a reduced fraction.
fn find_pll_divider(vco_freq: u64, xtal_freq: u32) -> Result<DividerSpec, Error> {
    let xtal = xtal_freq as u64;
    let mult = vco_freq / xtal;
    if mult < PLL_MULTIPLIER_MIN as u64 || mult > PLL_MULTIPLIER_MAX as u64 {
        return Err(Error::NoSolution);
    }

    // remainder < xtal_freq, fits u32
    let remainder = (vco_freq % xtal) as u32;

    Ok(DividerSpec::reduced(mult as u32, remainder, xtal_freq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::divider::gcd;

    const XTALS: [u32; 5] = [10_000_000, 25_000_000, 26_000_000, 27_000_000, 40_000_000];

    const OUTPUTS: [u32; 14] = [
        2_500,
        10_000,
        100_000,
        455_000,
        1_250_000,
        7_074_000,
        14_175_000,
        28_000_000,
        75_000_000,
        75_000_001,
        100_000_000,
        133_333_333,
        150_000_001,
        200_000_000,
    ];

    /// Fxtal * s1 == Fout * s2 * R, cross multiplied over the denominators.
    fn exact(xtal_freq: u32, output_freq: u32, config: &StageConfig) -> bool {
        let s1 = &config.stage1;
        let s2 = &config.stage2;
        let (s2_num, s2_den) = if config.is_div_by_4() {
            (4u128, 1u128)
        } else {
            (
                s2.integer_part as u128 * s2.denominator as u128 + s2.numerator as u128,
                s2.denominator as u128,
            )
        };

        let lhs = xtal_freq as u128
            * (s1.integer_part as u128 * s1.denominator as u128 + s1.numerator as u128)
            * s2_den;
        let rhs = output_freq as u128
            * s2_num
            * config.r_div.divisor() as u128
            * s1.denominator as u128;
        lhs == rhs
    }

    #[test]
    fn reproduces_output_exactly() {
        for &xtal in XTALS.iter() {
            for &out in OUTPUTS.iter() {
                let config = seek(xtal, out, true).unwrap();
                assert!(exact(xtal, out, &config), "{} -> {}: {:?}", xtal, out, config);
                assert_eq!(config.output_frequency(xtal), out as u64);
            }
        }
    }

    #[test]
    fn stage1_fraction_is_reduced() {
        for &xtal in XTALS.iter() {
            for &out in OUTPUTS.iter() {
                let s1 = seek(xtal, out, false).unwrap().stage1;
                if s1.numerator == 0 {
                    assert_eq!(s1.denominator, 1);
                } else {
                    assert!(s1.numerator < s1.denominator);
                    assert_eq!(gcd(s1.numerator, s1.denominator), 1);
                }
            }
        }
    }

    #[test]
    fn vco_and_pll_within_limits() {
        for &xtal in XTALS.iter() {
            for &out in OUTPUTS.iter() {
                let config = seek(xtal, out, true).unwrap();
                let vco = config.vco_frequency(xtal);
                assert!(vco >= VCO_FREQ_MIN && vco <= VCO_FREQ_MAX, "{}", vco);
                assert!(config.stage1.integer_part >= PLL_MULTIPLIER_MIN);
                assert!(config.stage1.integer_part <= PLL_MULTIPLIER_MAX);
            }
        }
    }

    #[test]
    fn div_by_4_above_150mhz() {
        let config = seek(25_000_000, 150_000_001, true).unwrap();
        assert_eq!(config.div_by_4, 0b11);
        assert_eq!(
            config.stage2,
            DividerSpec {
                integer_part: 0,
                numerator: 0,
                denominator: 1,
            }
        );
        assert_eq!(config.r_div, OutputDivider::Div1);
        assert_eq!(config.stage2_effective_divisor(), 4);
        assert_eq!(config.vco_frequency(25_000_000), 600_000_004);
    }

    #[test]
    fn band_boundaries() {
        let config = seek(25_000_000, 150_000_000, true).unwrap();
        assert_eq!(config.div_by_4, 0);
        assert_eq!(config.stage2, DividerSpec::integer(6));
        assert_eq!(config.r_div, OutputDivider::Div1);

        let config = seek(25_000_000, 100_000_001, true).unwrap();
        assert_eq!(config.stage2, DividerSpec::integer(6));

        let config = seek(25_000_000, 100_000_000, true).unwrap();
        assert_eq!(config.stage2, DividerSpec::integer(8));
        assert_eq!(config.stage1, DividerSpec::integer(32));

        let config = seek(25_000_000, 75_000_001, true).unwrap();
        assert_eq!(config.stage2, DividerSpec::integer(8));

        let config = seek(25_000_000, 75_000_000, true).unwrap();
        assert_eq!(config.div_by_4, 0);
        assert_eq!(config.stage2, DividerSpec::integer(8));
        assert_eq!(config.r_div, OutputDivider::Div1);
        assert_eq!(config.stage1, DividerSpec::integer(24));
    }

    #[test]
    fn general_band_example() {
        let config = seek(25_000_000, 1_250_000, true).unwrap();
        assert_eq!(config.stage2, DividerSpec::integer(480));
        assert_eq!(config.r_div, OutputDivider::Div1);
        assert_eq!(config.stage1, DividerSpec::integer(24));

        let config = seek(25_000_000, 14_175_000, true).unwrap();
        assert_eq!(config.stage2, DividerSpec::integer(43));
        assert_eq!(
            config.stage1,
            DividerSpec {
                integer_part: 24,
                numerator: 381,
                denominator: 1000,
            }
        );
    }

    #[test]
    fn r_div_doubles_for_low_frequencies() {
        // 600 MHz / 100 kHz = 6000 > 2048, R = 4 gives 1500
        let config = seek(25_000_000, 100_000, true).unwrap();
        assert_eq!(config.r_div, OutputDivider::Div4);
        assert_eq!(config.stage2, DividerSpec::integer(1500));

        for &out in OUTPUTS.iter().filter(|&&f| f <= DIV_BY_8_THRESHOLD) {
            let config = seek(27_000_000, out, true).unwrap();
            assert!(config.stage2.is_integer());
            assert!(config.stage2.integer_part as u64 <= MULTISYNTH_DIVIDER_MAX);
            assert!(config.r_div.divisor().is_power_of_two());
            assert!(config.r_div.divisor() <= 128);
        }
    }

    #[test]
    fn integer_mode_does_not_change_result() {
        for &out in OUTPUTS.iter() {
            assert_eq!(seek(26_000_000, out, true), seek(26_000_000, out, false));
        }
    }

    #[test]
    fn lowest_reachable_frequency() {
        // 600 MHz / (128 * 2048) = 2288.8 Hz
        let config = seek(25_000_000, 2_289, true).unwrap();
        assert_eq!(config.r_div, OutputDivider::Div128);
        assert_eq!(config.stage2, DividerSpec::integer(2048));

        assert_eq!(seek(25_000_000, 2_288, true), Err(Error::NoSolution));
        assert_eq!(seek(25_000_000, 3, true), Err(Error::NoSolution));
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        assert_eq!(seek(9_999_999, 10_000_000, true), Err(Error::InvalidCrystalFrequency));
        assert_eq!(seek(40_000_001, 10_000_000, true), Err(Error::InvalidCrystalFrequency));
        assert_eq!(seek(25_000_000, 0, true), Err(Error::InvalidOutputFrequency));
        assert_eq!(seek(25_000_000, 2, true), Err(Error::InvalidOutputFrequency));
        assert_eq!(seek(25_000_000, 200_000_001, true), Err(Error::InvalidOutputFrequency));
        assert!(seek(25_000_000, 200_000_000, true).is_ok());
    }
}
