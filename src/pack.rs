/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Multisynth parameter block packing.
//!
//! Every Multisynth, feedback or output, is configured through 8 consecutive
//! registers:
//!
//! | byte | content                                           |
//! |------|---------------------------------------------------|
//! | 0    | denominator[15:8]                                 |
//! | 1    | denominator[7:0]                                  |
//! | 2    | R_DIV[2:0] @ 6:4, DIVBY4[1:0] @ 3:2, integer[17:16] |
//! | 3    | integer[15:8]                                     |
//! | 4    | integer[7:0]                                      |
//! | 5    | denominator[19:16] @ 7:4, numerator[19:16] @ 3:0  |
//! | 6    | numerator[15:8]                                   |
//! | 7    | numerator[7:0]                                    |

use crate::divider::{DividerSpec, OutputDivider};
use crate::seek::{StageConfig, DIV_BY_4_MODE};
use crate::Error;

/// Largest integer part, 18 bits.
pub const INTEGER_MAX: u32 = 0x3ffff;

/// Largest numerator, 20 bits.
pub const NUMERATOR_MAX: u32 = 0xfffff;

/// Largest denominator, 20 bits.
pub const DENOMINATOR_MAX: u32 = 0xfffff;

bitflags! {
    /// Byte 2 of a Multisynth parameter block.
    pub struct MultisynthParamBits: u8 {
        const R_DIV_MASK = 0b0111_0000;
        const DIVBY4 = 0b0000_1100;
        const INTEGER_HI_MASK = 0b0000_0011;
    }
}

const R_DIV_SHIFT: u8 = 4;
const DIVBY4_SHIFT: u8 = 2;

/// Packs a Multisynth parameter block.
///
/// `div_by_4` is `0b00` or `0b11`, `r_div` a power of two in 1..=128. The
/// PLL feedback Multisynth always takes `div_by_4 = 0` and `r_div = 1`.
pub fn pack(
    integer: u32,
    numerator: u32,
    denominator: u32,
    div_by_4: u32,
    r_div: u32,
) -> Result<[u8; 8], Error> {
    if integer > INTEGER_MAX {
        return Err(Error::IntegerOverflow);
    }
    if numerator > NUMERATOR_MAX {
        return Err(Error::NumeratorOverflow);
    }
    if denominator > DENOMINATOR_MAX {
        return Err(Error::DenominatorOverflow);
    }
    if div_by_4 != 0 && div_by_4 != DIV_BY_4_MODE as u32 {
        return Err(Error::InvalidDivBy4);
    }
    let r_div = OutputDivider::from_divisor(r_div)?;

    let mode = ((r_div.bits() << R_DIV_SHIFT) & MultisynthParamBits::R_DIV_MASK.bits())
        | (((div_by_4 as u8) << DIVBY4_SHIFT) & MultisynthParamBits::DIVBY4.bits())
        | (((integer & 0x0003_0000) >> 16) as u8 & MultisynthParamBits::INTEGER_HI_MASK.bits());

    Ok([
        ((denominator & 0x0000_FF00) >> 8) as u8,
        denominator as u8,
        mode,
        ((integer & 0x0000_FF00) >> 8) as u8,
        integer as u8,
        (((denominator & 0x000F_0000) >> 12) | ((numerator & 0x000F_0000) >> 16)) as u8,
        ((numerator & 0x0000_FF00) >> 8) as u8,
        numerator as u8,
    ])
}

/// [`pack`] for a [`DividerSpec`].
pub fn pack_divider(
    divider: &DividerSpec,
    div_by_4: u8,
    r_div: OutputDivider,
) -> Result<[u8; 8], Error> {
    pack(
        divider.integer_part,
        divider.numerator,
        divider.denominator,
        div_by_4 as u32,
        r_div.divisor(),
    )
}

impl StageConfig {
    /// Parameter blocks for the PLL feedback Multisynth and the output
    /// Multisynth, in that order.
    ///
    /// Fails with [`Error::DenominatorOverflow`] when the exact PLL fraction
    /// needs a denominator wider than 20 bits.
    pub fn registers(&self) -> Result<([u8; 8], [u8; 8]), Error> {
        let pll = pack_divider(&self.stage1, 0, OutputDivider::Div1)?;
        let ms = pack_divider(&self.stage2, self.div_by_4, self.r_div)?;
        Ok((pll, ms))
    }
}
