/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
//! Divider values: the fractional Multisynth `a + b/c` and the R output divider.

use crate::Error;

/// A fractional divider value `integer_part + numerator / denominator`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DividerSpec {
    pub integer_part: u32,
    pub numerator: u32,
    pub denominator: u32,
}

impl DividerSpec {
    /// Integer divider, `a + 0/1`.
    pub fn integer(integer_part: u32) -> Self {
        DividerSpec {
            integer_part,
            numerator: 0,
            denominator: 1,
        }
    }

    /// `a + b/c` with the fraction reduced to lowest terms.
    ///
    /// A zero numerator always reduces to `0/1`.
    pub fn reduced(integer_part: u32, numerator: u32, denominator: u32) -> Self {
        if numerator == 0 {
            return DividerSpec::integer(integer_part);
        }

        let divisor = gcd(numerator, denominator);
        DividerSpec {
            integer_part,
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.numerator == 0
    }
}

/// Euclid. `gcd(x, 0) == x`.
pub(crate) fn gcd(mut x: u32, mut y: u32) -> u32 {
    while y != 0 {
        let r = x % y;
        x = y;
        y = r;
    }
    x
}

/// R output divider. The discriminant is the register field value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputDivider {
    Div1 = 0,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
}

const OUTPUT_DIVIDERS: [OutputDivider; 8] = [
    OutputDivider::Div1,
    OutputDivider::Div2,
    OutputDivider::Div4,
    OutputDivider::Div8,
    OutputDivider::Div16,
    OutputDivider::Div32,
    OutputDivider::Div64,
    OutputDivider::Div128,
];

impl OutputDivider {
    /// log2 of the divisor, as stored in the R_DIV field.
    pub fn bits(&self) -> u8 {
        *self as u8
    }

    pub fn divisor(&self) -> u32 {
        match *self {
            OutputDivider::Div1 => 1,
            OutputDivider::Div2 => 2,
            OutputDivider::Div4 => 4,
            OutputDivider::Div8 => 8,
            OutputDivider::Div16 => 16,
            OutputDivider::Div32 => 32,
            OutputDivider::Div64 => 64,
            OutputDivider::Div128 => 128,
        }
    }

    /// Maps a divisor of 1, 2, 4, ... 128 to its divider.
    pub fn from_divisor(divisor: u32) -> Result<OutputDivider, Error> {
        let mut candidate = 1u32;
        for &div in OUTPUT_DIVIDERS.iter() {
            if candidate == divisor {
                return Ok(div);
            }
            candidate *= 2;
        }

        Err(Error::InvalidOutputDivider)
    }
}
