/*
   Copyright 2018 Ilya Epifanov

   Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
   http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
   http://opensource.org/licenses/MIT>, at your option. This file may not be
   copied, modified, or distributed except according to those terms.
*/
/*!
Divider configuration for the [Si5351] clock generator.

## The Device

The Silicon Labs [Si5351] is an any-frequency CMOS clock generator. An output
is produced by a chain of three dividers:

* the PLL feedback Multisynth, which multiplies the crystal up to the VCO
  (600 - 900 MHz),
* the output Multisynth, which divides the VCO down,
* the R output divider, a power of two in 1..=128.

```text
Fout = Fxtal * (a1 + b1/c1) / ((a2 + b2/c2) * R)
```

This crate does not talk to the chip. It finds the divider values and packs
them into the 8 byte parameter blocks of [AN619], ready to be written by
whatever transport the caller has.

## Usage

Find the dividers for an output frequency:

```
use si5351_config_seek::seek;

let config = seek(25_000_000, 14_175_000, true)?;
assert_eq!(config.output_frequency(25_000_000), 14_175_000);
# Ok::<(), si5351_config_seek::Error>(())
```

Then pack both stages into register images:

```
# use si5351_config_seek::seek;
# let config = seek(25_000_000, 14_175_000, true)?;
let (pll_block, ms_block) = config.registers()?;
# Ok::<(), si5351_config_seek::Error>(())
```

Single blocks can also be packed directly:

```
use si5351_config_seek::pack;

let block = pack(36, 0, 1, 0, 1)?;
assert_eq!(block, [0x00, 0x01, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00]);
# Ok::<(), si5351_config_seek::Error>(())
```

[Si5351]: https://www.silabs.com/documents/public/data-sheets/Si5351-B.pdf
[AN619]: https://www.silabs.com/documents/public/application-notes/AN619.pdf
*/
#![no_std]

#[macro_use]
extern crate bitflags;

use core::fmt;

/// Forwards to `log::debug!` when the `log` feature is enabled.
macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
    };
}

pub mod divider;
pub mod pack;
pub mod seek;

pub use crate::divider::{DividerSpec, OutputDivider};
pub use crate::pack::{pack, pack_divider, MultisynthParamBits};
pub use crate::seek::{seek, StageConfig};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Crystal frequency outside 10 MHz..=40 MHz.
    InvalidCrystalFrequency,
    /// Output frequency outside (2 Hz, 200 MHz].
    InvalidOutputFrequency,
    /// No divider chain keeps the VCO and the dividers within chip limits.
    NoSolution,
    /// Integer part wider than 18 bits.
    IntegerOverflow,
    /// Numerator wider than 20 bits.
    NumeratorOverflow,
    /// Denominator wider than 20 bits.
    DenominatorOverflow,
    /// Divide by 4 field other than 0b00 or 0b11.
    InvalidDivBy4,
    /// R divider that is not a power of two in 1..=128.
    InvalidOutputDivider,
}

impl Error {
    /// True for errors caused by packing parameters that break the register
    /// field contract, as opposed to a seek that found no configuration.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Error::InvalidCrystalFrequency | Error::InvalidOutputFrequency | Error::NoSolution => {
                false
            }
            Error::IntegerOverflow
            | Error::NumeratorOverflow
            | Error::DenominatorOverflow
            | Error::InvalidDivBy4
            | Error::InvalidOutputDivider => true,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidCrystalFrequency => write!(f, "Invalid Crystal Frequency"),
            Error::InvalidOutputFrequency => write!(f, "Invalid Output Frequency"),
            Error::NoSolution => write!(f, "No Divider Configuration"),
            Error::IntegerOverflow => write!(f, "Integer Part Overflow"),
            Error::NumeratorOverflow => write!(f, "Numerator Overflow"),
            Error::DenominatorOverflow => write!(f, "Denominator Overflow"),
            Error::InvalidDivBy4 => write!(f, "Invalid Divide By 4 Mode"),
            Error::InvalidOutputDivider => write!(f, "Invalid Output Divider"),
        }
    }
}
