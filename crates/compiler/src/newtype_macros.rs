//! Newtype generation macros

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

macro_rules! u8_newtype {
    ($name:ident, $error:ident, $min: expr, $max:expr) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u8);

        #[allow(dead_code)]
        impl $name {
            pub const MIN: Self = Self($min);
            pub const MAX: Self = Self($max);

            pub const fn as_u8(&self) -> u8 {
                self.0
            }

            pub const fn as_usize(&self) -> usize {
                self.0 as usize
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ValueError;

            #[allow(
                unused_comparisons,
                clippy::manual_range_contains,
                clippy::absurd_extreme_comparisons
            )]
            fn try_from(value: u8) -> Result<Self, Self::Error> {
                if value >= $min && value <= $max {
                    Ok(Self(value))
                } else {
                    Err(ValueError::$error(value.into()))
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ValueError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match u8::try_from(value) {
                    Ok(v) => Self::try_from(v),
                    Err(_) => Err(ValueError::$error(value)),
                }
            }
        }
    };
}

pub(crate) use u8_newtype;
