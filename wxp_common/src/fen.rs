use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::op;

//--------------------------------------        Fen          ---------------------------------------------------------
/// An amount in fen, the smallest unit of the renminbi. All amounts on the wire (`total_fee`, `refund_fee`, ...) are
/// integers in this unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fen(i64);

op!(binary Fen, Add, add);
op!(binary Fen, Sub, sub);
op!(inplace Fen, SubAssign, sub_assign);

impl Sum for Fen {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in fen: {0}")]
pub struct FenConversionError(String);

impl From<i64> for Fen {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for Fen {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl TryFrom<u64> for Fen {
    type Error = FenConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(FenConversionError(format!("Value {value} is too large to convert to Fen")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl std::str::FromStr for Fen {
    type Err = FenConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|e| FenConversionError(format!("'{s}' is not an amount. {e}")))
    }
}

impl Display for Fen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}¥{}.{:02}", abs / 100, abs % 100)
    }
}

impl Fen {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_yuan(yuan: i64) -> Result<Self, FenConversionError> {
        yuan.checked_mul(100)
            .map(Self)
            .ok_or_else(|| FenConversionError(format!("¥{yuan} is too large to convert to Fen")))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}
