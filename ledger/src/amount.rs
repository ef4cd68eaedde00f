use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::{fmt, iter::Sum};

/// Accumulator type for sums of amounts. Wide enough that adding any number of
/// `u64` amounts a machine can hold in memory never wraps.
pub type AmountSum = u128;

/// A value in satoshis, the smallest indivisible unit
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u64::MAX);

    pub const fn from_sat(sat: u64) -> Self {
        Self(sat)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

impl From<u64> for Amount {
    fn from(sat: u64) -> Self {
        Self(sat)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for AmountSum {
    fn from(amount: Amount) -> Self {
        amount.0 as AmountSum
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum<Amount> for AmountSum {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.map(AmountSum::from).sum()
    }
}

impl<'a> Sum<&'a Amount> for AmountSum {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
