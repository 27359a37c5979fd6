use core::fmt;
use core::num::NonZeroU32;

use crate::{RfError, RfResult};

/// 1-based index of a parameter sample in a sweep.
///
/// - `u32` keeps log rows small
/// - `NonZero` matches the 1-based convention and makes `Option<SampleId>` free
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct SampleId(NonZeroU32);

impl SampleId {
    /// Create from a 0-based row index of the parameter matrix.
    pub fn from_row(row: usize) -> Self {
        let ordinal = u32::try_from(row).unwrap_or(u32::MAX - 1) + 1;
        Self(NonZeroU32::new(ordinal).unwrap_or(NonZeroU32::MIN))
    }

    /// Create from a 1-based ordinal.
    pub fn from_ordinal(ordinal: usize) -> RfResult<Self> {
        u32::try_from(ordinal)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(RfError::ZeroOrdinal { ordinal })
    }

    /// The 1-based ordinal written to column 0 of exported tables.
    pub fn ordinal(self) -> u32 {
        self.0.get()
    }

    /// The 0-based parameter matrix row.
    pub fn row(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SampleId({})", self.ordinal())
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

impl TryFrom<u32> for SampleId {
    type Error = RfError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_ordinal(value as usize)
    }
}

impl From<SampleId> for u32 {
    fn from(id: SampleId) -> Self {
        id.ordinal()
    }
}
