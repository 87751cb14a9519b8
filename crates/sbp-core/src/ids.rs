//! Municipality identifiers.

use std::fmt;

/// Index of a municipality in the store, assigned in input-file order.
///
/// The ordering is stable across runs, which is what makes a shared random
/// stream reproducible.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MunicipalityId(pub u32);

impl MunicipalityId {
    /// Position in the store's `Vec`.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MunicipalityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "municipality #{}", self.0)
    }
}
