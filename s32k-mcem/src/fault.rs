//! Fault identities and fault containers.

use bitfield::bitfield;

/// ECC faults the error reporting module distinguishes on this part.
///
/// The discriminant is the fault's bit position in a [`FaultSet`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultId {
    /// Corrected single-bit error in the lower SRAM bank.
    SramLCorrectable = 0,
    /// Non-correctable error in the lower SRAM bank.
    SramLNoncorrectable = 1,
    /// Corrected single-bit error in the upper SRAM bank.
    SramUCorrectable = 2,
    /// Non-correctable error in the upper SRAM bank.
    SramUNoncorrectable = 3,
}

/// Number of distinct fault identities.
pub const FAULT_COUNT: u8 = 4;

impl FaultId {
    /// Memory channel the fault is reported on.
    pub fn channel(self) -> usize {
        match self {
            FaultId::SramLCorrectable | FaultId::SramLNoncorrectable => 0,
            FaultId::SramUCorrectable | FaultId::SramUNoncorrectable => 1,
        }
    }

    /// Whether the ECC logic corrected the access that raised the fault.
    pub fn is_correctable(self) -> bool {
        matches!(
            self,
            FaultId::SramLCorrectable | FaultId::SramUCorrectable
        )
    }
}

impl From<FaultId> for u32 {
    fn from(x: FaultId) -> Self {
        1 << x as u32
    }
}

/// A fault number outside the defined range.
#[derive(Debug)]
pub struct InvalidFaultId;

impl TryFrom<u8> for FaultId {
    type Error = InvalidFaultId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use FaultId::*;
        let ret = match value {
            0 => SramLCorrectable,
            1 => SramLNoncorrectable,
            2 => SramUCorrectable,
            3 => SramUNoncorrectable,
            FAULT_COUNT.. => Err(InvalidFaultId)?,
        };
        Ok(ret)
    }
}

bitfield! {
    /// A set of ECC faults.
    ///
    /// This is the fault container handed between the driver and its
    /// callers: `errors` produces one, `clear_faults` consumes one.
    #[derive(Copy, Clone, Eq, PartialEq)]
    pub struct FaultSet(u32);

    /// Corrected single-bit error, lower SRAM
    pub sram_l_correctable, set_sram_l_correctable: 0;
    /// Non-correctable error, lower SRAM
    pub sram_l_noncorrectable, set_sram_l_noncorrectable: 1;
    /// Corrected single-bit error, upper SRAM
    pub sram_u_correctable, set_sram_u_correctable: 2;
    /// Non-correctable error, upper SRAM
    pub sram_u_noncorrectable, set_sram_u_noncorrectable: 3;
}

const DEFINED: u32 = (1 << FAULT_COUNT) - 1;

impl FaultSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// `true` when no defined fault is in the set.
    pub fn is_empty(&self) -> bool {
        self.0 & DEFINED == 0
    }

    /// Whether `fault` is in the set.
    pub fn contains(&self, fault: FaultId) -> bool {
        self.0 & u32::from(fault) != 0
    }

    /// Add `fault` to the set.
    pub fn insert(&mut self, fault: FaultId) {
        self.0 |= u32::from(fault);
    }

    /// Remove `fault` from the set.
    pub fn remove(&mut self, fault: FaultId) {
        self.0 &= !u32::from(fault);
    }

    /// An iterator visiting all elements in arbitrary order.
    pub fn iter(&self) -> Iter {
        Iter {
            faults: *self,
            index: 0,
        }
    }
}

impl FromIterator<FaultId> for FaultSet {
    fn from_iter<T: IntoIterator<Item = FaultId>>(iter: T) -> Self {
        let mut set = 0_u32;
        for fault in iter.into_iter() {
            set |= u32::from(fault);
        }
        FaultSet(set)
    }
}

impl core::fmt::Debug for FaultSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FaultSet {{ ")?;
        if self.sram_l_correctable() {
            write!(f, "SRAML_SBC ")?;
        }
        if self.sram_l_noncorrectable() {
            write!(f, "SRAML_NCE ")?;
        }
        if self.sram_u_correctable() {
            write!(f, "SRAMU_SBC ")?;
        }
        if self.sram_u_noncorrectable() {
            write!(f, "SRAMU_NCE ")?;
        }
        write!(f, "}}")
    }
}

/// An iterator over the items of a [`FaultSet`].
///
/// This `struct` is created by [`FaultSet::iter`].
pub struct Iter {
    faults: FaultSet,
    index: u8,
}

impl Iterator for Iter {
    type Item = FaultId;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.index;
        self.index = self.index.saturating_add(1);
        // There are no gaps in the fault numbering, so this is `Some` until
        // every fault has been checked.
        let fault = i.try_into().ok()?;
        if self.faults.0 & (1 << i) != 0 {
            Some(fault)
        } else {
            self.next()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn iter_preserves_length() {
        assert_eq!(FaultSet(0).iter().count(), 0);
        assert_eq!(FaultSet(0b0001).iter().count(), 1);
        assert_eq!(FaultSet(0b0101).iter().count(), 2);
        assert_eq!(FaultSet(0b1111).iter().count(), 4);
        assert_eq!(FaultSet(0xffff_ffff).iter().count(), 4);
    }

    fn iter_collect(faults: u32) -> u32 {
        FaultSet::from_iter(FaultSet(faults).iter()).0
    }

    #[test]
    fn iter_collect_preserves_faults() {
        assert_eq!(iter_collect(0), 0);
        assert_eq!(iter_collect(0b0001), 0b0001);
        assert_eq!(iter_collect(0b1010), 0b1010);
    }

    #[test]
    fn iter_collect_drops_reserved_bits() {
        assert_eq!(iter_collect(0xffff_ffff), 0b1111);
    }

    #[test]
    fn channel_and_kind_mapping() {
        assert_eq!(FaultId::SramLCorrectable.channel(), 0);
        assert_eq!(FaultId::SramUNoncorrectable.channel(), 1);
        assert!(FaultId::SramUCorrectable.is_correctable());
        assert!(!FaultId::SramLNoncorrectable.is_correctable());
    }
}
