//! Mapping between processor indexes and bit positions inside a [`BitmaskVector`].
//!
//! Masks store their groups most-significant first (the order they are printed in) while
//! processor indexes count up from the least significant bit. Every conversion between the two
//! goes through this module.
//!
//! [`BitmaskVector`]: crate::BitmaskVector

use std::num::NonZero;

use crate::{CpuIndex, NibbleGroup};

/// Number of processors described by one group (one hex digit).
pub(crate) const BITS_PER_GROUP: u32 = 4;

/// Value of a group in which every processor is enabled.
pub(crate) const FULL_GROUP: NibbleGroup = 0b1111;

/// Where the bit for one processor lives inside a mask.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct BitPosition {
    /// Index into the most-significant-first group storage.
    pub(crate) group: usize,

    /// Single-bit value to apply to that group.
    pub(crate) bit: NibbleGroup,
}

/// Number of groups needed to describe `cpu_count` processors, rounding up.
#[must_use]
pub(crate) fn groups_for(cpu_count: NonZero<u32>) -> usize {
    cpu_count.get().div_ceil(BITS_PER_GROUP) as usize
}

/// Value of the most significant group of a fully enabled mask.
///
/// This is `2^(cpu_count mod 4) - 1` when the processor count does not fill the group, or a
/// full group otherwise.
#[must_use]
pub(crate) fn leading_group(cpu_count: NonZero<u32>) -> NibbleGroup {
    match cpu_count.get() & (BITS_PER_GROUP - 1) {
        0 => FULL_GROUP,
        meaningful_bits => (1_u8 << meaningful_bits).wrapping_sub(1),
    }
}

/// Locates the bit for `cpu` in a mask with `total_groups` groups.
///
/// Returns `None` if the mask is too narrow to describe the processor.
#[must_use]
pub(crate) fn locate(cpu: CpuIndex, total_groups: usize) -> Option<BitPosition> {
    let group_from_lsb = usize::try_from(cpu >> 2).ok()?;
    let group = total_groups.checked_sub(1)?.checked_sub(group_from_lsb)?;

    Some(BitPosition {
        group,
        bit: 1_u8 << (cpu & (BITS_PER_GROUP - 1)),
    })
}

/// The inverse of [`locate()`]: which processor does `bit_offset` of `group` describe?
#[must_use]
pub(crate) fn cpu_at(group: usize, bit_offset: u32, total_groups: usize) -> Option<CpuIndex> {
    let group_from_lsb = total_groups.checked_sub(1)?.checked_sub(group)?;
    let group_from_lsb = CpuIndex::try_from(group_from_lsb).ok()?;

    group_from_lsb
        .checked_mul(BITS_PER_GROUP)?
        .checked_add(bit_offset)
}
