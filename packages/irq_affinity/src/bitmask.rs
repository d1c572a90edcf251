use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::NonZero;
use std::ops::BitXor;

use itertools::{EitherOrBoth, Itertools};

use crate::position::{self, BITS_PER_GROUP, FULL_GROUP};
use crate::{CpuIndex, CpuSet, NibbleGroup};

/// A processor affinity mask stored as 4-bit groups, most significant group first.
///
/// Each group corresponds to one hexadecimal digit of the mask as printed by the kernel. Bit `i`
/// of the whole mask (counting from the least significant end) indicates whether processor `i`
/// is enabled.
///
/// The number of groups is fixed when the mask is created: a mask built for `n` processors has
/// [`groups(n)`][groups] groups, regardless of how many of them are zero.
///
/// A mask created for a known processor count (by [`build_full_mask()`] or
/// [`zeroed_for()`][Self::zeroed_for]) remembers that count and rejects updates to processors
/// beyond it, even when the leading group has spare bits. Masks are compared by their groups
/// alone, so a decoded mask equals a built one with the same bits.
///
/// Masks display in canonical hexadecimal form (see [`encode_hex()`][crate::encode_hex]).
#[derive(Clone, Debug)]
pub struct BitmaskVector {
    // Every value is in 0..=15.
    groups: Vec<NibbleGroup>,

    // If set, always fits within the groups.
    cpu_count: Option<NonZero<u32>>,
}

impl BitmaskVector {
    /// Creates a mask with `total_groups` groups and no processors enabled.
    #[must_use]
    pub fn zeroed(total_groups: usize) -> Self {
        Self {
            groups: vec![0; total_groups],
            cpu_count: None,
        }
    }

    /// Creates a mask with the same shape as [`build_full_mask(cpu_count)`][build_full_mask]
    /// but with no processors enabled.
    #[must_use]
    pub fn zeroed_for(cpu_count: NonZero<u32>) -> Self {
        Self::zeroed(groups(cpu_count)).with_cpu_count(Some(cpu_count))
    }

    pub(crate) fn from_groups(groups: Vec<NibbleGroup>) -> Self {
        debug_assert!(groups.iter().all(|group| *group <= FULL_GROUP));

        Self {
            groups,
            cpu_count: None,
        }
    }

    fn with_cpu_count(mut self, cpu_count: Option<NonZero<u32>>) -> Self {
        debug_assert!(cpu_count.is_none_or(|count| count.get() as usize <= self.capacity()));

        self.cpu_count = cpu_count;
        self
    }

    /// The number of processors the mask was created for, if it was created for a known
    /// processor count. Masks decoded from hexadecimal only know their capacity.
    #[cfg_attr(test, mutants::skip)] // Trivial accessor, do not waste time on mutation.
    #[must_use]
    pub fn cpu_count(&self) -> Option<NonZero<u32>> {
        self.cpu_count
    }

    /// The groups of the mask, most significant first.
    #[cfg_attr(test, mutants::skip)] // Trivial delegation, do not waste time on mutation.
    #[must_use]
    pub fn groups(&self) -> &[NibbleGroup] {
        &self.groups
    }

    /// Number of groups in the mask.
    #[cfg_attr(test, mutants::skip)] // Trivial delegation, do not waste time on mutation.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of processors the mask is wide enough to describe.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.groups.len().saturating_mul(BITS_PER_GROUP as usize)
    }

    /// Whether the bit for `cpu` is set. Processors beyond the capacity are never set.
    #[must_use]
    pub fn is_enabled(&self, cpu: CpuIndex) -> bool {
        position::locate(cpu, self.groups.len()).is_some_and(|position| {
            self.groups
                .get(position.group)
                .is_some_and(|group| (group & position.bit) != 0)
        })
    }

    /// Number of processors enabled in the mask.
    #[must_use]
    pub fn count_enabled(&self) -> u32 {
        self.groups.iter().map(|group| group.count_ones()).sum()
    }

    /// The processors enabled in the mask.
    #[must_use]
    pub fn enabled_cpus(&self) -> CpuSet {
        let total_groups = self.groups.len();

        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group_index, group)| {
                (0..BITS_PER_GROUP)
                    .filter(move |bit_offset| (group & (1_u8 << bit_offset)) != 0)
                    .filter_map(move |bit_offset| {
                        position::cpu_at(group_index, bit_offset, total_groups)
                    })
            })
            .collect()
    }

    /// Flips the bit for `cpu`.
    pub(crate) fn toggle(&mut self, cpu: CpuIndex) -> crate::Result<()> {
        let group = self.group_for(cpu)?;
        *group.0 ^= group.1;
        Ok(())
    }

    /// Sets the bit for `cpu`.
    pub(crate) fn enable(&mut self, cpu: CpuIndex) -> crate::Result<()> {
        let group = self.group_for(cpu)?;
        *group.0 |= group.1;
        Ok(())
    }

    fn group_for(&mut self, cpu: CpuIndex) -> crate::Result<(&mut NibbleGroup, NibbleGroup)> {
        if let Some(cpu_count) = self.cpu_count.filter(|count| cpu >= count.get()) {
            return Err(crate::Error::CpuOutOfRange {
                cpu,
                cpu_count: cpu_count.get(),
            });
        }

        let capacity = self.capacity();
        let total_groups = self.groups.len();

        position::locate(cpu, total_groups)
            .and_then(|position| {
                self.groups
                    .get_mut(position.group)
                    .map(|group| (group, position.bit))
            })
            .ok_or(crate::Error::BeyondMaskCapacity { cpu, capacity })
    }

    /// Renders the mask the way the kernel prints affinity files such as
    /// `/proc/irq/default_smp_affinity`: every group is printed, including leading zeros, and
    /// 32-bit words are separated by commas.
    ///
    /// # Example
    ///
    /// ```
    /// use irq_affinity::build_full_mask;
    /// use new_zealand::nz;
    ///
    /// assert_eq!(build_full_mask(nz!(28)).to_kernel_string(), "fffffff");
    /// assert_eq!(build_full_mask(nz!(40)).to_kernel_string(), "ff,ffffffff");
    /// ```
    #[must_use]
    pub fn to_kernel_string(&self) -> String {
        if self.groups.is_empty() {
            return "0".to_string();
        }

        let mut words = self
            .groups
            .rchunks(8)
            .map(|word| word.iter().map(|group| format!("{group:x}")).join(""))
            .collect_vec();
        words.reverse();

        words.join(",")
    }

    /// Checks a mask read back from a live system against this one.
    ///
    /// The observed value may use uppercase digits, comma separators and surrounding whitespace
    /// and may differ from this mask in leading zeros. An observed value with more significant
    /// digits than this mask has groups does not match.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHexDigit`][crate::Error::InvalidHexDigit] if the observed value is not a
    /// hexadecimal mask at all.
    pub fn matches_observed(&self, observed: &str) -> crate::Result<bool> {
        match crate::decode_hex(observed, self.groups.len()) {
            Ok(observed) => Ok(observed == *self),
            Err(crate::Error::HexTooLong { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Display for BitmaskVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Canonical form suppresses leading zero groups but always keeps one digit.
        let significant = self
            .groups
            .iter()
            .skip_while(|group| **group == 0)
            .collect_vec();

        if significant.is_empty() {
            return f.write_str("0");
        }

        for group in significant {
            write!(f, "{group:x}")?;
        }

        Ok(())
    }
}

impl BitXor for &BitmaskVector {
    type Output = BitmaskVector;

    /// Numeric exclusive-or of two masks. The shorter mask is treated as if padded with leading
    /// zero groups, so the result has as many groups as the longer one.
    fn bitxor(self, rhs: Self) -> Self::Output {
        let mut groups = self
            .groups
            .iter()
            .rev()
            .zip_longest(rhs.groups.iter().rev())
            .map(|pair| match pair {
                EitherOrBoth::Both(left, right) => left ^ right,
                EitherOrBoth::Left(only) | EitherOrBoth::Right(only) => *only,
            })
            .collect_vec();
        groups.reverse();

        // A processor count only survives if both sides agree on it.
        let cpu_count = self.cpu_count.filter(|_| self.cpu_count == rhs.cpu_count);

        BitmaskVector::from_groups(groups).with_cpu_count(cpu_count)
    }
}

impl PartialEq for BitmaskVector {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl Eq for BitmaskVector {}

impl Hash for BitmaskVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.groups.hash(state);
    }
}

/// Number of 4-bit groups needed to describe `cpu_count` processors: `ceil(cpu_count / 4)`.
#[must_use]
pub fn groups(cpu_count: NonZero<u32>) -> usize {
    position::groups_for(cpu_count)
}

/// Builds the mask with every one of `cpu_count` processors enabled.
///
/// When `cpu_count` is not a multiple of 4, the most significant group only has its low
/// `cpu_count mod 4` bits set, matching how the kernel reports a fully enabled affinity mask.
///
/// # Example
///
/// ```
/// use irq_affinity::build_full_mask;
/// use new_zealand::nz;
///
/// assert_eq!(build_full_mask(nz!(28)).to_string(), "fffffff");
/// assert_eq!(build_full_mask(nz!(6)).to_string(), "3f");
/// ```
#[must_use]
pub fn build_full_mask(cpu_count: NonZero<u32>) -> BitmaskVector {
    let mut groups = vec![FULL_GROUP; position::groups_for(cpu_count)];

    if let Some(leading) = groups.first_mut() {
        *leading = position::leading_group(cpu_count);
    }

    BitmaskVector::from_groups(groups).with_cpu_count(Some(cpu_count))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(BitmaskVector: Send, Sync, Clone);

    #[test]
    fn full_mask_shapes() {
        assert_eq!(build_full_mask(nz!(1)).groups(), &[0b0001]);
        assert_eq!(build_full_mask(nz!(4)).groups(), &[0b1111]);
        assert_eq!(build_full_mask(nz!(7)).groups(), &[0b0111, 0b1111]);
        assert_eq!(build_full_mask(nz!(28)).groups(), &[15; 7]);
        assert_eq!(build_full_mask(nz!(30)).groups(), &[3, 15, 15, 15, 15, 15, 15, 15]);
    }

    #[test]
    fn full_mask_enables_exactly_cpu_count_processors() {
        for cpu_count in 1..=130 {
            let cpu_count = NonZero::new(cpu_count).unwrap();
            let mask = build_full_mask(cpu_count);

            assert_eq!(mask.group_count(), groups(cpu_count));
            assert_eq!(mask.count_enabled(), cpu_count.get());
            assert_eq!(
                mask.enabled_cpus(),
                (0..cpu_count.get()).collect::<CpuSet>()
            );
        }
    }

    #[test]
    fn zeroed_for_matches_full_shape() {
        let zeroed = BitmaskVector::zeroed_for(nz!(9));

        assert_eq!(zeroed.groups(), &[0, 0, 0]);
        assert_eq!(zeroed.count_enabled(), 0);
        assert!(zeroed.enabled_cpus().is_empty());
    }

    #[test]
    fn toggle_flips_one_bit() {
        let mut mask = build_full_mask(nz!(8));

        mask.toggle(1).unwrap();
        assert_eq!(mask.groups(), &[0b1111, 0b1101]);
        assert!(!mask.is_enabled(1));

        mask.toggle(1).unwrap();
        assert_eq!(mask.groups(), &[0b1111, 0b1111]);
        assert!(mask.is_enabled(1));
    }

    #[test]
    fn enable_is_idempotent() {
        let mut mask = BitmaskVector::zeroed(2);

        mask.enable(6).unwrap();
        mask.enable(6).unwrap();

        assert_eq!(mask.groups(), &[0b0100, 0]);
        assert_eq!(mask.enabled_cpus().as_slice(), &[6]);
    }

    #[test]
    fn updates_beyond_capacity_are_errors() {
        let mut mask = BitmaskVector::zeroed(2);

        let error = mask.enable(8).unwrap_err();
        assert!(matches!(
            error,
            crate::Error::BeyondMaskCapacity {
                cpu: 8,
                capacity: 8
            }
        ));

        mask.toggle(CpuIndex::MAX).unwrap_err();
        assert!(!mask.is_enabled(8));
    }

    #[test]
    fn updates_beyond_cpu_count_are_errors_even_with_spare_bits() {
        // 6 processors leave bits 6 and 7 of the leading group unused.
        let mut mask = build_full_mask(nz!(6));
        assert_eq!(mask.cpu_count(), Some(nz!(6)));

        let error = mask.toggle(7).unwrap_err();
        assert!(matches!(
            error,
            crate::Error::CpuOutOfRange {
                cpu: 7,
                cpu_count: 6
            }
        ));

        let mut zeroed = BitmaskVector::zeroed_for(nz!(6));
        zeroed.enable(6).unwrap_err();
        zeroed.enable(5).unwrap();

        assert_eq!(mask.count_enabled(), 6);
        assert_eq!(zeroed.enabled_cpus().as_slice(), &[5]);
    }

    #[test]
    fn equality_ignores_cpu_count() {
        let built = build_full_mask(nz!(8));
        let unbounded = BitmaskVector::from_groups(vec![15, 15]);

        assert_eq!(built.cpu_count(), Some(nz!(8)));
        assert_eq!(unbounded.cpu_count(), None);
        assert_eq!(built, unbounded);
    }

    #[test]
    fn xor_keeps_cpu_count_only_when_both_sides_agree() {
        let full = build_full_mask(nz!(6));

        assert_eq!((&full ^ &BitmaskVector::zeroed_for(nz!(6))).cpu_count(), Some(nz!(6)));
        assert_eq!((&full ^ &BitmaskVector::zeroed_for(nz!(7))).cpu_count(), None);
        assert_eq!((&full ^ &BitmaskVector::zeroed(2)).cpu_count(), None);
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(BitmaskVector::zeroed(3).to_string(), "0");
        assert_eq!(BitmaskVector::zeroed(0).to_string(), "0");
        assert_eq!(BitmaskVector::from_groups(vec![0, 0, 4, 2]).to_string(), "42");
        assert_eq!(BitmaskVector::from_groups(vec![10, 0, 11]).to_string(), "a0b");
    }

    #[test]
    fn kernel_string_keeps_leading_zeros_and_word_separators() {
        assert_eq!(BitmaskVector::zeroed(3).to_kernel_string(), "000");
        assert_eq!(BitmaskVector::zeroed(0).to_kernel_string(), "0");
        assert_eq!(build_full_mask(nz!(32)).to_kernel_string(), "ffffffff");
        assert_eq!(
            build_full_mask(nz!(72)).to_kernel_string(),
            "ff,ffffffff,ffffffff"
        );

        let mut mask = BitmaskVector::zeroed_for(nz!(40));
        mask.enable(0).unwrap();
        assert_eq!(mask.to_kernel_string(), "00,00000001");
    }

    #[test]
    fn xor_pads_the_shorter_operand() {
        let long = BitmaskVector::from_groups(vec![1, 15, 0]);
        let short = BitmaskVector::from_groups(vec![15, 15]);

        assert_eq!((&long ^ &short).groups(), &[1, 0, 15]);
        assert_eq!((&short ^ &long).groups(), &[1, 0, 15]);
        assert_eq!((&long ^ &long).to_string(), "0");
    }

    #[test]
    fn matches_observed_ignores_formatting() {
        let mask = build_full_mask(nz!(28));

        assert!(mask.matches_observed("fffffff").unwrap());
        assert!(mask.matches_observed("0fffffff\n").unwrap());
        assert!(mask.matches_observed("FFFFFFF").unwrap());
        assert!(!mask.matches_observed("ffffff7").unwrap());

        // Wider than the mask, so it cannot be equal.
        assert!(!mask.matches_observed("1,0fffffff").unwrap());

        mask.matches_observed("not hex").unwrap_err();
    }
}
