use std::fmt::{self, Display};
use std::iter::Copied;
use std::slice;

use itertools::Itertools;

use crate::{CpuIndex, emit};

/// A set of unique processor indexes.
///
/// Iteration order is ascending. The set displays as a compact processor list
/// (e.g. `0-1,3-4,11-16`), the same format [`parse_cpu_range()`][crate::parse_cpu_range] accepts.
///
/// # Example
///
/// ```
/// use irq_affinity::CpuSet;
///
/// let isolated: CpuSet = [5, 1, 2, 1].into_iter().collect();
///
/// assert_eq!(isolated.len(), 3);
/// assert!(isolated.contains(2));
/// assert_eq!(isolated.to_string(), "1-2,5");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct CpuSet {
    // Sorted ascending, no duplicates.
    cpus: Vec<CpuIndex>,
}

impl CpuSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of processors in the set.
    #[cfg_attr(test, mutants::skip)] // Trivial delegation, do not waste time on mutation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cpus.len()
    }

    /// Whether the set contains no processors.
    #[cfg_attr(test, mutants::skip)] // Trivial delegation, do not waste time on mutation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cpus.is_empty()
    }

    /// Whether `cpu` is a member of the set.
    #[must_use]
    pub fn contains(&self, cpu: CpuIndex) -> bool {
        self.cpus.binary_search(&cpu).is_ok()
    }

    /// The highest processor index in the set, if any.
    #[must_use]
    pub fn max(&self) -> Option<CpuIndex> {
        self.cpus.last().copied()
    }

    /// Iterates over the processors in ascending order.
    pub fn iter(&self) -> Copied<slice::Iter<'_, CpuIndex>> {
        self.cpus.iter().copied()
    }

    /// The processors in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[CpuIndex] {
        &self.cpus
    }
}

impl FromIterator<CpuIndex> for CpuSet {
    fn from_iter<T: IntoIterator<Item = CpuIndex>>(iter: T) -> Self {
        Self {
            cpus: iter.into_iter().sorted_unstable().dedup().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CpuSet {
    type Item = CpuIndex;
    type IntoIter = Copied<slice::Iter<'a, CpuIndex>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<CpuSet> for Vec<CpuIndex> {
    fn from(value: CpuSet) -> Self {
        value.cpus
    }
}

impl Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit(self.iter()))
    }
}
