use itertools::Itertools;

use crate::CpuIndex;

/// Emits a processor list string (e.g. `0-1,3-4,11-16`) for the provided processor indexes.
///
/// The input may be in any order and may contain duplicates. The output is always in ascending
/// order, with runs of two or more consecutive indexes collapsed into a range. An empty input
/// produces an empty string.
///
/// # Example
///
/// ```
/// assert_eq!(irq_affinity::emit([4, 0, 1, 3, 3]), "0-1,3-4");
/// ```
#[must_use]
pub fn emit<I>(cpus: I) -> String
where
    I: IntoIterator<Item = CpuIndex>,
{
    cpus.into_iter()
        .sorted_unstable()
        .dedup()
        .map(|cpu| (cpu, cpu))
        .coalesce(|previous, next| {
            if previous.1.checked_add(1) == Some(next.0) {
                Ok((previous.0, next.1))
            } else {
                Err((previous, next))
            }
        })
        .map(|(first, last)| {
            if first == last {
                first.to_string()
            } else {
                format!("{first}-{last}")
            }
        })
        .join(",")
}
