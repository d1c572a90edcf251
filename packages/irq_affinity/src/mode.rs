use std::num::NonZero;

use tracing::trace;

use crate::{BitmaskVector, CpuSet, build_full_mask};

/// How the kernel derives the default interrupt affinity mask from a list of isolated
/// processors.
///
/// The two configurations produce complementary masks for the same processor list, so it
/// matters which one a node was configured with when predicting the value of
/// `/proc/irq/default_smp_affinity`.
///
/// # Example
///
/// ```
/// use irq_affinity::{AffinityMode, parse_cpu_range};
/// use new_zealand::nz;
///
/// let cpu_count = nz!(8_u32);
/// let isolated = parse_cpu_range("1", Some(cpu_count)).unwrap();
///
/// let excluded = AffinityMode::ExcludeFromDefault
///     .apply(cpu_count, &isolated)
///     .unwrap();
/// assert_eq!(excluded.to_string(), "fd");
///
/// let included = AffinityMode::IncludeOnly.apply(cpu_count, &isolated).unwrap();
/// assert_eq!(included.to_string(), "2");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "mirroring the two interrupt affinity semantics offered by the kernel"
)]
pub enum AffinityMode {
    /// The isolated processors are removed from an otherwise fully enabled default mask.
    ExcludeFromDefault,

    /// The default mask covers only the listed processors, replacing the fully enabled mask
    /// instead of subtracting from it.
    IncludeOnly,
}

impl AffinityMode {
    /// Predicts the default interrupt affinity mask of a system with `cpu_count` processors
    /// after `isolated` has been applied with this mode.
    ///
    /// # Errors
    ///
    /// [`Error::CpuOutOfRange`][crate::Error::CpuOutOfRange] if any isolated processor is not
    /// less than `cpu_count`.
    pub fn apply(
        self,
        cpu_count: NonZero<u32>,
        isolated: &CpuSet,
    ) -> crate::Result<BitmaskVector> {
        match self {
            Self::ExcludeFromDefault => {
                check_bounds(cpu_count, isolated)?;
                exclude_isolated(&build_full_mask(cpu_count), isolated)
            }
            Self::IncludeOnly => include_only(cpu_count, isolated),
        }
    }
}

/// Turns off the bit of every isolated processor in `full_mask`.
///
/// Each bit is toggled exactly once, so a processor whose bit is already off in `full_mask` is
/// turned on. Pass a mask from [`build_full_mask()`] to model the kernel behavior.
///
/// This is the [`AffinityMode::ExcludeFromDefault`] computation for an arbitrary starting mask.
///
/// # Errors
///
/// [`Error::CpuOutOfRange`][crate::Error::CpuOutOfRange] if `full_mask` was created for a known
/// processor count and an isolated processor is not less than it.
/// [`Error::BeyondMaskCapacity`][crate::Error::BeyondMaskCapacity] if `full_mask` carries no
/// processor count (e.g. it was decoded from hexadecimal) and an isolated processor does not
/// fit in its groups.
pub fn exclude_isolated(
    full_mask: &BitmaskVector,
    isolated: &CpuSet,
) -> crate::Result<BitmaskVector> {
    let mut mask = full_mask.clone();

    for cpu in isolated {
        mask.toggle(cpu)?;
        trace!(cpu, "excluded isolated processor from default affinity");
    }

    Ok(mask)
}

/// Builds a mask for `cpu_count` processors in which only the `isolated` processors are
/// enabled.
///
/// This is the [`AffinityMode::IncludeOnly`] computation.
///
/// # Errors
///
/// [`Error::CpuOutOfRange`][crate::Error::CpuOutOfRange] if any isolated processor is not less
/// than `cpu_count`.
pub fn include_only(cpu_count: NonZero<u32>, isolated: &CpuSet) -> crate::Result<BitmaskVector> {
    check_bounds(cpu_count, isolated)?;

    let mut mask = BitmaskVector::zeroed_for(cpu_count);

    for cpu in isolated {
        mask.enable(cpu)?;
        trace!(cpu, "included processor in default affinity");
    }

    Ok(mask)
}

fn check_bounds(cpu_count: NonZero<u32>, isolated: &CpuSet) -> crate::Result<()> {
    // The set is sorted, so the maximum is the only candidate for being out of range.
    match isolated.max() {
        Some(cpu) if cpu >= cpu_count.get() => Err(crate::Error::CpuOutOfRange {
            cpu,
            cpu_count: cpu_count.get(),
        }),
        _ => Ok(()),
    }
}
