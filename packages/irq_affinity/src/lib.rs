#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Predicts and verifies the Linux default interrupt affinity mask (as exposed at
//! `/proc/irq/default_smp_affinity`) when a subset of processors is isolated from default
//! interrupt handling.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! The crate is a pure calculator: it never reads or writes kernel state. The caller supplies the
//! processor count and the isolated processor list of a system and compares the predicted mask
//! against the value it reads back from that system.
//!
//! # Building blocks
//!
//! * [`parse_cpu_range()`] and [`CpuRangeParser`] turn a processor list such as `0,1,3-4,11-16`
//!   into a [`CpuSet`].
//! * [`build_full_mask()`] creates the mask with every processor enabled, as a [`BitmaskVector`]
//!   of 4-bit groups.
//! * [`AffinityMode`] selects between the two kernel semantics for isolating processors from
//!   default interrupt handling and computes the resulting mask.
//! * [`encode_hex()`], [`decode_hex()`] and [`compare_canonical_hex()`] convert masks to and from
//!   hexadecimal and compare them modulo leading zeros.
//!
//! # Example
//!
//! ```
//! use irq_affinity::{AffinityMode, build_full_mask, parse_cpu_range};
//! use new_zealand::nz;
//!
//! let cpu_count = nz!(28_u32);
//! let isolated = parse_cpu_range("0,1,3-4,11-16,23-27", Some(cpu_count)).unwrap();
//!
//! assert_eq!(build_full_mask(cpu_count).to_string(), "fffffff");
//!
//! let predicted = AffinityMode::ExcludeFromDefault
//!     .apply(cpu_count, &isolated)
//!     .unwrap();
//! assert_eq!(predicted.to_string(), "7e07e4");
//!
//! // Value as read from /proc/irq/default_smp_affinity on the node.
//! let observed = "07e07e4\n";
//! assert!(predicted.matches_observed(observed).unwrap());
//! ```
//!
//! # Processor lists
//!
//! The processor list format is the comma-separated `cpulist` format used by Linux utilities and
//! kernel parameters. Each item is either:
//!
//! * a single integer (e.g. `1`)
//! * a range of integers (e.g. `2-4`)
//! * a range of integers with a stride (step size) operator (e.g. `5-9:2` which is equivalent to `5,7,9`)
//!
//! [`CpuSet`] displays in the same format, so a set can be printed back as a compact list:
//!
//! ```
//! let isolated = irq_affinity::parse_cpu_range("3,0-1,4", None).unwrap();
//!
//! println!("Isolated processors: {isolated}");
//! assert_eq!(isolated.to_string(), "0-1,3-4");
//! ```

mod bitmask;
mod cpu_set;
mod emit;
mod error;
mod hex;
mod mode;
mod parse;
mod position;

pub use bitmask::*;
pub use cpu_set::*;
pub use emit::*;
pub use error::*;
pub use hex::*;
pub use mode::*;
pub use parse::*;

/// Identifies a logical processor.
///
/// This matches the numeric identifier used by the kernel and by standard operating system
/// tooling. Valid indexes for a system with `n` processors are `0..n`.
pub type CpuIndex = u32;

/// One 4-bit group of an affinity mask, in `0..=15`. Printed as one hexadecimal digit.
pub type NibbleGroup = u8;
