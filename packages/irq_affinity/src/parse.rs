use std::num::NonZero;

use tracing::trace;

use crate::{CpuIndex, CpuSet};

/// How the parser treats malformed range tokens such as `-3`, `5-` or `7-3`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "there is one correct behavior and one legacy behavior, nothing more"
)]
pub enum ParseMode {
    /// Malformed tokens are errors. Inverted ranges are [`Error::InvertedRange`].
    ///
    /// [`Error::InvertedRange`]: crate::Error::InvertedRange
    #[default]
    Strict,

    /// Tokens that start with a hyphen or have an empty range side are silently skipped and
    /// inverted ranges contribute no processors. Tokens that are not numbers at all are still
    /// errors.
    ///
    /// Only use this to reproduce the behavior of older tooling that accepted such input.
    LegacyPermissive,
}

/// Parses processor range specifications such as `0,1,3-4,11-16` into a [`CpuSet`].
///
/// # Format
///
/// The value is a comma-separated list of zero or more items, where each item is either:
///
/// * a single integer (e.g. `1`)
/// * an inclusive range of integers (e.g. `2-4`)
/// * an inclusive range of integers with a stride (e.g. `5-9:2` which is equivalent to `5,7,9`)
///
/// Empty items are skipped. Whitespace surrounding the entire value (such as the trailing
/// newline of a value read from sysfs) is ignored; whitespace anywhere else is an error.
///
/// # Example
///
/// ```
/// use irq_affinity::CpuRangeParser;
/// use new_zealand::nz;
///
/// let parser = CpuRangeParser::new().with_cpu_count(nz!(28));
///
/// let isolated = parser.parse("0,1,3-4,11-16,23-27").unwrap();
/// assert_eq!(isolated.len(), 15);
///
/// // Processor 28 does not exist on a 28-processor system.
/// assert!(parser.parse("20-28").is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuRangeParser {
    mode: ParseMode,
    cpu_count: Option<NonZero<u32>>,
}

impl CpuRangeParser {
    /// Creates a strict parser without bounds checking.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how malformed range tokens are treated.
    #[must_use]
    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `.with_mode(ParseMode::LegacyPermissive)`.
    #[must_use]
    pub fn legacy_permissive(self) -> Self {
        self.with_mode(ParseMode::LegacyPermissive)
    }

    /// Requires every parsed index to be less than `cpu_count`.
    #[must_use]
    pub fn with_cpu_count(mut self, cpu_count: NonZero<u32>) -> Self {
        self.cpu_count = Some(cpu_count);
        self
    }

    /// The configured parse mode.
    #[must_use]
    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parses a processor range specification, returning the union of all items.
    ///
    /// An empty string is valid input and returns an empty set.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSyntax`] if an item cannot be parsed as integers, if a stride is zero or,
    ///   in strict mode, if an item starts with a hyphen or has an empty range side.
    /// * [`Error::InvertedRange`] in strict mode, if a range starts after it ends.
    /// * [`Error::CpuOutOfRange`] if a processor count was configured and an index reaches it.
    ///
    /// [`Error::InvalidSyntax`]: crate::Error::InvalidSyntax
    /// [`Error::InvertedRange`]: crate::Error::InvertedRange
    /// [`Error::CpuOutOfRange`]: crate::Error::CpuOutOfRange
    ///
    /// # Memory
    ///
    /// Every range is expanded into individual processor indexes, so memory use grows with the
    /// width of the ranges rather than the length of the input. Without a processor count, a
    /// short input such as `0-4294967295` expands to 2^32 indexes. Configure
    /// [`with_cpu_count()`][Self::with_cpu_count] when parsing untrusted input: ranges are then
    /// checked against the bound before they are expanded.
    pub fn parse(&self, spec: &str) -> crate::Result<CpuSet> {
        let mut cpus = Vec::new();

        for part in spec.trim_ascii().split(',') {
            self.parse_part(part, &mut cpus)?;
        }

        Ok(cpus.into_iter().collect())
    }

    fn parse_part(&self, part: &str, cpus: &mut Vec<CpuIndex>) -> crate::Result<()> {
        if part.is_empty() {
            return Ok(());
        }

        if part.starts_with('-') {
            return self.malformed(part, "item starts with a hyphen");
        }

        if let Some((range_start, range_end_inc)) = part.split_once('-') {
            self.parse_range(part, range_start, range_end_inc, cpus)
        } else {
            cpus.push(self.parse_single(part)?);
            Ok(())
        }
    }

    fn parse_range(
        &self,
        part: &str,
        range_start: &str,
        range_end_inc: &str,
        cpus: &mut Vec<CpuIndex>,
    ) -> crate::Result<()> {
        // If no stride is specified, we just default to 1 and pretend it was specified.
        let (range_end_inc, stride) = match range_end_inc.split_once(':') {
            Some((range_end_inc, stride)) => (range_end_inc, Some(stride)),
            None => (range_end_inc, None),
        };

        if range_end_inc.is_empty() {
            return self.malformed(part, "range end is missing");
        }

        let range_start =
            parse_integer(range_start, "range start could not be parsed as an integer")?;
        let range_end_inc =
            parse_integer(range_end_inc, "range end could not be parsed as an integer")?;

        let stride = match stride {
            Some(stride) => {
                parse_integer(stride, "range stride could not be parsed as an integer")?
            }
            None => 1,
        };

        if stride == 0 {
            return Err(crate::Error::syntax(
                part.to_string(),
                "range stride must not be zero",
            ));
        }

        if range_start > range_end_inc {
            return match self.mode {
                ParseMode::Strict => Err(crate::Error::InvertedRange {
                    start: range_start,
                    end: range_end_inc,
                }),
                ParseMode::LegacyPermissive => {
                    trace!(part, "inverted range contributes no processors");
                    Ok(())
                }
            };
        }

        // Checking the end before expanding keeps absurd ranges from allocating.
        self.check_bounds(range_end_inc)?;

        cpus.extend((range_start..=range_end_inc).step_by(stride as usize));
        Ok(())
    }

    fn parse_single(&self, single_item_part: &str) -> crate::Result<CpuIndex> {
        let item = parse_integer(
            single_item_part,
            "item was not a range but could not be parsed as an integer either",
        )?;

        self.check_bounds(item)?;
        Ok(item)
    }

    fn check_bounds(&self, cpu: CpuIndex) -> crate::Result<()> {
        match self.cpu_count {
            Some(cpu_count) if cpu >= cpu_count.get() => Err(crate::Error::CpuOutOfRange {
                cpu,
                cpu_count: cpu_count.get(),
            }),
            _ => Ok(()),
        }
    }

    fn malformed(&self, part: &str, problem: &str) -> crate::Result<()> {
        match self.mode {
            ParseMode::Strict => Err(crate::Error::syntax(part.to_string(), problem)),
            ParseMode::LegacyPermissive => {
                trace!(part, problem, "skipping malformed item");
                Ok(())
            }
        }
    }
}

fn parse_integer(value: &str, problem: &str) -> crate::Result<CpuIndex> {
    value
        .parse::<CpuIndex>()
        .map_err(|inner| crate::Error::syntax_caused_by(value.to_string(), problem, inner))
}

/// Parses a processor range specification in strict mode, optionally bounded by a processor
/// count.
///
/// This is shorthand for configuring a [`CpuRangeParser`]; see its documentation for the format.
///
/// # Example
///
/// ```
/// use new_zealand::nz;
///
/// let isolated = irq_affinity::parse_cpu_range("1,4-5", Some(nz!(8))).unwrap();
/// assert_eq!(isolated.as_slice(), &[1, 4, 5]);
/// ```
///
/// # Errors
///
/// See [`CpuRangeParser::parse()`].
pub fn parse_cpu_range(spec: &str, cpu_count: Option<NonZero<u32>>) -> crate::Result<CpuSet> {
    let parser = CpuRangeParser::new();

    match cpu_count {
        Some(cpu_count) => parser.with_cpu_count(cpu_count).parse(spec),
        None => parser.parse(spec),
    }
}
