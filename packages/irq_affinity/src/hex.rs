//! Conversion between [`BitmaskVector`] and hexadecimal strings.
//!
//! The canonical form is lowercase with leading zeros suppressed, except that a mask with no
//! processors enabled is written as a single `0`. The kernel pads its output to the full mask
//! width and separates 32-bit words with commas, so values read from a live system usually need
//! to be decoded or compared canonically rather than compared as raw strings.

use tracing::trace;

use crate::{BitmaskVector, NibbleGroup};

/// Encodes a mask as canonical hexadecimal: one lowercase digit per group, most significant
/// first, with leading zeros suppressed.
///
/// A mask with no processors enabled encodes to `"0"`, never to an empty string.
///
/// # Example
///
/// ```
/// use irq_affinity::{BitmaskVector, build_full_mask, encode_hex};
/// use new_zealand::nz;
///
/// assert_eq!(encode_hex(&build_full_mask(nz!(28))), "fffffff");
/// assert_eq!(encode_hex(&BitmaskVector::zeroed(3)), "0");
/// ```
#[must_use]
pub fn encode_hex(mask: &BitmaskVector) -> String {
    mask.to_string()
}

/// Decodes a hexadecimal mask into a [`BitmaskVector`] with exactly `total_groups` groups.
///
/// Commas and whitespace are treated as separators and ignored, so values in the kernel's
/// `0000ffff,ffffffff` format are accepted as-is. Uppercase digits are accepted. The value is
/// left-padded with zero groups to `total_groups`.
///
/// Only significant digits count toward `total_groups`. Leading zero digits are padding and are
/// dropped, however many there are, because the kernel pads affinity files to its configured
/// maximum processor count. So `"000f"` decodes into 2 groups even though it is 4 digits long,
/// while `"f0f"` does not.
///
/// # Example
///
/// ```
/// use irq_affinity::decode_hex;
///
/// let mask = decode_hex("f", 3).unwrap();
/// assert_eq!(mask.groups(), &[0, 0, 15]);
/// assert_eq!(mask, decode_hex("00f", 3).unwrap());
///
/// // Leading zeros do not count toward the group count.
/// assert_eq!(decode_hex("000f", 2).unwrap().groups(), &[0, 15]);
///
/// // Three significant digits do not fit in two groups.
/// assert!(decode_hex("f0f", 2).is_err());
/// ```
///
/// # Errors
///
/// * [`Error::InvalidHexDigit`][crate::Error::InvalidHexDigit] if a character is neither a hex
///   digit nor a separator.
/// * [`Error::HexTooLong`][crate::Error::HexTooLong] if the number of significant digits (after
///   leading zeros and separators are removed) exceeds `total_groups`. The value is never
///   truncated.
pub fn decode_hex(hex: &str, total_groups: usize) -> crate::Result<BitmaskVector> {
    let mut digits = Vec::with_capacity(hex.len());

    for character in hex.chars().filter(|c| !is_separator(*c)) {
        let Some(value) = character.to_digit(16) else {
            return Err(crate::Error::InvalidHexDigit {
                invalid_value: hex.to_string(),
                character,
            });
        };

        #[expect(
            clippy::cast_possible_truncation,
            reason = "a single hex digit is always less than 16"
        )]
        let nibble = value as NibbleGroup;
        digits.push(nibble);
    }

    let first_significant = digits
        .iter()
        .position(|digit| *digit != 0)
        .unwrap_or(digits.len());
    let significant = digits.get(first_significant..).unwrap_or_default();

    trace!(
        digits = digits.len(),
        significant_digits = significant.len(),
        total_groups,
        "decoded hex mask"
    );

    let Some(padding) = total_groups.checked_sub(significant.len()) else {
        return Err(crate::Error::HexTooLong {
            significant_digits: significant.len(),
            groups: total_groups,
        });
    };

    let mut groups = vec![0; padding];
    groups.extend_from_slice(significant);

    Ok(BitmaskVector::from_groups(groups))
}

/// Compares two hexadecimal strings, ignoring differences in leading zeros only.
///
/// Strings made up only of zeros compare equal regardless of their length. Any other difference,
/// including letter case or separators, makes the strings unequal. To compare against a raw
/// value read from a live system, use [`BitmaskVector::matches_observed()`] instead.
///
/// # Example
///
/// ```
/// use irq_affinity::compare_canonical_hex;
///
/// assert!(compare_canonical_hex("0042", "42"));
/// assert!(compare_canonical_hex("000", "0"));
/// assert!(!compare_canonical_hex("42", "43"));
/// ```
#[must_use]
pub fn compare_canonical_hex(a: &str, b: &str) -> bool {
    canonical(a) == canonical(b)
}

fn canonical(hex: &str) -> &str {
    let trimmed = hex.trim_start_matches('0');

    if trimmed.is_empty() && !hex.is_empty() {
        "0"
    } else {
        trimmed
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c.is_ascii_whitespace()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;

    use super::*;
    use crate::{ErrorKind, build_full_mask, groups};

    #[test]
    fn encode_suppresses_leading_zeros() {
        assert_eq!(encode_hex(&BitmaskVector::zeroed(3)), "0");
        assert_eq!(encode_hex(&decode_hex("00a0", 4).unwrap()), "a0");
        assert_eq!(encode_hex(&build_full_mask(nz!(28))), "fffffff");
        assert_eq!(encode_hex(&build_full_mask(nz!(27))), "7ffffff");
    }

    #[test]
    fn decode_pads_to_declared_groups() {
        assert_eq!(decode_hex("f", 3).unwrap().groups(), &[0, 0, 15]);
        assert_eq!(decode_hex("", 2).unwrap().groups(), &[0, 0]);
        assert_eq!(decode_hex("0", 0).unwrap().groups(), &[] as &[NibbleGroup]);
        assert_eq!(decode_hex("7e07e4", 7).unwrap().to_string(), "7e07e4");
    }

    #[test]
    fn decode_rejects_over_long_values() {
        let error = decode_hex("f0f", 2).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Decode);
        assert!(matches!(
            error,
            crate::Error::HexTooLong {
                significant_digits: 3,
                groups: 2
            }
        ));
    }

    #[test]
    fn decode_treats_leading_zeros_as_padding() {
        assert_eq!(decode_hex("000f", 2).unwrap().groups(), &[0, 15]);
        assert_eq!(decode_hex("0000,000f", 1).unwrap().groups(), &[15]);

        // Only significant digits are reported, not the padded length.
        let error = decode_hex("000f0f", 2).unwrap_err();
        assert!(matches!(
            error,
            crate::Error::HexTooLong {
                significant_digits: 3,
                groups: 2
            }
        ));
    }

    #[test]
    fn decode_strips_kernel_separators() {
        let mask = decode_hex("000000ff,ffffffff\n", 10).unwrap();

        assert_eq!(mask, build_full_mask(nz!(40)));
        assert_eq!(mask.count_enabled(), 40);
    }

    #[test]
    fn decode_accepts_uppercase() {
        assert_eq!(decode_hex("FfA", 3).unwrap().groups(), &[15, 15, 10]);
    }

    #[test]
    fn decode_rejects_non_hex_characters() {
        let error = decode_hex("ffxf", 4).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Decode);
        assert!(matches!(
            error,
            crate::Error::InvalidHexDigit { character: 'x', .. }
        ));

        decode_hex("0x1f", 4).unwrap_err();
    }

    #[test]
    fn decode_reverses_encode() {
        for cpu_count in 1..=70 {
            let cpu_count = std::num::NonZero::new(cpu_count).unwrap();
            let mask = build_full_mask(cpu_count);

            assert_eq!(decode_hex(&encode_hex(&mask), groups(cpu_count)).unwrap(), mask);
        }
    }

    #[test]
    fn compare_ignores_leading_zeros_only() {
        assert!(compare_canonical_hex("0042", "42"));
        assert!(compare_canonical_hex("42", "0042"));
        assert!(compare_canonical_hex("42", "42"));
        assert!(!compare_canonical_hex("42", "43"));
        assert!(!compare_canonical_hex("420", "42"));
        assert!(!compare_canonical_hex("4,2", "42"));
    }

    #[test]
    fn compare_all_zero_values() {
        assert!(compare_canonical_hex("0", "0000"));
        assert!(compare_canonical_hex("000", "0"));
        assert!(!compare_canonical_hex("0", "1"));
        assert!(!compare_canonical_hex("", "0"));
        assert!(compare_canonical_hex("", ""));
    }
}
