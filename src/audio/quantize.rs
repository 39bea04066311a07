//! Float to 16-bit sample quantization
//!
//! Decoded PCM arrives as f32 in approximately [-1.0, 1.0]; the output
//! stream wants i16. Conversion rounds half-way cases away from zero and
//! clamps to the i16 rails, so over-full-scale peaks saturate instead of
//! wrapping.

/// Scale factor for one half of the 16-bit range (2^15).
const HALF_SCALE: f32 = 32768.0;

/// Convert one float sample to i16.
///
/// `round(sample * 32768)`, clamped to `[-32768, 32767]`.
#[inline]
pub fn quantize_i16(sample: f32) -> i16 {
    (sample * HALF_SCALE).round().clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_maps_to_zero() {
        assert_eq!(quantize_i16(0.0), 0);
    }

    #[test]
    fn test_full_scale_saturates_not_wraps() {
        // +1.0 scales to 32768, one past i16::MAX
        assert_eq!(quantize_i16(1.0), i16::MAX);
        assert_eq!(quantize_i16(-1.0), i16::MIN);
        assert_eq!(quantize_i16(2.5), i16::MAX);
        assert_eq!(quantize_i16(-2.5), i16::MIN);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 0.5 / 32768 scales to exactly 0.5
        assert_eq!(quantize_i16(0.5 / 32768.0), 1);
        assert_eq!(quantize_i16(-0.5 / 32768.0), -1);
        assert_eq!(quantize_i16(1.5 / 32768.0), 2);
        assert_eq!(quantize_i16(-1.5 / 32768.0), -2);
    }

    #[test]
    fn test_error_within_one_lsb() {
        // Sweep a range of values and verify |q - x*32768| <= 0.5 wherever
        // no clamping applies
        for n in -1000..=1000 {
            let x = n as f32 / 1000.0 * 0.99;
            let q = quantize_i16(x) as f32;
            assert!(
                (q - x * HALF_SCALE).abs() <= 0.5 + f32::EPSILON,
                "sample {} quantized to {}",
                x,
                q
            );
        }
    }
}
