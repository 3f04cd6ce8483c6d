use super::block::SampleBlock;
use super::features::{FeatureVector, NUM_BANDS};

/// Time-domain feature extractor: one RMS loudness value plus [`NUM_BANDS`]
/// coarse energy chunks per block, in a single pass over the samples.
///
/// The bands are contiguous time slices, not frequency bins; together with
/// the square-root boost this keeps quiet speech visible without pinning loud
/// input at the ceiling, at a fraction of the cost of a spectral transform.
/// Holds no state between calls.
pub struct SignalAnalyzer;

impl SignalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one block. Empty blocks and non-finite samples read as
    /// silence; every output is clamped into [0, 1].
    pub fn analyze(&self, block: &SampleBlock) -> FeatureVector {
        match block {
            SampleBlock::I16(samples) => {
                analyze_samples(samples, |s| f32::from(s) / f32::from(i16::MAX))
            }
            SampleBlock::F32(samples) => {
                analyze_samples(samples, |s| if s.is_finite() { s } else { 0.0 })
            }
        }
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn analyze_samples<T: Copy>(samples: &[T], normalize: impl Fn(T) -> f32) -> FeatureVector {
    let len = samples.len();
    if len == 0 {
        return FeatureVector::zeroed();
    }

    let mut out = FeatureVector::zeroed();

    let mut sum_sq = 0.0f64;
    for &s in samples {
        let v = f64::from(normalize(s));
        sum_sq += v * v;
    }
    let rms = (sum_sq / len as f64).sqrt() as f32;
    out.loudness = (rms.sqrt() * 2.0).clamp(0.0, 1.0);

    // Chunk size floors at one sample; the last band absorbs the remainder
    // of the integer division. Blocks shorter than NUM_BANDS leave the tail
    // bands at zero.
    let chunk = (len / NUM_BANDS).max(1);
    for band in 0..NUM_BANDS {
        let start = band * chunk;
        if start >= len {
            break;
        }
        let end = if band == NUM_BANDS - 1 {
            len
        } else {
            (start + chunk).min(len)
        };
        let mut sum = 0.0f32;
        for &s in &samples[start..end] {
            sum += normalize(s).abs();
        }
        let mean = sum / (end - start) as f32;
        out.bands[band] = (mean.sqrt() * 2.5).clamp(0.0, 1.0);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_range(fv: &FeatureVector) {
        assert!(
            fv.loudness.is_finite() && (0.0..=1.0).contains(&fv.loudness),
            "loudness out of range: {}",
            fv.loudness
        );
        for (i, b) in fv.bands.iter().enumerate() {
            assert!(
                b.is_finite() && (0.0..=1.0).contains(b),
                "band {i} out of range: {b}"
            );
        }
    }

    #[test]
    fn empty_block_is_silent() {
        let analyzer = SignalAnalyzer::new();
        assert_eq!(
            analyzer.analyze(&SampleBlock::F32(&[])),
            FeatureVector::zeroed()
        );
        assert_eq!(
            analyzer.analyze(&SampleBlock::I16(&[])),
            FeatureVector::zeroed()
        );
    }

    #[test]
    fn all_zero_samples_are_silent() {
        let analyzer = SignalAnalyzer::new();
        let silence = vec![0i16; 1024];
        let fv = analyzer.analyze(&SampleBlock::I16(&silence));
        assert_eq!(fv.loudness, 0.0);
        assert_eq!(fv.bands, [0.0; NUM_BANDS]);
    }

    #[test]
    fn full_scale_i16_block_saturates_loudness() {
        let analyzer = SignalAnalyzer::new();
        let block = vec![i16::MAX; 1024];
        let fv = analyzer.analyze(&SampleBlock::I16(&block));
        // rms == 1.0, so sqrt(1.0) * 2.0 clamps to exactly 1.0
        assert_eq!(fv.loudness, 1.0);
        assert_in_range(&fv);
    }

    #[test]
    fn single_sample_block() {
        let analyzer = SignalAnalyzer::new();
        let fv = analyzer.analyze(&SampleBlock::I16(&[1000]));
        assert_in_range(&fv);
        assert!(fv.loudness > 0.0);
        assert!(fv.bands[0] > 0.0);
        // One sample only fills the first band
        assert_eq!(fv.bands[1..], [0.0; NUM_BANDS - 1]);
    }

    #[test]
    fn odd_length_block_stays_in_range() {
        let analyzer = SignalAnalyzer::new();
        let block: Vec<i16> = (0..1023).map(|i| ((i * 37) % 20000) as i16 - 10000).collect();
        let fv = analyzer.analyze(&SampleBlock::I16(&block));
        assert_in_range(&fv);
    }

    #[test]
    fn block_shorter_than_band_count() {
        let analyzer = SignalAnalyzer::new();
        let fv = analyzer.analyze(&SampleBlock::F32(&[0.5, -0.5, 0.25]));
        assert_in_range(&fv);
        assert!(fv.bands[0] > 0.0);
        assert_eq!(fv.bands[3..], [0.0; NUM_BANDS - 3]);
    }

    #[test]
    fn non_finite_samples_read_as_silence() {
        let analyzer = SignalAnalyzer::new();
        let block = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0];
        let fv = analyzer.analyze(&SampleBlock::F32(&block));
        assert_eq!(fv.loudness, 0.0);
        assert_eq!(fv.bands, [0.0; NUM_BANDS]);
    }

    #[test]
    fn i16_min_does_not_escape_range() {
        let analyzer = SignalAnalyzer::new();
        let block = vec![i16::MIN; 512];
        let fv = analyzer.analyze(&SampleBlock::I16(&block));
        assert_in_range(&fv);
        assert_eq!(fv.loudness, 1.0);
    }

    #[test]
    fn last_band_absorbs_remainder() {
        let analyzer = SignalAnalyzer::new();
        // 10 samples, chunk = 1: bands 0-5 get one sample each, band 6 the
        // remaining four. Loud tail shows up only in the last band.
        let mut block = vec![0.0f32; 10];
        for s in &mut block[6..] {
            *s = 0.8;
        }
        let fv = analyzer.analyze(&SampleBlock::F32(&block));
        assert_eq!(fv.bands[..6], [0.0; 6]);
        assert!(fv.bands[6] > 0.0);
    }

    #[test]
    fn quiet_input_is_boosted() {
        let analyzer = SignalAnalyzer::new();
        let block = vec![0.04f32; 1024];
        let fv = analyzer.analyze(&SampleBlock::F32(&block));
        // sqrt(0.04) * 2.0 = 0.4: far more visible than the raw amplitude
        assert!((fv.loudness - 0.4).abs() < 1e-3);
    }
}
