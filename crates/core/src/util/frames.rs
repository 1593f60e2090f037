//! Centred framing shared by the energy provider and the silence trimmer.

/// Number of centred frames for `len` samples: one frame per hop, the first
/// centred on sample 0. Zero samples yields zero frames.
pub fn centered_frame_count(len: usize, hop_length: usize) -> usize {
    if len == 0 || hop_length == 0 {
        return 0;
    }
    1 + len / hop_length
}

/// Mean power of each centred frame.
///
/// Frame `i` covers `[i * hop - frame / 2, i * hop - frame / 2 + frame)`;
/// samples outside the signal count as zero, the divisor is always
/// `frame_length`.
pub fn centered_frame_power(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    let n_frames = centered_frame_count(samples.len(), hop_length);
    if frame_length == 0 {
        return vec![0.0; n_frames];
    }
    let half = frame_length / 2;

    (0..n_frames)
        .map(|i| {
            let center = i * hop_length;
            let start = center.saturating_sub(half);
            let end = (center + frame_length - half).min(samples.len());
            let energy: f64 = samples[start.min(end)..end]
                .iter()
                .map(|&s| f64::from(s) * f64::from(s))
                .sum();
            energy / frame_length as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_follows_hop() {
        assert_eq!(centered_frame_count(0, 512), 0);
        assert_eq!(centered_frame_count(1, 512), 1);
        assert_eq!(centered_frame_count(22_050, 512), 44);
    }

    #[test]
    fn constant_signal_has_reduced_power_at_edges() {
        let samples = vec![1.0f32; 16];
        let p = centered_frame_power(&samples, 4, 2);
        assert_eq!(p.len(), 9);
        // first frame only sees the right half of its window
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!((p[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn silence_has_zero_power() {
        let p = centered_frame_power(&[0.0; 100], 8, 4);
        assert!(p.iter().all(|&v| v == 0.0));
    }
}
