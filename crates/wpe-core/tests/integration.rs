//! Integration tests for wpe-core.
//!
//! Exercise the framer, the per-bin predictor and the orchestrator together
//! on synthetic multichannel signals with known structure.

use wpe_core::{
    Complex64, Dereverberator, Error, MultichannelSignal, TfTensor, WpeConfig,
    analysis_transform, dereverberate, synthesis_transform,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reproducible xorshift noise in [-1, 1].
fn noise(seed: u32, len: usize) -> Vec<f64> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as i32 as f64) / (i32::MAX as f64)
        })
        .collect()
}

/// `dry` delayed by `delay` samples, same length.
fn delayed(dry: &[f64], delay: usize) -> Vec<f64> {
    let mut out = vec![0.0; dry.len()];
    out[delay..].copy_from_slice(&dry[..dry.len() - delay]);
    out
}

/// Direct path plus an exponentially decaying noise tail.
fn reverberate(dry: &[f64], seed: u32, tail: usize, decay: f64) -> Vec<f64> {
    let taps = noise(seed, tail);
    let mut rir = vec![1.0];
    rir.extend(
        taps.iter()
            .enumerate()
            .map(|(n, t)| 0.5 * t * (-(n as f64 + 1.0) / decay).exp()),
    );

    let mut out = vec![0.0; dry.len()];
    for (n, &h) in rir.iter().enumerate() {
        for (o, &x) in out[n..].iter_mut().zip(dry) {
            *o += h * x;
        }
    }
    out
}

/// Energy of the first `channels` channels from `first_frame` on.
fn tensor_energy(tensor: &TfTensor, channels: usize, first_frame: usize) -> f64 {
    let mut energy = 0.0;
    for c in 0..channels {
        for f in first_frame..tensor.num_frames() {
            energy += tensor.frame(c, f).iter().map(Complex64::norm_sqr).sum::<f64>();
        }
    }
    energy
}

// ===========================================================================
// Framer
// ===========================================================================

#[test]
fn test_shape_contract() {
    let signal = MultichannelSignal::new(vec![
        noise(1, 2000),
        noise(2, 2000),
        noise(3, 2000),
    ])
    .unwrap();

    let tensor = analysis_transform(&signal, 512, 0.75, None).unwrap();
    assert_eq!(tensor.shape(), (3, 13, 257));

    let back = synthesis_transform(&tensor, None, 0.75).unwrap();
    assert_eq!(back.num_channels(), 3);
    assert_eq!(back.len(), 12 * 128 + 512);
}

#[test]
fn test_short_signal_is_shape_error() {
    let signal = MultichannelSignal::new(vec![noise(1, 100)]).unwrap();
    assert!(matches!(
        analysis_transform(&signal, 512, 0.75, None),
        Err(Error::Shape(_))
    ));
}

// ===========================================================================
// Orchestrator
// ===========================================================================

#[test]
fn test_output_count_checked_before_transform() {
    // Far too short to frame; configuration must fail first.
    let signal = MultichannelSignal::new(vec![vec![0.1; 8], vec![0.2; 8]]).unwrap();
    assert!(matches!(
        dereverberate(&signal, 2, 3, 10, 2),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        dereverberate(&signal, 2, 1, 10, 0),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_bin_order_independence() {
    let signal = MultichannelSignal::new(vec![
        noise(11, 6000),
        noise(12, 6000),
        noise(13, 6000),
    ])
    .unwrap();
    let config = WpeConfig::new(3, 2).with_order(4).with_frame_size(128);
    let wpe = Dereverberator::new(config).unwrap();
    let tensor = wpe.stft().analyze(&signal).unwrap();

    let reference = wpe.dereverberate_tensor(&tensor).unwrap();

    let mut reversed = tensor.select_channels(2).unwrap();
    for bin in (0..tensor.num_bins()).rev() {
        let predicted = wpe.predictor().predict(&tensor.bin_matrix(bin)).unwrap();
        reversed.set_bin_matrix(bin, &predicted).unwrap();
    }

    assert_eq!(reference.shape(), reversed.shape());
    for (a, b) in reference.as_slice().iter().zip(reversed.as_slice()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_pure_delay_leaves_signal_unchanged() {
    // One white source reaching each microphone over a single delayed path,
    // with faint independent sensor noise. Nothing is predictable from
    // frames two or more hops in the past.
    let dry = noise(7, 32000);
    let mics: Vec<Vec<f64>> = [0usize, 3]
        .iter()
        .enumerate()
        .map(|(m, &d)| {
            delayed(&dry, d)
                .iter()
                .zip(noise(100 + m as u32, dry.len()))
                .map(|(x, n)| x + 0.01 * n)
                .collect()
        })
        .collect();
    let signal = MultichannelSignal::new(mics).unwrap();

    for order in [1, 2, 4] {
        let config = WpeConfig::new(2, 2).with_order(order).with_frame_size(128);
        let wpe = Dereverberator::new(config).unwrap();
        let tensor = wpe.stft().analyze(&signal).unwrap();
        let output = wpe.dereverberate_tensor(&tensor).unwrap();

        let before = tensor_energy(&tensor, 2, 0);
        let after = tensor_energy(&output, 2, 0);
        let ratio = after / before;
        assert!(
            (ratio - 1.0).abs() < 0.1,
            "order {order}: energy ratio {ratio} should stay near 1"
        );
    }
}

#[test]
fn test_reverberant_energy_is_reduced() {
    let dry = noise(21, 48000);
    let mics = vec![
        reverberate(&dry, 31, 3000, 800.0),
        reverberate(&dry, 32, 3000, 800.0),
    ];
    let signal = MultichannelSignal::new(mics).unwrap();

    let config = WpeConfig::new(2, 1).with_order(10).with_frame_size(256);
    let wpe = Dereverberator::new(config).unwrap();
    let tensor = wpe.stft().analyze(&signal).unwrap();
    let output = wpe.dereverberate_tensor(&tensor).unwrap();

    let delay = wpe.config().delay;
    let before = tensor_energy(&tensor, 1, delay);
    let after = tensor_energy(&output, 1, delay);
    assert!(
        after < 0.8 * before,
        "late reverberation should be removed: {after} vs {before}"
    );
}

#[test]
fn test_end_to_end_run() {
    let dry = noise(41, 16000);
    let signal = MultichannelSignal::new(vec![
        reverberate(&dry, 51, 1500, 400.0),
        reverberate(&dry, 52, 1500, 400.0),
        reverberate(&dry, 53, 1500, 400.0),
    ])
    .unwrap();

    let output = dereverberate(&signal, 3, 2, 5, 2).unwrap();
    assert_eq!(output.num_channels(), 2);
    assert!(output.len() >= signal.len());
    assert!(output.len() < signal.len() + 512);
    assert!((output.peak() - 1.0).abs() < 1e-12);
    assert!(output.channels().iter().flatten().all(|x| x.is_finite()));
}
