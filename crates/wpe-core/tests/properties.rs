//! Property-based tests for the STFT framer and the bin predictor.

use proptest::prelude::*;
use wpe_core::{
    BinPredictor, Complex64, DMatrix, MultichannelSignal, Stft, StftConfig, Window,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With a periodic Hann window and a hop that divides half the frame,
    /// overlap-add reconstructs the input scaled by `frame_size / (2 * hop)`
    /// everywhere every covering frame exists.
    #[test]
    fn stft_roundtrip_periodic_hann(
        samples in prop::collection::vec(-1.0f64..1.0, 1024..3000),
        size_exp in 6u32..9,
        overlap in prop::sample::select(vec![0.5f64, 0.75, 0.875]),
    ) {
        let frame_size = 1usize << size_exp;
        let config = StftConfig::new(frame_size, overlap).with_window(Window::PeriodicHann);
        let shift = config.frame_shift();
        let gain = frame_size as f64 / (2 * shift) as f64;

        let stft = Stft::new(config).unwrap();
        let signal = MultichannelSignal::new(vec![samples.clone()]).unwrap();
        let tensor = stft.analyze(&signal).unwrap();
        let back = stft.synthesize(&tensor).unwrap();

        prop_assert!(back.len() >= samples.len());
        for n in frame_size..samples.len() - frame_size {
            let expected = gain * samples[n];
            let got = back.channel(0)[n];
            prop_assert!(
                (got - expected).abs() < 1e-9,
                "sample {} (frame {}, overlap {}): {} vs {}",
                n, frame_size, overlap, got, expected
            );
        }
    }

    /// The symmetric Hann window at 50% overlap is within its ripple of unity.
    #[test]
    fn stft_roundtrip_symmetric_hann(
        samples in prop::collection::vec(-1.0f64..1.0, 2048..4096),
        size_exp in 7u32..10,
    ) {
        let frame_size = 1usize << size_exp;
        let stft = Stft::new(StftConfig::new(frame_size, 0.5)).unwrap();
        let signal = MultichannelSignal::new(vec![samples.clone()]).unwrap();
        let back = stft.synthesize(&stft.analyze(&signal).unwrap()).unwrap();

        let ripple = 4.0 / frame_size as f64;
        for n in frame_size..samples.len() - frame_size {
            let got = back.channel(0)[n];
            prop_assert!(
                (got - samples[n]).abs() <= ripple * samples[n].abs() + 1e-9,
                "sample {}: {} vs {}", n, got, samples[n]
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Prediction never touches the held-out leading frames and always yields
    /// finite values on generic input.
    #[test]
    fn predictor_keeps_delay_frames(
        seed in 1u32..u32::MAX,
        order in 1usize..4,
        delay in 1usize..4,
        outputs in 1usize..3,
    ) {
        let channels = 2;
        let frames = 80;
        let mut state = seed;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as i32 as f64) / (i32::MAX as f64)
        };
        let bin = DMatrix::from_fn(frames, channels, |_, _| Complex64::new(next(), next()));

        let predictor = BinPredictor::new(order, delay, 2, outputs).unwrap();
        let out = predictor.predict(&bin).unwrap();

        prop_assert_eq!(out.shape(), (frames, outputs));
        for o in 0..outputs {
            for t in 0..delay {
                prop_assert_eq!(out[(t, o)], bin[(t, o)]);
            }
        }
        prop_assert!(out.iter().all(|c| c.re.is_finite() && c.im.is_finite()));
    }
}
