use ndarray::Array2;
use std::f64::consts::PI;
use tidal_lowpass::{
    FilterMode, LowpassParameters, ReferenceKernel, edge_length, error::Error, filter_sequence,
    frequency_response, lowpass, lowpass_columns, lowpass_kernel,
};

// Two semidiurnal tides on top of a mean level of 0.5.
fn tides(len: usize) -> Vec<f64> {
    (0..len)
        .map(|t| {
            let t = t as f64;
            2.5 * (2.0 * PI * t / 12.42).sin() + 1.5 * (2.0 * PI * t / 12.0).sin() + 0.5
        })
        .collect()
}

fn params(kind: ReferenceKernel, dt: f64, mode: FilterMode) -> LowpassParameters<f64> {
    let mut p = LowpassParameters::new(kind, dt).unwrap();
    p.set_mode(mode);
    p
}

#[test]
fn pl33_regression() {
    let x = tides(200);
    let y = lowpass(&x, &params(ReferenceKernel::Pl33, 1.0, FilterMode::Convolution)).unwrap();
    assert_eq!(y.len(), 200);
    assert!(y[..33].iter().all(|v| v.is_nan()));
    assert!(y[167..].iter().all(|v| v.is_nan()));
    assert!(y[33..167].iter().all(|v| v.is_finite()));
    let expected = [
        (33, 0.512758594399463),
        (43, 0.49792522994685473),
        (53, 0.48614523838917595),
        (63, 0.4923502569993682),
        (73, 0.5080320286385247),
        (83, 0.5127925822528889),
        (93, 0.5009709626870004),
        (103, 0.4884933603190776),
        (113, 0.4915259494402153),
        (123, 0.5054371589978759),
        (133, 0.5115410442394853),
        (143, 0.5020892993503063),
        (153, 0.49019137538818136),
        (163, 0.49187423914781403),
    ];
    for (j, e) in expected {
        assert!((y[j] - e).abs() < 1e-10, "y[{j}] = {} != {e}", y[j]);
    }
}

#[test]
fn convolution_edges() {
    let x = tides(400);
    for kind in [
        ReferenceKernel::Pl33,
        ReferenceKernel::Pl64,
        ReferenceKernel::Pl66,
        ReferenceKernel::Thompson1983,
    ] {
        for dt in [1.0, 2.0] {
            let p = params(kind, dt, FilterMode::Convolution);
            let kernel = lowpass_kernel(&p).unwrap();
            let edge = edge_length(kernel.len());
            let y = lowpass(&x, &p).unwrap();
            assert_eq!(y.len(), x.len());
            let missing = y.iter().filter(|v| v.is_nan()).count();
            assert_eq!(missing, 2 * edge, "{kind:?} dt = {dt}");
            assert!(y[..edge].iter().all(|v| v.is_nan()));
            assert!(y[x.len() - edge..].iter().all(|v| v.is_nan()));
            assert!(y[edge..x.len() - edge].iter().all(|v| v.is_finite()));
        }
    }
}

#[test]
fn recursive_modes_are_complete() {
    let x = tides(400);
    for kind in [
        ReferenceKernel::Pl33,
        ReferenceKernel::Pl64,
        ReferenceKernel::Pl66,
        ReferenceKernel::Thompson1983,
    ] {
        for mode in [FilterMode::Tapered, FilterMode::ForwardBackward] {
            let y = lowpass(&x, &params(kind, 1.0, mode)).unwrap();
            assert_eq!(y.len(), x.len());
            assert!(y.iter().all(|v| v.is_finite()), "{kind:?} {mode:?}");
        }
    }
}

#[test]
fn tides_are_removed() {
    let x = tides(400);
    for mode in [FilterMode::Tapered, FilterMode::ForwardBackward] {
        let y = lowpass(&x, &params(ReferenceKernel::Pl33, 1.0, mode)).unwrap();
        for v in &y[40..360] {
            assert!((v - 0.5).abs() < 0.02, "{mode:?}");
        }
    }
}

#[test]
fn pl66_preserves_constant() {
    let x = vec![3.25; 300];
    for mode in [FilterMode::Tapered, FilterMode::ForwardBackward] {
        let p = params(ReferenceKernel::Pl66, 1.0, mode);
        let k = lowpass_kernel(&p).unwrap().len();
        let y = lowpass(&x, &p).unwrap();
        for v in &y[k..300 - k] {
            assert!((v - 3.25).abs() < 1e-12, "{mode:?}");
        }
    }
}

#[test]
fn pl64_is_not_normalized() {
    let p = params(ReferenceKernel::Pl64, 1.0, FilterMode::Convolution);
    let kernel = lowpass_kernel(&p).unwrap();
    let gain: f64 = kernel.iter().sum();
    assert!((gain - 1.0005053).abs() < 1e-6);
    let y = lowpass(&[3.25; 300], &p).unwrap();
    assert!((y[150] - 3.25 * gain).abs() < 1e-12);
}

#[test]
fn longer_period() {
    // 72 hour PL33 at 4 hour sampling attenuates a 2 day period more than
    // the 33 hour filter
    let p33 = params(ReferenceKernel::Pl33, 4.0, FilterMode::Convolution);
    let mut p72 = p33.clone();
    p72.set_half_amplitude_period(72.0);
    let k33 = lowpass_kernel(&p33).unwrap();
    let k72 = lowpass_kernel(&p72).unwrap();
    assert_eq!(k33.len(), 17);
    assert_eq!(k72.len(), 35);
    let speed = 360.0 / 48.0;
    let r33 = frequency_response(&k33, speed, 4.0).norm();
    let r72 = frequency_response(&k72, speed, 4.0).norm();
    assert!(r72 < r33);
    assert!((frequency_response(&k72, 0.0, 4.0).norm() - 1.0).abs() < 1e-12);
}

#[test]
fn half_amplitude_period() {
    for kind in [ReferenceKernel::Pl33, ReferenceKernel::Pl66] {
        let p = params(kind, 1.0, FilterMode::Convolution);
        let kernel = lowpass_kernel(&p).unwrap();
        let r = frequency_response(&kernel, 360.0 / 33.0, 1.0).norm();
        assert!((r - 0.5).abs() < 0.05, "{kind:?}: {r}");
    }
}

#[test]
fn columns_match_sequences() {
    let len = 300;
    let x = Array2::from_shape_fn((len, 3), |(t, c)| {
        let t = t as f64;
        (c as f64 + 1.0) * (2.0 * PI * t / 12.42).sin() + 0.1 * t / (c as f64 + 1.0)
    });
    for mode in [
        FilterMode::Convolution,
        FilterMode::Tapered,
        FilterMode::ForwardBackward,
    ] {
        let p = params(ReferenceKernel::Pl66, 1.0, mode);
        let y = lowpass_columns(x.view(), &p).unwrap();
        assert_eq!(y.dim(), x.dim());
        for c in 0..3 {
            let expected = lowpass(&x.column(c).to_vec(), &p).unwrap();
            for (a, b) in y.column(c).iter().zip(expected.iter()) {
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }
}

#[test]
fn too_short() {
    let p = params(ReferenceKernel::Pl33, 1.0, FilterMode::Tapered);
    match lowpass(&tides(60), &p) {
        Err(Error::SequenceTooShort { length, required }) => {
            assert_eq!(length, 60);
            assert_eq!(required, 68);
        }
        other => panic!("unexpected result {other:?}"),
    }
    let p = params(ReferenceKernel::Pl33, 1.0, FilterMode::Convolution);
    assert!(lowpass(&tides(66), &p).is_ok());
    assert!(matches!(
        lowpass(&tides(65), &p),
        Err(Error::SequenceTooShort { .. })
    ));
}

#[test]
fn invalid_kernels() {
    let mut p = params(ReferenceKernel::Pl33, 1.0, FilterMode::Convolution);
    p.set_half_amplitude_period(0.5);
    assert!(matches!(
        lowpass(&tides(100), &p),
        Err(Error::InvalidKernelLength)
    ));
    p.set_half_amplitude_period(-33.0);
    assert!(matches!(lowpass(&tides(100), &p), Err(Error::InvalidPeriod)));
    let p = params(ReferenceKernel::Pl64, 80.0, FilterMode::Convolution);
    assert!(matches!(
        lowpass(&tides(100), &p),
        Err(Error::InvalidKernelLength)
    ));
    assert!(matches!(
        filter_sequence(&tides(100), &[], FilterMode::Convolution),
        Err(Error::InvalidKernelLength)
    ));
}

#[cfg(any(
    feature = "lapack-backend",
    feature = "faer-backend",
    feature = "nalgebra-backend"
))]
#[test]
fn designed_kernel() {
    use tidal_lowpass::{ThompsonParameters, thompson_weights};
    let design = thompson_weights(&ThompsonParameters::new(1.0).unwrap()).unwrap();
    let x = tides(600);
    let y = filter_sequence(&x, &design.impulse_response, FilterMode::Convolution).unwrap();
    assert_eq!(y.iter().filter(|v| v.is_nan()).count(), 242);
    for v in &y[121..479] {
        assert!((v - 0.5).abs() < 1e-3);
    }
}
