// Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Routes the crate's tracing output through the test harness.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Central finite-difference partial derivatives of `f` at `params`, one per
/// parameter, for every output component: `result[j][i] = d out_j / d p_i`.
pub fn central_difference<F>(f: F, params: &[f64], outputs: usize, eps: f64) -> Vec<Vec<f64>>
where
    F: Fn(&[f64], &mut [f64]),
{
    let mut jac = vec![vec![0.0; params.len()]; outputs];
    let mut plus_out = vec![0.0; outputs];
    let mut minus_out = vec![0.0; outputs];

    for i in 0..params.len() {
        let mut plus = params.to_vec();
        let mut minus = params.to_vec();
        plus[i] += eps;
        minus[i] -= eps;
        f(&plus, &mut plus_out);
        f(&minus, &mut minus_out);
        for j in 0..outputs {
            jac[j][i] = (plus_out[j] - minus_out[j]) / (2.0 * eps);
        }
    }
    jac
}
