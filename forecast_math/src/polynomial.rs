//! Root checks for ARMA lag polynomials
//!
//! A lag polynomial `1 - a_1 z - ... - a_k z^k` has every root outside the
//! unit circle exactly when every reflection coefficient of the step-down
//! (Schur-Cohn) recursion has magnitude below one.

/// True when `1 - phi_1 z - ... - phi_p z^p` has all roots outside the unit circle
pub fn is_stationary_ar(phi: &[f64]) -> bool {
    if phi.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut coeffs = phi.to_vec();
    while let Some(&reflection) = coeffs.last() {
        if reflection.abs() >= 1.0 {
            return false;
        }

        let k = coeffs.len();
        let scale = 1.0 - reflection * reflection;
        let stepped: Vec<f64> = (0..k - 1)
            .map(|j| (coeffs[j] + reflection * coeffs[k - 2 - j]) / scale)
            .collect();
        coeffs = stepped;
    }

    true
}

/// True when `1 + theta_1 z + ... + theta_q z^q` has all roots outside the unit circle
pub fn is_invertible_ma(theta: &[f64]) -> bool {
    let negated: Vec<f64> = theta.iter().map(|t| -t).collect();
    is_stationary_ar(&negated)
}
