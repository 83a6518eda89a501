/// Psi-weights of the integrated model `φ(B)(1-B)^d y = θ(B) e`.
///
/// The h-step forecast error variance is `σ² Σ_{j<h} ψ_j²`.
pub(crate) fn psi_weights(ar: &[f64], ma: &[f64], d: usize, count: usize) -> Vec<f64> {
    let mut poly = Vec::with_capacity(ar.len() + d + 1);
    poly.push(1.0);
    poly.extend(ar.iter().map(|a| -a));
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, &c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    let phi: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

    let mut psi = vec![0.0; count];
    for j in 0..count {
        if j == 0 {
            psi[0] = 1.0;
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for i in 1..=phi.len().min(j) {
            value += phi[i - 1] * psi[j - i];
        }
        psi[j] = value;
    }
    psi
}

/// Standard deviations of the 1..=horizon step forecast errors
pub(crate) fn forecast_std_errors(psi: &[f64], sigma2: f64) -> Vec<f64> {
    let mut cumulative = 0.0;
    psi.iter()
        .map(|w| {
            cumulative += w * w;
            (sigma2 * cumulative).sqrt()
        })
        .collect()
}
