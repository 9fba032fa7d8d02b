use ndarray::Array1;

/// DE/best/2 mutant: `xbest + f * (x1 + x2 - x3 - x4)`
pub(crate) fn mutant_best2(
    best: &Array1<f64>,
    donors: [&Array1<f64>; 4],
    f: f64,
) -> Array1<f64> {
    let [x1, x2, x3, x4] = donors;
    best + &((x1 + x2 - x3 - x4) * f)
}
