use super::BreakPolicy;

/// Preference-ordered "nice" step multipliers.
const NICE_STEPS: [f64; 6] = [1.0, 5.0, 2.0, 2.5, 4.0, 3.0];

/// Weights for simplicity, coverage, density, and legibility.
const WEIGHTS: [f64; 4] = [0.25, 0.2, 0.5, 0.05];

const EPS: f64 = 1e-10;

/// Largest magnitude at which every integer is exactly representable.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Best labelling found so far: first break, step, number of breaks.
#[derive(Debug, Clone, Copy)]
struct Labelling {
    lmin: f64,
    step: f64,
    count: f64,
}

/// Wilkinson's extended break-selection algorithm.
///
/// Searches step multipliers, skips, break counts, and powers of ten for the
/// labelling that best trades off simplicity, coverage of the data range, and
/// closeness to the requested count. The search is pruned with upper bounds
/// on each score term, so it terminates after a handful of candidates.
#[derive(Debug, Clone)]
pub struct ExtendedBreaks {
    steps: Vec<f64>,
    weights: [f64; 4],
    only_inside: bool,
}

impl Default for ExtendedBreaks {
    fn default() -> Self {
        Self {
            steps: NICE_STEPS.to_vec(),
            weights: WEIGHTS,
            only_inside: false,
        }
    }
}

impl ExtendedBreaks {
    /// Creates the policy with the default nice steps and weights.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts breaks to lie within the data range.
    #[must_use]
    pub fn only_inside(mut self, only_inside: bool) -> Self {
        self.only_inside = only_inside;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn simplicity(&self, qi: usize, j: f64, lmin: f64, lmax: f64, lstep: f64) -> f64 {
        let n = self.steps.len() as f64;
        let i = qi as f64 + 1.0;
        let rem = lmin.rem_euclid(lstep);
        let has_zero = (rem < EPS || lstep - rem < EPS) && lmin <= 0.0 && lmax >= 0.0;
        let v = if has_zero { 1.0 } else { 0.0 };
        1.0 - (i - 1.0) / (n - 1.0) - j + v
    }

    #[allow(clippy::cast_precision_loss)]
    fn simplicity_max(&self, qi: usize, j: f64) -> f64 {
        let n = self.steps.len() as f64;
        let i = qi as f64 + 1.0;
        1.0 - (i - 1.0) / (n - 1.0) - j + 1.0
    }

    #[allow(
        clippy::many_single_char_names,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss
    )]
    fn search(&self, dmin: f64, dmax: f64, m: f64) -> Option<Labelling> {
        let [w0, w1, w2, w3] = self.weights;
        let mut best: Option<Labelling> = None;
        let mut best_score = -2.0;

        let mut j = 1.0_f64;
        'skips: loop {
            for (qi, &q) in self.steps.iter().enumerate() {
                let sm = self.simplicity_max(qi, j);
                if w0 * sm + w1 + w2 + w3 < best_score {
                    break 'skips;
                }

                let mut k = 2.0_f64;
                loop {
                    let dm = density_max(k, m);
                    if w0 * sm + w1 + w2 * dm + w3 < best_score {
                        break;
                    }

                    let delta = (dmax - dmin) / (k + 1.0) / j / q;
                    let mut z = delta.log10().ceil();
                    loop {
                        let step = j * q * 10f64.powf(z);
                        let cm = coverage_max(dmin, dmax, step * (k - 1.0));
                        if w0 * sm + w1 * cm + w2 * dm + w3 < best_score {
                            break;
                        }

                        // Start indices past 2^53 cannot be told apart.
                        let min_start = (dmax / step).floor() * j - (k - 1.0) * j;
                        let max_start = (dmin / step).ceil() * j;
                        if min_start.abs() > EXACT_INT_LIMIT
                            || max_start.abs() > EXACT_INT_LIMIT
                        {
                            z += 1.0;
                            continue;
                        }
                        for start in (min_start as i64)..=(max_start as i64) {
                            let lmin = start as f64 * (step / j);
                            let lmax = lmin + step * (k - 1.0);
                            let s = self.simplicity(qi, j, lmin, lmax, step);
                            let c = coverage(dmin, dmax, lmin, lmax);
                            let g = density(k, m, dmin, dmax, lmin, lmax);
                            let score = w0 * s + w1 * c + w2 * g + w3;
                            let inside = lmin >= dmin && lmax <= dmax;
                            if score > best_score && (!self.only_inside || inside) {
                                best_score = score;
                                best = Some(Labelling {
                                    lmin,
                                    step,
                                    count: k,
                                });
                            }
                        }
                        z += 1.0;
                    }
                    k += 1.0;
                }
            }
            j += 1.0;
        }

        best
    }
}

impl BreakPolicy for ExtendedBreaks {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn breaks(&self, n: usize, range: (f64, f64)) -> Vec<f64> {
        let (dmin, dmax) = range;
        if n < 2 || !dmin.is_finite() || !dmax.is_finite() {
            return Vec::new();
        }
        if (dmax - dmin).abs() < EPS {
            return vec![dmin];
        }
        let (dmin, dmax) = if dmin > dmax { (dmax, dmin) } else { (dmin, dmax) };

        let Some(best) = self.search(dmin, dmax, n as f64) else {
            return Vec::new();
        };

        // Trim float noise such as 0.30000000000000004 to the step's precision.
        let digits = (-best.step.log10()).ceil().max(0.0) + 1.0;
        let scale = 10f64.powf(digits);
        (0..best.count as usize)
            .map(|i| {
                let v = best.lmin + i as f64 * best.step;
                if (v * scale).abs() < EXACT_INT_LIMIT {
                    (v * scale).round() / scale
                } else {
                    v
                }
            })
            .collect()
    }
}

fn coverage(dmin: f64, dmax: f64, lmin: f64, lmax: f64) -> f64 {
    let range = dmax - dmin;
    1.0 - 0.5 * ((dmax - lmax).powi(2) + (dmin - lmin).powi(2)) / (0.1 * range).powi(2)
}

fn coverage_max(dmin: f64, dmax: f64, span: f64) -> f64 {
    let range = dmax - dmin;
    if span > range {
        let half = (span - range) / 2.0;
        1.0 - half.powi(2) / (0.1 * range).powi(2)
    } else {
        1.0
    }
}

fn density(k: f64, m: f64, dmin: f64, dmax: f64, lmin: f64, lmax: f64) -> f64 {
    let r = (k - 1.0) / (lmax - lmin);
    let rt = (m - 1.0) / (lmax.max(dmax) - dmin.min(lmin));
    2.0 - (r / rt).max(rt / r)
}

fn density_max(k: f64, m: f64) -> f64 {
    if k >= m {
        2.0 - (k - 1.0) / (m - 1.0)
    } else {
        1.0
    }
}
