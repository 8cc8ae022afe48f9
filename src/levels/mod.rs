//! Contour level selection.

mod extended;

pub use extended::ExtendedBreaks;

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};

/// Default number of levels requested when none is configured.
pub const DEFAULT_LEVEL_COUNT: usize = 5;

/// How contour levels are chosen.
///
/// Deserializes from either an integer (target count) or a list of reals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Levels {
    /// Target number of levels, resolved against the observed data range.
    Count(usize),
    /// Explicit thresholds, used as given after validation.
    Explicit(Vec<f64>),
}

impl Default for Levels {
    fn default() -> Self {
        Self::Count(DEFAULT_LEVEL_COUNT)
    }
}

/// Strategy that proposes "nice" break values for a data range.
pub trait BreakPolicy: Send + Sync + std::fmt::Debug {
    /// Returns ascending breaks for roughly `n` levels over `range`.
    ///
    /// May return fewer than two values for degenerate input; the caller
    /// is responsible for handling that.
    fn breaks(&self, n: usize, range: (f64, f64)) -> Vec<f64>;
}

/// Resolves a [`Levels`] request into a concrete ascending sequence.
#[derive(Debug)]
pub struct LevelSelector {
    policy: Box<dyn BreakPolicy>,
}

impl Default for LevelSelector {
    fn default() -> Self {
        Self {
            policy: Box::new(ExtendedBreaks::default()),
        }
    }
}

impl LevelSelector {
    /// Creates a selector using [`ExtendedBreaks`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the break policy used for count requests.
    #[must_use]
    pub fn with_policy(mut self, policy: impl BreakPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Resolves `levels` against the observed field range `(min, max)`.
    ///
    /// Count requests always bracket the observed range: if the policy's
    /// breaks stop short on either side they are extended by whole steps.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::InvalidLevels` if the count is below 2, the range
    /// is not finite, or an explicit sequence is too short, non-finite, or not
    /// strictly ascending.
    pub fn select(&self, levels: &Levels, range: (f64, f64)) -> Result<Vec<f64>> {
        match levels {
            Levels::Explicit(values) => {
                validate_levels(values)?;
                Ok(values.clone())
            }
            Levels::Count(n) => self.from_count(*n, range),
        }
    }

    fn from_count(&self, n: usize, (min, max): (f64, f64)) -> Result<Vec<f64>> {
        if n < 2 {
            return Err(LevelError::InvalidLevels(format!(
                "level count must be at least 2, got {n}"
            ))
            .into());
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(LevelError::InvalidLevels(format!(
                "cannot derive levels from range ({min}, {max})"
            ))
            .into());
        }

        #[allow(clippy::float_cmp)]
        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let mut breaks: Vec<f64> = self
            .policy
            .breaks(n, (lo, hi))
            .into_iter()
            .filter(|b| b.is_finite())
            .collect();
        if validate_levels(&breaks).is_err() {
            breaks = vec![lo, hi];
        }
        validate_levels(&breaks)?;
        Ok(bracket(breaks, min, max))
    }
}

/// Checks that `levels` is a usable threshold sequence.
///
/// # Errors
///
/// Returns `LevelError::InvalidLevels` if fewer than 2 levels are given, any
/// level is not finite, or the sequence is not strictly ascending.
pub fn validate_levels(levels: &[f64]) -> Result<()> {
    if levels.len() < 2 {
        return Err(LevelError::InvalidLevels(format!(
            "at least 2 levels are required, got {}",
            levels.len()
        ))
        .into());
    }
    if let Some(bad) = levels.iter().find(|l| !l.is_finite()) {
        return Err(LevelError::InvalidLevels(format!("level {bad} is not finite")).into());
    }
    if let Some(pair) = levels.windows(2).find(|w| w[1] <= w[0]) {
        return Err(LevelError::InvalidLevels(format!(
            "levels must be strictly ascending, found {} followed by {}",
            pair[0], pair[1]
        ))
        .into());
    }
    Ok(())
}

/// Extends an ascending sequence by its edge steps until it covers `[min, max]`.
fn bracket(mut levels: Vec<f64>, min: f64, max: f64) -> Vec<f64> {
    let n = levels.len();
    let first_step = levels[1] - levels[0];
    let last_step = levels[n - 1] - levels[n - 2];

    let mut head = Vec::new();
    let mut first = levels[0];
    while first > min {
        first -= first_step;
        head.push(first);
    }
    head.reverse();

    let mut last = levels[n - 1];
    while last < max {
        last += last_step;
        levels.push(last);
    }

    head.extend(levels);
    head
}
