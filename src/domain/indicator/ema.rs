//! Exponential Moving Average.
//!
//! alpha = 2/(n+1), seeded with the first observation, then
//! EMA[i] = alpha*X[i] + (1-alpha)*EMA[i-1]. No warmup: every value is defined.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f64,
    value: f64,
}

impl Ema {
    /// Smoothing constant for an n-period EMA.
    pub fn smoothing(period: usize) -> f64 {
        2.0 / (period as f64 + 1.0)
    }

    pub fn seeded(period: usize, seed: f64) -> Self {
        Ema {
            alpha: Self::smoothing(period),
            value: seed,
        }
    }

    pub fn update(&mut self, x: f64) -> f64 {
        self.value = self.alpha * x + (1.0 - self.alpha) * self.value;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// EMA of a whole series, seeded with its first value.
#[cfg(test)]
pub(crate) fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let mut ema = Ema::seeded(period, first);
    let mut out = Vec::with_capacity(values.len());
    out.push(first);
    for &x in &values[1..] {
        out.push(ema.update(x));
    }
    out
}
