//! RSI (Relative Strength Index), streaming form with Wilder smoothing.
//!
//! U = max(C[i] - C[i-1], 0), D = max(C[i-1] - C[i], 0)
//! Bars 1..14: simple running average of U and D, RSI reported as 0.
//! Bars 14..: avg = U/n + avg_prev*(1 - 1/n), RSI = 100 - 100/(1 + avgU/avgD).
//! If avgD == 0: RSI = 100.
//!
//! The warm-up length is fixed at [`RSI_WARMUP_BARS`]; the configured period
//! only sets the smoothing weight.

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Number of bars averaged before Wilder smoothing starts.
pub const RSI_WARMUP_BARS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiPoint {
    pub smma_up: f64,
    pub smma_down: f64,
    pub rsi: f64,
}

#[derive(Debug, Clone)]
pub struct RsiState {
    weight: f64,
    index: usize,
    prev_close: f64,
    sum_up: f64,
    sum_down: f64,
    smma_up: f64,
    smma_down: f64,
}

impl RsiState {
    pub fn seed(period: usize, close: f64) -> (Self, RsiPoint) {
        let state = RsiState {
            weight: 1.0 / period as f64,
            index: 0,
            prev_close: close,
            sum_up: 0.0,
            sum_down: 0.0,
            smma_up: 0.0,
            smma_down: 0.0,
        };
        let point = RsiPoint {
            smma_up: 0.0,
            smma_down: 0.0,
            rsi: 0.0,
        };
        (state, point)
    }

    pub fn step(&mut self, close: f64) -> RsiPoint {
        self.index += 1;
        let up = (close - self.prev_close).max(0.0);
        let down = (self.prev_close - close).max(0.0);
        self.prev_close = close;
        self.sum_up += up;
        self.sum_down += down;

        if self.index < RSI_WARMUP_BARS {
            self.smma_up = self.sum_up / self.index as f64;
            self.smma_down = self.sum_down / self.index as f64;
            return RsiPoint {
                smma_up: self.smma_up,
                smma_down: self.smma_down,
                rsi: 0.0,
            };
        }

        self.smma_up = self.weight * up + (1.0 - self.weight) * self.smma_up;
        self.smma_down = self.weight * down + (1.0 - self.weight) * self.smma_down;
        RsiPoint {
            smma_up: self.smma_up,
            smma_down: self.smma_down,
            rsi: relative_strength_index(self.smma_up, self.smma_down),
        }
    }
}

pub fn relative_strength_index(smma_up: f64, smma_down: f64) -> f64 {
    if smma_down == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + smma_up / smma_down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn run(closes: &[f64]) -> Vec<RsiPoint> {
        let (mut state, first) = RsiState::seed(DEFAULT_RSI_PERIOD, closes[0]);
        let mut points = vec![first];
        for &c in &closes[1..] {
            points.push(state.step(c));
        }
        points
    }

    #[test]
    fn warmup_uses_simple_average() {
        let points = run(&[10.0, 12.0, 11.0]);
        assert_eq!(points[0].smma_up, 0.0);
        assert_abs_diff_eq!(points[1].smma_up, 2.0);
        assert_abs_diff_eq!(points[1].smma_down, 0.0);
        assert_abs_diff_eq!(points[2].smma_up, 1.0);
        assert_abs_diff_eq!(points[2].smma_down, 0.5);
        assert!(points.iter().all(|p| p.rsi == 0.0));
    }

    #[test]
    fn rsi_undefined_before_warmup_ends() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let points = run(&closes);
        for p in &points[..RSI_WARMUP_BARS] {
            assert_eq!(p.rsi, 0.0);
        }
        assert!(points[RSI_WARMUP_BARS].rsi > 0.0);
    }

    #[test]
    fn wilder_step_after_warmup() {
        let closes: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let points = run(&closes);
        let w = 1.0 / 14.0;
        let prev = points[13];
        // bar 14 is even: close 10 after 11 -> down move of 1
        let up = w * 0.0 + (1.0 - w) * prev.smma_up;
        let down = w * 1.0 + (1.0 - w) * prev.smma_down;
        assert_abs_diff_eq!(points[14].smma_up, up, epsilon = 1e-12);
        assert_abs_diff_eq!(points[14].smma_down, down, epsilon = 1e-12);
        assert_abs_diff_eq!(
            points[14].rsi,
            100.0 - 100.0 / (1.0 + up / down),
            epsilon = 1e-9
        );
    }

    #[test]
    fn no_losses_clamps_to_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let points = run(&closes);
        for p in &points[RSI_WARMUP_BARS..] {
            assert_eq!(p.smma_down, 0.0);
            assert_eq!(p.rsi, 100.0);
        }
    }

    #[test]
    fn flat_prices_clamp_to_100() {
        let points = run(&[50.0; 20]);
        assert_eq!(points[19].rsi, 100.0);
        assert!(!points[19].rsi.is_nan());
    }

    #[test]
    fn no_gains_gives_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let points = run(&closes);
        assert_abs_diff_eq!(points[19].rsi, 0.0);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i % 7) as f64 - 3.0) * 2.0)
            .collect();
        for p in run(&closes) {
            assert!((0.0..=100.0).contains(&p.rsi), "RSI {} out of range", p.rsi);
        }
    }
}
