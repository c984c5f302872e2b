//! Aggregate statistics over completed trials.

/// Outcome distribution of a simulation run.
///
/// Amounts are signed profit and loss relative to the starting cash: a losing
/// trial contributes a negative amount.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub starting_cash: f64,
    pub completed_trials: usize,
    pub skipped_trials: usize,
    pub losses: usize,
    pub gains: usize,
    pub doubled: usize,
    pub tripled: usize,
    pub tenfold: usize,
    pub loss_percent: f64,
    pub doubled_percent: f64,
    pub tripled_percent: f64,
    pub tenfold_percent: f64,
    pub average_loss_amount: f64,
    pub average_gain_amount: f64,
    pub expected_amount: f64,
    pub expected_return: f64,
}

impl SimulationSummary {
    /// Summarise the final total assets of each completed trial.
    pub fn compute(totals: &[f64], starting_cash: f64, skipped_trials: usize) -> Self {
        let completed = totals.len();

        let mut losses = 0;
        let mut gains = 0;
        let mut doubled = 0;
        let mut tripled = 0;
        let mut tenfold = 0;
        let mut loss_sum = 0.0;
        let mut gain_sum = 0.0;

        for &total in totals {
            let amount = total - starting_cash;
            if total < starting_cash {
                losses += 1;
                loss_sum += amount;
            } else {
                gains += 1;
                gain_sum += amount;
                if total > 2.0 * starting_cash {
                    doubled += 1;
                }
                if total > 3.0 * starting_cash {
                    tripled += 1;
                }
                if total > 10.0 * starting_cash {
                    tenfold += 1;
                }
            }
        }

        let percent = |count: usize| {
            if completed == 0 {
                0.0
            } else {
                count as f64 * 100.0 / completed as f64
            }
        };
        let average = |sum: f64, count: usize| if count == 0 { 0.0 } else { sum / count as f64 };

        let loss_percent = percent(losses);
        let average_loss_amount = average(loss_sum, losses);
        let average_gain_amount = average(gain_sum, gains);
        let expected_amount = if completed == 0 {
            0.0
        } else {
            loss_percent * average_loss_amount / 100.0
                + (1.0 - loss_percent / 100.0) * average_gain_amount
        };

        SimulationSummary {
            starting_cash,
            completed_trials: completed,
            skipped_trials,
            losses,
            gains,
            doubled,
            tripled,
            tenfold,
            loss_percent,
            doubled_percent: percent(doubled),
            tripled_percent: percent(tripled),
            tenfold_percent: percent(tenfold),
            average_loss_amount,
            average_gain_amount,
            expected_amount,
            expected_return: expected_amount / starting_cash,
        }
    }
}
