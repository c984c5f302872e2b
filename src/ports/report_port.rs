//! Report output port trait.

use crate::domain::analyzed::BarField;
use crate::domain::error::MacdrankError;
use crate::domain::series::SymbolSeries;
use crate::domain::simulation::SimulationReport;

/// Port for writing simulation and analysis results.
pub trait ReportPort {
    /// Every trade of every completed trial.
    fn write_trades(&self, report: &SimulationReport, output_path: &str) -> Result<(), MacdrankError>;

    /// Per-step equity of every completed trial.
    fn write_equity(&self, report: &SimulationReport, output_path: &str) -> Result<(), MacdrankError>;

    /// Selected fields of one analyzed series, one row per bar.
    fn write_series(
        &self,
        series: &SymbolSeries,
        fields: &[BarField],
        output_path: &str,
    ) -> Result<(), MacdrankError>;
}
