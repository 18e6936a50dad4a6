//! Report output port trait.

use std::path::Path;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::SigtraderError;

/// Port for writing a finished run somewhere a presentation layer can read it.
pub trait ReportPort {
    /// Returns the paths written.
    fn write(
        &self,
        run: &BacktestRun,
        output_stem: &Path,
    ) -> Result<Vec<std::path::PathBuf>, SigtraderError>;
}
