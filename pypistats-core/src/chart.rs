//! Rendering interface for pivoted series

use crate::error::Result;
use crate::pivot::PivotSeries;

/// Capability to draw one line chart from pivoted series.
///
/// Axis labels are the warehouse column names of the resolved date and
/// measure fields. Implementations draw one line per category, keyed in a
/// legend by the category value, with the y axis starting at zero. The
/// aggregator guarantees every series covers the same x buckets, so a
/// renderer may take its x axis from any one of them.
pub trait ChartRenderer {
    fn render(&mut self, series: &[PivotSeries], x_label: &str, y_label: &str) -> Result<()>;
}
