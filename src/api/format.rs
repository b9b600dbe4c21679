use serde::Serialize;

use crate::database::models::Plot;

/// Wire format for a single plot returned by create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRecord {
    pub id: i64,
    pub plot_name: String,
    /// EWKT, e.g. `SRID=4326;POLYGON ((0 0, 0.1 0, ...))`
    pub plot_geometry: String,
    pub plot_owner: String,
}

impl From<&Plot> for PlotRecord {
    fn from(plot: &Plot) -> Self {
        Self {
            id: plot.id,
            plot_name: plot.name.clone(),
            plot_geometry: plot.geometry.to_ewkt(),
            plot_owner: plot.owner.clone(),
        }
    }
}
