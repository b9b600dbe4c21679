use serde::Serialize;
use sqlx::FromRow;

use crate::geometry::{GeometryError, Polygon};

/// A stored land parcel. `id` and `owner` never change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub id: i64,
    pub name: String,
    pub geometry: Polygon,
    pub owner: String,
}

/// Everything needed to insert a plot; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPlot {
    pub name: String,
    pub geometry: Polygon,
    pub owner: String,
}

/// Validated field replacements for an update. `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct PlotChanges {
    pub name: Option<String>,
    pub geometry: Option<Polygon>,
}

impl PlotChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.geometry.is_none()
    }

    pub fn apply_to(&self, plot: &mut Plot) {
        if let Some(name) = &self.name {
            plot.name = name.clone();
        }
        if let Some(geometry) = &self.geometry {
            plot.geometry = geometry.clone();
        }
    }
}

/// Raw `plots` row with the geometry selected as WKT (`ST_AsText`).
#[derive(Debug, FromRow)]
pub struct PlotRow {
    pub id: i64,
    pub plot_name: String,
    pub plot_geometry: String,
    pub plot_owner: String,
}

impl TryFrom<PlotRow> for Plot {
    type Error = GeometryError;

    fn try_from(row: PlotRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.plot_name,
            geometry: Polygon::parse(&row.plot_geometry)?,
            owner: row.plot_owner,
        })
    }
}

/// List entry for `GET /plots/:username`: ring coordinates plus computed area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSummary {
    pub id: i64,
    pub plot_name: String,
    pub plot_geometry: Vec<[f64; 2]>,
    pub plot_area: f64,
}

impl From<&Plot> for PlotSummary {
    fn from(plot: &Plot) -> Self {
        Self {
            id: plot.id,
            plot_name: plot.name.clone(),
            plot_geometry: plot.geometry.coordinates(),
            plot_area: plot.geometry.area(),
        }
    }
}
