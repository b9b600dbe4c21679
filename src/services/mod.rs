pub mod plot_service;

pub use plot_service::{AuthPolicy, PlotError, PlotPatch, PlotService};
