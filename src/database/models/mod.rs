pub mod plot;
pub mod user;

pub use plot::{NewPlot, Plot, PlotChanges, PlotRow, PlotSummary};
pub use user::User;
