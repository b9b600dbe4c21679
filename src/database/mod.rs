pub mod manager;
pub mod memory;
pub mod models;
pub mod plots;
pub mod store;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{InMemoryPlotStore, InMemoryUserDirectory};
pub use plots::PgPlotStore;
pub use store::{Page, PlotStore, UserDirectory};
pub use users::PgUserDirectory;
