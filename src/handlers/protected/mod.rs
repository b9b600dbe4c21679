// handlers/protected/mod.rs - endpoints that change existing plots
//
// The caller proves ownership with HTTP Basic, a bearer token issued by
// /token_delivery/, or the owner's password in the body.

pub mod plots;

pub use plots::{plot_delete, plot_update};
