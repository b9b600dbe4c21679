// handlers/public/mod.rs - endpoints that never require a credential
//
// Plot creation accepts an optional one and only enforces it when
// `security.require_auth_for_create` is set.

pub mod plots;
pub mod system;
pub mod token;

pub use plots::{plot_create, plots_list};
pub use system::{health, root};
pub use token::token_delivery;
