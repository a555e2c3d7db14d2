pub mod catalog;
pub mod config;
pub mod logging;
pub mod particles;
pub mod player;
pub mod search;
pub mod store;
pub mod util;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(not(target_arch = "wasm32"))]
pub mod backend;
