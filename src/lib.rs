pub mod board;
pub mod display;
pub mod engine;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod player;
pub mod protocol;

#[cfg(target_arch = "wasm32")]
mod wasm_api;
