pub mod controller;
pub mod engine;
pub mod player;
pub mod progress;
