pub mod allocation;
pub mod app;
pub mod audio;
pub mod catalog;
pub mod db;
pub mod ear;
pub mod feedback;
pub mod model;
pub mod output;
pub mod progress;
pub mod runner;
pub mod session;
pub mod skill;
pub mod store;
pub mod tui;
