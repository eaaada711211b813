pub mod about;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod shell;
pub mod storage;

pub use engine::{DayTuning, Field, TargetEngine};
pub use session::Session;
pub use shell::{GameShell, ShellView, Sound};
