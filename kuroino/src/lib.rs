//! Scrollable attendance sheet: pixel/cell mapping, focus handling and a
//! terminal front end.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod mapper;
pub mod model;
pub mod render;
pub mod storage;
pub mod view;

pub use mapper::{CellAddress, Grid, Viewport, VisibleRange};
pub use view::{FocusObserver, PointerState, SheetView};
