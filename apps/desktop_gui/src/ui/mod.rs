//! UI layer for desktop GUI: app shell, plot decoding, and theme.

pub mod app;
pub mod plot;
pub mod theme;

pub use app::IncomeViewerApp;
