//! UI layer: app shell, forms, toast, and result cards.

pub mod app;

pub use app::CoachApp;
