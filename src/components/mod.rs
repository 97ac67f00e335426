//! The components module contains all shared components for our app.

mod app;
mod app_view;
mod audio;
mod header;
mod icons;
mod modals;
mod toast;
pub mod views;

pub use app::*;
pub use app_view::*;
pub use audio::*;
pub use header::*;
pub use icons::*;
pub use modals::*;
pub use toast::*;
// Views are accessed via views::ViewName
