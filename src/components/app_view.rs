//! Routes of the application, all rendered inside the shell layout.

use dioxus::prelude::*;

use crate::components::views::{HomeView, LoginView, PlaylistDetailView};
use crate::components::AppShell;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum AppView {
    #[layout(AppShell)]
        #[route("/")]
        HomeView {},
        #[route("/login")]
        LoginView {},
        #[route("/playlist/:id")]
        PlaylistDetailView { id: String },
}

pub fn view_label(view: &AppView) -> &'static str {
    match view {
        AppView::HomeView {} => "Playlists",
        AppView::LoginView {} => "Log in",
        AppView::PlaylistDetailView { .. } => "Playlist",
    }
}
