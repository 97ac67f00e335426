use dioxus::prelude::*;
use tracing::error;

mod api;
mod components;
mod config;
mod db;
mod diagnostics;
mod forms;
mod sync;
mod utils;

use api::Backend;
use components::{AppView, Icon};
use config::AppConfig;

const APP_CSS: Asset = asset!("/assets/styling/app.css");
const TAILWIND_CSS: Asset = asset!("/assets/tailwind.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let config = use_hook(|| {
        AppConfig::from_env().map_err(|err| {
            error!(error = %err, "Configuration is incomplete, refusing to start");
            err.to_string()
        })
    });

    rsx! {
        document::Meta { name: "theme-color", content: "#10b981" }
        document::Meta { name: "mobile-web-app-capable", content: "yes" }
        document::Meta { name: "apple-mobile-web-app-title", content: "Music Collaborator" }

        document::Stylesheet { href: TAILWIND_CSS }
        document::Stylesheet { href: APP_CSS }

        {match config {
            Ok(config) => rsx! { ConnectedApp { config } },
            Err(message) => rsx! { FatalConfig { message } },
        }}
    }
}

#[component]
fn ConnectedApp(config: AppConfig) -> Element {
    use_context_provider(|| Backend::connect(&config));

    rsx! {
        Router::<AppView> {}
    }
}

/// Shown instead of the app when the hosted-service settings are missing.
#[component]
fn FatalConfig(message: String) -> Element {
    rsx! {
        div { class: "min-h-screen flex items-center justify-center px-4 text-white",
            div { class: "max-w-md rounded-2xl bg-zinc-900 border border-red-500/40 p-8 text-center",
                Icon { name: "alert".to_string(), class: "w-10 h-10 text-red-400 mx-auto mb-4".to_string() }
                h1 { class: "text-xl font-semibold mb-2", "Configuration error" }
                p { class: "text-sm text-zinc-300 mb-4", "{message}" }
                p { class: "text-xs text-zinc-500",
                    "Set FIREBASE_API_KEY and FIREBASE_PROJECT_ID, then rebuild."
                }
            }
        }
    }
}
