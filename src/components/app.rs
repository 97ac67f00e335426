use dioxus::prelude::*;
use std::rc::Rc;
use tracing::info;

use crate::api::Backend;
use crate::components::{view_label, AppView, Header, ToastHost, Toasts};
use crate::sync::{SessionObserver, SessionState, SessionUser};

/// Read-only view of the signed-in user, provided at the root of the tree.
#[derive(Clone, Copy, PartialEq)]
pub struct SessionSignal(pub Signal<SessionState>);

impl SessionSignal {
    pub fn state(&self) -> SessionState {
        (self.0)()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.0.read().user.clone()
    }
}

#[component]
pub fn AppShell() -> Element {
    let backend = use_context::<Backend>();
    let session = use_signal(SessionState::default);
    let toasts = use_signal(Vec::new);

    use_context_provider(|| SessionSignal(session));
    use_context_provider(|| Toasts(toasts));

    // Lives as long as the shell; dropping it unregisters from the provider.
    let _observer = use_hook(|| {
        let observer = SessionObserver::attach(backend.auth.as_ref(), move |state| {
            let mut session = session;
            session.set(state.clone());
        });

        let auth = backend.auth.clone();
        spawn(async move {
            auth.restore_session().await;
            info!("Session restore finished");
        });

        Rc::new(observer)
    });

    let view = use_route::<AppView>();

    rsx! {
        document::Title { "{view_label(&view)} | Music Collaborator" }
        div { class: "app-container min-h-screen flex flex-col text-white",
            Header {}
            main { class: "flex-1 overflow-y-auto main-scroll",
                div { class: "page-shell", Outlet::<AppView> {} }
            }
        }
        ToastHost {}
    }
}
