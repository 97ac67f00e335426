//! The single `<audio>` element shared by every playlist view.

use tracing::debug;

use crate::sync::MediaElement;

#[cfg(target_arch = "wasm32")]
use dioxus::core::{Runtime, RuntimeGuard};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

#[cfg(target_arch = "wasm32")]
const AUDIO_ELEMENT_ID: &str = "music-collaborator-audio";

#[cfg(target_arch = "wasm32")]
pub fn get_or_create_audio_element() -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(AUDIO_ELEMENT_ID);
    audio.set_attribute("preload", "metadata").ok()?;
    document.body()?.append_child(&audio).ok()?;

    Some(audio)
}

/// [`MediaElement`] backed by the page's shared audio element.
pub struct HtmlAudio {
    #[cfg(target_arch = "wasm32")]
    element: Option<HtmlAudioElement>,
}

impl HtmlAudio {
    pub fn shared() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            element: get_or_create_audio_element(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl MediaElement for HtmlAudio {
    fn load(&mut self, url: &str) {
        if let Some(audio) = &self.element {
            audio.set_src(url);
        }
    }

    fn play(&mut self) {
        if let Some(audio) = &self.element {
            if audio.play().is_err() {
                debug!("Audio element refused to play");
            }
        }
    }

    fn pause(&mut self) {
        if let Some(audio) = &self.element {
            let _ = audio.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(audio) = &self.element {
            let _ = audio.pause();
            let _ = audio.remove_attribute("src");
            audio.load();
        }
    }
}

// Desktop builds and tests have no DOM; playback is a logged no-op.
#[cfg(not(target_arch = "wasm32"))]
impl MediaElement for HtmlAudio {
    fn load(&mut self, url: &str) {
        debug!(url, "load");
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {
        debug!("stop");
    }
}

/// Keeps an `ended` listener on the shared element until dropped.
pub struct EndedListener {
    #[cfg(target_arch = "wasm32")]
    registration: Option<(HtmlAudioElement, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl EndedListener {
    #[cfg(target_arch = "wasm32")]
    pub fn attach(on_ended: impl Fn() + 'static) -> Self {
        let Some(audio) = get_or_create_audio_element() else {
            return Self { registration: None };
        };
        let runtime = Runtime::current();
        let callback = Closure::wrap(Box::new(move |_e: web_sys::Event| {
            let _guard = RuntimeGuard::new(runtime.clone());
            on_ended();
        }) as Box<dyn FnMut(_)>);

        if audio
            .add_event_listener_with_callback("ended", callback.as_ref().unchecked_ref())
            .is_err()
        {
            return Self { registration: None };
        }
        Self {
            registration: Some((audio, callback)),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn attach(_on_ended: impl Fn() + 'static) -> Self {
        Self {}
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for EndedListener {
    fn drop(&mut self) {
        if let Some((audio, callback)) = self.registration.take() {
            let _ = audio
                .remove_event_listener_with_callback("ended", callback.as_ref().unchecked_ref());
        }
    }
}
