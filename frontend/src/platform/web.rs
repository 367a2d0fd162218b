//! Browser glue
//!
//! Frame waits go through `requestAnimationFrame`; Atoms can be mirrored into
//! zoon `Mutable`s so elements bind to them with signals.

use futures::channel::oneshot;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use super::FrameClock;
use crate::dataflow::{Atom, Subscription};
use crate::stores::{ComputedLayout, ModuleLayout};

/// Frame clock driven by the browser's animation frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationFrameClock;

impl FrameClock for AnimationFrameClock {
    async fn next_frame(&self) {
        let Some(window) = web_sys::window() else {
            log::warn!("No window available, skipping frame wait");
            return;
        };

        let (frame_sender, frame_receiver) = oneshot::channel::<()>();
        let callback = Closure::once(move |_timestamp: f64| {
            let _ = frame_sender.send(());
        });

        if let Err(error) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            log::warn!("requestAnimationFrame failed: {error:?}");
            return;
        }

        let _ = frame_receiver.await;
        drop(callback);
    }
}

/// Mirror an Atom into a zoon `Mutable`. Unsubscribe to stop mirroring.
pub fn mirror_atom<T>(atom: &Atom<T>) -> (zoon::Mutable<T>, Subscription)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let mutable = zoon::Mutable::new(atom.get_cloned());
    let sink = mutable.clone();
    let subscription = atom.subscribe(move |value| sink.set_neq(value.clone()));
    (mutable, subscription)
}

/// Rendered module layout as a zoon signal source.
///
/// The grid element binds to `signal_cloned()` of the returned `Mutable`.
pub fn rendered_layout_mutable(layout: &ModuleLayout) -> (zoon::Mutable<Option<ComputedLayout>>, Subscription) {
    mirror_atom(layout.rendered_atom())
}
