//! Ready-made contexts for tests.

use crate::RecordingShaderListener;
use glsim::{Context, ContextDescriptor};

/// A fresh unshared context with default configuration. Installs the test
/// log subscriber on first use.
pub fn context() -> Context {
    glsim_core::logging::try_init();
    Context::new(ContextDescriptor::default().with_label("test"))
}

/// Two contexts sharing objects with each other.
pub fn shared_pair() -> (Context, Context) {
    let first = context();
    let second = Context::new_shared_with(&first, ContextDescriptor::default().with_label("shared"))
        .expect("sharing with a live context");
    (first, second)
}

/// A context reporting shader events to a fresh [`RecordingShaderListener`].
pub fn context_with_listener() -> (Context, RecordingShaderListener) {
    glsim_core::logging::try_init();
    let listener = RecordingShaderListener::new();
    let context = Context::new(
        ContextDescriptor::default()
            .with_label("shaders")
            .with_listener(listener.clone()),
    );
    (context, listener)
}
