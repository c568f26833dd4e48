//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use atelier_core::Locale;
use atelier_interpreter::CommandInterpreter;
use atelier_llm::CommandOracle;
use atelier_store::RecordStore;
use axum::extract::FromRef;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The interpreter pipeline handling command requests.
    pub interpreter: CommandInterpreter,
    /// Record store handle, used directly by readiness checks.
    pub store: Arc<dyn RecordStore>,
    /// Oracle handle, used for health reporting.
    pub oracle: Arc<dyn CommandOracle>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        oracle: Arc<dyn CommandOracle>,
        locale: Locale,
    ) -> Self {
        let interpreter =
            CommandInterpreter::new(store.clone(), oracle.clone()).with_locale(locale);
        Self {
            interpreter,
            store,
            oracle,
            start_time: Instant::now(),
        }
    }
}

// FromRef lets handlers extract just the piece of state they touch.

impl FromRef<AppState> for CommandInterpreter {
    fn from_ref(state: &AppState) -> Self {
        state.interpreter.clone()
    }
}

impl FromRef<AppState> for Arc<dyn RecordStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CommandOracle> {
    fn from_ref(state: &AppState) -> Self {
        state.oracle.clone()
    }
}

impl FromRef<AppState> for Instant {
    fn from_ref(state: &AppState) -> Self {
        state.start_time
    }
}
