//! A stateful cell over one owner's compiled payload.
//!
//! UI code polls the store and feeds whatever payload it got into the
//! view. Evaluation is cached on payload identity: feeding the same
//! string twice does no work, so the cell is safe to update on every
//! poll tick.

use crate::{EvalError, RenderFactory, evaluate};

/// Where the view currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// No payload has arrived yet.
    Pending,
    /// The last payload evaluated cleanly.
    Ready(T),
    /// The last payload failed evaluation.
    Failed(String),
}

/// Holds a factory and re-evaluates only when the payload changes.
pub struct ContentView<F: RenderFactory> {
    factory: F,
    last_payload: Option<String>,
    state: ViewState<Vec<F::Output>>,
}

impl<F: RenderFactory> ContentView<F> {
    /// Create an empty view around a factory.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            last_payload: None,
            state: ViewState::Pending,
        }
    }

    /// Current state, borrowed.
    pub fn state(&self) -> &ViewState<Vec<F::Output>> {
        &self.state
    }

    /// Feed the latest payload (or its absence) into the view.
    ///
    /// Returns `true` when the state was recomputed.
    pub fn update(&mut self, payload: Option<&str>) -> bool {
        match payload {
            None => {
                if self.last_payload.is_none() && matches!(self.state, ViewState::Pending) {
                    return false;
                }
                self.last_payload = None;
                self.state = ViewState::Pending;
                true
            }
            Some(payload) => {
                if self.last_payload.as_deref() == Some(payload) {
                    return false;
                }
                self.last_payload = Some(payload.to_string());
                self.state = match evaluate(payload, &self.factory) {
                    Ok(outputs) => ViewState::Ready(outputs),
                    Err(err) => {
                        log::warn!("payload evaluation failed: {err}");
                        ViewState::Failed(failure_message(&err))
                    }
                };
                true
            }
        }
    }
}

fn failure_message(err: &EvalError) -> String {
    match err {
        EvalError::Malformed(_) => "This content could not be displayed.".to_string(),
        EvalError::UnsupportedVersion(_) => {
            "This content needs a newer app version to display.".to_string()
        }
    }
}
