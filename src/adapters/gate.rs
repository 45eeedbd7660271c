//! A pausable checkpoint for mock adapters.
//!
//! Mocks call `pass()` before answering. Tests close the gate to hold a
//! call in flight, wait until it has `arrived`, do something else, then
//! `release` it.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy)]
struct GateState {
    open: bool,
    arrivals: usize,
}

/// Open/closed checkpoint that counts the calls reaching it.
#[derive(Debug)]
pub struct Gate {
    state: watch::Sender<GateState>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::opened()
    }
}

impl Gate {
    fn with_state(open: bool) -> Self {
        let (state, _) = watch::channel(GateState { open, arrivals: 0 });
        Self { state }
    }

    /// A gate that lets every call straight through.
    pub fn opened() -> Self {
        Self::with_state(true)
    }

    /// A gate that holds calls until `release`.
    pub fn closed() -> Self {
        Self::with_state(false)
    }

    /// Hold subsequent calls.
    pub fn close(&self) {
        self.state.send_modify(|state| state.open = false);
    }

    /// Let held and subsequent calls through.
    pub fn release(&self) {
        self.state.send_modify(|state| state.open = true);
    }

    /// Number of calls that have reached the gate so far.
    pub fn arrivals(&self) -> usize {
        self.state.borrow().arrivals
    }

    /// Record an arrival and wait until the gate is open.
    pub async fn pass(&self) {
        self.state.send_modify(|state| state.arrivals += 1);
        let mut state = self.state.subscribe();
        // The sender lives in `self`, so this only returns once open.
        let _ = state.wait_for(|state| state.open).await;
    }

    /// Wait until at least `count` calls have reached the gate.
    pub async fn arrived(&self, count: usize) {
        let mut state = self.state.subscribe();
        let _ = state.wait_for(|state| state.arrivals >= count).await;
    }
}
