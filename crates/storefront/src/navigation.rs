//! Navigation controller.
//!
//! Selects between two mutually exclusive screen graphs based on the session
//! gate: an unauthenticated flow (login/register) and an authenticated flow
//! (home/cart/proof-of-delivery). Swapping flows replaces the whole graph,
//! discarding the inactive subgraph's state; it never just pushes a screen
//! on top.
//!
//! After every navigation transition the gate re-reads token presence. The
//! check is cheap, and an unchanged flag never causes a graph swap, so
//! screens are not remounted redundantly.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::session::SessionGate;

/// Screens reachable while unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    /// Credential entry.
    Login,
    /// Account creation.
    Register,
}

/// Screens reachable while authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainScreen {
    /// Product catalog with filters.
    Home,
    /// Cart contents and totals.
    Cart,
    /// Delivery confirmation capture.
    ProofOfDelivery,
}

/// The active screen graph: which flow is live, and where in it we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenGraph {
    /// Login/register flow.
    Unauthenticated(AuthScreen),
    /// Home/cart/proof-of-delivery flow.
    Authenticated(MainScreen),
}

impl ScreenGraph {
    /// Root screen of the flow matching an authenticated flag.
    #[must_use]
    pub const fn root(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated(MainScreen::Home)
        } else {
            Self::Unauthenticated(AuthScreen::Login)
        }
    }

    /// Whether this graph is the authenticated flow.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Top-level navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// Initial token check still in flight; render a loading indicator.
    #[default]
    Resolving,
    /// A screen graph is live.
    Ready(ScreenGraph),
}

impl NavState {
    /// The live graph, if resolved.
    #[must_use]
    pub const fn graph(self) -> Option<ScreenGraph> {
        match self {
            Self::Resolving => None,
            Self::Ready(graph) => Some(graph),
        }
    }
}

/// Errors from navigation requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    /// The initial session check has not finished.
    #[error("navigation is still resolving the session")]
    Resolving,
    /// The requested screen belongs to the inactive flow.
    #[error("screen is not reachable from the current flow")]
    Unreachable,
}

/// Controller owning the navigation state machine.
///
/// Cheaply cloneable; all clones share the same state. Observers follow
/// changes through [`subscribe`](Self::subscribe); dropping the receiver
/// ends the subscription, so no callback can outlive its screen.
#[derive(Clone)]
pub struct NavigationController {
    inner: Arc<NavInner>,
}

struct NavInner {
    gate: SessionGate,
    state: Mutex<NavState>,
    tx: watch::Sender<NavState>,
}

impl NavigationController {
    /// Create a controller in the [`NavState::Resolving`] state.
    #[must_use]
    pub fn new(gate: SessionGate) -> Self {
        let (tx, _rx) = watch::channel(NavState::Resolving);
        Self {
            inner: Arc::new(NavInner {
                gate,
                state: Mutex::new(NavState::Resolving),
                tx,
            }),
        }
    }

    /// Resolve the session and enter the matching flow at its root.
    ///
    /// Idempotent: starting an already-started controller just re-derives
    /// the flow from the gate.
    pub async fn start(&self) -> NavState {
        let auth = self.inner.gate.resolve().await;
        let state = NavState::Ready(ScreenGraph::root(auth.is_authenticated()));
        self.set_state(state);
        info!(authenticated = auth.is_authenticated(), "navigation started");
        state
    }

    /// Current navigation state.
    #[must_use]
    pub fn current(&self) -> NavState {
        *self.lock_state()
    }

    /// Subscribe to navigation state changes.
    ///
    /// The receiver immediately holds the current state; only actual changes
    /// are published after that.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavState> {
        self.inner.tx.subscribe()
    }

    /// Navigate to a screen in the active flow.
    ///
    /// After the transition the gate re-reads token presence; if the
    /// authenticated flag changed (login, logout, external invalidation),
    /// the whole graph is swapped to the other flow's root and the previous
    /// flow's state is discarded.
    ///
    /// # Errors
    ///
    /// [`NavError::Resolving`] before [`start`](Self::start) completes, and
    /// [`NavError::Unreachable`] when the target belongs to the inactive
    /// flow.
    pub async fn navigate(&self, target: ScreenGraph) -> Result<NavState, NavError> {
        {
            let mut state = self.lock_state();
            let NavState::Ready(graph) = *state else {
                return Err(NavError::Resolving);
            };

            if graph.is_authenticated() != target.is_authenticated() {
                return Err(NavError::Unreachable);
            }

            *state = NavState::Ready(target);
        }
        self.publish();

        self.sync_with_gate().await;
        Ok(self.current())
    }

    /// Re-derive the flow from the gate without moving screens.
    ///
    /// This is the navigation-state-change hook: call it after any event
    /// that may have changed token presence (login completion, logout,
    /// external invalidation).
    pub async fn refresh(&self) -> NavState {
        self.sync_with_gate().await;
        self.current()
    }

    /// Re-check the gate and swap graphs if the authenticated flag no longer
    /// matches the active flow.
    async fn sync_with_gate(&self) {
        self.inner.gate.recheck().await;
        let authenticated = self.inner.gate.is_authenticated();

        let NavState::Ready(graph) = self.current() else {
            return;
        };
        if graph.is_authenticated() == authenticated {
            return;
        }

        debug!(authenticated, "auth flag changed, swapping screen graph");
        self.set_state(NavState::Ready(ScreenGraph::root(authenticated)));
    }

    fn set_state(&self, state: NavState) {
        *self.lock_state() = state;
        self.publish();
    }

    /// Publish the current state to subscribers, change-only.
    fn publish(&self) {
        let state = self.current();
        self.inner.tx.send_if_modified(|published| {
            if *published == state {
                false
            } else {
                *published = state;
                true
            }
        });
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
