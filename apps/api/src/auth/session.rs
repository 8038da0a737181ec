//! Per-client auth state with an explicit lifecycle.
//!
//! Created anonymous, rebuilt on every session event and published over a
//! `watch` channel. Anything behind a `RoleGate` holds a `GatedArea` and
//! re-evaluates its decision whenever the state changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::gate::{AuthState, GateDecision, RoleGate};
use crate::auth::resolver::SessionResolver;
use crate::models::Session;

/// Session lifecycle events. The HTTP layer only signs in per request;
/// the rest arrive from long-lived clients.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    UserUpdated(Session),
    SignedOut,
    SessionExpired,
}

pub struct AuthSession {
    resolver: SessionResolver,
    state: watch::Sender<Arc<AuthState>>,
    generation: AtomicU64,
}

impl AuthSession {
    pub fn new(resolver: SessionResolver) -> Self {
        let (state, _) = watch::channel(Arc::new(AuthState::Anonymous));
        Self {
            resolver,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> Arc<AuthState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AuthState>> {
        self.state.subscribe()
    }

    pub fn gated(&self, gate: RoleGate) -> GatedArea {
        GatedArea {
            gate,
            state: self.subscribe(),
        }
    }

    /// Rebuilds the state for `event` and publishes it. If a newer event
    /// arrives while this one is still resolving, this result is dropped.
    pub async fn apply(&self, event: AuthEvent) -> Arc<AuthState> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let next = match event {
            AuthEvent::SignedIn(session)
            | AuthEvent::TokenRefreshed(session)
            | AuthEvent::UserUpdated(session) => {
                if session.is_expired_at(Utc::now()) {
                    warn!("Ignoring expired session for account {}", session.account.id);
                    AuthState::Anonymous
                } else {
                    AuthState::Authenticated(self.resolver.resolve(&session.account).await)
                }
            }
            AuthEvent::SignedOut | AuthEvent::SessionExpired => {
                info!("Auth state cleared");
                AuthState::Anonymous
            }
        };

        let next = Arc::new(next);
        let published = self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = next.clone();
            true
        });
        if !published {
            debug!("Discarding stale auth state (generation {generation})");
            return self.state();
        }
        next
    }
}

/// A role-restricted area that follows the auth state.
pub struct GatedArea {
    gate: RoleGate,
    state: watch::Receiver<Arc<AuthState>>,
}

impl GatedArea {
    pub fn decision(&self) -> GateDecision {
        self.gate.check(&self.state.borrow())
    }

    /// Waits for the next auth state change and re-evaluates. `None` once
    /// the owning session is gone.
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn next_decision(&mut self) -> Option<GateDecision> {
        self.state.changed().await.ok()?;
        Some(self.decision())
    }
}
