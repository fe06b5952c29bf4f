//! The cart synchronization engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};

use greengrocer_core::{CartTotals, LineId, LineItem, Product, SessionState, cart_totals};

use crate::api::CartApi;
use crate::error::CartError;
use crate::storage::KeyValueStore;

use super::repository::{CartRepository, LocalRepository, RemoteRepository, RetryPolicy};

/// Keeps the in-memory cart consistent with whichever authority is live.
///
/// Mode is selected by the observed [`SessionState`]: guests mutate the
/// persistent local store, authenticated sessions go through the remote cart
/// service with a refetch after every mutation. Reads ([`Self::items`],
/// [`Self::totals`]) are cheap and synchronous; totals are recomputed from
/// the line collection on every call, never cached.
///
/// Cheap to clone; clones share state.
pub struct CartSyncEngine<C, K> {
    inner: Arc<EngineInner<C, K>>,
}

impl<C, K> Clone for CartSyncEngine<C, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct EngineInner<C, K> {
    local: LocalRepository<K>,
    remote: RemoteRepository<C>,
    state: Mutex<EngineState>,
    /// Monotonic sequence for snapshot application. Concurrent mutations can
    /// complete out of order; a snapshot older than the last applied one is
    /// dropped instead of overwriting newer state.
    issued: AtomicU64,
}

#[derive(Debug)]
struct EngineState {
    session: SessionState,
    items: Vec<LineItem>,
    applied_seq: u64,
}

impl<C: CartApi, K: KeyValueStore> CartSyncEngine<C, K> {
    /// Create an engine in guest mode with an empty in-memory cart.
    ///
    /// No I/O happens here; call [`Self::refresh`] to load the active
    /// authority's cart.
    pub fn new(store: K, api: C, policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                local: LocalRepository::new(store),
                remote: RemoteRepository::new(api, policy),
                state: Mutex::new(EngineState {
                    session: SessionState::Guest,
                    items: Vec::new(),
                    applied_seq: 0,
                }),
                issued: AtomicU64::new(0),
            }),
        }
    }

    // =========================================================================
    // Read-only derived state
    // =========================================================================

    /// Current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.lock_state().items.clone()
    }

    /// Totals recomputed from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        cart_totals(&self.lock_state().items)
    }

    /// The session state the engine last observed.
    #[must_use]
    pub fn session(&self) -> SessionState {
        self.lock_state().session
    }

    // =========================================================================
    // Session transitions
    // =========================================================================

    /// Observe a session transition and reconcile.
    ///
    /// On login the guest cart is merged into the remote cart: each line is
    /// pushed remotely, lines that fail to push stay in local storage, and
    /// the engine then loads the remote cart. On logout the persisted guest
    /// cart becomes live again.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::FetchFailed`] if the newly live authority cannot
    /// be loaded; the in-memory cart is empty in that case.
    #[instrument(skip(self))]
    pub async fn set_session(&self, session: SessionState) -> Result<(), CartError> {
        let previous = {
            let mut state = self.lock_state();
            std::mem::replace(&mut state.session, session)
        };

        if !previous.is_authenticated() && session.is_authenticated() {
            self.merge_guest_cart().await;
        }

        self.refresh().await
    }

    /// Reload the cart from the active authority, replacing in-memory state.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::FetchFailed`] if the remote cart stays
    /// unreachable through the retry policy; the engine falls back to an
    /// empty cart.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CartError> {
        let seq = self.next_seq();
        let result = self.active_repository().load().await;
        self.finish(seq, result)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the remote authority rejects the mutation or
    /// cannot be refetched afterwards. Guest-mode adds cannot fail.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: &Product, quantity: u32) -> Result<(), CartError> {
        let seq = self.next_seq();
        let result = self.active_repository().add_item(product, quantity).await;
        self.finish(seq, result)
    }

    /// Set a line's quantity; 0 removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the remote authority rejects the mutation or
    /// cannot be refetched afterwards.
    #[instrument(skip(self), fields(line = %line_id))]
    pub async fn update_item(&self, line_id: &LineId, quantity: u32) -> Result<(), CartError> {
        let seq = self.next_seq();
        let result = self
            .active_repository()
            .update_item(line_id, quantity)
            .await;
        self.finish(seq, result)
    }

    /// Remove a line; removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the remote authority rejects the mutation or
    /// cannot be refetched afterwards.
    #[instrument(skip(self), fields(line = %line_id))]
    pub async fn remove_item(&self, line_id: &LineId) -> Result<(), CartError> {
        let seq = self.next_seq();
        let result = self.active_repository().remove_item(line_id).await;
        self.finish(seq, result)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if the remote authority rejects the clear for a
    /// reason other than not supporting it.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        let seq = self.next_seq();
        let result = self.active_repository().clear().await;
        self.finish(seq, result)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn active_repository(&self) -> &dyn CartRepository {
        if self.session().is_authenticated() {
            &self.inner.remote
        } else {
            &self.inner.local
        }
    }

    /// Push every persisted guest line to the remote cart.
    ///
    /// Lines the service rejects stay in local storage so nothing is lost;
    /// everything else leaves the guest cart for good.
    async fn merge_guest_cart(&self) {
        let guest_items = self.inner.local.persisted();
        if guest_items.is_empty() {
            return;
        }

        info!(lines = guest_items.len(), "merging guest cart into remote cart");
        let mut kept = Vec::new();
        for line in guest_items {
            if let Err(e) = self
                .inner
                .remote
                .push_item(line.product_id, line.quantity)
                .await
            {
                warn!(
                    product = %line.product_id,
                    detail = e.detail().unwrap_or_default(),
                    "guest line not accepted by remote cart, keeping it locally"
                );
                kept.push(line);
            }
        }
        self.inner.local.persist(&kept);
    }

    fn finish(&self, seq: u64, result: Result<Vec<LineItem>, CartError>) -> Result<(), CartError> {
        match result {
            Ok(items) => {
                self.apply_snapshot(seq, items);
                Ok(())
            }
            Err(CartError::FetchFailed) => {
                // The remote cart is unreachable; an empty cart is the
                // documented fallback.
                self.apply_snapshot(seq, Vec::new());
                Err(CartError::FetchFailed)
            }
            Err(e) => Err(e),
        }
    }

    fn apply_snapshot(&self, seq: u64, items: Vec<LineItem>) {
        let mut state = self.lock_state();
        if seq <= state.applied_seq {
            debug!(
                seq,
                applied = state.applied_seq,
                "dropping stale cart snapshot"
            );
            return;
        }
        state.applied_seq = seq;
        state.items = items;
    }

    fn next_seq(&self) -> u64 {
        self.inner.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
