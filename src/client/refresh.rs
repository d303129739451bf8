//! Client-side token refresh.
//!
//! Runs once after mount when the page was rendered with the refresh flag.
//! Every step is sequential; nothing is retried and no error escapes.

use std::sync::Arc;
use tracing::{debug, warn};

use super::local_cart::LocalCartStore;
use super::site::SiteClient;
use crate::backend::{BackendClient, BackendError};
use crate::bootstrap::Hydration;
use crate::identity::Identity;
use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed,
}

/// Both clients should share one cookie jar: the backend reads the refresh
/// cookie from it and the site stores the renewed access cookie in it.
pub struct RefreshOrchestrator {
    backend: BackendClient,
    site: SiteClient,
    local_cart: Arc<dyn LocalCartStore>,
}

impl RefreshOrchestrator {
    pub fn new(backend: BackendClient, site: SiteClient, local_cart: Arc<dyn LocalCartStore>) -> Self {
        Self {
            backend,
            site,
            local_cart,
        }
    }

    /// Exchange the refresh cookie and store the new access cookie.
    async fn exchange(&self) -> Result<Identity, BackendError> {
        let response = self.backend.refresh().await?;
        if response.status != 200 {
            return Err(BackendError::Status(response.status));
        }

        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BackendError::Decode("missing accessToken".into()))?;
        let user = response
            .user
            .ok_or_else(|| BackendError::Decode("missing user".into()))?;

        self.site.store_access_token(&access_token).await?;
        Ok(user)
    }

    fn restore_local_cart(&self, ctx: &mut SessionContext) {
        match self.local_cart.load() {
            Ok(items) if !items.is_empty() => ctx.cart_data = items,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read local cart"),
        }
    }

    /// Refresh the session in place. On failure only an empty cart may be
    /// filled from local storage; everything else keeps its prior value.
    pub async fn run(&self, ctx: &mut SessionContext) -> RefreshOutcome {
        match self.exchange().await {
            Ok(user) => {
                ctx.cart_data = user.cart.clone();
                ctx.enrolled_courses = user.enrolled_courses.clone();
                ctx.user_data = Some(user);
                if ctx.cart_data.is_empty() {
                    self.restore_local_cart(ctx);
                }
                debug!("Session refreshed");
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                debug!(error = %e, "Session refresh failed");
                if ctx.cart_data.is_empty() {
                    self.restore_local_cart(ctx);
                }
                RefreshOutcome::Failed
            }
        }
    }

    /// Take over the server-rendered state, refreshing first when the page
    /// asked for it.
    pub async fn mount(&self, hydration: Hydration) -> SessionContext {
        let mut ctx = hydration.state;
        if hydration.refresh {
            self.run(&mut ctx).await;
        }
        ctx
    }

    /// Persist the current cart to device storage.
    pub fn persist_cart(&self, ctx: &SessionContext) {
        if let Err(e) = self.local_cart.save(&ctx.cart_data) {
            warn!(error = %e, "Failed to write local cart");
        }
    }
}
