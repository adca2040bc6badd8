//! Policy merge reconciler
//!
//! One [`Reconciler`] serves one grant variant against one policy store. An
//! invocation performs exactly one fetch and at most one persist; all
//! failures propagate to the invoking lifecycle manager, which owns retries.
//! Delete is acknowledged without touching the store: unwinding the grant is
//! out of scope.

use crate::error::{ReconcileError, ReconcileResult};
use crate::event::{HandlerResponse, LifecycleEvent, RequestType};
use crate::grant::{GrantSpec, DISTRIBUTION_ARN_PROPERTY};
use crate::merge::merge_grant;
use crate::policy::PolicyDocument;
use crate::store::PolicyStore;
use std::time::Duration;
use tracing::{debug, info};

/// Idempotent reconciler for one grant variant
pub struct Reconciler<S> {
    store: S,
    spec: GrantSpec,
    timeout: Option<Duration>,
}

impl<S: PolicyStore> Reconciler<S> {
    pub fn new(store: S, spec: GrantSpec) -> Self {
        Reconciler {
            store,
            spec,
            timeout: None,
        }
    }

    /// Bound the total duration of each invocation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn spec(&self) -> &GrantSpec {
        &self.spec
    }

    /// The store this reconciler operates on
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one lifecycle event
    pub async fn reconcile(&self, event: &LifecycleEvent) -> ReconcileResult<HandlerResponse> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.reconcile_inner(event))
                .await
                .map_err(|_| ReconcileError::Timeout(limit))?,
            None => self.reconcile_inner(event).await,
        }
    }

    async fn reconcile_inner(&self, event: &LifecycleEvent) -> ReconcileResult<HandlerResponse> {
        let props = &event.resource_properties;
        let resource_id = props
            .string_value(self.spec.target_property)
            .ok_or(ReconcileError::MissingProperty(self.spec.target_property))?;

        info!(
            resource_id,
            request_type = ?props.request_type,
            sid = self.spec.sid,
            "reconciling policy grant"
        );

        if props.request_type == RequestType::Delete {
            // Acknowledge without reading or writing; the grant stays behind.
            let physical_id = event
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| self.spec.physical_id(resource_id));
            return Ok(HandlerResponse::new(physical_id));
        }

        if props.distribution_arn.is_empty() {
            return Err(ReconcileError::MissingProperty(DISTRIBUTION_ARN_PROPERTY));
        }

        let mut document = match self.store.fetch(resource_id).await? {
            Some(raw) => PolicyDocument::from_json(&raw).map_err(|source| {
                ReconcileError::MalformedPolicy {
                    resource_id: resource_id.to_string(),
                    source,
                }
            })?,
            None => {
                debug!(resource_id, "no existing policy, starting from an empty document");
                PolicyDocument::new()
            }
        };

        let outcome = merge_grant(
            &mut document,
            &self.spec,
            resource_id,
            &props.distribution_arn,
        );

        if outcome.needs_write() {
            self.store
                .persist(resource_id, &document.to_json()?)
                .await?;
            info!(resource_id, sid = self.spec.sid, "policy updated");
        } else {
            info!(resource_id, sid = self.spec.sid, "policy already satisfied");
        }

        Ok(HandlerResponse::new(self.spec.physical_id(resource_id)))
    }
}
