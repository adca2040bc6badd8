//! Idempotent CloudFront access-policy reconciler
//!
//! Grants a CloudFront distribution access to a storage resource by merging
//! one fixed, named statement into the resource's attached policy document,
//! without disturbing statements already present. Invoked by an external
//! lifecycle manager on resource create/update/delete events.
//!
//! ## Architecture
//!
//! - **[`PolicyDocument`]** — serde model of the IAM JSON policy shape;
//!   uninterpreted members ride along in flattened maps
//! - **[`GrantSpec`]** — per-variant statement template and match predicate
//!   (bucket policies vs. key policies)
//! - **[`merge_grant`]** — pure merge step, no I/O
//! - **[`PolicyStore`]** — fetch/persist seam; a missing document is `None`
//! - **[`Reconciler`]** — the lifecycle contract: one fetch, at most one
//!   persist, stable physical identity, delete as a no-op
//!
//! ## Example
//!
//! ```no_run
//! use cloudfront_policy_updater::{GrantSpec, MemoryPolicyStore, Reconciler};
//!
//! # tokio_test::block_on(async {
//! let reconciler = Reconciler::new(
//!     MemoryPolicyStore::new(),
//!     GrantSpec::cloudfront_bucket_access(),
//! );
//!
//! let event = serde_json::from_str(
//!     r#"{"ResourceProperties": {
//!         "BucketName": "geo-data-bucket",
//!         "CloudfrontDistributionArn": "arn:aws:cloudfront::123456789012:distribution/XYZ",
//!         "RequestType": "Create"
//!     }}"#,
//! ).unwrap();
//!
//! let response = reconciler.reconcile(&event).await.unwrap();
//! assert_eq!(response.physical_resource_id, "s3-policy-geo-data-bucket");
//! # });
//! ```

mod error;
mod event;
mod grant;
mod merge;
mod policy;
mod reconciler;
mod store;

pub use error::{ReconcileError, ReconcileResult, StoreError};
pub use event::{HandlerResponse, LifecycleEvent, RequestType, ResourceProperties};
pub use grant::{GrantSpec, ResourceScope, CLOUDFRONT_SERVICE, DISTRIBUTION_ARN_PROPERTY};
pub use merge::{merge_grant, MergeOutcome};
pub use policy::{Effect, OneOrMany, PolicyDocument, Principal, Statement, POLICY_VERSION};
pub use reconciler::Reconciler;
pub use store::{FsPolicyStore, MemoryPolicyStore, PolicyStore};
