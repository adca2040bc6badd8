//! Grant templates for the two reconciler variants
//!
//! A [`GrantSpec`] bundles everything that differs between the bucket-policy
//! and key-policy reconcilers: the fixed statement ID, the action set, how the
//! resource ARNs are derived from the target, the lifecycle-event property
//! naming the target, and the physical-id prefix. The reconciliation loop
//! itself is variant-agnostic.

use crate::policy::{OneOrMany, Principal, Statement};
use serde_json::json;

/// Service principal granted access by every variant
pub const CLOUDFRONT_SERVICE: &str = "cloudfront.amazonaws.com";

/// Lifecycle-event property carrying the distribution ARN
pub const DISTRIBUTION_ARN_PROPERTY: &str = "CloudfrontDistributionArn";

/// How a variant derives statement resources from the target identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    /// The bucket ARN plus a wildcard over its objects
    BucketAndObjects,
    /// `*`, meaning the resource the policy is attached to
    AttachedResource,
}

impl ResourceScope {
    fn resources(&self, resource_id: &str) -> OneOrMany {
        match self {
            ResourceScope::BucketAndObjects => OneOrMany::Many(vec![
                format!("arn:aws:s3:::{}", resource_id),
                format!("arn:aws:s3:::{}/*", resource_id),
            ]),
            ResourceScope::AttachedResource => OneOrMany::One("*".to_string()),
        }
    }
}

/// Fixed per-variant parameters of the reconciler
#[derive(Debug, Clone)]
pub struct GrantSpec {
    /// Statement ID used as the idempotence key
    pub sid: &'static str,
    /// Actions granted to the service principal
    pub actions: &'static [&'static str],
    /// Resource derivation for the statement
    pub scope: ResourceScope,
    /// Lifecycle-event property naming the target resource
    pub target_property: &'static str,
    /// Prefix for synthesized physical identities
    pub physical_id_prefix: &'static str,
}

impl GrantSpec {
    /// Bucket variant: allow CloudFront to read objects and list the bucket
    pub fn cloudfront_bucket_access() -> Self {
        GrantSpec {
            sid: "AllowCloudfrontToAccessBucket",
            actions: &["s3:GetObject", "s3:ListBucket"],
            scope: ResourceScope::BucketAndObjects,
            target_property: "BucketName",
            physical_id_prefix: "s3-policy",
        }
    }

    /// Key variant: allow CloudFront to decrypt with and describe the key
    pub fn cloudfront_key_access() -> Self {
        GrantSpec {
            sid: "AllowCloudfrontToDecryptWithKey",
            actions: &["kms:Decrypt", "kms:DescribeKey"],
            scope: ResourceScope::AttachedResource,
            target_property: "KeyId",
            physical_id_prefix: "kms-policy",
        }
    }

    /// Build the statement this variant appends when the grant is missing
    pub fn statement_for(&self, resource_id: &str, distribution_arn: &str) -> Statement {
        Statement {
            sid: Some(self.sid.to_string()),
            principal: Some(Principal::service(CLOUDFRONT_SERVICE)),
            condition: Some(json!({
                "StringEquals": {
                    "AWS:SourceArn": distribution_arn,
                }
            })),
            ..Statement::allow(
                OneOrMany::Many(self.actions.iter().map(|a| a.to_string()).collect()),
                self.scope.resources(resource_id),
            )
        }
    }

    /// Idempotence predicate: a statement satisfies this grant when it carries
    /// both the variant Sid and the CloudFront service principal
    pub fn matches(&self, statement: &Statement) -> bool {
        statement.sid() == Some(self.sid)
            && statement
                .principal
                .as_ref()
                .is_some_and(|p| p.is_service(CLOUDFRONT_SERVICE))
    }

    /// Deterministic physical identity for the lifecycle manager
    pub fn physical_id(&self, resource_id: &str) -> String {
        format!("{}-{}", self.physical_id_prefix, resource_id)
    }
}
