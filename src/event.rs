//! Lifecycle-event wire types
//!
//! Shapes consumed from and returned to the external lifecycle manager that
//! invokes the reconciler on resource create/update/delete. The target
//! property is variant-named (`BucketName` or `KeyId`), so resource
//! properties beyond the typed ones are kept as a raw map and looked up by
//! the grant spec's property name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle phase of the invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Properties attached to the lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceProperties {
    #[serde(rename = "RequestType")]
    pub request_type: RequestType,

    /// ARN of the distribution that must be allowed to act
    #[serde(rename = "CloudfrontDistributionArn")]
    pub distribution_arn: String,

    /// Remaining properties, including the variant-named target identifier
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl ResourceProperties {
    /// Look up a string property by name; empty strings count as missing
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// One reconciliation request from the lifecycle manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    #[serde(rename = "ResourceProperties")]
    pub resource_properties: ResourceProperties,

    /// Identity assigned by a previous invocation, if any
    #[serde(
        rename = "PhysicalResourceId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub physical_resource_id: Option<String>,
}

/// Response returned to the lifecycle manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "PhysicalResourceId")]
    pub physical_resource_id: String,

    #[serde(rename = "Data")]
    pub data: Map<String, Value>,
}

impl HandlerResponse {
    pub fn new(physical_resource_id: String) -> Self {
        HandlerResponse {
            physical_resource_id,
            data: Map::new(),
        }
    }
}
