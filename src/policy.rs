//! Access-policy document structure
//!
//! Mirrors the AWS IAM JSON policy shape (Version, Statement, Sid, Effect,
//! Principal, Action, Resource, Condition). Only the members the reconciler
//! interprets are typed; everything else is carried through flattened maps so
//! that statements written by other parties survive a read-modify-write
//! round-trip with their content intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Policy format version written into documents created by this crate
pub const POLICY_VERSION: &str = "2012-10-17";

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Allow the action
    Allow,
    /// Deny the action (takes precedence over Allow)
    Deny,
}

/// A string-valued member that IAM allows as either a scalar or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Iterate the values regardless of scalar/list form
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            OneOrMany::One(s) => std::slice::from_ref(s),
            OneOrMany::Many(v) => v.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.iter().any(|v| v == value)
    }
}

impl From<&str> for OneOrMany {
    fn from(s: &str) -> Self {
        OneOrMany::One(s.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(v: Vec<String>) -> Self {
        OneOrMany::Many(v)
    }
}

/// Statement principal: either a wildcard tag (`"*"`) or a keyed entity map
/// such as `{"Service": "cloudfront.amazonaws.com"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    Tag(String),
    Entries(Map<String, Value>),
}

impl Principal {
    /// Build a single-service principal
    pub fn service(service: &str) -> Self {
        let mut entries = Map::new();
        entries.insert("Service".to_string(), Value::String(service.to_string()));
        Principal::Entries(entries)
    }

    /// Check whether this principal names the given service, accepting both
    /// the scalar and the list form of the `Service` member
    pub fn is_service(&self, service: &str) -> bool {
        let Principal::Entries(entries) = self else {
            return false;
        };
        match entries.get("Service") {
            Some(Value::String(s)) => s == service,
            Some(Value::Array(values)) => {
                values.iter().any(|v| v.as_str() == Some(service))
            }
            _ => false,
        }
    }
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement ID, the uniqueness key for idempotence checks
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Effect of this statement
    #[serde(rename = "Effect")]
    pub effect: Effect,

    /// Principal this statement applies to
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    /// Actions this statement applies to
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany>,

    /// Resources this statement applies to
    #[serde(rename = "Resource", skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany>,

    /// Conditions for when this statement applies, kept as raw JSON
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,

    /// Members this reconciler does not interpret (NotAction, NotResource, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Statement {
    /// Create a new allow statement with no principal or condition
    pub fn allow(action: OneOrMany, resource: OneOrMany) -> Self {
        Statement {
            sid: None,
            effect: Effect::Allow,
            principal: None,
            action: Some(action),
            resource: Some(resource),
            condition: None,
            extra: Map::new(),
        }
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }
}

/// Complete access-policy document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Policy format version
    #[serde(rename = "Version")]
    pub version: String,

    /// Ordered list of policy statements
    #[serde(rename = "Statement", default)]
    pub statement: Vec<Statement>,

    /// Top-level members this reconciler does not interpret (Id, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PolicyDocument {
    /// Create a new empty document with the fixed format version
    pub fn new() -> Self {
        PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Append a statement to this document
    pub fn add_statement(&mut self, statement: Statement) {
        self.statement.push(statement);
    }

    /// Parse a document from its JSON string form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize this document to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document() {
        let doc = PolicyDocument::new();
        assert_eq!(doc.version, POLICY_VERSION);
        assert!(doc.statement.is_empty());
    }

    #[test]
    fn test_document_without_statements_parses() {
        let doc = PolicyDocument::from_json(r#"{"Version":"2012-10-17"}"#).unwrap();
        assert!(doc.statement.is_empty());
    }

    #[test]
    fn test_effect_serialization() {
        assert_eq!(serde_json::to_value(Effect::Allow).unwrap(), json!("Allow"));
        assert_eq!(serde_json::to_value(Effect::Deny).unwrap(), json!("Deny"));
    }

    #[test]
    fn test_principal_service_matching() {
        let scalar = Principal::service("cloudfront.amazonaws.com");
        assert!(scalar.is_service("cloudfront.amazonaws.com"));
        assert!(!scalar.is_service("lambda.amazonaws.com"));

        let list: Principal = serde_json::from_value(json!({
            "Service": ["logging.s3.amazonaws.com", "cloudfront.amazonaws.com"]
        }))
        .unwrap();
        assert!(list.is_service("cloudfront.amazonaws.com"));

        let wildcard: Principal = serde_json::from_value(json!("*")).unwrap();
        assert!(!wildcard.is_service("cloudfront.amazonaws.com"));
    }

    #[test]
    fn test_one_or_many_forms() {
        let one: OneOrMany = serde_json::from_value(json!("s3:GetObject")).unwrap();
        assert!(one.contains("s3:GetObject"));

        let many: OneOrMany =
            serde_json::from_value(json!(["s3:GetObject", "s3:ListBucket"])).unwrap();
        assert_eq!(many.iter().count(), 2);
        assert!(many.contains("s3:ListBucket"));
    }

    #[test]
    fn test_unknown_members_survive_roundtrip() {
        let raw = json!({
            "Version": "2012-10-17",
            "Id": "bucket-policy-1",
            "Statement": [{
                "Sid": "DenyInsecureTransport",
                "Effect": "Deny",
                "Principal": "*",
                "NotAction": "s3:GetObject",
                "Resource": "arn:aws:s3:::some-bucket/*",
                "Condition": {"Bool": {"aws:SecureTransport": "false"}}
            }]
        });

        let doc: PolicyDocument = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.extra.get("Id"), Some(&json!("bucket-policy-1")));
        assert_eq!(
            doc.statement[0].extra.get("NotAction"),
            Some(&json!("s3:GetObject"))
        );

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back, raw);
    }
}
