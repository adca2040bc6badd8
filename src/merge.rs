//! Safe policy merge
//!
//! The pure half of the reconciler: given a document already in memory, add
//! the variant's grant only if an equivalent statement is not present. No I/O
//! happens here, so the algorithm is testable without a store.

use crate::grant::GrantSpec;
use crate::policy::PolicyDocument;
use tracing::debug;

/// What [`merge_grant`] did to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// An equivalent statement was already present; the document is unchanged
    AlreadyPresent,
    /// The grant statement was appended; the document needs to be persisted
    Appended,
}

impl MergeOutcome {
    /// Whether the caller must write the document back
    pub fn needs_write(&self) -> bool {
        matches!(self, MergeOutcome::Appended)
    }
}

/// Add the grant described by `spec` to `document` unless an equivalent
/// statement already exists. Statements not matching the spec are never
/// touched or reordered.
pub fn merge_grant(
    document: &mut PolicyDocument,
    spec: &GrantSpec,
    resource_id: &str,
    distribution_arn: &str,
) -> MergeOutcome {
    if document.statement.iter().any(|stmt| spec.matches(stmt)) {
        debug!(sid = spec.sid, "policy already has the required statement");
        return MergeOutcome::AlreadyPresent;
    }

    document.add_statement(spec.statement_for(resource_id, distribution_arn));
    debug!(sid = spec.sid, "grant statement appended");
    MergeOutcome::Appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{OneOrMany, Statement};
    use proptest::prelude::*;

    fn unrelated_statement(sid: &str) -> Statement {
        Statement {
            sid: Some(sid.to_string()),
            ..Statement::allow(
                OneOrMany::One("s3:PutObject".to_string()),
                OneOrMany::One(format!("arn:aws:s3:::{}/*", sid)),
            )
        }
    }

    #[test]
    fn test_append_into_empty_document() {
        let spec = GrantSpec::cloudfront_bucket_access();
        let mut doc = PolicyDocument::new();

        let outcome = merge_grant(&mut doc, &spec, "bucket-A", "arn:distribution/XYZ");
        assert_eq!(outcome, MergeOutcome::Appended);
        assert!(outcome.needs_write());
        assert_eq!(doc.statement.len(), 1);
        assert!(spec.matches(&doc.statement[0]));
    }

    #[test]
    fn test_second_merge_is_noop() {
        let spec = GrantSpec::cloudfront_bucket_access();
        let mut doc = PolicyDocument::new();

        merge_grant(&mut doc, &spec, "bucket-A", "arn:distribution/XYZ");
        let snapshot = doc.clone();

        let outcome = merge_grant(&mut doc, &spec, "bucket-A", "arn:distribution/XYZ");
        assert_eq!(outcome, MergeOutcome::AlreadyPresent);
        assert!(!outcome.needs_write());
        assert_eq!(doc, snapshot);
    }

    #[test]
    fn test_existing_statements_preserved_in_order() {
        let spec = GrantSpec::cloudfront_key_access();
        let mut doc = PolicyDocument::new();
        doc.add_statement(unrelated_statement("EnableRootAccess"));
        doc.add_statement(unrelated_statement("AllowBackupRole"));

        let outcome = merge_grant(&mut doc, &spec, "key-1", "arn:distribution/XYZ");
        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(doc.statement.len(), 3);
        assert_eq!(doc.statement[0].sid(), Some("EnableRootAccess"));
        assert_eq!(doc.statement[1].sid(), Some("AllowBackupRole"));
        assert!(spec.matches(&doc.statement[2]));
    }

    #[test]
    fn test_matching_sid_with_other_principal_still_appends() {
        // A statement reusing our Sid for a different service is not ours;
        // the grant must still be added alongside it.
        let spec = GrantSpec::cloudfront_bucket_access();
        let mut doc = PolicyDocument::new();
        let mut impostor = unrelated_statement("ignored");
        impostor.sid = Some(spec.sid.to_string());
        doc.add_statement(impostor);

        let outcome = merge_grant(&mut doc, &spec, "bucket-A", "arn:distribution/XYZ");
        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(doc.statement.len(), 2);
    }

    proptest! {
        // Merging twice into a document of arbitrary unrelated statements
        // equals merging once, and never disturbs the existing statements.
        #[test]
        fn prop_merge_idempotent(sids in proptest::collection::vec("[A-Za-z][A-Za-z0-9]{0,15}", 0..8)) {
            let spec = GrantSpec::cloudfront_bucket_access();
            let mut doc = PolicyDocument::new();
            for sid in &sids {
                doc.add_statement(unrelated_statement(sid));
            }
            let original = doc.statement.clone();

            merge_grant(&mut doc, &spec, "bucket-A", "arn:distribution/XYZ");
            let once = doc.clone();
            merge_grant(&mut doc, &spec, "bucket-A", "arn:distribution/XYZ");

            prop_assert_eq!(&doc, &once);
            prop_assert_eq!(doc.statement.len(), original.len() + 1);
            prop_assert_eq!(&doc.statement[..original.len()], &original[..]);
        }
    }
}
