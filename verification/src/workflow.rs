//! The verification workflow engine.

use std::sync::Arc;

use crate::error::VerificationError;
use xskill_store::account::AccountStore;
use xskill_store::verification::{
    Evidence, NewVerificationRequest, VerificationRequestRecord, VerificationStore,
};
use xskill_types::{AccountId, MarketParams, RequestId, Timestamp, VerificationStatus};

/// A reviewer's verdict on a pending request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Orchestrates verification submissions and reviews, and answers the
/// teaching gate.
pub struct VerificationWorkflow<S> {
    store: Arc<S>,
}

impl<S> VerificationWorkflow<S>
where
    S: VerificationStore + AccountStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Submit evidence for review. At most one request per account can be
    /// pending; an approved account cannot re-apply.
    pub fn submit(
        &self,
        account: AccountId,
        evidence: Evidence,
        params: &MarketParams,
        now: Timestamp,
    ) -> Result<VerificationRequestRecord, VerificationError> {
        validate_evidence(&evidence, params)?;

        let applicant = self.store.get_account(account)?;
        if applicant.verification_status == VerificationStatus::Approved {
            return Err(VerificationError::AlreadyApproved(account.to_string()));
        }
        if self.store.pending_request_for(account)?.is_some() {
            return Err(VerificationError::AlreadyPending(account.to_string()));
        }

        let request = self.store.insert_request(NewVerificationRequest {
            account_id: account,
            evidence,
            created_at: now,
        })?;
        self.store
            .set_verification(account, false, VerificationStatus::Pending, now)?;

        tracing::info!(account = %account, request = %request.id, "verification submitted");
        Ok(request)
    }

    /// Review a pending request. Approval flips the account's teaching gate;
    /// rejection leaves it closed and allows resubmission.
    pub fn review(
        &self,
        request_id: RequestId,
        decision: ReviewDecision,
        reviewer: AccountId,
        notes: Option<String>,
        now: Timestamp,
    ) -> Result<VerificationRequestRecord, VerificationError> {
        let mut request = self.store.get_request(request_id)?;
        if request.status != VerificationStatus::Pending {
            return Err(VerificationError::NotPending {
                request: request_id.to_string(),
                status: format!("{:?}", request.status),
            });
        }
        if request.account_id == reviewer {
            return Err(VerificationError::SelfReview);
        }
        // The reviewer must be a real account.
        self.store.get_account(reviewer)?;

        let (status, verified) = match decision {
            ReviewDecision::Approve => (VerificationStatus::Approved, true),
            ReviewDecision::Reject => (VerificationStatus::Rejected, false),
        };
        request.status = status;
        request.reviewer_id = Some(reviewer);
        request.review_notes = notes;
        request.reviewed_at = Some(now);
        self.store.put_request(&request)?;
        self.store
            .set_verification(request.account_id, verified, status, now)?;

        tracing::info!(
            account = %request.account_id,
            request = %request_id,
            approved = verified,
            "verification reviewed"
        );
        Ok(request)
    }

    /// The teaching gate: true iff the account is verified.
    pub fn can_teach(&self, account: AccountId) -> Result<bool, VerificationError> {
        Ok(self.store.get_account(account)?.verified)
    }
}

fn validate_evidence(
    evidence: &Evidence,
    params: &MarketParams,
) -> Result<(), VerificationError> {
    if !is_url(&evidence.degree_url) {
        return Err(VerificationError::InvalidEvidence(
            "degree_url must be a valid URL".into(),
        ));
    }
    if evidence.certification_urls.is_empty() {
        return Err(VerificationError::InvalidEvidence(
            "at least one certification is required".into(),
        ));
    }
    if let Some(bad) = evidence.certification_urls.iter().find(|u| !is_url(u)) {
        return Err(VerificationError::InvalidEvidence(format!(
            "certification URL is not valid: {bad}"
        )));
    }
    if evidence.expertise_areas.is_empty() {
        return Err(VerificationError::InvalidEvidence(
            "at least one expertise area is required".into(),
        ));
    }
    if evidence.experience_years > params.max_experience_years {
        return Err(VerificationError::InvalidEvidence(format!(
            "experience years {} exceeds the maximum {}",
            evidence.experience_years, params.max_experience_years
        )));
    }
    if evidence
        .additional_info
        .as_ref()
        .is_some_and(|info| info.len() > 1000)
    {
        return Err(VerificationError::InvalidEvidence(
            "additional info must be 1000 characters or fewer".into(),
        ));
    }
    Ok(())
}

fn is_url(s: &str) -> bool {
    (s.starts_with("https://") || s.starts_with("http://")) && s.len() > 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use xskill_store_memory::MemoryStore;
    use xskill_types::Role;

    fn evidence() -> Evidence {
        Evidence {
            degree_url: "https://example.com/degree.pdf".into(),
            certification_urls: vec!["https://example.com/cert.pdf".into()],
            experience_years: 5,
            expertise_areas: vec!["rust".into()],
            additional_info: None,
        }
    }

    fn setup() -> (VerificationWorkflow<MemoryStore>, AccountId, AccountId) {
        let store = Arc::new(MemoryStore::new());
        let applicant = store
            .insert_account(xskill_store::NewAccount {
                display_name: "applicant".into(),
                role: Role::Teacher,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        let reviewer = store
            .insert_account(xskill_store::NewAccount {
                display_name: "reviewer".into(),
                role: Role::Swapper,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        (VerificationWorkflow::new(store), applicant, reviewer)
    }

    #[test]
    fn submit_then_approve_opens_the_gate() {
        let (workflow, applicant, reviewer) = setup();
        let params = MarketParams::xskill_defaults();
        assert!(!workflow.can_teach(applicant).unwrap());

        let request = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(200))
            .unwrap();
        assert_eq!(request.status, VerificationStatus::Pending);
        assert!(!workflow.can_teach(applicant).unwrap());

        let reviewed = workflow
            .review(
                request.id,
                ReviewDecision::Approve,
                reviewer,
                Some("solid credentials".into()),
                Timestamp::new(300),
            )
            .unwrap();
        assert_eq!(reviewed.status, VerificationStatus::Approved);
        assert_eq!(reviewed.reviewer_id, Some(reviewer));
        assert!(workflow.can_teach(applicant).unwrap());
    }

    #[test]
    fn duplicate_pending_submission_conflicts() {
        let (workflow, applicant, _) = setup();
        let params = MarketParams::xskill_defaults();
        workflow
            .submit(applicant, evidence(), &params, Timestamp::new(200))
            .unwrap();
        let err = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(201))
            .unwrap_err();
        assert!(matches!(err, VerificationError::AlreadyPending(_)));
    }

    #[test]
    fn rejection_allows_resubmission() {
        let (workflow, applicant, reviewer) = setup();
        let params = MarketParams::xskill_defaults();
        let first = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(200))
            .unwrap();
        workflow
            .review(
                first.id,
                ReviewDecision::Reject,
                reviewer,
                Some("needs more detail".into()),
                Timestamp::new(300),
            )
            .unwrap();
        assert!(!workflow.can_teach(applicant).unwrap());

        let second = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(400))
            .unwrap();
        assert_eq!(second.status, VerificationStatus::Pending);
        assert!(second.id > first.id);
    }

    #[test]
    fn reviewing_a_settled_request_is_invalid() {
        let (workflow, applicant, reviewer) = setup();
        let params = MarketParams::xskill_defaults();
        let request = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(200))
            .unwrap();
        workflow
            .review(
                request.id,
                ReviewDecision::Approve,
                reviewer,
                None,
                Timestamp::new(300),
            )
            .unwrap();
        let err = workflow
            .review(
                request.id,
                ReviewDecision::Reject,
                reviewer,
                None,
                Timestamp::new(301),
            )
            .unwrap_err();
        assert!(matches!(err, VerificationError::NotPending { .. }));
    }

    #[test]
    fn self_review_is_rejected() {
        let (workflow, applicant, _) = setup();
        let params = MarketParams::xskill_defaults();
        let request = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(200))
            .unwrap();
        let err = workflow
            .review(
                request.id,
                ReviewDecision::Approve,
                applicant,
                None,
                Timestamp::new(300),
            )
            .unwrap_err();
        assert!(matches!(err, VerificationError::SelfReview));
    }

    #[test]
    fn approved_account_cannot_reapply() {
        let (workflow, applicant, reviewer) = setup();
        let params = MarketParams::xskill_defaults();
        let request = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(200))
            .unwrap();
        workflow
            .review(
                request.id,
                ReviewDecision::Approve,
                reviewer,
                None,
                Timestamp::new(300),
            )
            .unwrap();
        let err = workflow
            .submit(applicant, evidence(), &params, Timestamp::new(400))
            .unwrap_err();
        assert!(matches!(err, VerificationError::AlreadyApproved(_)));
    }

    #[test]
    fn evidence_validation_catches_bad_input() {
        let (workflow, applicant, _) = setup();
        let params = MarketParams::xskill_defaults();
        let now = Timestamp::new(200);

        let mut bad = evidence();
        bad.degree_url = "not-a-url".into();
        assert!(matches!(
            workflow.submit(applicant, bad, &params, now),
            Err(VerificationError::InvalidEvidence(_))
        ));

        let mut bad = evidence();
        bad.certification_urls.clear();
        assert!(matches!(
            workflow.submit(applicant, bad, &params, now),
            Err(VerificationError::InvalidEvidence(_))
        ));

        let mut bad = evidence();
        bad.experience_years = 51;
        assert!(matches!(
            workflow.submit(applicant, bad, &params, now),
            Err(VerificationError::InvalidEvidence(_))
        ));

        let mut bad = evidence();
        bad.expertise_areas.clear();
        assert!(matches!(
            workflow.submit(applicant, bad, &params, now),
            Err(VerificationError::InvalidEvidence(_))
        ));
    }
}
