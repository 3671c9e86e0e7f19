//! Status transition tables for leases and applications.
//!
//! Pure module: no I/O, no clock. Date-driven transitions (e.g. a lease
//! crossing its end date) are an external scheduler's job and are never
//! inferred here.

use serde::{Deserialize, Serialize};

/// Which lifecycle a status string belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusDomain {
    Lease,
    Application,
}

impl StatusDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusDomain::Lease => "lease",
            StatusDomain::Application => "application",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Draft,
    PendingSignature,
    Signed,
    Active,
    ExpiringSoon,
    Expired,
    Terminated,
}

impl LeaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseStatus::Draft => "draft",
            LeaseStatus::PendingSignature => "pending_signature",
            LeaseStatus::Signed => "signed",
            LeaseStatus::Active => "active",
            LeaseStatus::ExpiringSoon => "expiring_soon",
            LeaseStatus::Expired => "expired",
            LeaseStatus::Terminated => "terminated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(LeaseStatus::Draft),
            "pending_signature" => Some(LeaseStatus::PendingSignature),
            "signed" => Some(LeaseStatus::Signed),
            "active" => Some(LeaseStatus::Active),
            "expiring_soon" => Some(LeaseStatus::ExpiringSoon),
            "expired" => Some(LeaseStatus::Expired),
            "terminated" => Some(LeaseStatus::Terminated),
            _ => None,
        }
    }

    /// Legal next states. `terminated` is absorbing.
    pub fn transitions(&self) -> &'static [LeaseStatus] {
        use LeaseStatus::*;
        match self {
            Draft => &[PendingSignature, Terminated],
            PendingSignature => &[Signed, Draft, Terminated],
            Signed => &[Active, Terminated],
            Active => &[ExpiringSoon, Terminated],
            ExpiringSoon => &[Active, Expired, Terminated],
            Expired => &[Terminated],
            Terminated => &[],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    Contacted,
    TourScheduled,
    DocumentsPending,
    UnderReview,
    Approved,
    Rejected,
    Converted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Contacted => "contacted",
            ApplicationStatus::TourScheduled => "tour_scheduled",
            ApplicationStatus::DocumentsPending => "documents_pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Converted => "converted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ApplicationStatus::New),
            "contacted" => Some(ApplicationStatus::Contacted),
            "tour_scheduled" => Some(ApplicationStatus::TourScheduled),
            "documents_pending" => Some(ApplicationStatus::DocumentsPending),
            "under_review" => Some(ApplicationStatus::UnderReview),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            "converted" => Some(ApplicationStatus::Converted),
            _ => None,
        }
    }

    /// Legal next states. `rejected` and `converted` are absorbing.
    pub fn transitions(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            New => &[Contacted, DocumentsPending, Rejected],
            Contacted => &[TourScheduled, DocumentsPending, Rejected],
            TourScheduled => &[DocumentsPending, Contacted, Rejected],
            DocumentsPending => &[UnderReview, Rejected],
            UnderReview => &[Approved, DocumentsPending, Rejected],
            Approved => &[Converted, Rejected],
            Rejected => &[],
            Converted => &[],
        }
    }
}

/// Whether `from -> to` is legal in `domain`. A same-state request is
/// always a legal no-op, even from a terminal state.
///
/// Unknown status strings are never legal here; callers validate and
/// report them as input errors before building a transition.
pub fn is_valid_transition(domain: StatusDomain, from: &str, to: &str) -> bool {
    if from == to {
        return match domain {
            StatusDomain::Lease => LeaseStatus::parse(from).is_some(),
            StatusDomain::Application => ApplicationStatus::parse(from).is_some(),
        };
    }
    match domain {
        StatusDomain::Lease => match (LeaseStatus::parse(from), LeaseStatus::parse(to)) {
            (Some(f), Some(t)) => f.transitions().contains(&t),
            _ => false,
        },
        StatusDomain::Application => {
            match (ApplicationStatus::parse(from), ApplicationStatus::parse(to)) {
                (Some(f), Some(t)) => f.transitions().contains(&t),
                _ => false,
            }
        }
    }
}

/// Adjacency list for `from`, as strings for error payloads.
pub fn allowed_transitions(domain: StatusDomain, from: &str) -> Vec<String> {
    match domain {
        StatusDomain::Lease => LeaseStatus::parse(from)
            .map(|f| f.transitions().iter().map(|s| s.as_str().to_string()).collect())
            .unwrap_or_default(),
        StatusDomain::Application => ApplicationStatus::parse(from)
            .map(|f| f.transitions().iter().map(|s| s.as_str().to_string()).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEASE_STATUSES: &[&str] = &[
        "draft",
        "pending_signature",
        "signed",
        "active",
        "expiring_soon",
        "expired",
        "terminated",
    ];

    const APPLICATION_STATUSES: &[&str] = &[
        "new",
        "contacted",
        "tour_scheduled",
        "documents_pending",
        "under_review",
        "approved",
        "rejected",
        "converted",
    ];

    #[test]
    fn same_state_is_always_legal() {
        for s in LEASE_STATUSES {
            assert!(is_valid_transition(StatusDomain::Lease, s, s), "{}", s);
        }
        for s in APPLICATION_STATUSES {
            assert!(is_valid_transition(StatusDomain::Application, s, s), "{}", s);
        }
    }

    #[test]
    fn same_state_holds_for_terminal_states() {
        assert!(is_valid_transition(StatusDomain::Lease, "terminated", "terminated"));
        assert!(is_valid_transition(StatusDomain::Application, "rejected", "rejected"));
        assert!(is_valid_transition(StatusDomain::Application, "converted", "converted"));
    }

    #[test]
    fn pairs_outside_the_adjacency_table_are_rejected() {
        for from in LEASE_STATUSES {
            let f = LeaseStatus::parse(from).unwrap();
            for to in LEASE_STATUSES {
                if from == to {
                    continue;
                }
                let t = LeaseStatus::parse(to).unwrap();
                assert_eq!(
                    is_valid_transition(StatusDomain::Lease, from, to),
                    f.transitions().contains(&t),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn lease_adjacency_matches_the_table() {
        assert!(is_valid_transition(StatusDomain::Lease, "draft", "pending_signature"));
        assert!(is_valid_transition(StatusDomain::Lease, "pending_signature", "draft"));
        assert!(is_valid_transition(StatusDomain::Lease, "signed", "active"));
        assert!(is_valid_transition(StatusDomain::Lease, "expiring_soon", "active"));
        assert!(is_valid_transition(StatusDomain::Lease, "expired", "terminated"));

        // skipping states is illegal
        assert!(!is_valid_transition(StatusDomain::Lease, "draft", "signed"));
        assert!(!is_valid_transition(StatusDomain::Lease, "draft", "active"));
        assert!(!is_valid_transition(StatusDomain::Lease, "signed", "expired"));
        // terminal has no outgoing edges
        assert!(!is_valid_transition(StatusDomain::Lease, "terminated", "draft"));
        assert!(!is_valid_transition(StatusDomain::Lease, "terminated", "active"));
    }

    #[test]
    fn application_terminal_states_are_absorbing() {
        for to in APPLICATION_STATUSES {
            if *to == "rejected" {
                continue;
            }
            assert!(!is_valid_transition(StatusDomain::Application, "rejected", to));
        }
        for to in APPLICATION_STATUSES {
            if *to == "converted" {
                continue;
            }
            assert!(!is_valid_transition(StatusDomain::Application, "converted", to));
        }
    }

    #[test]
    fn unknown_statuses_are_never_legal() {
        assert!(!is_valid_transition(StatusDomain::Lease, "draft", "bogus"));
        assert!(!is_valid_transition(StatusDomain::Lease, "bogus", "draft"));
        assert!(!is_valid_transition(StatusDomain::Lease, "bogus", "bogus"));
        assert!(allowed_transitions(StatusDomain::Lease, "bogus").is_empty());
    }

    #[test]
    fn allowed_transitions_enumerates_the_adjacency_list() {
        assert_eq!(
            allowed_transitions(StatusDomain::Lease, "expiring_soon"),
            vec!["active", "expired", "terminated"]
        );
        assert_eq!(
            allowed_transitions(StatusDomain::Application, "under_review"),
            vec!["approved", "documents_pending", "rejected"]
        );
        assert!(allowed_transitions(StatusDomain::Lease, "terminated").is_empty());
    }
}
