//! Routing of reviewer submissions into second-pass review queues.

use crate::{CandidateRecord, RosterGroup};

/// The leader queue takes 7/12 of the pooled member rows, the deputy queue
/// the remaining 5/12.
pub const LEADER_SHARE_NUM: usize = 7;
pub const LEADER_SHARE_DEN: usize = 12;

/// Where a submission is routed, based on its original executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Checked by the group leader.
    LeaderQueue,
    /// Checked by the deputy leader.
    DeputyQueue,
    /// Pooled with the other ordinary members' rows and split afterwards.
    MemberPool,
    /// Executor not part of the group.
    Unknown,
}

/// Route one submission by its executor: the leader's work is checked by
/// the deputy and vice versa; ordinary members' work lands in the shared
/// pool.
pub fn route_executor(group: &RosterGroup, executor: &str) -> Destination {
    if group.leader.iter().any(|m| m == executor) {
        Destination::DeputyQueue
    } else if group.deputy.iter().any(|m| m == executor) {
        Destination::LeaderQueue
    } else if group.members.iter().any(|m| m == executor) {
        Destination::MemberPool
    } else {
        Destination::Unknown
    }
}

/// Split the pooled member rows between the two queues, leader share first.
pub fn split_member_pool(
    pool: Vec<CandidateRecord>,
) -> (Vec<CandidateRecord>, Vec<CandidateRecord>) {
    let leader_count = pool.len() * LEADER_SHARE_NUM / LEADER_SHARE_DEN;
    let mut to_leader = pool;
    let to_deputy = to_leader.split_off(leader_count);
    (to_leader, to_deputy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NAME_UNKNOWN, PATENT_ABSENT, PUBLICATION_NONE};

    fn rec(id: u32) -> CandidateRecord {
        CandidateRecord {
            record_id: id,
            name: format!("company {id}"),
            count: 1,
            preprocessed_name: String::new(),
            key_name: String::new(),
            have_patent: String::new(),
            now_name: NAME_UNKNOWN.to_string(),
            have_patent_fixed: PATENT_ABSENT.to_string(),
            patent_publication_number: PUBLICATION_NONE.to_string(),
        }
    }

    fn test_group() -> RosterGroup {
        RosterGroup {
            members: vec!["m1".to_string(), "m2".to_string()],
            deputy: vec!["dep".to_string()],
            leader: vec!["lead".to_string()],
        }
    }

    #[test_log::test]
    fn test_leadership_swaps_reviewers() {
        let group = test_group();
        assert_eq!(route_executor(&group, "lead"), Destination::DeputyQueue);
        assert_eq!(route_executor(&group, "dep"), Destination::LeaderQueue);
        assert_eq!(route_executor(&group, "m1"), Destination::MemberPool);
        assert_eq!(route_executor(&group, "nobody"), Destination::Unknown);
    }

    #[test_log::test]
    fn test_split_is_seven_to_five() {
        let pool: Vec<_> = (0..12).map(rec).collect();
        let (to_leader, to_deputy) = split_member_pool(pool);
        assert_eq!(to_leader.len(), 7);
        assert_eq!(to_deputy.len(), 5);
        // Order is preserved: the leader queue gets the head of the pool.
        assert_eq!(to_leader[0].record_id, 0);
        assert_eq!(to_deputy[0].record_id, 7);
    }

    #[test_log::test]
    fn test_split_rounds_down_for_small_pools() {
        let pool: Vec<_> = (0..5).map(rec).collect();
        let (to_leader, to_deputy) = split_member_pool(pool);
        // 5 * 7 / 12 = 2 by integer division.
        assert_eq!(to_leader.len(), 2);
        assert_eq!(to_deputy.len(), 3);
    }

    #[test_log::test]
    fn test_split_empty_pool() {
        let (to_leader, to_deputy) = split_member_pool(Vec::new());
        assert!(to_leader.is_empty());
        assert!(to_deputy.is_empty());
    }
}
