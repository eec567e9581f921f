//! Assignment planning: partition a batch of records across a team by ratio.

use crate::RosterGroup;
use std::ops::Range;

/// Share of a batch handed to ordinary members.
pub const MEMBER_RATIO: f64 = 0.6;
/// Share of a batch handed to the deputy leader.
pub const DEPUTY_RATIO: f64 = 0.25;
/// Share of a batch handed to the group leader.
pub const LEADER_RATIO: f64 = 0.15;

/// One planned export batch: a contiguous slice of the selected records
/// handed to a single executor under a generated file identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAssignment {
    pub file_id: String,
    pub executor: String,
    pub range: Range<usize>,
}

/// The generated file/task identifier for one member on one day.
pub fn file_identifier(date_stamp: &str, member: &str) -> String {
    format!("{date_stamp}_{member}")
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn ceil_share(total: usize, ratio: f64) -> usize {
    (total as f64 * ratio).ceil() as usize
}

/// Plan contiguous per-member slices for a batch of `total` records.
///
/// Role quotas are 60% members, 25% deputy, 15% leader, each rounded up.
/// Each role's quota is spread evenly over its members, remainder to the
/// earliest members. Because the quotas round up, the later roles get
/// clamped once the batch runs out.
pub fn plan_assignments(
    group: &RosterGroup,
    total: usize,
    date_stamp: &str,
) -> Vec<PlannedAssignment> {
    let quotas = [
        ceil_share(total, MEMBER_RATIO),
        ceil_share(total, DEPUTY_RATIO),
        ceil_share(total, LEADER_RATIO),
    ];
    let roles = [&group.members, &group.deputy, &group.leader];

    let mut plan = Vec::new();
    let mut cursor = 0usize;

    'roles: for (quota, members) in quotas.into_iter().zip(roles) {
        if members.is_empty() {
            continue;
        }
        let per_member = quota / members.len();
        let extra = quota % members.len();

        for (i, member) in members.iter().enumerate() {
            let planned = per_member + usize::from(i < extra);
            let take = planned.min(total - cursor);
            if take == 0 {
                break;
            }
            plan.push(PlannedAssignment {
                file_id: file_identifier(date_stamp, member),
                executor: member.clone(),
                range: cursor..cursor + take,
            });
            cursor += take;
            if cursor >= total {
                break 'roles;
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_group() -> RosterGroup {
        RosterGroup {
            members: vec!["member1".to_string(), "member2".to_string()],
            deputy: vec!["deputy".to_string()],
            leader: vec!["leader".to_string()],
        }
    }

    fn slice_sizes(plan: &[PlannedAssignment]) -> Vec<usize> {
        plan.iter().map(|p| p.range.len()).collect()
    }

    #[test_log::test]
    fn test_exact_ratio_batch() {
        let plan = plan_assignments(&test_group(), 100, "0101");

        assert_eq!(slice_sizes(&plan), vec![30, 30, 25, 15]);
        assert_eq!(
            plan.iter().map(|p| p.executor.as_str()).collect::<Vec<_>>(),
            vec!["member1", "member2", "deputy", "leader"]
        );

        // Slices are contiguous and cover the whole batch.
        let mut cursor = 0;
        for assignment in &plan {
            assert_eq!(assignment.range.start, cursor);
            cursor = assignment.range.end;
        }
        assert_eq!(cursor, 100);
    }

    #[test_log::test]
    fn test_rounded_quotas_clamp_at_batch_end() {
        // Quotas are ceil(6), ceil(2.5)=3, ceil(1.5)=2, summing past the
        // batch; the leader takes whatever remains.
        let plan = plan_assignments(&test_group(), 10, "0101");
        assert_eq!(slice_sizes(&plan), vec![3, 3, 3, 1]);
    }

    #[test_log::test]
    fn test_remainder_goes_to_earliest_members() {
        let group = RosterGroup {
            members: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            deputy: vec![],
            leader: vec![],
        };
        // Member quota is ceil(11 * 0.6) = 7 over three members: 3, 2, 2.
        let plan = plan_assignments(&group, 11, "0101");
        assert_eq!(slice_sizes(&plan), vec![3, 2, 2]);
        assert_eq!(plan[0].executor, "a");
    }

    #[test_log::test]
    fn test_tiny_batch_stops_after_first_slice() {
        let plan = plan_assignments(&test_group(), 1, "0101");
        assert_eq!(slice_sizes(&plan), vec![1]);
        assert_eq!(plan[0].executor, "member1");
    }

    #[test_log::test]
    fn test_empty_batch_plans_nothing() {
        assert!(plan_assignments(&test_group(), 0, "0101").is_empty());
    }

    #[test_log::test]
    fn test_missing_role_is_skipped() {
        let group = RosterGroup {
            members: vec!["only".to_string()],
            deputy: vec![],
            leader: vec!["lead".to_string()],
        };
        let plan = plan_assignments(&group, 10, "0101");
        // Member quota 6, no deputy, leader takes its quota from the rest.
        assert_eq!(slice_sizes(&plan), vec![6, 2]);
        assert_eq!(plan[1].executor, "lead");
    }

    #[test_log::test]
    fn test_file_identifier_format() {
        let plan = plan_assignments(&test_group(), 4, "0612");
        assert_eq!(plan[0].file_id, "0612_member1");
    }
}
