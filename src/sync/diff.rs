//! Relationship diffing
//!
//! Pure comparison of the previous follower id snapshot with the current
//! follower list. Persistence and merging live in
//! [`notifications`](super::notifications).

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{Follower, Notification, NotificationIdGen};

/// Notifications for one snapshot transition.
///
/// New followers come first in current-list order, then unfollows in
/// previous-snapshot order, then milestones in ascending threshold order.
pub fn compute_notifications(
    previous_ids: &[String],
    current: &[Follower],
    milestones: &[usize],
    ids: &NotificationIdGen,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let previous: HashSet<&str> = previous_ids.iter().map(String::as_str).collect();
    let current_ids: HashSet<&str> = current.iter().map(|f| f.user.id.as_str()).collect();

    let mut out = Vec::new();

    for follower in current {
        if !previous.contains(follower.user.id.as_str()) {
            out.push(Notification::for_new_follower(ids.next(now), follower, now));
        }
    }

    let mut gone = HashSet::new();
    for id in previous_ids {
        if !current_ids.contains(id.as_str()) && gone.insert(id.as_str()) {
            out.push(Notification::for_unfollow(ids.next(now), id, now));
        }
    }

    out.extend(
        crossed_milestones(previous.len(), current_ids.len(), milestones)
            .map(|threshold| Notification::for_milestone(ids.next(now), threshold, now)),
    );

    out
}

/// Thresholds `t` with `previous < t <= current`, ascending
pub fn crossed_milestones(
    previous: usize,
    current: usize,
    milestones: &[usize],
) -> impl Iterator<Item = usize> + '_ {
    let mut sorted: Vec<usize> = milestones.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .into_iter()
        .filter(move |&t| previous < t && t <= current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EngagementLevel, NotificationType, UserRecord};

    const MILESTONES: [usize; 8] = [100, 500, 1000, 5000, 10000, 50000, 100000, 1000000];

    fn follower(id: &str, mutual: bool) -> Follower {
        Follower {
            user: UserRecord::with_id(id),
            followed_at: DateTime::<Utc>::UNIX_EPOCH,
            is_mutual: mutual,
            engagement_level: EngagementLevel::Low,
        }
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("u{i}")).collect()
    }

    fn followers(range: std::ops::Range<usize>) -> Vec<Follower> {
        range.map(|i| follower(&format!("u{i}"), false)).collect()
    }

    #[test]
    fn test_added_and_removed_followers() {
        let previous = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let current = vec![follower("B", false), follower("C", false), follower("D", false)];

        let out = compute_notifications(
            &previous,
            &current,
            &MILESTONES,
            &NotificationIdGen::default(),
            Utc::now(),
        );

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, NotificationType::NewFollower);
        assert_eq!(out[0].user_id.as_deref(), Some("D"));
        assert_eq!(out[1].kind, NotificationType::Unfollow);
        assert_eq!(out[1].user_id.as_deref(), Some("A"));
        assert!(!out[1].actionable);
        assert!(out[1].avatar.is_none());
    }

    #[test]
    fn test_mutual_follower_is_upgraded() {
        let out = compute_notifications(
            &[],
            &[follower("m", true)],
            &[],
            &NotificationIdGen::default(),
            Utc::now(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, NotificationType::MutualConnection);
    }

    #[test]
    fn test_crossing_one_hundred_emits_one_milestone() {
        let out = compute_notifications(
            &ids(0..95),
            &followers(0..101),
            &MILESTONES,
            &NotificationIdGen::default(),
            Utc::now(),
        );
        let milestones: Vec<_> = out
            .iter()
            .filter(|n| n.kind == NotificationType::Milestone)
            .collect();
        assert_eq!(milestones.len(), 1);
        assert!(milestones[0].message.contains("100"));
    }

    #[test]
    fn test_no_milestone_between_thresholds() {
        let out = compute_notifications(
            &ids(0..150),
            &followers(0..160),
            &MILESTONES,
            &NotificationIdGen::default(),
            Utc::now(),
        );
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|n| n.kind == NotificationType::NewFollower));
    }

    #[test]
    fn test_several_thresholds_in_one_jump() {
        let crossed: Vec<_> = crossed_milestones(90, 1200, &[1000, 100, 500, 5000]).collect();
        assert_eq!(crossed, [100, 500, 1000]);
        assert_eq!(crossed_milestones(100, 100, &[100]).count(), 0);
        assert_eq!(crossed_milestones(99, 100, &[100]).count(), 1);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let out = compute_notifications(
            &ids(0..3),
            &followers(2..6),
            &[],
            &NotificationIdGen::default(),
            Utc::now(),
        );
        assert_eq!(out.len(), 6);
        assert!(out.windows(2).all(|w| w[0].id < w[1].id));
    }
}
