use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ir::{Direction, RoomId};
use crate::theme::Theme;

/// Identity of a rendered connection as the validation pass reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenConnection {
    pub source_id: RoomId,
    pub target_id: RoomId,
    pub direction: Direction,
}

impl BrokenConnection {
    pub fn new(source_id: RoomId, target_id: RoomId, direction: Direction) -> Self {
        Self {
            source_id,
            target_id,
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionIssue {
    WithObstacles,
    NonStraight,
    Intersections,
    Long,
}

/// Answers whether a connection was flagged with a given issue.
pub trait BrokenConnectionLookup {
    fn has_issue(&self, issue: ConnectionIssue, key: &BrokenConnection) -> bool;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrokenConnections {
    pub with_obstacles: HashSet<BrokenConnection>,
    pub non_straight: HashSet<BrokenConnection>,
    pub intersections: HashSet<BrokenConnection>,
    pub long: HashSet<BrokenConnection>,
}

impl BrokenConnections {
    pub fn set(&self, issue: ConnectionIssue) -> &HashSet<BrokenConnection> {
        match issue {
            ConnectionIssue::WithObstacles => &self.with_obstacles,
            ConnectionIssue::NonStraight => &self.non_straight,
            ConnectionIssue::Intersections => &self.intersections,
            ConnectionIssue::Long => &self.long,
        }
    }

    pub fn insert(&mut self, issue: ConnectionIssue, key: BrokenConnection) {
        let set = match issue {
            ConnectionIssue::WithObstacles => &mut self.with_obstacles,
            ConnectionIssue::NonStraight => &mut self.non_straight,
            ConnectionIssue::Intersections => &mut self.intersections,
            ConnectionIssue::Long => &mut self.long,
        };
        set.insert(key);
    }

    pub fn is_empty(&self) -> bool {
        self.with_obstacles.is_empty()
            && self.non_straight.is_empty()
            && self.intersections.is_empty()
            && self.long.is_empty()
    }
}

impl BrokenConnectionLookup for BrokenConnections {
    fn has_issue(&self, issue: ConnectionIssue, key: &BrokenConnection) -> bool {
        self.set(issue).contains(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub issue: ConnectionIssue,
    pub color: String,
}

/// Ordered issue → color rules; the first rule that matches wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationPolicy {
    pub rules: Vec<ClassificationRule>,
}

impl ClassificationPolicy {
    /// Obstructed, then bent, then crossing, then long.
    pub fn from_theme(theme: &Theme) -> Self {
        let rule = |issue, color: &str| ClassificationRule {
            issue,
            color: color.to_string(),
        };
        Self {
            rules: vec![
                rule(ConnectionIssue::WithObstacles, &theme.obstacle_color),
                rule(ConnectionIssue::NonStraight, &theme.non_straight_color),
                rule(ConnectionIssue::Intersections, &theme.intersection_color),
                rule(ConnectionIssue::Long, &theme.long_connection_color),
            ],
        }
    }

    pub fn classify(
        &self,
        lookup: &dyn BrokenConnectionLookup,
        key: &BrokenConnection,
    ) -> Option<&ClassificationRule> {
        self.rules
            .iter()
            .find(|rule| lookup.has_issue(rule.issue, key))
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::from_theme(&Theme::classic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> BrokenConnection {
        BrokenConnection::new(1, 2, Direction::East)
    }

    #[test]
    fn obstacles_outrank_every_other_issue() {
        let mut broken = BrokenConnections::default();
        broken.insert(ConnectionIssue::Long, key());
        broken.insert(ConnectionIssue::Intersections, key());
        broken.insert(ConnectionIssue::NonStraight, key());
        broken.insert(ConnectionIssue::WithObstacles, key());
        let policy = ClassificationPolicy::default();
        let rule = policy.classify(&broken, &key()).unwrap();
        assert_eq!(rule.issue, ConnectionIssue::WithObstacles);
        assert_eq!(rule.color, "#FF0000");
    }

    #[test]
    fn falls_through_in_priority_order() {
        let policy = ClassificationPolicy::default();
        let mut broken = BrokenConnections::default();
        assert!(policy.classify(&broken, &key()).is_none());

        broken.insert(ConnectionIssue::Long, key());
        assert_eq!(
            policy.classify(&broken, &key()).map(|r| r.issue),
            Some(ConnectionIssue::Long)
        );
        broken.insert(ConnectionIssue::Intersections, key());
        assert_eq!(
            policy.classify(&broken, &key()).map(|r| r.issue),
            Some(ConnectionIssue::Intersections)
        );
        broken.insert(ConnectionIssue::NonStraight, key());
        assert_eq!(
            policy.classify(&broken, &key()).map(|r| r.issue),
            Some(ConnectionIssue::NonStraight)
        );
    }

    #[test]
    fn key_includes_direction() {
        let mut broken = BrokenConnections::default();
        broken.insert(ConnectionIssue::Long, key());
        let other = BrokenConnection::new(1, 2, Direction::North);
        assert!(ClassificationPolicy::default().classify(&broken, &other).is_none());
    }

    #[test]
    fn custom_order_and_lookup_are_honored() {
        struct EverythingLong;
        impl BrokenConnectionLookup for EverythingLong {
            fn has_issue(&self, issue: ConnectionIssue, _key: &BrokenConnection) -> bool {
                issue == ConnectionIssue::Long
            }
        }
        let policy = ClassificationPolicy {
            rules: vec![ClassificationRule {
                issue: ConnectionIssue::Long,
                color: "#00FFFF".to_string(),
            }],
        };
        let rule = policy.classify(&EverythingLong, &key()).unwrap();
        assert_eq!(rule.color, "#00FFFF");
    }

    #[test]
    fn deserializes_partial_sets() {
        let broken: BrokenConnections = serde_json::from_str(
            r#"{"long": [{"sourceId": 1, "targetId": 2, "direction": "east"}]}"#,
        )
        .unwrap();
        assert!(broken.long.contains(&key()));
        assert!(broken.with_obstacles.is_empty());
    }

    #[test]
    fn empty_until_an_issue_is_recorded() {
        let mut broken = BrokenConnections::default();
        assert!(broken.is_empty());
        broken.insert(ConnectionIssue::Intersections, key());
        assert!(!broken.is_empty());
    }
}
