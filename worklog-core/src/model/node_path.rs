use crate::error::WorkLogError;
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString};

/// Address of one node in a [`LogBook`](super::LogBook), discriminated by depth.
///
/// Written as dotted sibling indices: `"0"` is the first day, `"0.1"` its second
/// project, `"0.1.2.0.3"` a sub-sub-item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePath {
    Day { day: usize },
    Project { day: usize, project: usize },
    Item { day: usize, project: usize, item: usize },
    Sub { day: usize, project: usize, item: usize, sub: usize },
    SubSub { day: usize, project: usize, item: usize, sub: usize, subsub: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
}

impl NodePath {
    /// 1 for a day, 5 for a sub-sub-item.
    pub fn depth(&self) -> usize {
        match self {
            NodePath::Day { .. } => 1,
            NodePath::Project { .. } => 2,
            NodePath::Item { .. } => 3,
            NodePath::Sub { .. } => 4,
            NodePath::SubSub { .. } => 5,
        }
    }

    pub fn day(&self) -> usize {
        match *self {
            NodePath::Day { day }
            | NodePath::Project { day, .. }
            | NodePath::Item { day, .. }
            | NodePath::Sub { day, .. }
            | NodePath::SubSub { day, .. } => day,
        }
    }

    /// Index of this node among its siblings.
    pub fn index(&self) -> usize {
        match *self {
            NodePath::Day { day } => day,
            NodePath::Project { project, .. } => project,
            NodePath::Item { item, .. } => item,
            NodePath::Sub { sub, .. } => sub,
            NodePath::SubSub { subsub, .. } => subsub,
        }
    }

    /// Same parent, different sibling index.
    pub fn with_index(self, index: usize) -> Self {
        match self {
            NodePath::Day { .. } => NodePath::Day { day: index },
            NodePath::Project { day, .. } => NodePath::Project { day, project: index },
            NodePath::Item { day, project, .. } => NodePath::Item { day, project, item: index },
            NodePath::Sub { day, project, item, .. } => NodePath::Sub {
                day,
                project,
                item,
                sub: index,
            },
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                ..
            } => NodePath::SubSub {
                day,
                project,
                item,
                sub,
                subsub: index,
            },
        }
    }

    pub fn parent(&self) -> Option<NodePath> {
        match *self {
            NodePath::Day { .. } => None,
            NodePath::Project { day, .. } => Some(NodePath::Day { day }),
            NodePath::Item { day, project, .. } => Some(NodePath::Project { day, project }),
            NodePath::Sub {
                day, project, item, ..
            } => Some(NodePath::Item { day, project, item }),
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                ..
            } => Some(NodePath::Sub {
                day,
                project,
                item,
                sub,
            }),
        }
    }

    /// Path of the `index`-th child, `None` below a sub-sub-item.
    pub fn child(&self, index: usize) -> Option<NodePath> {
        match *self {
            NodePath::Day { day } => Some(NodePath::Project {
                day,
                project: index,
            }),
            NodePath::Project { day, project } => Some(NodePath::Item {
                day,
                project,
                item: index,
            }),
            NodePath::Item { day, project, item } => Some(NodePath::Sub {
                day,
                project,
                item,
                sub: index,
            }),
            NodePath::Sub {
                day,
                project,
                item,
                sub,
            } => Some(NodePath::SubSub {
                day,
                project,
                item,
                sub,
                subsub: index,
            }),
            NodePath::SubSub { .. } => None,
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.depth());
        let mut cursor = Some(*self);
        while let Some(path) = cursor {
            out.push(path.index());
            cursor = path.parent();
        }
        out.reverse();
        out
    }

    fn from_indices(indices: &[usize]) -> Option<NodePath> {
        let (&first, rest) = indices.split_first()?;
        rest.iter().try_fold(NodePath::Day { day: first }, |path, &i| path.child(i))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.indices().iter().map(|i| i.to_string()).collect();
        f.write_str(&joined.join("."))
    }
}

impl FromStr for NodePath {
    type Err = WorkLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WorkLogError::InvalidPath(s.to_string());
        let indices = s
            .trim()
            .split('.')
            .map(|part| part.parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        NodePath::from_indices(&indices).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_depth() {
        assert_eq!("3".parse::<NodePath>().unwrap(), NodePath::Day { day: 3 });
        assert_eq!(
            "0.1.2".parse::<NodePath>().unwrap(),
            NodePath::Item {
                day: 0,
                project: 1,
                item: 2
            }
        );
        let deepest: NodePath = "1.0.2.3.4".parse().unwrap();
        assert_eq!(deepest.depth(), 5);
        assert_eq!(deepest.index(), 4);
        assert_eq!(deepest.to_string(), "1.0.2.3.4");
    }

    #[test]
    fn rejects_bad_paths() {
        for bad in ["", "a", "0..1", "0.1.2.3.4.5", "-1", "0.x"] {
            let err = bad.parse::<NodePath>().unwrap_err();
            assert!(matches!(err, WorkLogError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn parent_child_and_sibling_navigation() {
        let sub: NodePath = "0.1.2.3".parse().unwrap();
        assert_eq!(sub.parent().unwrap().to_string(), "0.1.2");
        assert_eq!(sub.child(5).unwrap().to_string(), "0.1.2.3.5");
        assert_eq!(sub.with_index(0).to_string(), "0.1.2.0");
        assert_eq!(NodePath::Day { day: 0 }.parent(), None);
        assert_eq!("0.0.0.0.0".parse::<NodePath>().unwrap().child(0), None);
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert!("left".parse::<Direction>().is_err());
    }
}
