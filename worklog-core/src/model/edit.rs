//! Structural edits addressed by [`NodePath`].

use super::log_book::{Day, ImageRef, Item, LogBook, Project, Sub, SubSub};
use super::node_path::{Direction, NodePath};
use super::walk::NodeRef;
use crate::error::{Result, WorkLogError};

impl LogBook {
    /// Borrowed view of the node at `path`, if it exists.
    pub fn node(&self, path: NodePath) -> Option<NodeRef<'_>> {
        match path {
            NodePath::Day { day } => self.days.get(day).map(NodeRef::Day),
            NodePath::Project { day, project } => self
                .days
                .get(day)?
                .projects
                .get(project)
                .map(NodeRef::Project),
            NodePath::Item { day, project, item } => self
                .days
                .get(day)?
                .projects
                .get(project)?
                .items
                .get(item)
                .map(NodeRef::Item),
            NodePath::Sub {
                day,
                project,
                item,
                sub,
            } => self
                .days
                .get(day)?
                .projects
                .get(project)?
                .items
                .get(item)?
                .subs
                .get(sub)
                .map(NodeRef::Sub),
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                subsub,
            } => self
                .days
                .get(day)?
                .projects
                .get(project)?
                .items
                .get(item)?
                .subs
                .get(sub)?
                .subsubs
                .get(subsub)
                .map(NodeRef::SubSub),
        }
    }

    /// Date, project name, or content of the node at `path`.
    pub fn text(&self, path: NodePath) -> Result<&str> {
        self.node(path)
            .map(|node| node.text())
            .ok_or(WorkLogError::NodeNotFound(path))
    }

    pub fn set_text(&mut self, path: NodePath, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        match path {
            NodePath::Day { day } => self.day_mut(path, day)?.date = text,
            NodePath::Project { day, project } => {
                self.project_mut(path, day, project)?.name = text
            }
            NodePath::Item { day, project, item } => {
                self.item_mut(path, day, project, item)?.content = text
            }
            NodePath::Sub {
                day,
                project,
                item,
                sub,
            } => self.sub_mut(path, day, project, item, sub)?.content = text,
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                subsub,
            } => {
                self.subsub_mut(path, day, project, item, sub, subsub)?
                    .content = text
            }
        }
        Ok(())
    }

    pub fn image(&self, path: NodePath) -> Result<&ImageRef> {
        let node = self.node(path).ok_or(WorkLogError::NodeNotFound(path))?;
        node.image().ok_or(WorkLogError::NotImageNode(path))
    }

    pub fn image_mut(&mut self, path: NodePath) -> Result<&mut ImageRef> {
        match path {
            NodePath::Day { .. } | NodePath::Project { .. } => {
                Err(WorkLogError::NotImageNode(path))
            }
            NodePath::Item { day, project, item } => {
                Ok(&mut self.item_mut(path, day, project, item)?.image)
            }
            NodePath::Sub {
                day,
                project,
                item,
                sub,
            } => Ok(&mut self.sub_mut(path, day, project, item, sub)?.image),
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                subsub,
            } => Ok(&mut self.subsub_mut(path, day, project, item, sub, subsub)?.image),
        }
    }

    /// Appends an empty child under `parent` and returns its path.
    ///
    /// A new project starts with one blank item. Sub-sub-items are leaves.
    pub fn add_child(&mut self, parent: NodePath) -> Result<NodePath> {
        let index = match parent {
            NodePath::Day { day } => push_last(&mut self.day_mut(parent, day)?.projects, Project::blank()),
            NodePath::Project { day, project } => push_last(
                &mut self.project_mut(parent, day, project)?.items,
                Item::default(),
            ),
            NodePath::Item { day, project, item } => push_last(
                &mut self.item_mut(parent, day, project, item)?.subs,
                Sub::default(),
            ),
            NodePath::Sub {
                day,
                project,
                item,
                sub,
            } => push_last(
                &mut self.sub_mut(parent, day, project, item, sub)?.subsubs,
                SubSub::default(),
            ),
            NodePath::SubSub { .. } => return Err(WorkLogError::LeafNode(parent)),
        };
        parent.child(index).ok_or(WorkLogError::LeafNode(parent))
    }

    /// Swaps the node with its neighbour. Returns `false` when there is no
    /// neighbour in that direction (first node moved up, last moved down).
    pub fn move_node(&mut self, path: NodePath, direction: Direction) -> Result<bool> {
        let index = path.index();
        let moved = match path {
            NodePath::Day { .. } => swap_sibling(&mut self.days, index, direction),
            NodePath::Project { day, .. } => {
                swap_sibling(&mut self.day_mut(path, day)?.projects, index, direction)
            }
            NodePath::Item { day, project, .. } => swap_sibling(
                &mut self.project_mut(path, day, project)?.items,
                index,
                direction,
            ),
            NodePath::Sub {
                day, project, item, ..
            } => swap_sibling(
                &mut self.item_mut(path, day, project, item)?.subs,
                index,
                direction,
            ),
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                ..
            } => swap_sibling(
                &mut self.sub_mut(path, day, project, item, sub)?.subsubs,
                index,
                direction,
            ),
        };
        moved.ok_or(WorkLogError::NodeNotFound(path))
    }

    /// Removes the node and its whole subtree, returning the drive ids found in it.
    pub fn remove_node(&mut self, path: NodePath) -> Result<Vec<String>> {
        let ids = self
            .node(path)
            .ok_or(WorkLogError::NodeNotFound(path))?
            .drive_ids(path);
        let index = path.index();
        match path {
            NodePath::Day { .. } => {
                self.days.remove(index);
            }
            NodePath::Project { day, .. } => {
                self.day_mut(path, day)?.projects.remove(index);
            }
            NodePath::Item { day, project, .. } => {
                self.project_mut(path, day, project)?.items.remove(index);
            }
            NodePath::Sub {
                day, project, item, ..
            } => {
                self.item_mut(path, day, project, item)?.subs.remove(index);
            }
            NodePath::SubSub {
                day,
                project,
                item,
                sub,
                ..
            } => {
                self.sub_mut(path, day, project, item, sub)?
                    .subsubs
                    .remove(index);
            }
        }
        Ok(ids)
    }

    /// Replaces the projects of day `target` with a deep copy of the projects
    /// of the first day dated `source_date`. Returns `false` when no such day exists.
    pub fn copy_projects_from(&mut self, target: usize, source_date: &str) -> Result<bool> {
        let path = NodePath::Day { day: target };
        if self.days.get(target).is_none() {
            return Err(WorkLogError::NodeNotFound(path));
        }
        let Some(projects) = self.find_day(source_date).map(|day| day.projects.clone()) else {
            return Ok(false);
        };
        self.day_mut(path, target)?.projects = projects;
        Ok(true)
    }

    fn day_mut(&mut self, path: NodePath, day: usize) -> Result<&mut Day> {
        self.days
            .get_mut(day)
            .ok_or(WorkLogError::NodeNotFound(path))
    }

    fn project_mut(&mut self, path: NodePath, day: usize, project: usize) -> Result<&mut Project> {
        self.day_mut(path, day)?
            .projects
            .get_mut(project)
            .ok_or(WorkLogError::NodeNotFound(path))
    }

    fn item_mut(
        &mut self,
        path: NodePath,
        day: usize,
        project: usize,
        item: usize,
    ) -> Result<&mut Item> {
        self.project_mut(path, day, project)?
            .items
            .get_mut(item)
            .ok_or(WorkLogError::NodeNotFound(path))
    }

    fn sub_mut(
        &mut self,
        path: NodePath,
        day: usize,
        project: usize,
        item: usize,
        sub: usize,
    ) -> Result<&mut Sub> {
        self.item_mut(path, day, project, item)?
            .subs
            .get_mut(sub)
            .ok_or(WorkLogError::NodeNotFound(path))
    }

    fn subsub_mut(
        &mut self,
        path: NodePath,
        day: usize,
        project: usize,
        item: usize,
        sub: usize,
        subsub: usize,
    ) -> Result<&mut SubSub> {
        self.sub_mut(path, day, project, item, sub)?
            .subsubs
            .get_mut(subsub)
            .ok_or(WorkLogError::NodeNotFound(path))
    }
}

fn push_last<T>(list: &mut Vec<T>, value: T) -> usize {
    list.push(value);
    list.len() - 1
}

/// `None` when `index` is out of range, `Some(false)` when there is nothing to swap with.
fn swap_sibling<T>(list: &mut [T], index: usize, direction: Direction) -> Option<bool> {
    if index >= list.len() {
        return None;
    }
    let neighbour = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&n| n < list.len()),
    };
    Some(match neighbour {
        Some(n) => {
            list.swap(index, n);
            true
        }
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::sample_book;

    fn path(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    #[test]
    fn add_child_creates_blank_nodes_at_each_level() {
        let mut book = LogBook::new(vec![Day::new("115.02.13")]);

        let project = book.add_child(path("0")).unwrap();
        assert_eq!(project.to_string(), "0.0");
        assert_eq!(book.days[0].projects[0], Project::blank());

        let item = book.add_child(project).unwrap();
        assert_eq!(item.to_string(), "0.0.1");

        let sub = book.add_child(item).unwrap();
        let subsub = book.add_child(sub).unwrap();
        assert_eq!(subsub.to_string(), "0.0.1.0.0");

        let err = book.add_child(subsub).unwrap_err();
        assert!(matches!(err, WorkLogError::LeafNode(_)));
    }

    #[test]
    fn add_child_under_missing_parent_is_rejected() {
        let mut book = LogBook::default();
        let err = book.add_child(path("2")).unwrap_err();
        assert!(matches!(err, WorkLogError::NodeNotFound(p) if p.to_string() == "2"));
    }

    #[test]
    fn set_text_targets_date_name_or_content() {
        let mut book = sample_book();
        book.set_text(path("0"), "115.02.14").unwrap();
        book.set_text(path("0.1"), "Tunnel").unwrap();
        book.set_text(path("0.0.0.0.1"), "P2 rebar").unwrap();

        assert_eq!(book.days[0].date, "115.02.14");
        assert_eq!(book.text(path("0.1")).unwrap(), "Tunnel");
        assert_eq!(book.days[0].projects[0].items[0].subs[0].subsubs[1].content, "P2 rebar");
    }

    #[test]
    fn move_swaps_with_neighbour_and_ignores_edges() {
        let mut book = sample_book();
        let first = book.days[0].projects[0].items[0].clone();

        assert!(!book.move_node(path("0.0.0"), Direction::Up).unwrap());
        assert!(book.move_node(path("0.0.0"), Direction::Down).unwrap());
        assert_eq!(book.days[0].projects[0].items[1], first);
        assert!(!book.move_node(path("0.0.1"), Direction::Down).unwrap());

        assert!(book.move_node(path("1"), Direction::Up).unwrap());
        assert_eq!(book.days[0].date, "115.01.05");
    }

    #[test]
    fn move_of_missing_node_is_an_error() {
        let mut book = sample_book();
        assert!(book.move_node(path("0.0.9"), Direction::Up).is_err());
    }

    #[test]
    fn remove_returns_drive_ids_of_subtree() {
        let mut book = sample_book();
        let ids = book.remove_node(path("0.0.0")).unwrap();
        assert_eq!(ids, ["item-img", "subsub-img"]);
        assert_eq!(book.days[0].projects[0].items.len(), 1);

        let ids = book.remove_node(path("0.1")).unwrap();
        assert!(ids.is_empty());
        assert_eq!(book.days[0].projects.len(), 1);
    }

    #[test]
    fn image_slots_exist_only_below_projects() {
        let mut book = sample_book();
        assert!(matches!(
            book.image_mut(path("0.0")),
            Err(WorkLogError::NotImageNode(_))
        ));
        assert_eq!(book.image(path("0.0.0")).unwrap().drive_id, "item-img");

        book.image_mut(path("0.0.0.0")).unwrap().img_url = "data:x".into();
        assert!(book.days[0].projects[0].items[0].subs[0].image.is_local_preview());
    }

    #[test]
    fn copy_projects_deep_clones_source_day() {
        let mut book = sample_book();
        book.days.insert(0, Day::new("115.02.20"));

        assert!(book.copy_projects_from(0, "115.01.05").unwrap());
        assert_eq!(book.days[0].projects, book.days[2].projects);

        book.days[0].projects[0].name = "Changed".into();
        assert_eq!(book.days[2].projects[0].name, "Bridge");

        assert!(!book.copy_projects_from(0, "099.01.01").unwrap());
        assert!(book.copy_projects_from(7, "115.01.05").is_err());
    }
}
