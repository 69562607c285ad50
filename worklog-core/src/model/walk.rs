use super::log_book::{Day, ImageRef, Item, LogBook, Project, Sub, SubSub};
use super::node_path::NodePath;

/// Borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Day(&'a Day),
    Project(&'a Project),
    Item(&'a Item),
    Sub(&'a Sub),
    SubSub(&'a SubSub),
}

impl<'a> NodeRef<'a> {
    /// The editable text of the node: date, project name, or content.
    pub fn text(&self) -> &'a str {
        match self {
            NodeRef::Day(day) => &day.date,
            NodeRef::Project(project) => &project.name,
            NodeRef::Item(item) => &item.content,
            NodeRef::Sub(sub) => &sub.content,
            NodeRef::SubSub(subsub) => &subsub.content,
        }
    }

    pub fn image(&self) -> Option<&'a ImageRef> {
        match self {
            NodeRef::Day(_) | NodeRef::Project(_) => None,
            NodeRef::Item(item) => Some(&item.image),
            NodeRef::Sub(sub) => Some(&sub.image),
            NodeRef::SubSub(subsub) => Some(&subsub.image),
        }
    }

    /// Visits this node and then its descendants, depth first.
    pub fn walk<F>(self, path: NodePath, f: &mut F)
    where
        F: FnMut(NodePath, NodeRef<'a>),
    {
        f(path, self);
        let children: Vec<NodeRef<'a>> = match self {
            NodeRef::Day(day) => day.projects.iter().map(NodeRef::Project).collect(),
            NodeRef::Project(project) => project.items.iter().map(NodeRef::Item).collect(),
            NodeRef::Item(item) => item.subs.iter().map(NodeRef::Sub).collect(),
            NodeRef::Sub(sub) => sub.subsubs.iter().map(NodeRef::SubSub).collect(),
            NodeRef::SubSub(_) => Vec::new(),
        };
        for (i, child) in children.into_iter().enumerate() {
            if let Some(child_path) = path.child(i) {
                child.walk(child_path, f);
            }
        }
    }

    /// Non-empty drive ids in this node and everything below it.
    pub fn drive_ids(self, path: NodePath) -> Vec<String> {
        let mut ids = Vec::new();
        self.walk(path, &mut |_, node| {
            if let Some(image) = node.image().filter(|image| image.is_remote()) {
                ids.push(image.drive_id.clone());
            }
        });
        ids
    }
}

impl LogBook {
    /// Visits every node in traversal order.
    pub fn walk<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(NodePath, NodeRef<'a>),
    {
        for (i, day) in self.days.iter().enumerate() {
            NodeRef::Day(day).walk(NodePath::Day { day: i }, &mut f);
        }
    }

    /// Every non-empty `driveId` in the book, in traversal order.
    pub fn drive_ids(&self) -> Vec<String> {
        self.days
            .iter()
            .enumerate()
            .flat_map(|(i, day)| NodeRef::Day(day).drive_ids(NodePath::Day { day: i }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::common::sample_book;

    #[test]
    fn walk_visits_in_traversal_order() {
        let book = sample_book();
        let mut paths = Vec::new();
        book.walk(|path, _| paths.push(path.to_string()));
        assert_eq!(paths[0], "0");
        assert_eq!(paths[1], "0.0");
        assert_eq!(paths[2], "0.0.0");
        assert!(paths.contains(&"0.0.0.0.0".to_string()));
        assert_eq!(paths.last().map(String::as_str), Some("1.0.0"));
    }

    #[test]
    fn drive_ids_collects_all_remote_images() {
        let book = sample_book();
        assert_eq!(book.drive_ids(), ["item-img", "subsub-img", "older-img"]);
    }
}
