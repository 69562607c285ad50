use super::flat_row::FlatRow;
use crate::model::{Day, ImageRef, Item, LogBook, Project, Sub, SubSub};
use tracing::debug;

/// Rebuilds the tree from rows, grouping consecutive rows under the node their
/// first occurrence created.
///
/// A row starts a new day when its date differs from the current day's date,
/// a new project when its non-empty name differs from the current project's,
/// and likewise for item and sub contents. Rows are never merged into earlier,
/// non-adjacent nodes. Adjacent siblings with identical text therefore collapse
/// into one node.
pub fn unflatten(rows: &[FlatRow]) -> LogBook {
    let mut cursor = Cursor::default();
    let mut skipped = 0usize;
    for row in rows {
        if !cursor.apply(row) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        debug!(skipped, total = rows.len(), "rows without a date or parent were dropped");
    }
    LogBook::new(cursor.days)
}

/// Indices of the nodes that the next row may extend. `None` means no open node at that level.
#[derive(Default)]
struct Cursor {
    days: Vec<Day>,
    project: Option<usize>,
    item: Option<usize>,
    sub: Option<usize>,
}

impl Cursor {
    /// Returns `false` when the row contributed nothing.
    fn apply(&mut self, row: &FlatRow) -> bool {
        if row.date.is_empty() {
            return false;
        }
        if self.days.last().is_none_or(|day| day.date != row.date) {
            self.days.push(Day::new(row.date.clone()));
            self.project = None;
            self.item = None;
            self.sub = None;
        }
        let Some(day) = self.days.last_mut() else {
            return false;
        };

        if !row.project.is_empty()
            && self.project.is_none_or(|p| day.projects[p].name != row.project)
        {
            day.projects.push(Project::new(row.project.clone()));
            self.project = Some(day.projects.len() - 1);
            self.item = None;
            self.sub = None;
        }

        if !row.item.is_empty() {
            let Some(p) = self.project else {
                return false;
            };
            let project = &mut day.projects[p];
            if self.item.is_none_or(|i| project.items[i].content != row.item) {
                project.items.push(
                    Item::new(row.item.clone())
                        .with_image(ImageRef::new(&row.item_img, &row.item_drive_id)),
                );
                self.item = Some(project.items.len() - 1);
                self.sub = None;
            }
        }

        if !row.sub.is_empty() {
            let (Some(p), Some(i)) = (self.project, self.item) else {
                return false;
            };
            let item = &mut day.projects[p].items[i];
            if self.sub.is_none_or(|s| item.subs[s].content != row.sub) {
                item.subs.push(
                    Sub::new(row.sub.clone())
                        .with_image(ImageRef::new(&row.sub_img, &row.sub_drive_id)),
                );
                self.sub = Some(item.subs.len() - 1);
            }
        }

        if !row.subsub.is_empty() {
            let (Some(p), Some(i), Some(s)) = (self.project, self.item, self.sub) else {
                return false;
            };
            day.projects[p].items[i].subs[s].subsubs.push(
                SubSub::new(row.subsub.clone())
                    .with_image(ImageRef::new(&row.subsub_img, &row.subsub_drive_id)),
            );
        }
        true
    }
}
