use super::flat_row::FlatRow;
use crate::model::LogBook;

/// Flattens the tree into rows in traversal order.
///
/// Every leaf path produces one row: an item without subs, a sub without
/// sub-subs, or a sub-sub. A project without items still produces a row
/// carrying only its date and name. Days without projects produce nothing.
pub fn flatten(book: &LogBook) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    for day in &book.days {
        for project in &day.projects {
            let project_row = FlatRow {
                date: day.date.clone(),
                project: project.name.clone(),
                ..Default::default()
            };
            if project.items.is_empty() {
                rows.push(project_row);
                continue;
            }
            for item in &project.items {
                let item_row = FlatRow {
                    item: item.content.clone(),
                    item_img: item.image.img_url.clone(),
                    item_drive_id: item.image.drive_id.clone(),
                    ..project_row.clone()
                };
                if item.subs.is_empty() {
                    rows.push(item_row);
                    continue;
                }
                for sub in &item.subs {
                    let sub_row = FlatRow {
                        sub: sub.content.clone(),
                        sub_img: sub.image.img_url.clone(),
                        sub_drive_id: sub.image.drive_id.clone(),
                        ..item_row.clone()
                    };
                    if sub.subsubs.is_empty() {
                        rows.push(sub_row);
                        continue;
                    }
                    rows.extend(sub.subsubs.iter().map(|subsub| FlatRow {
                        subsub: subsub.content.clone(),
                        subsub_img: subsub.image.img_url.clone(),
                        subsub_drive_id: subsub.image.drive_id.clone(),
                        ..sub_row.clone()
                    }));
                }
            }
        }
    }
    rows
}
