/// One row of the tabular form of the log. Parent columns repeat on every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    pub date: String,
    pub project: String,
    pub item: String,
    pub sub: String,
    pub subsub: String,
    pub item_img: String,
    pub sub_img: String,
    pub subsub_img: String,
    pub item_drive_id: String,
    pub sub_drive_id: String,
    pub subsub_drive_id: String,
}

impl FlatRow {
    pub const WIDTH: usize = 11;

    /// Header row of exported workbooks. Column order is fixed; imports rely on position only.
    pub const HEADER: [&'static str; Self::WIDTH] = [
        "日期",
        "案件名稱",
        "主項目(1)",
        "子項目(a)",
        "子子項目(i)",
        "主圖",
        "子圖",
        "子子圖",
        "主圖ID",
        "子圖ID",
        "子子圖ID",
    ];

    /// Builds a row from the first eleven cells, padding short rows with empty strings.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let cell = |i: usize| cells.get(i).map(|c| c.as_ref().to_string()).unwrap_or_default();
        Self {
            date: cell(0),
            project: cell(1),
            item: cell(2),
            sub: cell(3),
            subsub: cell(4),
            item_img: cell(5),
            sub_img: cell(6),
            subsub_img: cell(7),
            item_drive_id: cell(8),
            sub_drive_id: cell(9),
            subsub_drive_id: cell(10),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.project.clone(),
            self.item.clone(),
            self.sub.clone(),
            self.subsub.clone(),
            self.item_img.clone(),
            self.sub_img.clone(),
            self.subsub_img.clone(),
            self.item_drive_id.clone(),
            self.sub_drive_id.clone(),
            self.subsub_drive_id.clone(),
        ]
    }

    pub fn header_cells() -> Vec<String> {
        Self::HEADER.iter().map(|h| h.to_string()).collect()
    }
}
