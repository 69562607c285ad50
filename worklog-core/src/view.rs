//! Filtering the book for display and reports.

use crate::dates::{MonthFilter, ROC_OFFSET, month_part_of, roc_year_of};
use crate::error::{Result, WorkLogError};
use crate::model::{Day, LogBook, NodeRef, NodePath};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// What the day list shows.
///
/// A non-blank `search` ignores the year and month and matches the day's
/// date, project names and contents case-insensitively. Without a search,
/// days are kept when their ROC year matches `year` and, unless the month is
/// `All`, their month component matches too. No year means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub search: Option<String>,
    /// Gregorian year.
    pub year: Option<i32>,
    pub month: MonthFilter,
}

impl ViewFilter {
    pub fn matches(&self, day: &Day) -> bool {
        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            return day_contains(day, &query.to_lowercase());
        }
        let Some(year) = self.year else {
            return true;
        };
        let (Some(day_year), Some(month_part)) = (roc_year_of(&day.date), month_part_of(&day.date))
        else {
            return false;
        };
        day_year == year - ROC_OFFSET && self.month.matches(month_part)
    }
}

fn day_contains(day: &Day, lowercase_query: &str) -> bool {
    let mut found = false;
    NodeRef::Day(day).walk(NodePath::Day { day: 0 }, &mut |_, node| {
        found = found || node.text().to_lowercase().contains(lowercase_query);
    });
    found
}

/// Days passing `filter`, with their index in the book.
pub fn visible_days<'a>(book: &'a LogBook, filter: &ViewFilter) -> Vec<(usize, &'a Day)> {
    book.days
        .iter()
        .enumerate()
        .filter(|(_, day)| filter.matches(day))
        .collect()
}

/// Non-blank project names across the book, deduplicated and sorted.
pub fn unique_project_names(book: &LogBook) -> Vec<String> {
    book.days
        .iter()
        .flat_map(|day| &day.projects)
        .filter(|project| !project.name.trim().is_empty())
        .map(|project| project.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Gregorian years present in the book plus the current one, newest first.
pub fn year_list(book: &LogBook, today: NaiveDate) -> Vec<i32> {
    let mut years: BTreeSet<i32> = book
        .days
        .iter()
        .filter_map(|day| roc_year_of(&day.date))
        .map(|roc| roc + ROC_OFFSET)
        .collect();
    years.insert(today.year());
    years.into_iter().rev().collect()
}

/// Selection for a single-project report. Bounds are inclusive ROC date strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub project: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Days within the bounds that contain the project, each reduced to that
/// project alone (its first occurrence in the day).
pub fn generate_report(book: &LogBook, filter: &ReportFilter) -> Result<LogBook> {
    if filter.project.trim().is_empty() {
        return Err(WorkLogError::MissingProject);
    }
    let in_range = |date: &str| {
        filter.start.as_deref().is_none_or(|start| date >= start)
            && filter.end.as_deref().is_none_or(|end| date <= end)
    };
    let days = book
        .days
        .iter()
        .filter(|day| in_range(&day.date))
        .filter_map(|day| {
            let project = day.projects.iter().find(|p| p.name == filter.project)?;
            Some(Day::new(day.date.clone()).with_projects(vec![project.clone()]))
        })
        .collect();
    Ok(LogBook::new(days))
}
