//! The date-filtered, paginated worklog table.

use std::ops::RangeInclusive;

use time::Date;
use worklog_api::{RowId, WorklogRow};

use crate::details::DetailsEditor;
use crate::draft::{DraftController, FieldUpdate};
use crate::error::EditRejected;
use crate::row_store::RowStore;
use crate::time_codec::{self, HoursMinutes};

mod pagination;
pub use pagination::{Pager, PAGE_SIZE};

const DETAILS_PREVIEW_CHARS: usize = 90;

/// One visible line of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow<'a> {
    /// The draft while this row is edited, the stored row otherwise.
    pub row: &'a WorklogRow,
    pub is_editing: bool,
    pub sow_options: &'static [&'static str],
    pub time: HoursMinutes,
    pub details_preview: String,
}

pub struct GridView {
    rows: RowStore,
    draft: DraftController,
    details: DetailsEditor,
    pager: Pager,
    selected_date: Date,
    today: Date,
}

impl GridView {
    pub fn new(rows: RowStore, selected_date: Date, today: Date) -> Self {
        let mut grid = Self {
            rows,
            draft: DraftController::new(),
            details: DetailsEditor::new(),
            pager: Pager::default(),
            selected_date,
            today,
        };
        grid.clamp_page();
        grid
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn draft(&self) -> &DraftController {
        &self.draft
    }

    pub fn details(&self) -> &DetailsEditor {
        &self.details
    }

    pub fn selected_date(&self) -> Date {
        self.selected_date
    }

    /// Switch the filter to `date`. The active draft is committed first.
    pub fn set_selected_date(&mut self, date: Date) {
        self.draft.commit_if_editing(&mut self.rows);
        self.selected_date = date;
        self.clamp_page();
    }

    /// Create an empty row for the selected date when it has none.
    pub fn ensure_row_for_selected_date(&mut self) -> Option<RowId> {
        if self.filtered_count() > 0 {
            return None;
        }
        let row = WorklogRow::new(self.selected_date);
        let id = row.id;
        self.rows.add(row);
        self.clamp_page();
        Some(id)
    }

    fn filtered(&self) -> impl Iterator<Item = &WorklogRow> + '_ {
        self.rows
            .rows()
            .iter()
            .filter(move |row| row.date_or(self.today) == self.selected_date)
    }

    /// All rows of the selected date, in collection order.
    pub fn filtered_rows(&self) -> Vec<&WorklogRow> {
        self.filtered().collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().count()
    }

    /// Rows of the current page, with the draft standing in for the edited row.
    pub fn visible_rows(&self) -> Vec<GridRow<'_>> {
        let filtered = self.filtered_rows();
        let range = self.pager.range(filtered.len());
        filtered[range]
            .iter()
            .map(|&stored| {
                let row = match self.draft.draft() {
                    Some(draft) if draft.id == stored.id => draft,
                    _ => stored,
                };
                GridRow {
                    row,
                    is_editing: self.draft.is_editing(stored.id),
                    sow_options: self.draft.sow_options(stored),
                    time: time_codec::parse(&row.set_time),
                    details_preview: details_preview(&row.worked_item_details),
                }
            })
            .collect()
    }

    /// Sum of the selected date's durations.
    pub fn total(&self) -> HoursMinutes {
        time_codec::sum(self.filtered().map(|row| row.set_time.as_str()))
    }

    pub fn total_label(&self) -> String {
        let total = self.total();
        time_codec::format(total.hours, total.minutes)
    }

    /// Append an empty row for the selected date and start editing it.
    pub fn add_row(&mut self) -> RowId {
        let row = WorklogRow::new(self.selected_date);
        let id = row.id;
        self.rows.add(row.clone());
        self.pager.last(self.filtered_count());
        self.draft.begin_edit(&mut self.rows, &row);
        id
    }

    /// Append a copy of `id` under a new id and show the last page.
    pub fn duplicate_row(&mut self, id: RowId) -> Option<RowId> {
        let copy = self.rows.get(id)?.duplicate();
        let copy_id = copy.id;
        self.rows.add(copy);
        self.pager.last(self.filtered_count());
        Some(copy_id)
    }

    /// Remove `id`, dropping any edit state that belongs to it.
    pub fn delete_row(&mut self, id: RowId) -> bool {
        if !self.rows.contains(id) {
            return false;
        }
        if self.draft.is_editing(id) {
            self.draft.cancel();
        }
        self.details.discard_for(id);
        self.rows.remove(id);
        self.clamp_page();
        true
    }

    pub fn begin_edit(&mut self, id: RowId) -> Result<(), EditRejected> {
        let row = self
            .rows
            .get(id)
            .cloned()
            .ok_or(EditRejected::RowMissing(id))?;
        self.draft.begin_edit(&mut self.rows, &row);
        Ok(())
    }

    /// Edit a cell of `id`, entering edit mode for that row if needed.
    pub fn edit_field(&mut self, id: RowId, update: FieldUpdate) -> Result<(), EditRejected> {
        if !self.draft.is_editing(id) {
            self.begin_edit(id)?;
        }
        self.draft.mutate_field(&mut self.rows, update)
    }

    pub fn commit_edit(&mut self) -> Option<RowId> {
        self.draft.commit(&mut self.rows)
    }

    pub fn cancel_edit(&mut self) -> Option<RowId> {
        self.draft.cancel()
    }

    /// Called by the host when focus leaves the grid.
    pub fn commit_if_editing(&mut self) -> bool {
        self.draft.commit_if_editing(&mut self.rows)
    }

    pub fn open_details(&mut self, id: RowId) -> Result<(), EditRejected> {
        let row = self
            .rows
            .get(id)
            .cloned()
            .ok_or(EditRejected::RowMissing(id))?;
        self.details.open(&mut self.draft, &mut self.rows, &row);
        Ok(())
    }

    pub fn type_details(&mut self, text: impl Into<String>) -> Result<(), EditRejected> {
        self.details.typing(&self.draft, text)
    }

    pub fn save_details(&mut self) -> Option<RowId> {
        self.details.save(&mut self.draft, &mut self.rows)
    }

    pub fn details_notice(&self) -> Option<&'static str> {
        self.details.notice(&self.draft)
    }

    /// Replace rows with the persisted mirror after another context changed it.
    pub fn reload(&mut self) {
        self.rows.reload();

        if let Some(id) = self.draft.cancel() {
            if let Some(row) = self.rows.get(id).cloned() {
                self.draft.begin_edit(&mut self.rows, &row);
            }
        }
        if let Some(id) = self.details.row_id() {
            if !self.rows.contains(id) {
                self.details.discard_for(id);
            }
        }
        self.clamp_page();
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn page_count(&self) -> usize {
        Pager::total_pages(self.filtered_count())
    }

    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.page_count()
    }

    pub fn page_summary(&self) -> String {
        self.pager.summary(self.filtered_count())
    }

    /// Whether "Prev" should be enabled.
    pub fn has_prev_page(&self) -> bool {
        self.pager.has_prev()
    }

    pub fn has_next_page(&self) -> bool {
        self.pager.has_next(self.filtered_count())
    }

    pub fn next_page(&mut self) {
        let count = self.filtered_count();
        self.pager.next(count);
    }

    pub fn prev_page(&mut self) {
        let count = self.filtered_count();
        self.pager.prev(count);
    }

    pub fn go_to_page(&mut self, page: usize) {
        let count = self.filtered_count();
        self.pager.go_to(page, count);
    }

    fn clamp_page(&mut self) {
        let count = self.filtered_count();
        self.pager.clamp(count);
    }
}

/// First 90 characters of the details, `-` when empty.
pub fn details_preview(text: &str) -> String {
    if text.is_empty() {
        return "-".to_string();
    }
    match text.char_indices().nth(DETAILS_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
