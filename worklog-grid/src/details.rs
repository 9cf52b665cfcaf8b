//! Modal editor for the worked-item details of one row.

use worklog_api::{RowId, WorklogRow};

use crate::draft::{DraftController, FieldUpdate};
use crate::error::EditRejected;
use crate::row_store::RowStore;

pub const READ_ONLY_NOTICE: &str =
    "This row is not in edit mode. Click Edit on the row to modify details.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailsState {
    #[default]
    Closed,
    Open { row_id: RowId, buffer: String },
}

#[derive(Debug, Clone, Default)]
pub struct DetailsEditor {
    state: DetailsState,
}

impl DetailsEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailsState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DetailsState::Open { .. })
    }

    pub fn row_id(&self) -> Option<RowId> {
        match &self.state {
            DetailsState::Open { row_id, .. } => Some(*row_id),
            DetailsState::Closed => None,
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match &self.state {
            DetailsState::Open { buffer, .. } => Some(buffer.as_str()),
            DetailsState::Closed => None,
        }
    }

    /// Open the editor for `row`, putting the row in edit mode first.
    pub fn open(&mut self, draft: &mut DraftController, rows: &mut RowStore, row: &WorklogRow) {
        draft.begin_edit(rows, row);
        self.state = DetailsState::Open {
            row_id: row.id,
            buffer: row.worked_item_details.clone(),
        };
    }

    /// Editable only while the owning row is the active draft.
    pub fn is_read_only(&self, draft: &DraftController) -> bool {
        match self.row_id() {
            Some(id) => !draft.is_editing(id),
            None => true,
        }
    }

    /// Notice to show while the editor is open but read-only.
    pub fn notice(&self, draft: &DraftController) -> Option<&'static str> {
        (self.is_open() && self.is_read_only(draft)).then_some(READ_ONLY_NOTICE)
    }

    /// Replace the buffer. Nothing is written until [`save`](Self::save).
    pub fn typing(
        &mut self,
        draft: &DraftController,
        text: impl Into<String>,
    ) -> Result<(), EditRejected> {
        let read_only = self.is_read_only(draft);
        let DetailsState::Open { buffer, .. } = &mut self.state else {
            return Err(EditRejected::DetailsClosed);
        };
        if read_only {
            return Err(EditRejected::DetailsReadOnly);
        }
        *buffer = text.into();
        Ok(())
    }

    /// Write the buffer back and close.
    ///
    /// Goes through the draft when the row is still being edited, otherwise
    /// straight into `rows`.
    pub fn save(&mut self, draft: &mut DraftController, rows: &mut RowStore) -> Option<RowId> {
        let DetailsState::Open { row_id, buffer } = std::mem::take(&mut self.state) else {
            return None;
        };

        if draft.is_editing(row_id) {
            // Only `NotEditing` can fail here and the draft was just checked.
            let _ = draft.mutate_field(rows, FieldUpdate::WorkedItemDetails(buffer));
        } else if let Some(row) = rows.get(row_id) {
            let mut row = row.clone();
            row.worked_item_details = buffer;
            rows.update(row);
        }
        Some(row_id)
    }

    /// Close without saving if the editor belongs to `id`.
    pub fn discard_for(&mut self, id: RowId) -> bool {
        if self.row_id() == Some(id) {
            self.state = DetailsState::Closed;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use time::macros::date;

    struct Fixture {
        rows: RowStore,
        draft: DraftController,
        details: DetailsEditor,
        a: WorklogRow,
        b: WorklogRow,
    }

    fn fixture() -> Fixture {
        let mut a = WorklogRow::new(date!(2024 - 01 - 05));
        a.worked_item_details = "initial notes".to_string();
        let b = WorklogRow::new(date!(2024 - 01 - 05));
        let mut rows = RowStore::open(Arc::new(MemoryStore::new()));
        rows.replace_all(vec![a.clone(), b.clone()]);
        Fixture {
            rows,
            draft: DraftController::new(),
            details: DetailsEditor::new(),
            a,
            b,
        }
    }

    #[test]
    fn open_starts_editing_and_seeds_buffer() {
        let mut f = fixture();
        f.details.open(&mut f.draft, &mut f.rows, &f.a);

        assert!(f.draft.is_editing(f.a.id));
        assert_eq!(f.details.buffer(), Some("initial notes"));
        assert!(!f.details.is_read_only(&f.draft));
        assert_eq!(f.details.notice(&f.draft), None);
    }

    #[test]
    fn typing_does_not_touch_rows_until_save() {
        let mut f = fixture();
        f.details.open(&mut f.draft, &mut f.rows, &f.a);

        f.details.typing(&f.draft, "rewritten notes").unwrap();
        assert_eq!(f.rows.get(f.a.id).unwrap().worked_item_details, "initial notes");

        assert_eq!(f.details.save(&mut f.draft, &mut f.rows), Some(f.a.id));
        assert_eq!(f.rows.get(f.a.id).unwrap().worked_item_details, "rewritten notes");
        assert_eq!(f.draft.draft().unwrap().worked_item_details, "rewritten notes");
        assert!(f.draft.is_editing(f.a.id));
        assert!(!f.details.is_open());
    }

    #[test]
    fn typing_is_rejected_once_row_left_edit_mode() {
        let mut f = fixture();
        f.details.open(&mut f.draft, &mut f.rows, &f.a);
        f.draft.commit(&mut f.rows);

        assert_eq!(
            f.details.typing(&f.draft, "late edit"),
            Err(EditRejected::DetailsReadOnly)
        );
        assert_eq!(f.details.notice(&f.draft), Some(READ_ONLY_NOTICE));
        assert_eq!(f.details.buffer(), Some("initial notes"));
    }

    #[test]
    fn save_writes_directly_when_row_is_not_the_draft() {
        let mut f = fixture();
        f.details.open(&mut f.draft, &mut f.rows, &f.a);
        f.details.typing(&f.draft, "typed while editing").unwrap();

        // Another row takes over the draft before the modal is closed.
        f.draft.begin_edit(&mut f.rows, &f.b);
        f.details.save(&mut f.draft, &mut f.rows);

        assert_eq!(
            f.rows.get(f.a.id).unwrap().worked_item_details,
            "typed while editing"
        );
        assert!(f.draft.is_editing(f.b.id));
    }

    #[test]
    fn typing_or_saving_while_closed() {
        let mut f = fixture();
        assert_eq!(
            f.details.typing(&f.draft, "x"),
            Err(EditRejected::DetailsClosed)
        );
        assert_eq!(f.details.save(&mut f.draft, &mut f.rows), None);
        assert_eq!(f.details.notice(&f.draft), None);
    }

    #[test]
    fn discard_only_matches_owning_row() {
        let mut f = fixture();
        f.details.open(&mut f.draft, &mut f.rows, &f.a);

        assert!(!f.details.discard_for(f.b.id));
        assert!(f.details.discard_for(f.a.id));
        assert!(!f.details.is_open());
    }
}
