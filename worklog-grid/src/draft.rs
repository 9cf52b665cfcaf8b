//! Single-row edit buffer.

use worklog_api::{RowId, WorklogRow};

use crate::catalog;
use crate::error::EditRejected;
use crate::row_store::RowStore;
use crate::time_codec;

/// One edit per column of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Client(String),
    SowNo(String),
    ChangeRequestNo(String),
    /// Sets the hours part of `setTime`, keeping the minutes.
    Hours(u32),
    /// Sets the minutes part of `setTime`, keeping the hours.
    Minutes(u32),
    WorkedItemDetails(String),
}

impl FieldUpdate {
    /// Validate against the catalog and apply to `row`. On rejection `row` is untouched.
    pub fn apply_to(self, row: &mut WorklogRow) -> Result<(), EditRejected> {
        match self {
            FieldUpdate::Client(client) => {
                if !client.is_empty() && !catalog::is_known_client(&client) {
                    return Err(EditRejected::UnknownClient(client));
                }
                row.client = client;
            }
            FieldUpdate::SowNo(sow) => {
                if !sow.is_empty() && !catalog::sow_options(&row.client).contains(&sow.as_str()) {
                    return Err(EditRejected::SowNotOffered { sow });
                }
                row.sow_no = sow;
            }
            FieldUpdate::ChangeRequestNo(cr) => row.change_request_no = cr,
            FieldUpdate::Hours(hours) => {
                if !catalog::HOUR_OPTIONS.contains(&hours) {
                    return Err(EditRejected::HoursOutOfRange(hours));
                }
                let current = time_codec::parse(&row.set_time);
                row.set_time = time_codec::format(hours, current.minutes);
            }
            FieldUpdate::Minutes(minutes) => {
                if !catalog::MINUTE_OPTIONS.contains(&minutes) {
                    return Err(EditRejected::MinutesNotOffered(minutes));
                }
                let current = time_codec::parse(&row.set_time);
                row.set_time = time_codec::format(current.hours, minutes);
            }
            FieldUpdate::WorkedItemDetails(details) => row.worked_item_details = details,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DraftState {
    #[default]
    Idle,
    /// The draft: a full copy of the row being edited.
    Editing(WorklogRow),
}

/// Owns the draft. At most one row is in edit mode at a time.
#[derive(Debug, Clone, Default)]
pub struct DraftController {
    state: DraftState,
}

impl DraftController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn draft(&self) -> Option<&WorklogRow> {
        match &self.state {
            DraftState::Editing(draft) => Some(draft),
            DraftState::Idle => None,
        }
    }

    pub fn editing_id(&self) -> Option<RowId> {
        self.draft().map(|draft| draft.id)
    }

    pub fn is_editing(&self, id: RowId) -> bool {
        self.editing_id() == Some(id)
    }

    /// Put `row` in edit mode, committing any other row that was being edited.
    pub fn begin_edit(&mut self, rows: &mut RowStore, row: &WorklogRow) {
        match self.editing_id() {
            Some(active) if active == row.id => return,
            Some(_) => {
                self.commit(rows);
            }
            None => {}
        }
        self.state = DraftState::Editing(row.clone());
    }

    /// Apply `update` to the draft and push the result into `rows` right away.
    pub fn mutate_field(
        &mut self,
        rows: &mut RowStore,
        update: FieldUpdate,
    ) -> Result<(), EditRejected> {
        let DraftState::Editing(draft) = &mut self.state else {
            return Err(EditRejected::NotEditing);
        };
        update.apply_to(draft)?;
        rows.update(draft.clone());
        Ok(())
    }

    /// Write the draft into `rows` and leave edit mode.
    ///
    /// Returns the committed row id, or `None` when nothing was being edited.
    pub fn commit(&mut self, rows: &mut RowStore) -> Option<RowId> {
        match std::mem::take(&mut self.state) {
            DraftState::Idle => None,
            DraftState::Editing(draft) => {
                let id = draft.id;
                rows.update(draft);
                Some(id)
            }
        }
    }

    /// Entry point for the host when focus leaves the grid.
    pub fn commit_if_editing(&mut self, rows: &mut RowStore) -> bool {
        self.commit(rows).is_some()
    }

    /// Leave edit mode without writing the draft.
    ///
    /// Field edits already pushed by [`mutate_field`](Self::mutate_field) stay in `rows`.
    pub fn cancel(&mut self) -> Option<RowId> {
        match std::mem::take(&mut self.state) {
            DraftState::Idle => None,
            DraftState::Editing(draft) => Some(draft.id),
        }
    }

    /// SOW numbers offered for `row`, following the draft's client while it is edited.
    pub fn sow_options(&self, row: &WorklogRow) -> &'static [&'static str] {
        match self.draft() {
            Some(draft) if draft.id == row.id => catalog::sow_options(&draft.client),
            _ => catalog::sow_options(&row.client),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use time::macros::date;

    fn store_with(rows: &[WorklogRow]) -> RowStore {
        let mut store = RowStore::open(Arc::new(MemoryStore::new()));
        store.replace_all(rows.to_vec());
        store
    }

    fn blank() -> WorklogRow {
        WorklogRow::new(date!(2024 - 01 - 05))
    }

    #[test]
    fn begin_edit_snapshots_row() {
        let a = blank();
        let mut rows = store_with(&[a.clone()]);
        let mut draft = DraftController::new();

        draft.begin_edit(&mut rows, &a);
        assert_eq!(draft.state(), &DraftState::Editing(a.clone()));
        assert!(draft.is_editing(a.id));
    }

    #[test]
    fn mutate_field_pushes_into_rows_immediately() {
        let a = blank();
        let mut rows = store_with(&[a.clone()]);
        let mut draft = DraftController::new();
        draft.begin_edit(&mut rows, &a);

        draft
            .mutate_field(&mut rows, FieldUpdate::Client("Client A".to_string()))
            .unwrap();

        assert_eq!(rows.get(a.id).unwrap().client, "Client A");
        assert_eq!(draft.draft().unwrap().client, "Client A");
        assert!(draft.is_editing(a.id));
    }

    #[test]
    fn mutate_while_idle_is_rejected() {
        let mut rows = store_with(&[blank()]);
        let mut draft = DraftController::new();

        let err = draft
            .mutate_field(&mut rows, FieldUpdate::ChangeRequestNo("CR-1".to_string()))
            .unwrap_err();
        assert_eq!(err, EditRejected::NotEditing);
    }

    #[test]
    fn switching_rows_commits_previous_draft() {
        let a = blank();
        let b = blank();
        let mut rows = store_with(&[a.clone(), b.clone()]);
        let mut draft = DraftController::new();

        draft.begin_edit(&mut rows, &a);
        draft
            .mutate_field(&mut rows, FieldUpdate::ChangeRequestNo("CR-7".to_string()))
            .unwrap();
        draft
            .mutate_field(&mut rows, FieldUpdate::Hours(3))
            .unwrap();

        draft.begin_edit(&mut rows, &b);

        let committed = rows.get(a.id).unwrap();
        assert_eq!(committed.change_request_no, "CR-7");
        assert_eq!(committed.set_time, "3h 0m");
        assert!(draft.is_editing(b.id));
    }

    #[test]
    fn cancel_keeps_live_edits() {
        let a = blank();
        let mut rows = store_with(&[a.clone()]);
        let mut draft = DraftController::new();
        draft.begin_edit(&mut rows, &a);

        draft
            .mutate_field(&mut rows, FieldUpdate::Client("Client B".to_string()))
            .unwrap();
        draft
            .mutate_field(&mut rows, FieldUpdate::Minutes(45))
            .unwrap();
        assert_eq!(draft.cancel(), Some(a.id));

        let row = rows.get(a.id).unwrap();
        assert_eq!(row.client, "Client B");
        assert_eq!(row.set_time, "0h 45m");
        assert_eq!(draft.state(), &DraftState::Idle);
    }

    #[test]
    fn commit_if_editing_is_a_no_op_when_idle() {
        let mut rows = store_with(&[blank()]);
        let mut draft = DraftController::new();
        assert!(!draft.commit_if_editing(&mut rows));
    }

    #[test]
    fn time_parts_keep_each_other() {
        let mut row = blank();
        row.set_time = "2h 30m".to_string();

        FieldUpdate::Hours(5).apply_to(&mut row).unwrap();
        assert_eq!(row.set_time, "5h 30m");
        FieldUpdate::Minutes(15).apply_to(&mut row).unwrap();
        assert_eq!(row.set_time, "5h 15m");
    }

    #[test]
    fn values_outside_the_catalog_are_rejected() {
        let mut row = blank();

        assert_eq!(
            FieldUpdate::Client("Client Z".to_string()).apply_to(&mut row),
            Err(EditRejected::UnknownClient("Client Z".to_string()))
        );
        assert_eq!(
            FieldUpdate::Hours(13).apply_to(&mut row),
            Err(EditRejected::HoursOutOfRange(13))
        );
        assert_eq!(
            FieldUpdate::Minutes(20).apply_to(&mut row),
            Err(EditRejected::MinutesNotOffered(20))
        );
        assert_eq!(row, blank_like(&row));
    }

    fn blank_like(row: &WorklogRow) -> WorklogRow {
        WorklogRow {
            id: row.id,
            ..WorklogRow::new(date!(2024 - 01 - 05))
        }
    }

    #[test]
    fn sow_must_belong_to_current_client() {
        let mut row = blank();
        FieldUpdate::Client("Client A".to_string())
            .apply_to(&mut row)
            .unwrap();

        assert!(FieldUpdate::SowNo("SOW-A-002".to_string())
            .apply_to(&mut row)
            .is_ok());
        assert_eq!(
            FieldUpdate::SowNo("SOW-B-101".to_string()).apply_to(&mut row),
            Err(EditRejected::SowNotOffered {
                sow: "SOW-B-101".to_string()
            })
        );
    }

    #[test]
    fn changing_client_keeps_chosen_sow() {
        let mut row = blank();
        FieldUpdate::Client("Client A".to_string())
            .apply_to(&mut row)
            .unwrap();
        FieldUpdate::SowNo("SOW-A-001".to_string())
            .apply_to(&mut row)
            .unwrap();

        FieldUpdate::Client("Client C".to_string())
            .apply_to(&mut row)
            .unwrap();
        assert_eq!(row.sow_no, "SOW-A-001");
    }

    #[test]
    fn sow_options_follow_the_draft_client() {
        let a = blank();
        let mut rows = store_with(&[a.clone()]);
        let mut draft = DraftController::new();
        draft.begin_edit(&mut rows, &a);
        draft
            .mutate_field(&mut rows, FieldUpdate::Client("Client C".to_string()))
            .unwrap();

        // `a` is the stale snapshot with no client.
        assert_eq!(draft.sow_options(&a), catalog::sow_options("Client C"));
        draft.cancel();
        assert_eq!(draft.sow_options(&a), &catalog::DEFAULT_SOWS[..]);
    }
}
