//! Top-level application object tying the store, persistence and the
//! presentation port together.

use crate::error::{BoardError, Result};
use crate::persistence::PersistenceAdapter;
use crate::presenter::{NoticeKind, Presenter};
use crate::storage::KeyValueStore;
use crate::store::{BoardStore, Command, Outcome};
use log::debug;

/// Owns the board for one page/session
pub struct BoardApp<S, P> {
    store: BoardStore,
    adapter: PersistenceAdapter<S>,
    presenter: P,
}

impl<S: KeyValueStore, P: Presenter> BoardApp<S, P> {
    /// Loads saved state and builds the app. A recovered load is shown as
    /// an error notice but never fails.
    pub async fn open(adapter: PersistenceAdapter<S>, presenter: P) -> Self {
        let outcome = adapter.load().await;
        if outcome.recovered_from().is_some() {
            presenter.notify("Error loading saved data", NoticeKind::Error);
        }

        Self {
            store: BoardStore::new(outcome.into_board()),
            adapter,
            presenter,
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Direct store access for callers that rely on autosave
    pub fn store_mut(&mut self) -> &mut BoardStore {
        &mut self.store
    }

    pub fn adapter(&self) -> &PersistenceAdapter<S> {
        &self.adapter
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Runs a command, persists the result and tells the user how it went.
    ///
    /// Validation and not-found errors are notified and returned. A failed
    /// save is notified but the mutation stays applied.
    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        if let Command::Delete { id } = &command {
            let title = match self.store.find(id) {
                Some(item) => item.title.clone(),
                None => {
                    let err = BoardError::ItemNotFound(id.to_string());
                    self.report(&err);
                    return Err(err);
                }
            };
            let question = format!("Are you sure you want to delete \"{}\"?", title);
            if !self.presenter.confirm(&question) {
                debug!("Delete of {} cancelled", id);
                return Ok(Outcome::Cancelled);
            }
        }

        let outcome = match self.store.apply(command) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };

        if outcome.is_change() {
            // The save error is already logged and notified; the caller may retry
            let _ = self.save().await;
        }
        if let Some(message) = success_message(&outcome) {
            self.presenter.notify(&message, NoticeKind::Success);
        }

        Ok(outcome)
    }

    /// Persists the current board and marks it saved
    pub async fn save(&mut self) -> Result<()> {
        let revision = self.store.revision();
        match self.adapter.save(self.store.board()).await {
            Ok(()) => {
                self.store.mark_saved(revision);
                Ok(())
            }
            Err(err) => {
                self.presenter.notify("Error saving data", NoticeKind::Error);
                Err(err)
            }
        }
    }

    /// Saves only when there are unsaved mutations; returns whether it saved
    pub async fn save_if_dirty(&mut self) -> Result<bool> {
        if !self.store.is_dirty() {
            return Ok(false);
        }
        self.save().await?;
        Ok(true)
    }

    fn report(&self, err: &BoardError) {
        let message = match err {
            BoardError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        self.presenter.notify(&message, NoticeKind::Error);
    }
}

fn success_message(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Added { column, .. } => Some(format!("{} added successfully", column.item_noun())),
        Outcome::Updated { .. } => Some("Task updated successfully".to_string()),
        Outcome::Deleted { .. } => Some("Task deleted successfully".to_string()),
        Outcome::Moved { to, .. } => Some(format!("Task moved to {}", to.title())),
        Outcome::Unchanged { .. } | Outcome::Cancelled => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnId, ItemId, ItemPatch};
    use crate::storage::MemoryStorage;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPresenter {
        answer: bool,
        questions: Mutex<Vec<String>>,
        notices: Mutex<Vec<(String, NoticeKind)>>,
    }

    impl RecordingPresenter {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                ..Self::default()
            }
        }

        fn last_notice(&self) -> Option<(String, NoticeKind)> {
            self.notices.lock().unwrap().last().cloned()
        }
    }

    impl Presenter for RecordingPresenter {
        fn confirm(&self, message: &str) -> bool {
            self.questions.lock().unwrap().push(message.to_string());
            self.answer
        }

        fn notify(&self, message: &str, kind: NoticeKind) {
            self.notices.lock().unwrap().push((message.to_string(), kind));
        }
    }

    fn add(column: ColumnId, title: &str) -> Command {
        Command::Add {
            column,
            title: title.to_string(),
            description: None,
            priority: None,
        }
    }

    async fn open_app(
        storage: MemoryStorage,
        presenter: RecordingPresenter,
    ) -> BoardApp<MemoryStorage, RecordingPresenter> {
        BoardApp::open(PersistenceAdapter::new(storage), presenter).await
    }

    #[tokio::test]
    async fn test_open_with_corrupt_state_notifies() {
        let storage = MemoryStorage::new();
        storage.set("teamKanbanData", "[1, 2").await.unwrap();

        let app = open_app(storage, RecordingPresenter::default()).await;

        assert_eq!(app.store().counters().total(), 0);
        assert_eq!(
            app.presenter().last_notice(),
            Some(("Error loading saved data".to_string(), NoticeKind::Error))
        );
    }

    #[tokio::test]
    async fn test_dispatch_add_saves_and_notifies() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::default()).await;

        app.dispatch(add(ColumnId::Resources, "Style guide")).await.unwrap();

        assert!(!app.store().is_dirty());
        assert!(app.adapter().storage().get("teamKanbanData").await.unwrap().is_some());
        assert_eq!(
            app.presenter().last_notice(),
            Some(("Resource added successfully".to_string(), NoticeKind::Success))
        );
    }

    #[tokio::test]
    async fn test_dispatch_validation_error_is_notified() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::default()).await;

        let result = app.dispatch(add(ColumnId::Todo, "  ")).await;

        assert!(matches!(result, Err(BoardError::Validation(_))));
        assert_eq!(
            app.presenter().last_notice(),
            Some(("Task title is required".to_string(), NoticeKind::Error))
        );
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::answering(false)).await;
        let outcome = app.dispatch(add(ColumnId::Todo, "Keep me")).await.unwrap();
        let id = outcome.item().unwrap().id.clone();

        let result = app.dispatch(Command::Delete { id: id.clone() }).await.unwrap();

        assert_eq!(result, Outcome::Cancelled);
        assert!(app.store().find(&id).is_some());
        assert_eq!(
            app.presenter().questions.lock().unwrap().as_slice(),
            ["Are you sure you want to delete \"Keep me\"?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::answering(true)).await;
        let outcome = app.dispatch(add(ColumnId::Todo, "Remove me")).await.unwrap();
        let id = outcome.item().unwrap().id.clone();

        app.dispatch(Command::Delete { id: id.clone() }).await.unwrap();

        assert!(app.store().find(&id).is_none());
        assert_eq!(
            app.presenter().last_notice(),
            Some(("Task deleted successfully".to_string(), NoticeKind::Success))
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_item_skips_confirmation() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::answering(true)).await;

        let result = app.dispatch(Command::Delete { id: ItemId::new(5) }).await;

        assert!(matches!(result, Err(BoardError::ItemNotFound(_))));
        assert!(app.presenter().questions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_notice_uses_column_title() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::default()).await;
        let outcome = app.dispatch(add(ColumnId::Todo, "Ship it")).await.unwrap();
        let id = outcome.item().unwrap().id.clone();

        app.dispatch(Command::Move {
            id,
            from: ColumnId::Todo,
            to: ColumnId::Completed,
        })
        .await
        .unwrap();

        assert_eq!(
            app.presenter().last_notice(),
            Some(("Task moved to Completed".to_string(), NoticeKind::Success))
        );
    }

    #[tokio::test]
    async fn test_failed_save_keeps_mutation_and_can_retry() {
        // Big enough for an empty board only
        let empty_len = crate::persistence::encode(&Default::default()).unwrap().len();
        let storage = MemoryStorage::with_quota("teamKanbanData".len() + empty_len + 8);
        let mut app = open_app(storage, RecordingPresenter::default()).await;

        let outcome = app
            .dispatch(add(ColumnId::Todo, "A title long enough to blow the quota"))
            .await
            .unwrap();
        let id = outcome.item().unwrap().id.clone();

        assert!(app.store().find(&id).is_some());
        assert!(app.store().is_dirty());
        let notices = app.presenter().notices.lock().unwrap().clone();
        assert!(notices.contains(&("Error saving data".to_string(), NoticeKind::Error)));

        app.store_mut().delete(&id).unwrap();
        assert!(app.save_if_dirty().await.unwrap());
        assert!(!app.store().is_dirty());
    }

    #[tokio::test]
    async fn test_update_through_dispatch() {
        let mut app = open_app(MemoryStorage::new(), RecordingPresenter::default()).await;
        let outcome = app.dispatch(add(ColumnId::Todo, "Draft")).await.unwrap();
        let id = outcome.item().unwrap().id.clone();

        app.dispatch(Command::Update {
            id: id.clone(),
            patch: ItemPatch::new().title("Final"),
        })
        .await
        .unwrap();

        assert_eq!(app.store().find(&id).unwrap().title, "Final");
        assert_eq!(
            app.presenter().last_notice(),
            Some(("Task updated successfully".to_string(), NoticeKind::Success))
        );
    }
}
