//! Optimistic list controller.
//!
//! `ItemList` holds what a UI shows: one view per item, the add-item input,
//! an inline input error and at most one modal. Every mutation goes through
//! [`ItemsApi`] and the view is reconciled with whatever the server answers,
//! including items that were deleted by someone else in the meantime.
//!
//! Removals are two-step: a removed item is first marked
//! [`Phase::Deleting`] and only disappears once its transition ends, the way a
//! browser waits for a CSS transition before dropping the element.

use crate::client::api::{ClientError, ItemsApi};
use crate::services::validation::unescape_html;
use crate::state::items::{Item, ItemId};

pub const EMPTY_INPUT_MESSAGE: &str = "Item cannot be empty.";
pub const DELETED_ELSEWHERE_MESSAGE: &str = "The item has been deleted by someone else";
pub const DELETE_ALL_REMINDER: &str = "This will delete all items.";

/// Where an item element is in its enter/leave animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Idle,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    id: ItemId,
    known_good: String,
    input: String,
    editing: bool,
    phase: Phase,
}

impl ItemView {
    fn new(item: Item, phase: Phase) -> Self {
        let name = unescape_html(&item.name);
        Self {
            id: item.id,
            input: name.clone(),
            known_good: name,
            editing: false,
            phase,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Last name the server confirmed, as the user typed it.
    pub fn name(&self) -> &str {
        &self.known_good
    }

    /// What the edit input currently holds.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn cancel_edit(&mut self) {
        self.editing = false;
        self.input = self.known_good.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Asks before the whole list is cleared.
    ConfirmDeleteAll,
    Error { message: String, retry: bool },
}

impl Modal {
    fn failure(message: impl Into<String>) -> Self {
        Modal::Error {
            message: message.into(),
            retry: true,
        }
    }

    fn deleted_elsewhere() -> Self {
        Modal::Error {
            message: DELETED_ELSEWHERE_MESSAGE.to_string(),
            retry: false,
        }
    }

    /// Text shown to the user.
    pub fn describe(&self) -> String {
        match self {
            Modal::ConfirmDeleteAll => format!("Reminder. {DELETE_ALL_REMINDER}"),
            Modal::Error { message, retry: true } => {
                format!("Sorry. {message}. Please try again later.")
            }
            Modal::Error { message, retry: false } => format!("Sorry. {message}."),
        }
    }
}

pub struct ItemList<A> {
    api: A,
    items: Vec<ItemView>,
    add_input: String,
    input_error: Option<String>,
    modal: Option<Modal>,
}

impl<A: ItemsApi> ItemList<A> {
    /// An empty list; call [`ItemList::refresh`] to fill it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            add_input: String::new(),
            input_error: None,
            modal: None,
        }
    }

    pub async fn load(api: A) -> Result<Self, ClientError> {
        let mut list = Self::new(api);
        list.refresh().await?;
        Ok(list)
    }

    /// Replace the local view with the server's current list.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let items = self.api.list().await?;
        self.items = items
            .into_iter()
            .map(|item| ItemView::new(item, Phase::Idle))
            .collect();
        Ok(())
    }

    pub fn items(&self) -> &[ItemView] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&ItemView> {
        self.items.iter().find(|v| &v.id == id)
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn add_input(&self) -> &str {
        &self.add_input
    }

    /// Views that can still be edited or deleted.
    fn live_view_mut(&mut self, id: &ItemId) -> Option<&mut ItemView> {
        self.items
            .iter_mut()
            .find(|v| &v.id == id && v.phase != Phase::Deleting)
    }

    fn mark_deleting(&mut self, id: &ItemId) {
        if let Some(view) = self.live_view_mut(id) {
            view.editing = false;
            view.phase = Phase::Deleting;
        }
    }

    /// Typing into the add input. A shown input error goes away as soon as
    /// the input holds something other than whitespace.
    pub fn set_add_input(&mut self, value: impl Into<String>) {
        self.add_input = value.into();
        if self.input_error.is_some() && self.add_input.chars().any(|c| !c.is_whitespace()) {
            self.input_error = None;
        }
    }

    /// Submit the add input. Empty input never reaches the server, and any
    /// failure is reported next to the input while the list stays as it was.
    pub async fn add(&mut self) {
        let name = self.add_input.trim().to_string();
        if name.is_empty() {
            self.input_error = Some(EMPTY_INPUT_MESSAGE.to_string());
            return;
        }

        match self.api.create(&name).await {
            Ok(item) => {
                self.add_input.clear();
                self.input_error = None;
                self.items.insert(0, ItemView::new(item, Phase::Entering));
            }
            Err(e) => {
                tracing::warn!("Could not add {name:?}: {e}");
                self.input_error = Some(format!("Could not add {name}. Please try again later."));
            }
        }
    }

    /// Enter edit mode, or leave it and revert to the last known-good name.
    pub fn toggle_edit(&mut self, id: &ItemId) {
        if let Some(view) = self.live_view_mut(id) {
            if view.editing {
                view.cancel_edit();
            } else {
                view.editing = true;
            }
        }
    }

    pub fn set_edit_input(&mut self, id: &ItemId, value: impl Into<String>) {
        if let Some(view) = self.live_view_mut(id) {
            if view.editing {
                view.input = value.into();
            }
        }
    }

    /// Focus left the edit input. Nothing worth saving means cancel.
    pub fn blur(&mut self, id: &ItemId) {
        if let Some(view) = self.live_view_mut(id) {
            let pending = view.input.trim();
            if view.editing && (pending.is_empty() || pending == view.known_good) {
                view.cancel_edit();
            }
        }
    }

    /// Save the edit input. Unchanged or empty input just cancels the edit.
    pub async fn update(&mut self, id: &ItemId) {
        let Some(view) = self.live_view_mut(id) else {
            return;
        };
        if !view.editing {
            return;
        }

        let name = view.input.trim().to_string();
        if name.is_empty() || name == view.known_good {
            view.cancel_edit();
            return;
        }

        match self.api.update(id, &name).await {
            Ok(item) => {
                if let Some(view) = self.live_view_mut(id) {
                    view.known_good = unescape_html(&item.name);
                    view.input = view.known_good.clone();
                    view.editing = false;
                }
            }
            Err(ClientError::NotFound) => {
                self.modal = Some(Modal::deleted_elsewhere());
                self.mark_deleting(id);
            }
            Err(e) => {
                tracing::warn!("Could not update {id}: {e}");
                self.modal = Some(Modal::failure(format!("Could not update {name}")));
            }
        }
    }

    pub async fn delete(&mut self, id: &ItemId) {
        let Some(view) = self.live_view_mut(id) else {
            return;
        };
        let name = if view.known_good.is_empty() {
            "item".to_string()
        } else {
            view.known_good.clone()
        };

        match self.api.delete(id).await {
            Ok(()) => self.mark_deleting(id),
            Err(ClientError::NotFound) => {
                self.modal = Some(Modal::deleted_elsewhere());
                self.mark_deleting(id);
            }
            Err(e) => {
                tracing::warn!("Could not delete {id}: {e}");
                self.modal = Some(Modal::failure(format!("Could not delete {name}")));
            }
        }
    }

    /// An element's animation finished: deleting elements are dropped,
    /// entering ones settle.
    pub fn transition_end(&mut self, id: &ItemId) {
        let Some(pos) = self.items.iter().position(|v| &v.id == id) else {
            return;
        };
        match self.items[pos].phase {
            Phase::Deleting => {
                self.items.remove(pos);
            }
            Phase::Entering => self.items[pos].phase = Phase::Idle,
            Phase::Idle => {}
        }
    }

    /// End every running transition at once.
    pub fn settle(&mut self) {
        self.items.retain(|v| v.phase != Phase::Deleting);
        for view in &mut self.items {
            view.phase = Phase::Idle;
        }
    }

    /// First step of delete-all: ask for confirmation.
    pub fn request_delete_all(&mut self) {
        self.modal = Some(Modal::ConfirmDeleteAll);
    }

    /// Second step of delete-all. Does nothing unless the confirmation modal
    /// is open, and skips the request when there is nothing to delete.
    pub async fn confirm_delete_all(&mut self) {
        if self.modal != Some(Modal::ConfirmDeleteAll) {
            return;
        }
        self.modal = None;

        if self.items.is_empty() {
            return;
        }

        match self.api.delete_all().await {
            Ok(_) | Err(ClientError::NotFound) => self.items.clear(),
            Err(e) => {
                tracing::warn!("Could not delete all items: {e}");
                self.modal = Some(Modal::failure("Could not delete all items"));
            }
        }
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use crate::services::item_service;
    use crate::state::items::ItemStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-process API over a real store, with a switch to make every call fail.
    #[derive(Clone, Default)]
    struct LocalApi {
        store: ItemStore,
        down: Arc<AtomicBool>,
    }

    impl LocalApi {
        fn map(err: ApiError) -> ClientError {
            match err {
                ApiError::NotFound | ApiError::NothingToDelete => ClientError::NotFound,
                other => ClientError::Rejected {
                    status: other.status().as_u16(),
                    message: other.public_message(),
                },
            }
        }

        fn check(&self) -> Result<(), ClientError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(ClientError::Rejected {
                    status: 500,
                    message: "down".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ItemsApi for LocalApi {
        async fn list(&self) -> Result<Vec<Item>, ClientError> {
            self.check()?;
            item_service::list(&self.store).map_err(Self::map)
        }

        async fn create(&self, name: &str) -> Result<Item, ClientError> {
            self.check()?;
            item_service::create(&self.store, &json!({ "name": name })).map_err(Self::map)
        }

        async fn update(&self, id: &ItemId, name: &str) -> Result<Item, ClientError> {
            self.check()?;
            item_service::update(&self.store, &id.to_string(), &json!({ "name": name }))
                .map_err(Self::map)
        }

        async fn delete(&self, id: &ItemId) -> Result<(), ClientError> {
            self.check()?;
            item_service::delete(&self.store, &id.to_string()).map_err(Self::map)
        }

        async fn delete_all(&self) -> Result<usize, ClientError> {
            self.check()?;
            item_service::delete_all(&self.store)
                .map(|s| s.deleted_count)
                .map_err(Self::map)
        }
    }

    async fn list_with(names: &[&str]) -> (LocalApi, ItemList<LocalApi>) {
        let api = LocalApi::default();
        for name in names {
            item_service::create(&api.store, &json!({ "name": name })).unwrap();
        }
        let list = ItemList::load(api.clone()).await.unwrap();
        (api, list)
    }

    fn first_id<A: ItemsApi>(list: &ItemList<A>) -> ItemId {
        *list.items()[0].id()
    }

    #[tokio::test]
    async fn load_shows_newest_first() {
        let (_, list) = list_with(&["Apple", "Orange"]).await;
        let names: Vec<&str> = list.items().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["Orange", "Apple"]);
        assert!(list.items().iter().all(|v| v.phase() == Phase::Idle));
    }

    #[tokio::test]
    async fn add_prepends_an_entering_item() {
        let (api, mut list) = list_with(&["Apple"]).await;

        list.set_add_input("  Kiwi ");
        list.add().await;

        assert_eq!(list.add_input(), "");
        assert_eq!(list.items()[0].name(), "Kiwi");
        assert_eq!(list.items()[0].phase(), Phase::Entering);
        assert_eq!(api.store.len().unwrap(), 2);

        let id = first_id(&list);
        list.transition_end(&id);
        assert_eq!(list.items()[0].phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn empty_add_is_an_inline_error_without_a_request() {
        let (api, mut list) = list_with(&[]).await;
        api.down.store(true, Ordering::SeqCst);

        list.set_add_input("   ");
        list.add().await;
        assert_eq!(list.input_error(), Some(EMPTY_INPUT_MESSAGE));
        assert!(list.modal().is_none());

        list.set_add_input("    ");
        assert!(list.input_error().is_some());
        list.set_add_input("  a");
        assert!(list.input_error().is_none());
    }

    #[tokio::test]
    async fn failed_add_leaves_the_list_untouched() {
        let (api, mut list) = list_with(&["Apple"]).await;
        api.down.store(true, Ordering::SeqCst);

        list.set_add_input("Kiwi");
        list.add().await;

        assert!(list.input_error().unwrap().contains("Could not add Kiwi"));
        assert!(list.modal().is_none());
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.add_input(), "Kiwi");
    }

    #[tokio::test]
    async fn toggling_edit_twice_reverts() {
        let (_, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);

        list.toggle_edit(&id);
        list.set_edit_input(&id, "Pear");
        assert!(list.item(&id).unwrap().is_editing());

        list.toggle_edit(&id);
        let view = list.item(&id).unwrap();
        assert!(!view.is_editing());
        assert_eq!(view.input(), "Apple");
    }

    #[tokio::test]
    async fn blur_cancels_only_unchanged_or_empty_edits() {
        let (_, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);

        list.toggle_edit(&id);
        list.set_edit_input(&id, "   ");
        list.blur(&id);
        assert!(!list.item(&id).unwrap().is_editing());
        assert_eq!(list.item(&id).unwrap().input(), "Apple");

        list.toggle_edit(&id);
        list.set_edit_input(&id, "Pear");
        list.blur(&id);
        assert!(list.item(&id).unwrap().is_editing());
    }

    #[tokio::test]
    async fn update_commits_the_server_name() {
        let (api, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);

        list.toggle_edit(&id);
        list.set_edit_input(&id, " <Pear> ");
        list.update(&id).await;

        let view = list.item(&id).unwrap();
        assert!(!view.is_editing());
        assert_eq!(view.name(), "<Pear>");
        assert_eq!(view.input(), "<Pear>");
        assert_eq!(api.store.list().unwrap()[0].name, "&lt;Pear&gt;");

        // Saving the same text again is a no-op, not a second escape.
        api.down.store(true, Ordering::SeqCst);
        list.toggle_edit(&id);
        list.update(&id).await;
        assert!(list.modal().is_none());
        assert_eq!(api.store.list().unwrap()[0].name, "&lt;Pear&gt;");
    }

    #[tokio::test]
    async fn unchanged_update_sends_nothing() {
        let (api, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);
        api.down.store(true, Ordering::SeqCst);

        list.toggle_edit(&id);
        list.set_edit_input(&id, "Apple ");
        list.update(&id).await;

        assert!(list.modal().is_none());
        assert!(!list.item(&id).unwrap().is_editing());
    }

    #[tokio::test]
    async fn update_of_an_item_deleted_elsewhere_removes_it() {
        let (api, mut list) = list_with(&["Apple", "Orange"]).await;
        let id = first_id(&list);
        item_service::delete(&api.store, &id.to_string()).unwrap();

        list.toggle_edit(&id);
        list.set_edit_input(&id, "Pear");
        list.update(&id).await;

        assert_eq!(
            list.modal(),
            Some(&Modal::Error {
                message: DELETED_ELSEWHERE_MESSAGE.to_string(),
                retry: false
            })
        );
        assert!(!list.modal().unwrap().describe().contains("try again"));
        assert_eq!(list.item(&id).unwrap().phase(), Phase::Deleting);

        list.transition_end(&id);
        assert!(list.item(&id).is_none());
        assert_eq!(list.items().len(), 1);
    }

    #[tokio::test]
    async fn failed_update_suggests_a_retry() {
        let (api, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);
        api.down.store(true, Ordering::SeqCst);

        list.toggle_edit(&id);
        list.set_edit_input(&id, "Pear");
        list.update(&id).await;

        let modal = list.modal().unwrap();
        assert_eq!(
            modal.describe(),
            "Sorry. Could not update Pear. Please try again later."
        );
        let view = list.item(&id).unwrap();
        assert!(view.is_editing());
        assert_eq!(view.name(), "Apple");
    }

    #[tokio::test]
    async fn delete_waits_for_the_transition() {
        let (api, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);

        list.delete(&id).await;
        assert_eq!(list.item(&id).unwrap().phase(), Phase::Deleting);
        assert!(api.store.is_empty().unwrap());

        list.toggle_edit(&id);
        assert!(!list.item(&id).unwrap().is_editing());

        list.transition_end(&id);
        assert!(list.items().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_item() {
        let (api, mut list) = list_with(&["Apple"]).await;
        let id = first_id(&list);
        api.down.store(true, Ordering::SeqCst);

        list.delete(&id).await;
        assert_eq!(list.item(&id).unwrap().phase(), Phase::Idle);
        assert_eq!(
            list.modal().unwrap().describe(),
            "Sorry. Could not delete Apple. Please try again later."
        );
    }

    #[tokio::test]
    async fn delete_all_needs_confirmation() {
        let (api, mut list) = list_with(&["Apple", "Orange"]).await;

        list.confirm_delete_all().await;
        assert_eq!(list.items().len(), 2);
        assert_eq!(api.store.len().unwrap(), 2);

        list.request_delete_all();
        assert_eq!(list.modal(), Some(&Modal::ConfirmDeleteAll));
        list.confirm_delete_all().await;

        assert!(list.modal().is_none());
        assert!(list.items().is_empty());
        assert!(api.store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn delete_all_on_an_empty_list_skips_the_request() {
        let (api, mut list) = list_with(&[]).await;
        api.down.store(true, Ordering::SeqCst);

        list.request_delete_all();
        list.confirm_delete_all().await;
        assert!(list.modal().is_none());
    }

    #[tokio::test]
    async fn failed_delete_all_keeps_the_list() {
        let (api, mut list) = list_with(&["Apple"]).await;
        api.down.store(true, Ordering::SeqCst);

        list.request_delete_all();
        list.confirm_delete_all().await;
        assert_eq!(list.items().len(), 1);
        assert!(matches!(list.modal(), Some(Modal::Error { retry: true, .. })));

        list.dismiss_modal();
        assert!(list.modal().is_none());
    }

    #[tokio::test]
    async fn settle_finishes_every_transition() {
        let (_, mut list) = list_with(&["Apple", "Orange"]).await;
        let id = first_id(&list);
        list.delete(&id).await;
        list.set_add_input("Kiwi");
        list.add().await;

        list.settle();
        let names: Vec<&str> = list.items().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["Kiwi", "Apple"]);
        assert!(list.items().iter().all(|v| v.phase() == Phase::Idle));
    }
}
