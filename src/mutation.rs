//! Create/update/delete submissions driven from a dialog.
//!
//! Every submission follows the same path: permission check, client-side
//! validation, one network call, then either close-reset-notify-invalidate
//! or keep-open-notify with the form left as typed.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::QueryCache;
use crate::error::{AppError, AppResult, FieldError};
use crate::models::{
    Item, ItemTake, Message, ResourceKind, TakeLocation, User, UserPermissionsUpdate,
};
use crate::notify::{Notification, Notifier};
use crate::permissions::{Action, Capabilities};
use crate::services::{ItemCustody, ResourceApi, UserAdmin};
use crate::validation::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Submitting,
    Succeeded,
    Failed(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Update,
    Delete,
    Take,
    Release,
}

impl Verb {
    fn past_tense(self) -> &'static str {
        match self {
            Verb::Create => "created",
            Verb::Update => "updated",
            Verb::Delete => "deleted",
            Verb::Take => "taken",
            Verb::Release => "released",
        }
    }

    fn succeeded(self, kind: ResourceKind) -> Notification {
        match self {
            Verb::Delete => Notification::deleted(kind),
            _ => Notification::mutation_succeeded(kind, self.past_tense()),
        }
    }

    fn failed(self, kind: ResourceKind, err: &AppError) -> Notification {
        match self {
            Verb::Delete => Notification::delete_failed(kind),
            _ => Notification::from_error(err),
        }
    }
}

/// A modal form: visibility, the value being edited and its submission
/// state.
#[derive(Debug, Clone)]
pub struct Dialog<F> {
    open: bool,
    form: F,
    initial: F,
    state: MutationState,
    errors: Vec<FieldError>,
}

impl<F: Clone> Dialog<F> {
    /// A closed dialog whose form resets to `initial`.
    pub fn new(initial: F) -> Self {
        Self {
            open: false,
            form: initial.clone(),
            initial,
            state: MutationState::Idle,
            errors: Vec::new(),
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Closes and discards whatever was typed.
    pub fn cancel(&mut self) {
        self.reset();
        self.close();
    }

    pub fn reset(&mut self) {
        self.form = self.initial.clone();
        self.errors.clear();
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == MutationState::Submitting
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        self.open && !self.is_submitting()
    }

    /// Inline errors from the last failed submission.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns a settled dialog to `Idle`.
    pub fn acknowledge(&mut self) {
        if !self.is_submitting() {
            self.state = MutationState::Idle;
        }
    }

    pub fn begin_submit(&mut self) -> AppResult<()> {
        if self.is_submitting() {
            return Err(AppError::Busy);
        }
        if !self.open {
            return Err(AppError::DialogClosed);
        }
        self.state = MutationState::Submitting;
        self.errors.clear();
        Ok(())
    }

    pub fn succeed(&mut self) {
        self.state = MutationState::Succeeded;
        self.reset();
        self.close();
    }

    pub fn fail(&mut self, notification: Notification, errors: Vec<FieldError>) {
        self.state = MutationState::Failed(notification);
        self.errors = errors;
    }
}

pub struct MutationWorkflow {
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl MutationWorkflow {
    pub fn new(cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        Self { cache, notifier }
    }

    /// Refuses an action the user lacks the capability for.
    pub fn guard(&self, caps: &Capabilities, action: Action) -> AppResult<()> {
        caps.check(action).inspect_err(|e| {
            tracing::warn!("Mutation refused: user={}, {}", caps.user_id(), e);
        })
    }

    /// Runs one submission of `dialog`. `op` is awaited only when the
    /// dialog is open and idle.
    pub async fn submit<F, T, Fut>(
        &self,
        dialog: &mut Dialog<F>,
        kind: ResourceKind,
        verb: Verb,
        op: Fut,
    ) -> AppResult<T>
    where
        F: Clone,
        Fut: Future<Output = AppResult<T>>,
    {
        dialog.begin_submit()?;
        match op.await {
            Ok(value) => {
                dialog.succeed();
                self.notifier.notify(verb.succeeded(kind));
                self.cache.invalidate(kind).await;
                tracing::debug!("Mutation succeeded: kind={}, verb={:?}", kind, verb);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("Mutation failed: kind={}, verb={:?}, error={}", kind, verb, e);
                let notification = verb.failed(kind, &e);
                dialog.fail(notification.clone(), e.field_errors().to_vec());
                self.notifier.notify(notification);
                Err(e)
            }
        }
    }

    pub async fn create<A: ResourceApi>(
        &self,
        caps: &Capabilities,
        api: &A,
        dialog: &mut Dialog<A::Create>,
    ) -> AppResult<A::Record> {
        let kind = api.kind();
        self.guard(caps, Action::for_resource(kind))?;
        let body = dialog.form().clone();
        self.submit(dialog, kind, Verb::Create, async move {
            body.validate()?;
            api.create(&body).await
        })
        .await
    }

    pub async fn update<A: ResourceApi>(
        &self,
        caps: &Capabilities,
        api: &A,
        dialog: &mut Dialog<A::Update>,
        id: Uuid,
    ) -> AppResult<A::Record> {
        let kind = api.kind();
        self.guard(caps, Action::for_resource(kind))?;
        let body = dialog.form().clone();
        self.submit(dialog, kind, Verb::Update, async move {
            body.validate()?;
            api.update(id, &body).await
        })
        .await
    }

    /// Confirm-delete dialog; its form is the id of the record to remove.
    pub async fn delete<A: ResourceApi>(
        &self,
        caps: &Capabilities,
        api: &A,
        dialog: &mut Dialog<Uuid>,
    ) -> AppResult<Message> {
        let kind = api.kind();
        self.guard(caps, Action::for_resource(kind))?;
        let id = *dialog.form();
        self.submit(dialog, kind, Verb::Delete, api.delete(id)).await
    }

    /// Writes only the permission flags of `id`.
    pub async fn update_permissions<A: UserAdmin>(
        &self,
        caps: &Capabilities,
        api: &A,
        dialog: &mut Dialog<UserPermissionsUpdate>,
        id: Uuid,
    ) -> AppResult<User> {
        self.guard(caps, Action::EditUsers)?;
        let permissions = dialog.form().clone();
        self.submit(dialog, ResourceKind::User, Verb::Update, async move {
            permissions.validate()?;
            api.update_permissions(id, permissions).await
        })
        .await
    }

    /// Takes `item_id` for the acting user at `now`, in one update call.
    pub async fn take_item<A: ItemCustody>(
        &self,
        caps: &Capabilities,
        api: &A,
        dialog: &mut Dialog<TakeLocation>,
        item_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Item> {
        self.guard(caps, Action::TakeItem)?;
        let location = dialog.form().clone();
        let owner = caps.user_id();
        self.submit(dialog, ResourceKind::Item, Verb::Take, async move {
            location.validate()?;
            let body = ItemTake::take(owner, now, location);
            body.validate()?;
            api.take(item_id, &body).await
        })
        .await
    }

    /// Returns `item` to the pool. Only its holder may do this.
    pub async fn release_item<A: ItemCustody>(
        &self,
        caps: &Capabilities,
        api: &A,
        dialog: &mut Dialog<()>,
        item: &Item,
    ) -> AppResult<Item> {
        self.guard(
            caps,
            Action::ReleaseItem {
                owner: item.current_owner_id,
            },
        )?;
        let item_id = item.item_id;
        self.submit(dialog, ResourceKind::Item, Verb::Release, api.release(item_id))
            .await
    }
}
