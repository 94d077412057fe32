//! In-memory narrowing of a loaded page.
//!
//! Filters never trigger a fetch and never change pagination: next/previous
//! are decided on the unfiltered page.

use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::{Item, Room, User};
use crate::pagination::PageView;

/// Field accessors the filters work against.
pub trait Filterable {
    type TextField: Copy + Eq + Debug;
    type FlagField: Copy + Eq + Debug;
    type RefField: Copy + Eq + Debug;

    fn text(&self, field: Self::TextField) -> Option<&str>;

    fn flag(&self, field: Self::FlagField) -> bool;

    fn reference(&self, field: Self::RefField) -> Option<Uuid>;
}

/// For resources without fields of a given shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoField {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserText {
    FullName,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFlag {
    IsPartOfLab,
    IsActive,
    IsSuperuser,
}

impl Filterable for User {
    type TextField = UserText;
    type FlagField = UserFlag;
    type RefField = NoField;

    fn text(&self, field: UserText) -> Option<&str> {
        match field {
            UserText::FullName => self.full_name.as_deref(),
            UserText::Email => Some(&self.email),
        }
    }

    fn flag(&self, field: UserFlag) -> bool {
        match field {
            UserFlag::IsPartOfLab => self.is_part_of_lab,
            UserFlag::IsActive => self.is_active,
            UserFlag::IsSuperuser => self.is_superuser,
        }
    }

    fn reference(&self, field: NoField) -> Option<Uuid> {
        match field {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemText {
    Name,
    Vendor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFlag {
    IsAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Room,
    Owner,
}

impl Filterable for Item {
    type TextField = ItemText;
    type FlagField = ItemFlag;
    type RefField = ItemRef;

    fn text(&self, field: ItemText) -> Option<&str> {
        match field {
            ItemText::Name => Some(&self.item_name),
            ItemText::Vendor => self.item_vendor.as_deref(),
        }
    }

    fn flag(&self, field: ItemFlag) -> bool {
        match field {
            ItemFlag::IsAvailable => self.is_available,
        }
    }

    fn reference(&self, field: ItemRef) -> Option<Uuid> {
        match field {
            ItemRef::Room => self.current_room,
            ItemRef::Owner => self.current_owner_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomText {
    Number,
    Place,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRef {
    Owner,
}

impl Filterable for Room {
    type TextField = RoomText;
    type FlagField = NoField;
    type RefField = RoomRef;

    fn text(&self, field: RoomText) -> Option<&str> {
        match field {
            RoomText::Number => Some(&self.room_number),
            RoomText::Place => Some(&self.room_place),
        }
    }

    fn flag(&self, field: NoField) -> bool {
        match field {}
    }

    fn reference(&self, field: RoomRef) -> Option<Uuid> {
        match field {
            RoomRef::Owner => self.room_owner_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<R: Filterable> {
    /// Case-insensitive substring match. An empty term matches everything.
    Search { field: R::TextField, term: String },
    /// `None` is the "all" choice.
    Flag { field: R::FlagField, value: Option<bool> },
    /// `None` is the "all" choice.
    Reference { field: R::RefField, value: Option<Uuid> },
}

impl<R: Filterable> Predicate<R> {
    pub fn matches(&self, record: &R) -> bool {
        match self {
            Predicate::Search { field, term } => {
                if term.is_empty() {
                    return true;
                }
                let needle = term.to_lowercase();
                record
                    .text(*field)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            }
            Predicate::Flag { field, value } => value.map_or(true, |v| record.flag(*field) == v),
            Predicate::Reference { field, value } => {
                value.map_or(true, |v| record.reference(*field) == Some(v))
            }
        }
    }

    pub fn is_inert(&self) -> bool {
        match self {
            Predicate::Search { term, .. } => term.is_empty(),
            Predicate::Flag { value, .. } => value.is_none(),
            Predicate::Reference { value, .. } => value.is_none(),
        }
    }

    fn same_slot(&self, other: &Self) -> bool {
        match (self, other) {
            (Predicate::Search { field: a, .. }, Predicate::Search { field: b, .. }) => a == b,
            (Predicate::Flag { field: a, .. }, Predicate::Flag { field: b, .. }) => a == b,
            (Predicate::Reference { field: a, .. }, Predicate::Reference { field: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Ordered, AND-composed predicates; at most one per field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet<R: Filterable> {
    predicates: Vec<Predicate<R>>,
}

impl<R: Filterable> Default for FilterSet<R> {
    fn default() -> Self {
        Self { predicates: Vec::new() }
    }
}

impl<R: Filterable> FilterSet<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `predicate`, replacing any predicate on the same field in place.
    pub fn set(&mut self, predicate: Predicate<R>) {
        match self.predicates.iter_mut().find(|p| p.same_slot(&predicate)) {
            Some(slot) => *slot = predicate,
            None => self.predicates.push(predicate),
        }
    }

    pub fn with(mut self, predicate: Predicate<R>) -> Self {
        self.set(predicate);
        self
    }

    pub fn search(self, field: R::TextField, term: impl Into<String>) -> Self {
        self.with(Predicate::Search { field, term: term.into() })
    }

    pub fn flag(self, field: R::FlagField, value: Option<bool>) -> Self {
        self.with(Predicate::Flag { field, value })
    }

    pub fn reference(self, field: R::RefField, value: Option<Uuid>) -> Self {
        self.with(Predicate::Reference { field, value })
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn predicates(&self) -> &[Predicate<R>] {
        &self.predicates
    }

    pub fn is_inert(&self) -> bool {
        self.predicates.iter().all(Predicate::is_inert)
    }

    pub fn matches(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    pub fn apply<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Narrows what a list view shows; the view's pagination flags are
    /// untouched.
    pub fn visible<'a>(&self, view: &'a PageView<R>) -> Vec<&'a R> {
        self.apply(&view.records)
    }
}

/// Parses a boolean select value: `"all"` (or anything unrecognised) is inert.
pub fn flag_choice(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parses a foreign-key select value: `"all"` (or an invalid id) is inert.
pub fn reference_choice(raw: &str) -> Option<Uuid> {
    if raw == "all" {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses bursts of search input into the last term typed before the
/// input went quiet.
pub struct SearchDebouncer {
    delay: Duration,
    rx: mpsc::Receiver<String>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self { delay, rx })
    }

    /// Next settled term, or `None` once the input side is dropped with
    /// nothing pending.
    pub async fn next_term(&mut self) -> Option<String> {
        let mut latest = self.rx.recv().await?;
        loop {
            match tokio::time::timeout(self.delay, self.rx.recv()).await {
                Ok(Some(term)) => latest = term,
                Ok(None) | Err(_) => return Some(latest),
            }
        }
    }
}
