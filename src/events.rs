//! Declarative event routing.
//!
//! Every UI event is looked up in one static table keyed by event kind and
//! target role. A row may be limited to one profile; the first matching row
//! produces the [`Command`] the overlay runs.

use crate::config::Profile;

/// Keys the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    /// Ctrl+C / Cmd+C
    CopyShortcut,
    Other,
}

/// What the event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRole {
    SearchInput,
    /// A result row, by position in the ranked list
    ResultRow(usize),
    /// A recent-history row shown in the prompt state
    RecentRow(usize),
    ClearButton,
    /// The dimmed area around the overlay
    Backdrop,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Input { value: String },
    KeyDown { key: Key, target: TargetRole },
    Click { target: TargetRole },
    Hover { target: TargetRole },
}

/// State-machine transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectNext,
    SelectPrevious,
    SelectAt(usize),
    Activate,
    ActivateAt(usize),
    OpenRecent(usize),
    Close,
    ClearQuery,
    /// Clear a non-empty query, otherwise close
    ClearOrClose,
    CopyUrl,
    SetQuery(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Input,
    Key(Key),
    Click,
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Any,
    SearchInput,
    ResultRow,
    RecentRow,
    ClearButton,
    Backdrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    SelectNext,
    SelectPrevious,
    SelectTarget,
    Activate,
    ActivateTarget,
    OpenRecentTarget,
    Close,
    ClearQuery,
    ClearOrClose,
    CopyUrl,
    SetQuery,
}

struct RouteEntry {
    kind: EventKind,
    role: Role,
    profile: Option<Profile>,
    route: Route,
}

const fn entry(kind: EventKind, role: Role, profile: Option<Profile>, route: Route) -> RouteEntry {
    RouteEntry {
        kind,
        role,
        profile,
        route,
    }
}

const ROUTES: &[RouteEntry] = &[
    entry(EventKind::Input, Role::SearchInput, None, Route::SetQuery),
    entry(EventKind::Key(Key::ArrowDown), Role::Any, None, Route::SelectNext),
    entry(EventKind::Key(Key::ArrowUp), Role::Any, None, Route::SelectPrevious),
    entry(EventKind::Key(Key::Enter), Role::Any, None, Route::Activate),
    entry(EventKind::Key(Key::Escape), Role::Any, Some(Profile::Overlay), Route::Close),
    entry(EventKind::Key(Key::Escape), Role::Any, Some(Profile::Popup), Route::ClearOrClose),
    entry(EventKind::Key(Key::CopyShortcut), Role::Any, Some(Profile::Popup), Route::CopyUrl),
    entry(EventKind::Click, Role::ResultRow, None, Route::ActivateTarget),
    entry(EventKind::Hover, Role::ResultRow, None, Route::SelectTarget),
    entry(EventKind::Click, Role::RecentRow, Some(Profile::Popup), Route::OpenRecentTarget),
    entry(EventKind::Click, Role::ClearButton, None, Route::ClearQuery),
    entry(EventKind::Click, Role::Backdrop, Some(Profile::Overlay), Route::Close),
];

fn role_of(target: TargetRole) -> Role {
    match target {
        TargetRole::SearchInput => Role::SearchInput,
        TargetRole::ResultRow(_) => Role::ResultRow,
        TargetRole::RecentRow(_) => Role::RecentRow,
        TargetRole::ClearButton => Role::ClearButton,
        TargetRole::Backdrop => Role::Backdrop,
        TargetRole::Document => Role::Any,
    }
}

fn target_index(target: TargetRole) -> Option<usize> {
    match target {
        TargetRole::ResultRow(i) | TargetRole::RecentRow(i) => Some(i),
        _ => None,
    }
}

/// Look up the command for `event` under `profile`.
pub fn route(event: &UiEvent, profile: Profile) -> Option<Command> {
    let (kind, target) = match event {
        UiEvent::Input { .. } => (EventKind::Input, TargetRole::SearchInput),
        UiEvent::KeyDown { key, target } => (EventKind::Key(*key), *target),
        UiEvent::Click { target } => (EventKind::Click, *target),
        UiEvent::Hover { target } => (EventKind::Hover, *target),
    };
    let role = role_of(target);

    let found = ROUTES.iter().find(|e| {
        e.kind == kind
            && (e.role == Role::Any || e.role == role)
            && e.profile.map_or(true, |p| p == profile)
    })?;

    let command = match found.route {
        Route::SelectNext => Command::SelectNext,
        Route::SelectPrevious => Command::SelectPrevious,
        Route::SelectTarget => Command::SelectAt(target_index(target)?),
        Route::Activate => Command::Activate,
        Route::ActivateTarget => Command::ActivateAt(target_index(target)?),
        Route::OpenRecentTarget => Command::OpenRecent(target_index(target)?),
        Route::Close => Command::Close,
        Route::ClearQuery => Command::ClearQuery,
        Route::ClearOrClose => Command::ClearOrClose,
        Route::CopyUrl => Command::CopyUrl,
        Route::SetQuery => match event {
            UiEvent::Input { value } => Command::SetQuery(value.clone()),
            _ => return None,
        },
    };
    Some(command)
}
