//! Session and navigation state machine.
//!
//! # Responsibility
//! - Gate the dashboard behind onboarding.
//! - Decide which view (overview or one module detail) is active.
//!
//! # Invariants
//! - A profile exists if and only if the state is not `Onboarding`.
//! - `submit` is the only way out of `Onboarding` and cannot be undone.
//! - Rejected events leave the state unchanged.
//! - Selecting the already-active module is a no-op.

use crate::model::module::ModuleId;
use crate::model::profile::{Profile, ProfileCandidate};
use crate::validation::{validate_profile, FieldError, ValidationErrors};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// View currently exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "module", rename_all = "snake_case")]
pub enum SessionState {
    Onboarding,
    Overview,
    ModuleDetail(ModuleId),
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onboarding => f.write_str("onboarding"),
            Self::Overview => f.write_str("overview"),
            Self::ModuleDetail(module) => write!(f, "module_detail({module})"),
        }
    }
}

/// Navigation command emitted by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "module", rename_all = "snake_case")]
pub enum NavigationEvent {
    ExpandCard(ModuleId),
    SelectSidebar(ModuleId),
    Collapse,
}

impl Display for NavigationEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpandCard(module) => write!(f, "expand_card({module})"),
            Self::SelectSidebar(module) => write!(f, "select_sidebar({module})"),
            Self::Collapse => f.write_str("collapse"),
        }
    }
}

/// Any event the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SubmitOnboarding,
    Navigate(NavigationEvent),
}

impl Display for SessionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmitOnboarding => f.write_str("submit_onboarding"),
            Self::Navigate(event) => write!(f, "{event}"),
        }
    }
}

/// Effect of an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: SessionState, to: SessionState },
    /// Accepted but idempotent, or guarded off (e.g. expanding an empty card).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Onboarding input was rejected; carries every offending field.
    Validation(ValidationErrors),
    /// The event is not permitted in the current state.
    IllegalTransition {
        from: SessionState,
        event: SessionEvent,
    },
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::IllegalTransition { from, event } => {
                write!(f, "illegal transition: `{event}` while in `{from}`")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::IllegalTransition { .. } => None,
        }
    }
}

impl From<ValidationErrors> for SessionError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// Pure navigation transition function.
///
/// `expandable` reports whether the card of a module may be expanded right
/// now; it is only consulted for `ExpandCard` from `Overview`.
pub fn next_state(
    state: SessionState,
    event: NavigationEvent,
    expandable: impl FnOnce(ModuleId) -> bool,
) -> Result<SessionState, SessionError> {
    let illegal = || SessionError::IllegalTransition {
        from: state,
        event: SessionEvent::Navigate(event),
    };

    match (state, event) {
        (SessionState::Onboarding, _) => Err(illegal()),
        (SessionState::Overview, NavigationEvent::ExpandCard(module)) => {
            if expandable(module) {
                Ok(SessionState::ModuleDetail(module))
            } else {
                Ok(state)
            }
        }
        (SessionState::ModuleDetail(_), NavigationEvent::ExpandCard(_)) => Err(illegal()),
        (_, NavigationEvent::SelectSidebar(module)) => Ok(SessionState::ModuleDetail(module)),
        (SessionState::ModuleDetail(_), NavigationEvent::Collapse) => Ok(SessionState::Overview),
        (SessionState::Overview, NavigationEvent::Collapse) => Ok(state),
    }
}

/// What the presentation layer renders: the active view plus any pending
/// onboarding field errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub state: SessionState,
    pub errors: Vec<FieldError>,
}

/// Single-user session owning the onboarding gate and the active view.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    profile: Option<Profile>,
    errors: Vec<FieldError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Starts a fresh session in `Onboarding`.
    pub fn new() -> Self {
        Self {
            state: SessionState::Onboarding,
            profile: None,
            errors: Vec::new(),
        }
    }

    /// Resumes a session whose onboarding already completed.
    pub fn resumed(profile: Profile) -> Self {
        Self {
            state: SessionState::Overview,
            profile: Some(profile),
            errors: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_onboarded(&self) -> bool {
        self.profile.is_some()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            errors: self.errors.clone(),
        }
    }

    /// Submits the onboarding form.
    ///
    /// On success commits the profile and moves to `Overview`. On validation
    /// failure stays in `Onboarding` and keeps the field errors for `view()`.
    pub fn submit(&mut self, candidate: ProfileCandidate) -> Result<&Profile, SessionError> {
        if self.state != SessionState::Onboarding {
            warn!(
                "event=onboarding_submit module=session status=rejected state={}",
                self.state
            );
            return Err(SessionError::IllegalTransition {
                from: self.state,
                event: SessionEvent::SubmitOnboarding,
            });
        }

        match validate_profile(candidate) {
            Ok(valid) => {
                self.errors.clear();
                self.state = SessionState::Overview;
                info!("event=onboarding_submit module=session status=ok state=overview");
                Ok(&*self.profile.insert(Profile::from_valid(valid)))
            }
            Err(err) => {
                warn!(
                    "event=onboarding_submit module=session status=rejected field_errors={}",
                    err.len()
                );
                self.errors = err.errors().to_vec();
                Err(err.into())
            }
        }
    }

    /// Applies a navigation event.
    pub fn navigate(
        &mut self,
        event: NavigationEvent,
        expandable: impl FnOnce(ModuleId) -> bool,
    ) -> Result<Transition, SessionError> {
        let from = self.state;
        let to = match next_state(from, event, expandable) {
            Ok(to) => to,
            Err(err) => {
                warn!(
                    "event=navigate module=session status=rejected from={} action={}",
                    from, event
                );
                return Err(err);
            }
        };

        if to == from {
            info!(
                "event=navigate module=session status=noop state={} action={}",
                from, event
            );
            return Ok(Transition::Unchanged);
        }

        self.state = to;
        info!(
            "event=navigate module=session status=ok from={} to={} action={}",
            from, to, event
        );
        Ok(Transition::Moved { from, to })
    }
}
