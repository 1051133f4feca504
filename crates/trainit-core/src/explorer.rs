//! Plan Explorer State Machine
//!
//! Browse animal → plan → steps and drive the Gantt overlays.
//!
//! Two axes make up the view state:
//! - [`Navigation`]: which animal is expanded and which plan is selected
//! - [`Overlay`]: the one floating element currently open, if any. A step
//!   popover carries its own [`StepMode`], so editing and adding a session
//!   can never be active at the same time.
//!
//! Network work happens in the free `async fn`s at the bottom; their
//! results are folded back in through the `finish_*` methods.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult, FormError};
use crate::models::{
    Animal, NewSessionNote, SessionNote, Step, StepUpdate, TrainingPlan, MAX_ESTIMATED_SESSIONS,
};
use crate::roster::LOAD_FAILED;
use crate::transport::Transport;

pub const PLANS_FAILED: &str = "Failed to load training plans";
pub const STEPS_FAILED: &str = "Failed to load plan steps";
pub const UPDATE_FAILED: &str = "Failed to update step.";
pub const SESSION_FAILED: &str = "Failed to add session note.";
pub const COMPLETE_FAILED: &str = "Failed to mark step complete";
pub const NO_DESCRIPTION: &str = "No description";

/// Description shown in the step popover
pub fn step_description(step: &Step) -> &str {
    step.description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Navigation {
    #[default]
    NoAnimal,
    Animal(u32),
    Plan { animal_id: u32, plan: TrainingPlan },
}

impl Navigation {
    pub fn expanded_animal(&self) -> Option<u32> {
        match self {
            Navigation::NoAnimal => None,
            Navigation::Animal(id) => Some(*id),
            Navigation::Plan { animal_id, .. } => Some(*animal_id),
        }
    }

    pub fn selected_plan(&self) -> Option<&TrainingPlan> {
        match self {
            Navigation::Plan { plan, .. } => Some(plan),
            _ => None,
        }
    }
}

/// Inline step editor
#[derive(Debug, Clone, PartialEq)]
pub struct StepEditForm {
    pub name: String,
    pub description: String,
    pub estimated_sessions: String,
    pub is_complete: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl StepEditForm {
    pub fn from_step(step: &Step) -> Self {
        Self {
            name: step.name.clone(),
            description: step.description.clone().unwrap_or_default(),
            estimated_sessions: step.estimated_sessions.to_string(),
            is_complete: step.is_complete,
            saving: false,
            error: None,
        }
    }

    pub fn to_update(&self) -> Result<StepUpdate, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Missing("name"));
        }
        let sessions = self
            .estimated_sessions
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_ESTIMATED_SESSIONS).contains(n))
            .ok_or(FormError::InvalidSessions)?;
        Ok(StepUpdate {
            name: Some(name.to_string()),
            description: Some(self.description.clone()),
            estimated_sessions: Some(sessions),
            is_complete: Some(self.is_complete),
        })
    }
}

/// "Add session" form
#[derive(Debug, Clone, PartialEq)]
pub struct SessionForm {
    pub note: String,
    pub performed_date: String,
    pub mark_complete: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl SessionForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            note: String::new(),
            performed_date: today.format("%Y-%m-%d").to_string(),
            mark_complete: false,
            saving: false,
            error: None,
        }
    }

    pub fn to_note(&self) -> Result<NewSessionNote, FormError> {
        let performed_date = match self.performed_date.trim() {
            "" => None,
            text => Some(
                NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| FormError::InvalidDate)?,
            ),
        };
        Ok(NewSessionNote {
            note: Some(self.note.clone()).filter(|n| !n.trim().is_empty()),
            performed_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepMode {
    Display,
    Editing(StepEditForm),
    AddingSession(SessionForm),
}

/// The single floating element of the Gantt view
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    Step { index: usize, mode: StepMode },
    NoteTooltip(u32),
}

/// Where a document-level click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    /// Inside the open step popover
    Popover,
    /// On a step bar; the bar's own handler toggles the popover
    StepBar,
    /// On a note marker; the marker's own handler toggles the tooltip
    NoteMarker,
    Elsewhere,
}

/// Prepared "add session" request
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSubmission {
    pub step_id: u32,
    pub note: NewSessionNote,
    /// Requested and the step is not complete yet
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub step_id: u32,
    pub completed: bool,
    pub complete_failed: bool,
    /// Fresh notes for the step, `None` if the refetch failed
    pub notes: Option<Vec<SessionNote>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerState {
    pub animals: Vec<Animal>,
    pub loading: bool,
    pub error: Option<String>,
    pub nav: Navigation,
    pub steps: Vec<Step>,
    pub overlay: Overlay,
    plans_by_animal: HashMap<u32, Vec<TrainingPlan>>,
    notes_by_step: HashMap<u32, Vec<SessionNote>>,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            animals: Vec::new(),
            loading: true,
            error: None,
            nav: Navigation::NoAnimal,
            steps: Vec::new(),
            overlay: Overlay::None,
            plans_by_animal: HashMap::new(),
            notes_by_step: HashMap::new(),
        }
    }
}

impl ExplorerState {
    // ========================
    // Queries
    // ========================

    pub fn plans_for(&self, animal_id: u32) -> Option<&[TrainingPlan]> {
        self.plans_by_animal.get(&animal_id).map(Vec::as_slice)
    }

    pub fn notes_for(&self, step_id: u32) -> &[SessionNote] {
        self.notes_by_step
            .get(&step_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn selected_plan_id(&self) -> Option<u32> {
        self.nav.selected_plan().map(|p| p.id)
    }

    /// Index of the step whose popover is open
    pub fn open_step(&self) -> Option<usize> {
        match &self.overlay {
            Overlay::Step { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn active_note(&self) -> Option<u32> {
        match &self.overlay {
            Overlay::NoteTooltip(id) => Some(*id),
            _ => None,
        }
    }

    fn step_index(&self, step_id: u32) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    // ========================
    // Animals & navigation
    // ========================

    pub fn finish_animals(&mut self, result: ApiResult<Vec<Animal>>) {
        self.loading = false;
        match result {
            Ok(animals) => self.animals = animals,
            Err(e) => {
                if let Some(message) = e.user_message(LOAD_FAILED) {
                    self.error = Some(message);
                }
            }
        }
    }

    /// Expand or collapse an animal. Returns true when its plans still
    /// have to be fetched.
    pub fn toggle_animal(&mut self, animal_id: u32) -> bool {
        let expanding = self.nav.expanded_animal() != Some(animal_id);
        self.nav = if expanding {
            Navigation::Animal(animal_id)
        } else {
            Navigation::NoAnimal
        };
        self.steps.clear();
        self.notes_by_step.clear();
        self.overlay = Overlay::None;
        expanding && !self.plans_by_animal.contains_key(&animal_id)
    }

    pub fn finish_plans(&mut self, animal_id: u32, result: ApiResult<Vec<TrainingPlan>>) {
        match result {
            Ok(plans) => {
                self.plans_by_animal.insert(animal_id, plans);
            }
            Err(e) => {
                if let Some(message) = e.user_message(PLANS_FAILED) {
                    self.error = Some(message);
                }
            }
        }
    }

    pub fn select_plan(&mut self, plan: TrainingPlan) {
        let animal_id = self.nav.expanded_animal().unwrap_or(plan.animal_id);
        log::debug!("[EXPLORER] selected plan #{}", plan.id);
        self.nav = Navigation::Plan { animal_id, plan };
        self.steps.clear();
        self.notes_by_step.clear();
        self.overlay = Overlay::None;
    }

    /// Install the fetched steps. Returns the step ids whose notes should be
    /// loaded, or `None` if the answer is stale or failed.
    pub fn finish_plan_detail(&mut self, plan_id: u32, result: ApiResult<TrainingPlan>) -> Option<Vec<u32>> {
        if self.selected_plan_id() != Some(plan_id) {
            return None;
        }
        match result {
            Ok(plan) => {
                self.steps = plan.steps;
                Some(self.steps.iter().map(|s| s.id).collect())
            }
            Err(e) => {
                if let Some(message) = e.user_message(STEPS_FAILED) {
                    self.error = Some(message);
                }
                None
            }
        }
    }

    pub fn finish_plan_notes(&mut self, plan_id: u32, result: ApiResult<HashMap<u32, Vec<SessionNote>>>) {
        if self.selected_plan_id() != Some(plan_id) {
            return;
        }
        match result {
            Ok(notes) => self.notes_by_step.extend(notes),
            Err(e) => log::warn!("[EXPLORER] notes for plan #{} unavailable: {}", plan_id, e),
        }
    }

    // ========================
    // Overlay transitions
    // ========================

    /// Step bar click: reopen closes, anything else opens in display mode
    pub fn click_step(&mut self, index: usize) {
        if index >= self.steps.len() {
            return;
        }
        self.overlay = if self.open_step() == Some(index) {
            Overlay::None
        } else {
            Overlay::Step {
                index,
                mode: StepMode::Display,
            }
        };
    }

    pub fn click_note(&mut self, note_id: u32) {
        self.overlay = if self.active_note() == Some(note_id) {
            Overlay::None
        } else {
            Overlay::NoteTooltip(note_id)
        };
    }

    /// Window-level click dispatcher. Bars and markers handle their own
    /// clicks; clicks inside the popover keep it open; anything else closes
    /// whatever overlay is showing.
    pub fn on_document_click(&mut self, region: ClickRegion) {
        let keep = matches!(
            (region, &self.overlay),
            (ClickRegion::StepBar | ClickRegion::NoteMarker, _) | (ClickRegion::Popover, Overlay::Step { .. })
        );
        if !keep {
            self.overlay = Overlay::None;
        }
    }

    pub fn begin_edit(&mut self) {
        if let Overlay::Step { index, mode } = &mut self.overlay {
            if let Some(step) = self.steps.get(*index) {
                *mode = StepMode::Editing(StepEditForm::from_step(step));
            }
        }
    }

    pub fn begin_add_session(&mut self, today: NaiveDate) {
        if let Overlay::Step { mode, .. } = &mut self.overlay {
            *mode = StepMode::AddingSession(SessionForm::new(today));
        }
    }

    /// Cancel editing / adding and go back to the description
    pub fn back_to_display(&mut self) {
        if let Overlay::Step { mode, .. } = &mut self.overlay {
            *mode = StepMode::Display;
        }
    }

    pub fn edit_form(&self) -> Option<&StepEditForm> {
        match &self.overlay {
            Overlay::Step {
                mode: StepMode::Editing(form),
                ..
            } => Some(form),
            _ => None,
        }
    }

    pub fn session_form(&self) -> Option<&SessionForm> {
        match &self.overlay {
            Overlay::Step {
                mode: StepMode::AddingSession(form),
                ..
            } => Some(form),
            _ => None,
        }
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut StepEditForm> {
        match &mut self.overlay {
            Overlay::Step {
                mode: StepMode::Editing(form),
                ..
            } => Some(form),
            _ => None,
        }
    }

    pub fn session_form_mut(&mut self) -> Option<&mut SessionForm> {
        match &mut self.overlay {
            Overlay::Step {
                mode: StepMode::AddingSession(form),
                ..
            } => Some(form),
            _ => None,
        }
    }

    // ========================
    // Step edit
    // ========================

    pub fn start_save_edit(&mut self) -> Option<(u32, StepUpdate)> {
        let Overlay::Step {
            index,
            mode: StepMode::Editing(form),
        } = &mut self.overlay
        else {
            return None;
        };
        if form.saving {
            return None;
        }
        let step_id = self.steps.get(*index)?.id;
        match form.to_update() {
            Ok(update) => {
                form.saving = true;
                form.error = None;
                Some((step_id, update))
            }
            Err(e) => {
                form.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn finish_save_edit(&mut self, step_id: u32, result: ApiResult<Step>) {
        match result {
            Ok(updated) => {
                if let Some(index) = self.step_index(step_id) {
                    self.steps[index] = updated;
                    if self.open_step() == Some(index) {
                        self.overlay = Overlay::None;
                    }
                }
            }
            Err(ApiError::Unauthorized) => {}
            Err(_) => {
                if let Some(form) = self.edit_form_mut() {
                    form.saving = false;
                    form.error = Some(UPDATE_FAILED.to_string());
                }
            }
        }
    }

    // ========================
    // Session notes
    // ========================

    pub fn start_add_session(&mut self) -> Option<SessionSubmission> {
        let Overlay::Step {
            index,
            mode: StepMode::AddingSession(form),
        } = &mut self.overlay
        else {
            return None;
        };
        if form.saving {
            return None;
        }
        let step = self.steps.get(*index)?;
        match form.to_note() {
            Ok(note) => {
                form.saving = true;
                form.error = None;
                Some(SessionSubmission {
                    step_id: step.id,
                    note,
                    complete: form.mark_complete && !step.is_complete,
                })
            }
            Err(e) => {
                form.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn finish_add_session(&mut self, step_id: u32, result: ApiResult<SessionOutcome>) {
        match result {
            Ok(outcome) => {
                let index = self.step_index(step_id);
                if outcome.completed {
                    if let Some(i) = index {
                        self.steps[i].is_complete = true;
                    }
                }
                if let Some(notes) = outcome.notes {
                    self.notes_by_step.insert(step_id, notes);
                }
                if outcome.complete_failed {
                    self.error = Some(COMPLETE_FAILED.to_string());
                }
                if index.is_some() && self.open_step() == index {
                    self.overlay = Overlay::None;
                }
            }
            Err(ApiError::Unauthorized) => {}
            Err(_) => {
                if let Some(form) = self.session_form_mut() {
                    form.saving = false;
                    form.error = Some(SESSION_FAILED.to_string());
                }
            }
        }
    }
}

// ========================
// Network operations
// ========================

/// Notes for every step of a plan, keyed by step id.
///
/// Asks for the whole plan in one request; a backend without that route
/// is served one request per step instead, where a failing step simply
/// has no notes.
pub async fn load_plan_notes<T: Transport>(
    client: &ApiClient<T>,
    plan_id: u32,
    step_ids: &[u32],
) -> ApiResult<HashMap<u32, Vec<SessionNote>>> {
    let mut by_step: HashMap<u32, Vec<SessionNote>> =
        step_ids.iter().map(|id| (*id, Vec::new())).collect();

    match client.plan_notes(plan_id).await {
        Ok(notes) => {
            for note in notes {
                by_step.entry(note.step_id).or_default().push(note);
            }
            Ok(by_step)
        }
        Err(e) if e.is_missing_endpoint() => {
            log::debug!("[EXPLORER] no batched notes route, fetching {} steps", step_ids.len());
            for step_id in step_ids {
                match client.step_notes(*step_id).await {
                    Ok(notes) => {
                        by_step.insert(*step_id, notes);
                    }
                    Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
                    Err(_) => {}
                }
            }
            Ok(by_step)
        }
        Err(e) => Err(e),
    }
}

/// Post the note, optionally complete the step, then reload the step's notes
pub async fn submit_session<T: Transport>(
    client: &ApiClient<T>,
    submission: &SessionSubmission,
) -> ApiResult<SessionOutcome> {
    let step_id = submission.step_id;
    client.add_step_note(step_id, &submission.note).await?;

    let (completed, complete_failed) = if submission.complete {
        match client.complete_step(step_id).await {
            Ok(()) => (true, false),
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(_) => (false, true),
        }
    } else {
        (false, false)
    };

    let notes = match client.step_notes(step_id).await {
        Ok(notes) => Some(notes),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
        Err(_) => None,
    };

    Ok(SessionOutcome {
        step_id,
        completed,
        complete_failed,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::session::{MemoryTokenStore, Route, Session, TokenStore};
    use crate::transport::Method;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn step(id: u32, sessions: u32, is_complete: bool) -> Step {
        Step {
            id,
            name: format!("Step {}", id),
            description: Some(format!("do {}", id)),
            order: id,
            estimated_sessions: sessions,
            is_complete,
        }
    }

    fn plan(id: u32, steps: Vec<Step>) -> TrainingPlan {
        TrainingPlan {
            id,
            name: format!("Plan {}", id),
            description: None,
            cue_description: None,
            criteria: None,
            category: None,
            started_date: None,
            animal_id: 1,
            steps,
        }
    }

    /// Explorer with animal 1 expanded and plan 10 loaded
    fn loaded(steps: Vec<Step>) -> ExplorerState {
        let mut state = ExplorerState::default();
        state.toggle_animal(1);
        state.finish_plans(1, Ok(vec![plan(10, vec![])]));
        state.select_plan(plan(10, vec![]));
        state.finish_plan_detail(10, Ok(plan(10, steps)));
        state
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_blank_description_placeholder() {
        let mut s = step(1, 1, false);
        assert_eq!(step_description(&s), "do 1");
        s.description = Some("  ".into());
        assert_eq!(step_description(&s), NO_DESCRIPTION);
        s.description = None;
        assert_eq!(step_description(&s), NO_DESCRIPTION);
    }

    #[test]
    fn test_plans_cached_per_animal() {
        let mut state = ExplorerState::default();
        assert!(state.toggle_animal(1));
        state.finish_plans(1, Ok(vec![plan(10, vec![])]));
        assert!(!state.toggle_animal(1));
        assert_eq!(state.nav, Navigation::NoAnimal);
        assert!(!state.toggle_animal(1));
        assert_eq!(state.nav.expanded_animal(), Some(1));
        assert!(state.toggle_animal(2));
        assert_eq!(state.plans_for(1).map(|p| p.len()), Some(1));
    }

    #[test]
    fn test_changing_animal_clears_plan_view() {
        let mut state = loaded(vec![step(1, 2, false)]);
        state.click_step(0);
        state.toggle_animal(2);
        assert_eq!(state.nav, Navigation::Animal(2));
        assert!(state.steps.is_empty());
        assert_eq!(state.overlay, Overlay::None);
    }

    #[test]
    fn test_stale_plan_detail_is_dropped() {
        let mut state = loaded(vec![step(1, 2, false)]);
        state.select_plan(plan(11, vec![]));
        assert_eq!(state.finish_plan_detail(10, Ok(plan(10, vec![step(9, 1, false)]))), None);
        assert!(state.steps.is_empty());
        assert_eq!(
            state.finish_plan_detail(11, Ok(plan(11, vec![step(5, 1, false)]))),
            Some(vec![5])
        );
    }

    #[test]
    fn test_step_popover_toggle_and_outside_click() {
        let mut state = loaded(vec![step(1, 2, false), step(2, 3, false)]);
        state.click_step(1);
        assert_eq!(state.open_step(), Some(1));
        state.click_step(1);
        assert_eq!(state.open_step(), None);

        state.click_step(0);
        state.click_step(1);
        assert_eq!(state.open_step(), Some(1));

        state.on_document_click(ClickRegion::Popover);
        assert_eq!(state.open_step(), Some(1));
        state.on_document_click(ClickRegion::Elsewhere);
        assert_eq!(state.overlay, Overlay::None);
    }

    #[test]
    fn test_note_tooltip_toggle_and_any_click_closes() {
        let mut state = loaded(vec![step(1, 2, false)]);
        state.click_note(42);
        assert_eq!(state.active_note(), Some(42));
        state.on_document_click(ClickRegion::NoteMarker);
        assert_eq!(state.active_note(), Some(42));
        state.on_document_click(ClickRegion::Elsewhere);
        assert_eq!(state.active_note(), None);

        state.click_note(42);
        state.click_note(42);
        assert_eq!(state.active_note(), None);

        // opening a popover replaces the tooltip
        state.click_note(42);
        state.click_step(0);
        assert_eq!(state.active_note(), None);
        assert_eq!(state.open_step(), Some(0));
    }

    #[test]
    fn test_modes_are_exclusive() {
        let mut state = loaded(vec![step(1, 2, false)]);
        state.click_step(0);
        state.begin_edit();
        assert!(state.edit_form_mut().is_some());
        state.begin_add_session(today());
        assert!(state.edit_form_mut().is_none());
        assert_eq!(state.session_form_mut().unwrap().performed_date, "2024-05-02");
        state.back_to_display();
        assert_eq!(
            state.overlay,
            Overlay::Step { index: 0, mode: StepMode::Display }
        );
    }

    #[test]
    fn test_edit_validation() {
        let mut state = loaded(vec![step(1, 2, false)]);
        state.click_step(0);
        state.begin_edit();
        state.edit_form_mut().unwrap().estimated_sessions = "0".into();
        assert_eq!(state.start_save_edit(), None);
        assert_eq!(
            state.edit_form_mut().unwrap().error.as_deref(),
            Some("Estimated sessions must be between 1 and 999.")
        );

        state.edit_form_mut().unwrap().estimated_sessions = "200000000".into();
        assert_eq!(state.start_save_edit(), None);
        state.edit_form_mut().unwrap().estimated_sessions = MAX_ESTIMATED_SESSIONS.to_string();
        let (_, update) = state.start_save_edit().unwrap();
        assert_eq!(update.estimated_sessions, Some(MAX_ESTIMATED_SESSIONS));
    }

    #[tokio::test]
    async fn test_edit_merges_response_and_closes() {
        let mock = MockTransport::new().reply(
            Method::Put,
            "/steps/2",
            200,
            r#"{"id":2,"name":"Target","description":"touch","order":2,"estimated_sessions":6,"is_complete":false}"#,
        );
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, false), step(2, 3, false)]);
        state.click_step(1);
        state.begin_edit();
        state.edit_form_mut().unwrap().name = "Target".into();

        let (step_id, update) = state.start_save_edit().unwrap();
        assert_eq!(state.start_save_edit(), None);
        state.finish_save_edit(step_id, client.update_step(step_id, &update).await);

        assert_eq!(state.steps[1].name, "Target");
        assert_eq!(state.steps[1].estimated_sessions, 6);
        assert_eq!(state.steps[0], step(1, 2, false));
        assert_eq!(state.overlay, Overlay::None);
        assert_eq!(
            mock.calls()[0].body,
            Some(serde_json::json!({
                "name": "Target", "description": "do 2",
                "estimated_sessions": 3, "is_complete": false
            }))
        );
    }

    #[tokio::test]
    async fn test_edit_failure_keeps_form_open() {
        let mock = MockTransport::new().reply(Method::Put, "/steps/1", 500, "");
        let client = ApiClient::new(mock).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, false)]);
        state.click_step(0);
        state.begin_edit();

        let (step_id, update) = state.start_save_edit().unwrap();
        state.finish_save_edit(step_id, client.update_step(step_id, &update).await);
        let form = state.edit_form_mut().unwrap();
        assert!(!form.saving);
        assert_eq!(form.error.as_deref(), Some(UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_add_session_with_complete() {
        let mock = MockTransport::new()
            .reply(Method::Post, "/steps/1/notes", 200, r#"{"id":70,"step_id":1,"note":"good"}"#)
            .reply(Method::Post, "/steps/1/complete", 200, r#"{}"#)
            .reply(
                Method::Get,
                "/steps/1/notes",
                200,
                r#"[{"id":70,"step_id":1,"note":"good","performed_date":"2024-05-02"}]"#,
            );
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, false), step(2, 3, false)]);
        state.click_step(0);
        state.begin_add_session(today());
        {
            let form = state.session_form_mut().unwrap();
            form.note = "good".into();
            form.mark_complete = true;
        }

        let submission = state.start_add_session().unwrap();
        assert!(submission.complete);
        let outcome = submit_session(&client, &submission).await;
        state.finish_add_session(submission.step_id, outcome);

        assert_eq!(mock.count(Method::Post, "/steps/1/notes"), 1);
        assert_eq!(mock.count(Method::Post, "/steps/1/complete"), 1);
        assert!(state.steps[0].is_complete);
        assert_eq!(state.steps[1], step(2, 3, false));
        assert_eq!(state.notes_for(1).len(), 1);
        assert_eq!(state.overlay, Overlay::None);
    }

    #[tokio::test]
    async fn test_add_session_on_complete_step_skips_complete_call() {
        let mock = MockTransport::new()
            .reply(Method::Post, "/steps/1/notes", 200, r#"{"id":70,"step_id":1}"#)
            .reply(Method::Get, "/steps/1/notes", 200, r#"[{"id":70,"step_id":1}]"#);
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, true)]);
        state.click_step(0);
        state.begin_add_session(today());
        state.session_form_mut().unwrap().mark_complete = true;

        let submission = state.start_add_session().unwrap();
        assert!(!submission.complete);
        state.finish_add_session(1, submit_session(&client, &submission).await);
        assert_eq!(mock.count(Method::Post, "/steps/1/complete"), 0);
        assert_eq!(submission.note.note, None);
    }

    #[tokio::test]
    async fn test_add_session_keeps_note_when_complete_fails() {
        let mock = MockTransport::new()
            .reply(Method::Post, "/steps/1/notes", 200, r#"{"id":71,"step_id":1,"note":"close"}"#)
            .reply(Method::Post, "/steps/1/complete", 500, "")
            .reply(Method::Get, "/steps/1/notes", 200, r#"[{"id":71,"step_id":1,"note":"close"}]"#);
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, false), step(2, 3, false)]);
        state.click_step(0);
        state.begin_add_session(today());
        {
            let form = state.session_form_mut().unwrap();
            form.note = "close".into();
            form.mark_complete = true;
        }

        let submission = state.start_add_session().unwrap();
        let outcome = submit_session(&client, &submission).await;
        assert_eq!(
            outcome,
            Ok(SessionOutcome {
                step_id: 1,
                completed: false,
                complete_failed: true,
                notes: Some(vec![SessionNote {
                    id: 71,
                    step_id: 1,
                    note: Some("close".into()),
                    session_count: None,
                    performed_date: None,
                }]),
            })
        );
        state.finish_add_session(1, outcome);

        assert_eq!(mock.count(Method::Post, "/steps/1/notes"), 1);
        assert_eq!(mock.count(Method::Post, "/steps/1/complete"), 1);
        assert!(!state.steps[0].is_complete);
        assert_eq!(state.notes_for(1).iter().map(|n| n.id).collect::<Vec<_>>(), vec![71]);
        assert_eq!(state.error.as_deref(), Some(COMPLETE_FAILED));
        assert_eq!(state.overlay, Overlay::None);
    }

    #[tokio::test]
    async fn test_add_session_failure_keeps_form() {
        let mock = MockTransport::new().reply(Method::Post, "/steps/1/notes", 500, "");
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, false)]);
        state.click_step(0);
        state.begin_add_session(today());
        state.session_form_mut().unwrap().note = "tried".into();

        let submission = state.start_add_session().unwrap();
        state.finish_add_session(1, submit_session(&client, &submission).await);
        let form = state.session_form_mut().unwrap();
        assert_eq!(form.error.as_deref(), Some(SESSION_FAILED));
        assert_eq!(form.note, "tried");
        assert_eq!(mock.count(Method::Get, "/steps/1/notes"), 0);
    }

    #[tokio::test]
    async fn test_batched_notes_grouped_by_step() {
        let mock = MockTransport::new().reply(
            Method::Get,
            "/plans/10/notes",
            200,
            r#"[{"id":1,"step_id":1},{"id":2,"step_id":2},{"id":3,"step_id":1}]"#,
        );
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));
        let mut state = loaded(vec![step(1, 2, false), step(2, 1, false), step(3, 1, false)]);

        let notes = load_plan_notes(&client, 10, &[1, 2, 3]).await;
        state.finish_plan_notes(10, notes);
        assert_eq!(state.notes_for(1).iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(state.notes_for(2).len(), 1);
        assert!(state.notes_for(3).is_empty());
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_notes_fall_back_to_per_step() {
        let mock = MockTransport::new()
            .reply(Method::Get, "/plans/10/notes", 404, r#"{"detail":"Not Found"}"#)
            .reply(Method::Get, "/steps/1/notes", 200, r#"[{"id":5,"step_id":1}]"#)
            .reply(Method::Get, "/steps/2/notes", 500, "");
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));

        let notes = load_plan_notes(&client, 10, &[1, 2]).await.unwrap();
        assert_eq!(notes[&1].len(), 1);
        assert!(notes[&2].is_empty());
        assert_eq!(mock.count(Method::Get, "/steps/1/notes"), 1);
        assert_eq!(mock.count(Method::Get, "/steps/2/notes"), 1);
    }

    #[tokio::test]
    async fn test_401_anywhere_in_explorer_ends_session() {
        for (method, path) in [
            (Method::Get, "/plans/animal/1"),
            (Method::Get, "/plans/10"),
            (Method::Put, "/steps/1"),
            (Method::Post, "/steps/1/notes"),
        ] {
            let store = MemoryTokenStore::with_token("stale");
            let session = Rc::new(RefCell::new(Session::restore(&store)));
            let hook_session = session.clone();
            let hook_store = store.clone();
            let mock = MockTransport::new().reply(method, path, 401, "");
            let client = ApiClient::new(mock)
                .with_token(Some("stale".into()))
                .on_unauthorized(move || hook_session.borrow_mut().logout(&hook_store));

            let mut state = loaded(vec![step(1, 2, false)]);
            let before_error = state.error.clone();
            match path {
                "/plans/animal/1" => state.finish_plans(1, client.list_plans(1).await),
                "/plans/10" => {
                    state.finish_plan_detail(10, client.get_plan(10).await);
                }
                "/steps/1" => {
                    let result = client.update_step(1, &StepUpdate::default()).await;
                    state.finish_save_edit(1, result);
                }
                _ => {
                    let submission = SessionSubmission {
                        step_id: 1,
                        note: NewSessionNote { note: None, performed_date: None },
                        complete: false,
                    };
                    state.finish_add_session(1, submit_session(&client, &submission).await);
                }
            }

            assert_eq!(store.load(), None, "{} should clear the token", path);
            assert_eq!(state.error, before_error);
            let authenticated = session.borrow().is_authenticated();
            assert_eq!(Route::resolve(Some(Route::PlanExplorer), authenticated), Route::Login);
        }
    }
}
