//! Plan Builder
//!
//! Form state for a new training plan and its ordered step drafts.

use chrono::NaiveDate;

use crate::error::{ApiError, ApiResult, FormError};
use crate::models::{Category, NewPlan, NewStep, TrainingPlan, MAX_ESTIMATED_SESSIONS};

pub const CREATE_FAILED: &str = "Failed to create training plan";
pub const CREATED: &str = "Training plan created successfully!";

/// Session counts offered per step
pub const SESSION_CHOICES: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 15, 20];

pub const DEFAULT_SESSIONS: u32 = 5;

/// One step as typed in the form; `id` only keys the draft list
#[derive(Debug, Clone, PartialEq)]
pub struct StepDraft {
    pub id: u32,
    pub description: String,
    pub estimated_sessions: u32,
}

impl StepDraft {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            description: String::new(),
            estimated_sessions: DEFAULT_SESSIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanForm {
    pub animal_id: String,
    pub name: String,
    pub cue_description: String,
    pub criteria: String,
    pub category: String,
    pub started_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanBuilder {
    pub form: PlanForm,
    pub steps: Vec<StepDraft>,
    pub submitting: bool,
    pub error: Option<String>,
    pub confirmation: Option<String>,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self {
            form: PlanForm::default(),
            steps: vec![StepDraft::new(1)],
            submitting: false,
            error: None,
            confirmation: None,
        }
    }
}

impl PlanBuilder {
    /// Append an empty draft with the next id
    pub fn add_step(&mut self) {
        let next = self.steps.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        self.steps.push(StepDraft::new(next));
    }

    pub fn set_step_description(&mut self, id: u32, description: String) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.id == id) {
            step.description = description;
        }
    }

    pub fn set_step_sessions(&mut self, id: u32, sessions: u32) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.id == id) {
            step.estimated_sessions = sessions.clamp(1, MAX_ESTIMATED_SESSIONS);
        }
    }

    /// Target animal and payload. Steps are numbered by list position and
    /// named after it, whatever was typed.
    pub fn build_request(&self) -> Result<(u32, NewPlan), FormError> {
        let animal_id = self
            .form
            .animal_id
            .parse::<u32>()
            .map_err(|_| FormError::Missing("animal"))?;
        let name = self.form.name.trim();
        if name.is_empty() {
            return Err(FormError::Missing("plan name"));
        }
        if self.form.cue_description.trim().is_empty() {
            return Err(FormError::Missing("cue description"));
        }
        if self.form.criteria.trim().is_empty() {
            return Err(FormError::Missing("criteria"));
        }
        let category = self.form.category.parse::<Category>()?;
        let started_date = match self.form.started_date.trim() {
            "" => None,
            text => Some(
                NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| FormError::InvalidDate)?,
            ),
        };

        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| NewStep {
                name: format!("Step {}", index + 1),
                description: step.description.clone(),
                order: index as u32 + 1,
                estimated_sessions: step.estimated_sessions.clamp(1, MAX_ESTIMATED_SESSIONS),
                is_complete: false,
            })
            .collect();

        Ok((
            animal_id,
            NewPlan {
                name: name.to_string(),
                cue_description: self.form.cue_description.clone(),
                criteria: self.form.criteria.clone(),
                category,
                started_date,
                steps,
            },
        ))
    }

    pub fn begin_submit(&mut self) -> Option<(u32, NewPlan)> {
        if self.submitting {
            return None;
        }
        self.confirmation = None;
        match self.build_request() {
            Ok(request) => {
                self.submitting = true;
                self.error = None;
                Some(request)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Success resets the whole builder; failure keeps the input for retry
    pub fn finish_submit(&mut self, result: ApiResult<TrainingPlan>) {
        self.submitting = false;
        match result {
            Ok(plan) => {
                log::info!("[PLANS] created plan #{} with {} steps", plan.id, plan.steps.len());
                *self = PlanBuilder {
                    confirmation: Some(CREATED.to_string()),
                    ..PlanBuilder::default()
                };
            }
            Err(ApiError::Unauthorized) => {}
            Err(_) => self.error = Some(CREATE_FAILED.to_string()),
        }
    }

    pub fn dismiss_confirmation(&mut self) {
        self.confirmation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::mock::MockTransport;
    use crate::session::{MemoryTokenStore, Route, Session, TokenStore};
    use crate::transport::Method;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn filled() -> PlanBuilder {
        let mut builder = PlanBuilder::default();
        builder.form = PlanForm {
            animal_id: "3".into(),
            name: "Station".into(),
            cue_description: "flat palm".into(),
            criteria: "holds five seconds".into(),
            category: "Stationary".into(),
            started_date: "".into(),
        };
        builder
    }

    #[test]
    fn test_add_step_ids_are_monotonic() {
        let mut builder = PlanBuilder::default();
        builder.add_step();
        builder.add_step();
        assert_eq!(builder.steps.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(builder.steps.iter().all(|s| s.estimated_sessions == DEFAULT_SESSIONS));
    }

    #[test]
    fn test_steps_numbered_and_named_by_position() {
        let mut builder = filled();
        builder.set_step_description(1, "a".into());
        builder.add_step();
        builder.set_step_description(2, "b".into());
        builder.set_step_sessions(2, 3);

        let (animal_id, plan) = builder.build_request().unwrap();
        assert_eq!(animal_id, 3);
        assert_eq!(plan.steps.iter().map(|s| s.order).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            plan.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Step 1", "Step 2"]
        );
        assert_eq!(plan.steps[1].description, "b");
        assert_eq!(plan.steps[1].estimated_sessions, 3);
        assert!(plan.steps.iter().all(|s| !s.is_complete));
    }

    #[test]
    fn test_session_estimates_are_bounded() {
        let mut builder = filled();
        builder.add_step();
        builder.set_step_sessions(1, 0);
        builder.set_step_sessions(2, 200_000_000);
        assert_eq!(builder.steps[0].estimated_sessions, 1);
        assert_eq!(builder.steps[1].estimated_sessions, MAX_ESTIMATED_SESSIONS);

        builder.steps[1].estimated_sessions = u32::MAX;
        let (_, plan) = builder.build_request().unwrap();
        assert_eq!(plan.steps[1].estimated_sessions, MAX_ESTIMATED_SESSIONS);
    }

    #[test]
    fn test_missing_fields_and_bad_date() {
        let mut builder = PlanBuilder::default();
        assert_eq!(builder.build_request(), Err(FormError::Missing("animal")));

        builder = filled();
        builder.form.started_date = "03/01/2024".into();
        assert_eq!(builder.build_request(), Err(FormError::InvalidDate));
        builder.form.started_date = "2024-03-01".into();
        let (_, plan) = builder.build_request().unwrap();
        assert_eq!(plan.started_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_submit_success_resets_and_failure_preserves() {
        let plan_json = r#"{"id":8,"name":"Station","animal_id":3,"steps":[]}"#;
        let mock = MockTransport::new()
            .reply(Method::Post, "/plans/animal/3", 500, "")
            .reply(Method::Post, "/plans/animal/3", 200, plan_json);
        let client = ApiClient::new(mock.clone()).with_token(Some("t".into()));

        let mut builder = filled();
        builder.add_step();
        let (animal_id, plan) = builder.begin_submit().unwrap();
        assert!(builder.begin_submit().is_none());
        builder.finish_submit(client.create_plan(animal_id, &plan).await);
        assert_eq!(builder.error.as_deref(), Some(CREATE_FAILED));
        assert_eq!(builder.steps.len(), 2);
        assert_eq!(builder.form.name, "Station");

        let (animal_id, plan) = builder.begin_submit().unwrap();
        builder.finish_submit(client.create_plan(animal_id, &plan).await);
        assert_eq!(builder.confirmation.as_deref(), Some(CREATED));
        assert_eq!(builder.steps, vec![StepDraft::new(1)]);
        assert_eq!(builder.form, PlanForm::default());

        let sent = &mock.calls()[1];
        assert_eq!(sent.body.as_ref().unwrap()["steps"][1]["order"], 2);
        assert_eq!(sent.body.as_ref().unwrap()["category"], "Stationary");
    }

    #[tokio::test]
    async fn test_401_on_create_ends_session_quietly() {
        let store = MemoryTokenStore::with_token("stale");
        let session = Rc::new(RefCell::new(Session::restore(&store)));
        let hook_session = session.clone();
        let hook_store = store.clone();
        let mock = MockTransport::new().reply(Method::Post, "/plans/animal/3", 401, "");
        let client = ApiClient::new(mock.clone())
            .with_token(Some("stale".into()))
            .on_unauthorized(move || hook_session.borrow_mut().logout(&hook_store));

        let mut builder = filled();
        let (animal_id, plan) = builder.begin_submit().unwrap();
        builder.finish_submit(client.create_plan(animal_id, &plan).await);

        assert_eq!(mock.count(Method::Post, "/plans/animal/3"), 1);
        assert!(!builder.submitting);
        assert_eq!(builder.error, None);
        assert_eq!(builder.confirmation, None);
        assert_eq!(store.load(), None);
        let authenticated = session.borrow().is_authenticated();
        assert_eq!(Route::resolve(Some(Route::PlanBuilder), authenticated), Route::Login);
    }
}
