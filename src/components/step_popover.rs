//! Step Popover Component
//!
//! Floating panel under an open step bar. Shows the description, or the
//! edit form, or the add-session form, depending on the step's mode.

use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;

use trainit_core::explorer::{step_description, submit_session, ExplorerState, Overlay, StepMode};

use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Display,
    Editing,
    AddingSession,
}

#[component]
pub fn StepPopover(explorer: RwSignal<ExplorerState>, index: usize, left_px: u32) -> impl IntoView {
    let mode = Memo::new(move |_| {
        explorer.with(|s| match &s.overlay {
            Overlay::Step { mode, .. } => Some(match mode {
                StepMode::Display => Mode::Display,
                StepMode::Editing(_) => Mode::Editing,
                StepMode::AddingSession(_) => Mode::AddingSession,
            }),
            _ => None,
        })
    });

    view! {
        <div class="step-popover" style=format!("left: {}px", left_px)>
            {move || match mode.get() {
                Some(Mode::Editing) => view! { <StepEditForm explorer=explorer /> }.into_any(),
                Some(Mode::AddingSession) => view! { <SessionNoteForm explorer=explorer /> }.into_any(),
                _ => view! { <StepDetails explorer=explorer index=index /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn StepDetails(explorer: RwSignal<ExplorerState>, index: usize) -> impl IntoView {
    let step = Memo::new(move |_| explorer.with(|s| s.steps.get(index).cloned()));

    view! {
        {move || step.get().map(|step| view! {
            <h3>{step.name.clone()}</h3>
            <p class="step-description">{step_description(&step).to_string()}</p>
            <p class="step-meta">
                {format!("{} sessions", step.estimated_sessions)}
                {if step.is_complete { " · Complete" } else { " · In progress" }}
            </p>
        })}
        <div class="popover-actions">
            <button
                type="button"
                on:click=move |_| explorer.update(|s| s.begin_add_session(Local::now().date_naive()))
            >
                "Add Session"
            </button>
            <button type="button" on:click=move |_| explorer.update(|s| s.begin_edit())>
                "Edit Step"
            </button>
        </div>
    }
}

#[component]
fn StepEditForm(explorer: RwSignal<ExplorerState>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let saving = Memo::new(move |_| explorer.with(|s| s.edit_form().is_some_and(|f| f.saving)));
    let error = Memo::new(move |_| explorer.with(|s| s.edit_form().and_then(|f| f.error.clone())));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut request = None;
        explorer.update(|s| request = s.start_save_edit());
        let Some((step_id, update)) = request else { return };

        spawn_local(async move {
            let result = ctx.api().update_step(step_id, &update).await;
            explorer.update(|s| s.finish_save_edit(step_id, result));
        });
    };

    view! {
        <form class="step-edit-form" on:submit=on_submit>
            <label class="form-field">
                <span>"Name"</span>
                <input
                    type="text"
                    prop:value=move || explorer.with(|s| s.edit_form().map(|f| f.name.clone()).unwrap_or_default())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        explorer.update(|s| {
                            if let Some(f) = s.edit_form_mut() {
                                f.name = value;
                            }
                        });
                    }
                />
            </label>
            <label class="form-field">
                <span>"Description"</span>
                <textarea
                    prop:value=move || explorer.with(|s| s.edit_form().map(|f| f.description.clone()).unwrap_or_default())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        explorer.update(|s| {
                            if let Some(f) = s.edit_form_mut() {
                                f.description = value;
                            }
                        });
                    }
                />
            </label>
            <label class="form-field">
                <span>"Estimated sessions"</span>
                <input
                    type="number"
                    min="1"
                    prop:value=move || explorer.with(|s| s.edit_form().map(|f| f.estimated_sessions.clone()).unwrap_or_default())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        explorer.update(|s| {
                            if let Some(f) = s.edit_form_mut() {
                                f.estimated_sessions = value;
                            }
                        });
                    }
                />
            </label>
            {move || error.get().map(|e| view! { <p class="error-message">{e}</p> })}
            <div class="popover-actions">
                <button type="submit" prop:disabled=move || saving.get()>
                    {move || if saving.get() { "Saving..." } else { "Save" }}
                </button>
                <button type="button" on:click=move |_| explorer.update(|s| s.back_to_display())>
                    "Cancel"
                </button>
            </div>
        </form>
    }
}

#[component]
fn SessionNoteForm(explorer: RwSignal<ExplorerState>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let saving = Memo::new(move |_| explorer.with(|s| s.session_form().is_some_and(|f| f.saving)));
    let error = Memo::new(move |_| explorer.with(|s| s.session_form().and_then(|f| f.error.clone())));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut request = None;
        explorer.update(|s| request = s.start_add_session());
        let Some(submission) = request else { return };

        spawn_local(async move {
            let client = ctx.api();
            let result = submit_session(&client, &submission).await;
            explorer.update(|s| s.finish_add_session(submission.step_id, result));
        });
    };

    view! {
        <form class="session-note-form" on:submit=on_submit>
            <label class="form-field">
                <span>"Session note"</span>
                <textarea
                    placeholder="How did the session go?"
                    prop:value=move || explorer.with(|s| s.session_form().map(|f| f.note.clone()).unwrap_or_default())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        explorer.update(|s| {
                            if let Some(f) = s.session_form_mut() {
                                f.note = value;
                            }
                        });
                    }
                />
            </label>
            <label class="form-field">
                <span>"Date"</span>
                <input
                    type="date"
                    prop:value=move || explorer.with(|s| s.session_form().map(|f| f.performed_date.clone()).unwrap_or_default())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        explorer.update(|s| {
                            if let Some(f) = s.session_form_mut() {
                                f.performed_date = value;
                            }
                        });
                    }
                />
            </label>
            <label class="checkbox-field">
                <input
                    type="checkbox"
                    prop:checked=move || explorer.with(|s| s.session_form().is_some_and(|f| f.mark_complete))
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        explorer.update(|s| {
                            if let Some(f) = s.session_form_mut() {
                                f.mark_complete = checked;
                            }
                        });
                    }
                />
                "Mark step as complete"
            </label>
            {move || error.get().map(|e| view! { <p class="error-message">{e}</p> })}
            <div class="popover-actions">
                <button type="submit" prop:disabled=move || saving.get()>
                    {move || if saving.get() { "Saving..." } else { "Save Session" }}
                </button>
                <button type="button" on:click=move |_| explorer.update(|s| s.back_to_display())>
                    "Cancel"
                </button>
            </div>
        </form>
    }
}
