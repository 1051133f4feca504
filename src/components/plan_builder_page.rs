//! Plan Builder Page
//!
//! Form for a new training plan with an ordered list of steps.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use trainit_core::models::{Animal, Category};
use trainit_core::plan_builder::{PlanBuilder, SESSION_CHOICES};
use trainit_core::roster::LOAD_FAILED;

use crate::context::AppContext;

/// How long the success banner stays up
const CONFIRMATION_MS: u32 = 3_000;

#[component]
pub fn PlanBuilderPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let builder = RwSignal::new(PlanBuilder::default());
    let (animals, set_animals) = signal(Vec::<Animal>::new());
    let (load_error, set_load_error) = signal::<Option<String>>(None);

    // Animal choices, once per mount
    Effect::new(move |_| {
        spawn_local(async move {
            match ctx.api().list_animals().await {
                Ok(loaded) => set_animals.set(loaded),
                Err(e) => set_load_error.set(e.user_message(LOAD_FAILED)),
            }
        });
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut request = None;
        builder.update(|b| request = b.begin_submit());
        let Some((animal_id, plan)) = request else { return };

        spawn_local(async move {
            let result = ctx.api().create_plan(animal_id, &plan).await;
            let created = result.is_ok();
            builder.update(|b| b.finish_submit(result));
            if created {
                TimeoutFuture::new(CONFIRMATION_MS).await;
                builder.update(|b| b.dismiss_confirmation());
            }
        });
    };

    view! {
        <section class="plan-builder">
            <h1>"Create Training Plan"</h1>

            {move || load_error.get().map(|e| view! { <p class="error-message">{e}</p> })}
            {move || builder.with(|b| b.confirmation.clone()).map(|msg| view! {
                <p class="success-message">{msg}</p>
            })}
            {move || builder.with(|b| b.error.clone()).map(|e| view! { <p class="error-message">{e}</p> })}

            <form class="plan-form" on:submit=on_submit>
                <label class="form-field">
                    <span>"Animal"</span>
                    <select
                        prop:value=move || builder.with(|b| b.form.animal_id.clone())
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            builder.update(|b| b.form.animal_id = value);
                        }
                    >
                        <option value="">"Select an animal"</option>
                        <For
                            each=move || animals.get()
                            key=|animal| animal.id
                            children=move |animal| view! {
                                <option value=animal.id.to_string()>
                                    {format!("{} ({})", animal.name, animal.species.label())}
                                </option>
                            }
                        />
                    </select>
                </label>

                <label class="form-field">
                    <span>"Plan name"</span>
                    <input
                        type="text"
                        prop:value=move || builder.with(|b| b.form.name.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            builder.update(|b| b.form.name = value);
                        }
                    />
                </label>

                <label class="form-field">
                    <span>"Cue description"</span>
                    <textarea
                        prop:value=move || builder.with(|b| b.form.cue_description.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            builder.update(|b| b.form.cue_description = value);
                        }
                    />
                </label>

                <label class="form-field">
                    <span>"Criteria"</span>
                    <textarea
                        prop:value=move || builder.with(|b| b.form.criteria.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            builder.update(|b| b.form.criteria = value);
                        }
                    />
                </label>

                <label class="form-field">
                    <span>"Category"</span>
                    <select
                        prop:value=move || builder.with(|b| b.form.category.clone())
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            builder.update(|b| b.form.category = value);
                        }
                    >
                        <option value="">"Select a category"</option>
                        {Category::ALL.iter().map(|c| view! {
                            <option value=c.as_str()>{c.as_str()}</option>
                        }).collect_view()}
                    </select>
                </label>

                <label class="form-field">
                    <span>"Start date"</span>
                    <input
                        type="date"
                        prop:value=move || builder.with(|b| b.form.started_date.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            builder.update(|b| b.form.started_date = value);
                        }
                    />
                </label>

                <h2>"Steps"</h2>
                <ol class="step-drafts">
                    <For
                        each=move || builder.with(|b| b.steps.iter().map(|s| s.id).collect::<Vec<_>>())
                        key=|id| *id
                        children=move |id| {
                            let draft = move || builder.with(|b| b.steps.iter().find(|s| s.id == id).cloned());
                            view! {
                                <li class="step-draft">
                                    <textarea
                                        placeholder="Describe this step"
                                        prop:value=move || draft().map(|d| d.description).unwrap_or_default()
                                        on:input=move |ev| {
                                            let value = event_target_value(&ev);
                                            builder.update(|b| b.set_step_description(id, value));
                                        }
                                    />
                                    <select
                                        prop:value=move || draft().map(|d| d.estimated_sessions.to_string()).unwrap_or_default()
                                        on:change=move |ev| {
                                            if let Ok(sessions) = event_target_value(&ev).parse::<u32>() {
                                                builder.update(|b| b.set_step_sessions(id, sessions));
                                            }
                                        }
                                    >
                                        {SESSION_CHOICES.iter().map(|n| view! {
                                            <option value=n.to_string()>{format!("{} sessions", n)}</option>
                                        }).collect_view()}
                                    </select>
                                </li>
                            }
                        }
                    />
                </ol>
                <button type="button" class="add-step-btn" on:click=move |_| builder.update(|b| b.add_step())>
                    "+ Add Step"
                </button>

                <button type="submit" prop:disabled=move || builder.with(|b| b.submitting)>
                    {move || if builder.with(|b| b.submitting) { "Creating..." } else { "Create Plan" }}
                </button>
            </form>
        </section>
    }
}
