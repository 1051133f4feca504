//! Plan Explorer Page
//!
//! Animal → plan browser on the left, the selected plan's Gantt chart on the
//! right. A single window click listener feeds outside clicks to the
//! explorer state so overlays close on their own.

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use trainit_core::explorer::{load_plan_notes, ClickRegion, ExplorerState, Overlay};
use trainit_core::models::TrainingPlan;

use crate::components::GanttChart;
use crate::context::AppContext;

/// Classify a click by the event path fixed at dispatch
fn click_region(ev: &web_sys::MouseEvent) -> ClickRegion {
    for target in ev.composed_path().iter() {
        let Some(element) = target.dyn_ref::<web_sys::Element>() else {
            continue;
        };
        let classes = element.class_list();
        if classes.contains("step-popover") {
            return ClickRegion::Popover;
        }
        if classes.contains("gantt-bar") {
            return ClickRegion::StepBar;
        }
        if classes.contains("session-marker") {
            return ClickRegion::NoteMarker;
        }
    }
    ClickRegion::Elsewhere
}

#[component]
pub fn PlanExplorer() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let explorer = RwSignal::new(ExplorerState::default());
    let selected_plan = Memo::new(move |_| explorer.with(|s| s.nav.selected_plan().cloned()));

    Effect::new(move |_| {
        spawn_local(async move {
            let result = ctx.api().list_animals().await;
            explorer.update(|s| s.finish_animals(result));
        });
    });

    // Outside-click dispatcher, detached when the page unmounts
    let clicks = window_event_listener(ev::click, move |ev| {
        if explorer.with_untracked(|s| s.overlay == Overlay::None) {
            return;
        }
        let region = click_region(&ev);
        explorer.update(|s| s.on_document_click(region));
    });
    on_cleanup(move || clicks.remove());

    let toggle_animal = move |animal_id: u32| {
        let mut needs_fetch = false;
        explorer.update(|s| needs_fetch = s.toggle_animal(animal_id));
        if !needs_fetch {
            return;
        }
        spawn_local(async move {
            let result = ctx.api().list_plans(animal_id).await;
            explorer.update(|s| s.finish_plans(animal_id, result));
        });
    };

    let select_plan = move |plan: TrainingPlan| {
        let plan_id = plan.id;
        explorer.update(|s| s.select_plan(plan));
        spawn_local(async move {
            let client = ctx.api();
            let result = client.get_plan(plan_id).await;
            let mut step_ids = None;
            explorer.update(|s| step_ids = s.finish_plan_detail(plan_id, result));
            let Some(step_ids) = step_ids else { return };

            let notes = load_plan_notes(&client, plan_id, &step_ids).await;
            explorer.update(|s| s.finish_plan_notes(plan_id, notes));
        });
    };

    view! {
        <section class="plan-explorer">
            <aside class="explorer-sidebar">
                <h2>"Animals"</h2>
                <Show
                    when=move || !explorer.with(|s| s.loading)
                    fallback=|| view! { <p class="loading">"Loading animals..."</p> }
                >
                    <For
                        each=move || explorer.with(|s| s.animals.clone())
                        key=|animal| animal.id
                        children=move |animal| {
                            let id = animal.id;
                            let expanded = Memo::new(move |_| explorer.with(|s| s.nav.expanded_animal() == Some(id)));
                            let plans = Memo::new(move |_| explorer.with(|s| s.plans_for(id).map(<[TrainingPlan]>::to_vec)));
                            view! {
                                <div class="animal-entry">
                                    <button
                                        class=move || if expanded.get() { "animal-toggle expanded" } else { "animal-toggle" }
                                        on:click=move |_| toggle_animal(id)
                                    >
                                        <span class="toggle-icon">{move || if expanded.get() { "▾" } else { "▸" }}</span>
                                        <span class="animal-name">{animal.name.clone()}</span>
                                        <span class="animal-species">{animal.species.label().to_string()}</span>
                                    </button>
                                    <Show when=move || expanded.get()>
                                        {move || match plans.get() {
                                            None => view! { <p class="loading">"Loading plans..."</p> }.into_any(),
                                            Some(list) if list.is_empty() => {
                                                view! { <p class="empty-state">"No training plans"</p> }.into_any()
                                            }
                                            Some(list) => view! {
                                                <ul class="plan-list">
                                                    {list.into_iter().map(|plan| {
                                                        let plan_id = plan.id;
                                                        let name = plan.name.clone();
                                                        let selected = move || explorer.with(|s| s.selected_plan_id() == Some(plan_id));
                                                        view! {
                                                            <li>
                                                                <button
                                                                    class=move || if selected() { "plan-item selected" } else { "plan-item" }
                                                                    on:click=move |_| select_plan(plan.clone())
                                                                >
                                                                    {name}
                                                                </button>
                                                            </li>
                                                        }
                                                    }).collect_view()}
                                                </ul>
                                            }
                                            .into_any(),
                                        }}
                                    </Show>
                                </div>
                            }
                        }
                    />
                    <Show when=move || explorer.with(|s| s.animals.is_empty())>
                        <p class="empty-state">"No animals yet."</p>
                    </Show>
                </Show>
            </aside>

            <div class="explorer-main">
                {move || explorer.with(|s| s.error.clone()).map(|e| view! { <p class="error-message">{e}</p> })}
                {move || match selected_plan.get() {
                    None => view! {
                        <p class="placeholder">"Select an animal and a training plan to see its steps."</p>
                    }
                    .into_any(),
                    Some(plan) => view! {
                        <PlanSummary plan=plan />
                        <GanttChart explorer=explorer />
                    }
                    .into_any(),
                }}
            </div>
        </section>
    }
}

#[component]
fn PlanSummary(plan: TrainingPlan) -> impl IntoView {
    let field = |label: &'static str, value: Option<String>| {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| view! { <p class="plan-field"><strong>{label}</strong> " " {v}</p> })
    };

    view! {
        <div class="plan-summary">
            <h2>{plan.name.clone()}</h2>
            {field("Category:", plan.category.map(|c| c.as_str().to_string()))}
            {field("Cue:", plan.cue_description.clone())}
            {field("Criteria:", plan.criteria.clone())}
            {field("Started:", plan.started_date.map(|d| d.format("%Y-%m-%d").to_string()))}
            {field("Notes:", plan.description.clone())}
        </div>
    }
}
