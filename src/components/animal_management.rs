//! Animal Management Page
//!
//! Roster table with sortable headers, inline delete and the add-animal form.

use leptos::prelude::*;
use leptos::task::spawn_local;

use trainit_core::models::{Sex, Species};
use trainit_core::roster::{RosterState, SortField};

use crate::components::DeleteConfirmButton;
use crate::context::AppContext;

#[component]
pub fn AnimalManagement() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let roster = RwSignal::new(RosterState::default());
    let (reload_trigger, set_reload_trigger) = signal(0u32);
    let submitting = Memo::new(move |_| roster.with(|r| r.submitting));

    // Re-list on mount, token change, submit start/end and after deletes
    Effect::new(move |_| {
        let token = ctx.token();
        let _ = submitting.get();
        let _ = reload_trigger.get();
        if token.is_none() {
            return;
        }
        roster.update(|r| r.begin_load());
        spawn_local(async move {
            let result = ctx.api().list_animals().await;
            if let Ok(animals) = &result {
                log::debug!("[ROSTER] loaded {} animals", animals.len());
            }
            roster.update(|r| r.finish_load(result));
        });
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut payload = None;
        roster.update(|r| payload = r.begin_submit());
        let Some(animal) = payload else { return };

        spawn_local(async move {
            let result = ctx.api().create_animal(&animal).await;
            roster.update(|r| r.finish_submit(result));
        });
    };

    let delete_animal = move |id: u32| {
        spawn_local(async move {
            let result = ctx.api().delete_animal(id).await;
            let deleted = result.is_ok();
            roster.update(|r| r.finish_delete(id, result));
            if deleted {
                set_reload_trigger.update(|v| *v += 1);
            }
        });
    };

    view! {
        <section class="animal-management">
            <h1>"Animals"</h1>

            {move || roster.with(|r| r.error.clone()).map(|e| view! { <p class="error-message">{e}</p> })}

            <form class="animal-form" on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value=move || roster.with(|r| r.form.name.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        roster.update(|r| r.form.name = value);
                    }
                />
                <select
                    prop:value=move || roster.with(|r| r.form.species.clone())
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        roster.update(|r| r.form.species = value);
                    }
                >
                    <option value="">"Species"</option>
                    {Species::ALL.iter().map(|s| view! {
                        <option value=s.as_str().to_string()>{s.label().to_string()}</option>
                    }).collect_view()}
                </select>
                <select
                    prop:value=move || roster.with(|r| r.form.sex.clone())
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        roster.update(|r| r.form.sex = value);
                    }
                >
                    <option value="">"Sex"</option>
                    {Sex::ALL.iter().map(|s| view! {
                        <option value=s.as_str()>{s.as_str()}</option>
                    }).collect_view()}
                </select>
                <input
                    type="number"
                    min="0"
                    placeholder="Age"
                    prop:value=move || roster.with(|r| r.form.age.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        roster.update(|r| r.form.age = value);
                    }
                />
                <input
                    type="text"
                    placeholder="Location"
                    prop:value=move || roster.with(|r| r.form.location.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        roster.update(|r| r.form.location = value);
                    }
                />
                <button type="submit" prop:disabled=move || submitting.get()>
                    {move || if submitting.get() { "Adding..." } else { "Add Animal" }}
                </button>
            </form>

            <Show
                when=move || !roster.with(|r| r.loading && r.animals.is_empty())
                fallback=|| view! { <p class="loading">"Loading animals..."</p> }
            >
                <table class="animal-table">
                    <thead>
                        <tr>
                            {SortField::ALL.iter().map(|field| {
                                let field = *field;
                                view! {
                                    <th
                                        class="sortable"
                                        on:click=move |_| roster.update(|r| r.sort.toggle(field))
                                    >
                                        {field.label()} " "
                                        <span class="sort-indicator">
                                            {move || roster.with(|r| r.sort.indicator(field))}
                                        </span>
                                    </th>
                                }
                            }).collect_view()}
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || roster.with(|r| r.sorted())
                            key=|animal| animal.id
                            children=move |animal| {
                                let id = animal.id;
                                view! {
                                    <tr>
                                        <td>{animal.name.clone()}</td>
                                        <td>{animal.species.label().to_string()}</td>
                                        <td>{animal.sex.as_str()}</td>
                                        <td>{animal.age.map(|a| a.to_string()).unwrap_or_default()}</td>
                                        <td>{animal.location.clone().unwrap_or_default()}</td>
                                        <td>
                                            <DeleteConfirmButton
                                                button_class="delete-btn"
                                                on_confirm=Callback::new(move |_| delete_animal(id))
                                            />
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
                <Show when=move || roster.with(|r| !r.loading && r.animals.is_empty())>
                    <p class="empty-state">"No animals yet."</p>
                </Show>
            </Show>
        </section>
    }
}
