//! Gantt Chart Component
//!
//! One row per step: a bar positioned on the session axis, the step's
//! session-note markers under it, and the popover when the bar is open.

use leptos::prelude::*;

use trainit_core::explorer::ExplorerState;
use trainit_core::gantt::{Bar, GanttLayout, LABEL_PX};
use trainit_core::models::{SessionNote, Step};

use crate::components::StepPopover;

#[component]
pub fn GanttChart(explorer: RwSignal<ExplorerState>) -> impl IntoView {
    let steps = Memo::new(move |_| explorer.with(|s| s.steps.clone()));
    let layout = Memo::new(move |_| steps.with(|steps| GanttLayout::new(steps)));
    let open_step = Memo::new(move |_| explorer.with(|s| s.open_step()));
    let active_note = Memo::new(move |_| explorer.with(|s| s.active_note()));

    let rows = move || {
        layout.with(|layout| {
            steps.with(|steps| {
                layout
                    .bars
                    .iter()
                    .zip(steps)
                    .map(|(bar, step)| (*bar, step.clone()))
                    .collect::<Vec<_>>()
            })
        })
    };

    view! {
        <Show
            when=move || !steps.with(Vec::is_empty)
            fallback=|| view! { <p class="empty-state">"This plan has no steps yet."</p> }
        >
            <div class="gantt-chart">
                <div class="gantt-axis">
                    <div class="gantt-label" style=format!("width: {}px", LABEL_PX)></div>
                    {move || layout.with(|l| {
                        let width = l.tick_width_px();
                        l.axis()
                            .map(|n| view! {
                                <span class="gantt-tick" style=format!("width: {}px", width)>{n}</span>
                            })
                            .collect_view()
                    })}
                </div>
                <For
                    each=rows
                    key=|(bar, step)| (bar.start, bar.span, step.id, step.name.clone(), step.is_complete)
                    children=move |(bar, step)| view! {
                        <GanttRow
                            explorer=explorer
                            layout=layout
                            bar=bar
                            step=step
                            open_step=open_step
                            active_note=active_note
                        />
                    }
                />
            </div>
        </Show>
    }
}

#[component]
fn GanttRow(
    explorer: RwSignal<ExplorerState>,
    layout: Memo<GanttLayout>,
    bar: Bar,
    step: Step,
    open_step: Memo<Option<usize>>,
    active_note: Memo<Option<u32>>,
) -> impl IntoView {
    let index = bar.index;
    let step_id = step.id;
    let notes = Memo::new(move |_| explorer.with(|s| s.notes_for(step_id).to_vec()));
    let bar_style = format!(
        "left: {}px; width: {}px; background-color: {};",
        bar.left_px(),
        bar.width_px(),
        bar.color()
    );

    view! {
        <div class="gantt-row">
            <div class="gantt-label" style=format!("width: {}px", LABEL_PX) title=step.name.clone()>
                {step.name.clone()}
            </div>
            <div class="gantt-track" style=move || format!("width: {}px", layout.with(|l| l.width_px()))>
                <div
                    class="gantt-bar"
                    style=bar_style
                    on:click=move |ev| {
                        ev.stop_propagation();
                        explorer.update(|s| s.click_step(index));
                    }
                >
                    <span class="gantt-bar-label">{step.name.clone()}</span>
                </div>
                <Show when=move || open_step.get() == Some(index)>
                    <StepPopover explorer=explorer index=index left_px=bar.left_px() />
                </Show>
                <div class="session-markers" style=format!("left: {}px", bar.left_px())>
                    <For
                        each=move || notes.get()
                        key=|note| note.id
                        children=move |note| view! {
                            <SessionMarker explorer=explorer note=note active_note=active_note />
                        }
                    />
                </div>
            </div>
        </div>
    }
}

/// Dot for one session note; notes with text open a tooltip
#[component]
fn SessionMarker(
    explorer: RwSignal<ExplorerState>,
    note: SessionNote,
    active_note: Memo<Option<u32>>,
) -> impl IntoView {
    let id = note.id;
    let date = note.performed_date.map(|d| d.format("%Y-%m-%d").to_string());
    let Some(text) = note.text().map(str::to_string) else {
        return view! { <span class="session-marker-empty" title=date.unwrap_or_default()></span> }
            .into_any();
    };
    let session = note.session_count.map(|n| format!("Session {}", n));

    view! {
        <span
            class=move || if active_note.get() == Some(id) { "session-marker active" } else { "session-marker" }
            on:click=move |ev| {
                ev.stop_propagation();
                explorer.update(|s| s.click_note(id));
            }
        >
            <Show when=move || active_note.get() == Some(id)>
                <div class="note-tooltip">
                    {session.clone().map(|s| view! { <div class="note-session">{s}</div> })}
                    {date.clone().map(|d| view! { <div class="note-date">{d}</div> })}
                    <div class="note-text">{text.clone()}</div>
                </div>
            </Show>
        </span>
    }
    .into_any()
}
