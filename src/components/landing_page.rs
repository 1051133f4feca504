//! Landing Page

use leptos::prelude::*;

use trainit_core::Route;

use crate::components::NavLink;
use crate::context::AppContext;

const SECTIONS: &[(Route, &str, &str)] = &[
    (Route::Animals, "Manage Animals", "Add, sort and remove the animals in your care."),
    (Route::PlanBuilder, "Create Training Plan", "Lay out a behavior as ordered steps with session estimates."),
    (Route::PlanExplorer, "View Training Plans", "Follow progress on a timeline and log sessions."),
];

#[component]
pub fn LandingPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    view! {
        <section class="landing">
            <h1>"Welcome to TrainIt"</h1>
            <div class="landing-cards">
                {SECTIONS.iter().map(|(route, title, blurb)| view! {
                    <NavLink route=*route class_name="landing-card">
                        <h2>{*title}</h2>
                        <p>{*blurb}</p>
                    </NavLink>
                }).collect_view()}
            </div>
            <button class="logout-btn" on:click=move |_| ctx.logout()>"Logout"</button>
        </section>
    }
}
