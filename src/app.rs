//! TrainIt App
//!
//! Session shell and page switch. Without a token only the login and signup
//! pages exist; with one every page is reachable behind the nav bar.

use leptos::ev;
use leptos::prelude::*;

use trainit_core::{ApiConfig, Route, Session};

use crate::components::{
    AnimalManagement, LandingPage, LoginPage, NavBar, PlanBuilderPage, PlanExplorer, SignupPage,
};
use crate::context::{self, AppContext};
use crate::storage::LocalStorage;

#[component]
pub fn App() -> impl IntoView {
    let (session, set_session) = signal(Session::restore(&LocalStorage));
    let initial = Route::resolve(
        context::location_route(),
        session.with_untracked(|s| s.is_authenticated()),
    );
    let (route, set_route) = signal(initial);

    let ctx = AppContext::new(
        (session, set_session),
        (route, set_route),
        ApiConfig::from_build_env(),
    );
    provide_context(ctx);

    if context::current_path().as_deref() != Some(initial.path()) {
        context::replace_history(initial);
    }

    // Back / forward buttons
    let popstate = window_event_listener(ev::popstate, move |_| {
        ctx.show(context::location_route());
    });
    on_cleanup(move || popstate.remove());

    view! {
        <div class="app-layout">
            {move || {
                let page = route.get();
                match page {
                    Route::Login => view! { <LoginPage /> }.into_any(),
                    Route::Signup => view! { <SignupPage /> }.into_any(),
                    _ => view! {
                        <NavBar />
                        <main class="main-content">
                            {match page {
                                Route::Animals => view! { <AnimalManagement /> }.into_any(),
                                Route::PlanBuilder => view! { <PlanBuilderPage /> }.into_any(),
                                Route::PlanExplorer => view! { <PlanExplorer /> }.into_any(),
                                _ => view! { <LandingPage /> }.into_any(),
                            }}
                        </main>
                    }
                    .into_any(),
                }
            }}
        </div>
    }
}
