//! Navigation Bar
//!
//! Top bar of every signed-in page: page links, who is signed in, logout.

use leptos::prelude::*;

use trainit_core::Route;

use crate::context::AppContext;

/// In-app link that switches pages through history instead of reloading
#[component]
pub fn NavLink(
    route: Route,
    #[prop(optional, into)] class_name: String,
    children: Children,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let class = move || {
        if ctx.route.get() == route {
            format!("{} active", class_name)
        } else {
            class_name.clone()
        }
    };

    view! {
        <a
            href=route.path()
            class=class
            on:click=move |ev| {
                ev.prevent_default();
                ctx.navigate(route);
            }
        >
            {children()}
        </a>
    }
}

#[component]
pub fn NavBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let email = move || ctx.session.with(|s| s.user().map(|u| u.email.clone()));

    view! {
        <header class="nav-bar">
            <NavLink route=Route::Landing class_name="nav-brand">"TrainIt"</NavLink>
            <nav class="nav-links">
                <NavLink route=Route::Animals class_name="nav-link">"Animals"</NavLink>
                <NavLink route=Route::PlanBuilder class_name="nav-link">"Create Plan"</NavLink>
                <NavLink route=Route::PlanExplorer class_name="nav-link">"View Plans"</NavLink>
            </nav>
            <div class="nav-user">
                {move || email().map(|e| view! { <span class="nav-email">{e}</span> })}
                <button class="logout-btn" on:click=move |_| ctx.logout()>"Logout"</button>
            </div>
        </header>
    }
}
