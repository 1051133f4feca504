//! Login and Signup Pages

use leptos::prelude::*;
use leptos::task::spawn_local;

use trainit_core::auth::{self, SignupForm, LOGIN_FAILED, SIGNUP_FAILED};
use trainit_core::Route;

use crate::components::NavLink;
use crate::context::AppContext;

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        set_loading.set(true);
        set_error.set(None);
        let email = email.get_untracked();
        let password = password.get_untracked();

        spawn_local(async move {
            let mut client = ctx.api();
            let result = auth::login(&mut client, email.trim(), &password).await;
            set_loading.set(false);
            match result {
                Ok(grant) => ctx.login(grant),
                Err(e) => {
                    log::warn!("[AUTH] login failed: {}", e);
                    set_error.set(Some(e.message(LOGIN_FAILED)));
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-form" on:submit=on_submit>
                <h1>"TrainIt"</h1>
                <h2>"Log in"</h2>
                <input
                    type="email"
                    placeholder="Email"
                    required
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    required
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                {move || error.get().map(|e| view! { <p class="error-message">{e}</p> })}
                <button type="submit" prop:disabled=move || loading.get()>
                    {move || if loading.get() { "Logging in..." } else { "Log in" }}
                </button>
                <p class="auth-switch">
                    "No account yet? "
                    <NavLink route=Route::Signup>"Sign up"</NavLink>
                </p>
            </form>
        </div>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let form = RwSignal::new(SignupForm::default());
    let (error, set_error) = signal::<Option<String>>(None);
    let (loading, set_loading) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let form = form.get_untracked();
        if let Err(e) = form.validate() {
            set_error.set(Some(e.to_string()));
            return;
        }
        set_loading.set(true);
        set_error.set(None);

        spawn_local(async move {
            let mut client = ctx.api();
            let result = auth::signup(&mut client, &form).await;
            set_loading.set(false);
            match result {
                Ok(grant) => ctx.login(grant),
                Err(e) => {
                    log::warn!("[AUTH] signup failed: {}", e);
                    set_error.set(Some(e.message(SIGNUP_FAILED)));
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-form" on:submit=on_submit>
                <h1>"TrainIt"</h1>
                <h2>"Create an account"</h2>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || form.with(|f| f.email.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.email = value);
                    }
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || form.with(|f| f.password.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.password = value);
                    }
                />
                <input
                    type="text"
                    placeholder="Organization name"
                    prop:value=move || form.with(|f| f.organization_name.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| f.organization_name = value);
                    }
                />
                {move || error.get().map(|e| view! { <p class="error-message">{e}</p> })}
                <button type="submit" prop:disabled=move || loading.get()>
                    {move || if loading.get() { "Signing up..." } else { "Sign up" }}
                </button>
                <p class="auth-switch">
                    "Already registered? "
                    <NavLink route=Route::Login>"Log in"</NavLink>
                </p>
            </form>
        </div>
    }
}
