//! UI Components
//!
//! Pages and the pieces they share.

mod animal_management;
mod auth_pages;
mod delete_confirm_button;
mod gantt_chart;
mod landing_page;
mod nav_bar;
mod plan_builder_page;
mod plan_explorer;
mod step_popover;

pub use animal_management::AnimalManagement;
pub use auth_pages::{LoginPage, SignupPage};
pub use delete_confirm_button::DeleteConfirmButton;
pub use gantt_chart::GanttChart;
pub use landing_page::LandingPage;
pub use nav_bar::{NavBar, NavLink};
pub use plan_builder_page::PlanBuilderPage;
pub use plan_explorer::PlanExplorer;
pub use step_popover::StepPopover;
