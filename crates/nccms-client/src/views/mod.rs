//! Headless admin views
//!
//! Each view holds the state a screen would render and performs its actions
//! through [`CmsClient`](crate::CmsClient), applying list mutations
//! optimistically.

pub mod dashboard;
pub mod hero_detail;
pub mod hero_form;
pub mod hero_list;

pub use dashboard::{Dashboard, DashboardCard};
pub use hero_detail::{load_hero_detail, parse_hero_id};
pub use hero_form::{FormMode, HeroDraft, HeroForm};
pub use hero_list::HeroListView;
