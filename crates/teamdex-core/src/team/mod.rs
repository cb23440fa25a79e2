//! Team lifecycle: create, update, delete and read rosters.

mod service;
mod view;

pub use service::TeamService;
pub use view::{MemberView, TeamListing, TeamSummary, TeamView};
