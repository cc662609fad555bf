mod investment;
mod listing;
mod project;

pub use investment::Investment;
pub use listing::{ListingError, MAX_GOAL_AMOUNT, MIN_GOAL_AMOUNT, MIN_ROOF_SIZE, ProjectListing};
pub use project::{FundingStatus, NewProject, Project};
