// Roster data: rated players, teams, and CSV import.

pub mod import;
pub mod rating;
pub mod team;

pub use rating::{Rating, RatingError, RatingScale};
pub use team::{AssignError, Player, Team};
