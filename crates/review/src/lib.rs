//! Safety review for shell commands: a static catalog of risky patterns and
//! the classifier that maps a command onto a risk level.

pub mod catalog;
pub mod reviewer;
pub mod script;

pub use catalog::{CommandPattern, catalog, find_pattern};
pub use reviewer::{ReviewResult, format_review, review};
pub use script::{LineFinding, ScriptReview, review_script};
