//! The labelling session: rating store, progress, navigation, the form
//! bridge, and the controller that ties them together.

pub mod form;
pub mod labeller;
pub mod navigation;
pub mod progress;
pub mod store;

pub use form::{FormOverrides, FormValues};
pub use labeller::{Entry, Labeller, SessionSummary};
pub use navigation::Navigator;
pub use progress::Progress;
pub use store::{MergeCounts, RatingStore, SessionState};
