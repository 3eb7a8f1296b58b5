pub mod app;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod input;
pub mod project;
pub mod store;
pub mod style;
pub mod tracker;
pub mod types;
pub mod ui;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StoreError, TrackerError};
pub use project::{Project, ProjectId};
pub use store::{JsonFileStore, MemoryStore, ProjectStore};
pub use tracker::{ResumePolicy, TimeTracker, TimerState, TrackerOptions};
