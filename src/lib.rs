// Library surface for the session engine, the bridge, the terminal front end
// and headless tests.
pub mod app;
pub mod app_dirs;
pub mod bank;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod text_source;
pub mod timer;
pub mod typing_policy;
pub mod ui;
pub mod util;

pub use engine::SessionEngine;
pub use error::{Result, TyperError};
pub use session::{GameMetrics, GameStatus, Snapshot};
pub use text_source::{JsonTextSource, StaticTextSource, TextSource};
