//! Crawl core: pure progress state machine and the harvested URL set.
mod effect;
mod item_urls;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ReportLevel};
pub use item_urls::{ItemUrlSet, RejectedUrl};
pub use msg::Msg;
pub use state::{CrawlPhase, CrawlState, ItemIndex, ItemResultKind, Stage};
pub use update::update;
pub use view_model::{CrawlViewModel, ItemRowView};
