pub mod engine;
pub mod handlers;

pub use cedict_db::LoadMode;
pub use cedict_types::{Classification, DictionaryEntry, MeasureWord, Script};
pub use engine::{Dictionary, DictionarySource, EngineError};
pub use handlers::{AppState, router};
