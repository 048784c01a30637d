//! Services for aurora-emotion
//!
//! - **emotion_analyzer** - Multimodal analysis orchestration (dispatch, fusion, assembly)
//! - **result_recorder** - Queued background persistence of results

pub mod emotion_analyzer;
pub mod result_recorder;

pub use emotion_analyzer::{context_influence, EmotionAnalyzer};
pub use result_recorder::{ResultRecorder, ResultSink, SqliteResultSink};
