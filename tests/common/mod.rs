#![allow(dead_code, unused_imports)]

pub use goalslot_test_utils::builders;
pub use goalslot_test_utils::recording_sink::RecordingFeedbackSink;
pub use goalslot_test_utils::{init_tracing, with_timeout};
