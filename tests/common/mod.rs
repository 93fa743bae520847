#![allow(dead_code)]

pub use devconsole_test_utils::{init_tracing, on_channel, with_severity, with_timeout};

pub mod builders {
    pub use devconsole_test_utils::builders::*;
}

pub mod fake_executor {
    pub use devconsole_test_utils::fake_executor::*;
}
