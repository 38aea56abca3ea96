//! 核心：错误类型、执行控制器、纠偏协议

pub mod controller;
pub mod correction;
pub mod error;

pub use controller::{Controller, RunOutcome, RunReport};
pub use correction::{build_correction_context, splice_continuation, CorrectionContext};
pub use error::{AgentError, ErrorKind};
