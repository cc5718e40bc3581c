mod language;
mod media_kind;
mod report_policy;

pub use language::*;
pub use media_kind::*;
pub use report_policy::*;
