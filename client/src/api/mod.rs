pub mod v1;

pub(crate) use v1::{Result, internal};

pub const VERSION: &str = "v1";
pub use v1::{LabAuthClient, LabMutationClient, LabQueryClient, LabScriptClient, operations, types};
