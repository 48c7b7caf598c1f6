mod eligibility;
mod error;
mod status;
mod vault;
mod workflow;

pub mod testing;

pub use eligibility::{ClaimRecord, Eligibility, check_eligibility};
pub use error::ClaimError;
pub use status::WorkflowStatus;
pub use vault::{VaultState, inspect_vault};
pub use workflow::ClaimWorkflow;
