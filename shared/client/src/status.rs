use std::fmt;

use solana_sdk::signature::Signature;

use crate::error::ClaimError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowStatus {
    #[default]
    Idle,
    CheckingVault,
    CheckingEligibility,
    CreatingAccount,
    Submitting,
    Succeeded(Signature),
    Failed(ClaimError),
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// A network step is outstanding; the claim action must stay disabled.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::CheckingVault
                | Self::CheckingEligibility
                | Self::CreatingAccount
                | Self::Submitting
        )
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::CheckingVault => write!(f, "Verifying vault..."),
            Self::CheckingEligibility => write!(f, "Checking claim status..."),
            Self::CreatingAccount => write!(f, "Creating your token account..."),
            Self::Submitting => write!(f, "Claiming your airdrop..."),
            Self::Succeeded(signature) => {
                write!(f, "Airdrop claimed successfully! Transaction: {signature}")
            }
            Self::Failed(err) => write!(f, "{}", err.user_message()),
        }
    }
}
