//! Domain layer for the assembler.

pub mod alert;
pub mod claim_source;
pub mod leader;
pub mod state;
pub mod submission;

pub use alert::DelayAlertSet;
pub use claim_source::ClaimSourceChain;
pub use leader::{evaluate_role, is_in_turn, leader_grace, GraceCheck, Role};
pub use state::{CoordinatorState, NonceStatus, SequenceStatus};
pub use submission::{
    AckMintedPlanner, ClaimOnlyPlanner, ClaimRequest, SbtMintedAck, SubTransaction,
    SubmissionAction, SubmissionPlan, SubmissionPlanner,
};
