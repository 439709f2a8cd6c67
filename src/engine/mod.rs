//! Pure allocation logic: no I/O, no clocks.

pub mod assemble;
pub mod profile;
pub mod residual;
pub mod resolver;
pub mod suggest;
pub mod summary;
pub mod transition;

pub use assemble::{assemble, bucket_amounts, validate_for_submission};
pub use profile::{SplitProfile, Tier, TierThresholds, TierWeights};
pub use residual::fix_residual;
pub use resolver::{adjust, clamp_percentage, slider_max};
pub use suggest::{suggest, Suggestion, HISTORY_WINDOW, MAX_BUCKETS};
pub use summary::{
    active_members, category_shares, latest_executed_amount, member_shares, next_payment,
    total_distributed, CategoryShares, MemberShare,
};
pub use transition::{Transition, TransitionCadence};
