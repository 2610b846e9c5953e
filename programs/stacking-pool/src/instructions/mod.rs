pub mod admin;
pub mod allowance;
pub mod auto_extend;
pub mod delegate_stack_stx;
pub mod delegate_stx;
pub mod initialize_pool;
pub mod payout;
pub mod stack_aggregation;
pub mod status;

pub use admin::*;
pub use allowance::*;
pub use auto_extend::*;
pub use delegate_stack_stx::*;
pub use delegate_stx::*;
pub use initialize_pool::*;
pub use payout::*;
pub use stack_aggregation::*;
pub use status::*;
