use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Caller lacks delegation or contract-call allowance")]
    PermissionDenied,

    #[msg("Referenced delegation or record does not exist")]
    NotFound,

    #[msg("Computed lock amount is zero or negative")]
    NonPositiveAmount,

    #[msg("An active lock already covers the requested cycle")]
    AlreadyStacking,

    #[msg("Action attempted before its allowed window")]
    TooEarly,

    #[msg("Operation would violate a structural invariant")]
    Forbidden,

    #[msg("Caller lacks the required role")]
    Unauthorized,

    #[msg("Reward pool is underfunded for the requested distribution")]
    InsufficientFunds,

    #[msg("Partial stacked amount is below the stacking threshold")]
    StackingThresholdNotMet,

    #[msg("Signer authorization is invalid, replayed or exceeded")]
    SignatureInvalid,

    #[msg("Start burn height is not within the current reward cycle")]
    InvalidStartBurnHeight,

    #[msg("No stacker info recorded for the requested cycle")]
    NoStackerInfo,

    #[msg("Pool has been deactivated by an admin")]
    PoolDeactivated,

    #[msg("Reward address bytes are malformed")]
    InvalidPoxAddress,

    #[msg("Account does not match the expected program derivation")]
    InvalidAccountInput,

    #[msg("Batch exceeds the maximum member count")]
    BatchTooLarge,

    #[msg("Arithmetic overflow occurred")]
    Overflow,
}
