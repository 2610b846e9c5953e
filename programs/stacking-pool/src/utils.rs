//! Keyed-map plumbing: every registry of the engine is a family of PDA
//! accounts. Entries are created lazily on first write, like map entries.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_lang::solana_program::system_program;

use crate::error::ErrorCode;

/// Assert `info` is the PDA derived from `seeds` and return its bump.
pub fn expect_pda(info: &AccountInfo, seeds: &[&[u8]]) -> Result<u8> {
    let (expected, bump) = Pubkey::find_program_address(seeds, &crate::ID);
    require_keys_eq!(*info.key, expected, ErrorCode::InvalidAccountInput);
    Ok(bump)
}

/// Whether the map entry behind `info` has been created.
pub fn entry_exists(info: &AccountInfo) -> bool {
    info.owner == &crate::ID && !info.data_is_empty()
}

/// Read an existing entry; `None` when it was never created.
pub fn load_entry<T: AccountDeserialize>(info: &AccountInfo) -> Result<Option<T>> {
    if !entry_exists(info) {
        return Ok(None);
    }
    let data = info.try_borrow_data()?;
    Ok(Some(T::try_deserialize(&mut &data[..])?))
}

/// Read the entry derived from `seeds`, validating the derivation.
pub fn load_entry_at<T: AccountDeserialize>(
    info: &AccountInfo,
    seeds: &[&[u8]],
) -> Result<Option<T>> {
    expect_pda(info, seeds)?;
    load_entry(info)
}

/// Load the entry derived from `seeds`, creating it rent-exempt (with
/// default contents) when it does not exist yet.
pub fn load_or_create_entry<'info, T>(
    info: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program_info: &AccountInfo<'info>,
    seeds: &[&[u8]],
    space: usize,
) -> Result<(T, u8)>
where
    T: AccountDeserialize + Default,
{
    let bump = expect_pda(info, seeds)?;
    if entry_exists(info) {
        let data = info.try_borrow_data()?;
        let state = T::try_deserialize(&mut &data[..])?;
        return Ok((state, bump));
    }
    require!(
        info.owner == &system_program::ID && info.data_is_empty(),
        ErrorCode::InvalidAccountInput
    );

    let rent = Rent::get()?.minimum_balance(space);
    let bump_seed = [bump];
    let mut signer_seeds: Vec<&[u8]> = seeds.to_vec();
    signer_seeds.push(&bump_seed);

    let ix = system_instruction::create_account(payer.key, info.key, rent, space as u64, &crate::ID);
    invoke_signed(
        &ix,
        &[payer.clone(), info.clone(), system_program_info.clone()],
        &[&signer_seeds],
    )?;
    Ok((T::default(), bump))
}

/// Write `state` back into its account (discriminator included).
pub fn store_entry<T: AccountSerialize>(info: &AccountInfo, state: &T) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    state.try_serialize(&mut &mut data[..])?;
    Ok(())
}
