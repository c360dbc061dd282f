//! Address parsing and comparison helpers.

use alloy::primitives::{address, Address};

use crate::safe::types::{SafeError, SafeResult};

/// Head/tail marker of the on-chain owner linked list.
pub const SENTINEL_ADDRESS: Address = address!("0000000000000000000000000000000000000001");

/// Addresses that can never be an owner or a relay destination.
pub fn is_restricted_address(address: &Address) -> bool {
    *address == Address::ZERO || *address == SENTINEL_ADDRESS
}

/// Parse a hex address, accepting any letter case.
///
/// Mixed-case input is not checksum-validated, matching how the transaction
/// service and most wallets hand addresses around.
pub fn parse_address(input: &str) -> SafeResult<Address> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex.len() != 40 {
        return Err(SafeError::InvalidAddress(input.to_string()));
    }
    hex.parse::<Address>()
        .map_err(|_| SafeError::InvalidAddress(input.to_string()))
}

/// Parse an address that must also be usable as an owner.
pub fn parse_owner_address(input: &str) -> SafeResult<Address> {
    let address = parse_address(input)?;
    if is_restricted_address(&address) {
        return Err(SafeError::InvalidAddress(input.to_string()));
    }
    Ok(address)
}
