//! ERC-20 and WETH call data.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, sol_data, SolCall, SolType};

use crate::Result;

sol! {
    function approve(address spender, uint256 amount) returns (bool);
    function allowance(address owner, address spender) returns (uint256);
    function balanceOf(address owner) returns (uint256);
    function deposit();
    function withdraw(uint256 wad);
}

/// `2^256 - 1`, the allowance granted by an unlimited approval.
pub const MAX_ALLOWANCE: U256 = U256::MAX;

/// Token functions with their own gas limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenFunction {
    Approve,
    Deposit,
    Withdraw,
}

impl TokenFunction {
    pub fn name(&self) -> &'static str {
        match self {
            TokenFunction::Approve => "approve",
            TokenFunction::Deposit => "deposit",
            TokenFunction::Withdraw => "withdraw",
        }
    }
}

pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    approveCall { spender, amount }.abi_encode().into()
}

/// Approve the proxy for [`MAX_ALLOWANCE`].
pub fn encode_unlimited_approve(spender: Address) -> Bytes {
    encode_approve(spender, MAX_ALLOWANCE)
}

pub fn encode_allowance(owner: Address, spender: Address) -> Bytes {
    allowanceCall { owner, spender }.abi_encode().into()
}

pub fn encode_balance_of(owner: Address) -> Bytes {
    balanceOfCall { owner }.abi_encode().into()
}

/// WETH `deposit()`; the wrapped amount travels as the transaction value.
pub fn encode_deposit() -> Bytes {
    depositCall {}.abi_encode().into()
}

pub fn encode_withdraw(amount: U256) -> Bytes {
    withdrawCall { wad: amount }.abi_encode().into()
}

/// Decode a single `uint256` return word (`allowance`, `balanceOf`).
pub fn decode_uint(data: &[u8]) -> Result<U256> {
    Ok(<sol_data::Uint<256> as SolType>::abi_decode(data)?)
}
