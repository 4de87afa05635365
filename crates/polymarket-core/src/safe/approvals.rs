//! ERC-20 / ERC-1155 approval transactions for Polymarket.
//!
//! Builds the 6 approvals required before the CLOB can move funds on behalf
//! of a Safe, ready to be executed through the relayer:
//!
//! 1. USDC.e  → approve(CTF Exchange,          MAX)
//! 2. CTF     → setApprovalForAll(CTF Exchange, true)
//! 3. USDC.e  → approve(Neg Risk CTF Exchange,  MAX)
//! 4. CTF     → setApprovalForAll(Neg Risk CTF Exchange, true)
//! 5. USDC.e  → approve(Neg Risk Adapter,       MAX)
//! 6. CTF     → setApprovalForAll(Neg Risk Adapter, true)

use alloy_primitives::{Address, U256};

use crate::config::ContractConfig;
use crate::types::SafeTransaction;

/// ERC-20 `approve(address,uint256)` selector.
const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// ERC-1155 `setApprovalForAll(address,bool)` selector.
const SET_APPROVAL_SELECTOR: [u8; 4] = [0xa2, 0x2c, 0xb4, 0x65];

/// Build calldata for `approve(spender, amount)`.
pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&APPROVE_SELECTOR);
    // address left-padded to 32 bytes
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(spender.as_slice());
    data.extend_from_slice(&amount.to_be_bytes::<32>());
    data
}

/// Build calldata for `setApprovalForAll(operator, approved)`.
pub fn encode_set_approval_for_all(operator: Address, approved: bool) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&SET_APPROVAL_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(operator.as_slice());
    // bool, left-padded to 32 bytes
    data.extend_from_slice(&[0u8; 31]);
    data.push(u8::from(approved));
    data
}

/// The six unlimited approvals for the exchanges and the neg-risk adapter.
pub fn approval_transactions(contracts: &ContractConfig) -> Vec<SafeTransaction> {
    [
        contracts.exchange,
        contracts.neg_risk_exchange,
        contracts.neg_risk_adapter,
    ]
    .into_iter()
    .flat_map(|spender| {
        [
            SafeTransaction::call(contracts.collateral, &encode_approve(spender, U256::MAX)),
            SafeTransaction::call(
                contracts.conditional_tokens,
                &encode_set_approval_for_all(spender, true),
            ),
        ]
    })
    .collect()
}
