//! Transaction scripts submitted alongside payout arguments.

use crate::domain::Contract;

/// Compute limit passed with every payout transaction.
pub const COMPUTE_LIMIT: u64 = 200;

/// Script creating a payout split:
/// `(payer: Address, amount: UFix64, allocations: {String: UFix64})`.
pub fn create_payout_script(contract: &Contract) -> String {
    format!(
        r#"import {name} from 0x{addr}
transaction(payer: Address, amount: UFix64, allocations: {{String: UFix64}}) {{
  prepare() {{}}
  execute {{
    {name}.createSubscription(payer: payer, amount: amount, allocations: allocations)
  }}
}}
"#,
        name = contract.name,
        addr = contract.address_without_prefix(),
    )
}

/// Script paying an existing subscription: `(payer: Address, subID: UInt64)`.
pub fn pay_subscription_script(contract: &Contract) -> String {
    format!(
        r#"import {name} from 0x{addr}
transaction(payer: Address, subID: UInt64) {{
  prepare() {{}}
  execute {{
    {name}.paySubscription(payer: payer, subID: subID)
  }}
}}
"#,
        name = contract.name,
        addr = contract.address_without_prefix(),
    )
}
