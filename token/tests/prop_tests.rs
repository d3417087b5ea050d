use proptest::prelude::*;

use vetme_token::{Bep20Ledger, TokenInfo, TokenLedger};
use vetme_types::AccountId;

proptest! {
    /// Any sequence of transfers (successful or not) conserves total supply.
    #[test]
    fn transfers_conserve_supply(
        supply in 1u128..1_000_000_000,
        moves in prop::collection::vec((0u64..5, 0u64..5, 0u128..500_000_000), 0..50),
    ) {
        let mut ledger = Bep20Ledger::with_genesis(AccountId::from_index(0), supply, TokenInfo::default());
        for (from, to, amount) in moves {
            let _ = ledger.transfer(&AccountId::from_index(from), &AccountId::from_index(to), amount);
        }
        let sum: u128 = (0..5).map(|i| ledger.balance_of(&AccountId::from_index(i))).sum();
        prop_assert_eq!(sum, ledger.total_supply());
        prop_assert_eq!(ledger.total_supply(), supply);
    }

    /// A failed transfer leaves both balances untouched.
    #[test]
    fn failed_transfer_is_atomic(balance in 0u128..1_000, extra in 1u128..1_000) {
        let from = AccountId::from_index(1);
        let to = AccountId::from_index(2);
        let mut ledger = Bep20Ledger::with_genesis(from, balance, TokenInfo::default());
        prop_assert!(ledger.transfer(&from, &to, balance + extra).is_err());
        prop_assert_eq!(ledger.balance_of(&from), balance);
        prop_assert_eq!(ledger.balance_of(&to), 0);
    }
}
