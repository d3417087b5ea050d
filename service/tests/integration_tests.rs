//! End-to-end staking flows through the service: token funding, staking,
//! reward accrual, the withdrawal cool-down and persistence.
//!
//! Amounts mirror a real deployment: 18-decimal tokens and a 500M genesis
//! supply held by the owner.

use std::io::Write;
use std::sync::Arc;

use vetme_nullables::{NullClock, NullStakingStore};
use vetme_service::{ServiceConfig, ServiceError, StakingService};
use vetme_staking::StakingError;
use vetme_token::{Bep20Ledger, TokenInfo};
use vetme_types::{to_raw, AccountId, StakeState, TOKEN_UNIT};

const COOLDOWN: u64 = 172_800;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tokens(whole: u128) -> u128 {
    to_raw(whole).unwrap()
}

fn alice() -> AccountId {
    AccountId::from_index(2)
}

struct Fixture {
    clock: Arc<NullClock>,
    service: StakingService<Bep20Ledger>,
    owner: AccountId,
}

fn fixture() -> Fixture {
    fixture_with(ServiceConfig::default())
}

fn fixture_with(config: ServiceConfig) -> Fixture {
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let owner = config.owner_account().unwrap();
    let service = StakingService::from_config(&config, clock.clone()).unwrap();
    Fixture {
        clock,
        service,
        owner,
    }
}

async fn open_period(f: &Fixture, duration: u64, reward: u128) {
    f.service
        .set_rewards_duration(&f.owner, duration)
        .await
        .unwrap();
    if reward > 0 {
        f.service
            .notify_reward_amount(&f.owner, reward)
            .await
            .unwrap();
    }
}

fn staking_err(result: Result<impl std::fmt::Debug, ServiceError>) -> StakingError {
    match result {
        Err(ServiceError::Staking(e)) => e,
        other => panic!("expected a staking error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// 1. Deployment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn genesis_supply_and_token_identity() {
    let f = fixture();
    assert_eq!(f.service.token_supply().await, 500_000_000 * TOKEN_UNIT);
    assert_eq!(f.service.token_balance(&f.owner).await, 500_000_000 * TOKEN_UNIT);
    assert_eq!(f.service.staking_token().await, TokenInfo::default());
    assert_eq!(f.service.total_supply().await, 0);
}

// ---------------------------------------------------------------------------
// 2. Staking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zero_stake_is_rejected() {
    let f = fixture();
    open_period(&f, 300, 0).await;
    let err = staking_err(f.service.stake(&alice(), 0).await);
    assert!(matches!(err, StakingError::ZeroAmount));
}

#[tokio::test]
async fn stake_before_start_is_rejected() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    let err = staking_err(f.service.stake(&alice(), tokens(500)).await);
    assert!(matches!(err, StakingError::NotStarted));
}

#[tokio::test]
async fn stake_after_period_is_rejected() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, 0).await;
    f.clock.advance(7_200);
    let err = staking_err(f.service.stake(&alice(), tokens(500)).await);
    assert!(matches!(err, StakingError::StakingEnded));
}

#[tokio::test]
async fn stake_moves_tokens_and_mints_receipt() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, 0).await;

    f.service.stake(&alice(), tokens(500)).await.unwrap();

    assert_eq!(f.service.token_balance(&alice()).await, tokens(1_500));
    assert_eq!(f.service.balance_of(&alice()).await, tokens(500));
    assert_eq!(f.service.total_supply().await, tokens(500));
    assert_eq!(f.service.state_of(&alice()).await, StakeState::Staked);
}

#[tokio::test]
async fn stake_without_balance_fails_cleanly() {
    let f = fixture();
    open_period(&f, 300, 0).await;
    let err = staking_err(f.service.stake(&alice(), tokens(1)).await);
    assert!(matches!(err, StakingError::TransferFailed(_)));
    assert_eq!(f.service.total_supply().await, 0);
    assert!(f.service.position(&alice()).await.is_none());
}

// ---------------------------------------------------------------------------
// 3. Withdrawal cool-down
// ---------------------------------------------------------------------------

#[tokio::test]
async fn withdraw_without_stake_or_request() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, 0).await;

    let err = staking_err(f.service.request_withdraw(&alice()).await);
    assert!(matches!(err, StakingError::NoStake));

    f.service.stake(&alice(), tokens(500)).await.unwrap();
    let err = staking_err(f.service.withdraw(&alice()).await);
    assert!(matches!(err, StakingError::NoPendingWithdraw));
}

#[tokio::test]
async fn withdraw_respects_cooldown() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, 0).await;
    f.service.stake(&alice(), tokens(500)).await.unwrap();

    f.service.request_withdraw(&alice()).await.unwrap();
    assert!(f.service.withdraw_pending(&alice()).await > 0);
    let err = staking_err(f.service.withdraw(&alice()).await);
    assert!(matches!(err, StakingError::WithdrawPending { .. }));

    f.clock.advance(COOLDOWN);
    assert_eq!(f.service.withdraw_pending(&alice()).await, 0);
    let returned = f.service.withdraw(&alice()).await.unwrap();

    assert_eq!(returned, tokens(500));
    assert_eq!(f.service.token_balance(&alice()).await, tokens(2_000));
    assert_eq!(f.service.total_supply().await, 0);
    assert_eq!(f.service.state_of(&alice()).await, StakeState::Unstaked);
}

// ---------------------------------------------------------------------------
// 4. Rewards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn claim_gates() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, tokens(2_000)).await;
    f.service.stake(&alice(), tokens(500)).await.unwrap();

    let err = staking_err(f.service.claim_reward(&alice()).await);
    assert!(matches!(err, StakingError::PeriodNotOver));

    f.clock.advance(7_200);
    let payout = f.service.claim_reward(&alice()).await.unwrap();
    assert_eq!(payout.reward, tokens(2_000));
    assert_eq!(payout.principal, tokens(500));
    assert_eq!(f.service.token_balance(&alice()).await, tokens(4_000));

    let err = staking_err(f.service.claim_reward(&alice()).await);
    assert!(matches!(err, StakingError::AlreadyClaimed));
}

#[tokio::test]
async fn single_staker_claim_ends_at_5200() {
    let f = fixture_with(ServiceConfig {
        total_for_stake: Some(5_000),
        ..ServiceConfig::default()
    });
    f.service
        .transfer(&f.owner, &alice(), tokens(5_000))
        .await
        .unwrap();
    open_period(&f, 300, tokens(2_000)).await;
    f.service.stake(&alice(), tokens(500)).await.unwrap();
    assert_eq!(f.service.token_balance(&alice()).await, tokens(4_500));

    f.clock.advance(COOLDOWN);
    // A 500 stake in a 5000 pool earns a tenth of the 2000 funded.
    assert_eq!(f.service.earned(&alice()).await.unwrap(), tokens(200));
    let payout = f.service.claim_reward(&alice()).await.unwrap();
    assert_eq!(payout.reward, tokens(200));
    assert_eq!(payout.principal, tokens(500));

    // 5000 - 500 staked + 500 released + 200 reward.
    assert_eq!(f.service.token_balance(&alice()).await, tokens(5_200));
    assert_eq!(f.service.total_supply().await, 0);
    let err = staking_err(f.service.claim_reward(&alice()).await);
    assert!(matches!(err, StakingError::AlreadyClaimed));
}

#[tokio::test]
async fn claim_after_full_withdraw_is_no_stake() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, tokens(2_000)).await;
    f.service.stake(&alice(), tokens(500)).await.unwrap();
    f.service.request_withdraw(&alice()).await.unwrap();
    f.clock.advance(COOLDOWN);
    assert_eq!(f.service.withdraw(&alice()).await.unwrap(), tokens(500));
    assert_eq!(f.service.balance_of(&alice()).await, 0);

    let err = staking_err(f.service.claim_reward(&alice()).await);
    assert!(matches!(err, StakingError::NoStake));
    assert_eq!(f.service.token_balance(&alice()).await, tokens(2_000));
}

#[tokio::test]
async fn only_owner_schedules_rewards() {
    let f = fixture();
    let err = staking_err(f.service.set_rewards_duration(&alice(), 300).await);
    assert!(matches!(err, StakingError::Unauthorized(a) if a == alice()));
}

// ---------------------------------------------------------------------------
// 5. Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stakes_keep_totals_consistent() {
    let f = fixture();
    let stakers: Vec<AccountId> = (10..42).map(AccountId::from_index).collect();
    for account in &stakers {
        f.service
            .transfer(&f.owner, account, tokens(100))
            .await
            .unwrap();
    }
    open_period(&f, 3_600, tokens(10_000)).await;

    let mut handles = Vec::new();
    for account in stakers.clone() {
        let service = f.service.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                service.stake(&account, tokens(10)).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(f.service.total_supply().await, tokens(100) * stakers.len() as u128);
    let mut sum = 0;
    for account in &stakers {
        assert_eq!(f.service.balance_of(account).await, tokens(100));
        assert_eq!(f.service.token_balance(account).await, 0);
        sum += f.service.balance_of(account).await;
    }
    assert_eq!(sum, f.service.total_supply().await);
}

// ---------------------------------------------------------------------------
// 6. Persistence and configuration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_and_reload_preserves_positions() {
    let f = fixture();
    f.service
        .transfer(&f.owner, &alice(), tokens(2_000))
        .await
        .unwrap();
    open_period(&f, 300, tokens(2_000)).await;
    f.service.stake(&alice(), tokens(500)).await.unwrap();
    f.service.request_withdraw(&alice()).await.unwrap();

    let store = NullStakingStore::new();
    f.service.save(&store).await.unwrap();

    // The token ledger persists separately; rebuild it as it stands.
    let mut token = Bep20Ledger::with_genesis(
        f.owner,
        500_000_000 * TOKEN_UNIT - tokens(4_000),
        TokenInfo::default(),
    );
    token.mint(&alice(), tokens(1_500)).unwrap();
    token.mint(&f.service.custody().await, tokens(2_500)).unwrap();

    let restored = StakingService::load(&store, token, f.clock.clone()).unwrap();
    assert_eq!(restored.total_supply().await, tokens(500));
    assert_eq!(
        restored.state_of(&alice()).await,
        StakeState::WithdrawRequested
    );
    assert_eq!(
        restored.withdraw_pending(&alice()).await,
        f.service.withdraw_pending(&alice()).await
    );

    f.clock.advance(COOLDOWN);
    assert_eq!(restored.earned(&alice()).await.unwrap(), tokens(2_000));
    let payout = restored.claim_reward(&alice()).await.unwrap();
    assert_eq!(payout.total(), tokens(2_500));
    assert_eq!(restored.token_balance(&alice()).await, tokens(4_000));
    assert_eq!(restored.state_of(&alice()).await, StakeState::Unstaked);
}

#[tokio::test]
async fn config_file_drives_the_ledger() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
withdraw_cooldown_secs = 60
total_for_stake = 1000
genesis_supply = 1000000
token_symbol = "TVET"
"#
    )
    .unwrap();

    let config = ServiceConfig::from_toml_file(file.path()).unwrap();
    let clock = Arc::new(NullClock::new(0));
    let service = StakingService::from_config(&config, clock.clone()).unwrap();
    let owner = config.owner_account().unwrap();

    assert_eq!(service.token_supply().await, tokens(1_000_000));
    assert_eq!(service.staking_token().await.symbol, "TVET");

    service.set_rewards_duration(&owner, 300).await.unwrap();
    service.transfer(&owner, &alice(), tokens(2_000)).await.unwrap();
    let err = staking_err(service.stake(&alice(), tokens(1_001)).await);
    assert!(matches!(err, StakingError::CapacityExceeded { .. }));

    service.stake(&alice(), tokens(1_000)).await.unwrap();
    service.request_withdraw(&alice()).await.unwrap();
    clock.advance(60);
    service.withdraw(&alice()).await.unwrap();
}
