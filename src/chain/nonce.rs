use std::fmt;
use std::future::Future;
use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::error::{ChainError, ChainResult};

#[derive(Debug, Default)]
struct NonceSlot {
    last_committed: Option<u64>,
}

/// 单个签名账户的 nonce 串行器。
///
/// 每个 (chain_id, account) 一把异步锁：从读取 pending nonce 到交易广播完成
/// 期间持有，避免并发请求拿到同一个 nonce。广播成功后调用
/// [`NonceLease::commit`] 记录已使用的 nonce；租约被丢弃则视为放弃，下一次
/// 分配会复用同一个值。
#[derive(Default)]
pub struct NonceSequencer {
    slots: DashMap<(u64, Address), Arc<Mutex<NonceSlot>>>,
}

impl NonceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire<F, Fut>(
        &self,
        chain_id: u64,
        account: Address,
        cancel: &CancellationToken,
        fetch_pending: F,
    ) -> ChainResult<NonceLease>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ChainResult<u64>>,
    {
        let slot = self.slots.entry((chain_id, account)).or_default().clone();
        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChainError::Cancelled),
            guard = slot.lock_owned() => guard,
        };

        let pending = fetch_pending().await?;
        let nonce = match guard.last_committed {
            Some(last) if last >= pending => last + 1,
            _ => pending,
        };

        trace!(
            target: "chain::nonce",
            chain_id,
            account = %account,
            pending,
            nonce,
            "分配 nonce"
        );

        Ok(NonceLease {
            guard,
            chain_id,
            account,
            nonce,
        })
    }
}

pub struct NonceLease {
    guard: OwnedMutexGuard<NonceSlot>,
    chain_id: u64,
    account: Address,
    nonce: u64,
}

impl NonceLease {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn commit(mut self) {
        self.guard.last_committed = Some(self.nonce);
        trace!(
            target: "chain::nonce",
            chain_id = self.chain_id,
            account = %self.account,
            nonce = self.nonce,
            "nonce 已提交"
        );
    }
}

impl fmt::Debug for NonceLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceLease")
            .field("chain_id", &self.chain_id)
            .field("account", &self.account)
            .field("nonce", &self.nonce)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const ACCOUNT: Address = Address::repeat_byte(0x11);

    #[tokio::test]
    async fn committed_nonce_is_not_handed_out_again() {
        let sequencer = NonceSequencer::new();
        let cancel = CancellationToken::new();

        let first = sequencer
            .acquire(56, ACCOUNT, &cancel, || async { Ok(7) })
            .await
            .expect("first lease");
        assert_eq!(first.nonce(), 7);
        first.commit();

        // 节点尚未看到第一笔交易，仍返回 7
        let second = sequencer
            .acquire(56, ACCOUNT, &cancel, || async { Ok(7) })
            .await
            .expect("second lease");
        assert_eq!(second.nonce(), 8);
    }

    #[tokio::test]
    async fn dropped_lease_releases_the_nonce() {
        let sequencer = NonceSequencer::new();
        let cancel = CancellationToken::new();

        let lease = sequencer
            .acquire(1, ACCOUNT, &cancel, || async { Ok(3) })
            .await
            .expect("lease");
        drop(lease);

        let retry = sequencer
            .acquire(1, ACCOUNT, &cancel, || async { Ok(3) })
            .await
            .expect("retry lease");
        assert_eq!(retry.nonce(), 3);
    }

    #[tokio::test]
    async fn concurrent_allocations_are_serialised() {
        let sequencer = Arc::new(NonceSequencer::new());
        let cancel = CancellationToken::new();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let sequencer = Arc::clone(&sequencer);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let lease = sequencer
                    .acquire(8453, ACCOUNT, &cancel, || async { Ok(0) })
                    .await
                    .expect("lease");
                let nonce = lease.nonce();
                tokio::time::sleep(Duration::from_millis(5)).await;
                lease.commit();
                nonce
            }));
        }

        let mut nonces = Vec::new();
        for handle in handles {
            nonces.push(handle.await.expect("join"));
        }
        nonces.sort_unstable();
        assert_eq!(nonces, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn chains_have_independent_slots() {
        let sequencer = NonceSequencer::new();
        let cancel = CancellationToken::new();

        let bsc = sequencer
            .acquire(56, ACCOUNT, &cancel, || async { Ok(4) })
            .await
            .expect("bsc lease");
        // 另一条链不会被 bsc 的锁阻塞
        let eth = sequencer
            .acquire(1, ACCOUNT, &cancel, || async { Ok(9) })
            .await
            .expect("eth lease");
        assert_eq!(bsc.nonce(), 4);
        assert_eq!(eth.nonce(), 9);
    }

    #[tokio::test]
    async fn waiting_for_the_slot_honours_cancellation() {
        let sequencer = NonceSequencer::new();
        let cancel = CancellationToken::new();

        let _held = sequencer
            .acquire(1, ACCOUNT, &cancel, || async { Ok(0) })
            .await
            .expect("held lease");

        let waiter_cancel = CancellationToken::new();
        waiter_cancel.cancel();
        let err = sequencer
            .acquire(1, ACCOUNT, &waiter_cancel, || async { Ok(0) })
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
