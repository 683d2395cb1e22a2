//! Balance Policy
//!
//! 복제본 선택 전략을 정의합니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::RwLock;

// ============================================================================
// BalancePolicy - 부하 분산 정책
// ============================================================================

/// 부하 분산 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    /// 라운드 로빈 (기본값)
    #[default]
    RoundRobin,
    /// 랜덤
    Random,
    /// 최소 최근 사용
    LeastRecentlyUsed,
}

// ============================================================================
// UsageClock - 사용 시각 기록
// ============================================================================

/// 인덱스별 마지막 사용 시각 기록 (LeastRecentlyUsed용)
#[derive(Debug, Default)]
struct UsageClock {
    /// 인덱스별 마지막 사용 틱
    ticks: RwLock<HashMap<usize, u64>>,
    /// 단조 증가 틱
    clock: AtomicU64,
}

impl UsageClock {
    /// 새 기록 생성
    fn new() -> Self {
        Self::default()
    }

    /// `[0, n)` 중 가장 오래 사용되지 않은 인덱스를 골라 사용 처리
    ///
    /// 동률은 낮은 인덱스가 이긴다.
    fn take_least_recent(&self, n: usize) -> usize {
        let mut ticks = self.ticks.write();
        let index = (0..n)
            .min_by_key(|i| ticks.get(i).copied().unwrap_or(0))
            .unwrap_or(0);
        let tick = self.clock.fetch_add(1, Ordering::Relaxed) + 1;
        ticks.insert(index, tick);
        index
    }

    /// 기록 초기화
    fn reset(&self) {
        self.ticks.write().clear();
        self.clock.store(0, Ordering::Relaxed);
    }
}

// ============================================================================
// ReplicaSelector - 복제본 선택기
// ============================================================================

/// 복제본 선택기
///
/// 다음 읽기에 사용할 복제본 인덱스를 결정한다. 선택기 상태는
/// 클러스터별로 소유되는 명시적 값이며 전역 상태가 아니다.
#[derive(Debug)]
pub struct ReplicaSelector {
    /// 부하 분산 정책
    policy: BalancePolicy,
    /// 라운드 로빈 커서
    cursor: AtomicUsize,
    /// 사용 시각 기록 (LeastRecentlyUsed용)
    usage: UsageClock,
}

impl ReplicaSelector {
    /// 새 선택기 생성
    pub fn new(policy: BalancePolicy) -> Self {
        Self {
            policy,
            cursor: AtomicUsize::new(0),
            usage: UsageClock::new(),
        }
    }

    /// 기본 선택기 (라운드 로빈)
    pub fn round_robin() -> Self {
        Self::new(BalancePolicy::RoundRobin)
    }

    /// 랜덤 선택기
    pub fn random() -> Self {
        Self::new(BalancePolicy::Random)
    }

    /// 최소 최근 사용 선택기
    pub fn least_recently_used() -> Self {
        Self::new(BalancePolicy::LeastRecentlyUsed)
    }

    /// 다음 읽기에 사용할 복제본 인덱스 선택
    ///
    /// `n > 0`이면 `[0, n)` 범위의 값을 반환한다. 복제본이 없는 경우
    /// 호출자가 먼저 마스터로 폴백하므로 `n == 0`으로 묻지 않는다.
    /// 여러 호출자가 동시에 불러도 항상 유효한 인덱스를 반환한다.
    pub fn next(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }

        match self.policy {
            BalancePolicy::RoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed) % n,
            BalancePolicy::Random => {
                use rand::Rng;
                rand::thread_rng().gen_range(0..n)
            }
            BalancePolicy::LeastRecentlyUsed => self.usage.take_least_recent(n),
        }
    }

    /// 현재 정책 조회
    pub fn policy(&self) -> BalancePolicy {
        self.policy
    }

    /// 선택기 상태 리셋
    pub fn reset(&self) {
        self.cursor.store(0, Ordering::Relaxed);
        self.usage.reset();
    }
}

impl Default for ReplicaSelector {
    fn default() -> Self {
        Self::round_robin()
    }
}

// ============================================================================
// Tests
// ============================================================================
