//! Cluster
//!
//! 마스터 하나와 복제본 N개를 단일 논리 핸들로 묶는 라우팅 계층

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use super::connection::{Connection, ExecSummary};
use super::error::{RouterError, RouterResult};
use super::policy::{BalancePolicy, ReplicaSelector};
use super::scatter::scatter;
use super::statement::ClusterStatement;
use super::value::Value;

// ============================================================================
// Cluster - 논리 연결
// ============================================================================

/// 논리 데이터베이스 핸들
///
/// 물리 연결의 순서 있는 목록(인덱스 0 = 마스터, 이후 복제본)을 하나의
/// 핸들로 노출한다. 쓰기는 항상 마스터로, 읽기는 선택기가 고른 복제본으로
/// 라우팅되고, 종료와 핑은 모든 물리 연결로 동시에 흩뿌려진다.
///
/// 어떤 연산도 쿼리 텍스트를 검사하지 않는다. 읽기/쓰기 분리는 오직
/// 호출된 메서드가 결정하므로, `query*`로 실행한 쓰기는 복제본으로
/// 전달되어 실패하거나 반영되지 않을 수 있다. 방금 쓴 데이터를 바로
/// 읽어야 한다면 [`master()`](Cluster::master)로 직접 마스터를 사용한다.
pub struct Cluster<C: Connection> {
    /// 물리 연결 목록 (인덱스 0 = 마스터), 생성 후 불변
    conns: Vec<C>,
    /// 복제본 선택기 (이 클러스터에서 준비된 문장과 공유)
    selector: Arc<ReplicaSelector>,
    /// 열린 상태
    open: RwLock<bool>,
    /// 라우팅된 읽기 수
    reads_routed: AtomicU64,
    /// 라우팅된 쓰기 수
    writes_routed: AtomicU64,
}

impl<C: Connection> Cluster<C> {
    /// 물리 연결 목록으로 클러스터 생성
    ///
    /// 첫 요소가 마스터, 나머지가 복제본이 된다. 복제본이 없는 배치도
    /// 유효하며 이 경우 모든 읽기가 마스터로 간다.
    pub fn new(conns: Vec<C>) -> RouterResult<Self> {
        if conns.is_empty() {
            return Err(RouterError::configuration(
                "At least one connection is required",
            ));
        }

        Ok(Self {
            conns,
            selector: Arc::new(ReplicaSelector::default()),
            open: RwLock::new(true),
            reads_routed: AtomicU64::new(0),
            writes_routed: AtomicU64::new(0),
        })
    }

    /// 빌더 시작
    pub fn builder() -> ClusterBuilder<C> {
        ClusterBuilder::new()
    }

    /// 부하 분산 정책 설정
    pub fn with_policy(self, policy: BalancePolicy) -> Self {
        self.with_selector(ReplicaSelector::new(policy))
    }

    /// 선택기 주입
    ///
    /// 미리 구성한 선택기를 사용한다. 결정적 테스트나 독립적으로
    /// 분산되는 클러스터 여러 개를 한 프로세스에 둘 때 쓴다.
    pub fn with_selector(mut self, selector: ReplicaSelector) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    /// 마스터 연결
    pub fn master(&self) -> &C {
        &self.conns[0]
    }

    /// 선택기가 고른 복제본 연결
    ///
    /// 복제본이 없으면 마스터를 반환한다.
    pub fn replica(&self) -> &C {
        &self.conns[self.replica_index()]
    }

    /// 전체 물리 연결 수
    pub fn endpoint_count(&self) -> usize {
        self.conns.len()
    }

    /// 복제본 수
    pub fn replica_count(&self) -> usize {
        self.conns.len() - 1
    }

    /// 현재 부하 분산 정책
    pub fn policy(&self) -> BalancePolicy {
        self.selector.policy()
    }

    /// 열린 상태 여부
    pub fn is_open(&self) -> bool {
        *self.open.read()
    }

    /// 읽기 경로가 향할 물리 인덱스 결정
    ///
    /// 복제본이 없으면 마스터(인덱스 0)로 폴백한다.
    fn replica_index(&self) -> usize {
        let n = self.replica_count();
        if n == 0 {
            return 0;
        }
        1 + self.selector.next(n)
    }

    /// 열린 상태 확인
    fn ensure_open(&self) -> RouterResult<()> {
        if *self.open.read() {
            Ok(())
        } else {
            Err(RouterError::closed("Cluster is closed"))
        }
    }

    /// 쓰기 문장 실행
    ///
    /// 항상 마스터로 라우팅된다.
    pub async fn execute(&self, query: &str, args: &[Value]) -> RouterResult<ExecSummary> {
        self.ensure_open()?;
        self.writes_routed.fetch_add(1, Ordering::Relaxed);
        self.master().execute(query, args).await
    }

    /// 취소 토큰과 함께 쓰기 문장 실행
    ///
    /// 토큰은 선택된 마스터 연결로 그대로 전달된다.
    pub async fn execute_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
        args: &[Value],
    ) -> RouterResult<ExecSummary> {
        self.ensure_open()?;
        self.writes_routed.fetch_add(1, Ordering::Relaxed);
        self.master().execute_with(ctx, query, args).await
    }

    /// 읽기 질의 실행
    ///
    /// 선택기가 고른 복제본으로 라우팅된다.
    pub async fn query(&self, query: &str, args: &[Value]) -> RouterResult<C::Rows> {
        self.ensure_open()?;
        self.reads_routed.fetch_add(1, Ordering::Relaxed);
        self.replica().query(query, args).await
    }

    /// 취소 토큰과 함께 읽기 질의 실행
    pub async fn query_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
        args: &[Value],
    ) -> RouterResult<C::Rows> {
        self.ensure_open()?;
        self.reads_routed.fetch_add(1, Ordering::Relaxed);
        self.replica().query_with(ctx, query, args).await
    }

    /// 최대 한 행을 기대하는 읽기 질의 실행
    ///
    /// 선택기가 고른 복제본으로 라우팅된다. 항상 행 결과를 반환하며
    /// 에러는 행의 스캔 시점으로 미뤄진다.
    pub async fn query_one(&self, query: &str, args: &[Value]) -> C::Row {
        self.reads_routed.fetch_add(1, Ordering::Relaxed);
        self.replica().query_one(query, args).await
    }

    /// 취소 토큰과 함께 단일 행 읽기 질의 실행
    pub async fn query_one_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
        args: &[Value],
    ) -> C::Row {
        self.reads_routed.fetch_add(1, Ordering::Relaxed);
        self.replica().query_one_with(ctx, query, args).await
    }

    /// 트랜잭션 시작
    ///
    /// 항상 마스터로 라우팅된다. 트랜잭션이 여러 물리 연결에 걸치는
    /// 일은 없다.
    pub async fn begin(&self) -> RouterResult<C::Transaction> {
        self.ensure_open()?;
        self.master().begin().await
    }

    /// 취소 토큰과 함께 트랜잭션 시작
    pub async fn begin_with(&self, ctx: &CancellationToken) -> RouterResult<C::Transaction> {
        self.ensure_open()?;
        self.master().begin_with(ctx).await
    }

    /// 모든 물리 연결 상태 확인
    ///
    /// 모든 연결에 동시에 핑을 보내고 전체 완료를 기다린다. 실패가
    /// 있으면 가장 낮은 인덱스의 에러를 반환한다.
    pub async fn ping(&self) -> RouterResult<()> {
        self.ensure_open()?;
        scatter(self.conns.len(), |i| self.conns[i].ping()).await
    }

    /// 취소 토큰과 함께 모든 물리 연결 상태 확인
    pub async fn ping_with(&self, ctx: &CancellationToken) -> RouterResult<()> {
        self.ensure_open()?;
        scatter(self.conns.len(), |i| self.conns[i].ping_with(ctx)).await
    }

    /// 동일한 문장을 모든 물리 연결에 준비
    ///
    /// 모든 연결에 동시에 준비를 수행하며 순서를 보존한다. 반환된
    /// 집계 문장의 핸들 수는 물리 연결 수와 같고 인덱스가 정렬된다.
    /// 하나라도 실패하면 가장 낮은 실패 인덱스의 에러를 반환한다.
    pub async fn prepare(&self, query: &str) -> RouterResult<ClusterStatement<C::Statement>> {
        self.ensure_open()?;

        let prepared = join_all(self.conns.iter().map(|conn| conn.prepare(query))).await;
        let stmts = prepared.into_iter().collect::<RouterResult<Vec<_>>>()?;

        Ok(ClusterStatement::new(stmts, self.selector.clone()))
    }

    /// 취소 토큰과 함께 동일한 문장을 모든 물리 연결에 준비
    pub async fn prepare_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
    ) -> RouterResult<ClusterStatement<C::Statement>> {
        self.ensure_open()?;

        let prepared =
            join_all(self.conns.iter().map(|conn| conn.prepare_with(ctx, query))).await;
        let stmts = prepared.into_iter().collect::<RouterResult<Vec<_>>>()?;

        Ok(ClusterStatement::new(stmts, self.selector.clone()))
    }

    /// 모든 물리 연결을 동시 종료
    ///
    /// 일부 종료가 실패해도 나머지 연결의 종료는 끝까지 시도되고,
    /// 가장 낮은 인덱스의 에러가 반환된다. 이미 닫힌 핸들에는 아무
    /// 것도 하지 않는다. 취소는 받지 않으며 가장 느린 종료까지
    /// 기다린다.
    pub async fn close(&self) -> RouterResult<()> {
        {
            let mut open = self.open.write();
            if !*open {
                return Ok(());
            }
            *open = false;
        }

        tracing::debug!(endpoints = self.conns.len(), "Closing cluster");
        scatter(self.conns.len(), |i| self.conns[i].close()).await
    }

    /// 클러스터 메트릭
    pub fn metrics(&self) -> ClusterMetrics {
        ClusterMetrics {
            endpoint_count: self.conns.len(),
            replica_count: self.replica_count(),
            reads_routed: self.reads_routed.load(Ordering::Relaxed),
            writes_routed: self.writes_routed.load(Ordering::Relaxed),
        }
    }
}

impl<C: Connection> fmt::Debug for Cluster<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("endpoints", &self.conns.len())
            .field("replicas", &self.replica_count())
            .field("open", &*self.open.read())
            .field("policy", &self.policy())
            .finish()
    }
}

// ============================================================================
// ClusterBuilder - 클러스터 빌더
// ============================================================================

/// 클러스터 빌더
pub struct ClusterBuilder<C: Connection> {
    /// 마스터 연결
    master: Option<C>,
    /// 복제본 연결 목록
    replicas: Vec<C>,
    /// 부하 분산 정책
    policy: BalancePolicy,
}

impl<C: Connection> ClusterBuilder<C> {
    /// 새 빌더 생성
    pub fn new() -> Self {
        Self {
            master: None,
            replicas: Vec::new(),
            policy: BalancePolicy::default(),
        }
    }

    /// 마스터 설정
    pub fn master(mut self, conn: C) -> Self {
        self.master = Some(conn);
        self
    }

    /// 복제본 추가
    pub fn replica(mut self, conn: C) -> Self {
        self.replicas.push(conn);
        self
    }

    /// 복제본 여러 개 추가
    pub fn replicas(mut self, conns: impl IntoIterator<Item = C>) -> Self {
        self.replicas.extend(conns);
        self
    }

    /// 부하 분산 정책 설정
    pub fn policy(mut self, policy: BalancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 빌드
    pub fn build(self) -> RouterResult<Cluster<C>> {
        let master = self
            .master
            .ok_or_else(|| RouterError::configuration("Master connection is required"))?;

        let mut conns = Vec::with_capacity(1 + self.replicas.len());
        conns.push(master);
        conns.extend(self.replicas);

        Ok(Cluster::new(conns)?.with_policy(self.policy))
    }
}

impl<C: Connection> Default for ClusterBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ClusterMetrics - 클러스터 메트릭
// ============================================================================

/// 클러스터 메트릭
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterMetrics {
    /// 전체 물리 연결 수
    pub endpoint_count: usize,
    /// 복제본 수
    pub replica_count: usize,
    /// 라우팅된 읽기 수
    pub reads_routed: u64,
    /// 라우팅된 쓰기 수
    pub writes_routed: u64,
}

// ============================================================================
// Tests
// ============================================================================
