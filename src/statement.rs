//! Cluster Statement
//!
//! 물리 연결마다 준비된 문장을 하나씩 들고 있는 집계 준비 문장

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::connection::{ExecSummary, Statement};
use super::error::RouterResult;
use super::policy::ReplicaSelector;
use super::scatter::scatter;
use super::value::Value;

// ============================================================================
// ClusterStatement - 집계 준비 문장
// ============================================================================

/// 집계 준비 문장
///
/// 같은 문장 텍스트를 클러스터의 모든 물리 연결에 준비한 결과다.
/// 핸들은 클러스터와 같은 인덱스 공간을 쓰며(인덱스 0 = 마스터의
/// 문장) 이 대응은 문장의 수명 내내 유지된다. 라우팅 규칙은
/// [`Cluster`](super::cluster::Cluster)와 동일하고, 선택기는 소유
/// 클러스터의 것을 공유하므로 문장의 읽기도 같은 회전을 이어간다.
/// 문장의 종료는 클러스터의 수명과 무관하게 호출자가 직접 한다.
pub struct ClusterStatement<S: Statement> {
    /// 준비된 문장 목록 (인덱스 0 = 마스터), 생성 후 불변
    stmts: Vec<S>,
    /// 소유 클러스터의 복제본 선택기
    selector: Arc<ReplicaSelector>,
}

impl<S: Statement> ClusterStatement<S> {
    /// 새 집계 문장 생성
    pub(crate) fn new(stmts: Vec<S>, selector: Arc<ReplicaSelector>) -> Self {
        debug_assert!(!stmts.is_empty());
        Self { stmts, selector }
    }

    /// 마스터의 준비 문장
    pub fn master(&self) -> &S {
        &self.stmts[0]
    }

    /// 선택기가 고른 복제본의 준비 문장
    ///
    /// 복제본이 없으면 마스터의 문장을 반환한다.
    pub fn replica(&self) -> &S {
        &self.stmts[self.replica_index()]
    }

    /// 전체 문장 핸들 수
    pub fn endpoint_count(&self) -> usize {
        self.stmts.len()
    }

    /// 복제본 수
    pub fn replica_count(&self) -> usize {
        self.stmts.len() - 1
    }

    /// 읽기 경로가 향할 물리 인덱스 결정
    fn replica_index(&self) -> usize {
        let n = self.replica_count();
        if n == 0 {
            return 0;
        }
        1 + self.selector.next(n)
    }

    /// 준비 문장으로 쓰기 실행
    ///
    /// 항상 마스터의 문장으로 라우팅된다.
    pub async fn execute(&self, args: &[Value]) -> RouterResult<ExecSummary> {
        self.master().execute(args).await
    }

    /// 취소 토큰과 함께 준비 문장으로 쓰기 실행
    pub async fn execute_with(
        &self,
        ctx: &CancellationToken,
        args: &[Value],
    ) -> RouterResult<ExecSummary> {
        self.master().execute_with(ctx, args).await
    }

    /// 준비 문장으로 읽기 질의 실행
    ///
    /// 선택기가 고른 복제본의 문장으로 라우팅된다.
    pub async fn query(&self, args: &[Value]) -> RouterResult<S::Rows> {
        self.replica().query(args).await
    }

    /// 취소 토큰과 함께 준비 문장으로 읽기 질의 실행
    pub async fn query_with(
        &self,
        ctx: &CancellationToken,
        args: &[Value],
    ) -> RouterResult<S::Rows> {
        self.replica().query_with(ctx, args).await
    }

    /// 최대 한 행을 기대하는 준비 질의 실행
    ///
    /// 선택기가 고른 복제본의 문장으로 라우팅된다. 항상 행 결과를
    /// 반환하며 에러는 행의 스캔 시점으로 미뤄진다.
    pub async fn query_one(&self, args: &[Value]) -> S::Row {
        self.replica().query_one(args).await
    }

    /// 취소 토큰과 함께 단일 행 준비 질의 실행
    pub async fn query_one_with(&self, ctx: &CancellationToken, args: &[Value]) -> S::Row {
        self.replica().query_one_with(ctx, args).await
    }

    /// 모든 준비 문장을 동시 종료
    ///
    /// 일부가 실패해도 나머지 문장의 종료는 끝까지 시도되고, 가장
    /// 낮은 인덱스의 에러가 반환된다.
    pub async fn close(&self) -> RouterResult<()> {
        scatter(self.stmts.len(), |i| self.stmts[i].close()).await
    }
}

impl<S: Statement> fmt::Debug for ClusterStatement<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterStatement")
            .field("endpoints", &self.stmts.len())
            .field("replicas", &self.replica_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
