//! Physical Endpoint Capability
//!
//! 물리 연결과 준비 문장이 라우팅 계층에 노출해야 하는 실행 능력 정의

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::RouterResult;
use super::value::Value;

// ============================================================================
// ExecSummary - 실행 결과 요약
// ============================================================================

/// 쓰기 실행 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecSummary {
    /// 영향받은 행 수
    pub rows_affected: u64,
    /// 마지막 삽입 ID
    pub last_insert_id: Option<i64>,
}

impl ExecSummary {
    /// 새 요약 생성
    pub fn new(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }

    /// 변경 사항 존재 여부
    pub fn contains_updates(&self) -> bool {
        self.rows_affected > 0
    }
}

// ============================================================================
// Connection - 물리 연결 능력
// ============================================================================

/// 물리 연결 능력
///
/// 단일 실제 데이터베이스 서버로 맺어진 연결 하나가 노출하는 연산
/// 표면이다. 라우팅 계층은 이 트레이트를 통해서만 물리 연결을 다루며,
/// 질의 파싱, 트랜잭션 의미론, 와이어 프로토콜, 서버 하나에 대한 풀링은
/// 전부 구현체 내부에 속한다. 구현체는 자체 에러를 트레이트 경계에서
/// [`RouterError`](super::error::RouterError)로 변환한다.
#[async_trait]
pub trait Connection: Send + Sync {
    /// 준비된 문장 핸들
    type Statement: Statement<Rows = Self::Rows, Row = Self::Row>;
    /// 행 커서
    type Rows: Send;
    /// 단일 행 결과 (에러는 스캔 시점으로 미뤄진다)
    type Row: Send;
    /// 트랜잭션 핸들
    type Transaction: Send;

    /// 문장 실행 후 결과 요약 반환
    async fn execute(&self, query: &str, args: &[Value]) -> RouterResult<ExecSummary>;

    /// 취소 토큰과 함께 문장 실행
    async fn execute_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
        args: &[Value],
    ) -> RouterResult<ExecSummary>;

    /// 행을 반환하는 질의 실행
    async fn query(&self, query: &str, args: &[Value]) -> RouterResult<Self::Rows>;

    /// 취소 토큰과 함께 질의 실행
    async fn query_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
        args: &[Value],
    ) -> RouterResult<Self::Rows>;

    /// 최대 한 행을 기대하는 질의 실행
    ///
    /// 항상 행 결과를 반환하며 에러는 행의 스캔 시점으로 미뤄진다.
    async fn query_one(&self, query: &str, args: &[Value]) -> Self::Row;

    /// 취소 토큰과 함께 단일 행 질의 실행
    async fn query_one_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
        args: &[Value],
    ) -> Self::Row;

    /// 문장 준비
    async fn prepare(&self, query: &str) -> RouterResult<Self::Statement>;

    /// 취소 토큰과 함께 문장 준비
    async fn prepare_with(
        &self,
        ctx: &CancellationToken,
        query: &str,
    ) -> RouterResult<Self::Statement>;

    /// 연결 상태 확인
    async fn ping(&self) -> RouterResult<()>;

    /// 취소 토큰과 함께 연결 상태 확인
    async fn ping_with(&self, ctx: &CancellationToken) -> RouterResult<()>;

    /// 트랜잭션 시작
    async fn begin(&self) -> RouterResult<Self::Transaction>;

    /// 취소 토큰과 함께 트랜잭션 시작
    async fn begin_with(&self, ctx: &CancellationToken) -> RouterResult<Self::Transaction>;

    /// 연결 종료
    async fn close(&self) -> RouterResult<()>;
}

// ============================================================================
// Statement - 준비 문장 능력
// ============================================================================

/// 준비 문장 능력
///
/// 물리 연결 하나에 준비된 문장이 노출하는 연산 표면이다. 인자는
/// 준비 시점에 고정된 문장 텍스트에 바인딩된다.
#[async_trait]
pub trait Statement: Send + Sync {
    /// 행 커서
    type Rows: Send;
    /// 단일 행 결과 (에러는 스캔 시점으로 미뤄진다)
    type Row: Send;

    /// 준비 문장 실행 후 결과 요약 반환
    async fn execute(&self, args: &[Value]) -> RouterResult<ExecSummary>;

    /// 취소 토큰과 함께 준비 문장 실행
    async fn execute_with(
        &self,
        ctx: &CancellationToken,
        args: &[Value],
    ) -> RouterResult<ExecSummary>;

    /// 행을 반환하는 준비 질의 실행
    async fn query(&self, args: &[Value]) -> RouterResult<Self::Rows>;

    /// 취소 토큰과 함께 준비 질의 실행
    async fn query_with(
        &self,
        ctx: &CancellationToken,
        args: &[Value],
    ) -> RouterResult<Self::Rows>;

    /// 최대 한 행을 기대하는 준비 질의 실행
    ///
    /// 항상 행 결과를 반환하며 에러는 행의 스캔 시점으로 미뤄진다.
    async fn query_one(&self, args: &[Value]) -> Self::Row;

    /// 취소 토큰과 함께 단일 행 준비 질의 실행
    async fn query_one_with(&self, ctx: &CancellationToken, args: &[Value]) -> Self::Row;

    /// 준비 문장 종료
    async fn close(&self) -> RouterResult<()>;
}

// ============================================================================
// Tests
// ============================================================================
