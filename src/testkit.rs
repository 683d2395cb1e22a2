//! Test Endpoints
//!
//! 라우팅 검증용 목 엔드포인트. 어느 인덱스가 어떤 연산을 받았는지
//! 기록하고, 인덱스별로 실패를 주입할 수 있다.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::connection::{Connection, ExecSummary, Statement};
use super::error::{RouterError, RouterResult};
use super::value::Value;

/// 호출 기록 (연산 이름 @ 엔드포인트 인덱스)
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: usize, op: &str) {
        self.0.lock().push(format!("{}@{}", op, id));
    }

    pub(crate) fn count_for(&self, id: usize, op: &str) -> usize {
        let needle = format!("{}@{}", op, id);
        self.0.lock().iter().filter(|entry| **entry == needle).count()
    }
}

/// 목 물리 연결
pub(crate) struct MockConn {
    pub(crate) id: usize,
    pub(crate) log: CallLog,
    fail_close: bool,
    fail_prepare: bool,
    fail_ping: bool,
    stmt_fail_close: bool,
}

impl MockConn {
    pub(crate) fn new(id: usize, log: CallLog) -> Self {
        Self {
            id,
            log,
            fail_close: false,
            fail_prepare: false,
            fail_ping: false,
            stmt_fail_close: false,
        }
    }

    pub(crate) fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    pub(crate) fn failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    pub(crate) fn failing_stmt_close(mut self) -> Self {
        self.stmt_fail_close = true;
        self
    }

    fn make_stmt(&self) -> MockStmt {
        MockStmt {
            id: self.id,
            log: self.log.clone(),
            fail_close: self.stmt_fail_close,
        }
    }
}

/// 목 행 커서 (응답한 엔드포인트 인덱스를 담는다)
#[derive(Debug)]
pub(crate) struct MockRows {
    pub(crate) endpoint: usize,
}

/// 목 단일 행
pub(crate) struct MockRow {
    pub(crate) endpoint: usize,
}

/// 목 트랜잭션
pub(crate) struct MockTx {
    pub(crate) endpoint: usize,
}

#[async_trait]
impl Connection for MockConn {
    type Statement = MockStmt;
    type Rows = MockRows;
    type Row = MockRow;
    type Transaction = MockTx;

    async fn execute(&self, _query: &str, _args: &[Value]) -> RouterResult<ExecSummary> {
        self.log.record(self.id, "execute");
        Ok(ExecSummary::new(1, None))
    }

    async fn execute_with(
        &self,
        _ctx: &CancellationToken,
        _query: &str,
        _args: &[Value],
    ) -> RouterResult<ExecSummary> {
        self.log.record(self.id, "execute_with");
        Ok(ExecSummary::new(1, None))
    }

    async fn query(&self, _query: &str, _args: &[Value]) -> RouterResult<MockRows> {
        self.log.record(self.id, "query");
        Ok(MockRows { endpoint: self.id })
    }

    async fn query_with(
        &self,
        _ctx: &CancellationToken,
        _query: &str,
        _args: &[Value],
    ) -> RouterResult<MockRows> {
        self.log.record(self.id, "query_with");
        Ok(MockRows { endpoint: self.id })
    }

    async fn query_one(&self, _query: &str, _args: &[Value]) -> MockRow {
        self.log.record(self.id, "query_one");
        MockRow { endpoint: self.id }
    }

    async fn query_one_with(
        &self,
        _ctx: &CancellationToken,
        _query: &str,
        _args: &[Value],
    ) -> MockRow {
        self.log.record(self.id, "query_one_with");
        MockRow { endpoint: self.id }
    }

    async fn prepare(&self, _query: &str) -> RouterResult<MockStmt> {
        self.log.record(self.id, "prepare");
        if self.fail_prepare {
            return Err(RouterError::query(
                "PrepareFailed",
                format!("prepare failed on {}", self.id),
            ));
        }
        Ok(self.make_stmt())
    }

    async fn prepare_with(
        &self,
        _ctx: &CancellationToken,
        _query: &str,
    ) -> RouterResult<MockStmt> {
        self.log.record(self.id, "prepare_with");
        if self.fail_prepare {
            return Err(RouterError::query(
                "PrepareFailed",
                format!("prepare failed on {}", self.id),
            ));
        }
        Ok(self.make_stmt())
    }

    async fn ping(&self) -> RouterResult<()> {
        self.log.record(self.id, "ping");
        if self.fail_ping {
            return Err(RouterError::connection(format!(
                "ping failed on {}",
                self.id
            )));
        }
        Ok(())
    }

    async fn ping_with(&self, _ctx: &CancellationToken) -> RouterResult<()> {
        self.log.record(self.id, "ping_with");
        if self.fail_ping {
            return Err(RouterError::connection(format!(
                "ping failed on {}",
                self.id
            )));
        }
        Ok(())
    }

    async fn begin(&self) -> RouterResult<MockTx> {
        self.log.record(self.id, "begin");
        Ok(MockTx { endpoint: self.id })
    }

    async fn begin_with(&self, _ctx: &CancellationToken) -> RouterResult<MockTx> {
        self.log.record(self.id, "begin_with");
        Ok(MockTx { endpoint: self.id })
    }

    async fn close(&self) -> RouterResult<()> {
        self.log.record(self.id, "close");
        if self.fail_close {
            return Err(RouterError::connection(format!(
                "close failed on {}",
                self.id
            )));
        }
        Ok(())
    }
}

/// 목 준비 문장
pub(crate) struct MockStmt {
    pub(crate) id: usize,
    pub(crate) log: CallLog,
    fail_close: bool,
}

#[async_trait]
impl Statement for MockStmt {
    type Rows = MockRows;
    type Row = MockRow;

    async fn execute(&self, _args: &[Value]) -> RouterResult<ExecSummary> {
        self.log.record(self.id, "stmt_execute");
        Ok(ExecSummary::new(1, None))
    }

    async fn execute_with(
        &self,
        _ctx: &CancellationToken,
        _args: &[Value],
    ) -> RouterResult<ExecSummary> {
        self.log.record(self.id, "stmt_execute_with");
        Ok(ExecSummary::new(1, None))
    }

    async fn query(&self, _args: &[Value]) -> RouterResult<MockRows> {
        self.log.record(self.id, "stmt_query");
        Ok(MockRows { endpoint: self.id })
    }

    async fn query_with(
        &self,
        _ctx: &CancellationToken,
        _args: &[Value],
    ) -> RouterResult<MockRows> {
        self.log.record(self.id, "stmt_query_with");
        Ok(MockRows { endpoint: self.id })
    }

    async fn query_one(&self, _args: &[Value]) -> MockRow {
        self.log.record(self.id, "stmt_query_one");
        MockRow { endpoint: self.id }
    }

    async fn query_one_with(&self, _ctx: &CancellationToken, _args: &[Value]) -> MockRow {
        self.log.record(self.id, "stmt_query_one_with");
        MockRow { endpoint: self.id }
    }

    async fn close(&self) -> RouterResult<()> {
        self.log.record(self.id, "stmt_close");
        if self.fail_close {
            return Err(RouterError::connection(format!(
                "statement close failed on {}",
                self.id
            )));
        }
        Ok(())
    }
}
