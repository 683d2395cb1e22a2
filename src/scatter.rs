//! Scatter-Gather
//!
//! 동일한 연산을 모든 대상에 동시 적용하고 실패를 결정적으로 집계

use std::future::Future;

use futures::future::join_all;

/// `op(i)`를 `[0, count)`의 모든 인덱스에 동시 실행하고 전체 완료를 대기
///
/// 어떤 인덱스가 실패해도 나머지 연산은 끝까지 수행된다. 하나 이상
/// 실패하면 완료 순서와 무관하게 **가장 낮은 실패 인덱스**의 에러를
/// 반환한다. `count == 0`이거나 전부 성공하면 `Ok(())`를 반환한다.
///
/// 데이터베이스 지식이 전혀 없는 범용 프리미티브로, 에러 타입에
/// 대해 제네릭하다.
pub async fn scatter<E, F, Fut>(count: usize, op: F) -> Result<(), E>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    // join_all은 입력 순서를 보존하므로 첫 번째 에러가 곧 최저 인덱스다
    let results = join_all((0..count).map(op)).await;
    for result in results {
        result?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Barrier;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_scatter_zero_targets() {
        let result: Result<(), String> = scatter(0, |_| async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_scatter_all_succeed() {
        let calls: Vec<AtomicUsize> = (0..4).map(|_| AtomicUsize::new(0)).collect();

        let result: Result<(), String> = scatter(4, |i| {
            let calls = &calls;
            async move {
                calls[i].fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        for counter in &calls {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_scatter_single_failure() {
        let result: Result<(), String> = scatter(3, |i| async move {
            if i == 1 {
                Err(format!("failed at {}", i))
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failed at 1");
    }

    #[tokio::test]
    async fn test_scatter_reports_lowest_failed_index() {
        // 높은 인덱스가 먼저 실패해도 낮은 인덱스의 에러가 이긴다
        let result: Result<(), String> = scatter(4, |i| async move {
            match i {
                1 => {
                    sleep(Duration::from_millis(30)).await;
                    Err("slow failure at 1".to_string())
                }
                3 => Err("fast failure at 3".to_string()),
                _ => Ok(()),
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "slow failure at 1");
    }

    #[tokio::test]
    async fn test_scatter_no_short_circuit() {
        let calls: Vec<AtomicUsize> = (0..5).map(|_| AtomicUsize::new(0)).collect();

        let result: Result<(), String> = scatter(5, |i| {
            let calls = &calls;
            async move {
                calls[i].fetch_add(1, Ordering::SeqCst);
                if i == 0 {
                    Err("failed at 0".to_string())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failed at 0");
        // index 0 failed, but every later index still ran exactly once
        for counter in &calls {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_scatter_runs_concurrently() {
        // 직렬 실행이라면 배리어에서 영원히 대기하게 된다
        let barrier = Barrier::new(8);

        let result = timeout(
            Duration::from_secs(1),
            scatter(8, |_| {
                let barrier = &barrier;
                async move {
                    barrier.wait().await;
                    Ok::<(), String>(())
                }
            }),
        )
        .await;

        assert!(result.expect("scatter must not serialize its tasks").is_ok());
    }
}
