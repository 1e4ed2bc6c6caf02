//! 批次并发调度器 - 编排层
//!
//! ## 职责
//!
//! 把每个批次交给 worker 并发执行，等全部完成后按**提交顺序**返回结果。
//!
//! ## 设计特点
//!
//! - **并发控制**：使用 Semaphore 限制同时运行的 worker 数量
//! - **顺序保证**：任务句柄按提交顺序保存、按顺序 await，
//!   所以 `replies[i]` 永远对应 `batches[i]`，与完成先后无关
//! - **无共享可变状态**：worker 只读自己的批次

use crate::error::DispatchError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// 批次并发调度器
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    max_workers: usize,
}

impl Dispatcher {
    /// 创建调度器，并发数至少为 1
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 并发执行所有批次
    ///
    /// # 参数
    /// - `batches`: 批次列表
    /// - `worker`: 处理单个批次的函数
    ///
    /// # 返回
    /// 与 `batches` 一一对应的结果；任一任务 panic 或被取消都视为整体失败
    pub async fn dispatch<T, R, F, Fut>(
        &self,
        batches: Vec<T>,
        worker: F,
    ) -> Result<Vec<R>, DispatchError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let worker = Arc::new(worker);
        let total = batches.len();
        let mut handles = Vec::with_capacity(total);

        debug!("开始调度 {} 个批次，最大并发数: {}", total, self.max_workers);

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let worker = Arc::clone(&worker);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                worker(batch).await
            });
            handles.push((batch_index, handle));
        }

        // 按提交顺序等待
        let mut replies = Vec::with_capacity(total);
        let mut pending = handles.into_iter();
        while let Some((batch_index, handle)) = pending.next() {
            match handle.await {
                Ok(reply) => replies.push(reply),
                Err(source) => {
                    error!("批次 {} 的任务执行失败: {}", batch_index, source);
                    // 剩余任务不再需要，取消以免继续调用服务
                    for (_, rest) in pending.by_ref() {
                        rest.abort();
                    }
                    return Err(DispatchError::WorkerAborted {
                        batch_index,
                        source,
                    });
                }
            }
        }

        debug!("{} 个批次全部完成", total);
        Ok(replies)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_WORKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_replies_follow_submission_order() {
        // 伪随机延迟：后提交的批次可能先完成
        let delays: Vec<u64> = (0..10u64).map(|i| (i * 37 + 11) % 23 * 3).collect();
        let batches: Vec<(usize, u64)> = delays.iter().copied().enumerate().collect();

        let replies = Dispatcher::new(4)
            .dispatch(batches, |(index, delay)| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                format!("reply-{}", index)
            })
            .await
            .unwrap();

        let expected: Vec<String> = (0..10).map(|i| format!("reply-{}", i)).collect();
        assert_eq!(replies, expected);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let worker = {
            let running = running.clone();
            let peak = peak.clone();
            move |_: usize| {
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                }
            }
        };

        Dispatcher::new(3)
            .dispatch((0..12).collect(), worker)
            .await
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_empty_dispatch() {
        let replies: Vec<String> = Dispatcher::default()
            .dispatch(Vec::<usize>::new(), |i| async move { i.to_string() })
            .await
            .unwrap();
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_worker_is_fatal() {
        let result = Dispatcher::new(2)
            .dispatch(vec![0usize, 1, 2], |i| async move {
                if i == 1 {
                    panic!("worker 崩溃");
                }
                i
            })
            .await;

        assert!(matches!(
            result,
            Err(DispatchError::WorkerAborted { batch_index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_failure_cancels_outstanding_workers() {
        let finished = Arc::new(AtomicUsize::new(0));
        let worker = {
            let finished = finished.clone();
            move |i: usize| {
                let finished = finished.clone();
                async move {
                    if i == 0 {
                        panic!("worker 崩溃");
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                }
            }
        };

        let result = Dispatcher::new(4).dispatch(vec![0usize, 1, 2, 3], worker).await;
        assert!(matches!(
            result,
            Err(DispatchError::WorkerAborted { batch_index: 0, .. })
        ));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(Dispatcher::new(0).max_workers(), 1);
    }
}
