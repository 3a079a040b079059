use std::thread::JoinHandle;

use crate::pipeline::job_error::JobError;

type TaskResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type Task = Box<dyn FnOnce() -> TaskResult + Send>;

/// Fixed set of worker threads draining one task queue.
///
/// A pool is opened for a single dispatch phase and closed when it ends;
/// pools are never reused across jobs.
pub struct WorkerPool {
    task_tx: Option<crossbeam_channel::Sender<DispatchedTask>>,
    handles: Vec<JoinHandle<()>>,
}

struct DispatchedTask {
    run: Task,
    done_tx: crossbeam_channel::Sender<TaskResult>,
}

/// One dispatched task; `wait` blocks until the worker reports back.
#[derive(Debug)]
pub struct TaskHandle {
    done_rx: crossbeam_channel::Receiver<TaskResult>,
}

impl TaskHandle {
    pub fn wait(self) -> Result<(), JobError> {
        match self.done_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(JobError::PoolWorker(e.to_string())),
            // The worker dropped the channel without reporting: it panicked.
            Err(_) => Err(JobError::PoolWorker(
                "worker thread terminated abnormally".into(),
            )),
        }
    }
}

impl WorkerPool {
    pub fn open(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<DispatchedTask>();

        let handles = (0..worker_count)
            .map(|_| {
                let task_rx = task_rx.clone();
                std::thread::spawn(move || {
                    for task in task_rx.iter() {
                        let result = (task.run)();
                        let _ = task.done_tx.send(result);
                    }
                })
            })
            .collect();

        Self {
            task_tx: Some(task_tx),
            handles,
        }
    }

    /// Queues a task on the pool. Fails once the pool is closed.
    pub fn dispatch<F>(&self, task: F) -> Result<TaskHandle, JobError>
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let Some(task_tx) = self.task_tx.as_ref() else {
            return Err(JobError::PoolWorker("dispatch on closed pool".into()));
        };
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        task_tx
            .send(DispatchedTask {
                run: Box::new(task),
                done_tx,
            })
            .map_err(|_| JobError::PoolWorker("task queue disconnected".into()))?;
        Ok(TaskHandle { done_rx })
    }

    /// Closes the queue and joins every worker. Idempotent.
    pub fn close(&mut self) {
        self.task_tx = None;
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatched_tasks_run_to_completion() {
        let pool = WorkerPool::open(2);
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                pool.dispatch(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap()
            })
            .collect();

        for handle in handles {
            handle.wait().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_single_worker_runs_tasks_in_dispatch_order() {
        let pool = WorkerPool::open(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..3)
            .map(|id| {
                let order = order.clone();
                pool.dispatch(move || {
                    order.lock().unwrap().push(id);
                    Ok(())
                })
                .unwrap()
            })
            .collect();

        for handle in handles {
            handle.wait().unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_task_error_propagates_through_wait() {
        let pool = WorkerPool::open(1);
        let handle = pool.dispatch(|| Err("chunk exploded".into())).unwrap();

        let err = handle.wait().unwrap_err();
        match err {
            JobError::PoolWorker(message) => assert!(message.contains("chunk exploded")),
            other => panic!("expected PoolWorker, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_after_close_is_rejected() {
        let mut pool = WorkerPool::open(1);
        pool.close();

        let err = pool.dispatch(|| Ok(())).unwrap_err();
        assert!(matches!(err, JobError::PoolWorker(_)));
    }

    #[test]
    fn test_worker_panic_surfaces_as_pool_error() {
        let pool = WorkerPool::open(1);
        let handle = pool.dispatch(|| panic!("worker died")).unwrap();

        assert!(matches!(handle.wait(), Err(JobError::PoolWorker(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut pool = WorkerPool::open(2);
        let handle = pool.dispatch(|| Ok(())).unwrap();
        handle.wait().unwrap();
        pool.close();
        pool.close();
    }
}
