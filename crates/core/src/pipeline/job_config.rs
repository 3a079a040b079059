/// Execution settings for swap jobs, fixed at startup and passed into the
/// use cases. Nothing here changes mid-job.
#[derive(Clone, Debug)]
pub struct JobConfig {
    /// Swap the whole frame sequence in one accelerated engine pass instead
    /// of chunking it across a worker pool.
    pub accelerated: bool,
    /// Preserve the working frames directory after audio attachment.
    pub keep_frames: bool,
    /// Worker threads used by pooled dispatch.
    pub worker_count: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            accelerated: true,
            keep_frames: false,
            worker_count: default_worker_count(),
        }
    }
}

/// Available cores minus two, never below two.
pub fn default_worker_count() -> usize {
    num_cpus().saturating_sub(2).max(2)
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JobConfig::default();
        assert!(config.accelerated);
        assert!(!config.keep_frames);
        assert!(config.worker_count >= 2);
    }

    #[test]
    fn test_default_worker_count_floor_is_two() {
        assert!(default_worker_count() >= 2);
    }
}
