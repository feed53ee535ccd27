// src/session.rs

use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Settings used to start a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub app_name: String,
    /// Worker threads; `None` means one per CPU.
    pub threads: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: "CovidAnalysis".into(),
            threads: None,
        }
    }
}

/// Process-wide execution context.
///
/// Owns the worker pool every read, aggregation and write runs on. Created once
/// at startup and released either through [`Session::stop`] or when dropped,
/// which covers early returns on error.
pub struct Session {
    app_name: String,
    job_id: Uuid,
    pool: rayon::ThreadPool,
    started: Instant,
}

impl Session {
    pub fn start(config: &SessionConfig) -> Result<Self> {
        let threads = config.threads.unwrap_or_else(num_cpus::get).max(1);
        let prefix = config.app_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("{}-worker-{}", prefix, i))
            .build()
            .context("building session thread pool")?;

        let job_id = Uuid::new_v4();
        info!(app = %config.app_name, job = %job_id, threads, "session started");

        Ok(Self {
            app_name: config.app_name.clone(),
            job_id,
            pool,
            started: Instant::now(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Identifier stamped into every part file written during this session.
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the session's pool so nested rayon work uses its workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Explicit shutdown; equivalent to dropping the session.
    pub fn stop(self) {}
}

impl Drop for Session {
    fn drop(&mut self) {
        info!(
            app = %self.app_name,
            job = %self.job_id,
            elapsed = ?self.started.elapsed(),
            "session stopped"
        );
    }
}
