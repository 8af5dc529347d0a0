use fnv::{FnvHashMap, FnvHashSet};
pub use anyhow::Result;

pub mod config;
pub mod data;
pub mod dispatch;
mod error;
pub use error::Error;
pub use config::{PlanConfig, Weights, PenaltyPolicy};

pub type Map<K, V> = FnvHashMap<K, V>;
pub type Set<T> = FnvHashSet<T>;


mod logging_setup {
    use std::path::Path;
    use anyhow::Context;
    use tracing_subscriber::{EnvFilter, fmt, registry, prelude::*};
    use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};

    fn install(logfile: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
        let (json_log, flush_guard) = match logfile {
            Some(p) => {
                let file = std::fs::File::create(p).context(format!("failed to create log file {:?}", p))?;
                let (writer, guard) = NonBlockingBuilder::default()
                    .lossy(false)
                    .finish(file);
                let layer = fmt::layer()
                    .json()
                    .with_span_list(true)
                    .with_current_span(false)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            },
            None => (None, None),
        };

        registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(json_log)
            .try_init()?;
        Ok(flush_guard)
    }

    /// Install the global subscriber: human-readable events on stderr, filtered by `RUST_LOG`, plus
    /// a JSON log when `logfile` is given.  The returned guard flushes the log file when dropped.
    pub fn init_logging(logfile: Option<impl AsRef<Path>>) -> anyhow::Result<Option<WorkerGuard>> {
        install(logfile.as_ref().map(|p| p.as_ref()))
    }

    /// Tests share one global subscriber, so only the first call installs it.
    #[cfg(test)]
    pub(crate) fn init_test_logging(logfile: Option<impl AsRef<Path>>) -> Option<WorkerGuard> {
        install(logfile.as_ref().map(|p| p.as_ref())).ok().flatten()
    }
}
pub use logging_setup::*;
