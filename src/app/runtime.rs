use std::sync::OnceLock;

pub static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Shared runtime that fetch tasks are spawned on.
pub fn rt() -> &'static tokio::runtime::Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("live-filter-fetch")
            .enable_all()
            .build()
            .expect("tokio runtime")
    })
}
