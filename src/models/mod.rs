pub mod fetch_result;
pub mod loaders;
pub mod task;

pub use fetch_result::{BatchSummary, FetchMode, FetchResult, Payload};
pub use loaders::load_task_file;
pub use task::{build_tasks, normalize_address, validate_scheme, Task, DEFAULT_SCHEME};
