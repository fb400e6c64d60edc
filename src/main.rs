use anyhow::Result;
use tracing::error;
use timetally::{cli::run_cli, utils::runtime::single_thread_runtime};

fn main() -> Result<()> {
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(run_cli()).inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    // Reading stdin can't be cancelled, so the runtime isn't allowed to wait for it.
    runtime.shutdown_background();
    result
}
