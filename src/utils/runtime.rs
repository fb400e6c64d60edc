use anyhow::Result;

/// Everything runs on one thread: the timer tick, user input and saving never overlap.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
