//! Termination signals for [`Container::serve`](crate::Container::serve).
//!
//! Unix listens for `SIGINT`, `SIGTERM` and `SIGQUIT`; other platforms only
//! for Ctrl-C. The returned label ends up as the reason of the
//! `ShutdownRequested` event.

/// Resolves with the name of the first termination signal received.
#[cfg(unix)]
pub(crate) async fn wait_for_termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let received = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(received)
}

/// Resolves with the name of the first termination signal received.
#[cfg(not(unix))]
pub(crate) async fn wait_for_termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
