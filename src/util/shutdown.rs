//! Signal-driven graceful shutdown, shared by both binaries.
use tokio::sync::watch;

/// Spawns a task that waits for SIGINT/SIGTERM (and SIGHUP on Unix) and flips
/// the returned watch channel to `true` once one arrives.
#[cfg(unix)]
pub fn watch_shutdown_signal() -> watch::Receiver<bool> {
	use tokio::signal::unix::{signal, SignalKind};

	let (send_cancel, watch_cancel) = watch::channel(false);
	tokio::spawn(async move {
		let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
		let mut sigterm =
			signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
		let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
		tokio::select! {
			_ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
			_ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
			_ = sighup.recv() => tracing::info!("received SIGHUP, shutting down"),
		}
		let _ = send_cancel.send(true);
	});
	watch_cancel
}

#[cfg(not(unix))]
pub fn watch_shutdown_signal() -> watch::Receiver<bool> {
	let (send_cancel, watch_cancel) = watch::channel(false);
	tokio::spawn(async move {
		let _ = tokio::signal::ctrl_c().await;
		tracing::info!("received Ctrl-C, shutting down");
		let _ = send_cancel.send(true);
	});
	watch_cancel
}

/// Resolves once the watch channel carries `true`. Handed to `hyper`'s
/// `with_graceful_shutdown` and to the `tonic` server builder.
pub async fn wait_from(mut chan: watch::Receiver<bool>) {
	while !*chan.borrow() {
		if chan.changed().await.is_err() {
			return;
		}
	}
}
