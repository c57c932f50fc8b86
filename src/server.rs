//! Dev-server process supervision
//!
//! The server process is a resource the evaluator acquires before collecting
//! and releases on every exit path. The command runs in its own process
//! group because package scripts routinely spawn children; teardown signals
//! the whole group, interrupt first, then a forced kill after a grace
//! window. Teardown never raises.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

/// How long to poll the serve URL before declaring the server unreachable
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);
/// Interval between readiness probes
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Per-probe HTTP timeout
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// How long a server gets to exit after the interrupt before the kill
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Handle to a running dev server, owned exclusively by one project
/// evaluation.
pub struct DevServer {
    child: tokio::process::Child,
    pgid: Option<i32>,
}

impl DevServer {
    /// Launch the serve command through `sh -c` in the project directory.
    pub fn start(command: &str, cwd: &Path) -> std::io::Result<Self> {
        debug!("starting dev server: {command}");

        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // New process group so teardown can reach the script's children.
            cmd.process_group(0);
        }

        let mut cmd = tokio::process::Command::from(cmd);
        cmd.kill_on_drop(true);
        let child = cmd.spawn()?;
        let pgid = child.id().map(|id| id as i32);
        Ok(Self { child, pgid })
    }

    #[cfg(unix)]
    fn signal_group(&self, signal: nix::sys::signal::Signal) {
        if let Some(pgid) = self.pgid {
            // Process may already be gone; that is fine.
            let _ = nix::sys::signal::killpg(nix::unistd::Pid::from_raw(pgid), signal);
        }
    }

    /// Stop the server: interrupt the process group, wait out the grace
    /// window, then kill. Best effort on every step.
    pub async fn shutdown(mut self) {
        debug!("stopping dev server (pgid {:?})", self.pgid);

        #[cfg(unix)]
        self.signal_group(nix::sys::signal::Signal::SIGINT);
        #[cfg(not(unix))]
        let _ = self.child.start_kill();

        if timeout(SHUTDOWN_GRACE, self.child.wait()).await.is_err() {
            warn!("dev server ignored interrupt, forcing kill");
            #[cfg(unix)]
            self.signal_group(nix::sys::signal::Signal::SIGKILL);
            let _ = self.child.kill().await;
        }
    }
}

/// Poll `url` until it answers with HTTP < 400 or `ready_timeout` elapses.
pub async fn wait_for_url(url: &str, ready_timeout: Duration, interval: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    let deadline = Instant::now() + ready_timeout;
    loop {
        match client.get(url).send().await {
            Ok(response) if response.status().as_u16() < 400 => return true,
            Ok(response) => debug!("readiness probe got {}", response.status()),
            Err(e) => debug!("readiness probe failed: {e}"),
        }
        if Instant::now() + interval > deadline {
            return false;
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_interrupts_sleeping_server() {
        let server = DevServer::start("sleep 30", Path::new(".")).unwrap();
        let started = std::time::Instant::now();
        server.shutdown().await;
        // Interrupt should land well inside the grace window.
        assert!(started.elapsed() < SHUTDOWN_GRACE + Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_shutdown_escalates_to_kill() {
        // The shell ignores the interrupt and restarts its sleep child, so
        // only the kill can end it.
        let server =
            DevServer::start("trap '' INT; while true; do sleep 1; done", Path::new(".")).unwrap();
        // Give the shell time to install the trap before the interrupt lands.
        sleep(Duration::from_millis(500)).await;
        let started = std::time::Instant::now();
        server.shutdown().await;
        assert!(started.elapsed() >= SHUTDOWN_GRACE);
        assert!(started.elapsed() < SHUTDOWN_GRACE + Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_wait_for_url_reachable() {
        let mut mock_server = mockito::Server::new_async().await;
        let _mock = mock_server
            .mock("GET", "/")
            .with_status(200)
            .create_async()
            .await;

        assert!(
            wait_for_url(
                &mock_server.url(),
                Duration::from_secs(5),
                Duration::from_millis(100)
            )
            .await
        );
    }

    #[tokio::test]
    async fn test_wait_for_url_times_out() {
        // Nothing listens on this port.
        let ready = wait_for_url(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            Duration::from_millis(200),
        )
        .await;
        assert!(!ready);
    }

    #[tokio::test]
    async fn test_wait_for_url_error_status_not_ready() {
        let mut mock_server = mockito::Server::new_async().await;
        let _mock = mock_server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let ready = wait_for_url(
            &mock_server.url(),
            Duration::from_secs(2),
            Duration::from_millis(200),
        )
        .await;
        assert!(!ready);
    }
}
