//! WebDriver process management - locating, spawning and health checking
//! chromedriver, geckodriver and friends

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// How long a freshly spawned driver gets to report ready
pub const DRIVER_STARTUP_TIMEOUT: Duration = Duration::from_secs(15);

const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running WebDriver process
#[derive(Debug)]
pub struct DriverProcess {
    child: Child,
    executable: PathBuf,
    pub url: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default)]
    ready: Option<bool>,
}

impl DriverProcess {
    /// Spawn `executable` on a free port and wait until it reports ready
    pub async fn spawn(executable: &Path, port_args: impl Fn(u16) -> Vec<String>) -> E2eResult<Self> {
        let port = find_free_port()?;
        let url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", executable.display(), port);

        let child = Command::new(executable)
            .args(port_args(port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                E2eError::DriverStartup(format!("Failed to spawn {}: {}", executable.display(), e))
            })?;

        let mut process = DriverProcess {
            child,
            executable: executable.to_path_buf(),
            url,
            port,
        };

        if let Err(e) = process.wait_for_ready(DRIVER_STARTUP_TIMEOUT).await {
            process.stop();
            return Err(e);
        }

        info!("{} is ready at {}", process.name(), process.url);
        Ok(process)
    }

    /// Poll `GET /status` until the driver says it is ready
    async fn wait_for_ready(&mut self, timeout: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            if let Ok(Some(status)) = self.child.try_wait() {
                return Err(E2eError::DriverStartup(format!(
                    "{} exited early with {}",
                    self.name(),
                    status
                )));
            }

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => match resp.json::<StatusResponse>().await {
                    Ok(body) if body.value.ready.unwrap_or(true) => return Ok(()),
                    Ok(_) => debug!("{} is up but not ready yet", self.name()),
                    Err(e) => warn!("Unreadable status from {}: {}", self.name(), e),
                },
                Ok(resp) => {
                    warn!("Status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} to start...", self.name());
                    }
                    if !e.is_connect() {
                        warn!("Status check error: {}", e);
                    }
                }
            }

            sleep(HEALTH_POLL_INTERVAL).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    /// File name of the driver executable
    pub fn name(&self) -> String {
        self.executable
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("webdriver")
            .to_string()
    }

    /// Stop the driver: SIGTERM first, then kill
    pub fn stop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }

        info!("Stopping {} (pid: {})", self.name(), self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Find a driver executable: `env_var` if it is set, else the first match on `PATH`
pub fn locate_driver(executable: &str, env_var: &str) -> E2eResult<PathBuf> {
    let override_path = std::env::var_os(env_var).map(PathBuf::from);
    let search_path = std::env::var_os("PATH");
    locate_driver_in(executable, override_path, search_path.as_deref())
        .ok_or_else(|| E2eError::DriverNotFound(executable.to_string(), env_var.to_string()))
}

fn locate_driver_in(executable: &str, override_path: Option<PathBuf>, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Some(path);
        }
        warn!("{} points at {}, which is not a file", executable, path.display());
    }

    let names: Vec<String> = if cfg!(windows) {
        vec![format!("{}.exe", executable), executable.to_string()]
    } else {
        vec![executable.to_string()]
    };

    std::env::split_paths(search_path?)
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Find a free local port
pub fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert!(port > 1024);
    }

    #[test]
    fn test_locate_on_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let driver = dir.path().join(if cfg!(windows) { "fakedriver.exe" } else { "fakedriver" });
        std::fs::write(&driver, b"").unwrap();

        let search = std::env::join_paths([dir.path()]).unwrap();
        let found = locate_driver_in("fakedriver", None, Some(search.as_os_str()));
        assert_eq!(found, Some(driver));
    }

    #[test]
    fn test_override_wins_over_path() {
        let dir = tempfile::tempdir().unwrap();
        let pinned = dir.path().join("pinned-driver");
        std::fs::write(&pinned, b"").unwrap();

        let found = locate_driver_in("fakedriver", Some(pinned.clone()), None);
        assert_eq!(found, Some(pinned));
    }

    #[test]
    fn test_missing_override_falls_back_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert_eq!(locate_driver_in("fakedriver", Some(missing), None), None);
    }

    #[test]
    fn test_locate_driver_reports_env_var() {
        let err = locate_driver("smashly-no-such-driver", "SMASHLY_NO_SUCH_DRIVER").unwrap_err();
        assert!(matches!(err, E2eError::DriverNotFound(ref exe, ref var)
            if exe == "smashly-no-such-driver" && var == "SMASHLY_NO_SUCH_DRIVER"));
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_fails() {
        let err = DriverProcess::spawn(Path::new("/nonexistent/chromedriver"), |port| {
            vec![format!("--port={}", port)]
        })
        .await
        .unwrap_err();
        assert!(matches!(err, E2eError::DriverStartup(_)));
    }
}
