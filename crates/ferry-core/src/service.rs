//! Backing-service lifecycle: confirm or start the local node container.
//!
//! Content-addressed operations call `ensure_running` before touching the
//! network. The check blocks, is repeated on every operation, and keeps no
//! cached readiness state.

use crate::error::{FerryError, Result};
use crate::sink::Sink;
use std::process::Command;

/// Starts or confirms a named backing service; blocks until reachable.
pub trait ServiceLauncher {
    fn ensure_running(&self, name: &str, sink: &dyn Sink) -> Result<()>;
}

/// Instances brought up when the caller does not ask for more.
pub const DEFAULT_INSTANCES: u32 = 1;

/// Docker-backed launcher. One container per instance, named
/// `ferry_service_<service>_<n>`.
pub struct DockerLauncher {
    instances: u32,
}

impl DockerLauncher {
    pub fn new() -> Self {
        Self {
            instances: DEFAULT_INSTANCES,
        }
    }

    pub fn with_instances(instances: u32) -> Self {
        Self {
            instances: instances.max(1),
        }
    }

    fn container_name(service: &str, instance: u32) -> String {
        format!("ferry_service_{service}_{instance}")
    }

    /// Image and published ports for a known service.
    fn service_image(service: &str) -> Option<(&'static str, &'static [&'static str])> {
        match service {
            "ipfs" => Some(("ipfs/kubo:latest", &["4001:4001", "5001:5001", "8080:8080"])),
            _ => None,
        }
    }

    fn unavailable(service: &str, reason: impl Into<String>) -> FerryError {
        FerryError::ServiceUnavailable {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}

impl Default for DockerLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLauncher for DockerLauncher {
    fn ensure_running(&self, name: &str, sink: &dyn Sink) -> Result<()> {
        if which::which("docker").is_err() {
            return Err(Self::unavailable(name, "docker binary not found on PATH"));
        }
        let (image, ports) = Self::service_image(name)
            .ok_or_else(|| Self::unavailable(name, "no service definition for this name"))?;

        for instance in 1..=self.instances {
            let container = Self::container_name(name, instance);

            let inspect = Command::new("docker")
                .args(["inspect", "-f", "{{.State.Running}}", &container])
                .output()
                .map_err(|e| Self::unavailable(name, e.to_string()))?;

            if inspect.status.success() {
                if String::from_utf8_lossy(&inspect.stdout).trim() == "true" {
                    sink.emit(&format!("{container} is running"));
                    continue;
                }
                // Container exists but is stopped.
                let start = Command::new("docker")
                    .args(["start", &container])
                    .output()
                    .map_err(|e| Self::unavailable(name, e.to_string()))?;
                if !start.status.success() {
                    return Err(Self::unavailable(
                        name,
                        String::from_utf8_lossy(&start.stderr).into_owned(),
                    ));
                }
                sink.emit(&format!("started {container}"));
                continue;
            }

            // No such container yet.
            let mut cmd = Command::new("docker");
            cmd.args(["run", "-d", "--name", &container]);
            for p in ports.iter().copied() {
                cmd.args(["-p", p]);
            }
            cmd.arg(image);
            let run = cmd
                .output()
                .map_err(|e| Self::unavailable(name, e.to_string()))?;
            if !run.status.success() {
                return Err(Self::unavailable(
                    name,
                    String::from_utf8_lossy(&run.stderr).into_owned(),
                ));
            }
            sink.emit(&format!("created {container} from {image}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_names_are_stable() {
        assert_eq!(
            DockerLauncher::container_name("ipfs", 1),
            "ferry_service_ipfs_1"
        );
        assert_eq!(
            DockerLauncher::container_name("ipfs", 3),
            "ferry_service_ipfs_3"
        );
    }

    #[test]
    fn unknown_services_have_no_image() {
        assert!(DockerLauncher::service_image("ipfs").is_some());
        assert!(DockerLauncher::service_image("nats").is_none());
    }

    #[test]
    fn instance_count_never_drops_below_one() {
        assert_eq!(DockerLauncher::with_instances(0).instances, 1);
        assert_eq!(DockerLauncher::with_instances(2).instances, 2);
    }
}
