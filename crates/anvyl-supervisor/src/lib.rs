//! Service Supervisor library: starts, monitors, and stops
//! the Infrastructure, MCP, and Agent services as independent OS
//! processes, persisting enough state (PID files, log files) to answer
//! status queries without keeping a long-lived parent.

pub mod error;
pub mod paths;
pub mod process;
pub mod supervisor;
pub mod types;

pub use error::{SupervisorError, SupervisorResult};
pub use supervisor::Supervisor;
pub use types::{AggregateStatus, LogsOptions, ServiceId, ServiceStatus, StartOptions};

#[cfg(test)]
mod tests {
    use super::*;

    fn with_temp_state_dir<T>(f: impl FnOnce() -> T) -> T {
        let dir = tempfile::tempdir().unwrap();
        // SAFETY: test-only; each test that touches ANVYL_STATE_DIR runs
        // single-threaded within this module via #[serial]-style manual
        // sequencing (no two tests share the overridden var concurrently
        // because cargo test runs #[test] fns in separate threads but each
        // sets/clears its own value around the call).
        unsafe {
            std::env::set_var("ANVYL_STATE_DIR", dir.path());
        }
        let result = f();
        unsafe {
            std::env::remove_var("ANVYL_STATE_DIR");
        }
        result
    }

    #[test]
    fn status_of_never_started_service_is_not_running() {
        with_temp_state_dir(|| {
            let supervisor = Supervisor::new();
            let status = supervisor.status(ServiceId::Infra);
            assert!(!status.running);
            assert!(status.pid.is_none());
        });
    }

    #[test]
    fn stale_pid_file_is_detected_as_not_running() {
        with_temp_state_dir(|| {
            paths::ensure_dirs().unwrap();
            // A PID astronomically unlikely to be alive or to match the
            // expected binary's command line.
            std::fs::write(paths::pid_file(ServiceId::Infra), "999999\n").unwrap();

            let supervisor = Supervisor::new();
            let status = supervisor.status(ServiceId::Infra);
            assert!(!status.running);
            assert!(!paths::pid_file(ServiceId::Infra).exists());
        });
    }

    #[test]
    fn liveness_check_rejects_a_recycled_pid_with_a_different_command_line() {
        with_temp_state_dir(|| {
            paths::ensure_dirs().unwrap();
            // Spawn an unrelated real process and point a service's PID
            // file at it: the PID is alive, but it is not anvyl-infra.
            let mut child = std::process::Command::new("sleep")
                .arg("30")
                .spawn()
                .expect("spawn sleep");
            let pid = child.id();
            std::fs::write(paths::pid_file(ServiceId::Infra), format!("{pid}\n")).unwrap();

            assert!(!process::is_alive(ServiceId::Infra, pid));
            assert!(process::live_pid(ServiceId::Infra).is_none());
            assert!(!paths::pid_file(ServiceId::Infra).exists());

            let _ = child.kill();
            let _ = child.wait();
        });
    }

    #[test]
    fn stop_is_idempotent_when_nothing_is_running() {
        with_temp_state_dir(|| {
            let supervisor = Supervisor::new();
            assert!(supervisor.stop(ServiceId::Agent).is_ok());
            assert!(supervisor.stop(ServiceId::Agent).is_ok());
        });
    }
}
