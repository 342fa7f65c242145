//! Detached spawn, PID-file I/O, and liveness checks
//! "Liveness discipline" and "Detachment contract").

use std::fs::{File, OpenOptions};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use sysinfo::{Pid, System};

use crate::error::{SupervisorError, SupervisorResult};
use crate::paths;
use crate::types::{ServiceId, StartOptions};

/// Spawns `service`'s binary as a detached child: new session (so it
/// survives the parent exiting and has no controlling terminal),
/// stdin from `/dev/null`, stdout+stderr appended to the service log.
pub fn spawn_detached(service: ServiceId, options: &StartOptions) -> SupervisorResult<u32> {
    paths::ensure_dirs().map_err(SupervisorError::Io)?;

    let log_path = paths::log_file(service);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(SupervisorError::Io)?;
    let log_file_err = log_file.try_clone().map_err(SupervisorError::Io)?;

    let devnull = File::open("/dev/null").map_err(SupervisorError::Io)?;

    let mut command = Command::new(service.binary_name());
    command
        .stdin(Stdio::from(devnull))
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_file_err))
        .env("ANVYL_STATE_DIR", anvyl_core::env_config::state_dir());

    for (key, value) in &options.env {
        command.env(key, value);
    }

    // SAFETY: setsid() only detaches the child from the parent's
    // session/controlling terminal; it does not touch any state the
    // parent depends on after fork.
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command.spawn().map_err(|e| SupervisorError::SpawnFailed {
        service: service.as_str().to_string(),
        reason: e.to_string(),
    })?;

    let pid = child.id();
    // The child is intentionally detached: we do not wait() on it. Its
    // own signal handler (installed in each binary's main) is
    // responsible for a clean exit on SIGTERM.
    std::mem::forget(child);

    write_pid_file(service, pid)?;
    Ok(pid)
}

fn write_pid_file(service: ServiceId, pid: u32) -> SupervisorResult<()> {
    std::fs::write(paths::pid_file(service), format!("{pid}\n")).map_err(SupervisorError::Io)
}

pub fn read_pid_file(service: ServiceId) -> Option<u32> {
    let contents = std::fs::read_to_string(paths::pid_file(service)).ok()?;
    contents.trim().parse().ok()
}

pub fn remove_pid_file(service: ServiceId) {
    let _ = std::fs::remove_file(paths::pid_file(service));
}

/// A PID is "alive" for this service only if the process exists AND
/// its command line still matches the expected binary ("the
/// supervisor must not misidentify a recycled PID belonging to another
/// program").
pub fn is_alive(service: ServiceId, pid: u32) -> bool {
    let mut system = System::new();
    let sys_pid = Pid::from_u32(pid);
    if system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[sys_pid]), true) == 0 {
        return false;
    }
    let Some(process) = system.process(sys_pid) else {
        return false;
    };

    let expected = service.binary_name();
    process.name().to_string_lossy().contains(expected)
        || process
            .cmd()
            .iter()
            .any(|arg| arg.to_string_lossy().contains(expected))
}

/// Resolves the currently-running PID for `service`, deleting a stale
/// PID file lazily if the process is gone or mismatched.
pub fn live_pid(service: ServiceId) -> Option<u32> {
    let pid = read_pid_file(service)?;
    if is_alive(service, pid) {
        Some(pid)
    } else {
        remove_pid_file(service);
        None
    }
}

pub fn uptime_seconds(pid: u32) -> Option<u64> {
    let mut system = System::new();
    let sys_pid = Pid::from_u32(pid);
    if system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[sys_pid]), true) == 0 {
        return None;
    }
    system.process(sys_pid).map(|p| p.run_time())
}

pub fn send_signal(pid: u32, signal: libc::c_int) -> std::io::Result<()> {
    let ret = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

pub fn tail_lines(path: &Path, n: usize) -> Vec<String> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].to_vec()
}
