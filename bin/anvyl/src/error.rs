use crate::exitcode;

#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub code: i32,
}

impl CliError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: exitcode::GENERIC_FAILURE,
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: exitcode::INVALID_ARGUMENTS,
        }
    }

    pub fn not_running(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: exitcode::SERVICE_NOT_RUNNING,
        }
    }

    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: exitcode::BACKEND_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<anvyl_supervisor::SupervisorError> for CliError {
    fn from(err: anvyl_supervisor::SupervisorError) -> Self {
        CliError::generic(err.to_string())
    }
}
