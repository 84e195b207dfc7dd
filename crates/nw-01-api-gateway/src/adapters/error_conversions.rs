//! Conversions from workflow failures to API errors.

use crate::domain::error::ApiError;
use crate::workflows::WorkflowError;
use shared_types::ExchangeError;

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Rejected => ApiError::Rejected(err.to_string()),
            WorkflowError::Exchange(ExchangeError::Timeout { .. }) => {
                ApiError::Timeout(err.to_string())
            }
            WorkflowError::Exchange(_) | WorkflowError::NotOk(_) | WorkflowError::AllFailed => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use shared_types::Operation;

    #[test]
    fn test_rejection_is_client_error() {
        let api: ApiError = WorkflowError::Rejected.into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_backend_failures_are_server_errors() {
        let cases = [
            WorkflowError::NotOk(Operation::FetchNewsPage),
            WorkflowError::AllFailed,
            WorkflowError::Exchange(ExchangeError::Transport("down".into())),
            WorkflowError::Exchange(ExchangeError::Timeout {
                operation: Operation::ListComments,
                timeout_ms: 3000,
            }),
        ];
        for case in cases {
            let api: ApiError = case.into();
            assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_timeout_keeps_its_code() {
        let api: ApiError = WorkflowError::Exchange(ExchangeError::Timeout {
            operation: Operation::ListComments,
            timeout_ms: 3000,
        })
        .into();
        assert_eq!(api.code(), "timeout");
    }
}
