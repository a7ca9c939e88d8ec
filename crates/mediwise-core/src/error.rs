//! Analysis error taxonomy.

use std::fmt;
use std::time::Duration;

use mediwise_ocr::OcrError;
use thiserror::Error;

/// Caller-visible error category. Each kind gets its own user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OcrFailure,
    UnreadableDocument,
    ModelUnavailable,
    PredictionError,
    NoRecommendation,
    NotAvailable,
    Timeout,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::OcrFailure => "OCR_FAILURE",
            ErrorKind::UnreadableDocument => "UNREADABLE_DOCUMENT",
            ErrorKind::ModelUnavailable => "MODEL_UNAVAILABLE",
            ErrorKind::PredictionError => "PREDICTION_ERROR",
            ErrorKind::NoRecommendation => "NO_RECOMMENDATION",
            ErrorKind::NotAvailable => "NOT_AVAILABLE",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::OcrFailure => "We could not read this image. Please upload a clearer photo or scan.",
            ErrorKind::UnreadableDocument => {
                "Unable to determine - no readable blood-count values were found in this report."
            }
            ErrorKind::ModelUnavailable => "Report analysis is temporarily unavailable.",
            ErrorKind::PredictionError => "Something went wrong while analysing this report.",
            ErrorKind::NoRecommendation => "Analysis finished but no care guidance is available for this result.",
            ErrorKind::NotAvailable => "No matching medicines were found in stock.",
            ErrorKind::Timeout => "Analysis took too long. Please try again later.",
        }
    }

    /// Data or operational defects that should alert an operator rather than
    /// prompt the user to retry.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            ErrorKind::ModelUnavailable | ErrorKind::PredictionError | ErrorKind::NoRecommendation
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors from the clinical report pipeline. Never retried automatically.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("OCR failed: {0}")]
    OcrFailure(#[from] OcrError),

    #[error("No readable data found matching expected metrics")]
    UnreadableDocument,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("No recommendation row for label: {0}")]
    NoRecommendation(String),

    #[error("Analysis did not finish within {0:?}")]
    Timeout(Duration),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::OcrFailure(_) => ErrorKind::OcrFailure,
            AnalysisError::UnreadableDocument => ErrorKind::UnreadableDocument,
            AnalysisError::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            AnalysisError::Prediction(_) => ErrorKind::PredictionError,
            AnalysisError::NoRecommendation(_) => ErrorKind::NoRecommendation,
            AnalysisError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(AnalysisError::UnreadableDocument.kind().code(), "UNREADABLE_DOCUMENT");
        assert_eq!(
            AnalysisError::OcrFailure(OcrError::UndecodableImage("x".into())).kind(),
            ErrorKind::OcrFailure
        );
        assert_eq!(
            AnalysisError::Timeout(Duration::from_secs(1)).kind().to_string(),
            "TIMEOUT"
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            ErrorKind::OcrFailure,
            ErrorKind::UnreadableDocument,
            ErrorKind::ModelUnavailable,
            ErrorKind::PredictionError,
            ErrorKind::NoRecommendation,
            ErrorKind::NotAvailable,
            ErrorKind::Timeout,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }

    #[test]
    fn test_operational_kinds() {
        assert!(ErrorKind::NoRecommendation.is_operational());
        assert!(ErrorKind::PredictionError.is_operational());
        assert!(!ErrorKind::OcrFailure.is_operational());
        assert!(!ErrorKind::UnreadableDocument.is_operational());
    }
}
