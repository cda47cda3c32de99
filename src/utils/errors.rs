use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetTranslatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(String),

    #[error("XLSX write error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to save output file: {0}")]
    FileSaveFailure(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Term not found: {0}")]
    TermNotFound(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SheetTranslatorError>;

/// Failure of a single vendor call.
///
/// These never leave the gateway as errors: they are folded into a
/// `TranslationResult::Failed` so the cell loop keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("API credentials not configured")]
    MissingCredentials,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("vendor error {code}: {message}")]
    VendorError { code: String, message: String },
}

/// Leading text of every marker produced by `GatewayError::marker`.
const MARKER_PREFIXES: [&str; 4] = [
    "[Translation error",
    "[Translation timeout]",
    "[Network error]",
    "[Parse error]",
];

impl GatewayError {
    /// Whether `line` begins with a failure marker.
    pub fn is_marker(line: &str) -> bool {
        MARKER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
    }

    /// Bracketed marker written into the cell in place of a translation.
    pub fn marker(&self, original: &str) -> String {
        match self {
            GatewayError::MissingCredentials => {
                format!("[Translation error: API credentials not configured] {}", original)
            }
            GatewayError::Timeout => format!("[Translation timeout] {}", original),
            GatewayError::Network(_) | GatewayError::HttpStatus(_) => {
                format!("[Network error] {}", original)
            }
            GatewayError::MalformedResponse(_) => format!("[Parse error] {}", original),
            GatewayError::VendorError { code, .. } => {
                format!("[Translation error: {}] {}", code, original)
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_bracketed_and_keep_the_original() {
        let kinds = vec![
            GatewayError::MissingCredentials,
            GatewayError::Timeout,
            GatewayError::Network("reset".to_string()),
            GatewayError::HttpStatus(502),
            GatewayError::MalformedResponse("eof".to_string()),
            GatewayError::VendorError {
                code: "54001".to_string(),
                message: "Invalid Sign".to_string(),
            },
        ];

        for kind in kinds {
            let marker = kind.marker("你好");
            assert!(marker.starts_with('['), "{}", marker);
            assert!(marker.ends_with("] 你好"), "{}", marker);
            assert!(GatewayError::is_marker(&marker), "{}", marker);
        }
    }

    #[test]
    fn ordinary_bracketed_text_is_not_a_marker() {
        assert!(!GatewayError::is_marker("[Draft] 你好"));
        assert!(!GatewayError::is_marker("Translation timeout"));
        assert!(!GatewayError::is_marker(""));
    }

    #[test]
    fn vendor_marker_carries_the_code() {
        let err = GatewayError::VendorError {
            code: "52003".to_string(),
            message: "UNAUTHORIZED USER".to_string(),
        };
        assert_eq!(err.marker("hello"), "[Translation error: 52003] hello");
    }
}
