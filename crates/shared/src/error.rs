use thiserror::Error;

/// Form input that must be present before a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    File,
    Question,
    Countries,
    Indicators,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::File => "file",
            FormField::Question => "question",
            FormField::Countries => "countries",
            FormField::Indicators => "indicators",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("server unreachable: {reason}")]
    Connection { reason: String },
    #[error("api error {code}: {detail}")]
    Api { code: u16, detail: String },
    #[error("missing required input: {field}")]
    Validation { field: FormField },
    #[error("malformed response payload: {reason}")]
    Decode { reason: String },
}

impl ClientError {
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    pub fn api(code: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            code,
            detail: detail.into(),
        }
    }

    pub fn validation(field: FormField) -> Self {
        Self::Validation { field }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
