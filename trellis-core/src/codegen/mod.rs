use std::path::{Path, PathBuf};

/// Writes generated code to `path`, creating parent directories.
pub async fn write_to_disk(path: &Path, code: impl IntoCode) -> Result<(), CodegenError> {
    let string = code.into_code().into_string()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CodegenError::CreateDir {
                path: parent.to_owned(),
                source,
            })?;
    }
    tokio::fs::write(path, string)
        .await
        .map_err(|source| CodegenError::Write {
            path: path.to_owned(),
            source,
        })?;
    Ok(())
}

pub trait Code {
    /// Renders the code to source text.
    fn into_string(self) -> Result<String, FormattingError>;
}

impl Code for String {
    fn into_string(self) -> Result<String, FormattingError> {
        Ok(self)
    }
}

pub trait IntoCode {
    type Code: Code;

    fn into_code(self) -> Self::Code;
}

impl<T: Code> IntoCode for T {
    type Code = T;

    fn into_code(self) -> Self::Code {
        self
    }
}

/// Generated code couldn't be rendered to text.
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
#[error("failed to format {what}")]
#[diagnostic(code(trellis::format))]
pub struct FormattingError {
    pub what: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl FormattingError {
    pub fn new(
        what: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            what: what.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormattingError),
    #[error("failed to create directory `{}`", path.display())]
    #[diagnostic(code(trellis::write))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write `{}`", path.display())]
    #[diagnostic(code(trellis::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
