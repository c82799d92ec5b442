use std::path::PathBuf;

use thiserror::Error;

/// Failure of the one-time font resource provisioning step.
///
/// Never fatal: the document is still attempted with whatever metrics can be loaded.
#[derive(Debug, Error)]
pub enum ResourceInitializationError {
    #[error("font source directory is not configured and {runtime_dir} is missing {missing}")]
    NoSource { runtime_dir: PathBuf, missing: String },

    #[error("could not provision font resource {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The single error surfaced by document generation.
#[derive(Debug, Error)]
pub enum DocumentGenerationError {
    #[error(
        "PDF generation failed: the font resources required by the renderer are not compatible \
         with this runtime ({0})"
    )]
    Construction(String),

    #[error("PDF generation failed while writing the document: {0}")]
    Stream(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    Render(String),
}

impl DocumentGenerationError {
    /// Classifies a free-form failure message.
    ///
    /// Font and missing-file failures are reported as a construction problem,
    /// everything else as a generic rendering failure.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains("font") || message.contains("ENOENT") || lowered.contains("no such file") {
            DocumentGenerationError::Construction(message)
        } else {
            DocumentGenerationError::Render(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_font_messages() {
        assert!(matches!(
            DocumentGenerationError::classify("Font 'Helvetica' failed to load"),
            DocumentGenerationError::Construction(_)
        ));
        assert!(matches!(
            DocumentGenerationError::classify("ENOENT: data/Helvetica.afm"),
            DocumentGenerationError::Construction(_)
        ));
        assert!(matches!(
            DocumentGenerationError::classify("No such file or directory (os error 2)"),
            DocumentGenerationError::Construction(_)
        ));
    }

    #[test]
    fn test_classify_other_messages() {
        let err = DocumentGenerationError::classify("index out of bounds");
        assert!(matches!(err, DocumentGenerationError::Render(_)));
        assert_eq!(err.to_string(), "PDF generation failed: index out of bounds");
    }
}
