use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrectionError {
    #[error("No usable GPU backend: {message}")]
    UnsupportedBackend { message: String },

    #[error("Unsupported texture format: {message}")]
    UnsupportedTextureFormat { message: String },

    #[error("Image {width}x{height} exceeds the maximum texture dimension {max}")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Shader compilation failed: {message}")]
    ShaderCompilation { message: String },

    #[error("Program link failed: {message}")]
    ProgramLink { message: String },

    #[error("Render failed: {message}")]
    Render { message: String },
}

pub type Result<T> = std::result::Result<T, CorrectionError>;

impl CorrectionError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CorrectionError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Returns true if the caller can fix the input and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CorrectionError::InvalidParameter { .. })
    }

    /// Returns a user-friendly error message with recovery suggestions
    pub fn user_message(&self) -> String {
        let base_message = self.to_string();
        let suggestion = match self {
            CorrectionError::UnsupportedBackend { .. } => "No GPU is available. Processing can continue on the CPU, which may be slower.",
            CorrectionError::UnsupportedTextureFormat { .. } => "The graphics driver cannot hold images of arbitrary size. Try updating drivers or use CPU processing.",
            CorrectionError::ImageTooLarge { .. } => "Downscale the image and try again.",
            CorrectionError::InvalidParameter { .. } => "Check the entered values and try again.",
            CorrectionError::ShaderCompilation { .. } | CorrectionError::ProgramLink { .. } => "The graphics driver rejected the correction program. Use CPU processing instead.",
            CorrectionError::Render { .. } => "Rendering failed. Check system resources or switch to CPU processing.",
        };

        format!("{}\n\n{}", base_message, suggestion)
    }

    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CorrectionError::UnsupportedBackend { .. } => "UNSUPPORTED_BACKEND",
            CorrectionError::UnsupportedTextureFormat { .. } => "UNSUPPORTED_TEXTURE_FORMAT",
            CorrectionError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            CorrectionError::InvalidParameter { .. } => "INVALID_PARAMETER",
            CorrectionError::ShaderCompilation { .. } => "SHADER_COMPILATION_FAILURE",
            CorrectionError::ProgramLink { .. } => "PROGRAM_LINK_FAILURE",
            CorrectionError::Render { .. } => "RENDER_FAILURE",
        }
    }
}
