use std::io;

/// All error types for the cardboard atlas engine.
#[derive(thiserror::Error, Debug)]
pub enum AtlasError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("Geometry error: {0}")]
    Geometry(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Snapshot error: {0}")]
    Snapshot(String),
    #[error("Atlas full: no free {width}x{height} region")]
    AtlasFull { width: u32, height: u32 },
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_strings() {
        let e = AtlasError::Input("bad file".into());
        assert_eq!(e.to_string(), "Input error: bad file");

        let e = AtlasError::Geometry("collinear triangle".into());
        assert_eq!(e.to_string(), "Geometry error: collinear triangle");

        let e = AtlasError::Decode("truncated PNG".into());
        assert_eq!(e.to_string(), "Decode error: truncated PNG");

        let e = AtlasError::Snapshot("missing type".into());
        assert_eq!(e.to_string(), "Snapshot error: missing type");

        let e = AtlasError::AtlasFull {
            width: 64,
            height: 32,
        };
        assert_eq!(e.to_string(), "Atlas full: no free 64x32 region");

        let e = AtlasError::Output("disk full".into());
        assert_eq!(e.to_string(), "Output error: disk full");
    }

    #[test]
    fn from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let e: AtlasError = io_err.into();
        assert!(matches!(e, AtlasError::Io(_)));
        assert!(e.to_string().contains("file missing"));
    }
}
