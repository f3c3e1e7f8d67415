//! Failures of a `spritefield` invocation and the exit status each one maps to.
//!
//! | status | cause |
//! |--------|-------|
//! | 0  | frames written or listing printed |
//! | 2  | rejected by clap before `run` starts |
//! | 10 | the engine refused the request (zero-sized canvas, malformed state document) |
//! | 11 | reading `--state` or writing a frame failed |
//! | 12 | `--params` is not JSON or names a field the generator state lacks |
//! | 13 | the `--json` report could not be encoded |

use spritefield_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(EngineError),
    /// Filesystem trouble around state files and PNG frames.
    #[error("{0}")]
    Io(String),
    /// Overrides given on the command line that the state does not accept.
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// Frame writes surface as `EngineError::Io`; those keep the I/O status.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_failure_class_has_its_own_status() {
        let codes = [
            CliError::Engine(EngineError::InvalidDimensions).exit_code(),
            CliError::Io("state.json: not found".into()).exit_code(),
            CliError::Input("unknown key `warp`".into()).exit_code(),
            CliError::Serialization("report".into()).exit_code(),
        ];
        assert_eq!(codes, [10, 11, 12, 13]);
    }

    #[test]
    fn failed_frame_write_keeps_the_io_status() {
        let err = CliError::from(EngineError::Io("frame-0003.png: read-only filesystem".into()));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("frame-0003.png"));
    }

    #[test]
    fn malformed_state_document_is_an_engine_failure() {
        let err = CliError::from(
            spritefield_core::GeneratorState::from_json(r#"{"density": "lots"}"#).unwrap_err(),
        );
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().starts_with("invalid generator state"));
    }

    #[test]
    fn zero_sized_canvas_message_passes_through_unchanged() {
        let err = CliError::from(EngineError::InvalidDimensions);
        assert_eq!(err.to_string(), EngineError::InvalidDimensions.to_string());
    }

    #[test]
    fn json_encoder_failures_map_to_serialization() {
        let broken = serde_json::from_str::<serde_json::Value>("{\"palettes\": [").unwrap_err();
        assert_eq!(CliError::from(broken).exit_code(), 13);
    }
}
