use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;
use crate::model::ResultStatus;

/// Estado de un tab durante una pasada.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Rendering`
/// - `Rendering` -> `Ok` | `Error` | `Unreachable`
///
/// Mientras el tab no llega a un estado terminal su shape en el registro es
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderState {
    Pending,
    Rendering,
    Ok,
    Error,
    Unreachable,
}

impl RenderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RenderState::Ok | RenderState::Error | RenderState::Unreachable)
    }

    pub fn advance(self, next: RenderState) -> Result<RenderState, CoreEngineError> {
        let valid = match self {
            RenderState::Pending => next == RenderState::Rendering,
            RenderState::Rendering => next.is_terminal(),
            _ => false,
        };
        if valid {
            Ok(next)
        } else {
            Err(CoreEngineError::InvalidTransition { from: format!("{self:?}"),
                                                     to: format!("{next:?}") })
        }
    }
}

impl From<ResultStatus> for RenderState {
    fn from(status: ResultStatus) -> Self {
        match status {
            ResultStatus::Ok => RenderState::Ok,
            ResultStatus::Error => RenderState::Error,
            ResultStatus::Unreachable => RenderState::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_forward_transitions() {
        let rendering = RenderState::Pending.advance(RenderState::Rendering).expect("pending -> rendering");
        assert_eq!(rendering.advance(RenderState::Error), Ok(RenderState::Error));
        assert!(RenderState::Pending.advance(RenderState::Ok).is_err());
        assert!(RenderState::Ok.advance(RenderState::Rendering).is_err());
        assert_eq!(RenderState::from(ResultStatus::Unreachable), RenderState::Unreachable);
    }
}
