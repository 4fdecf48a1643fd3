//! Maps `Box<dyn Error>` from the `PoseSource` boundary to typed `RepError`.
//!
//! The traits in `repcount_traits` stay error-agnostic; this module turns
//! whatever a source returns into our error enum, with an optional
//! feature-gated path for `repcount_sim::SimError` downcasting.

use crate::error::RepError;

/// Map a source-boundary error to a typed `RepError`.
///
/// Known simulator errors are downcast first, then the message is checked
/// for signs that the device itself is gone.
pub fn map_source_error(e: &(dyn std::error::Error + 'static)) -> RepError {
    #[cfg(feature = "sim-errors")]
    {
        if let Some(sim) = e.downcast_ref::<repcount_sim::SimError>() {
            return match sim {
                repcount_sim::SimError::NotOpened => {
                    RepError::Acquire(sim.to_string())
                }
                other => RepError::Source(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("unavailable") || lower.contains("not opened") {
        RepError::Acquire(s)
    } else {
        RepError::Source(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_errors_fall_back_to_message_heuristics() {
        let e = std::io::Error::other("camera unavailable");
        assert!(matches!(map_source_error(&e), RepError::Acquire(_)));
        let e = std::io::Error::other("decode failed");
        assert_eq!(map_source_error(&e), RepError::Source("decode failed".into()));
    }

    #[cfg(feature = "sim-errors")]
    #[test]
    fn sim_errors_are_downcast() {
        let e = repcount_sim::SimError::UnknownKeypoint {
            frame: 3,
            name: "tail".into(),
        };
        assert!(matches!(map_source_error(&e), RepError::Source(_)));
        assert!(matches!(
            map_source_error(&repcount_sim::SimError::NotOpened),
            RepError::Acquire(_)
        ));
    }
}
