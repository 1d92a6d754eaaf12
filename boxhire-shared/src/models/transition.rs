/// Errors raised by the workflow state machines
///
/// Collaborations and jobs both move through their states with a conditional
/// `UPDATE ... WHERE status = <expected>`. When that update touches no row the
/// caller re-reads the row to tell a missing record apart from a stale or
/// illegal transition.

/// Failure of a status transition
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// The record does not exist, or belongs to another organisation
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// The record exists but its current status does not allow the move
    #[error("cannot move {entity} from {from} to {to}")]
    Invalid {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TransitionError {
    pub fn invalid(entity: &'static str, from: impl ToString, to: impl ToString) -> Self {
        TransitionError::Invalid {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TransitionError::NotFound { entity: "job" };
        assert_eq!(err.to_string(), "job not found");

        let err = TransitionError::invalid("collaboration", "ACCEPTED", "REJECTED");
        assert_eq!(
            err.to_string(),
            "cannot move collaboration from ACCEPTED to REJECTED"
        );
    }
}
