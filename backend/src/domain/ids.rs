//! Opaque entity identifiers.
//!
//! Every stored entity is keyed by a UUID string. The newtypes keep the
//! raw string alongside the parsed UUID so storage keys and serialised
//! documents carry exactly the bytes that were validated.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors shared by all identifier newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The identifier string was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// The identifier string was not a valid UUID.
    #[error("{0} must be a valid UUID")]
    Malformed(&'static str),
}

macro_rules! uuid_id {
    ($(#[$docs:meta])* $name:ident, $label:literal) => {
        $(#[$docs])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid, String);

        impl $name {
            /// Validate and construct an identifier from borrowed input.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                Self::from_owned(id.as_ref().to_owned())
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                let uuid = Uuid::new_v4();
                Self(uuid, uuid.to_string())
            }

            fn from_owned(id: String) -> Result<Self, IdValidationError> {
                if id.is_empty() {
                    return Err(IdValidationError::Empty($label));
                }
                let parsed =
                    Uuid::parse_str(&id).map_err(|_| IdValidationError::Malformed($label))?;
                Ok(Self(parsed, id))
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.1.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                let $name(_, raw) = value;
                raw
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_owned(value)
            }
        }
    };
}

uuid_id!(
    /// Stable user identifier.
    UserId,
    "user id"
);

uuid_id!(
    /// Stable question identifier.
    QuestionId,
    "question id"
);

uuid_id!(
    /// Stable submission identifier.
    SubmissionId,
    "submission id"
);

#[cfg(test)]
mod tests {
    //! Identifier validation coverage.
    use super::*;
    use rstest::rstest;

    const VALID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[rstest]
    fn accepts_valid_uuid_strings() {
        let id = UserId::new(VALID).expect("valid uuid");
        assert_eq!(id.as_ref(), VALID);
        assert_eq!(id.to_string(), VALID);
    }

    #[rstest]
    fn rejects_empty_input() {
        let err = QuestionId::new("").expect_err("empty id");
        assert_eq!(err, IdValidationError::Empty("question id"));
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_input(#[case] raw: &str) {
        let err = SubmissionId::new(raw).expect_err("malformed id");
        assert_eq!(err, IdValidationError::Malformed("submission id"));
    }

    #[rstest]
    fn random_ids_are_distinct() {
        assert_ne!(UserId::random(), UserId::random());
    }

    #[rstest]
    fn serde_round_trip_preserves_raw_string() {
        let id = UserId::new(VALID).expect("valid uuid");
        let json = serde_json::to_string(&id).expect("serialises");
        assert_eq!(json, format!("\"{VALID}\""));
        let restored: UserId = serde_json::from_str(&json).expect("deserialises");
        assert_eq!(restored, id);
    }
}
