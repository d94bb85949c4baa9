//! Error types for proof composition.
//!
//! Two families of failures exist and are kept apart on purpose:
//! - [`ConstructionError`]: the statement itself is malformed. Raised while
//!   building a proof tree, never while running a session. The caller must
//!   restructure the statement; retrying is pointless.
//! - [`Error`]: a failure during a prove/verify session.
//!
//! A proof being *rejected* is not an error: consistency checks return
//! `false` and [`Verifier::verify`](crate::verifier::Verifier::verify)
//! returns `Ok(false)`.

use crate::traits::SecretName;

/// A statement could not be built.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    /// A conjunction or disjunction was given zero subproofs.
    #[error("composition needs at least one subproof")]
    EmptyComposition,
    /// A secret appears both inside a disjunction and elsewhere in the
    /// statement, which would break zero-knowledge or soundness.
    #[error("or-flaw: secret `{name}` is shared across a disjunction boundary")]
    OrFlaw {
        /// The offending secret name.
        name: SecretName,
    },
    /// A leaf declared secret names and generators of different lengths.
    #[error("leaf secret names and generators are not positionally aligned")]
    MisalignedLeaf,
}

/// A failure during the execution of a proof session.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No branch of the disjunction is provable with the supplied secrets.
    #[error("no provable branch in the disjunction for the supplied secrets")]
    NoProvableBranch,
    /// `commit` was invoked on a prover with no real branch.
    #[error("cannot commit: this prover can only simulate")]
    CannotCommit,
    /// The per-branch challenges of a disjunction do not sum to the
    /// challenge the node received. Callers must treat this exactly like a
    /// rejected proof.
    #[error("branch challenges do not sum to the proof challenge")]
    InconsistentChallenge,
    /// A commitment or response does not mirror the shape of the proof tree.
    #[error("transcript shape does not match the proof tree")]
    MalformedTranscript,
    /// A leaf was asked to prove with an incomplete witness mapping.
    #[error("missing value for secret `{name}`")]
    MissingSecret {
        /// The secret the leaf required but was not given.
        name: SecretName,
    },
    /// A response or verdict was requested before the corresponding
    /// commitment or challenge existed.
    #[error("session stage requested out of order")]
    MissingCommitment,
}
