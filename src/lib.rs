//! # sigma-compose
//!
//! Composition of three-move Sigma-protocol zero-knowledge proofs.
//!
//! Atomic statements, each asserting a relation among secret witnesses and
//! public group elements, combine into AND/OR trees forming one interactive
//! proof of the compound claim ("I know `x` such that A, and either B or C
//! holds"). The crate drives both sides of the combined protocol:
//!
//! 1. the prover commits,
//! 2. the verifier issues a random `L`-bit challenge (`L = 128`),
//! 3. the prover responds,
//! 4. the verifier checks response consistency and recomputes the
//!    commitment to accept or reject.
//!
//! Disjunctions are proven with the standard simulation trick: the prover
//! simulates every branch it has no witness for under a freely chosen
//! challenge and assigns the one real branch the residual challenge, so all
//! branch challenges sum to the verifier's challenge modulo `2^L` without
//! revealing which branch was real.
//!
//! Atomic ("leaf") proof types are pluggable through the traits in
//! [`traits`]; a reference discrete-logarithm leaf ships in [`dlrep`].
//! Fiat-Shamir transforms, transcript serialization, and transport are out
//! of scope.
//!
//! ```no_run
//! use rand::rngs::OsRng;
//! use sigma_compose::test_utils::{dlog, pedersen};
//! use sigma_compose::Proof;
//!
//! type G = curve25519_dalek::ristretto::RistrettoPoint;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rng = OsRng;
//! let (knows_x, mut secrets) = dlog::<G>("x", &mut rng);
//! let (opens_c, opening) = pedersen::<G>("m", "r", &mut rng);
//! secrets.extend(opening);
//!
//! let statement = Proof::and(vec![knows_x, opens_c])?;
//!
//! let mut prover = statement.get_prover(&secrets, &mut rng)?;
//! let mut verifier = statement.get_verifier();
//!
//! let commitment = prover.commit(None, &mut rng)?;
//! let challenge = verifier.send_challenge(commitment, &mut rng);
//! let response = prover.compute_response(challenge)?;
//! assert!(verifier.verify(&response)?);
//! # Ok(())
//! # }
//! ```

pub mod challenge;
pub mod composition;
pub mod dlrep;
pub mod errors;
pub mod prover;
pub mod test_utils;
pub mod traits;
pub mod verifier;

pub use challenge::{Challenge, CHALLENGE_LENGTH};
pub use composition::{AndProof, Commitment, OrProof, PreCommitment, Proof, Response};
pub use errors::{ConstructionError, Error};
pub use prover::{AndProver, OrProver, Prover};
pub use verifier::Verifier;
