//! The contract between the composition layer and atomic ("leaf") proofs.
//!
//! A leaf implements a single algebraic relation (e.g. knowledge of a
//! discrete logarithm) as a three-move Sigma protocol. The composition layer
//! never looks inside a leaf: it only relies on the commit / response /
//! simulate primitives below, plus the ordered secret names and generators
//! each leaf declares. All three traits are dyn-compatible so a proof tree
//! can mix leaf types behind `Box<dyn _>`.
//!
//! Leaves speak in flat vectors (`Vec<G>` commitments, `Vec<G::Scalar>`
//! responses, positionally aligned with `secret_names`); the composition
//! layer wraps those into its recursive transcript enums.

use std::collections::BTreeMap;

use group::Group;
use group::prime::PrimeGroup;
use rand_core::CryptoRngCore;

use crate::challenge::Challenge;
use crate::errors::Error;

/// An opaque identifier for a witness value.
///
/// The same name may appear in several leaves under one conjunction to state
/// that a single witness satisfies several relations; it must never cross a
/// disjunction boundary.
pub type SecretName = String;

/// A witness mapping: the secret values a prover knows, keyed by name.
pub type Secrets<G> = BTreeMap<SecretName, <G as Group>::Scalar>;

/// Per-session blinding scalars, keyed by the secret name they blind.
pub type Randomizers<G> = BTreeMap<SecretName, <G as Group>::Scalar>;

/// An atomic proof statement.
pub trait LeafStatement<G: PrimeGroup> {
    /// The ordered secret names this relation is over. `secret_names()[i]`
    /// corresponds to `generators()[i]` and to the i-th response slot.
    fn secret_names(&self) -> &[SecretName];

    /// The public group elements, positionally aligned with `secret_names`.
    fn generators(&self) -> &[G];

    /// A stable label describing this statement's shape, used for
    /// transcript and type identification. Not a cryptographic binding.
    fn proof_id(&self) -> String;

    /// Instantiates a prover holding the given witnesses.
    ///
    /// The mapping must cover every name in `secret_names`; leaves report a
    /// missing entry with [`Error::MissingSecret`].
    fn get_prover(&self, secrets: &Secrets<G>) -> Result<Box<dyn LeafProver<G>>, Error>;

    /// Instantiates a verifier. Carries no secret material.
    fn get_verifier(&self) -> Box<dyn LeafVerifier<G>>;

    /// Instantiates a prover that holds no witnesses and can only produce
    /// simulated transcripts.
    fn get_simulator(&self) -> Box<dyn LeafProver<G>>;

    /// Recomputes the commitment implied by `(challenge, response)`.
    ///
    /// The verifier accepts iff this equals the commitment it originally
    /// received.
    fn recompute_commitment(
        &self,
        challenge: Challenge,
        response: &[G::Scalar],
    ) -> Result<Vec<G>, Error>;
}

/// The proving side of a leaf, holding per-session state.
pub trait LeafProver<G: PrimeGroup> {
    /// The ordered secret names of the underlying statement.
    fn secret_names(&self) -> &[SecretName];

    /// Draws one fresh randomizer per unique secret name.
    fn get_randomizers(&self, rng: &mut dyn CryptoRngCore) -> Randomizers<G>;

    /// Auxiliary data some leaves must announce before the challenge is
    /// issued. Most leaves need none.
    fn precommit(&mut self) -> Option<Vec<G>> {
        None
    }

    /// First move: produces the commitment.
    ///
    /// When `randomizers` is supplied (by an enclosing conjunction sharing
    /// blinding across leaves), entries present in it must be used as-is;
    /// any missing name is filled with a fresh draw.
    fn commit(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Vec<G>, Error>;

    /// Third move: the response under the received challenge, using the
    /// randomizers fixed at commit time.
    fn compute_response(&mut self, challenge: Challenge) -> Result<Vec<G::Scalar>, Error>;

    /// Produces a `(commitment, challenge, response)` triple that verifies
    /// under an arbitrary challenge, without using any witness.
    ///
    /// `randomizers` and `challenge` are drawn fresh when absent; a supplied
    /// randomizer doubles as the simulated response for its name, which is
    /// what keeps simulated responses consistent across leaves sharing a
    /// secret under a conjunction.
    fn simulate_proof(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        challenge: Option<Challenge>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(Vec<G>, Challenge, Vec<G::Scalar>), Error>;
}

/// The verifying side of a leaf. Holds only public data.
pub trait LeafVerifier<G: PrimeGroup> {
    /// Checks that this leaf's responses agree with those already recorded
    /// for the same secret names, extending `known` with new entries.
    ///
    /// Returning `false` rejects the proof; it is not an error.
    fn check_responses_consistency(
        &self,
        response: &[G::Scalar],
        known: &mut BTreeMap<SecretName, G::Scalar>,
    ) -> bool;

    /// Receives the auxiliary data announced by `precommit`, if any.
    fn process_precommitment(&mut self, _data: &[G]) {}
}
