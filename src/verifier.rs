//! The verifying side of a composed statement.
//!
//! A [`Verifier`] borrows the statement it checks, is built fresh per
//! session, records the commitment it received and the challenge it issued,
//! and renders the accept/reject verdict. It carries no secret material.

use std::collections::BTreeMap;

use group::prime::PrimeGroup;
use rand_core::CryptoRngCore;
use tracing::instrument;

use crate::challenge::{random_challenge, Challenge};
use crate::composition::{Commitment, PreCommitment, Proof, Response};
use crate::errors::Error;
use crate::traits::{LeafVerifier, SecretName};

/// A per-session verifier for a composed statement.
pub struct Verifier<'a, G: PrimeGroup> {
    proof: &'a Proof<G>,
    node: VerifierNode<G>,
    commitment: Option<Commitment<G>>,
    challenge: Option<Challenge>,
}

/// The verifier tree mirroring the statement's shape.
enum VerifierNode<G: PrimeGroup> {
    Leaf(Box<dyn LeafVerifier<G>>),
    And(Vec<VerifierNode<G>>),
    Or(Vec<VerifierNode<G>>),
}

impl<G: PrimeGroup> Proof<G> {
    /// Derives a verifier for one session.
    pub fn get_verifier(&self) -> Verifier<'_, G> {
        Verifier {
            proof: self,
            node: VerifierNode::from_proof(self),
            commitment: None,
            challenge: None,
        }
    }
}

impl<'a, G: PrimeGroup> Verifier<'a, G> {
    /// Forwards the prover's auxiliary announcements to the leaves that
    /// expect one. Must run before [`send_challenge`](Self::send_challenge).
    pub fn process_precommitment(&mut self, precommitment: &PreCommitment<G>) {
        self.node.process_precommitment(precommitment);
    }

    /// Second move: records the received commitment and issues a uniform
    /// challenge in `[0, 2^L)` for this session.
    #[instrument(skip_all)]
    pub fn send_challenge(
        &mut self,
        commitment: Commitment<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Challenge {
        let challenge = random_challenge(rng);
        self.commitment = Some(commitment);
        self.challenge = Some(challenge);
        challenge
    }

    /// Fourth stage: renders the verdict for the received response.
    ///
    /// Accepts iff the responses are consistent across leaves sharing a
    /// secret name and the commitment recomputed from
    /// `(challenge, response)` equals the one received. `Ok(false)` is a
    /// rejected proof, including a response whose shape does not mirror
    /// the statement and a disjunction whose branch challenges do not sum
    /// to the issued challenge; `Err` means the session was run out of
    /// order (no commitment or challenge recorded yet).
    #[instrument(skip_all)]
    pub fn verify(&mut self, response: &Response<G>) -> Result<bool, Error> {
        let (Some(commitment), Some(challenge)) = (&self.commitment, self.challenge) else {
            return Err(Error::MissingCommitment);
        };
        let mut known: BTreeMap<SecretName, G::Scalar> = BTreeMap::new();
        if !self.node.check_responses_consistency(response, &mut known) {
            return Ok(false);
        }
        let recomputed = match self.proof.recompute_commitment(challenge, response) {
            Ok(commitment) => commitment,
            Err(Error::InconsistentChallenge) => return Ok(false),
            Err(err) => return Err(err),
        };
        Ok(recomputed == *commitment)
    }
}

impl<G: PrimeGroup> VerifierNode<G> {
    fn from_proof(proof: &Proof<G>) -> Self {
        match proof {
            Proof::Leaf(node) => VerifierNode::Leaf(node.statement.get_verifier()),
            Proof::And(and) => {
                VerifierNode::And(and.subproofs().iter().map(Self::from_proof).collect())
            }
            Proof::Or(or) => {
                VerifierNode::Or(or.subproofs().iter().map(Self::from_proof).collect())
            }
        }
    }

    fn process_precommitment(&mut self, precommitment: &PreCommitment<G>) {
        match (self, precommitment) {
            (VerifierNode::Leaf(leaf), PreCommitment::Leaf(data)) => {
                leaf.process_precommitment(data);
            }
            (VerifierNode::And(subs), PreCommitment::Nodes(slots)) => {
                for (sub, slot) in subs.iter_mut().zip(slots) {
                    if let Some(pre) = slot {
                        sub.process_precommitment(pre);
                    }
                }
            }
            // Disjunctions announce nothing; mismatched shapes are settled
            // by the commitment comparison in `verify`.
            _ => {}
        }
    }

    /// Conjunctions require leaves sharing a secret name to respond
    /// identically; disjunction branches are independent by construction
    /// and must not be cross-checked, so a disjunction is always
    /// consistent.
    fn check_responses_consistency(
        &self,
        response: &Response<G>,
        known: &mut BTreeMap<SecretName, G::Scalar>,
    ) -> bool {
        match (self, response) {
            (VerifierNode::Leaf(leaf), Response::Leaf(scalars)) => {
                leaf.check_responses_consistency(scalars, known)
            }
            (VerifierNode::And(subs), Response::And(responses)) => {
                subs.len() == responses.len()
                    && subs
                        .iter()
                        .zip(responses)
                        .all(|(sub, resp)| sub.check_responses_consistency(resp, known))
            }
            (VerifierNode::Or(_), Response::Or(_, _)) => true,
            _ => false,
        }
    }
}
