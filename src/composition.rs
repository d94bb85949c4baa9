//! AND/OR composition of Sigma-protocol statements.
//!
//! This module defines the [`Proof`] enum, which combines atomic
//! [`LeafStatement`]s into conjunctions ([`AndProof`]) and disjunctions
//! ([`OrProof`]) forming a single three-move proof of the compound claim.
//!
//! A [`Proof`] is an immutable statement template: build it once, validate it
//! at construction, then derive as many per-session
//! [`Prover`](crate::prover::Prover) and
//! [`Verifier`](crate::verifier::Verifier) trees from it as needed.
//!
//! ## Example composition
//!
//! ```ignore
//! And(
//!    Or(dlog_a, dlog_b),
//!    pedersen_opening,
//! )
//! ```
//!
//! Secret names may repeat across leaves under a conjunction to assert that
//! one witness satisfies several relations. A name must never appear both
//! inside a disjunction and elsewhere in the statement ("or-flaw"): the
//! verifier cannot cross-check responses between branches of a disjunction,
//! so such sharing would let a prover equivocate. This is rejected once, at
//! construction time.

use std::collections::BTreeSet;

use group::prime::PrimeGroup;

use crate::challenge::{residual_challenge, Challenge};
use crate::errors::{ConstructionError, Error};
use crate::traits::{LeafStatement, SecretName};

/// A compound proof statement: a tree of leaves combined by AND/OR.
pub enum Proof<G: PrimeGroup> {
    /// An atomic statement supplied by the leaf layer.
    Leaf(LeafNode<G>),
    /// All subproofs must hold.
    And(AndProof<G>),
    /// At least one subproof must hold; which one is not revealed.
    Or(OrProof<G>),
}

/// A leaf statement wrapped with its composition-level attributes.
pub struct LeafNode<G: PrimeGroup> {
    pub(crate) statement: Box<dyn LeafStatement<G>>,
    pub(crate) simulate: bool,
}

/// A conjunction of subproofs.
pub struct AndProof<G: PrimeGroup> {
    pub(crate) subproofs: Vec<Proof<G>>,
    pub(crate) secret_names: Vec<SecretName>,
    pub(crate) generators: Vec<G>,
    pub(crate) simulate: bool,
}

/// A disjunction of subproofs.
pub struct OrProof<G: PrimeGroup> {
    pub(crate) subproofs: Vec<Proof<G>>,
    pub(crate) secret_names: Vec<SecretName>,
    pub(crate) generators: Vec<G>,
    pub(crate) simulate: bool,
}

/// A commitment mirroring the shape of the proof tree it was produced by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commitment<G: PrimeGroup> {
    /// A leaf's commitment, one group element per relation row.
    Leaf(Vec<G>),
    /// Positional commitments of a conjunction's subproofs.
    And(Vec<Commitment<G>>),
    /// Positional commitments of a disjunction's branches.
    Or(Vec<Commitment<G>>),
}

/// A response mirroring the shape of the proof tree.
///
/// The `Or` variant carries the full ordered per-branch challenge list next
/// to the per-branch responses: the verifier cannot check challenge
/// conservation without seeing every branch challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response<G: PrimeGroup> {
    /// A leaf's responses, positionally aligned with its secret names.
    Leaf(Vec<G::Scalar>),
    /// Positional responses of a conjunction's subproofs.
    And(Vec<Response<G>>),
    /// Per-branch challenges and responses of a disjunction.
    Or(Vec<Challenge>, Vec<Response<G>>),
}

/// Auxiliary data some leaves announce before the challenge is issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreCommitment<G: PrimeGroup> {
    /// A leaf's auxiliary announcement.
    Leaf(Vec<G>),
    /// Positional announcements of a conjunction's subproofs; `None` for
    /// subproofs that announced nothing.
    Nodes(Vec<Option<PreCommitment<G>>>),
}

impl<G: PrimeGroup> Proof<G> {
    /// Wraps an atomic statement as a proof tree leaf.
    ///
    /// Fails with [`ConstructionError::MisalignedLeaf`] if the statement's
    /// secret names and generators differ in length.
    pub fn leaf(
        statement: impl LeafStatement<G> + 'static,
    ) -> Result<Self, ConstructionError> {
        if statement.secret_names().len() != statement.generators().len() {
            return Err(ConstructionError::MisalignedLeaf);
        }
        Ok(Proof::Leaf(LeafNode {
            statement: Box::new(statement),
            simulate: false,
        }))
    }

    /// Builds the conjunction of `subproofs`. See [`AndProof::new`].
    pub fn and(subproofs: Vec<Proof<G>>) -> Result<Self, ConstructionError> {
        AndProof::new(subproofs).map(Proof::And)
    }

    /// Builds the disjunction of `subproofs`. See [`OrProof::new`].
    pub fn or(subproofs: Vec<Proof<G>>) -> Result<Self, ConstructionError> {
        OrProof::new(subproofs).map(Proof::Or)
    }

    /// The ordered secret names of this subtree.
    pub fn secret_names(&self) -> &[SecretName] {
        match self {
            Proof::Leaf(node) => node.statement.secret_names(),
            Proof::And(and) => &and.secret_names,
            Proof::Or(or) => &or.secret_names,
        }
    }

    /// The public generators of this subtree, aligned with `secret_names`.
    pub fn generators(&self) -> &[G] {
        match self {
            Proof::Leaf(node) => node.statement.generators(),
            Proof::And(and) => &and.generators,
            Proof::Or(or) => &or.generators,
        }
    }

    /// A stable label of the tree shape, for transcript and type
    /// identification. Not a cryptographic binding.
    pub fn proof_id(&self) -> String {
        match self {
            Proof::Leaf(node) => node.statement.proof_id(),
            Proof::And(and) => {
                let ids: Vec<String> = and.subproofs.iter().map(Proof::proof_id).collect();
                format!("And({})", ids.join(","))
            }
            Proof::Or(or) => {
                let ids: Vec<String> = or.subproofs.iter().map(Proof::proof_id).collect();
                format!("Or({})", ids.join(","))
            }
        }
    }

    /// Marks this node as simulation-only: no witness is available and every
    /// prover derived from it can only produce simulated transcripts.
    pub fn set_simulate(&mut self) {
        match self {
            Proof::Leaf(node) => node.simulate = true,
            Proof::And(and) => and.simulate = true,
            Proof::Or(or) => or.simulate = true,
        }
    }

    /// Whether this node was marked simulation-only.
    pub fn is_simulate(&self) -> bool {
        match self {
            Proof::Leaf(node) => node.simulate,
            Proof::And(and) => and.simulate,
            Proof::Or(or) => or.simulate,
        }
    }

    /// Recomputes the commitment implied by `(challenge, response)`,
    /// recursing structurally; the cryptographic recomputation happens at
    /// the leaves.
    ///
    /// For a disjunction, challenge conservation (the branch challenges
    /// summing to `challenge` mod `2^L`) is validated first and its failure
    /// reported as [`Error::InconsistentChallenge`]; callers must treat
    /// that exactly like a rejected proof.
    pub fn recompute_commitment(
        &self,
        challenge: Challenge,
        response: &Response<G>,
    ) -> Result<Commitment<G>, Error> {
        match (self, response) {
            (Proof::Leaf(node), Response::Leaf(scalars)) => node
                .statement
                .recompute_commitment(challenge, scalars)
                .map(Commitment::Leaf),
            (Proof::And(and), Response::And(responses)) => {
                if responses.len() != and.subproofs.len() {
                    return Err(Error::MalformedTranscript);
                }
                let commitments = and
                    .subproofs
                    .iter()
                    .zip(responses)
                    .map(|(sub, resp)| sub.recompute_commitment(challenge, resp))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Commitment::And(commitments))
            }
            (Proof::Or(or), Response::Or(branch_challenges, responses)) => {
                if branch_challenges.len() != or.subproofs.len()
                    || responses.len() != or.subproofs.len()
                {
                    return Err(Error::MalformedTranscript);
                }
                if residual_challenge(branch_challenges, challenge) != 0 {
                    return Err(Error::InconsistentChallenge);
                }
                let commitments = or
                    .subproofs
                    .iter()
                    .zip(branch_challenges)
                    .zip(responses)
                    .map(|((sub, ch), resp)| sub.recompute_commitment(*ch, resp))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Commitment::Or(commitments))
            }
            _ => Err(Error::MalformedTranscript),
        }
    }
}

impl<G: PrimeGroup> AndProof<G> {
    /// Builds the conjunction of an explicit ordered sequence of subproofs.
    ///
    /// Fails with [`ConstructionError::EmptyComposition`] on an empty
    /// sequence, and with [`ConstructionError::OrFlaw`] if any secret name
    /// is shared across a disjunction boundary anywhere in the subtree.
    pub fn new(subproofs: Vec<Proof<G>>) -> Result<Self, ConstructionError> {
        if subproofs.is_empty() {
            return Err(ConstructionError::EmptyComposition);
        }
        check_or_scope(&subproofs, &BTreeSet::new())?;
        let (secret_names, generators) = collect_names_and_generators(&subproofs);
        Ok(AndProof {
            subproofs,
            secret_names,
            generators,
            simulate: false,
        })
    }

    /// The ordered subproofs of this conjunction.
    pub fn subproofs(&self) -> &[Proof<G>] {
        &self.subproofs
    }
}

impl<G: PrimeGroup> OrProof<G> {
    /// Builds the disjunction of an explicit ordered sequence of subproofs.
    ///
    /// Fails with [`ConstructionError::EmptyComposition`] on an empty
    /// sequence, and with [`ConstructionError::OrFlaw`] if two branches
    /// share a secret name: branch responses are never cross-checked, so a
    /// shared name would be unsound.
    pub fn new(subproofs: Vec<Proof<G>>) -> Result<Self, ConstructionError> {
        if subproofs.is_empty() {
            return Err(ConstructionError::EmptyComposition);
        }
        for (i, branch) in subproofs.iter().enumerate() {
            let names: BTreeSet<&SecretName> = branch.secret_names().iter().collect();
            for other in &subproofs[i + 1..] {
                if let Some(name) = other.secret_names().iter().find(|n| names.contains(n)) {
                    return Err(ConstructionError::OrFlaw { name: name.clone() });
                }
            }
        }
        let (secret_names, generators) = collect_names_and_generators(&subproofs);
        Ok(OrProof {
            subproofs,
            secret_names,
            generators,
            simulate: false,
        })
    }

    /// The ordered branches of this disjunction.
    pub fn subproofs(&self) -> &[Proof<G>] {
        &self.subproofs
    }
}

/// Concatenates the subproofs' secret names and generators, preserving
/// order and duplicates so positional alignment survives composition.
fn collect_names_and_generators<G: PrimeGroup>(
    subproofs: &[Proof<G>],
) -> (Vec<SecretName>, Vec<G>) {
    let mut names = Vec::new();
    let mut generators = Vec::new();
    for sub in subproofs {
        names.extend_from_slice(sub.secret_names());
        generators.extend_from_slice(sub.generators());
    }
    (names, generators)
}

/// Walks a conjunction's subproofs looking for secret names that cross a
/// disjunction boundary.
///
/// `forbidden` accumulates the names visible in enclosing AND scopes. A
/// disjunction child must be disjoint from that set and from all of its
/// siblings; a conjunction child recurses with the set extended by its
/// siblings' names. The set is copied per recursive call, never shared.
fn check_or_scope<G: PrimeGroup>(
    subproofs: &[Proof<G>],
    forbidden: &BTreeSet<SecretName>,
) -> Result<(), ConstructionError> {
    for (i, sub) in subproofs.iter().enumerate() {
        match sub {
            Proof::Leaf(_) => {}
            Proof::Or(or) => {
                if let Some(name) = or
                    .secret_names
                    .iter()
                    .find(|name| forbidden.contains(*name))
                {
                    return Err(ConstructionError::OrFlaw { name: name.clone() });
                }
                for (j, sibling) in subproofs.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    if let Some(name) = or
                        .secret_names
                        .iter()
                        .find(|name| sibling.secret_names().contains(name))
                    {
                        return Err(ConstructionError::OrFlaw { name: name.clone() });
                    }
                }
            }
            Proof::And(and) => {
                let mut nested = forbidden.clone();
                for (j, sibling) in subproofs.iter().enumerate() {
                    if i != j {
                        nested.extend(sibling.secret_names().iter().cloned());
                    }
                }
                check_or_scope(&and.subproofs, &nested)?;
            }
        }
    }
    Ok(())
}
