//! The proving side of a composed statement.
//!
//! A [`Prover`] tree is derived from a [`Proof`] together with the witness
//! mapping for one session, runs exactly one commit → challenge → response
//! round, and is then discarded. Reusing randomizers across two challenges
//! for the same secret leaks that secret; the per-session lifecycle is the
//! caller's discipline, not a runtime check.

use std::collections::{BTreeMap, BTreeSet};

use ff::Field;
use group::prime::PrimeGroup;
use rand::Rng;
use rand_core::CryptoRngCore;
use tracing::warn;

use crate::challenge::{random_challenge, residual_challenge, Challenge};
use crate::composition::{Commitment, PreCommitment, Proof, Response};
use crate::errors::Error;
use crate::traits::{LeafProver, Randomizers, SecretName, Secrets};

/// A per-session prover mirroring the shape of its statement.
pub enum Prover<G: PrimeGroup> {
    /// An atomic prover supplied by the leaf layer.
    Leaf(Box<dyn LeafProver<G>>),
    /// Proves every subproof under the one shared challenge.
    And(AndProver<G>),
    /// Proves one branch for real and simulates all others.
    Or(OrProver<G>),
}

/// Prover for a conjunction.
pub struct AndProver<G: PrimeGroup> {
    subprovers: Vec<Prover<G>>,
    secret_names: Vec<SecretName>,
}

/// Prover for a disjunction.
///
/// Holds the subprovers in the original branch order so the tree shape never
/// betrays which branch is real. `real` is `None` for a simulation-only
/// prover.
pub struct OrProver<G: PrimeGroup> {
    subprovers: Vec<Prover<G>>,
    real: Option<usize>,
    simulations: Vec<Option<(Commitment<G>, Challenge, Response<G>)>>,
}

impl<G: PrimeGroup> Proof<G> {
    /// Derives a prover for one session, keeping only the witnesses some
    /// descendant of this subtree mentions.
    ///
    /// An empty mapping, or a node marked [`set_simulate`](Proof::set_simulate),
    /// yields a simulation-only prover (with a diagnostic notice). For a
    /// disjunction, one uniformly chosen branch whose secret requirement is
    /// covered by `secrets` becomes the real branch; if none qualifies this
    /// fails with [`Error::NoProvableBranch`].
    pub fn get_prover(
        &self,
        secrets: &Secrets<G>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Prover<G>, Error> {
        if self.is_simulate() || secrets.is_empty() {
            warn!(proof_id = %self.proof_id(), "no usable witnesses, prover can only simulate");
            return Ok(self.get_simulator());
        }
        match self {
            Proof::Leaf(node) => {
                let relevant = relevant_secrets::<G>(secrets, node.statement.secret_names());
                node.statement.get_prover(&relevant).map(Prover::Leaf)
            }
            Proof::And(and) => {
                let mut subprovers = Vec::with_capacity(and.subproofs.len());
                for sub in &and.subproofs {
                    let relevant = relevant_secrets::<G>(secrets, sub.secret_names());
                    subprovers.push(sub.get_prover(&relevant, rng)?);
                }
                Ok(Prover::And(AndProver {
                    subprovers,
                    secret_names: and.secret_names.clone(),
                }))
            }
            Proof::Or(or) => {
                let qualifying: Vec<usize> = or
                    .subproofs
                    .iter()
                    .enumerate()
                    .filter(|(_, sub)| {
                        !sub.is_simulate()
                            && sub
                                .secret_names()
                                .iter()
                                .all(|name| secrets.contains_key(name))
                    })
                    .map(|(i, _)| i)
                    .collect();
                if qualifying.is_empty() {
                    return Err(Error::NoProvableBranch);
                }
                let chosen = qualifying[rng.gen_range(0..qualifying.len())];

                let mut subprovers = Vec::with_capacity(or.subproofs.len());
                for (i, sub) in or.subproofs.iter().enumerate() {
                    if i == chosen {
                        let relevant = relevant_secrets::<G>(secrets, sub.secret_names());
                        subprovers.push(sub.get_prover(&relevant, rng)?);
                    } else {
                        subprovers.push(sub.get_simulator());
                    }
                }
                let simulations = (0..subprovers.len()).map(|_| None).collect();
                Ok(Prover::Or(OrProver {
                    subprovers,
                    real: Some(chosen),
                    simulations,
                }))
            }
        }
    }

    /// Derives a prover holding no witnesses: it can only produce simulated
    /// transcripts via [`Prover::simulate_proof`], and `commit` on it fails.
    pub fn get_simulator(&self) -> Prover<G> {
        match self {
            Proof::Leaf(node) => Prover::Leaf(node.statement.get_simulator()),
            Proof::And(and) => Prover::And(AndProver {
                subprovers: and.subproofs.iter().map(Proof::get_simulator).collect(),
                secret_names: and.secret_names.clone(),
            }),
            Proof::Or(or) => Prover::Or(OrProver {
                subprovers: or.subproofs.iter().map(Proof::get_simulator).collect(),
                real: None,
                simulations: (0..or.subproofs.len()).map(|_| None).collect(),
            }),
        }
    }
}

impl<G: PrimeGroup> Prover<G> {
    /// Draws the per-session randomizer mapping for this subtree.
    pub fn get_randomizers(&self, rng: &mut dyn CryptoRngCore) -> Randomizers<G> {
        match self {
            Prover::Leaf(leaf) => leaf.get_randomizers(rng),
            Prover::And(and) => and.get_randomizers(rng),
            Prover::Or(or) => or.get_randomizers(rng),
        }
    }

    /// Pre-commitment phase: collects auxiliary announcements from leaves
    /// that need one. Returns `None` when nothing in the subtree does.
    pub fn precommit(&mut self) -> Option<PreCommitment<G>> {
        match self {
            Prover::Leaf(leaf) => leaf.precommit().map(PreCommitment::Leaf),
            Prover::And(and) => {
                let slots: Vec<Option<PreCommitment<G>>> =
                    and.subprovers.iter_mut().map(Prover::precommit).collect();
                if slots.iter().all(Option::is_none) {
                    None
                } else {
                    Some(PreCommitment::Nodes(slots))
                }
            }
            Prover::Or(_) => None,
        }
    }

    /// First move: produces the commitment for the whole subtree.
    ///
    /// `randomizers` lets an enclosing node force specific blinding values;
    /// missing entries are filled with fresh draws.
    pub fn commit(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Commitment<G>, Error> {
        match self {
            Prover::Leaf(leaf) => leaf.commit(randomizers, rng).map(Commitment::Leaf),
            Prover::And(and) => and.commit(randomizers, rng),
            // Branches of a disjunction share no secrets with the outside
            // (no-or-flaw), so supplied randomizers cannot apply to them.
            Prover::Or(or) => or.commit(rng),
        }
    }

    /// Third move: the response under the received challenge.
    pub fn compute_response(&mut self, challenge: Challenge) -> Result<Response<G>, Error> {
        match self {
            Prover::Leaf(leaf) => leaf.compute_response(challenge).map(Response::Leaf),
            Prover::And(and) => {
                let responses = and
                    .subprovers
                    .iter_mut()
                    .map(|sub| sub.compute_response(challenge))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Response::And(responses))
            }
            Prover::Or(or) => or.compute_response(challenge),
        }
    }

    /// Produces a `(commitment, challenge, response)` triple valid for an
    /// arbitrary challenge without using any witness.
    ///
    /// Self-similar recursion is what lets disjunctions nest inside
    /// conjunctions inside disjunctions arbitrarily deep.
    pub fn simulate_proof(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        challenge: Option<Challenge>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(Commitment<G>, Challenge, Response<G>), Error> {
        match self {
            Prover::Leaf(leaf) => {
                let (com, ch, resp) = leaf.simulate_proof(randomizers, challenge, rng)?;
                Ok((Commitment::Leaf(com), ch, Response::Leaf(resp)))
            }
            Prover::And(and) => and.simulate_proof(randomizers, challenge, rng),
            Prover::Or(or) => or.simulate_proof(randomizers, challenge, rng),
        }
    }
}

impl<G: PrimeGroup> AndProver<G> {
    /// One fresh scalar per *unique* secret name in the subtree, so every
    /// leaf referencing the same name blinds with the same value and their
    /// responses come out identical.
    fn get_randomizers(&self, rng: &mut dyn CryptoRngCore) -> Randomizers<G> {
        let unique: BTreeSet<&SecretName> = self.secret_names.iter().collect();
        unique
            .into_iter()
            .map(|name| (name.clone(), G::Scalar::random(&mut *rng)))
            .collect()
    }

    fn commit(
        &mut self,
        supplied: Option<&Randomizers<G>>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Commitment<G>, Error> {
        let randomizers = match supplied {
            None => self.get_randomizers(rng),
            Some(map) if self.secret_names.iter().any(|n| !map.contains_key(n)) => {
                let mut filled = self.get_randomizers(rng);
                for (name, value) in map {
                    filled.insert(name.clone(), *value);
                }
                filled
            }
            Some(map) => map.clone(),
        };
        let mut commitments = Vec::with_capacity(self.subprovers.len());
        for sub in &mut self.subprovers {
            commitments.push(sub.commit(Some(&randomizers), rng)?);
        }
        Ok(Commitment::And(commitments))
    }

    fn simulate_proof(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        challenge: Option<Challenge>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(Commitment<G>, Challenge, Response<G>), Error> {
        let owned;
        let randomizers = match randomizers {
            Some(map) => map,
            None => {
                owned = self.get_randomizers(rng);
                &owned
            }
        };
        let challenge = challenge.unwrap_or_else(|| random_challenge(rng));
        let mut commitments = Vec::with_capacity(self.subprovers.len());
        let mut responses = Vec::with_capacity(self.subprovers.len());
        for sub in &mut self.subprovers {
            let (com, _, resp) = sub.simulate_proof(Some(randomizers), Some(challenge), rng)?;
            commitments.push(com);
            responses.push(resp);
        }
        Ok((
            Commitment::And(commitments),
            challenge,
            Response::And(responses),
        ))
    }
}

impl<G: PrimeGroup> OrProver<G> {
    /// The index of the branch actually proven, or `None` for a
    /// simulation-only prover.
    pub fn real_branch(&self) -> Option<usize> {
        self.real
    }

    fn get_randomizers(&self, rng: &mut dyn CryptoRngCore) -> Randomizers<G> {
        let mut merged = BTreeMap::new();
        for sub in &self.subprovers {
            merged.extend(sub.get_randomizers(rng));
        }
        merged
    }

    /// Commits honestly on the real branch and caches a simulated
    /// `(commitment, challenge, response)` triple for every other one.
    fn commit(&mut self, rng: &mut dyn CryptoRngCore) -> Result<Commitment<G>, Error> {
        let Some(real) = self.real else {
            return Err(Error::CannotCommit);
        };
        let mut commitments = Vec::with_capacity(self.subprovers.len());
        for (i, sub) in self.subprovers.iter_mut().enumerate() {
            if i == real {
                commitments.push(sub.commit(None, rng)?);
            } else {
                let (com, ch, resp) = sub.simulate_proof(None, None, rng)?;
                commitments.push(com.clone());
                self.simulations[i] = Some((com, ch, resp));
            }
        }
        Ok(Commitment::Or(commitments))
    }

    /// Assigns the real branch the residual challenge: the unique value
    /// making all branch challenges sum to `challenge` mod `2^L`.
    fn compute_response(&mut self, challenge: Challenge) -> Result<Response<G>, Error> {
        let Some(real) = self.real else {
            return Err(Error::CannotCommit);
        };
        let mut simulated_challenges = Vec::with_capacity(self.subprovers.len() - 1);
        for (i, slot) in self.simulations.iter().enumerate() {
            if i == real {
                continue;
            }
            match slot {
                Some((_, ch, _)) => simulated_challenges.push(*ch),
                None => return Err(Error::MissingCommitment),
            }
        }
        let residual = residual_challenge(&simulated_challenges, challenge);
        let real_response = self.subprovers[real].compute_response(residual)?;

        let mut challenges = Vec::with_capacity(self.subprovers.len());
        let mut responses = Vec::with_capacity(self.subprovers.len());
        for (i, slot) in self.simulations.iter().enumerate() {
            if i == real {
                challenges.push(residual);
                responses.push(real_response.clone());
            } else if let Some((_, ch, resp)) = slot {
                challenges.push(*ch);
                responses.push(resp.clone());
            } else {
                return Err(Error::MissingCommitment);
            }
        }
        Ok(Response::Or(challenges, responses))
    }

    /// Simulates the whole disjunction under one externally supplied (or
    /// fresh) challenge: all but the last branch get independent challenges,
    /// the last gets the residual.
    fn simulate_proof(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        challenge: Option<Challenge>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(Commitment<G>, Challenge, Response<G>), Error> {
        let owned;
        let randomizers = match randomizers {
            Some(map) => map,
            None => {
                owned = self.get_randomizers(rng);
                &owned
            }
        };
        let challenge = challenge.unwrap_or_else(|| random_challenge(rng));
        let count = self.subprovers.len();
        let mut commitments = Vec::with_capacity(count);
        let mut branch_challenges = Vec::with_capacity(count);
        let mut responses = Vec::with_capacity(count);
        for sub in &mut self.subprovers[..count - 1] {
            let (com, ch, resp) = sub.simulate_proof(Some(randomizers), None, rng)?;
            commitments.push(com);
            branch_challenges.push(ch);
            responses.push(resp);
        }
        let last_challenge = residual_challenge(&branch_challenges, challenge);
        let (com, _, resp) =
            self.subprovers[count - 1].simulate_proof(Some(randomizers), Some(last_challenge), rng)?;
        commitments.push(com);
        branch_challenges.push(last_challenge);
        responses.push(resp);
        Ok((
            Commitment::Or(commitments),
            challenge,
            Response::Or(branch_challenges, responses),
        ))
    }
}

/// Restricts a witness mapping to the names a subtree mentions.
fn relevant_secrets<G: PrimeGroup>(secrets: &Secrets<G>, names: &[SecretName]) -> Secrets<G> {
    names
        .iter()
        .filter_map(|name| secrets.get(name).map(|value| (name.clone(), *value)))
        .collect()
}
