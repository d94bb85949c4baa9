//! A reference leaf: knowledge of a discrete-logarithm representation.
//!
//! [`DlRep`] proves knowledge of scalars `x_1..x_n` with
//! `X = x_1 * G_1 + ... + x_n * G_n` for public `X` and generators `G_i`,
//! each `x_i` referenced by a secret name. It covers plain Schnorr
//! statements (`n = 1`), Pedersen openings (`n = 2`), and, composed under a
//! conjunction with shared names, DLEQ-style equality claims.
//!
//! It is also the template for leaf authors: any statement exposing the
//! [`LeafStatement`] contract composes the same way.

use std::collections::BTreeMap;

use ff::Field;
use group::prime::PrimeGroup;
use group::Group;
use rand_core::CryptoRngCore;

use crate::challenge::{challenge_scalar, random_challenge, Challenge};
use crate::errors::Error;
use crate::traits::{LeafProver, LeafStatement, LeafVerifier, Randomizers, SecretName, Secrets};

/// The statement `X = Σ x_i · G_i` with named secrets `x_i`.
#[derive(Clone)]
pub struct DlRep<G: PrimeGroup> {
    image: G,
    secret_names: Vec<SecretName>,
    generators: Vec<G>,
}

impl<G: PrimeGroup> DlRep<G> {
    /// Builds the statement from its public image and the ordered
    /// `(secret name, generator)` terms.
    pub fn new(image: G, terms: Vec<(SecretName, G)>) -> Self {
        let (secret_names, generators) = terms.into_iter().unzip();
        DlRep {
            image,
            secret_names,
            generators,
        }
    }

    /// The public image `X`.
    pub fn image(&self) -> G {
        self.image
    }

    fn evaluate(generators: &[G], scalars: &[G::Scalar]) -> G {
        generators
            .iter()
            .zip(scalars)
            .fold(G::identity(), |acc, (gen, scalar)| acc + *gen * scalar)
    }
}

impl<G: PrimeGroup> LeafStatement<G> for DlRep<G> {
    fn secret_names(&self) -> &[SecretName] {
        &self.secret_names
    }

    fn generators(&self) -> &[G] {
        &self.generators
    }

    fn proof_id(&self) -> String {
        format!("DlRep[{}]", self.secret_names.join(","))
    }

    fn get_prover(&self, secrets: &Secrets<G>) -> Result<Box<dyn LeafProver<G>>, Error> {
        let values = self
            .secret_names
            .iter()
            .map(|name| {
                secrets
                    .get(name)
                    .copied()
                    .ok_or_else(|| Error::MissingSecret { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(DlRepProver {
            statement: self.clone(),
            secrets: Some(values),
            nonces: None,
        }))
    }

    fn get_verifier(&self) -> Box<dyn LeafVerifier<G>> {
        Box::new(DlRepVerifier {
            secret_names: self.secret_names.clone(),
            _marker: std::marker::PhantomData,
        })
    }

    fn get_simulator(&self) -> Box<dyn LeafProver<G>> {
        Box::new(DlRepProver {
            statement: self.clone(),
            secrets: None,
            nonces: None,
        })
    }

    fn recompute_commitment(
        &self,
        challenge: Challenge,
        response: &[G::Scalar],
    ) -> Result<Vec<G>, Error> {
        if response.len() != self.secret_names.len() {
            return Err(Error::MalformedTranscript);
        }
        let commitment =
            Self::evaluate(&self.generators, response) - self.image * challenge_scalar::<G>(challenge);
        Ok(vec![commitment])
    }
}

/// Per-session prover for a [`DlRep`] statement.
///
/// `secrets` is `None` for a simulation-only instance.
pub struct DlRepProver<G: PrimeGroup> {
    statement: DlRep<G>,
    secrets: Option<Vec<G::Scalar>>,
    nonces: Option<Vec<G::Scalar>>,
}

impl<G: PrimeGroup> DlRepProver<G> {
    /// One scalar per positional slot, reusing the supplied (or first
    /// drawn) value for repeated names so responses stay identical.
    fn aligned_scalars(
        &self,
        supplied: Option<&Randomizers<G>>,
        rng: &mut dyn CryptoRngCore,
    ) -> Vec<G::Scalar> {
        let mut drawn: Randomizers<G> = supplied.cloned().unwrap_or_default();
        let mut scalars = Vec::with_capacity(self.statement.secret_names.len());
        for name in &self.statement.secret_names {
            let value = match drawn.get(name) {
                Some(value) => *value,
                None => {
                    let value = G::Scalar::random(&mut *rng);
                    drawn.insert(name.clone(), value);
                    value
                }
            };
            scalars.push(value);
        }
        scalars
    }
}

impl<G: PrimeGroup> LeafProver<G> for DlRepProver<G> {
    fn secret_names(&self) -> &[SecretName] {
        &self.statement.secret_names
    }

    fn get_randomizers(&self, rng: &mut dyn CryptoRngCore) -> Randomizers<G> {
        let mut randomizers = Randomizers::<G>::new();
        for name in &self.statement.secret_names {
            randomizers
                .entry(name.clone())
                .or_insert_with(|| G::Scalar::random(&mut *rng));
        }
        randomizers
    }

    fn commit(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Vec<G>, Error> {
        if self.secrets.is_none() {
            return Err(Error::CannotCommit);
        }
        let nonces = self.aligned_scalars(randomizers, rng);
        let commitment = DlRep::evaluate(&self.statement.generators, &nonces);
        self.nonces = Some(nonces);
        Ok(vec![commitment])
    }

    fn compute_response(&mut self, challenge: Challenge) -> Result<Vec<G::Scalar>, Error> {
        let Some(secrets) = &self.secrets else {
            return Err(Error::CannotCommit);
        };
        let Some(nonces) = &self.nonces else {
            return Err(Error::MissingCommitment);
        };
        let scalar = challenge_scalar::<G>(challenge);
        Ok(nonces
            .iter()
            .zip(secrets)
            .map(|(nonce, secret)| *nonce + *secret * scalar)
            .collect())
    }

    fn simulate_proof(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        challenge: Option<Challenge>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(Vec<G>, Challenge, Vec<G::Scalar>), Error> {
        let challenge = challenge.unwrap_or_else(|| random_challenge(rng));
        // The randomizers double as the simulated responses; the commitment
        // is then derived backwards from the arbitrary challenge.
        let response = self.aligned_scalars(randomizers, rng);
        let commitment = DlRep::evaluate(&self.statement.generators, &response)
            - self.statement.image * challenge_scalar::<G>(challenge);
        Ok((vec![commitment], challenge, response))
    }
}

/// Per-session verifier for a [`DlRep`] statement.
pub struct DlRepVerifier<G: PrimeGroup> {
    secret_names: Vec<SecretName>,
    _marker: std::marker::PhantomData<G>,
}

impl<G: PrimeGroup> LeafVerifier<G> for DlRepVerifier<G> {
    fn check_responses_consistency(
        &self,
        response: &[G::Scalar],
        known: &mut BTreeMap<SecretName, G::Scalar>,
    ) -> bool {
        if response.len() != self.secret_names.len() {
            return false;
        }
        for (name, value) in self.secret_names.iter().zip(response) {
            match known.get(name) {
                Some(previous) if previous != value => return false,
                Some(_) => {}
                None => {
                    known.insert(name.clone(), *value);
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::ristretto::RistrettoPoint;
    use rand::rngs::OsRng;

    type G = RistrettoPoint;

    fn pedersen_statement(rng: &mut OsRng) -> (DlRep<G>, Secrets<G>) {
        let (g, h) = (G::random(&mut *rng), G::random(&mut *rng));
        let (x, r) = (
            <G as Group>::Scalar::random(&mut *rng),
            <G as Group>::Scalar::random(&mut *rng),
        );
        let statement = DlRep::new(g * x + h * r, vec![("x".into(), g), ("r".into(), h)]);
        let secrets = Secrets::<G>::from([("x".into(), x), ("r".into(), r)]);
        (statement, secrets)
    }

    #[test]
    fn leaf_round_trip() {
        let mut rng = OsRng;
        let (statement, secrets) = pedersen_statement(&mut rng);
        let mut prover = statement.get_prover(&secrets).unwrap();

        let commitment = prover.commit(None, &mut rng).unwrap();
        let challenge = random_challenge(&mut rng);
        let response = prover.compute_response(challenge).unwrap();

        let recomputed = statement.recompute_commitment(challenge, &response).unwrap();
        assert_eq!(recomputed, commitment);
    }

    #[test]
    fn simulated_transcript_verifies() {
        let mut rng = OsRng;
        let (statement, _) = pedersen_statement(&mut rng);
        let mut simulator = statement.get_simulator();

        let (commitment, challenge, response) =
            simulator.simulate_proof(None, Some(42), &mut rng).unwrap();
        assert_eq!(challenge, 42);
        let recomputed = statement.recompute_commitment(challenge, &response).unwrap();
        assert_eq!(recomputed, commitment);
    }

    #[test]
    fn prover_requires_every_secret() {
        let mut rng = OsRng;
        let (statement, mut secrets) = pedersen_statement(&mut rng);
        secrets.remove("r");
        assert!(matches!(
            statement.get_prover(&secrets),
            Err(Error::MissingSecret { name }) if name == "r"
        ));
    }

    #[test]
    fn simulator_cannot_commit() {
        let mut rng = OsRng;
        let (statement, _) = pedersen_statement(&mut rng);
        let mut simulator = statement.get_simulator();
        assert!(matches!(
            simulator.commit(None, &mut rng),
            Err(Error::CannotCommit)
        ));
    }
}
