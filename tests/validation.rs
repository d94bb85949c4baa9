//! Construction-time validation and the pre-commitment phase.

use std::cell::Cell;
use std::rc::Rc;

use curve25519_dalek::ristretto::RistrettoPoint;
use ff::Field;
use group::Group;
use rand::rngs::OsRng;
use rand_core::CryptoRngCore;

use sigma_compose::challenge::Challenge;
use sigma_compose::dlrep::DlRep;
use sigma_compose::test_utils::{dlog, dlog_leaf};
use sigma_compose::traits::{
    LeafProver, LeafStatement, LeafVerifier, Randomizers, SecretName, Secrets,
};
use sigma_compose::{AndProof, ConstructionError, Error, OrProof, Proof};

type G = RistrettoPoint;
type Scalar = <RistrettoPoint as Group>::Scalar;

fn scalar(rng: &mut OsRng) -> Scalar {
    Scalar::random(rng)
}

#[test]
fn name_shared_between_branch_and_sibling_is_rejected() {
    let mut rng = OsRng;
    let x = scalar(&mut rng);
    let inside = dlog_leaf::<G>("x", x, &mut rng);
    let outside = dlog_leaf::<G>("x", x, &mut rng);

    let result = AndProof::new(vec![Proof::or(vec![inside]).unwrap(), outside]);
    assert!(matches!(
        result,
        Err(ConstructionError::OrFlaw { name }) if name == "x"
    ));
}

#[test]
fn name_shared_between_two_branches_is_rejected() {
    let mut rng = OsRng;
    let x = scalar(&mut rng);
    let left = dlog_leaf::<G>("x", x, &mut rng);
    let right = dlog_leaf::<G>("x", x, &mut rng);

    let result = OrProof::new(vec![left, right]);
    assert!(matches!(
        result,
        Err(ConstructionError::OrFlaw { name }) if name == "x"
    ));
}

#[test]
fn flaw_is_found_across_nesting_levels() {
    let mut rng = OsRng;
    let x = scalar(&mut rng);
    let y = scalar(&mut rng);
    let outer = dlog_leaf::<G>("x", x, &mut rng);
    let inside_or = dlog_leaf::<G>("x", x, &mut rng);
    let inner_sibling = dlog_leaf::<G>("y", y, &mut rng);

    // And( leaf x, And( Or(leaf x), leaf y ) ): "x" crosses the inner
    // disjunction boundary through the outer scope.
    let inner = Proof::and(vec![Proof::or(vec![inside_or]).unwrap(), inner_sibling]).unwrap();
    let result = AndProof::new(vec![outer, inner]);
    assert!(matches!(
        result,
        Err(ConstructionError::OrFlaw { name }) if name == "x"
    ));
}

#[test]
fn duplicate_names_under_a_conjunction_are_allowed() {
    let mut rng = OsRng;
    let x = scalar(&mut rng);
    let left = dlog_leaf::<G>("x", x, &mut rng);
    let right = dlog_leaf::<G>("x", x, &mut rng);
    assert!(AndProof::new(vec![left, right]).is_ok());
}

#[test]
fn empty_compositions_are_rejected() {
    assert!(matches!(
        AndProof::<G>::new(Vec::new()),
        Err(ConstructionError::EmptyComposition)
    ));
    assert!(matches!(
        OrProof::<G>::new(Vec::new()),
        Err(ConstructionError::EmptyComposition)
    ));
}

#[test]
fn misaligned_leaf_is_rejected() {
    let mut rng = OsRng;
    let g = G::random(&mut rng);
    let statement = DlRep::new(g, vec![("x".to_string(), g), ("y".to_string(), g)]);
    let misaligned = Misaligned(statement);
    assert!(matches!(
        Proof::leaf(misaligned),
        Err(ConstructionError::MisalignedLeaf)
    ));
}

/// Wrapper reporting one fewer generator than secret names.
struct Misaligned(DlRep<G>);

impl LeafStatement<G> for Misaligned {
    fn secret_names(&self) -> &[SecretName] {
        self.0.secret_names()
    }

    fn generators(&self) -> &[G] {
        &self.0.generators()[..1]
    }

    fn proof_id(&self) -> String {
        self.0.proof_id()
    }

    fn get_prover(&self, secrets: &Secrets<G>) -> Result<Box<dyn LeafProver<G>>, Error> {
        self.0.get_prover(secrets)
    }

    fn get_verifier(&self) -> Box<dyn LeafVerifier<G>> {
        self.0.get_verifier()
    }

    fn get_simulator(&self) -> Box<dyn LeafProver<G>> {
        self.0.get_simulator()
    }

    fn recompute_commitment(
        &self,
        challenge: Challenge,
        response: &[Scalar],
    ) -> Result<Vec<G>, Error> {
        self.0.recompute_commitment(challenge, response)
    }
}

#[test]
fn precommitments_reach_the_verifier() {
    let mut rng = OsRng;
    let x = scalar(&mut rng);
    let g = G::random(&mut rng);
    let aux = G::random(&mut rng);
    let received = Rc::new(Cell::new(None));

    let announcing = Announcing {
        inner: DlRep::new(g * x, vec![("x".to_string(), g)]),
        aux,
        received: Rc::clone(&received),
    };
    let (plain, mut secrets) = dlog::<G>("y", &mut rng);
    secrets.insert("x".to_string(), x);
    let statement = Proof::and(vec![Proof::leaf(announcing).unwrap(), plain]).unwrap();

    let mut prover = statement.get_prover(&secrets, &mut rng).unwrap();
    let mut verifier = statement.get_verifier();

    let precommitment = prover.precommit().expect("one leaf announces");
    verifier.process_precommitment(&precommitment);
    assert_eq!(received.get(), Some(aux));

    let commitment = prover.commit(None, &mut rng).unwrap();
    let challenge = verifier.send_challenge(commitment, &mut rng);
    let response = prover.compute_response(challenge).unwrap();
    assert!(verifier.verify(&response).unwrap());
}

/// A leaf that announces one auxiliary point ahead of its commitment, with
/// the verifier side recording what it received.
struct Announcing {
    inner: DlRep<G>,
    aux: G,
    received: Rc<Cell<Option<G>>>,
}

impl LeafStatement<G> for Announcing {
    fn secret_names(&self) -> &[SecretName] {
        self.inner.secret_names()
    }

    fn generators(&self) -> &[G] {
        self.inner.generators()
    }

    fn proof_id(&self) -> String {
        format!("Announcing[{}]", self.inner.proof_id())
    }

    fn get_prover(&self, secrets: &Secrets<G>) -> Result<Box<dyn LeafProver<G>>, Error> {
        Ok(Box::new(AnnouncingProver {
            inner: self.inner.get_prover(secrets)?,
            aux: self.aux,
        }))
    }

    fn get_verifier(&self) -> Box<dyn LeafVerifier<G>> {
        Box::new(AnnouncingVerifier {
            inner: self.inner.get_verifier(),
            received: Rc::clone(&self.received),
        })
    }

    fn get_simulator(&self) -> Box<dyn LeafProver<G>> {
        Box::new(AnnouncingProver {
            inner: self.inner.get_simulator(),
            aux: self.aux,
        })
    }

    fn recompute_commitment(
        &self,
        challenge: Challenge,
        response: &[Scalar],
    ) -> Result<Vec<G>, Error> {
        self.inner.recompute_commitment(challenge, response)
    }
}

struct AnnouncingProver {
    inner: Box<dyn LeafProver<G>>,
    aux: G,
}

impl LeafProver<G> for AnnouncingProver {
    fn secret_names(&self) -> &[SecretName] {
        self.inner.secret_names()
    }

    fn get_randomizers(&self, rng: &mut dyn CryptoRngCore) -> Randomizers<G> {
        self.inner.get_randomizers(rng)
    }

    fn precommit(&mut self) -> Option<Vec<G>> {
        Some(vec![self.aux])
    }

    fn commit(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Vec<G>, Error> {
        self.inner.commit(randomizers, rng)
    }

    fn compute_response(&mut self, challenge: Challenge) -> Result<Vec<Scalar>, Error> {
        self.inner.compute_response(challenge)
    }

    fn simulate_proof(
        &mut self,
        randomizers: Option<&Randomizers<G>>,
        challenge: Option<Challenge>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(Vec<G>, Challenge, Vec<Scalar>), Error> {
        self.inner.simulate_proof(randomizers, challenge, rng)
    }
}

struct AnnouncingVerifier {
    inner: Box<dyn LeafVerifier<G>>,
    received: Rc<Cell<Option<G>>>,
}

impl LeafVerifier<G> for AnnouncingVerifier {
    fn check_responses_consistency(
        &self,
        response: &[Scalar],
        known: &mut std::collections::BTreeMap<SecretName, Scalar>,
    ) -> bool {
        self.inner.check_responses_consistency(response, known)
    }

    fn process_precommitment(&mut self, data: &[G]) {
        self.received.set(data.first().copied());
    }
}
