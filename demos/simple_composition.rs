//! Proves `dlog(a) AND (dlog(b) OR pedersen(m, r))` over Ristretto,
//! holding witnesses for everything except the `b` branch.

use curve25519_dalek::ristretto::RistrettoPoint;
use rand::rngs::OsRng;

use sigma_compose::test_utils::{dlog, pedersen};
use sigma_compose::Proof;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = OsRng;

    let (knows_a, mut secrets) = dlog::<RistrettoPoint>("a", &mut rng);
    let (knows_b, _) = dlog::<RistrettoPoint>("b", &mut rng);
    let (opens_commitment, opening) = pedersen::<RistrettoPoint>("m", "r", &mut rng);
    secrets.extend(opening);

    let statement = Proof::and(vec![
        knows_a,
        Proof::or(vec![knows_b, opens_commitment])?,
    ])?;
    println!("statement: {}", statement.proof_id());

    let mut prover = statement.get_prover(&secrets, &mut rng)?;
    let mut verifier = statement.get_verifier();

    let commitment = prover.commit(None, &mut rng)?;
    let challenge = verifier.send_challenge(commitment, &mut rng);
    println!("challenge: {challenge:#034x}");

    let response = prover.compute_response(challenge)?;
    let accepted = verifier.verify(&response)?;
    println!("verdict: {}", if accepted { "accepted" } else { "rejected" });

    Ok(())
}
