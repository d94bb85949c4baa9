//! Ready-made statements used in tests for this crate.

use ff::Field;
use group::prime::PrimeGroup;
use group::Group;
use rand_core::CryptoRngCore;

use crate::composition::Proof;
use crate::dlrep::DlRep;
use crate::traits::Secrets;

/// A leaf proving knowledge of the discrete logarithm `x` of `x * G` for a
/// random generator, with the witness bound to `name`.
pub fn dlog_leaf<G: PrimeGroup>(
    name: &str,
    x: G::Scalar,
    rng: &mut dyn CryptoRngCore,
) -> Proof<G> {
    let generator = G::random(&mut *rng);
    Proof::leaf(DlRep::new(generator * x, vec![(name.to_string(), generator)]))
        .expect("single-term leaf is aligned")
}

/// Statement and witness for knowledge of a discrete logarithm.
pub fn dlog<G: PrimeGroup>(name: &str, rng: &mut dyn CryptoRngCore) -> (Proof<G>, Secrets<G>) {
    let x = G::Scalar::random(&mut *rng);
    let secrets = Secrets::<G>::from([(name.to_string(), x)]);
    (dlog_leaf(name, x, rng), secrets)
}

/// Statement and witness for knowledge of an opening `(x, r)` of a Pedersen
/// commitment `x * G + r * H`.
pub fn pedersen<G: PrimeGroup>(
    x_name: &str,
    r_name: &str,
    rng: &mut dyn CryptoRngCore,
) -> (Proof<G>, Secrets<G>) {
    let (g, h) = (G::random(&mut *rng), G::random(&mut *rng));
    let (x, r) = (G::Scalar::random(&mut *rng), G::Scalar::random(&mut *rng));
    let statement = DlRep::new(
        g * x + h * r,
        vec![(x_name.to_string(), g), (r_name.to_string(), h)],
    );
    let secrets = Secrets::<G>::from([(x_name.to_string(), x), (r_name.to_string(), r)]);
    (
        Proof::leaf(statement).expect("two-term leaf is aligned"),
        secrets,
    )
}
