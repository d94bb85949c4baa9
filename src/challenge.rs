//! L-bit challenges and the residual-challenge arithmetic used by
//! disjunctions.
//!
//! A challenge is a non-negative integer strictly below `2^L` with
//! `L = 128`, so a [`u128`] with wrapping arithmetic carries the whole
//! algebra natively. One challenge is shared by an entire proof tree for one
//! session; a disjunction splits it into per-branch challenges that must sum
//! back to it modulo `2^L`.

use ff::PrimeField;
use group::prime::PrimeGroup;
use rand_core::CryptoRngCore;

/// A verifier challenge: an integer in `[0, 2^CHALLENGE_LENGTH)`.
pub type Challenge = u128;

/// Bit length of challenges. The whole tree shares this parameter.
pub const CHALLENGE_LENGTH: u32 = Challenge::BITS;

/// Draws a uniform challenge in `[0, 2^CHALLENGE_LENGTH)`.
pub fn random_challenge(rng: &mut dyn CryptoRngCore) -> Challenge {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    Challenge::from_le_bytes(bytes)
}

/// Computes the unique value that, appended to `fixed`, makes the branch
/// challenges sum to `target` modulo `2^CHALLENGE_LENGTH`.
///
/// The same computation serves both directions of the protocol: the prover
/// derives the real branch's challenge from the simulated ones, and the
/// verifier checks conservation by requiring the residual of the *complete*
/// branch list to be zero.
pub fn residual_challenge(fixed: &[Challenge], target: Challenge) -> Challenge {
    fixed
        .iter()
        .fold(target, |acc, ch| acc.wrapping_sub(*ch))
}

/// Lifts a challenge into the scalar field of `G`.
///
/// Sound as long as the group order exceeds `2^CHALLENGE_LENGTH`, which holds
/// for the prime-order groups this crate composes over.
pub fn challenge_scalar<G: PrimeGroup>(challenge: Challenge) -> G::Scalar {
    G::Scalar::from_u128(challenge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_completes_the_sum() {
        let fixed = [3u128, u128::MAX - 1, 42];
        let target = 7u128;
        let residual = residual_challenge(&fixed, target);
        let sum = fixed
            .iter()
            .fold(residual, |acc, ch| acc.wrapping_add(*ch));
        assert_eq!(sum, target);
    }

    #[test]
    fn residual_of_complete_list_is_zero() {
        let branches = [11u128, 13, 17];
        let target: u128 = branches.iter().fold(0, |acc, ch| acc.wrapping_add(*ch));
        assert_eq!(residual_challenge(&branches, target), 0);
    }

    #[test]
    fn residual_of_empty_list_is_target() {
        assert_eq!(residual_challenge(&[], 99), 99);
    }
}
