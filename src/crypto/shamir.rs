//! # Shamir Secret Sharing
//!
//! Splits a byte string into `parts` shares so that any `threshold` of them
//! reconstruct it. Arithmetic is in GF(2^8) with the AES reduction polynomial
//! (x^8 + x^4 + x^3 + x + 1), one random polynomial per secret byte.
//!
//! Share layout: `y_0 .. y_{n-1} || x`, i.e. the evaluated bytes followed by
//! the one-byte x-coordinate. x-coordinates are distinct and never zero.

use rand::{seq::SliceRandom, RngCore};

use super::CryptoError;

/// Multiply in GF(2^8)
///
/// Fixed eight rounds with masks instead of branches, so the running time
/// does not depend on the operands (which include key bytes).
fn gf_mul(mut a: u8, b: u8) -> u8 {
    let mut product = 0u8;
    for i in 0..8 {
        let take = 0u8.wrapping_sub((b >> i) & 1);
        product ^= a & take;
        let carry = 0u8.wrapping_sub(a >> 7);
        a = (a << 1) ^ (0x1b & carry);
    }
    product
}

/// Multiplicative inverse in GF(2^8), a^254. Zero maps to zero.
///
/// Square-and-multiply over the public exponent only, so the sequence of
/// multiplications is the same for every `a`.
fn gf_inv(a: u8) -> u8 {
    // 254 = 0b1111_1110
    let mut square = gf_mul(a, a);
    let mut result = square;
    for _ in 0..6 {
        square = gf_mul(square, square);
        result = gf_mul(result, square);
    }
    result
}

fn gf_div(a: u8, b: u8) -> u8 {
    debug_assert!(b != 0, "division by zero in GF(2^8)");
    gf_mul(a, gf_inv(b))
}

/// Evaluate a polynomial (coefficients lowest degree first) at `x` using Horner's rule
fn evaluate(coefficients: &[u8], x: u8) -> u8 {
    coefficients
        .iter()
        .rev()
        .fold(0u8, |acc, &c| gf_mul(acc, x) ^ c)
}

/// Lagrange interpolation of the points at x = 0
fn interpolate_at_zero(xs: &[u8], ys: &[u8]) -> u8 {
    let mut result = 0u8;
    for (i, (&xi, &yi)) in xs.iter().zip(ys).enumerate() {
        let mut basis = 1u8;
        for (j, &xj) in xs.iter().enumerate() {
            if i != j {
                // (0 - xj) / (xi - xj); subtraction is XOR in GF(2^8)
                basis = gf_mul(basis, gf_div(xj, xi ^ xj));
            }
        }
        result ^= gf_mul(yi, basis);
    }
    result
}

/// Split `secret` into `parts` shares with the given `threshold`
///
/// # Errors
///
/// Returns [`CryptoError::InvalidParameters`] unless
/// `2 <= threshold <= parts` and the secret is non-empty.
pub fn split(secret: &[u8], parts: u8, threshold: u8) -> Result<Vec<Vec<u8>>, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::InvalidParameters(
            "cannot split an empty secret".to_string(),
        ));
    }
    if threshold < 2 {
        return Err(CryptoError::InvalidParameters(
            "threshold must be at least 2".to_string(),
        ));
    }
    if parts < threshold {
        return Err(CryptoError::InvalidParameters(format!(
            "parts ({parts}) cannot be less than threshold ({threshold})"
        )));
    }

    let mut rng = rand::thread_rng();

    let mut x_coordinates: Vec<u8> = (1..=255).collect();
    x_coordinates.shuffle(&mut rng);
    x_coordinates.truncate(usize::from(parts));

    let mut shares: Vec<Vec<u8>> = x_coordinates
        .iter()
        .map(|_| Vec::with_capacity(secret.len() + 1))
        .collect();

    let mut coefficients = vec![0u8; usize::from(threshold)];
    for &byte in secret {
        coefficients[0] = byte;
        rng.fill_bytes(&mut coefficients[1..]);
        for (share, &x) in shares.iter_mut().zip(&x_coordinates) {
            share.push(evaluate(&coefficients, x));
        }
    }
    coefficients.fill(0);

    for (share, &x) in shares.iter_mut().zip(&x_coordinates) {
        share.push(x);
    }
    Ok(shares)
}

/// Reconstruct the secret from at least `threshold` shares
///
/// Combining fewer shares than the split threshold does not fail; it
/// yields a wrong secret, which callers detect by verifying the result.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidShares`] if fewer than two shares are given,
/// lengths differ, a share is too short, or x-coordinates repeat.
pub fn combine<S: AsRef<[u8]>>(shares: &[S]) -> Result<Vec<u8>, CryptoError> {
    if shares.len() < 2 {
        return Err(CryptoError::InvalidShares(
            "at least 2 shares required".to_string(),
        ));
    }
    let share_len = shares[0].as_ref().len();
    if share_len < 2 {
        return Err(CryptoError::InvalidShares("shares too short".to_string()));
    }
    if shares.iter().any(|s| s.as_ref().len() != share_len) {
        return Err(CryptoError::InvalidShares(
            "all shares must be the same length".to_string(),
        ));
    }

    let xs: Vec<u8> = shares.iter().map(|s| s.as_ref()[share_len - 1]).collect();
    for (i, x) in xs.iter().enumerate() {
        if *x == 0 {
            return Err(CryptoError::InvalidShares(
                "share has zero x-coordinate".to_string(),
            ));
        }
        if xs[..i].contains(x) {
            return Err(CryptoError::InvalidShares(
                "duplicate share detected".to_string(),
            ));
        }
    }

    let secret_len = share_len - 1;
    let mut ys = vec![0u8; shares.len()];
    let secret = (0..secret_len)
        .map(|idx| {
            for (y, share) in ys.iter_mut().zip(shares) {
                *y = share.as_ref()[idx];
            }
            interpolate_at_zero(&xs, &ys)
        })
        .collect();
    Ok(secret)
}
