//! Aritmética exata de votos.
//!
//! Votos fracionários (empates divididos, meia preferência no Condorcet,
//! pontos Borda médios) são somados como racionais de precisão arbitrária.
//! A soma não depende da ordem das cédulas, o que ponto flutuante não
//! garante, e denominadores grandes (Dowdall com dezenas de candidatos)
//! não transbordam.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num::traits::{One, Signed, ToPrimitive, Zero};
use num::{BigInt, BigRational};

/// Quantidade exata de votos.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Votes(BigRational);

impl Votes {
    pub fn zero() -> Self {
        Votes(BigRational::zero())
    }

    pub fn one() -> Self {
        Votes(BigRational::one())
    }

    /// Valor inteiro.
    pub fn whole(n: i128) -> Self {
        Votes(BigRational::from_integer(BigInt::from(n)))
    }

    /// Fração `num / den`. Um denominador zero é tratado como 1.
    pub fn fraction(num: i128, den: i128) -> Self {
        let den = if den == 0 { 1 } else { den };
        Votes(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Divide por um inteiro positivo.
    pub fn split(&self, parts: usize) -> Self {
        Votes(&self.0 / BigRational::from_integer(BigInt::from(parts.max(1))))
    }

    /// Aproximação para exibição e serialização.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl Default for Votes {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Votes {
    type Output = Votes;

    fn add(self, rhs: Votes) -> Votes {
        Votes(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Votes> for Votes {
    type Output = Votes;

    fn add(self, rhs: &'a Votes) -> Votes {
        Votes(self.0 + &rhs.0)
    }
}

impl AddAssign for Votes {
    fn add_assign(&mut self, rhs: Votes) {
        self.0 += rhs.0;
    }
}

impl<'a> AddAssign<&'a Votes> for Votes {
    fn add_assign(&mut self, rhs: &'a Votes) {
        self.0 += &rhs.0;
    }
}

impl Sub for Votes {
    type Output = Votes;

    fn sub(self, rhs: Votes) -> Votes {
        Votes(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Votes> for &'a Votes {
    type Output = Votes;

    fn sub(self, rhs: &'a Votes) -> Votes {
        Votes(&self.0 - &rhs.0)
    }
}

impl Neg for Votes {
    type Output = Votes;

    fn neg(self) -> Votes {
        Votes(-self.0)
    }
}

impl Mul<u64> for Votes {
    type Output = Votes;

    fn mul(self, rhs: u64) -> Votes {
        Votes(self.0 * BigRational::from_integer(BigInt::from(rhs)))
    }
}

impl Mul<u64> for &Votes {
    type Output = Votes;

    fn mul(self, rhs: u64) -> Votes {
        Votes(&self.0 * BigRational::from_integer(BigInt::from(rhs)))
    }
}

impl Sum for Votes {
    fn sum<I: Iterator<Item = Votes>>(iter: I) -> Votes {
        iter.fold(Votes::zero(), |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a Votes> for Votes {
    fn sum<I: Iterator<Item = &'a Votes>>(iter: I) -> Votes {
        iter.fold(Votes::zero(), |acc, v| acc + v)
    }
}

impl From<u64> for Votes {
    fn from(n: u64) -> Self {
        Votes(BigRational::from_integer(BigInt::from(n)))
    }
}

impl fmt::Display for Votes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}
