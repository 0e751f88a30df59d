// vline-parser - Arbitrary-precision decimal numbers for VLine
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! Signed arbitrary-precision decimal arithmetic.
//!
//! `BigNum` stores base-10 digits directly: the integer part little-endian
//! (index 0 is the ones digit) and the fractional part most-significant
//! first. The fractional budget is fixed at [`DECIMAL_LIMIT`] digits;
//! results beyond it are truncated, never rounded.
//!
//! Multiplication runs over an FFT convolution once the combined digit
//! count reaches [`FFT_THRESHOLD`]; below that a schoolbook convolution
//! produces bit-identical results.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_traits::{One, Zero};

/// Fractional-digit budget applied to every arithmetic result.
pub const DECIMAL_LIMIT: usize = 20;

/// Combined digit count at which multiplication switches to the FFT path.
const FFT_THRESHOLD: usize = 64;

/// A signed arbitrary-precision decimal number.
///
/// Invariants maintained by every constructor and operation:
/// - `integer` holds at least one digit and no leading zero beyond
///   position 0 (i.e. the most significant stored digit is non-zero
///   unless the whole integer part is the single digit 0),
/// - `decimal` holds at most [`DECIMAL_LIMIT`] digits with no trailing
///   zeros,
/// - zero is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigNum {
    negative: bool,
    /// Integer digits, least significant first. Never empty.
    integer: Vec<u8>,
    /// Fractional digits, most significant first. Trailing zeros trimmed.
    decimal: Vec<u8>,
}

/// Error produced when a numeric literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBigNumError {
    pub message: String,
}

impl fmt::Display for ParseBigNumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseBigNumError {}

fn parse_error(message: impl Into<String>) -> ParseBigNumError {
    ParseBigNumError {
        message: message.into(),
    }
}

impl BigNum {
    /// The number zero.
    pub fn new() -> Self {
        BigNum {
            negative: false,
            integer: vec![0],
            decimal: Vec::new(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.integer == [0] && self.decimal.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Drops trailing fractional digits, keeping the sign.
    pub fn trunc(&self) -> BigNum {
        let mut result = self.clone();
        result.decimal.clear();
        result.normalize();
        result
    }

    /// Absolute value.
    pub fn abs(&self) -> BigNum {
        let mut result = self.clone();
        result.negative = false;
        result
    }

    fn negated(&self) -> BigNum {
        let mut result = self.clone();
        if !result.is_zero() {
            result.negative = !result.negative;
        }
        result
    }

    /// Restores the representation invariants after digit surgery.
    fn normalize(&mut self) {
        while self.integer.len() > 1 && *self.integer.last().unwrap_or(&1) == 0 {
            self.integer.pop();
        }
        if self.integer.is_empty() {
            self.integer.push(0);
        }
        self.decimal.truncate(DECIMAL_LIMIT);
        while self.decimal.last() == Some(&0) {
            self.decimal.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
    }

    fn dec_digit(&self, i: usize) -> u8 {
        self.decimal.get(i).copied().unwrap_or(0)
    }

    fn int_digit(&self, i: usize) -> u8 {
        self.integer.get(i).copied().unwrap_or(0)
    }

    /// Compares magnitudes, ignoring sign.
    fn compare_abs(&self, rhs: &BigNum) -> Ordering {
        if self.integer.len() != rhs.integer.len() {
            return self.integer.len().cmp(&rhs.integer.len());
        }
        for i in (0..self.integer.len()).rev() {
            match self.integer[i].cmp(&rhs.integer[i]) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        let max_dec = self.decimal.len().max(rhs.decimal.len());
        for i in 0..max_dec {
            match self.dec_digit(i).cmp(&rhs.dec_digit(i)) {
                Ordering::Equal => {}
                other => return other,
            }
        }
        Ordering::Equal
    }

    fn add_impl(&self, rhs: &BigNum) -> BigNum {
        if self.negative != rhs.negative {
            return self.sub_impl(&rhs.negated());
        }

        let mut result = BigNum::new();
        result.negative = self.negative;

        // Fractional digits, least significant first.
        let max_dec = self.decimal.len().max(rhs.decimal.len());
        result.decimal = vec![0; max_dec];
        let mut carry = 0u8;
        for i in (0..max_dec).rev() {
            let sum = self.dec_digit(i) + rhs.dec_digit(i) + carry;
            result.decimal[i] = sum % 10;
            carry = sum / 10;
        }

        let max_int = self.integer.len().max(rhs.integer.len());
        result.integer = vec![0; max_int];
        for i in 0..max_int {
            let sum = self.int_digit(i) + rhs.int_digit(i) + carry;
            result.integer[i] = sum % 10;
            carry = sum / 10;
        }
        if carry > 0 {
            result.integer.push(carry);
        }

        result.normalize();
        result
    }

    fn sub_impl(&self, rhs: &BigNum) -> BigNum {
        if self.negative != rhs.negative {
            return self.add_impl(&rhs.negated());
        }

        if self.compare_abs(rhs) == Ordering::Less {
            let mut result = rhs.sub_impl(self);
            if !result.is_zero() {
                result.negative = !self.negative;
            }
            result.normalize();
            return result;
        }

        let mut result = BigNum::new();
        result.negative = self.negative;

        let max_dec = self.decimal.len().max(rhs.decimal.len());
        result.decimal = vec![0; max_dec];
        let mut borrow = 0i8;
        for i in (0..max_dec).rev() {
            let mut diff = self.dec_digit(i) as i8 - rhs.dec_digit(i) as i8 - borrow;
            borrow = 0;
            if diff < 0 {
                diff += 10;
                borrow = 1;
            }
            result.decimal[i] = diff as u8;
        }

        result.integer = vec![0; self.integer.len()];
        for i in 0..self.integer.len() {
            let mut diff = self.int_digit(i) as i8 - rhs.int_digit(i) as i8 - borrow;
            borrow = 0;
            if diff < 0 {
                diff += 10;
                borrow = 1;
            }
            result.integer[i] = diff as u8;
        }

        result.normalize();
        result
    }

    /// Flattens the digits into one little-endian stream: fractional digits
    /// reversed (least significant first), then the integer digits.
    fn digit_stream(&self) -> Vec<u8> {
        let mut digits: Vec<u8> = self.decimal.iter().rev().copied().collect();
        digits.extend_from_slice(&self.integer);
        digits
    }

    fn mul_impl(&self, rhs: &BigNum) -> BigNum {
        if self.is_zero() || rhs.is_zero() {
            return BigNum::new();
        }

        let a = self.digit_stream();
        let b = rhs.digit_stream();

        let mut product = if a.len() + b.len() < FFT_THRESHOLD {
            convolve_schoolbook(&a, &b)
        } else {
            convolve_fft(&a, &b)
        };

        // Carry propagation in base 10.
        let mut carry = 0i64;
        for digit in product.iter_mut() {
            *digit += carry;
            carry = *digit / 10;
            *digit %= 10;
        }
        while carry > 0 {
            product.push(carry % 10);
            carry /= 10;
        }
        while product.len() > 1 && *product.last().unwrap_or(&1) == 0 {
            product.pop();
        }

        // The product's decimal point sits after the sum of the operand
        // fractional lengths; only the leading DECIMAL_LIMIT fractional
        // digits survive.
        let frac_len = self.decimal.len() + rhs.decimal.len();
        let digit_at = |i: usize| product.get(i).copied().unwrap_or(0) as u8;

        let kept = frac_len.min(DECIMAL_LIMIT);
        let mut decimal = Vec::with_capacity(kept);
        for i in (frac_len - kept..frac_len).rev() {
            decimal.push(digit_at(i));
        }

        let mut integer: Vec<u8> = Vec::new();
        for i in frac_len..product.len() {
            integer.push(digit_at(i));
        }
        if integer.is_empty() {
            integer.push(0);
        }

        let mut result = BigNum {
            negative: self.negative != rhs.negative,
            integer,
            decimal,
        };
        result.normalize();
        result
    }

    /// Long division. `None` when the divisor is zero.
    ///
    /// Produces the dividend's own fractional digits followed by
    /// [`DECIMAL_LIMIT`] further digits; the result is truncated, never
    /// rounded.
    pub fn checked_div(&self, rhs: &BigNum) -> Option<BigNum> {
        if rhs.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(BigNum::new());
        }

        let dividend = self.abs();
        let divisor = rhs.abs();
        let ten = BigNum::from(10);

        let mut remainder = BigNum::new();
        let bring_down = |remainder: &mut BigNum, digit: u8| -> u8 {
            *remainder = &(&*remainder * &ten) + &BigNum::from(digit as i64);
            let mut q = 0u8;
            while remainder.compare_abs(&divisor) != Ordering::Less {
                *remainder = remainder.sub_impl(&divisor);
                q += 1;
            }
            q
        };

        let mut integer_msb: Vec<u8> = Vec::new();
        for &d in dividend.integer.iter().rev() {
            integer_msb.push(bring_down(&mut remainder, d));
        }

        let mut decimal: Vec<u8> = Vec::new();
        for &d in dividend.decimal.iter() {
            decimal.push(bring_down(&mut remainder, d));
        }
        for _ in 0..DECIMAL_LIMIT {
            decimal.push(bring_down(&mut remainder, 0));
        }

        integer_msb.reverse();
        let mut quotient = BigNum {
            negative: self.negative != rhs.negative,
            integer: integer_msb,
            decimal,
        };
        quotient.normalize();
        Some(quotient)
    }

    /// `self − trunc(self / rhs) · rhs`, carrying the sign of `self`.
    /// `None` when the divisor is zero.
    pub fn checked_rem(&self, rhs: &BigNum) -> Option<BigNum> {
        let quotient = self.checked_div(rhs)?.trunc();
        let mut remainder = self - &(&quotient * rhs);
        remainder.negative = self.negative;
        remainder.normalize();
        Some(remainder)
    }

    /// Integer exponentiation by squaring. The exponent is truncated to an
    /// integer first; a negative exponent yields the reciprocal of the
    /// positive power. `None` when that reciprocal divides by zero.
    pub fn checked_pow(&self, exponent: &BigNum) -> Option<BigNum> {
        let exp = exponent.trunc().to_i64_saturating();
        let mut result = BigNum::one();
        let mut base = self.clone();
        let mut n = exp.unsigned_abs();
        while n > 0 {
            if n & 1 == 1 {
                result = &result * &base;
            }
            n >>= 1;
            if n > 0 {
                base = &base * &base;
            }
        }
        if exp < 0 {
            BigNum::one().checked_div(&result)
        } else {
            Some(result)
        }
    }

    /// Digit-by-digit square root with [`DECIMAL_LIMIT`] fractional
    /// digits. `None` for negative input.
    pub fn sqrt(&self) -> Option<BigNum> {
        if self.negative {
            return None;
        }
        if self.is_zero() {
            return Some(BigNum::new());
        }

        // Digit pairs, most significant first: the integer part padded to
        // an even length, then the fractional part padded to two digits
        // per requested result digit.
        let mut int_msb: Vec<u8> = self.integer.iter().rev().copied().collect();
        if int_msb.len() % 2 == 1 {
            int_msb.insert(0, 0);
        }
        let mut frac = self.decimal.clone();
        frac.resize(2 * DECIMAL_LIMIT, 0);

        let mut pairs: Vec<u8> = Vec::with_capacity(int_msb.len() / 2 + DECIMAL_LIMIT);
        for chunk in int_msb.chunks(2).chain(frac.chunks(2)) {
            pairs.push(chunk[0] * 10 + chunk[1]);
        }

        let ten = BigNum::from(10);
        let twenty = BigNum::from(20);
        let hundred = BigNum::from(100);
        let mut remainder = BigNum::new();
        let mut root = BigNum::new();
        let mut digits: Vec<u8> = Vec::with_capacity(pairs.len());

        for pair in pairs {
            remainder = &(&remainder * &hundred) + &BigNum::from(pair as i64);
            let base = &root * &twenty;
            let mut digit = 0u8;
            for candidate in (1..=9u8).rev() {
                let cand = BigNum::from(candidate as i64);
                let trial = &(&base + &cand) * &cand;
                if trial <= remainder {
                    digit = candidate;
                    remainder = &remainder - &trial;
                    break;
                }
            }
            root = &(&root * &ten) + &BigNum::from(digit as i64);
            digits.push(digit);
        }

        let int_len = int_msb.len() / 2;
        let mut result = BigNum {
            negative: false,
            integer: digits[..int_len].iter().rev().copied().collect(),
            decimal: digits[int_len..].to_vec(),
        };
        result.normalize();
        Some(result)
    }

    /// Converts the integer part to `i64`, saturating at the type bounds.
    pub fn to_i64_saturating(&self) -> i64 {
        let negative = self.negative && !self.is_zero();
        let mut result: i64 = 0;
        for &digit in self.integer.iter().rev() {
            let digit = digit as i64;
            if !negative {
                if result > i64::MAX / 10 {
                    return i64::MAX;
                }
                result *= 10;
                if result > i64::MAX - digit {
                    return i64::MAX;
                }
                result += digit;
            } else {
                if result < i64::MIN / 10 {
                    return i64::MIN;
                }
                result *= 10;
                if result < i64::MIN + digit {
                    return i64::MIN;
                }
                result -= digit;
            }
        }
        result
    }
}

impl Default for BigNum {
    fn default() -> Self {
        BigNum::new()
    }
}

// ============================================================================
// Multiplication kernels
// ============================================================================

fn convolve_schoolbook(a: &[u8], b: &[u8]) -> Vec<i64> {
    let mut out = vec![0i64; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x as i64 * y as i64;
        }
    }
    out
}

/// A bare-bones complex number; the FFT needs nothing more.
#[derive(Debug, Clone, Copy, Default)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    fn add(self, other: Complex) -> Complex {
        Complex::new(self.re + other.re, self.im + other.im)
    }

    fn sub(self, other: Complex) -> Complex {
        Complex::new(self.re - other.re, self.im - other.im)
    }

    fn mul(self, other: Complex) -> Complex {
        Complex::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }

    fn scale(self, factor: f64) -> Complex {
        Complex::new(self.re * factor, self.im * factor)
    }
}

/// Iterative radix-2 Cooley-Tukey transform. `a.len()` must be a power of
/// two.
fn fft(a: &mut [Complex], invert: bool) {
    let n = a.len();
    if n == 0 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j >= bit {
            j -= bit;
            bit >>= 1;
        }
        j += bit;
        if i < j {
            a.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let angle = 2.0 * std::f64::consts::PI / len as f64 * if invert { -1.0 } else { 1.0 };
        let wlen = Complex::new(angle.cos(), angle.sin());
        let mut i = 0;
        while i < n {
            let mut w = Complex::new(1.0, 0.0);
            for k in 0..len / 2 {
                let u = a[i + k];
                let v = a[i + k + len / 2].mul(w);
                a[i + k] = u.add(v);
                a[i + k + len / 2] = u.sub(v);
                w = w.mul(wlen);
            }
            i += len;
        }
        len <<= 1;
    }

    if invert {
        let inv_n = 1.0 / n as f64;
        for x in a.iter_mut() {
            *x = x.scale(inv_n);
        }
    }
}

fn convolve_fft(a: &[u8], b: &[u8]) -> Vec<i64> {
    let mut n = 1usize;
    while n < a.len() + b.len() {
        n <<= 1;
    }

    let mut fa = vec![Complex::default(); n];
    let mut fb = vec![Complex::default(); n];
    for (slot, &d) in fa.iter_mut().zip(a.iter()) {
        *slot = Complex::new(d as f64, 0.0);
    }
    for (slot, &d) in fb.iter_mut().zip(b.iter()) {
        *slot = Complex::new(d as f64, 0.0);
    }

    fft(&mut fa, false);
    fft(&mut fb, false);
    for i in 0..n {
        fa[i] = fa[i].mul(fb[i]);
    }
    fft(&mut fa, true);

    // Each bin rounds to the nearest integer before carrying.
    fa.iter().map(|c| c.re.round() as i64).collect()
}

// ============================================================================
// Conversions and parsing
// ============================================================================

impl From<i64> for BigNum {
    fn from(value: i64) -> Self {
        let negative = value < 0;
        let mut magnitude = (value as i128).unsigned_abs();
        let mut integer = Vec::new();
        loop {
            integer.push((magnitude % 10) as u8);
            magnitude /= 10;
            if magnitude == 0 {
                break;
            }
        }
        let mut result = BigNum {
            negative,
            integer,
            decimal: Vec::new(),
        };
        result.normalize();
        result
    }
}

impl FromStr for BigNum {
    type Err = ParseBigNumError;

    /// Accepts an optional sign, an optional decimal point, and an
    /// optional `e±N` exponent. The exponent shifts the implicit decimal
    /// point; the stored form never carries one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut num = s.trim();
        let mut negative = false;
        if let Some(rest) = num.strip_prefix('-') {
            negative = true;
            num = rest;
        } else if let Some(rest) = num.strip_prefix('+') {
            num = rest;
        }

        let mut exponent: i64 = 0;
        if let Some(e_pos) = num.find(['e', 'E']) {
            let exp_str = &num[e_pos + 1..];
            exponent = exp_str
                .parse::<i64>()
                .map_err(|_| parse_error(format!("Invalid exponent: {}", exp_str)))?;
            num = &num[..e_pos];
        }

        let (int_part, dec_part) = match num.find('.') {
            Some(dot) => (&num[..dot], &num[dot + 1..]),
            None => (num, ""),
        };

        let digits: String = format!("{}{}", int_part, dec_part);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(parse_error(format!("Invalid number: {}", s)));
        }

        // Shift the decimal point by the exponent.
        let new_dot = int_part.len() as i64 + exponent;
        let (mut new_int, new_dec): (String, String) = if new_dot >= 0 {
            let new_dot = new_dot as usize;
            if new_dot <= digits.len() {
                (digits[..new_dot].to_string(), digits[new_dot..].to_string())
            } else {
                let padding = "0".repeat(new_dot - digits.len());
                (format!("{}{}", digits, padding), String::new())
            }
        } else {
            let padding = "0".repeat((-new_dot) as usize);
            ("0".to_string(), format!("{}{}", padding, digits))
        };

        if new_int.is_empty() {
            new_int.push('0');
        }
        let trimmed = new_int.trim_start_matches('0');
        let new_int = if trimmed.is_empty() { "0" } else { trimmed };

        let integer: Vec<u8> = new_int.bytes().rev().map(|b| b - b'0').collect();
        let decimal: Vec<u8> = new_dec
            .bytes()
            .take(DECIMAL_LIMIT)
            .map(|b| b - b'0')
            .collect();

        let mut result = BigNum {
            negative,
            integer,
            decimal,
        };
        result.normalize();
        Ok(result)
    }
}

impl fmt::Display for BigNum {
    /// Canonical form `[-]digits[.digits]`, never an exponent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative && !self.is_zero() {
            write!(f, "-")?;
        }
        for &digit in self.integer.iter().rev() {
            write!(f, "{}", digit)?;
        }
        if !self.decimal.is_empty() {
            write!(f, ".")?;
            for &digit in &self.decimal {
                write!(f, "{}", digit)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Operator and numeric-trait impls
// ============================================================================

impl std::ops::Add for &BigNum {
    type Output = BigNum;
    fn add(self, rhs: &BigNum) -> BigNum {
        self.add_impl(rhs)
    }
}

impl std::ops::Add for BigNum {
    type Output = BigNum;
    fn add(self, rhs: BigNum) -> BigNum {
        self.add_impl(&rhs)
    }
}

impl std::ops::Sub for &BigNum {
    type Output = BigNum;
    fn sub(self, rhs: &BigNum) -> BigNum {
        self.sub_impl(rhs)
    }
}

impl std::ops::Sub for BigNum {
    type Output = BigNum;
    fn sub(self, rhs: BigNum) -> BigNum {
        self.sub_impl(&rhs)
    }
}

impl std::ops::Mul for &BigNum {
    type Output = BigNum;
    fn mul(self, rhs: &BigNum) -> BigNum {
        self.mul_impl(rhs)
    }
}

impl std::ops::Mul for BigNum {
    type Output = BigNum;
    fn mul(self, rhs: BigNum) -> BigNum {
        self.mul_impl(&rhs)
    }
}

impl std::ops::Neg for BigNum {
    type Output = BigNum;
    fn neg(self) -> BigNum {
        self.negated()
    }
}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.compare_abs(other),
            (true, true) => other.compare_abs(self),
        }
    }
}

impl Zero for BigNum {
    fn zero() -> Self {
        BigNum::new()
    }

    fn is_zero(&self) -> bool {
        BigNum::is_zero(self)
    }
}

impl One for BigNum {
    fn one() -> Self {
        BigNum::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> BigNum {
        s.parse().unwrap()
    }

    #[test]
    fn parse_canonical_round_trip() {
        assert_eq!(num("0").to_string(), "0");
        assert_eq!(num("-0").to_string(), "0");
        assert_eq!(num("007").to_string(), "7");
        assert_eq!(num("1.500").to_string(), "1.5");
        assert_eq!(num("-12.25").to_string(), "-12.25");
    }

    #[test]
    fn parse_exponent_shifts_point() {
        assert_eq!(num("1.5e3").to_string(), "1500");
        assert_eq!(num("25e-3").to_string(), "0.025");
        assert_eq!(num("-2e2").to_string(), "-200");
    }

    #[test]
    fn fractional_budget_truncates() {
        let third = num("1").checked_div(&num("3")).unwrap();
        assert_eq!(third.to_string(), "0.33333333333333333333");
    }

    #[test]
    fn modulo_keeps_dividend_sign() {
        assert_eq!(num("7").checked_rem(&num("3")).unwrap().to_string(), "1");
        assert_eq!(num("-7").checked_rem(&num("3")).unwrap().to_string(), "-1");
        assert_eq!(num("6").checked_rem(&num("3")).unwrap().to_string(), "0");
        assert!(!num("6").checked_rem(&num("3")).unwrap().is_negative());
    }

    #[test]
    fn saturating_conversion() {
        assert_eq!(num("42").to_i64_saturating(), 42);
        assert_eq!(num("-42.9").to_i64_saturating(), -42);
        assert_eq!(
            num("99999999999999999999999999").to_i64_saturating(),
            i64::MAX
        );
        assert_eq!(
            num("-99999999999999999999999999").to_i64_saturating(),
            i64::MIN
        );
    }

    #[test]
    fn sqrt_digits() {
        assert_eq!(num("144").sqrt().unwrap().to_string(), "12");
        // The 20th fractional digit of sqrt(2) is 0 and trims away.
        assert_eq!(num("2").sqrt().unwrap().to_string(), "1.4142135623730950488");
        assert!(num("-1").sqrt().is_none());
    }

    #[test]
    fn fft_matches_schoolbook() {
        // (10^40 + 1)^2 = 10^80 + 2*10^40 + 1; 82 combined digits cross
        // the FFT threshold.
        let x = format!("1{}1", "0".repeat(39));
        let expected = format!("1{}2{}1", "0".repeat(39), "0".repeat(39));
        let a = num(&x);
        assert_eq!((&a * &a).to_string(), expected);

        // Raw convolutions agree after carrying.
        let slow = convolve_schoolbook(&a.digit_stream(), &a.digit_stream());
        let fast = convolve_fft(&a.digit_stream(), &a.digit_stream());
        let carry_out = |mut v: Vec<i64>| {
            let mut carry = 0i64;
            for d in v.iter_mut() {
                *d += carry;
                carry = *d / 10;
                *d %= 10;
            }
            while carry > 0 {
                v.push(carry % 10);
                carry /= 10;
            }
            v
        };
        assert_eq!(carry_out(slow), carry_out(fast));
    }
}
