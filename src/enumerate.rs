//! Combinatorial enumerators.
//!
//! [`Odometer`] counts through every fixed-length tuple over `0..base` in
//! mixed-radix order. [`RaggedProduct`] builds on it to pick one element from
//! each of several slices of different lengths.

/// Every `n`-tuple over `0..base`, rightmost position fastest.
///
/// Yields exactly `base.pow(n)` tuples, starting at `(0, .., 0)`. With `n == 0`
/// that is a single empty tuple.
#[derive(Clone, Debug)]
pub struct Odometer {
    base: usize,
    digits: Vec<usize>,
    done: bool,
}

impl Odometer {
    pub fn new(base: usize, n: usize) -> Self {
        Odometer {
            base,
            digits: vec![0; n],
            done: base == 0 && n > 0,
        }
    }

    /// Rewind to the first tuple.
    pub fn reset(&mut self) {
        self.digits.iter_mut().for_each(|d| *d = 0);
        self.done = self.base == 0 && !self.digits.is_empty();
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn width(&self) -> usize {
        self.digits.len()
    }

    /// Advance the digits; returns false on wrap-around.
    fn advance(&mut self) -> bool {
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.base {
                return true;
            }
            *digit = 0;
        }
        false
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.digits.clone();
        self.done = !self.advance();
        Some(current)
    }
}

/// Cartesian product over slices of possibly different lengths.
///
/// Runs an [`Odometer`] over `0..max_len` and drops every tuple that points
/// past the end of its slice. An empty slice anywhere means no tuples.
#[derive(Clone, Debug)]
pub struct RaggedProduct<'a, T> {
    seqs: Vec<&'a [T]>,
    odometer: Odometer,
}

impl<'a, T: Copy> RaggedProduct<'a, T> {
    pub fn new(seqs: Vec<&'a [T]>) -> Self {
        let base = seqs.iter().map(|s| s.len()).max().unwrap_or(0);
        let odometer = Odometer::new(base, seqs.len());
        RaggedProduct { seqs, odometer }
    }

    pub fn reset(&mut self) {
        self.odometer.reset();
    }
}

impl<'a, T: Copy> Iterator for RaggedProduct<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        'tuples: for indexes in self.odometer.by_ref() {
            let mut tuple = Vec::with_capacity(indexes.len());
            for (seq, &i) in self.seqs.iter().zip(&indexes) {
                match seq.get(i) {
                    Some(&v) => tuple.push(v),
                    None => continue 'tuples,
                }
            }
            return Some(tuple);
        }
        None
    }
}
