//! Seeded Alea generator for reproducible fixtures.
//!
//! The seed is hashed with the Mash function over its UTF-16 code units, so the
//! same seed produces the same stream on every run and on every implementation
//! of the same algorithm. Not suitable for anything that needs unpredictability.

use std::ops::Range;

use rand::RngCore;

use crate::ids::Guid;

const MASH_INITIAL: f64 = 4_022_871_197.0; // 0xefc8249d
const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_NEG_32: f64 = 2.328_306_436_538_696_3e-10;

/// `x >>> 0` for the non-negative values Mash produces.
fn to_uint32(x: f64) -> f64 {
    (x.trunc() as u64 % (1u64 << 32)) as f64
}

struct Mash {
    n: f64,
}

impl Mash {
    fn new() -> Self {
        Self { n: MASH_INITIAL }
    }

    fn hash(&mut self, data: &str) -> f64 {
        for unit in data.encode_utf16() {
            self.n += f64::from(unit);
            let mut h = 0.025_196_032_824_169_38 * self.n;
            self.n = to_uint32(h);
            h -= self.n;
            h *= self.n;
            self.n = to_uint32(h);
            h -= self.n;
            self.n += h * TWO_POW_32;
        }
        to_uint32(self.n) * TWO_POW_NEG_32
    }
}

pub struct PseudoRandom {
    s0: f64,
    s1: f64,
    s2: f64,
    c: f64,
}

impl PseudoRandom {
    pub fn new(seed: &str) -> Self {
        let mut mash = Mash::new();
        let mut s0 = mash.hash(" ");
        let mut s1 = mash.hash(" ");
        let mut s2 = mash.hash(" ");

        s0 -= mash.hash(seed);
        if s0 < 0.0 {
            s0 += 1.0;
        }
        s1 -= mash.hash(seed);
        if s1 < 0.0 {
            s1 += 1.0;
        }
        s2 -= mash.hash(seed);
        if s2 < 0.0 {
            s2 += 1.0;
        }

        Self { s0, s1, s2, c: 1.0 }
    }

    /// Next value in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        let t = 2_091_639.0 * self.s0 + self.c * TWO_POW_NEG_32;
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.c = t.trunc();
        self.s2 = t - self.c;
        self.s2
    }

    /// Uniform integer in `range`. Panics on an empty range.
    pub fn random_int(&mut self, range: Range<i64>) -> i64 {
        assert!(range.start < range.end, "empty range {range:?}");
        let span = (range.end - range.start) as f64;
        range.start + (self.random() * span).floor() as i64
    }

    pub fn random_bool(&mut self) -> bool {
        self.random() < 0.5
    }

    pub fn random_element<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random_int(0..items.len() as i64) as usize;
        items.get(index)
    }

    pub fn random_guid(&mut self) -> Guid {
        Guid::from_random(self)
    }
}

impl RngCore for PseudoRandom {
    fn next_u32(&mut self) -> u32 {
        (self.random() * TWO_POW_32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = (self.random() * 256.0) as u8;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
