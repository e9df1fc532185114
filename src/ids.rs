// 🎲 Identifier generation
//
// One generator per registry, seeded once. Account ids are drawn by
// rejection sampling against the live account set; transaction ids are
// checked against every id the generator has issued or been shown.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

pub const ACCOUNT_PREFIX: &str = "ACC";
pub const TRANSACTION_PREFIX: &str = "TXN";

const ACCOUNT_SUFFIX_MIN: u32 = 10_000;
const ACCOUNT_SUFFIX_MAX: u32 = 99_999;
const TRANSACTION_SUFFIX_LEN: usize = 8;
const TRANSACTION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
    issued_transactions: HashSet<String>,
}

impl IdGenerator {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests and reproducible sessions
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        IdGenerator {
            rng,
            issued_transactions: HashSet::new(),
        }
    }

    /// Draw `ACC#####` candidates until `taken` rejects none.
    ///
    /// Terminates as long as the 90 000-id space is not exhausted; callers
    /// check [`Self::account_space_exhausted`] first.
    pub fn next_account_id<F>(&mut self, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let suffix = self.rng.gen_range(ACCOUNT_SUFFIX_MIN..=ACCOUNT_SUFFIX_MAX);
            let candidate = format!("{}{}", ACCOUNT_PREFIX, suffix);
            if !taken(&candidate) {
                return candidate;
            }
            tracing::debug!("Account id {} already in use, drawing again", candidate);
        }
    }

    pub fn account_space_exhausted(existing: usize) -> bool {
        existing >= (ACCOUNT_SUFFIX_MAX - ACCOUNT_SUFFIX_MIN + 1) as usize
    }

    /// `TXN` + 8 characters from `[A-Z0-9]`, never repeated by this generator
    pub fn next_transaction_id(&mut self) -> String {
        loop {
            let suffix: String = (0..TRANSACTION_SUFFIX_LEN)
                .map(|_| {
                    let index = self.rng.gen_range(0..TRANSACTION_ALPHABET.len());
                    TRANSACTION_ALPHABET[index] as char
                })
                .collect();
            let candidate = format!("{}{}", TRANSACTION_PREFIX, suffix);
            if self.issued_transactions.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Mark ids loaded from storage as taken
    pub fn reserve_transaction_ids<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.issued_transactions
            .extend(ids.into_iter().map(str::to_string));
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
