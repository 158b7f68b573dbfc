use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

pub const ACCESS_CODE_LENGTH: usize = 6;
pub const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws one code from `rng`: six characters of uppercase letters and digits.
pub fn generate_access_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ACCESS_CODE_LENGTH)
        .map(|_| ACCESS_CODE_ALPHABET[rng.gen_range(0..ACCESS_CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn is_well_formed_access_code(code: &str) -> bool {
    code.len() == ACCESS_CODE_LENGTH && code.bytes().all(|b| ACCESS_CODE_ALPHABET.contains(&b))
}

/// Source of candidate folder codes. Uniqueness is checked by the caller.
pub trait AccessCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAccessCodeGenerator;

impl AccessCodeGenerator for RandomAccessCodeGenerator {
    fn generate(&self) -> String {
        generate_access_code(&mut rand::thread_rng())
    }
}

/// Deterministic generator for fixtures and tests.
pub struct SeededAccessCodeGenerator {
    rng: Mutex<StdRng>,
}

impl SeededAccessCodeGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl AccessCodeGenerator for SeededAccessCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generate_access_code(&mut *rng)
    }
}
