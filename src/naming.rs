//! Random names for stored files and generated repositories.
//!
//! Uniqueness is probabilistic: three random bytes plus a millisecond
//! timestamp for files, three random bytes for repositories.

use rand::prelude::*;

pub const GENERATED_REPO_PREFIX: &str = "dat-";
pub const UPLOAD_DIR: &str = "uploads";

const CODE_BYTES: usize = 3;

/// Lowercase hex string of `len` random bytes.
pub fn random_hex(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

/// Fresh repository name of the form `dat-xxxxxx`.
pub fn generate_repo_name() -> String {
    format!("{}{}", GENERATED_REPO_PREFIX, random_hex(CODE_BYTES))
}

/// `<code>-<epoch-ms>.<ext>`
pub fn stored_file_name(ext: &str, epoch_ms: i64) -> String {
    format!("{}-{}.{}", random_hex(CODE_BYTES), epoch_ms, ext)
}

/// Repository-relative path for a stored file.
pub fn upload_path(file_name: &str) -> String {
    format!("{}/{}", UPLOAD_DIR, file_name)
}

pub fn is_generated_repo_name(name: &str) -> bool {
    name.strip_prefix(GENERATED_REPO_PREFIX)
        .map(|code| code.len() == CODE_BYTES * 2 && is_lower_hex(code))
        .unwrap_or(false)
}

fn is_lower_hex(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
