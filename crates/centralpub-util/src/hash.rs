use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;
use std::path::Path;

/// Stream a file through digest `D`, returning a lowercase hex string.
pub fn hex_digest_file<D: Digest>(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(to_hex(&hasher.finalize()))
}

/// Compute the MD5 hash of a file, returning a lowercase hex string.
pub fn md5_file(path: &Path) -> std::io::Result<String> {
    hex_digest_file::<Md5>(path)
}

/// Compute the SHA-1 hash of a file, returning a lowercase hex string.
pub fn sha1_file(path: &Path) -> std::io::Result<String> {
    hex_digest_file::<Sha1>(path)
}

/// Compute the SHA-256 hash of a file, returning a lowercase hex string.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    hex_digest_file::<Sha256>(path)
}

/// Compute the SHA-512 hash of a file, returning a lowercase hex string.
pub fn sha512_file(path: &Path) -> std::io::Result<String> {
    hex_digest_file::<Sha512>(path)
}

/// Compute the MD5 hash of a byte slice, returning a lowercase hex string.
pub fn md5_bytes(data: &[u8]) -> String {
    to_hex(&Md5::digest(data))
}

/// Compute the SHA-1 hash of a byte slice, returning a lowercase hex string.
pub fn sha1_bytes(data: &[u8]) -> String {
    to_hex(&Sha1::digest(data))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
