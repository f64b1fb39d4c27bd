// SPDX-License-Identifier: MIT

/// Domain byte prefixed to every leaf preimage.
pub const LEAF_DOMAIN: u8 = 0x00;

/// Domain byte prefixed to every internal node preimage.
///
/// Distinct from [`LEAF_DOMAIN`] so an internal node can never be replayed as a leaf.
pub const NODE_DOMAIN: u8 = 0x01;

/// Version of the canonical claim encoding. Bump when the leaf layout changes.
pub const LEAF_ENCODING_VERSION: u8 = 0x01;

/// Leaf preimage length: domain + version + address + amount + claim type.
pub const LEAF_PREIMAGE_LEN: usize = 1 + 1 + 20 + 32 + 1;

/// Default upper bound on entries per shard file.
pub const DEFAULT_SHARD_MAX_ITEMS: usize = 1_000;

/// Default upper bound on serialized bytes per shard file (512 KiB).
pub const DEFAULT_SHARD_MAX_BYTES: usize = 512 * 1024;

/// Generated artifact names inside an output location.
pub const ADDRESS_FILE: &str = "address.json";
pub const ROOT_FILE: &str = "root.json";
pub const CLAIMS_FILE: &str = "claims.json";
pub const PARAMETERS_FILE: &str = "parameters.json";
pub const SHARD_PREFIX: &str = "claims-";
pub const SHARD_SUFFIX: &str = ".json";

/// Prefix of the temporary directory artifacts are staged in before install.
pub const STAGING_PREFIX: &str = ".airdrop-staging-";

/// File name of shard number `index`.
pub fn shard_file_name(index: usize) -> String {
    format!("{SHARD_PREFIX}{index}{SHARD_SUFFIX}")
}

/// Parse a shard index back out of a file name produced by [`shard_file_name`].
pub fn parse_shard_file_name(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(SHARD_PREFIX)?.strip_suffix(SHARD_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
