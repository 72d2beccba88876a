// src/identity.rs
//! Stable display identities for feed items the upstream store has not
//! assigned a persisted row id.

const ID_LEN: usize = 8;

/// Derive an 8-character base-36 id from an item's title and link.
///
/// Both strings are folded into one 32-bit accumulator with the rolling
/// `hash * 31 + code` recurrence, wrapping on overflow. The same
/// `(title, link)` pair always yields the same id within one process.
/// Collisions are possible and tolerated: the id exists for read-state
/// matching and display dedup, not global uniqueness.
pub fn derive_article_id(title: &str, link: &str) -> String {
    let mut hash: i32 = 0;
    for ch in title.chars().chain(link.chars()) {
        // (hash << 5) - hash == hash * 31
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as i32);
    }

    let mut id = to_base36((hash as i64).unsigned_abs());
    if id.len() > ID_LEN {
        id.truncate(ID_LEN);
    } else {
        while id.len() < ID_LEN {
            id.insert(0, '0');
        }
    }
    id
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).expect("base36 digits are ascii")
}
