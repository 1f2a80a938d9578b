//! Opaque identifiers
//!
//! Short random tokens used for list keys (draft candidates, checklist items,
//! links). They carry no meaning beyond uniqueness within their list.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Random 9-character base-36 token
pub fn new_id(rng: &mut impl Rng) -> String {
    (0..ID_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Fresh token not yet used by `taken`
pub fn unique_id<'a, R, I>(rng: &mut R, taken: I) -> String
where
    R: Rng,
    I: IntoIterator<Item = &'a str> + Clone,
{
    loop {
        let id = new_id(rng);
        if !taken.clone().into_iter().any(|t| t == id) {
            return id;
        }
    }
}
