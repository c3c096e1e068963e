// JS-SDK config signature

use rand::Rng;
use sha1::{Digest, Sha1};

const NONCE_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the nonce handed out by /jssdk_config
pub const NONCE_LEN: usize = 32;

/// Random nonce of `len` ASCII letters
pub fn nonce_str(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| NONCE_LETTERS[rng.gen_range(0..NONCE_LETTERS.len())] as char)
        .collect()
}

/// Sign a JS-SDK config
///
/// Anything from the first `#` in `url` is dropped. The four fields are joined in
/// fixed order, SHA-1 hashed, and returned as lowercase hex.
pub fn sign(jsapi_ticket: &str, nonce_str: &str, timestamp: &str, url: &str) -> String {
    let url = url.split_once('#').map_or(url, |(page, _)| page);

    let mut hasher = Sha1::new();
    hasher.update(b"jsapi_ticket=");
    hasher.update(jsapi_ticket.as_bytes());
    hasher.update(b"&noncestr=");
    hasher.update(nonce_str.as_bytes());
    hasher.update(b"&timestamp=");
    hasher.update(timestamp.as_bytes());
    hasher.update(b"&url=");
    hasher.update(url.as_bytes());

    format!("{:x}", hasher.finalize())
}
