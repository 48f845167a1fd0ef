use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Any run of characters that may not appear inside a slug
    pub static ref NON_SLUG_RUN_REGEX: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}
