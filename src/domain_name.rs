//! Domain name helpers
//!
//! Extraction of the top-level label from a dotted name, tolerating leading
//! and trailing dots the way user input tends to arrive.

/// Find the top-level domain of a given domain name.
///
/// `icann.org` and `icann.org.` both yield `org`; a bare label is returned
/// as-is.
pub fn top_level_domain(domain_name: &str) -> &str {
    let name = strip_trailing_dot(domain_name);
    match name.rsplit('.').next() {
        Some(label) => label,
        None => name,
    }
}

/// Strip one leading dot: `.abc.com` becomes `abc.com`. A lone dot is left
/// alone.
pub fn strip_leading_dot(domain_name: &str) -> &str {
    if domain_name.len() > 1 && domain_name.starts_with('.') {
        &domain_name[1..]
    } else {
        domain_name
    }
}

/// Strip one trailing dot: `abc.` becomes `abc`.
pub fn strip_trailing_dot(domain_name: &str) -> &str {
    if domain_name.ends_with('.') {
        &domain_name[..domain_name.len() - 1]
    } else {
        domain_name
    }
}
