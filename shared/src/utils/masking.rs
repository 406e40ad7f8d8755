//! Masking helpers for log output
//!
//! Subjects are personal data; log lines only ever carry the masked form.

/// Mask a verification subject for logging (e.g., `a***@example.com`)
///
/// Email addresses keep their first character and domain. Anything else
/// keeps its last four characters.
pub fn mask_subject(subject: &str) -> String {
    if let Some((local, domain)) = subject.split_once('@') {
        let first = local.chars().next().map(String::from).unwrap_or_default();
        return format!("{}***@{}", first, domain);
    }

    let count = subject.chars().count();
    if count <= 4 {
        "****".to_string()
    } else {
        let tail: String = subject.chars().skip(count - 4).collect();
        format!("***{}", tail)
    }
}

/// Mask credentials in a connection URL (e.g., `redis://****@host:6379`)
pub fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
