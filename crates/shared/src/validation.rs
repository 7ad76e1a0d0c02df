//! Common validation utilities.

/// Normalizes an email address for lookups: surrounding whitespace removed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns the domain part of an email address, if it has one.
pub fn email_domain(email: &str) -> Option<&str> {
    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(domain)
}

/// Checks whether a normalized email ends with one of the allowed domain suffixes.
///
/// Suffixes are compared case-insensitively and may be given with or without a
/// leading `@` (`"acme.com"` and `"@acme.com"` are equivalent). Subdomains do
/// not match: `user@mail.acme.com` is rejected for `acme.com`.
pub fn has_allowed_domain(email: &str, allowed: &[String]) -> bool {
    let Some(domain) = email_domain(email) else {
        return false;
    };
    let domain = domain.to_lowercase();
    allowed.iter().any(|suffix| {
        let suffix = suffix.trim().trim_start_matches('@').to_lowercase();
        !suffix.is_empty() && domain == suffix
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["acme.com".to_string()]
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@ACME.com "), "jane.doe@acme.com");
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("a@acme.com"), Some("acme.com"));
        assert_eq!(email_domain("acme.com"), None);
        assert_eq!(email_domain("@acme.com"), None);
        assert_eq!(email_domain("a@"), None);
    }

    #[test]
    fn test_has_allowed_domain() {
        assert!(has_allowed_domain("jane@acme.com", &allowed()));
        assert!(has_allowed_domain("jane@ACME.COM", &allowed()));
        assert!(!has_allowed_domain("jane@example.com", &allowed()));
        assert!(!has_allowed_domain("jane@notacme.com", &allowed()));
        assert!(!has_allowed_domain("jane@mail.acme.com", &allowed()));
        assert!(!has_allowed_domain("not-an-email", &allowed()));
    }

    #[test]
    fn test_has_allowed_domain_with_at_prefix() {
        let allowed = vec!["@acme.com".to_string(), "partner.io".to_string()];
        assert!(has_allowed_domain("a@acme.com", &allowed));
        assert!(has_allowed_domain("b@partner.io", &allowed));
    }

    #[test]
    fn test_has_allowed_domain_empty_list() {
        assert!(!has_allowed_domain("jane@acme.com", &[]));
    }
}
