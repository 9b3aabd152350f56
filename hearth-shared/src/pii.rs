use std::fmt;

/// Masks an account identity for log output. Emails keep their first
/// character and domain so operators can still correlate log lines; anything
/// that does not look like an email is obscured entirely.
pub struct Masked<'a>(pub &'a str);

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                if let Some(first) = local.chars().next() {
                    return write!(f, "{}***@{}", first, domain);
                }
                write!(f, "********")
            }
            _ => write!(f, "********"),
        }
    }
}

impl fmt::Debug for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
