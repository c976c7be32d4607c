//! `mailto:` handoff to the user's mail client.
//!
//! The link only pre-fills a message; nothing here confirms delivery.

use std::io;
use std::process::Command;

use crate::drafting::EmailDraft;

/// Fields of a pre-filled email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailtoLink {
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub body: String,
}

impl MailtoLink {
    pub fn from_draft(to: &str, cc: &str, draft: &EmailDraft) -> Self {
        Self {
            to: to.trim().to_string(),
            cc: cc.trim().to_string(),
            subject: draft.subject.clone(),
            body: draft.body.clone(),
        }
    }

    /// Builds the URI. Every field is percent-encoded; addresses keep `@`
    /// and `,` so multiple recipients stay readable.
    pub fn to_uri(&self) -> String {
        let mut uri = format!("mailto:{}", encode(&self.to, b"@,"));
        let mut sep = '?';
        for (key, value, keep) in [
            ("cc", &self.cc, &b"@,"[..]),
            ("subject", &self.subject, &b""[..]),
            ("body", &self.body, &b""[..]),
        ] {
            if value.is_empty() {
                continue;
            }
            uri.push(sep);
            uri.push_str(key);
            uri.push('=');
            uri.push_str(&encode(value, keep));
            sep = '&';
        }
        uri
    }
}

/// Percent-encodes everything outside the URI-component unreserved set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`) and `keep`, byte by byte over UTF-8.
fn encode(value: &str, keep: &[u8]) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        let unreserved = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
        if unreserved || keep.contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Hands the URI to the platform's default handler.
pub fn open_in_mail_client(uri: &str) -> io::Result<()> {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(uri).status()?
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", "", uri]).status()?
    } else {
        Command::new("xdg-open").arg(uri).status()?
    };
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("mail client launcher exited with {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_uri_component() {
        assert_eq!(encode("a b&c=d", b""), "a%20b%26c%3Dd");
        assert_eq!(encode("line1\nline2", b""), "line1%0Aline2");
        assert_eq!(encode("it's (ok)!", b""), "it's%20(ok)!");
        assert_eq!(encode("é", b""), "%C3%A9");
    }

    #[test]
    fn full_link() {
        let link = MailtoLink {
            to: "support@osi.example".into(),
            cc: "a@example.com,b@example.com".into(),
            subject: "Personnel Change: Alex".into(),
            body: "Hello,\n\nAlex is leaving.".into(),
        };
        assert_eq!(
            link.to_uri(),
            "mailto:support@osi.example?cc=a@example.com,b@example.com\
             &subject=Personnel%20Change%3A%20Alex\
             &body=Hello%2C%0A%0AAlex%20is%20leaving."
        );
    }

    #[test]
    fn empty_fields_are_omitted() {
        let link = MailtoLink {
            to: String::new(),
            cc: String::new(),
            subject: "Hi".into(),
            body: String::new(),
        };
        assert_eq!(link.to_uri(), "mailto:?subject=Hi");
    }

    #[test]
    fn from_draft_trims_addresses() {
        let draft = EmailDraft {
            subject: "S".into(),
            body: "B".into(),
        };
        let link = MailtoLink::from_draft(" gfs@example.com ", "", &draft);
        assert_eq!(link.to_uri(), "mailto:gfs@example.com?subject=S&body=B");
    }
}
