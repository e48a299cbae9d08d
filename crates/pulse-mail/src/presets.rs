//! Provider preset catalog
//!
//! Each preset maps to the provider's published IMAP/SMTP endpoints so a
//! user only types address and password. `Custom` returns nothing and the
//! client must supply hosts and ports itself.

use once_cell::sync::Lazy;
use pulse_models::email::MailProvider;
use std::collections::HashMap;

/// IMAP/SMTP endpoints for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub imap_host: &'static str,
    pub imap_port: i32,
    pub smtp_host: &'static str,
    pub smtp_port: i32,
}

static CATALOG: Lazy<HashMap<MailProvider, ProviderEndpoints>> = Lazy::new(|| {
    HashMap::from([
        (
            MailProvider::Gmail,
            ProviderEndpoints {
                imap_host: "imap.gmail.com",
                imap_port: 993,
                smtp_host: "smtp.gmail.com",
                smtp_port: 465,
            },
        ),
        (
            MailProvider::Outlook,
            ProviderEndpoints {
                imap_host: "outlook.office365.com",
                imap_port: 993,
                smtp_host: "smtp-mail.outlook.com",
                smtp_port: 587,
            },
        ),
        (
            MailProvider::Aruba,
            ProviderEndpoints {
                imap_host: "imaps.aruba.it",
                imap_port: 993,
                smtp_host: "smtps.aruba.it",
                smtp_port: 465,
            },
        ),
        (
            // certified mail (PEC) endpoints differ from plain Aruba mail
            MailProvider::ArubaPec,
            ProviderEndpoints {
                imap_host: "imaps.pec.aruba.it",
                imap_port: 993,
                smtp_host: "smtps.pec.aruba.it",
                smtp_port: 465,
            },
        ),
        (
            MailProvider::Libero,
            ProviderEndpoints {
                imap_host: "imapmail.libero.it",
                imap_port: 993,
                smtp_host: "smtp.libero.it",
                smtp_port: 465,
            },
        ),
    ])
});

/// Endpoints for a preset; `None` for `Custom`
pub fn preset_endpoints(provider: MailProvider) -> Option<&'static ProviderEndpoints> {
    CATALOG.get(&provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_presets_resolve() {
        let gmail = preset_endpoints(MailProvider::Gmail).unwrap();
        assert_eq!(gmail.imap_host, "imap.gmail.com");
        assert_eq!(gmail.imap_port, 993);

        let pec = preset_endpoints(MailProvider::ArubaPec).unwrap();
        assert_eq!(pec.smtp_host, "smtps.pec.aruba.it");
    }

    #[test]
    fn test_custom_has_no_preset() {
        assert!(preset_endpoints(MailProvider::Custom).is_none());
    }
}
