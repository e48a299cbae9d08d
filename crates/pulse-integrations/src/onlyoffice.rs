//! OnlyOffice document-editor config
//!
//! The document server only accepts editor configs whose JWT (HS256,
//! shared secret) matches the payload.

use jsonwebtoken::{encode, EncodingKey, Header};
use pulse_core::config::OnlyOfficeConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnlyOfficeError {
    #[error("Signing failed: {0}")]
    Signing(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
}

/// Editor permissions for the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPermissions {
    pub edit: bool,
    pub download: bool,
    pub print: bool,
}

impl Default for EditorPermissions {
    fn default() -> Self {
        Self {
            edit: true,
            download: true,
            print: true,
        }
    }
}

/// The config payload handed to the editor, signed as its own JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    pub document: DocumentSection,
    pub editor_config: EditorSection,
    /// HS256 signature over this config
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    pub file_type: String,
    /// Cache key; must change whenever the stored document changes
    pub key: String,
    pub title: String,
    pub url: String,
    pub permissions: EditorPermissions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSection {
    pub callback_url: String,
    pub lang: String,
    pub mode: String,
    pub user: EditorUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorUser {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
struct ConfigClaims {
    document: DocumentSection,
    #[serde(rename = "editorConfig")]
    editor_config: EditorSection,
    exp: usize,
}

const SUPPORTED: &[&str] = &["docx", "xlsx", "pptx", "odt", "ods", "pdf"];

pub struct OnlyOfficeService {
    config: OnlyOfficeConfig,
}

impl OnlyOfficeService {
    pub fn new(config: OnlyOfficeConfig) -> Self {
        Self { config }
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    /// Build a signed editor config for one document
    pub fn editor_config(
        &self,
        document_key: &str,
        title: &str,
        document_url: &str,
        user_id: i64,
        user_name: &str,
        permissions: EditorPermissions,
    ) -> Result<EditorConfig, OnlyOfficeError> {
        let file_type = title
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if !SUPPORTED.contains(&file_type.as_str()) {
            return Err(OnlyOfficeError::UnsupportedFileType(file_type));
        }

        let document = DocumentSection {
            file_type,
            key: document_key.to_string(),
            title: title.to_string(),
            url: document_url.to_string(),
            permissions,
        };
        let editor = EditorSection {
            callback_url: self.config.callback_url.clone(),
            lang: "it".to_string(),
            mode: "edit".to_string(),
            user: EditorUser {
                id: user_id.to_string(),
                name: user_name.to_string(),
            },
        };

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as usize;

        let claims = ConfigClaims {
            document: document.clone(),
            editor_config: editor.clone(),
            exp: now + 300,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| OnlyOfficeError::Signing(e.to_string()))?;

        Ok(EditorConfig {
            document,
            editor_config: editor,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn service() -> OnlyOfficeService {
        OnlyOfficeService::new(OnlyOfficeConfig {
            server_url: "http://onlyoffice.local".into(),
            jwt_secret: "shared-secret".into(),
            callback_url: "http://localhost:8080/api/documents/callback".into(),
        })
    }

    #[test]
    fn test_config_is_signed_with_shared_secret() {
        let config = service()
            .editor_config(
                "doc-42-v3",
                "offerta.docx",
                "http://localhost:8080/files/42",
                1,
                "Mario Rossi",
                EditorPermissions::default(),
            )
            .unwrap();

        let decoded = decode::<ConfigClaims>(
            &config.token,
            &DecodingKey::from_secret(b"shared-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.document.key, "doc-42-v3");
        assert_eq!(decoded.claims.document.file_type, "docx");
        assert_eq!(decoded.claims.editor_config.user.name, "Mario Rossi");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = service()
            .editor_config(
                "k",
                "malware.exe",
                "http://x",
                1,
                "U",
                EditorPermissions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, OnlyOfficeError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_permissions_serialize_camel_case() {
        let config = service()
            .editor_config(
                "k",
                "report.xlsx",
                "http://x",
                1,
                "U",
                EditorPermissions {
                    edit: false,
                    download: true,
                    print: false,
                },
            )
            .unwrap();

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["document"]["permissions"]["edit"], false);
        assert_eq!(json["editorConfig"]["callbackUrl"]
            .as_str()
            .unwrap()
            .contains("/api/documents/callback"), true);
    }
}
