use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use crate::remote::PortalError;

/// Per-file size cap, enforced at intake rather than submit.
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// The fixed recommendation set accepted by the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    NoChange,
    NoticeOfAmendment,
    ProposalToCease,
}

impl Recommendation {
    pub const ALL: &'static [Recommendation] = &[
        Recommendation::NoChange,
        Recommendation::NoticeOfAmendment,
        Recommendation::ProposalToCease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoChange => "No Change",
            Self::NoticeOfAmendment => "Notice of Amendment",
            Self::ProposalToCease => "Proposal to Cease",
        }
    }

    /// Anything outside the fixed set is treated as unset.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "No Change" => Some(Self::NoChange),
            "Notice of Amendment" => Some(Self::NoticeOfAmendment),
            "Proposal to Cease" => Some(Self::ProposalToCease),
            _ => None,
        }
    }
}

/// A file staged for upload. Bytes stay on disk until submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    /// Last-modified time in milliseconds since the epoch; part of the
    /// dedup identity alongside name and size.
    pub modified: u64,
    pub path: PathBuf,
}

impl Attachment {
    /// Read and base64-encode the file content (no data-URL prefix).
    pub async fn encode(&self) -> Result<EncodedAttachment, PortalError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| PortalError::FileEncoding(format!("{}: {}", self.name, e)))?;
        Ok(EncodedAttachment {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            content_base64: BASE64.encode(&bytes),
        })
    }
}

/// Encode every attachment concurrently; the first failure aborts the lot.
pub async fn encode_all(attachments: &[Attachment]) -> Result<Vec<EncodedAttachment>, PortalError> {
    futures::future::try_join_all(attachments.iter().map(Attachment::encode)).await
}

/// Declared content type from the file extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Transient state of the annual review form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub impulse_id: String,
    pub dob: String,
    pub review_date: String,
    pub recommendation: Option<Recommendation>,
    pub attachments: Vec<Attachment>,
}

impl ReviewDraft {
    pub fn is_complete(&self) -> bool {
        !self.impulse_id.trim().is_empty()
            && !self.dob.trim().is_empty()
            && !self.review_date.trim().is_empty()
            && self.recommendation.is_some()
            && !self.attachments.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Stage a file from disk. Returns `Ok(false)` when an identical
    /// (name, size, modified) entry is already staged.
    pub fn add_file(&mut self, path: &Path) -> Result<bool, PortalError> {
        let meta = std::fs::metadata(path)
            .map_err(|e| PortalError::FileEncoding(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.accept(Attachment {
            content_type: content_type_for(&name).to_string(),
            size: meta.len(),
            modified,
            path: path.to_path_buf(),
            name,
        })
    }

    /// Size and dedup checks on a staged attachment.
    pub fn accept(&mut self, attachment: Attachment) -> Result<bool, PortalError> {
        if attachment.size > MAX_ATTACHMENT_BYTES {
            return Err(PortalError::FileTooLarge {
                name: attachment.name,
                size: attachment.size,
            });
        }
        let duplicate = self.attachments.iter().any(|a| {
            a.name == attachment.name
                && a.size == attachment.size
                && a.modified == attachment.modified
        });
        if duplicate {
            return Ok(false);
        }
        self.attachments.push(attachment);
        Ok(true)
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        if index < self.attachments.len() {
            Some(self.attachments.remove(index))
        } else {
            None
        }
    }

    /// Assemble the flow payload from the scalars and pre-encoded files.
    pub fn build_payload(&self, attachments: Vec<EncodedAttachment>) -> ReviewPayload {
        ReviewPayload {
            impulse_id: self.impulse_id.clone(),
            dob: self.dob.clone(),
            review_date: self.review_date.clone(),
            recommendation: self
                .recommendation
                .map(|r| r.as_str().to_string())
                .unwrap_or_default(),
            attachments,
        }
    }
}

/// One encoded file as the flow expects it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncodedAttachment {
    pub name: String,
    pub content_type: String,
    pub content_base64: String,
}

/// `ANNUAL_REVIEW` envelope body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub impulse_id: String,
    pub dob: String,
    pub review_date: String,
    pub recommendation: String,
    pub attachments: Vec<EncodedAttachment>,
}
