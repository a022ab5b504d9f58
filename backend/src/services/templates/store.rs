//! Filesystem-backed template storage for campaigns.
//!
//! Layout under the template base directory:
//!
//! ```text
//! <base>/<campaignId>/<campaignId>.html          canonical template
//! <base>/<campaignId>/<anything>.html            pre-existing template, wins over canonical
//! <base>/<campaignId>/backups/<stem>_<ts>.html   append-only snapshots
//! ```
//!
//! Every public operation that takes a campaign id validates it before touching
//! the filesystem.

use crate::campaign::validate_campaign_id;
use crate::error::EditError;
use crate::fs_util::{atomic_write, sorted_files};
use chrono::{DateTime, SecondsFormat, Utc};
use common::model::template::{TemplateUpdateRequest, TemplateView};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Largest template accepted, in UTF-8 bytes.
pub const MAX_TEMPLATE_SIZE: usize = 2 * 1024 * 1024;

const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static HTML_BASIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^<html[^>]*>.*</html>$").expect("static regex is valid")
});

/// Coarse check that the trimmed content is one `<html ...> ... </html>` block.
pub fn has_html_structure(content: &str) -> bool {
    HTML_BASIC.is_match(content.trim())
}

/// Hex SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Hard gates on template content: present, not blank, within [`MAX_TEMPLATE_SIZE`].
///
/// A failed structural check is only a warning.
pub fn validate_content(content: Option<&str>) -> Result<&str, EditError> {
    let content = content.ok_or_else(|| EditError::invalid("HTML content cannot be null"))?;

    if content.trim().is_empty() {
        return Err(EditError::invalid("HTML content cannot be empty"));
    }
    if content.len() > MAX_TEMPLATE_SIZE {
        return Err(EditError::invalid(format!(
            "HTML content exceeds maximum size of {}MB",
            MAX_TEMPLATE_SIZE / 1024 / 1024
        )));
    }
    if !has_html_structure(content) {
        log::warn!("HTML content doesn't appear to have proper HTML structure");
    }
    Ok(content)
}

/// Advisory form of [`validate_content`].
pub fn is_valid_template(content: Option<&str>) -> bool {
    match validate_content(content) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("Template validation failed: {}", e);
            false
        }
    }
}

fn is_html_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_ascii_lowercase().ends_with(".html"))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    base: PathBuf,
}

impl TemplateStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn campaign_dir(&self, campaign_id: &str) -> PathBuf {
        self.base.join(campaign_id)
    }

    fn canonical_file(&self, campaign_id: &str) -> PathBuf {
        self.campaign_dir(campaign_id)
            .join(format!("{}.html", campaign_id))
    }

    fn backup_dir(&self, campaign_id: &str) -> PathBuf {
        self.campaign_dir(campaign_id).join(BACKUP_DIR)
    }

    /// First `.html` file in the campaign directory by file name, if any.
    fn find_existing_html(&self, campaign_id: &str) -> Result<Option<PathBuf>, EditError> {
        let files = sorted_files(&self.campaign_dir(campaign_id)).map_err(|e| {
            EditError::io(
                format!("Failed to list template directory for campId {}", campaign_id),
                e,
            )
        })?;
        Ok(files.into_iter().find(|path| is_html_file(path)))
    }

    fn resolve(&self, campaign_id: &str) -> Result<PathBuf, EditError> {
        Ok(self
            .find_existing_html(campaign_id)?
            .unwrap_or_else(|| self.canonical_file(campaign_id)))
    }

    /// Path of the authoritative template file, whether or not it exists yet.
    pub fn file_path(&self, campaign_id: &str) -> Result<PathBuf, EditError> {
        validate_campaign_id(campaign_id)?;
        self.resolve(campaign_id)
    }

    fn has_backups(&self, campaign_id: &str) -> bool {
        fs::read_dir(self.backup_dir(campaign_id))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, campaign_id: &str) -> Result<TemplateView, EditError> {
        validate_campaign_id(campaign_id)?;
        let file = self.resolve(campaign_id)?;

        let mut view = TemplateView {
            campaign_id: campaign_id.to_string(),
            file_path: file.display().to_string(),
            ..Default::default()
        };

        let metadata = match fs::metadata(&file) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                view.validation_message = "Template file does not exist".into();
                return Ok(view);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                view.validation_message = "Template file does not exist".into();
                return Ok(view);
            }
            Err(e) => return Err(EditError::io("Failed to stat template file", e)),
        };

        let content = fs::read_to_string(&file)
            .map_err(|e| EditError::io("Failed to read template file", e))?;

        view.exists = true;
        view.file_size = metadata.len();
        view.last_modified = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        view.content_hash = content_hash(&content);
        view.valid_html = has_html_structure(&content);
        view.validation_message = if view.valid_html {
            "Valid HTML structure".into()
        } else {
            "Warning: HTML structure may be incomplete".into()
        };
        view.html_content = content;

        if self.has_backups(campaign_id) {
            view.has_backup = true;
            view.backup_path = Some(self.backup_dir(campaign_id).display().to_string());
        }

        Ok(view)
    }

    /// Raw bytes of the existing template, for download.
    pub fn read_bytes(&self, campaign_id: &str) -> Result<(PathBuf, Vec<u8>), EditError> {
        let file = self.file_path(campaign_id)?;
        match fs::read(&file) {
            Ok(bytes) => Ok((file, bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(EditError::not_found(format!(
                "Template file not found for campId: {}",
                campaign_id
            ))),
            Err(e) => Err(EditError::io("Failed to read template file", e)),
        }
    }

    /// Copies `existing` into `backups/<stem>_<timestamp>.html` and returns the copy's path.
    ///
    /// The timestamp is UTC. A name already taken within the same second gets a
    /// zero-padded numeric suffix, so no earlier snapshot is ever overwritten and
    /// names sort in creation order.
    fn create_backup(&self, campaign_id: &str, existing: &Path) -> io::Result<PathBuf> {
        let backup_dir = self.backup_dir(campaign_id);
        fs::create_dir_all(&backup_dir)?;

        let stem = existing
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| campaign_id.to_string());
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();

        let mut backup_file = backup_dir.join(format!("{}_{}.html", stem, timestamp));
        let mut n = 1;
        while backup_file.exists() {
            backup_file = backup_dir.join(format!("{}_{}_{:03}.html", stem, timestamp, n));
            n += 1;
        }

        fs::copy(existing, &backup_file)?;
        log::info!(
            "Created backup for campaign {} from {} to {}",
            campaign_id,
            existing.display(),
            backup_file.display()
        );
        Ok(backup_file)
    }

    pub fn update(
        &self,
        campaign_id: &str,
        request: TemplateUpdateRequest,
    ) -> Result<TemplateView, EditError> {
        validate_campaign_id(campaign_id)?;
        let content = validate_content(request.html_content.as_deref())?;

        let dir = self.campaign_dir(campaign_id);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)
                .map_err(|e| EditError::io("Failed to create template directory", e))?;
            log::info!("Created template directory for campaign: {}", campaign_id);
        }

        let existing = self.find_existing_html(campaign_id)?;
        let target = match &existing {
            Some(path) => {
                log::info!(
                    "Found existing HTML file for campaign {}: {}",
                    campaign_id,
                    path.display()
                );
                path.clone()
            }
            None => {
                let path = self.canonical_file(campaign_id);
                log::info!(
                    "No existing HTML file found for campaign {}, using default: {}",
                    campaign_id,
                    path.display()
                );
                path
            }
        };

        let backup = match (&existing, request.create_backup) {
            (Some(path), true) => Some(self.create_backup(campaign_id, path).map_err(|e| {
                log::error!("Failed to create backup for campaign {}: {}", campaign_id, e);
                EditError::io("Failed to create backup", e)
            })?),
            _ => None,
        };

        atomic_write(&target, content.as_bytes()).map_err(|e| {
            log::error!("Failed to write template for campaign {}: {}", campaign_id, e);
            EditError::io("Failed to write template file", e)
        })?;
        log::info!(
            "Successfully updated template for campaign {} at: {}",
            campaign_id,
            target.display()
        );

        let mut view = self.get(campaign_id)?;
        view.description = request.description;
        view.version = request.version;
        if let Some(backup) = backup {
            view.backup_path = Some(backup.display().to_string());
            view.has_backup = true;
        }
        Ok(view)
    }

    /// Update path used by multipart uploads, which carry no description or version.
    pub fn update_from_file(
        &self,
        campaign_id: &str,
        content: String,
        create_backup: bool,
    ) -> Result<TemplateView, EditError> {
        self.update(
            campaign_id,
            TemplateUpdateRequest {
                html_content: Some(content),
                create_backup,
                ..Default::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PAGE: &str = "<html><body><p>hello</p></body></html>";

    fn store() -> (TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    fn request(content: &str, create_backup: bool) -> TemplateUpdateRequest {
        TemplateUpdateRequest {
            html_content: Some(content.to_string()),
            create_backup,
            ..Default::default()
        }
    }

    fn backups_of(dir: &TempDir, campaign_id: &str) -> Vec<PathBuf> {
        sorted_files(&dir.path().join(campaign_id).join(BACKUP_DIR)).unwrap()
    }

    #[test]
    fn structural_check_spans_lines_and_ignores_case() {
        assert!(has_html_structure("  <HTML lang=\"en\">\n<body/>\n</Html>\n"));
        assert!(!has_html_structure("<body>no wrapper</body>"));
        assert!(!has_html_structure("<html><body></body></html> trailing"));
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hard_gates_reject_null_empty_and_oversize() {
        assert!(matches!(validate_content(None), Err(EditError::InvalidArgument(_))));
        assert!(matches!(validate_content(Some("")), Err(EditError::InvalidArgument(_))));
        assert!(matches!(validate_content(Some(" \n\t")), Err(EditError::InvalidArgument(_))));

        let oversize = format!("<html>{}</html>", "a".repeat(MAX_TEMPLATE_SIZE));
        assert!(matches!(
            validate_content(Some(&oversize)),
            Err(EditError::InvalidArgument(msg)) if msg.contains("2MB")
        ));
        assert!(!is_valid_template(Some(&oversize)));
    }

    #[test]
    fn missing_wrapper_is_accepted() {
        assert!(validate_content(Some("<p>just a fragment</p>")).is_ok());
        assert!(is_valid_template(Some("<p>just a fragment</p>")));
    }

    #[test]
    fn get_absent_template_reports_not_existing() {
        let (dir, store) = store();
        let view = store.get("C1").unwrap();
        assert!(!view.exists);
        assert_eq!(view.html_content, "");
        assert_eq!(view.file_size, 0);
        assert_eq!(view.content_hash, "");
        assert!(!view.has_backup);
        assert_eq!(
            PathBuf::from(&view.file_path),
            dir.path().join("C1").join("C1.html")
        );
    }

    #[test]
    fn bad_ids_are_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        let store = TemplateStore::new(&base);
        let too_long = "x".repeat(51);

        for bad in ["", "..", "a/b", "a\\b", too_long.as_str()] {
            assert!(matches!(store.get(bad), Err(EditError::InvalidArgument(_))));
            assert!(matches!(store.file_path(bad), Err(EditError::InvalidArgument(_))));
            assert!(matches!(store.read_bytes(bad), Err(EditError::InvalidArgument(_))));
            assert!(matches!(
                store.update(bad, request(PAGE, true)),
                Err(EditError::InvalidArgument(_))
            ));
        }
        assert!(!base.exists());
    }

    #[test]
    fn first_write_creates_canonical_file_without_backup() {
        let (dir, store) = store();
        let view = store.update("C1", request(PAGE, true)).unwrap();

        assert!(view.exists);
        assert!(view.valid_html);
        assert!(!view.has_backup);
        assert!(view.backup_path.is_none());
        assert_eq!(view.html_content, PAGE);
        assert_eq!(view.file_size, PAGE.len() as u64);
        assert_eq!(view.content_hash, content_hash(PAGE));
        assert_eq!(
            fs::read_to_string(dir.path().join("C1").join("C1.html")).unwrap(),
            PAGE
        );
        assert!(backups_of(&dir, "C1").is_empty());
    }

    #[test]
    fn overwrite_with_backup_keeps_byte_identical_snapshot() {
        let (dir, store) = store();
        let original = "<html>\r\n<body>v1 ünïcode</body>\r\n</html>";
        store.update("C1", request(original, false)).unwrap();

        let view = store.update("C1", request(PAGE, true)).unwrap();

        let backups = backups_of(&dir, "C1");
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), original.as_bytes());
        let name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("C1_") && name.ends_with(".html"), "{name}");

        assert!(view.has_backup);
        assert_eq!(view.backup_path, Some(backups[0].display().to_string()));
        assert_eq!(
            fs::read_to_string(dir.path().join("C1").join("C1.html")).unwrap(),
            PAGE
        );
    }

    #[test]
    fn overwrite_without_backup_flag_takes_no_snapshot() {
        let (dir, store) = store();
        store.update("C1", request(PAGE, false)).unwrap();
        store.update("C1", request("<html>v2</html>", false)).unwrap();
        assert!(backups_of(&dir, "C1").is_empty());
    }

    #[test]
    fn rapid_backups_never_overwrite_each_other() {
        let (dir, store) = store();
        store.update("C1", request("<html>1</html>", false)).unwrap();
        store.update("C1", request("<html>2</html>", true)).unwrap();
        store.update("C1", request("<html>3</html>", true)).unwrap();

        let contents: Vec<String> = backups_of(&dir, "C1")
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents, ["<html>1</html>", "<html>2</html>"]);
    }

    #[test]
    fn backup_names_sort_in_creation_order() {
        let (dir, store) = store();
        let live = dir.path().join("C1");
        fs::create_dir_all(&live).unwrap();
        let live = live.join("C1.html");

        for i in 0..12 {
            fs::write(&live, format!("<html>{}</html>", i)).unwrap();
            store.create_backup("C1", &live).unwrap();
        }

        let contents: Vec<String> = backups_of(&dir, "C1")
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        let expected: Vec<String> = (0..12).map(|i| format!("<html>{}</html>", i)).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn existing_nonstandard_file_is_authoritative() {
        let (dir, store) = store();
        let campaign_dir = dir.path().join("C1");
        fs::create_dir_all(&campaign_dir).unwrap();
        fs::write(campaign_dir.join("Legacy.HTML"), "<html>old</html>").unwrap();

        let view = store.get("C1").unwrap();
        assert!(view.exists);
        assert_eq!(PathBuf::from(&view.file_path), campaign_dir.join("Legacy.HTML"));

        let updated = store.update("C1", request(PAGE, true)).unwrap();
        assert_eq!(PathBuf::from(&updated.file_path), campaign_dir.join("Legacy.HTML"));
        assert!(!campaign_dir.join("C1.html").exists());

        let backups = backups_of(&dir, "C1");
        assert_eq!(backups.len(), 1);
        let name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Legacy_"), "{name}");
    }

    #[test]
    fn several_html_files_resolve_to_smallest_name() {
        let (dir, store) = store();
        let campaign_dir = dir.path().join("C1");
        fs::create_dir_all(&campaign_dir).unwrap();
        fs::write(campaign_dir.join("zeta.html"), "<html>z</html>").unwrap();
        fs::write(campaign_dir.join("alpha.html"), "<html>a</html>").unwrap();
        fs::write(campaign_dir.join("notes.txt"), "ignore").unwrap();

        assert_eq!(store.file_path("C1").unwrap(), campaign_dir.join("alpha.html"));
        assert_eq!(store.get("C1").unwrap().html_content, "<html>a</html>");
    }

    #[test]
    fn get_reports_backup_directory() {
        let (dir, store) = store();
        store.update("C1", request(PAGE, false)).unwrap();
        store.update("C1", request(PAGE, true)).unwrap();

        let view = store.get("C1").unwrap();
        assert!(view.has_backup);
        assert_eq!(
            view.backup_path,
            Some(dir.path().join("C1").join(BACKUP_DIR).display().to_string())
        );
        assert!(!view.last_modified.is_empty());
    }

    #[test]
    fn update_attaches_request_metadata() {
        let (_dir, store) = store();
        let view = store
            .update(
                "C1",
                TemplateUpdateRequest {
                    html_content: Some("<div>fragment</div>".into()),
                    description: Some("spring mailing".into()),
                    version: Some("3".into()),
                    create_backup: false,
                },
            )
            .unwrap();
        assert!(!view.valid_html);
        assert_eq!(view.validation_message, "Warning: HTML structure may be incomplete");
        assert_eq!(view.description.as_deref(), Some("spring mailing"));
        assert_eq!(view.version.as_deref(), Some("3"));
    }

    #[test]
    fn invalid_content_writes_nothing() {
        let (dir, store) = store();
        assert!(matches!(
            store.update("C1", request("   ", true)),
            Err(EditError::InvalidArgument(_))
        ));
        assert!(!dir.path().join("C1").exists());
    }

    #[test]
    fn read_bytes_requires_existing_file() {
        let (_dir, store) = store();
        assert!(matches!(store.read_bytes("C1"), Err(EditError::NotFound(_))));

        store.update_from_file("C1", PAGE.to_string(), true).unwrap();
        let (path, bytes) = store.read_bytes("C1").unwrap();
        assert!(path.ends_with("C1/C1.html"));
        assert_eq!(bytes, PAGE.as_bytes());
    }
}
