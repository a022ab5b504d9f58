use crate::campaign::ensure_path_safe;
use crate::error::EditError;
use crate::fs_util::atomic_write;
use crate::services::config::codec;
use common::model::config::{CampaignConfig, ConfigUpdateRequest};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Every value is written as the tail of one `key : value` line, so a line
/// break in any of them would add lines or sections to the file.
fn ensure_single_line(update: &ConfigUpdateRequest) -> Result<(), EditError> {
    let mut values = update
        .constant_campaign_id
        .iter()
        .chain(update.metadata_columns.iter().flatten())
        .chain(&update.template_path)
        .chain(
            update
                .message_headers
                .iter()
                .flat_map(|headers| headers.iter().flat_map(|(k, v)| [k, v])),
        )
        .chain(&update.attachment_dir)
        .chain(&update.namespace_constant);

    if values.any(|value| value.contains(['\r', '\n'])) {
        return Err(EditError::invalid("Config values must not contain line breaks"));
    }
    Ok(())
}

/// Reads and edits `<base>/<campaignId>.conf` files.
///
/// Edit-only: a config file is never created from nothing.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base: PathBuf,
}

impl ConfigStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve_file(&self, campaign_id: &str) -> Result<PathBuf, EditError> {
        ensure_path_safe(campaign_id)?;
        Ok(self.base.join(format!("{}.conf", campaign_id)))
    }

    fn load(&self, campaign_id: &str, file: &Path) -> Result<CampaignConfig, EditError> {
        match fs::read_to_string(file) {
            Ok(text) => Ok(codec::parse(&text, campaign_id)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(EditError::not_found(format!(
                "Config file not found for campId: {}",
                campaign_id
            ))),
            Err(e) => Err(EditError::io(
                format!("Failed to read config file for campId {}", campaign_id),
                e,
            )),
        }
    }

    pub fn read(&self, campaign_id: &str) -> Result<CampaignConfig, EditError> {
        let file = self.resolve_file(campaign_id)?;
        self.load(campaign_id, &file)
    }

    /// Overlays `update` onto the stored record and writes the result back.
    pub fn update(
        &self,
        campaign_id: &str,
        update: ConfigUpdateRequest,
    ) -> Result<CampaignConfig, EditError> {
        let file = self.resolve_file(campaign_id)?;
        ensure_single_line(&update)?;
        let mut current = self.load(campaign_id, &file)?;
        current.apply(update);

        atomic_write(&file, codec::serialize(&current).as_bytes()).map_err(|e| {
            log::error!("Failed to write config for campaign {}: {}", campaign_id, e);
            EditError::io("Failed to write config file", e)
        })?;
        log::info!("Updated config for campaign {}", campaign_id);

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ORIGINAL: &str = "\
[constants]
campid: C1_CONST

[metadata]
column : USERID
column : EMAIL

[template]
path : C1/tmpl.htm

[msghdrs]
From    :sender@example.com

[attachments]
dir : C1/attach
";

    fn store_with(campaign_id: &str, text: &str) -> (TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("{}.conf", campaign_id)), text).unwrap();
        let store = ConfigStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        assert!(matches!(store.read("nope"), Err(EditError::NotFound(_))));
    }

    #[test]
    fn read_rejects_traversal_ids() {
        let (_dir, store) = store_with("C1", ORIGINAL);
        assert!(matches!(
            store.read("../C1"),
            Err(EditError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let (_dir, store) = store_with("C1", ORIGINAL);
        let before = store.read("C1").unwrap();

        let updated = store
            .update(
                "C1",
                ConfigUpdateRequest {
                    template_path: Some("x".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut expected = before.clone();
        expected.template_path = Some("x".into());
        assert_eq!(updated, expected);
        assert_eq!(store.read("C1").unwrap(), expected);
    }

    #[test]
    fn update_is_idempotent() {
        let (_dir, store) = store_with("C1", ORIGINAL);
        let update = ConfigUpdateRequest {
            metadata_columns: Some(vec!["ID".into(), "NAME".into()]),
            attachment_dir: Some("elsewhere".into()),
            ..Default::default()
        };

        let once = store.update("C1", update.clone()).unwrap();
        let on_disk_once = fs::read_to_string(store.base().join("C1.conf")).unwrap();
        let twice = store.update("C1", update).unwrap();
        let on_disk_twice = fs::read_to_string(store.base().join("C1.conf")).unwrap();

        assert_eq!(once, twice);
        assert_eq!(on_disk_once, on_disk_twice);
    }

    #[test]
    fn update_without_file_is_not_found_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        let result = store.update(
            "GHOST",
            ConfigUpdateRequest {
                template_path: Some("x".into()),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(EditError::NotFound(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn update_rewrites_file_canonically() {
        let (_dir, store) = store_with("C1", "# hand written\n[unknown]\nx: y\n[metadata]\ncolumn: A\n");
        store.update("C1", ConfigUpdateRequest::default()).unwrap();

        let text = fs::read_to_string(store.base().join("C1.conf")).unwrap();
        assert!(text.starts_with("# constants used by metadata section\n[constants]\ncampid: C1\n"));
        assert!(text.contains("column : A\n"));
        assert!(!text.contains("[unknown]"));
    }

    #[test]
    fn update_rejects_line_breaks_in_values() {
        let (_dir, store) = store_with("C1", ORIGINAL);
        let path = store.base().join("C1.conf");

        let injected_path = ConfigUpdateRequest {
            template_path: Some("x\n[namespace]\nconstant: evil".into()),
            ..Default::default()
        };
        let mut headers = indexmap::IndexMap::new();
        headers.insert("X-Evil\r".to_string(), "v".to_string());
        let injected_header = ConfigUpdateRequest {
            message_headers: Some(headers),
            ..Default::default()
        };
        let injected_column = ConfigUpdateRequest {
            metadata_columns: Some(vec!["OK".into(), "BAD\ncolumn : X".into()]),
            ..Default::default()
        };

        for update in [injected_path, injected_header, injected_column] {
            assert!(matches!(
                store.update("C1", update),
                Err(EditError::InvalidArgument(_))
            ));
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), ORIGINAL);
    }
}
