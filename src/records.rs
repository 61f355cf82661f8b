use std::collections::HashSet;
use uuid::Uuid;

use crate::config::RunConfig;
use crate::models::{
    CredentialRecord, FolderRef, HostEntry, MachineFields, MachineRecord, PamHostname,
    PamSettings, Record,
};

/// Placeholder credentials on machine records; the real ones live on the linked user.
const STUB: &str = "stub";

#[derive(Debug, Default)]
pub struct Generated {
    pub records: Vec<Record>,
    /// Hosts that produced a record pair, in input order.
    pub hosts: Vec<String>,
}

/// Build a credential/machine record pair for each unique hostname.
pub fn generate(entries: &[HostEntry], config: &RunConfig) -> Generated {
    let mut out = Generated::default();
    let mut seen = HashSet::new();
    let port = config.port().to_string();

    for entry in entries {
        if !seen.insert(entry.hostname.as_str()) {
            tracing::warn!("Duplicate hostname {} - skipped", entry.hostname);
            continue;
        }

        let uid = Uuid::new_v4().simple().to_string();

        out.records.push(Record::Credential(CredentialRecord {
            uid: uid.clone(),
            title: entry.admin_title(),
            login: entry.user.clone(),
            password: entry.password.clone(),
            folders: vec![FolderRef::editable(&config.user_folder)],
        }));

        out.records.push(Record::Machine(MachineRecord {
            title: entry.hostname.clone(),
            login: STUB.to_string(),
            password: STUB.to_string(),
            folders: vec![FolderRef::editable(&config.resource_folder)],
            custom_fields: MachineFields {
                pam_settings: PamSettings::default(),
                pam_hostname: PamHostname {
                    host_name: entry.hostname.clone(),
                    port: port.clone(),
                },
                ssl_verification: config.ssl_verification,
                operating_system: config.os.clone(),
            },
            links: vec![uid],
        }));

        out.hosts.push(entry.hostname.clone());
    }

    tracing::debug!(
        "Generated {} records for {} hosts",
        out.records.len(),
        out.hosts.len()
    );
    out
}
