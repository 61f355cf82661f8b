use serde::{Deserialize, Serialize};

/// One validated row of the input CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub hostname: String,
    pub user: String,
    pub password: String,
}

impl HostEntry {
    pub fn new(hostname: String, user: String, password: String) -> Self {
        Self {
            hostname,
            user,
            password,
        }
    }

    /// Title of the credential record created for this host.
    pub fn admin_title(&self) -> String {
        admin_title(&self.hostname)
    }
}

pub fn admin_title(hostname: &str) -> String {
    format!("{} Local Admin", hostname)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRef {
    pub shared_folder: String,
    pub can_edit: bool,
    pub can_share: bool,
}

impl FolderRef {
    pub fn editable(shared_folder: &str) -> Self {
        Self {
            shared_folder: shared_folder.to_string(),
            can_edit: true,
            can_share: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub uid: String,
    pub title: String,
    pub login: String,
    pub password: String,
    pub folders: Vec<FolderRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PamSettings {
    pub connection: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "portForward")]
    pub port_forward: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PamHostname {
    #[serde(rename = "hostName")]
    pub host_name: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineFields {
    #[serde(rename = "$pamSettings")]
    pub pam_settings: PamSettings,
    #[serde(rename = "$pamHostname")]
    pub pam_hostname: PamHostname,
    #[serde(rename = "$checkbox:sslVerification")]
    pub ssl_verification: bool,
    #[serde(rename = "operatingSystem")]
    pub operating_system: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub title: String,
    pub login: String,
    pub password: String,
    pub folders: Vec<FolderRef>,
    pub custom_fields: MachineFields,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Record {
    #[serde(rename = "pamUser")]
    Credential(CredentialRecord),
    #[serde(rename = "pamMachine")]
    Machine(MachineRecord),
}

/// Top-level document consumed by the vault's JSON import.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportDocument {
    pub shared_folders: Vec<serde_json::Value>,
    pub records: Vec<Record>,
}

impl ImportDocument {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            shared_folders: Vec::new(),
            records,
        }
    }
}
