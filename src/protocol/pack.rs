//! XML packing instructions
//!
//! Every structured iRODS message body is a small XML document whose root is
//! the packing instruction name (`DataObjInp_PI`, `Version_PI`, ...). Requests
//! are built with [`PackWriter`]; replies are flattened into [`PackedFields`],
//! which keeps leaf elements in document order and ignores nesting.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use irods_core_interface::{GridError, IrodsAccount, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Builder for one packing instruction
#[derive(Debug, Clone)]
pub struct PackWriter {
    name: &'static str,
    body: String,
}

impl PackWriter {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            body: String::new(),
        }
    }

    /// Append an escaped string field
    pub fn str(mut self, tag: &str, value: &str) -> Self {
        self.body.push_str(&format!("<{tag}>{}</{tag}>", escape(value)));
        self
    }

    pub fn int(mut self, tag: &str, value: i64) -> Self {
        self.body.push_str(&format!("<{tag}>{value}</{tag}>"));
        self
    }

    /// Append a binary field, base64 encoded
    pub fn bin(mut self, tag: &str, value: &[u8]) -> Self {
        self.body
            .push_str(&format!("<{tag}>{}</{tag}>", STANDARD.encode(value)));
        self
    }

    /// Append a nested packing instruction
    pub fn nested(mut self, child: PackWriter) -> Self {
        self.body.push_str(&child.finish());
        self
    }

    pub fn finish(self) -> String {
        format!("<{name}>{body}</{name}>", name = self.name, body = self.body)
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.finish())
    }
}

/// Leaf fields of a decoded packing instruction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedFields {
    root: String,
    fields: Vec<(String, String)>,
}

impl PackedFields {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn expect_root(&self, name: &str) -> Result<()> {
        if self.root != name {
            return Err(GridError::Protocol(format!(
                "expected {} but received {}",
                name, self.root
            )));
        }
        Ok(())
    }

    /// First leaf named `tag`
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
    }

    /// Every leaf named `tag`, in document order
    pub fn get_all(&self, tag: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn require(&self, tag: &str) -> Result<&str> {
        self.get(tag).ok_or_else(|| {
            GridError::Protocol(format!("{} is missing field {}", self.root, tag))
        })
    }

    pub fn int(&self, tag: &str) -> Result<i64> {
        let raw = self.require(tag)?;
        raw.trim().parse().map_err(|_| {
            GridError::Protocol(format!("{}.{} is not an integer: {:?}", self.root, tag, raw))
        })
    }

    /// Decode a base64 binary field
    pub fn bin(&self, tag: &str) -> Result<Vec<u8>> {
        let raw = self.require(tag)?;
        STANDARD.decode(raw.trim()).map_err(|e| {
            GridError::Protocol(format!("{}.{} is not valid base64: {}", self.root, tag, e))
        })
    }
}

/// Flatten a packing instruction into its leaf fields
pub fn parse(xml: &[u8]) -> Result<PackedFields> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut parsed = PackedFields::default();
    // (element name, saw a child element, collected text)
    let mut stack: Vec<(String, bool, String)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.1 = true;
                } else if parsed.root.is_empty() {
                    parsed.root = name.clone();
                }
                stack.push((name, false, String::new()));
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => {
                        parent.1 = true;
                        parsed.fields.push((name, String::new()));
                    }
                    None if parsed.root.is_empty() => parsed.root = name,
                    None => {}
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| GridError::Protocol(format!("invalid XML text: {}", e)))?;
                if let Some(current) = stack.last_mut() {
                    current.2.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                if let Some((name, had_children, text)) = stack.pop() {
                    if !had_children && !stack.is_empty() {
                        parsed.fields.push((name, text));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GridError::Protocol(format!(
                    "malformed packing instruction at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if parsed.root.is_empty() {
        return Err(GridError::Protocol("empty packing instruction".to_string()));
    }
    Ok(parsed)
}

// ═══════════════════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════════════════

/// Protocol selector sent in the startup pack (1 = XML)
pub const XML_PROTOCOL: i64 = 1;
pub const RELEASE_VERSION: &str = "rods4.3.0";
pub const API_VERSION: &str = "d";

pub fn startup_pack(account: &IrodsAccount, application_name: &str) -> Bytes {
    PackWriter::new("StartupPack_PI")
        .int("irodsProt", XML_PROTOCOL)
        .int("reconnFlag", 0)
        .int("connectCnt", 0)
        .str("proxyUser", account.user_name())
        .str("proxyRcatZone", account.zone())
        .str("clientUser", account.user_name())
        .str("clientRcatZone", account.zone())
        .str("relVersion", RELEASE_VERSION)
        .str("apiVersion", API_VERSION)
        .str("option", application_name)
        .into_bytes()
}

pub fn auth_response(response: &[u8], user_name: &str) -> Bytes {
    PackWriter::new("authResponseInp_PI")
        .bin("response", response)
        .str("username", user_name)
        .into_bytes()
}

/// `KeyValPair_PI`: all keywords first, then all values
pub fn key_val_pair(pairs: &[(&str, &str)]) -> PackWriter {
    let mut writer = PackWriter::new("KeyValPair_PI").int("ssLen", pairs.len() as i64);
    for (key, _) in pairs {
        writer = writer.str("keyWord", key);
    }
    for (_, value) in pairs {
        writer = writer.str("svalue", value);
    }
    writer
}

pub fn data_obj_inp(path: &str, open_flags: i32, create_mode: i32, keywords: &[(&str, &str)]) -> Bytes {
    PackWriter::new("DataObjInp_PI")
        .str("objPath", path)
        .int("createMode", create_mode as i64)
        .int("openFlags", open_flags as i64)
        .int("offset", 0)
        .int("dataSize", -1)
        .int("numThreads", 0)
        .int("oprType", 0)
        .nested(key_val_pair(keywords))
        .into_bytes()
}

pub fn opened_data_obj_inp(descriptor: i32, len: usize) -> Bytes {
    PackWriter::new("OpenedDataObjInp_PI")
        .int("l1descInx", descriptor as i64)
        .int("len", len as i64)
        .int("whence", 0)
        .int("oprType", 0)
        .int("offset", 0)
        .int("bytesWritten", 0)
        .nested(key_val_pair(&[]))
        .into_bytes()
}
