//! Typed views over one snapshot body.
//!
//! The server's JSON layout is owned elsewhere, so nothing here derives
//! `Deserialize` on the whole tree. Each section is pulled out on its own by
//! a tolerant parser that reports exactly which field was missing or had the
//! wrong shape. One bad section never blocks the others.

use serde_json::{Map, Value};
use thiserror::Error;

/// Why a section could not be read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing field `{path}`")]
    Missing { path: String },

    #[error("field `{path}` is not {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },

    #[error("`{path}` has no entry {index}")]
    OutOfRange { path: String, index: usize },
}

/// One parsed response body.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Map<String, Value>,
}

impl Snapshot {
    /// Parse a response body. The top level must be an object.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let root: Map<String, Value> = serde_json::from_str(body)?;
        Ok(Self { root })
    }

    #[cfg(test)]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(root) => Some(Self { root }),
            _ => None,
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            path: String::new(),
            value: None,
            object: Some(&self.root),
        }
    }
}

/// Cursor into the tree that remembers how it got there, for error messages.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    path: String,
    value: Option<&'a Value>,
    object: Option<&'a Map<String, Value>>,
}

impl<'a> Node<'a> {
    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn as_object(&self) -> Result<&'a Map<String, Value>, FieldError> {
        if let Some(object) = self.object {
            return Ok(object);
        }
        match self.value {
            Some(Value::Object(object)) => Ok(object),
            _ => Err(FieldError::WrongType {
                path: self.path.clone(),
                expected: "an object",
            }),
        }
    }

    /// Descend into `key` of an object node.
    pub fn field(&self, key: &str) -> Result<Node<'a>, FieldError> {
        let path = self.child_path(key);
        let value = self
            .as_object()?
            .get(key)
            .ok_or_else(|| FieldError::Missing { path: path.clone() })?;
        Ok(Node {
            path,
            value: Some(value),
            object: None,
        })
    }

    /// Descend into element `index` of an array node.
    pub fn index(&self, index: usize) -> Result<Node<'a>, FieldError> {
        let items = match self.value {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FieldError::WrongType {
                    path: self.path.clone(),
                    expected: "an array",
                })
            }
        };
        let value = items.get(index).ok_or_else(|| FieldError::OutOfRange {
            path: self.path.clone(),
            index,
        })?;
        Ok(Node {
            path: format!("{}[{}]", self.path, index),
            value: Some(value),
            object: None,
        })
    }

    pub fn as_f64(&self) -> Result<f64, FieldError> {
        self.value
            .and_then(Value::as_f64)
            .ok_or_else(|| FieldError::WrongType {
                path: self.path.clone(),
                expected: "a number",
            })
    }

    pub fn as_str(&self) -> Result<&'a str, FieldError> {
        self.value
            .and_then(Value::as_str)
            .ok_or_else(|| FieldError::WrongType {
                path: self.path.clone(),
                expected: "a string",
            })
    }

    pub fn f64_at(&self, key: &str) -> Result<f64, FieldError> {
        self.field(key)?.as_f64()
    }

    pub fn str_at(&self, key: &str) -> Result<String, FieldError> {
        Ok(self.field(key)?.as_str()?.to_string())
    }
}

/// `cpu` section. The processor name is read separately by
/// [`CpuStats::name`] since it only matters once.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuStats {
    pub usage: f64,
    pub processes: u64,
}

impl CpuStats {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, FieldError> {
        let cpu = snapshot.root().field("cpu")?;
        Ok(Self {
            usage: cpu.f64_at("usage")?,
            processes: cpu.f64_at("process")?.max(0.0) as u64,
        })
    }

    /// `cpu.name`
    pub fn name(snapshot: &Snapshot) -> Result<String, FieldError> {
        snapshot.root().field("cpu")?.str_at("name")
    }
}

/// `memory.physical` section. Sizes are in megabytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStats {
    pub used: f64,
    pub total: f64,
    pub used_percent: f64,
}

impl MemoryStats {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, FieldError> {
        let physical = snapshot.root().field("memory")?.field("physical")?;
        Ok(Self {
            used: physical.f64_at("used")?,
            total: physical.f64_at("total")?,
            used_percent: physical.f64_at("usedper")?,
        })
    }
}

/// Capacity with the unit label the server chose for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Capacity {
    pub amount: f64,
    pub unit: String,
}

/// One `disk[i]` entry, without its drive label (see [`drive_label`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DiskStats {
    pub used: Capacity,
    pub used_percent: f64,
    /// Total capacity. The server only labels the used figure, so the total
    /// shares its unit.
    pub total: Capacity,
}

impl DiskStats {
    pub fn from_snapshot(snapshot: &Snapshot, index: usize) -> Result<Self, FieldError> {
        let disk = disk_entry(snapshot, index)?;
        let used = disk.field("used")?;
        let unit = used.str_at("unit")?;
        Ok(Self {
            used: Capacity {
                amount: used.f64_at("capacity")?,
                unit: unit.clone(),
            },
            used_percent: used.f64_at("per")?,
            total: Capacity {
                amount: disk.field("total")?.f64_at("capacity")?,
                unit,
            },
        })
    }
}

/// Which counter of a disk entry to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskDirection {
    Read,
    Write,
}

impl DiskDirection {
    fn key(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// `disk[i].read` or `disk[i].write`, in bytes per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskRate {
    pub bytes: f64,
}

impl DiskRate {
    pub fn from_snapshot(
        snapshot: &Snapshot,
        index: usize,
        direction: DiskDirection,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            bytes: disk_entry(snapshot, index)?.f64_at(direction.key())?,
        })
    }
}

/// Which counter of a network entry to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetDirection {
    Receive,
    Send,
}

impl NetDirection {
    fn key(self) -> &'static str {
        match self {
            Self::Receive => "receive",
            Self::Send => "send",
        }
    }
}

/// `network[i].receive` or `network[i].send`, in bytes per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct NetRate {
    pub bytes: f64,
}

impl NetRate {
    pub fn from_snapshot(
        snapshot: &Snapshot,
        index: usize,
        direction: NetDirection,
    ) -> Result<Self, FieldError> {
        let entry = snapshot.root().field("network")?.index(index)?;
        Ok(Self {
            bytes: entry.f64_at(direction.key())?,
        })
    }
}

/// `disk[i].drive`, e.g. `"C:"`.
pub fn drive_label(snapshot: &Snapshot, index: usize) -> Result<String, FieldError> {
    disk_entry(snapshot, index)?.str_at("drive")
}

fn disk_entry(snapshot: &Snapshot, index: usize) -> Result<Node<'_>, FieldError> {
    snapshot.root().field("disk")?.index(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Snapshot {
        Snapshot::from_value(json!({
            "cpu": { "name": "Ryzen 7", "usage": 12.5, "process": 301 },
            "memory": { "physical": { "used": 4096.0, "total": 16384.0, "usedper": 25.0 } },
            "disk": [{
                "drive": "C:",
                "used": { "capacity": 120.5, "unit": "GB", "per": 47.0 },
                "total": { "capacity": 256.0 },
                "read": 2048.0,
                "write": 512.0
            }],
            "network": [{ "receive": 1000.0, "send": 250.0 }]
        }))
        .unwrap()
    }

    #[test]
    fn test_reads_every_section() {
        let snapshot = sample();

        assert_eq!(
            CpuStats::from_snapshot(&snapshot).unwrap(),
            CpuStats {
                usage: 12.5,
                processes: 301,
            }
        );
        assert_eq!(CpuStats::name(&snapshot).unwrap(), "Ryzen 7");
        assert_eq!(
            MemoryStats::from_snapshot(&snapshot).unwrap().used_percent,
            25.0
        );

        let disk = DiskStats::from_snapshot(&snapshot, 0).unwrap();
        assert_eq!(drive_label(&snapshot, 0).unwrap(), "C:");
        assert_eq!(disk.total.unit, "GB");
        assert_eq!(disk.total.amount, 256.0);

        let write = DiskRate::from_snapshot(&snapshot, 0, DiskDirection::Write).unwrap();
        assert_eq!(write.bytes, 512.0);

        let send = NetRate::from_snapshot(&snapshot, 0, NetDirection::Send).unwrap();
        assert_eq!(send.bytes, 250.0);
    }

    #[test]
    fn test_missing_field_reports_path() {
        let snapshot = Snapshot::from_value(json!({ "memory": { "physical": { "used": 1.0 } } }))
            .unwrap();

        assert_eq!(
            MemoryStats::from_snapshot(&snapshot),
            Err(FieldError::Missing {
                path: "memory.physical.total".to_string()
            })
        );
        assert_eq!(
            CpuStats::from_snapshot(&snapshot),
            Err(FieldError::Missing {
                path: "cpu".to_string()
            })
        );
    }

    #[test]
    fn test_wrong_type_and_out_of_range() {
        let snapshot = Snapshot::from_value(json!({
            "cpu": { "name": "x", "usage": "high", "process": 1 },
            "disk": [],
            "network": { "receive": 1 }
        }))
        .unwrap();

        assert_eq!(
            CpuStats::from_snapshot(&snapshot),
            Err(FieldError::WrongType {
                path: "cpu.usage".to_string(),
                expected: "a number",
            })
        );
        assert_eq!(
            DiskStats::from_snapshot(&snapshot, 0),
            Err(FieldError::OutOfRange {
                path: "disk".to_string(),
                index: 0,
            })
        );
        assert!(matches!(
            NetRate::from_snapshot(&snapshot, 0, NetDirection::Receive),
            Err(FieldError::WrongType { .. })
        ));
    }

    #[test]
    fn test_values_do_not_need_identity() {
        let snapshot = Snapshot::from_value(json!({
            "cpu": { "usage": 70, "process": 3 },
            "disk": [{ "read": 10.0, "write": 20.0 }]
        }))
        .unwrap();

        assert_eq!(CpuStats::from_snapshot(&snapshot).unwrap().usage, 70.0);
        assert_eq!(
            DiskRate::from_snapshot(&snapshot, 0, DiskDirection::Read).unwrap(),
            DiskRate { bytes: 10.0 }
        );
        assert_eq!(
            CpuStats::name(&snapshot),
            Err(FieldError::Missing {
                path: "cpu.name".to_string()
            })
        );
        assert_eq!(
            drive_label(&snapshot, 0),
            Err(FieldError::Missing {
                path: "disk[0].drive".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_non_object_body() {
        assert!(Snapshot::parse("[1, 2, 3]").is_err());
        assert!(Snapshot::parse("{\"cpu\":").is_err());
        assert!(Snapshot::parse("{}").is_ok());
    }
}
