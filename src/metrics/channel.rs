//! One gauge per metric, configured by a small descriptor.
//!
//! A channel knows where its inputs live in a snapshot (its [`Probe`]),
//! whether it is a usage percentage or a peak-normalized rate, and how to
//! label itself. Extraction failures stay inside the channel.

use crate::metrics::gauge::Gauge;
use crate::metrics::schema::{
    drive_label, Capacity, CpuStats, DiskDirection, DiskRate, DiskStats, FieldError,
    MemoryStats, NetDirection, NetRate, Snapshot,
};
use crate::metrics::throughput::ThroughputNormalizer;
use crate::metrics::units::{DISK_SPEED_UNITS, NETWORK_SPEED_UNITS};

/// Where a channel reads its inputs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Cpu,
    Memory,
    DiskUsage { index: usize },
    DiskRate { index: usize, direction: DiskDirection },
    NetRate { index: usize, direction: NetDirection },
}

/// Rate channel settings: labels for display and a factor applied to the raw
/// value before normalization (8 turns bytes into bits).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateMode {
    pub units: &'static [&'static str],
    pub multiplier: f64,
}

/// Declarative description of a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub title: &'static str,
    /// Append the identity (e.g. drive letter) to the title once known.
    pub show_identity: bool,
    pub probe: Probe,
    pub rate: Option<RateMode>,
}

impl ChannelDescriptor {
    pub fn cpu() -> Self {
        Self {
            title: "CPU",
            show_identity: false,
            probe: Probe::Cpu,
            rate: None,
        }
    }

    pub fn memory() -> Self {
        Self {
            title: "Memory",
            show_identity: false,
            probe: Probe::Memory,
            rate: None,
        }
    }

    pub fn disk_used(index: usize) -> Self {
        Self {
            title: "Disk Used",
            show_identity: true,
            probe: Probe::DiskUsage { index },
            rate: None,
        }
    }

    pub fn disk_rate(index: usize, direction: DiskDirection) -> Self {
        Self {
            title: match direction {
                DiskDirection::Read => "Disk Read",
                DiskDirection::Write => "Disk Write",
            },
            show_identity: true,
            probe: Probe::DiskRate { index, direction },
            rate: Some(RateMode {
                units: DISK_SPEED_UNITS,
                multiplier: 1.0,
            }),
        }
    }

    pub fn net_rate(index: usize, direction: NetDirection) -> Self {
        Self {
            title: match direction {
                NetDirection::Receive => "Network Receive",
                NetDirection::Send => "Network Send",
            },
            show_identity: false,
            probe: Probe::NetRate { index, direction },
            rate: Some(RateMode {
                units: NETWORK_SPEED_UNITS,
                multiplier: 8.0,
            }),
        }
    }

    /// The seven standard gauges, in display order.
    pub fn standard_set(disk_index: usize, network_index: usize) -> Vec<Self> {
        vec![
            Self::cpu(),
            Self::memory(),
            Self::disk_used(disk_index),
            Self::disk_rate(disk_index, DiskDirection::Read),
            Self::disk_rate(disk_index, DiskDirection::Write),
            Self::net_rate(network_index, NetDirection::Receive),
            Self::net_rate(network_index, NetDirection::Send),
        ]
    }
}

/// Latest values kept only for text.
#[derive(Debug, Clone, PartialEq)]
enum Detail {
    Empty,
    Processor { processes: u64 },
    Memory { used: f64, total: f64 },
    Disk { used: Capacity, total: Capacity },
    Rate,
}

/// Everything one ingest needs, extracted before anything is applied.
#[derive(Debug, Clone, PartialEq)]
struct Reading {
    identity: Option<String>,
    /// Usage percentage, or raw per-tick amount for rate channels.
    value: f64,
    detail: Detail,
}

impl Probe {
    /// Extract one reading. Identity fields are only looked up (and only
    /// required) when `want_identity` is set.
    fn read(&self, snapshot: &Snapshot, want_identity: bool) -> Result<Reading, FieldError> {
        match *self {
            Self::Cpu => {
                let cpu = CpuStats::from_snapshot(snapshot)?;
                Ok(Reading {
                    identity: lookup(want_identity, || CpuStats::name(snapshot))?,
                    value: cpu.usage,
                    detail: Detail::Processor {
                        processes: cpu.processes,
                    },
                })
            }
            Self::Memory => {
                let memory = MemoryStats::from_snapshot(snapshot)?;
                Ok(Reading {
                    identity: None,
                    value: memory.used_percent,
                    detail: Detail::Memory {
                        used: memory.used,
                        total: memory.total,
                    },
                })
            }
            Self::DiskUsage { index } => {
                let disk = DiskStats::from_snapshot(snapshot, index)?;
                Ok(Reading {
                    identity: lookup(want_identity, || drive_label(snapshot, index))?,
                    value: disk.used_percent,
                    detail: Detail::Disk {
                        used: disk.used,
                        total: disk.total,
                    },
                })
            }
            Self::DiskRate { index, direction } => {
                let rate = DiskRate::from_snapshot(snapshot, index, direction)?;
                Ok(Reading {
                    identity: lookup(want_identity, || drive_label(snapshot, index))?,
                    value: rate.bytes,
                    detail: Detail::Rate,
                })
            }
            Self::NetRate { index, direction } => {
                let rate = NetRate::from_snapshot(snapshot, index, direction)?;
                Ok(Reading {
                    identity: None,
                    value: rate.bytes,
                    detail: Detail::Rate,
                })
            }
        }
    }
}

fn lookup(
    wanted: bool,
    read: impl FnOnce() -> Result<String, FieldError>,
) -> Result<Option<String>, FieldError> {
    if wanted {
        read().map(Some)
    } else {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub struct MetricChannel {
    descriptor: ChannelDescriptor,
    gauge: Gauge<f64>,
    throughput: Option<ThroughputNormalizer>,
    /// Write-once: set on the first successful ingest, then kept. Later
    /// snapshots may omit it.
    identity: Option<String>,
    detail: Detail,
}

impl MetricChannel {
    /// A channel at rest whose gauge covers `easing` of the remaining
    /// distance per tick.
    pub fn new(descriptor: ChannelDescriptor, easing: f64) -> Self {
        let throughput = descriptor.rate.map(|_| ThroughputNormalizer::new());
        Self {
            descriptor,
            gauge: Gauge::new(0.0, 100.0).with_easing(easing),
            throughput,
            identity: None,
            detail: Detail::Empty,
        }
    }

    /// Pull this channel's inputs out of `snapshot` and retarget the gauge.
    ///
    /// On any extraction failure the channel keeps its previous state and the
    /// error is returned for logging only.
    pub fn ingest(&mut self, snapshot: &Snapshot) -> Result<(), FieldError> {
        let want_identity = self.identity().map_or(true, str::is_empty);
        let reading = self.descriptor.probe.read(snapshot, want_identity)?;

        let percent = match (self.descriptor.rate, self.throughput.as_mut()) {
            (Some(rate), Some(throughput)) => throughput.update(reading.value * rate.multiplier),
            _ => reading.value,
        };
        self.gauge.set_target(percent);

        if want_identity {
            self.identity = reading.identity;
        }
        self.detail = reading.detail;
        Ok(())
    }

    /// Advance the animation one frame.
    pub fn tick(&mut self) {
        self.gauge.tick();
    }

    /// Arc position in `[0, 100]`.
    pub fn displayed(&self) -> f64 {
        self.gauge.displayed()
    }

    /// Latest percentage in `[0, 100]`.
    pub fn target(&self) -> f64 {
        self.gauge.target()
    }

    pub fn descriptor(&self) -> &ChannelDescriptor {
        &self.descriptor
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn reset_peak(&mut self) {
        if let Some(throughput) = self.throughput.as_mut() {
            throughput.reset();
        }
    }

    /// Title, e.g. `"Disk Read(C:)"`.
    pub fn label(&self) -> String {
        match self.identity() {
            Some(identity) if self.descriptor.show_identity && !identity.is_empty() => {
                format!("{}({})", self.descriptor.title, identity)
            }
            _ => self.descriptor.title.to_string(),
        }
    }

    /// Value text shown inside the gauge, recomputed on every call.
    pub fn value_text(&self) -> String {
        if let (Some(rate), Some(throughput)) = (self.descriptor.rate, self.throughput.as_ref()) {
            let (value, unit) = throughput.current_display(rate.units);
            return format!("{:.2} {}", value, unit);
        }

        match &self.detail {
            Detail::Processor { processes } => {
                format!("Use: {:.0}% / Process: {}", self.gauge.target(), processes)
            }
            Detail::Memory { used, total } => format!("{:.2} / {:.2} MB", used, total),
            Detail::Disk { used, total } => format!(
                "{:.2}{} / {:.2} {}",
                used.amount, used.unit, total.amount, total.unit
            ),
            Detail::Rate | Detail::Empty => format!("{:.0}%", self.gauge.target()),
        }
    }
}
