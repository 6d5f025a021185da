//! Data sources that yield a metrics table.

use crate::table::{MetricsRow, MetricsTable, ProtocolSample};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Anything that can produce a metrics table
pub trait MetricsSource {
    /// Human-readable description for logs and summaries
    fn describe(&self) -> String;

    fn load(&self) -> Result<MetricsTable>;
}

/// One line of the simulation CSV, columns matched by header name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "TCP_Packets_Sent")]
    pub tcp_packets_sent: f64,
    #[serde(rename = "TCP_Packets_Received")]
    pub tcp_packets_received: f64,
    #[serde(rename = "TCP_Bytes_Received")]
    pub tcp_bytes_received: f64,
    #[serde(rename = "TCP_Throughput_Mbps")]
    pub tcp_throughput_mbps: f64,
    #[serde(rename = "TCP_PDR_%")]
    pub tcp_pdr: f64,
    #[serde(rename = "UDP_Packets_Sent")]
    pub udp_packets_sent: f64,
    #[serde(rename = "UDP_Packets_Received")]
    pub udp_packets_received: f64,
    #[serde(rename = "UDP_Bytes_Received")]
    pub udp_bytes_received: f64,
    #[serde(rename = "UDP_Throughput_Mbps")]
    pub udp_throughput_mbps: f64,
    #[serde(rename = "UDP_PDR_%")]
    pub udp_pdr: f64,
}

impl From<CsvRecord> for MetricsRow {
    fn from(r: CsvRecord) -> Self {
        MetricsRow {
            time: r.time,
            tcp: ProtocolSample {
                sent: r.tcp_packets_sent,
                received: r.tcp_packets_received,
                bytes_received: r.tcp_bytes_received,
                throughput_mbps: r.tcp_throughput_mbps,
                delivery_ratio: r.tcp_pdr,
            },
            udp: ProtocolSample {
                sent: r.udp_packets_sent,
                received: r.udp_packets_received,
                bytes_received: r.udp_bytes_received,
                throughput_mbps: r.udp_throughput_mbps,
                delivery_ratio: r.udp_pdr,
            },
        }
    }
}

impl From<&MetricsRow> for CsvRecord {
    fn from(row: &MetricsRow) -> Self {
        CsvRecord {
            time: row.time,
            tcp_packets_sent: row.tcp.sent,
            tcp_packets_received: row.tcp.received,
            tcp_bytes_received: row.tcp.bytes_received,
            tcp_throughput_mbps: row.tcp.throughput_mbps,
            tcp_pdr: row.tcp.delivery_ratio,
            udp_packets_sent: row.udp.sent,
            udp_packets_received: row.udp.received,
            udp_bytes_received: row.udp.bytes_received,
            udp_throughput_mbps: row.udp.throughput_mbps,
            udp_pdr: row.udp.delivery_ratio,
        }
    }
}

/// Metrics recorded by the CSMA simulation
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MetricsSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn load(&self) -> Result<MetricsTable> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open metrics file: {}", self.path.display()))?;

        let mut rows = Vec::new();
        for (i, result) in reader.deserialize::<CsvRecord>().enumerate() {
            // +2: header line, then 1-based numbering
            let record = result.with_context(|| {
                format!("Failed to parse {} at line {}", self.path.display(), i + 2)
            })?;
            rows.push(MetricsRow::from(record));
        }

        let table = MetricsTable::new(rows)
            .with_context(|| format!("Invalid metrics in {}", self.path.display()))?;
        Ok(table)
    }
}

/// Deterministic sample data shaped like a TCP/UDP CSMA run
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub seed: u64,
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl MetricsSource for SyntheticSource {
    fn describe(&self) -> String {
        format!(
            "synthetic:seed={} range=[{}, {}] points={}",
            self.seed, self.start, self.end, self.points
        )
    }

    fn load(&self) -> Result<MetricsTable> {
        let times = linspace(self.start, self.end, self.points);
        let n = times.len();
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Draw order is fixed so a seed always maps to the same columns
        let tcp_tput_noise = noise(&mut rng, n);
        let udp_tput_noise = noise(&mut rng, n);
        let tcp_pdr_noise = noise(&mut rng, n);
        let udp_pdr_noise = noise(&mut rng, n);
        let tcp_sent_noise = noise(&mut rng, n);
        let udp_sent_noise = noise(&mut rng, n);

        let rows = times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let tcp_received = 2500.0 * t * 0.999;
                let udp_received = 5000.0 * t * (1.0 - 0.005 * t);
                MetricsRow {
                    time: t,
                    tcp: ProtocolSample {
                        sent: 2500.0 * t + tcp_sent_noise[i] * 50.0,
                        received: tcp_received,
                        bytes_received: tcp_received * 1500.0,
                        throughput_mbps: 50.0 / (1.0 + t) + tcp_tput_noise[i] * 0.5,
                        delivery_ratio: 99.8 + tcp_pdr_noise[i] * 0.1,
                    },
                    udp: ProtocolSample {
                        sent: 5000.0 * t + udp_sent_noise[i] * 50.0,
                        received: udp_received,
                        bytes_received: udp_received * 1500.0,
                        throughput_mbps: 5.0 + udp_tput_noise[i] * 0.5,
                        delivery_ratio: 100.0 - (1.0 + t) * 0.5 + udp_pdr_noise[i] * 0.5,
                    },
                }
            })
            .collect();

        Ok(MetricsTable::new(rows)?)
    }
}

fn noise(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen::<f64>()).collect()
}

/// `points` evenly spaced values over `[start, end]`, endpoints included
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            let mut values: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
            values[points - 1] = end;
            values
        }
    }
}
