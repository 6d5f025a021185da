//! Summary statistics and protocol comparison.

use crate::derive::AnalysisTable;
use crate::table::Protocol;
use serde::Serialize;

/// Final-state and averaged figures for one protocol
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolSummary {
    pub protocol: Protocol,
    pub avg_throughput_mbps: f64,
    pub final_throughput_mbps: f64,
    pub final_pdr_percent: f64,
    pub total_packets_sent: f64,
    pub total_packets_received: f64,
    pub total_packets_lost: f64,
    pub total_data_kb: f64,
}

/// Outcome of comparing one metric between the two protocols
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    /// `leader` is ahead by `margin` (unit depends on the metric)
    Ahead { leader: Protocol, margin: f64 },
    Similar,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// Throughput gap in percent of the faster protocol
    pub throughput: Option<Verdict>,
    /// PDR gap in percentage points
    pub delivery: Option<Verdict>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub samples: usize,
    pub duration_secs: f64,
    pub tcp: ProtocolSummary,
    pub udp: ProtocolSummary,
    pub comparison: Comparison,
}

impl Summary {
    pub fn from_table(table: &AnalysisTable<'_>) -> Self {
        let tcp = summarize(table, Protocol::Tcp);
        let udp = summarize(table, Protocol::Udp);
        let comparison = Comparison {
            throughput: compare_throughput(tcp.final_throughput_mbps, udp.final_throughput_mbps),
            delivery: compare_delivery(tcp.final_pdr_percent, udp.final_pdr_percent),
        };

        let base = table.base();
        let duration_secs = base.last().time - base.rows()[0].time;

        Self {
            samples: base.len(),
            duration_secs,
            tcp,
            udp,
            comparison,
        }
    }

    pub fn protocol(&self, protocol: Protocol) -> &ProtocolSummary {
        match protocol {
            Protocol::Tcp => &self.tcp,
            Protocol::Udp => &self.udp,
        }
    }
}

fn summarize(table: &AnalysisTable<'_>, protocol: Protocol) -> ProtocolSummary {
    let (last, last_derived) = table.last();
    let sample = last.protocol(protocol);
    let derived = last_derived.protocol(protocol);
    let throughput: Vec<f64> = table
        .iter()
        .map(|(row, _)| row.protocol(protocol).throughput_mbps)
        .collect();

    ProtocolSummary {
        protocol,
        avg_throughput_mbps: avg(&throughput),
        final_throughput_mbps: sample.throughput_mbps,
        final_pdr_percent: derived.delivery_ratio,
        total_packets_sent: sample.sent,
        total_packets_received: sample.received,
        total_packets_lost: derived.packets_lost,
        total_data_kb: sample.bytes_received / 1024.0,
    }
}

/// Relative throughput gap, only meaningful when both protocols moved data
pub fn compare_throughput(tcp: f64, udp: f64) -> Option<Verdict> {
    if tcp <= 0.0 || udp <= 0.0 {
        return None;
    }
    let margin = (tcp - udp).abs() / tcp.max(udp) * 100.0;
    Some(if tcp > udp {
        Verdict::Ahead {
            leader: Protocol::Tcp,
            margin,
        }
    } else if udp > tcp {
        Verdict::Ahead {
            leader: Protocol::Udp,
            margin,
        }
    } else {
        Verdict::Similar
    })
}

/// Absolute PDR gap in percentage points
pub fn compare_delivery(tcp: f64, udp: f64) -> Option<Verdict> {
    if tcp <= 0.0 || udp <= 0.0 {
        return None;
    }
    Some(if tcp > udp {
        Verdict::Ahead {
            leader: Protocol::Tcp,
            margin: tcp - udp,
        }
    } else if udp > tcp {
        Verdict::Ahead {
            leader: Protocol::Udp,
            margin: udp - tcp,
        }
    } else {
        Verdict::Similar
    })
}

fn avg(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::table::{MetricsRow, MetricsTable, ProtocolSample};

    fn sample(sent: f64, received: f64, tput: f64, ratio: f64) -> ProtocolSample {
        ProtocolSample {
            sent,
            received,
            bytes_received: received * 1024.0,
            throughput_mbps: tput,
            delivery_ratio: ratio,
        }
    }

    #[test]
    fn throughput_margin_is_relative_to_faster() {
        assert_eq!(
            compare_throughput(10.0, 5.0),
            Some(Verdict::Ahead {
                leader: Protocol::Tcp,
                margin: 50.0
            })
        );
        assert_eq!(
            compare_throughput(2.0, 8.0),
            Some(Verdict::Ahead {
                leader: Protocol::Udp,
                margin: 75.0
            })
        );
        assert_eq!(compare_throughput(3.0, 3.0), Some(Verdict::Similar));
        assert_eq!(compare_throughput(0.0, 3.0), None);
    }

    #[test]
    fn delivery_margin_in_points() {
        assert_eq!(
            compare_delivery(99.0, 95.0),
            Some(Verdict::Ahead {
                leader: Protocol::Tcp,
                margin: 4.0
            })
        );
        assert_eq!(compare_delivery(90.0, 0.0), None);
    }

    #[test]
    fn summary_uses_mean_and_final_values() {
        let rows = vec![
            MetricsRow {
                time: 1.0,
                tcp: sample(10.0, 10.0, 2.0, 100.0),
                udp: sample(20.0, 15.0, 4.0, 75.0),
            },
            MetricsRow {
                time: 3.0,
                tcp: sample(20.0, 18.0, 4.0, 102.0),
                udp: sample(40.0, 30.0, 6.0, 75.0),
            },
        ];
        let table = MetricsTable::new(rows).unwrap();
        let summary = Summary::from_table(&derive(&table));

        assert_eq!(summary.samples, 2);
        assert_eq!(summary.duration_secs, 2.0);
        assert_eq!(summary.tcp.avg_throughput_mbps, 3.0);
        assert_eq!(summary.tcp.final_pdr_percent, 100.0);
        assert_eq!(summary.tcp.total_packets_lost, 2.0);
        assert_eq!(summary.tcp.total_data_kb, 18.0);
        assert_eq!(summary.udp.avg_throughput_mbps, 5.0);
        assert_eq!(summary.udp.total_packets_sent, 40.0);
        assert_eq!(
            summary.comparison.delivery,
            Some(Verdict::Ahead {
                leader: Protocol::Tcp,
                margin: 25.0
            })
        );
    }
}
