//! Metrics table: per-protocol counters sampled over time.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transport protocol being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub const ALL: [Protocol; 2] = [Protocol::Tcp, Protocol::Udp];

    pub fn label(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counters for one protocol at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProtocolSample {
    /// Cumulative packets sent
    pub sent: f64,
    /// Cumulative packets received
    pub received: f64,
    /// Cumulative bytes received
    pub bytes_received: f64,
    /// Throughput in Mbps
    pub throughput_mbps: f64,
    /// Packet delivery ratio (%), unclamped as read from the source
    pub delivery_ratio: f64,
}

/// One sampled time point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    /// Seconds since simulation start
    pub time: f64,
    pub tcp: ProtocolSample,
    pub udp: ProtocolSample,
}

impl MetricsRow {
    pub fn protocol(&self, protocol: Protocol) -> &ProtocolSample {
        match protocol {
            Protocol::Tcp => &self.tcp,
            Protocol::Udp => &self.udp,
        }
    }
}

/// Table validation failures
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("metrics table has no rows")]
    Empty,
    #[error("time must be strictly increasing (row {row}: {time} after {previous})")]
    TimeNotIncreasing { row: usize, previous: f64, time: f64 },
    #[error("row {row}: {column} is {value}, expected a finite non-negative number")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: f64,
    },
}

/// Immutable, time-ordered sequence of metrics rows
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Validate and wrap rows
    pub fn new(rows: Vec<MetricsRow>) -> Result<Self, TableError> {
        if rows.is_empty() {
            return Err(TableError::Empty);
        }

        for (i, row) in rows.iter().enumerate() {
            check_value(i, "Time", row.time)?;
            for protocol in Protocol::ALL {
                let s = row.protocol(protocol);
                check_value(i, "Packets_Sent", s.sent)?;
                check_value(i, "Packets_Received", s.received)?;
                check_value(i, "Bytes_Received", s.bytes_received)?;
                check_value(i, "Throughput_Mbps", s.throughput_mbps)?;
                // Ratios may exceed 100 in raw data; clamping happens on derivation
                if !s.delivery_ratio.is_finite() {
                    return Err(TableError::InvalidValue {
                        row: i,
                        column: "PDR_%",
                        value: s.delivery_ratio,
                    });
                }
            }
        }

        for (i, pair) in rows.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(TableError::TimeNotIncreasing {
                    row: i + 1,
                    previous: pair[0].time,
                    time: pair[1].time,
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Final row; tables are never empty
    pub fn last(&self) -> &MetricsRow {
        &self.rows[self.rows.len() - 1]
    }

    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.time).collect()
    }

    /// Extract one per-protocol column
    pub fn column<F>(&self, protocol: Protocol, f: F) -> Vec<f64>
    where
        F: Fn(&ProtocolSample) -> f64,
    {
        self.rows.iter().map(|r| f(r.protocol(protocol))).collect()
    }
}

fn check_value(row: usize, column: &'static str, value: f64) -> Result<(), TableError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TableError::InvalidValue { row, column, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: f64) -> MetricsRow {
        MetricsRow {
            time,
            tcp: ProtocolSample {
                sent: 10.0,
                received: 9.0,
                bytes_received: 9.0 * 1500.0,
                throughput_mbps: 1.0,
                delivery_ratio: 90.0,
            },
            udp: ProtocolSample::default(),
        }
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(MetricsTable::new(vec![]), Err(TableError::Empty));
    }

    #[test]
    fn rejects_non_increasing_time() {
        let err = MetricsTable::new(vec![row(0.0), row(1.0), row(1.0)]).unwrap_err();
        assert_eq!(
            err,
            TableError::TimeNotIncreasing {
                row: 2,
                previous: 1.0,
                time: 1.0
            }
        );
    }

    #[test]
    fn rejects_negative_counts() {
        let mut bad = row(0.0);
        bad.udp.sent = -1.0;
        let err = MetricsTable::new(vec![bad]).unwrap_err();
        assert!(matches!(
            err,
            TableError::InvalidValue {
                column: "Packets_Sent",
                ..
            }
        ));
    }

    #[test]
    fn accepts_ratio_above_hundred() {
        let mut hot = row(0.0);
        hot.tcp.delivery_ratio = 100.4;
        assert!(MetricsTable::new(vec![hot]).is_ok());
    }

    #[test]
    fn column_and_last() {
        let table = MetricsTable::new(vec![row(0.0), row(0.5)]).unwrap();
        assert_eq!(table.times(), vec![0.0, 0.5]);
        assert_eq!(table.column(Protocol::Tcp, |s| s.sent), vec![10.0, 10.0]);
        assert_eq!(table.last().time, 0.5);
        assert_eq!(table.len(), 2);
    }
}
