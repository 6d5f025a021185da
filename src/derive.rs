//! Derived columns: clamped delivery ratio, packet loss, efficiency.

use crate::table::{MetricsRow, MetricsTable, Protocol, ProtocolSample};

/// Derived values for one protocol at one time point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedSample {
    /// Delivery ratio clamped into [0, 100]
    pub delivery_ratio: f64,
    /// `max(sent - received, 0)`
    pub packets_lost: f64,
    /// `received / sent * 100`, zero when nothing was sent
    pub efficiency: f64,
}

impl DerivedSample {
    pub fn from_sample(sample: &ProtocolSample) -> Self {
        Self {
            delivery_ratio: clamp_ratio(sample.delivery_ratio),
            packets_lost: packets_lost(sample.sent, sample.received),
            efficiency: efficiency(sample.sent, sample.received),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRow {
    pub tcp: DerivedSample,
    pub udp: DerivedSample,
}

impl DerivedRow {
    pub fn protocol(&self, protocol: Protocol) -> &DerivedSample {
        match protocol {
            Protocol::Tcp => &self.tcp,
            Protocol::Udp => &self.udp,
        }
    }
}

/// Base table plus derived columns
#[derive(Debug, Clone)]
pub struct AnalysisTable<'a> {
    base: &'a MetricsTable,
    derived: Vec<DerivedRow>,
}

impl<'a> AnalysisTable<'a> {
    pub fn base(&self) -> &'a MetricsTable {
        self.base
    }

    /// Base and derived row pairs in time order
    pub fn iter(&self) -> impl Iterator<Item = (&'a MetricsRow, &DerivedRow)> + '_ {
        self.base.rows().iter().zip(self.derived.iter())
    }

    pub fn last(&self) -> (&'a MetricsRow, &DerivedRow) {
        let i = self.derived.len() - 1;
        (&self.base.rows()[i], &self.derived[i])
    }

    pub fn times(&self) -> Vec<f64> {
        self.base.times()
    }

    pub fn base_column<F>(&self, protocol: Protocol, f: F) -> Vec<f64>
    where
        F: Fn(&ProtocolSample) -> f64,
    {
        self.base.column(protocol, f)
    }

    pub fn derived_column<F>(&self, protocol: Protocol, f: F) -> Vec<f64>
    where
        F: Fn(&DerivedSample) -> f64,
    {
        self.derived.iter().map(|r| f(r.protocol(protocol))).collect()
    }
}

/// Compute derived columns for every row
pub fn derive(table: &MetricsTable) -> AnalysisTable<'_> {
    let derived = table
        .rows()
        .iter()
        .map(|row| DerivedRow {
            tcp: DerivedSample::from_sample(&row.tcp),
            udp: DerivedSample::from_sample(&row.udp),
        })
        .collect();

    AnalysisTable {
        base: table,
        derived,
    }
}

pub fn clamp_ratio(ratio: f64) -> f64 {
    ratio.clamp(0.0, 100.0)
}

pub fn packets_lost(sent: f64, received: f64) -> f64 {
    (sent - received).max(0.0)
}

pub fn efficiency(sent: f64, received: f64) -> f64 {
    if sent == 0.0 {
        return 0.0;
    }
    let pct = received / sent * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MetricsSource, SyntheticSource};

    fn sample(sent: f64, received: f64, ratio: f64) -> ProtocolSample {
        ProtocolSample {
            sent,
            received,
            bytes_received: received * 1500.0,
            throughput_mbps: 1.0,
            delivery_ratio: ratio,
        }
    }

    #[test]
    fn loss_never_negative() {
        assert_eq!(packets_lost(10.0, 7.0), 3.0);
        assert_eq!(packets_lost(7.0, 10.0), 0.0);
        assert_eq!(packets_lost(0.0, 0.0), 0.0);
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(clamp_ratio(100.4), 100.0);
        assert_eq!(clamp_ratio(-3.0), 0.0);
        assert_eq!(clamp_ratio(42.5), 42.5);
    }

    #[test]
    fn efficiency_zero_when_nothing_sent() {
        assert_eq!(efficiency(0.0, 0.0), 0.0);
        assert_eq!(efficiency(0.0, 5.0), 0.0);
        assert_eq!(efficiency(200.0, 150.0), 75.0);
    }

    #[test]
    fn derive_covers_both_protocols() {
        let rows = vec![
            MetricsRow {
                time: 0.0,
                tcp: sample(0.0, 0.0, 0.0),
                udp: sample(0.0, 0.0, 0.0),
            },
            MetricsRow {
                time: 1.0,
                tcp: sample(100.0, 101.0, 101.0),
                udp: sample(100.0, 80.0, 80.0),
            },
        ];
        let table = MetricsTable::new(rows).unwrap();
        let analysis = derive(&table);

        assert_eq!(analysis.iter().count(), 2);
        let (_, first) = analysis.iter().next().unwrap();
        assert_eq!(first.tcp.efficiency, 0.0);

        let (base, last) = analysis.last();
        assert_eq!(base.time, 1.0);
        assert_eq!(last.tcp.delivery_ratio, 100.0);
        assert_eq!(last.tcp.packets_lost, 0.0);
        assert_eq!(last.udp.packets_lost, 20.0);
        assert_eq!(last.udp.efficiency, 80.0);
    }

    #[test]
    fn derived_invariants_hold_on_synthetic_data() {
        let table = SyntheticSource {
            seed: 42,
            start: 0.0,
            end: 10.0,
            points: 50,
        }
        .load()
        .unwrap();
        let analysis = derive(&table);

        for (base, derived) in analysis.iter() {
            for p in Protocol::ALL {
                let b = base.protocol(p);
                let d = derived.protocol(p);
                assert!(d.packets_lost >= 0.0);
                assert_eq!(d.packets_lost, (b.sent - b.received).max(0.0));
                assert!((0.0..=100.0).contains(&d.delivery_ratio));
                if b.sent == 0.0 {
                    assert_eq!(d.efficiency, 0.0);
                }
            }
        }
    }
}
