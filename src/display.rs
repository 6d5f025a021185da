//! Number formatting and the stdout comparison report.

use crate::summary::{ProtocolSummary, Summary, Verdict};
use crate::table::Protocol;
use num_format::{Locale, ToFormattedString};

/// Truncate a count to an integer and group thousands ("12,345")
pub fn format_count(value: f64) -> String {
    let n = if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    };
    n.to_formatted_string(&Locale::en)
}

/// Fixed two-decimal rendering used throughout the table and report
pub fn format_fixed(value: f64) -> String {
    format!("{:.2}", value)
}

/// Rows of the statistics table: label, TCP cell, UDP cell
pub fn stats_rows(summary: &Summary) -> Vec<[String; 3]> {
    let rows = [
        (
            "Avg Throughput (Mbps)",
            cells(summary, |s| format_fixed(s.avg_throughput_mbps)),
        ),
        (
            "Final PDR (%)",
            cells(summary, |s| format_fixed(s.final_pdr_percent)),
        ),
        (
            "Total Packets Sent",
            cells(summary, |s| format_count(s.total_packets_sent)),
        ),
        (
            "Total Packets Received",
            cells(summary, |s| format_count(s.total_packets_received)),
        ),
        (
            "Total Data (KB)",
            cells(summary, |s| format_fixed(s.total_data_kb)),
        ),
    ];

    let mut out = vec![[
        "Metric".to_string(),
        Protocol::Tcp.label().to_string(),
        Protocol::Udp.label().to_string(),
    ]];
    out.extend(
        rows.into_iter()
            .map(|(label, [tcp, udp])| [label.to_string(), tcp, udp]),
    );
    out
}

fn cells<F>(summary: &Summary, f: F) -> [String; 2]
where
    F: Fn(&ProtocolSummary) -> String,
{
    [f(&summary.tcp), f(&summary.udp)]
}

/// One-line throughput verdict
pub fn describe_throughput(summary: &Summary) -> Option<String> {
    let verdict = summary.comparison.throughput.as_ref()?;
    let line = match verdict {
        Verdict::Ahead { leader, margin } => {
            let other = other(*leader);
            format!(
                "{} faster by {:.2}% ({:.2} vs {:.2} Mbps)",
                leader,
                margin,
                summary.protocol(*leader).final_throughput_mbps,
                summary.protocol(other).final_throughput_mbps
            )
        }
        Verdict::Similar => format!(
            "TCP and UDP have similar throughput: {:.2} Mbps",
            summary.tcp.final_throughput_mbps
        ),
    };
    Some(line)
}

/// One-line delivery ratio verdict
pub fn describe_delivery(summary: &Summary) -> Option<String> {
    let verdict = summary.comparison.delivery.as_ref()?;
    let mut line = format!(
        "PDR Comparison: TCP {:.2}% vs UDP {:.2}%",
        summary.tcp.final_pdr_percent, summary.udp.final_pdr_percent
    );
    if let Verdict::Ahead { leader, margin } = verdict {
        line.push_str(&format!(" ({} more reliable by {:.2}%)", leader, margin));
    }
    Some(line)
}

fn other(protocol: Protocol) -> Protocol {
    match protocol {
        Protocol::Tcp => Protocol::Udp,
        Protocol::Udp => Protocol::Tcp,
    }
}

/// Print the per-protocol block and comparison to stdout
pub fn print_report(summary: &Summary, source: &str) {
    println!("\n{}", "=".repeat(60));
    println!("          CSMA NETWORK PERFORMANCE: TCP vs UDP");
    println!("{}", "=".repeat(60));
    println!("Source: {}", source);
    println!(
        "Duration: {:.1}s  Samples: {}",
        summary.duration_secs, summary.samples
    );

    for protocol in Protocol::ALL {
        let s = summary.protocol(protocol);
        println!();
        println!("{}:", protocol);
        println!("  Packets sent:      {}", format_count(s.total_packets_sent));
        println!(
            "  Packets received:  {}",
            format_count(s.total_packets_received)
        );
        println!("  Packets lost:      {}", format_count(s.total_packets_lost));
        println!("  Data received:     {} KB", format_fixed(s.total_data_kb));
        println!("  Delivery ratio:    {}%", format_fixed(s.final_pdr_percent));
        println!(
            "  Throughput:        avg {} Mbps, final {} Mbps",
            format_fixed(s.avg_throughput_mbps),
            format_fixed(s.final_throughput_mbps)
        );
    }

    let verdicts: Vec<String> = [describe_throughput(summary), describe_delivery(summary)]
        .into_iter()
        .flatten()
        .collect();
    if !verdicts.is_empty() {
        println!();
        println!("Comparison:");
        for line in verdicts {
            println!("  • {}", line);
        }
    }
    println!("{}", "=".repeat(60));
}
