//! RSSI classification and aggregation over scan rows.

use std::collections::HashSet;

use crate::models::WifiScan;

/// Lower bound (inclusive) of a strong signal, in dBm.
pub const STRONG_THRESHOLD_DBM: i32 = -50;
/// Lower bound (inclusive) of a medium signal, in dBm.
pub const MEDIUM_THRESHOLD_DBM: i32 = -70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalStrength {
    Unknown,
    Weak,
    Medium,
    Strong,
}

impl SignalStrength {
    pub fn from_rssi(rssi: Option<i32>) -> Self {
        match rssi {
            None => SignalStrength::Unknown,
            Some(r) if r >= STRONG_THRESHOLD_DBM => SignalStrength::Strong,
            Some(r) if r >= MEDIUM_THRESHOLD_DBM => SignalStrength::Medium,
            Some(_) => SignalStrength::Weak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalStrength::Strong => "Strong",
            SignalStrength::Medium => "Medium",
            SignalStrength::Weak => "Weak",
            SignalStrength::Unknown => "Unknown",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SignalStrength::Strong => "#10b981",
            SignalStrength::Medium => "#f59e0b",
            SignalStrength::Weak => "#ef4444",
            SignalStrength::Unknown => "#6b7280",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            SignalStrength::Strong => "badge-success",
            SignalStrength::Medium => "badge-warning",
            SignalStrength::Weak => "badge-danger",
            SignalStrength::Unknown => "badge-muted",
        }
    }
}

/// Mean RSSI of the rows that carry one, rounded half toward +inf.
pub fn average_rssi(rows: &[WifiScan]) -> Option<i32> {
    let values: Vec<i32> = rows.iter().filter_map(|r| r.rssi).collect();
    if values.is_empty() {
        return None;
    }

    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let mean = sum as f64 / values.len() as f64;
    Some((mean + 0.5).floor() as i32)
}

pub fn average_rssi_display(rows: &[WifiScan]) -> String {
    average_rssi(rows)
        .map(|avg| format!("{} dBm", avg))
        .unwrap_or_else(|| "—".to_string())
}

/// Number of distinct, non-blank SSIDs.
pub fn unique_ssids(rows: &[WifiScan]) -> usize {
    rows.iter()
        .filter_map(|r| r.ssid.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// One row per SSID with a strong signal, in first-seen order.
///
/// When an SSID shows up more than once the latest row in `rows` wins.
pub fn strong_networks(rows: &[WifiScan]) -> Vec<WifiScan> {
    let mut networks: Vec<WifiScan> = Vec::new();

    for row in rows {
        let Some(ssid) = row.ssid.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if SignalStrength::from_rssi(row.rssi) != SignalStrength::Strong {
            continue;
        }

        match networks
            .iter_mut()
            .find(|n| n.ssid.as_deref() == Some(ssid))
        {
            Some(existing) => *existing = row.clone(),
            None => networks.push(row.clone()),
        }
    }

    networks
}

/// Representative rows for the room heatmap cells.
#[derive(Debug, Clone, Default)]
pub struct HeatmapHighlights {
    pub strongest: Option<WifiScan>,
    pub medium: Option<WifiScan>,
    pub weakest: Option<WifiScan>,
}

impl HeatmapHighlights {
    pub fn cells(&self) -> Vec<&WifiScan> {
        [&self.strongest, &self.medium, &self.weakest]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Picks the strongest strong row, the first medium row and the weakest weak row.
pub fn heatmap_highlights(rows: &[WifiScan]) -> HeatmapHighlights {
    let of_class = |class: SignalStrength| {
        rows.iter()
            .filter(move |r| SignalStrength::from_rssi(r.rssi) == class)
    };

    HeatmapHighlights {
        strongest: of_class(SignalStrength::Strong)
            .max_by_key(|r| r.rssi)
            .cloned(),
        medium: of_class(SignalStrength::Medium).next().cloned(),
        weakest: of_class(SignalStrength::Weak)
            .min_by_key(|r| r.rssi)
            .cloned(),
    }
}

/// Sorts rows by `received_at`, newest first. Unparseable timestamps sink.
pub fn newest_first(rows: &mut [WifiScan]) {
    rows.sort_by(|a, b| {
        let a = crate::models::timestamp::parse(&a.received_at);
        let b = crate::models::timestamp::parse(&b.received_at);
        b.cmp(&a)
    });
}
