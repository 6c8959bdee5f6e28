use std::fmt;
use std::str::FromStr;

/// The index-option volatility series exposed by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QvixSeries {
    /// SSE 50 ETF options.
    Etf50,
    /// CSI 300 index options.
    Csi300Index,
    /// CSI 1000 index options.
    Csi1000Index,
    /// SSE 50 index options.
    Sse50Index,
    /// CSI 500 index options. Upstream may not publish this one.
    Csi500Index,
}

impl QvixSeries {
    pub const ALL: [QvixSeries; 5] = [
        QvixSeries::Etf50,
        QvixSeries::Csi300Index,
        QvixSeries::Csi1000Index,
        QvixSeries::Sse50Index,
        QvixSeries::Csi500Index,
    ];

    /// Path segment used both on the proxy and on the upstream API.
    pub fn slug(self) -> &'static str {
        match self {
            QvixSeries::Etf50 => "index_option_50etf_qvix",
            QvixSeries::Csi300Index => "index_option_300index_qvix",
            QvixSeries::Csi1000Index => "index_option_1000index_qvix",
            QvixSeries::Sse50Index => "index_option_50index_qvix",
            QvixSeries::Csi500Index => "index_option_500index_qvix",
        }
    }

    /// Upstream endpoint path, e.g. `/index_option_50etf_qvix`.
    pub fn endpoint(self) -> String {
        format!("/{}", self.slug())
    }

    /// Maps a futures or option symbol to the series tracking its underlying.
    ///
    /// Rules are checked in order, so `IF300` resolves through the `300` rule
    /// before the `IF` rule. Returns `None` for symbols with no known series.
    pub fn for_symbol(symbol: &str) -> Option<QvixSeries> {
        const RULES: [(&str, QvixSeries); 6] = [
            ("50", QvixSeries::Etf50),
            ("300", QvixSeries::Csi300Index),
            ("1000", QvixSeries::Csi1000Index),
            ("IF", QvixSeries::Csi300Index),
            ("IC", QvixSeries::Csi500Index),
            ("IH", QvixSeries::Sse50Index),
        ];

        RULES
            .iter()
            .find(|(needle, _)| symbol.contains(needle))
            .map(|(_, series)| *series)
    }
}

impl fmt::Display for QvixSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for QvixSeries {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QvixSeries::ALL
            .into_iter()
            .find(|series| series.slug() == s)
            .ok_or_else(|| format!("unknown series: {s}"))
    }
}
