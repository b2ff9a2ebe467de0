use log::info;

/// Counters for a single scrape-and-forward run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub response_bytes: usize,
    pub samples: usize,
    pub parse_errors: usize,
    pub dimensions_dropped: usize,
    pub send_count: usize,
    pub send_errors: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scraped(&mut self, bytes: usize) {
        self.response_bytes += bytes;
    }

    pub fn sample_parsed(&mut self) {
        self.samples += 1;
    }

    pub fn parse_failed(&mut self) {
        self.parse_errors += 1;
    }

    pub fn dimensions_dropped(&mut self, n: usize) {
        self.dimensions_dropped += n;
    }

    pub fn send_succeeded(&mut self) {
        self.send_count += 1;
    }

    pub fn send_failed(&mut self) {
        self.send_errors += 1;
    }

    // Log the counters for this run
    pub fn publish(&self) {
        info!("{}", self);
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn format_bytes(bytes: usize) -> String {
            const KI_B: f32 = 1024.;
            const MI_B: f32 = 1024. * 1024.;

            let bytes = bytes as f32;
            if bytes > MI_B {
                format!("{:.1} {}", bytes / MI_B, "MiB")
            } else {
                format!("{:.1} {}", bytes / KI_B, "KiB")
            }
        }
        write!(
            f,
            "Debug: scraped {} | samples {} (parse errors {}, dimensions dropped {}) | sends {} (errors {})",
            format_bytes(self.response_bytes),
            self.samples,
            self.parse_errors,
            self.dimensions_dropped,
            self.send_count,
            self.send_errors,
        )
    }
}
