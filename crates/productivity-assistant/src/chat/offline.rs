//! Offline response engine.
//!
//! Always succeeds. Category selection is deterministic ([`classify`]); only
//! the template pick and the simulated typing delay are random, and both draw
//! from one injectable RNG.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::config::OfflineConfig;
use crate::processing::summarize;
use crate::types::{DocumentAnalysis, UserContext};

use super::intent::{classify, Intent};
use super::templates;

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReply {
    pub intent: Intent,
    pub text: String,
}

pub struct OfflineEngine {
    rng: Mutex<StdRng>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl OfflineEngine {
    pub fn new(config: &OfflineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic template and delay choices.
    pub fn with_seed(config: &OfflineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &OfflineConfig, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms.max(config.min_delay_ms),
        }
    }

    /// Wait for the simulated pacing delay, then compose a reply.
    pub async fn respond(
        &self,
        message: &str,
        context: &UserContext,
        document: Option<&DocumentAnalysis>,
    ) -> OfflineReply {
        let delay = self.pick_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.compose(message, context, document)
    }

    /// Pure reply composition, no delay.
    pub fn compose(
        &self,
        message: &str,
        context: &UserContext,
        document: Option<&DocumentAnalysis>,
    ) -> OfflineReply {
        let intent = classify(message, document.is_some());

        let text = match (intent, document) {
            (Intent::DocumentAnalysis, Some(doc)) => {
                let summary = summarize(&doc.text);
                let template = templates::DOCUMENT[self.pick_index(templates::DOCUMENT.len())];
                template(context, doc, &summary)
            }
            _ => {
                let options = templates::for_intent(intent);
                let template = options[self.pick_index(options.len())];
                template(context)
            }
        };

        tracing::debug!(intent = ?intent, chars = text.len(), "Offline reply composed");
        OfflineReply { intent, text }
    }

    fn pick_index(&self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            self.rng.lock().gen_range(0..len)
        }
    }

    fn pick_delay(&self) -> Duration {
        if self.max_delay_ms == 0 {
            return Duration::ZERO;
        }
        let ms = self.rng.lock().gen_range(self.min_delay_ms..=self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Money;

    fn no_delay() -> OfflineConfig {
        OfflineConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    fn ctx() -> UserContext {
        UserContext {
            user_name: "Andi".to_string(),
            study_sessions: 5,
            tasks_completed: 12,
            journal_entries: 3,
            balance: Money(250_000.0),
            streak: 4,
            today_tasks: 1,
        }
    }

    #[test]
    fn test_greeting_always_has_name() {
        let engine = OfflineEngine::with_seed(&no_delay(), 1);
        for _ in 0..20 {
            let reply = engine.compose("halo", &ctx(), None);
            assert_eq!(reply.intent, Intent::Greeting);
            assert!(reply.text.contains("Andi"));
        }
    }

    #[test]
    fn test_finance_always_has_rule_marker() {
        let engine = OfflineEngine::with_seed(&no_delay(), 2);
        for _ in 0..20 {
            let reply = engine.compose("tips menabung", &ctx(), None);
            assert_eq!(reply.intent, Intent::Finance);
            assert!(reply.text.contains("50/30/20"));
        }
    }

    #[test]
    fn test_category_markers() {
        let engine = OfflineEngine::with_seed(&no_delay(), 3);
        let cases = [
            ("kamu bisa apa?", "bisa"),
            ("cara fokus belajar", "pomodoro"),
            ("aku lagi malas", "semangat"),
            ("gimana membangun kebiasaan", "streak"),
            ("aku stres", "napas"),
            ("atur jadwal dong", "eisenhower"),
            ("bikin target", "smart"),
            ("kamu siapa?", "asisten"),
            ("apa kabar cuaca", "andi"),
        ];
        for (message, marker) in cases {
            for _ in 0..10 {
                let text = engine.compose(message, &ctx(), None).text.to_lowercase();
                assert!(text.contains(marker), "{} -> {}", message, text);
            }
        }
    }

    #[test]
    fn test_same_seed_same_wording() {
        let a = OfflineEngine::with_seed(&no_delay(), 42);
        let b = OfflineEngine::with_seed(&no_delay(), 42);
        for message in ["halo", "tips menabung", "aku stres", "???"] {
            assert_eq!(a.compose(message, &ctx(), None), b.compose(message, &ctx(), None));
        }
    }

    #[test]
    fn test_document_reply_includes_summary_and_stats() {
        let engine = OfflineEngine::with_seed(&no_delay(), 7);
        let text = "Manajemen waktu adalah keterampilan penting bagi mahasiswa. \
                    Dengan jadwal yang baik tugas dapat selesai tepat waktu. \
                    Istirahat yang cukup juga membantu menjaga konsentrasi belajar.\n--- Halaman 1 ---\n";
        let doc = DocumentAnalysis {
            file_name: "materi.pdf".to_string(),
            page_count: 1,
            pages_read: 1,
            is_truncated: false,
            title: None,
            text: text.to_string(),
        };

        let reply = engine.compose("", &ctx(), Some(&doc));
        assert_eq!(reply.intent, Intent::DocumentAnalysis);
        assert!(reply.text.contains("materi.pdf"));
        assert!(reply.text.contains("Manajemen waktu adalah keterampilan penting"));
        assert!(reply.text.contains("1 menit"));
        assert!(!reply.text.contains("halaman pertama"));
    }

    #[tokio::test]
    async fn test_respond_without_delay() {
        let engine = OfflineEngine::with_seed(&no_delay(), 9);
        let start = std::time::Instant::now();
        let reply = engine.respond("halo", &ctx(), None).await;
        assert!(start.elapsed() < Duration::from_millis(500));
        assert!(reply.text.contains("Andi"));
    }

    #[test]
    fn test_delay_stays_in_range() {
        let config = OfflineConfig {
            min_delay_ms: 800,
            max_delay_ms: 2000,
        };
        let engine = OfflineEngine::with_seed(&config, 11);
        for _ in 0..50 {
            let delay = engine.pick_delay();
            assert!(delay >= Duration::from_millis(800) && delay <= Duration::from_millis(2000));
        }
    }
}
